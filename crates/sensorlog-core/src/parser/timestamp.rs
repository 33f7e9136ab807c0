// Timestamp resolution for equipment log lines
// Formats are tried in order, first match wins

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized timestamp format: '{text}'")]
pub struct TimestampError {
    pub text: String,
}

/// A single accepted timestamp shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    /// Full date and time, e.g. `%Y-%m-%d %H:%M:%S`.
    DateTime(&'static str),
    /// Date only; the time of day is midnight.
    Date(&'static str),
}

impl TimestampFormat {
    fn try_parse(&self, text: &str) -> Option<NaiveDateTime> {
        match self {
            TimestampFormat::DateTime(fmt) => NaiveDateTime::parse_from_str(text, fmt).ok(),
            TimestampFormat::Date(fmt) => NaiveDate::parse_from_str(text, fmt)
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN)),
        }
    }
}

/// Formats seen in the equipment log files. The full date-time comes first
/// because it is the common shape.
pub const DEFAULT_FORMATS: &[TimestampFormat] = &[
    TimestampFormat::DateTime("%Y-%m-%d %H:%M:%S"),
    TimestampFormat::Date("%Y/%m/%d"),
];

#[derive(Debug, Clone)]
pub struct TimestampResolver {
    formats: Vec<TimestampFormat>,
}

impl TimestampResolver {
    pub fn new() -> Self {
        Self::with_formats(DEFAULT_FORMATS.to_vec())
    }

    pub fn with_formats(formats: Vec<TimestampFormat>) -> Self {
        Self { formats }
    }

    pub fn formats(&self) -> &[TimestampFormat] {
        &self.formats
    }

    pub fn resolve(&self, text: &str) -> Result<NaiveDateTime, TimestampError> {
        self.formats
            .iter()
            .find_map(|format| format.try_parse(text))
            .ok_or_else(|| TimestampError {
                text: text.to_string(),
            })
    }
}

impl Default for TimestampResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_full_datetime() {
        let resolver = TimestampResolver::new();
        let ts = resolver.resolve("2023-01-01 10:00:00").unwrap();
        assert_eq!(ts.to_string(), "2023-01-01 10:00:00");
    }

    #[test]
    fn test_date_only_is_midnight() {
        let resolver = TimestampResolver::new();
        let ts = resolver.resolve("2023/05/01").unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2023, 5, 1).unwrap());
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (0, 0, 0));
    }

    #[test]
    fn test_unrecognized() {
        let resolver = TimestampResolver::new();
        let err = resolver.resolve("01.05.2023").unwrap_err();
        assert_eq!(err.text, "01.05.2023");
        assert!(err.to_string().starts_with("unrecognized timestamp format"));
    }

    #[test]
    fn test_mixed_separators_rejected() {
        let resolver = TimestampResolver::new();
        assert!(resolver.resolve("2023/05/01 10:00:00").is_err());
        assert!(resolver.resolve("2023-05-01").is_err());
    }

    #[test]
    fn test_custom_format_list() {
        let resolver = TimestampResolver::with_formats(vec![TimestampFormat::Date("%d.%m.%Y")]);
        let ts = resolver.resolve("01.05.2023").unwrap();
        assert_eq!(ts.to_string(), "2023-05-01 00:00:00");
        // defaults are not consulted once replaced
        assert!(resolver.resolve("2023/05/01").is_err());
    }
}
