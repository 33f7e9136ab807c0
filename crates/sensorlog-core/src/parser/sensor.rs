// Equipment sensor log parser
// Line shape: [2023-01-01 10:00:00] WARN sensor[7]: (temperature 36.5, vibration err)

use super::{LogParser, ParseError, TimestampResolver};
use crate::LogRecord;
use regex::Regex;

/// Marks a measurement the sensor could not read. Matched literally.
pub const SENTINEL: &str = "err";

pub struct SensorLineParser {
    pattern: Regex,
    timestamps: TimestampResolver,
}

impl SensorLineParser {
    pub fn new() -> Self {
        Self::with_resolver(TimestampResolver::new())
    }

    pub fn with_resolver(timestamps: TimestampResolver) -> Self {
        Self {
            // measurement groups are loose on purpose, the value check happens after the match
            pattern: Regex::new(
                r"^\[(.*?)\]\s+([A-Z]+)\s+sensor\[(\d+)\]:\s+\(temperature\s+([^,\s)]+),\s+vibration\s+([^,\s)]+)\)"
            ).expect("sensor line pattern is valid"),
            timestamps,
        }
    }

    fn parse_sensor_id(text: &str) -> Result<u32, ParseError> {
        match text.parse::<u32>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(ParseError::InvalidSensorId(text.to_string())),
        }
    }

    fn parse_measurement(field: &'static str, text: &str) -> Result<Option<f64>, ParseError> {
        if text == SENTINEL {
            return Ok(None);
        }

        let invalid = || ParseError::InvalidMeasurement {
            field,
            text: text.to_string(),
        };

        // plain decimal only: no exponent, no inf/nan, no leading '+'
        let digits = text.strip_prefix('-').unwrap_or(text);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(invalid());
        }

        text.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Some)
            .ok_or_else(invalid)
    }
}

impl Default for SensorLineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogParser for SensorLineParser {
    fn name(&self) -> &'static str {
        "sensor"
    }

    fn parse(&self, raw: &str) -> Result<LogRecord, ParseError> {
        if raw.trim().is_empty() {
            return Err(ParseError::Blank);
        }

        let caps = self
            .pattern
            .captures(raw)
            .ok_or(ParseError::StructureMismatch)?;

        // every group is mandatory in the pattern, so a match always has all five
        let group = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or("");

        let timestamp = self.timestamps.resolve(group(1))?;
        let status = group(2).to_string();
        let sensor_id = Self::parse_sensor_id(group(3))?;
        let temperature = Self::parse_measurement("temperature", group(4))?;
        let vibration = Self::parse_measurement("vibration", group(5))?;

        Ok(LogRecord {
            timestamp,
            status,
            sensor_id,
            temperature,
            vibration,
        })
    }
}
