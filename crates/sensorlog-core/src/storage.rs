//! Storage seam for persisting parsed log records.
//!
//! Both operations are transactional: `insert_many` commits every record or
//! none, `insert_one` commits a single row.

use crate::LogRecord;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Uniqueness or foreign-key violation. Expected data problem, not an outage.
    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("storage error: {0}")]
    Other(String),
}

impl StorageError {
    pub fn is_integrity(&self) -> bool {
        matches!(self, StorageError::Integrity(_))
    }
}

pub trait StorageGateway {
    fn insert_many(&mut self, records: &[LogRecord]) -> Result<(), StorageError>;
    fn insert_one(&mut self, record: &LogRecord) -> Result<(), StorageError>;
}

impl<G: StorageGateway + ?Sized> StorageGateway for &mut G {
    fn insert_many(&mut self, records: &[LogRecord]) -> Result<(), StorageError> {
        (**self).insert_many(records)
    }

    fn insert_one(&mut self, record: &LogRecord) -> Result<(), StorageError> {
        (**self).insert_one(record)
    }
}

// In-memory gateway, used by tests and dry runs

/// Keeps committed records in a `Vec`. When a sensor set is configured, records
/// pointing at unknown sensors are rejected like a foreign-key violation.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    records: Vec<LogRecord>,
    known_sensors: Option<HashSet<u32>>,
    outage: Option<StorageError>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sensors(sensors: impl IntoIterator<Item = u32>) -> Self {
        Self {
            known_sensors: Some(sensors.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Every following call fails with `error` until cleared with `None`.
    pub fn set_outage(&mut self, error: Option<StorageError>) {
        self.outage = error;
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    fn check(&self, record: &LogRecord) -> Result<(), StorageError> {
        if let Some(err) = &self.outage {
            return Err(err.clone());
        }
        match &self.known_sensors {
            Some(known) if !known.contains(&record.sensor_id) => Err(StorageError::Integrity(
                format!("FOREIGN KEY constraint failed: unknown sensor {}", record.sensor_id),
            )),
            _ => Ok(()),
        }
    }
}

impl StorageGateway for MemoryGateway {
    fn insert_many(&mut self, records: &[LogRecord]) -> Result<(), StorageError> {
        // validate the whole batch before touching committed state
        for record in records {
            self.check(record)?;
        }
        self.records.extend_from_slice(records);
        Ok(())
    }

    fn insert_one(&mut self, record: &LogRecord) -> Result<(), StorageError> {
        self.check(record)?;
        self.records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(sensor_id: u32) -> LogRecord {
        LogRecord {
            timestamp: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            status: "OK".to_string(),
            sensor_id,
            temperature: Some(20.0),
            vibration: None,
        }
    }

    #[test]
    fn test_insert_many_is_all_or_nothing() {
        let mut gateway = MemoryGateway::with_sensors([1, 2]);
        let err = gateway.insert_many(&[record(1), record(3), record(2)]).unwrap_err();
        assert!(err.is_integrity());
        assert!(gateway.records().is_empty());

        gateway.insert_many(&[record(1), record(2)]).unwrap();
        assert_eq!(gateway.records().len(), 2);
    }

    #[test]
    fn test_outage() {
        let mut gateway = MemoryGateway::new();
        gateway.set_outage(Some(StorageError::Connection("database is locked".into())));
        assert!(!gateway.insert_one(&record(1)).unwrap_err().is_integrity());

        gateway.set_outage(None);
        gateway.insert_one(&record(1)).unwrap();
        assert_eq!(gateway.records().len(), 1);
    }

    #[test]
    fn test_mut_ref_forwards() {
        fn push<G: StorageGateway>(mut gateway: G, record: &LogRecord) {
            gateway.insert_one(record).unwrap();
        }

        let mut gateway = MemoryGateway::new();
        push(&mut gateway, &record(5));
        assert_eq!(gateway.records()[0].sensor_id, 5);
    }
}
