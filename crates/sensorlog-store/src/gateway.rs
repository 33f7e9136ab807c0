use rusqlite::{params, Connection, ErrorCode};
use sensorlog_core::{LogRecord, StorageError, StorageGateway};
use tracing::debug;

const INSERT_LOG: &str = r#"
    INSERT INTO equipment_failure_sensors (timestamp, status, temperature, vibration, sensor_id)
    VALUES (?1, ?2, ?3, ?4, ?5)
"#;

/// Writes log records into `equipment_failure_sensors`.
pub struct SqliteGateway<'c> {
    conn: &'c mut Connection,
}

impl<'c> SqliteGateway<'c> {
    pub fn new(conn: &'c mut Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &*self.conn
    }
}

// constraint failures are data problems, busy/locked/unopenable files are connection problems
pub fn storage_error(err: rusqlite::Error) -> StorageError {
    let message = err.to_string();
    match err.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => StorageError::Integrity(message),
        Some(
            ErrorCode::CannotOpen
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::NotADatabase
            | ErrorCode::ReadOnly,
        ) => StorageError::Connection(message),
        _ => StorageError::Other(message),
    }
}

fn insert(conn: &Connection, record: &LogRecord) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached(INSERT_LOG)?;
    stmt.execute(params![
        record.timestamp,
        record.status,
        record.temperature,
        record.vibration,
        record.sensor_id,
    ])?;
    Ok(())
}

impl StorageGateway for SqliteGateway<'_> {
    fn insert_many(&mut self, records: &[LogRecord]) -> Result<(), StorageError> {
        // dropping the transaction without commit rolls it back
        let tx = self.conn.transaction().map_err(storage_error)?;
        for record in records {
            insert(&tx, record).map_err(storage_error)?;
        }
        tx.commit().map_err(storage_error)?;

        debug!(records = records.len(), "log batch committed");
        Ok(())
    }

    fn insert_one(&mut self, record: &LogRecord) -> Result<(), StorageError> {
        let tx = self.conn.transaction().map_err(storage_error)?;
        insert(&tx, record).map_err(storage_error)?;
        tx.commit().map_err(storage_error)
    }
}
