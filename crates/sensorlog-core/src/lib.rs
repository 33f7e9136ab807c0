//! Core types for the sensor log seeder
//! this crate holds the log record model, the line parser and the batch ingestor.
pub mod ingest;
pub mod parser;
pub mod storage;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use ingest::{BatchIngestor, IngestError, IngestMode, IngestOptions, IngestReport};
pub use parser::{LogParser, ParseError, SensorLineParser, TimestampError, TimestampResolver};
pub use storage::{MemoryGateway, StorageError, StorageGateway};

// LOG RECORD //

/// One parsed equipment log line, ready to be persisted.
///
/// A record only exists fully populated: the parser either returns all
/// required fields or fails the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime, // when the sensor reported

    pub status: String, // uppercase status token (OK, WARN, ERROR...)

    pub sensor_id: u32, // must reference a known sensor, checked by storage

    #[serde(default)]
    pub temperature: Option<f64>, // None when the source said `err`

    #[serde(default)]
    pub vibration: Option<f64>, // same sentinel rule as temperature
}
