//! log line parsing - turn raw equipment log lines into [`LogRecord`]s

pub mod sensor;
pub mod timestamp;

pub use sensor::SensorLineParser;
pub use timestamp::{TimestampError, TimestampFormat, TimestampResolver, DEFAULT_FORMATS};

use crate::LogRecord;
use thiserror::Error;

// parse error type, always local to the line that produced it
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("blank line")]
    Blank,

    #[error("structure mismatch")]
    StructureMismatch,

    #[error(transparent)]
    Timestamp(#[from] TimestampError),

    #[error("invalid sensor id '{0}'")]
    InvalidSensorId(String),

    #[error("invalid {field} value '{text}'")]
    InvalidMeasurement { field: &'static str, text: String },
}

// Parser trait - pure and stateless, so one instance can be shared across threads

pub trait LogParser: Send + Sync {
    fn name(&self) -> &'static str;
    fn parse(&self, raw: &str) -> Result<LogRecord, ParseError>;
}
