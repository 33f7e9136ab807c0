// Outcome of one ingestion run

use crate::parser::ParseError;
use crate::storage::StorageError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    Parse { message: String },
    Storage { message: String, integrity: bool },
}

impl FailureReason {
    pub fn message(&self) -> &str {
        match self {
            FailureReason::Parse { message } | FailureReason::Storage { message, .. } => message,
        }
    }
}

impl From<&ParseError> for FailureReason {
    fn from(err: &ParseError) -> Self {
        FailureReason::Parse {
            message: err.to_string(),
        }
    }
}

impl From<&StorageError> for FailureReason {
    fn from(err: &StorageError) -> Self {
        FailureReason::Storage {
            message: err.to_string(),
            integrity: err.is_integrity(),
        }
    }
}

/// A line that was not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineFailure {
    pub line_number: usize, // 1-based position in the source
    pub line: String,
    pub reason: FailureReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub persisted: usize,

    // always in source line order
    pub failed: Vec<LineFailure>,

    // run stopped early on request, committed rows stay committed
    #[serde(default)]
    pub cancelled: bool,
}

impl IngestReport {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }

    pub fn parse_failures(&self) -> impl Iterator<Item = &LineFailure> {
        self.failed
            .iter()
            .filter(|f| matches!(f.reason, FailureReason::Parse { .. }))
    }

    pub fn storage_failures(&self) -> impl Iterator<Item = &LineFailure> {
        self.failed
            .iter()
            .filter(|f| matches!(f.reason, FailureReason::Storage { .. }))
    }
}
