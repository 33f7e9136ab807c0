//! Batch ingestion of equipment log files.
//!
//! A run reads the whole source, parses every line with a [`LogParser`] and
//! hands the records to a [`StorageGateway`] using one of two strategies:
//!
//! - [`IngestMode::Bulk`]: every line must parse, then all records are
//!   committed in a single transaction. Any failure persists nothing.
//! - [`IngestMode::Tolerant`]: each record is committed on its own. Lines
//!   that fail to parse or store are reported and skipped.
//!
//! This module is the only place that decides whether an error is fatal to
//! the batch, and the only place that logs.

pub mod bulk;
pub mod report;
pub mod tolerant;

pub use bulk::BulkStrategy;
pub use report::{FailureReason, IngestReport, LineFailure};
pub use tolerant::TolerantStrategy;

use crate::parser::{LogParser, ParseError, SensorLineParser};
use crate::storage::{StorageError, StorageGateway};
use crate::LogRecord;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read log source: {0}")]
    Read(#[from] std::io::Error),

    #[error("line {line_number} could not be parsed ({source}); no records were persisted")]
    Parse {
        line_number: usize,
        line: String,
        source: ParseError,
    },

    #[error("bulk insert of {records} records failed ({source}); no records were persisted")]
    Storage { records: usize, source: StorageError },

    #[error("ingest cancelled before commit; no records were persisted")]
    Cancelled,
}

// INGEST MODE //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestMode {
    #[default]
    Bulk,
    Tolerant,
}

impl IngestMode {
    pub fn strategy(&self) -> Box<dyn IngestStrategy> {
        match self {
            IngestMode::Bulk => Box::new(BulkStrategy),
            IngestMode::Tolerant => Box::new(TolerantStrategy),
        }
    }
}

impl FromStr for IngestMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bulk" => Ok(Self::Bulk),
            "tolerant" => Ok(Self::Tolerant),
            other => Err(format!("unknown ingest mode '{other}' (expected bulk or tolerant)")),
        }
    }
}

/// Run phases. Tolerant runs parse and persist line by line, so they stay in
/// `Persisting` while lines are still being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngestState {
    #[default]
    Idle,
    Reading,
    Parsing,
    Persisting,
    Done,
}

#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Parse all lines on the rayon pool before committing. Commit order is unchanged.
    pub parallel_parse: bool,

    /// Checked before each line or transaction.
    pub cancel: Option<Arc<AtomicBool>>,
}

// Everything a strategy needs for one run
pub struct IngestContext<'a> {
    pub parser: &'a dyn LogParser,
    pub gateway: &'a mut dyn StorageGateway,
    pub options: &'a IngestOptions,
    state: &'a mut IngestState,
}

impl<'a> IngestContext<'a> {
    pub fn enter(&mut self, next: IngestState) {
        debug!(from = ?self.state, to = ?next, "ingest state");
        *self.state = next;
    }

    pub fn is_cancelled(&self) -> bool {
        self.options
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Parse outcomes in source order, one per line.
    pub fn parse_lines<'l>(
        &self,
        lines: &'l [String],
    ) -> Box<dyn Iterator<Item = Result<LogRecord, ParseError>> + 'l>
    where
        'a: 'l,
    {
        let parser = self.parser;
        if self.options.parallel_parse {
            let parsed: Vec<_> = lines.par_iter().map(|line| parser.parse(line)).collect();
            Box::new(parsed.into_iter())
        } else {
            Box::new(lines.iter().map(move |line| parser.parse(line)))
        }
    }
}

pub trait IngestStrategy {
    fn mode(&self) -> IngestMode;
    fn run(&self, ctx: &mut IngestContext<'_>, lines: &[String]) -> Result<IngestReport, IngestError>;
}

// BATCH INGESTOR //

pub struct BatchIngestor<G> {
    parser: Box<dyn LogParser>,
    gateway: G,
    options: IngestOptions,
    state: IngestState,
}

impl<G: StorageGateway> BatchIngestor<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            parser: Box::new(SensorLineParser::new()),
            gateway,
            options: IngestOptions::default(),
            state: IngestState::Idle,
        }
    }

    pub fn with_parser(mut self, parser: Box<dyn LogParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> IngestState {
        self.state
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn into_gateway(self) -> G {
        self.gateway
    }

    pub fn ingest_path<P: AsRef<Path>>(
        &mut self,
        path: P,
        mode: IngestMode,
    ) -> Result<IngestReport, IngestError> {
        let file = File::open(path.as_ref())?;
        info!(path = %path.as_ref().display(), "reading log file");
        self.ingest(BufReader::new(file), mode)
    }

    pub fn ingest<R: BufRead>(&mut self, source: R, mode: IngestMode) -> Result<IngestReport, IngestError> {
        self.state = IngestState::Reading;
        // lines() already drops "\n" and "\r\n"
        let lines = source.lines().collect::<Result<Vec<_>, _>>()?;
        self.run(lines, mode)
    }

    pub fn ingest_lines<I, S>(&mut self, lines: I, mode: IngestMode) -> Result<IngestReport, IngestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.state = IngestState::Reading;
        let lines = lines
            .into_iter()
            .map(|line| line.as_ref().trim_end_matches(['\n', '\r']).to_string())
            .collect();
        self.run(lines, mode)
    }

    fn run(&mut self, lines: Vec<String>, mode: IngestMode) -> Result<IngestReport, IngestError> {
        let strategy = mode.strategy();
        info!(
            mode = ?strategy.mode(),
            parser = self.parser.name(),
            lines = lines.len(),
            parallel = self.options.parallel_parse,
            "starting ingest"
        );

        let mut ctx = IngestContext {
            parser: self.parser.as_ref(),
            gateway: &mut self.gateway,
            options: &self.options,
            state: &mut self.state,
        };
        let result = strategy.run(&mut ctx, &lines);
        ctx.enter(IngestState::Done);

        match &result {
            Ok(report) => info!(
                mode = ?mode,
                persisted = report.persisted,
                failed = report.failed_count(),
                cancelled = report.cancelled,
                "ingest finished"
            ),
            Err(err) => error!(mode = ?mode, error = %err, "ingest aborted"),
        }
        result
    }
}
