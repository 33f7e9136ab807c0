// Bulk strategy: parse everything, then one all-or-nothing transaction

use super::{IngestContext, IngestError, IngestMode, IngestReport, IngestState, IngestStrategy};
use tracing::{error, info};

pub struct BulkStrategy;

impl IngestStrategy for BulkStrategy {
    fn mode(&self) -> IngestMode {
        IngestMode::Bulk
    }

    fn run(&self, ctx: &mut IngestContext<'_>, lines: &[String]) -> Result<IngestReport, IngestError> {
        ctx.enter(IngestState::Parsing);

        let mut records = Vec::with_capacity(lines.len());
        for (idx, (line, outcome)) in lines.iter().zip(ctx.parse_lines(lines)).enumerate() {
            match outcome {
                Ok(record) => records.push(record),
                Err(source) => {
                    let line_number = idx + 1;
                    error!(line = line_number, error = %source, "bulk ingest aborted, nothing persisted");
                    return Err(IngestError::Parse {
                        line_number,
                        line: line.clone(),
                        source,
                    });
                }
            }
        }

        if ctx.is_cancelled() {
            return Err(IngestError::Cancelled);
        }

        ctx.enter(IngestState::Persisting);
        if let Err(source) = ctx.gateway.insert_many(&records) {
            error!(
                records = records.len(),
                integrity = source.is_integrity(),
                error = %source,
                "bulk transaction rolled back"
            );
            return Err(IngestError::Storage {
                records: records.len(),
                source,
            });
        }

        info!(persisted = records.len(), "bulk transaction committed");
        Ok(IngestReport {
            persisted: records.len(),
            ..IngestReport::default()
        })
    }
}
