// Tolerant strategy: one transaction per record, bad lines are reported and skipped

use super::{
    FailureReason, IngestContext, IngestError, IngestMode, IngestReport, IngestState, IngestStrategy,
    LineFailure,
};
use tracing::{error, warn};

pub struct TolerantStrategy;

impl IngestStrategy for TolerantStrategy {
    fn mode(&self) -> IngestMode {
        IngestMode::Tolerant
    }

    fn run(&self, ctx: &mut IngestContext<'_>, lines: &[String]) -> Result<IngestReport, IngestError> {
        ctx.enter(IngestState::Parsing);
        let outcomes = ctx.parse_lines(lines);
        ctx.enter(IngestState::Persisting);

        let mut report = IngestReport::default();
        for (idx, (line, outcome)) in lines.iter().zip(outcomes).enumerate() {
            let line_number = idx + 1;

            if ctx.is_cancelled() {
                warn!(line = line_number, persisted = report.persisted, "ingest cancelled, committed rows are kept");
                report.cancelled = true;
                break;
            }

            let reason = match outcome {
                Err(err) => {
                    warn!(line = line_number, error = %err, "skipping unparseable line");
                    FailureReason::from(&err)
                }
                Ok(record) => match ctx.gateway.insert_one(&record) {
                    Ok(()) => {
                        report.persisted += 1;
                        continue;
                    }
                    Err(err) => {
                        error!(
                            line = line_number,
                            sensor_id = record.sensor_id,
                            integrity = err.is_integrity(),
                            error = %err,
                            "failed to store log line"
                        );
                        FailureReason::from(&err)
                    }
                },
            };

            report.failed.push(LineFailure {
                line_number,
                line: line.clone(),
                reason,
            });
        }

        Ok(report)
    }
}
