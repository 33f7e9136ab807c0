use sensorlog_core::ingest::{FailureReason, IngestOptions};
use sensorlog_core::parser::ParseError;
use sensorlog_core::{BatchIngestor, IngestError, IngestMode, MemoryGateway, StorageError};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

// line 3 is malformed
const FIVE_LINES: [&str; 5] = [
    "[2023-05-01 12:00:00] OK sensor[1]: (temperature 21.0, vibration 0.3)",
    "[2023-05-01 12:05:00] WARN sensor[2]: (temperature 35.5, vibration err)",
    "[2023-05-01 12:10:00] ERROR sensor[x]: (temperature 90.0, vibration 1.1)",
    "[2023/05/02] OK sensor[1]: (temperature err, vibration 0.7)",
    "[2023-05-02 08:00:00] OK sensor[3]: (temperature 19.5, vibration 0.2)",
];

fn good_lines() -> Vec<&'static str> {
    FIVE_LINES
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 2)
        .map(|(_, l)| *l)
        .collect()
}

#[test]
fn test_bulk_aborts_on_malformed_line() {
    let mut ingestor = BatchIngestor::new(MemoryGateway::new());

    let err = ingestor.ingest_lines(FIVE_LINES, IngestMode::Bulk).unwrap_err();
    println!("Bulk error: {}", err);

    match &err {
        IngestError::Parse { line_number, line, source } => {
            assert_eq!(*line_number, 3);
            assert_eq!(line, FIVE_LINES[2]);
            assert_eq!(*source, ParseError::StructureMismatch);
        }
        other => panic!("expected parse error, got {other:?}"),
    }
    assert!(err.to_string().contains("line 3"));
    assert!(err.to_string().contains("no records were persisted"));
    assert!(ingestor.gateway().records().is_empty());
}

#[test]
fn test_tolerant_skips_malformed_line() {
    let mut ingestor = BatchIngestor::new(MemoryGateway::new());

    let report = ingestor.ingest_lines(FIVE_LINES, IngestMode::Tolerant).unwrap();

    assert_eq!(report.persisted, 4);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].line_number, 3);
    assert_eq!(report.failed[0].line, FIVE_LINES[2]);
    assert!(matches!(report.failed[0].reason, FailureReason::Parse { .. }));
    assert_eq!(ingestor.gateway().records().len(), 4);
}

#[test]
fn test_bulk_commits_clean_source() {
    let mut ingestor = BatchIngestor::new(MemoryGateway::new());

    let report = ingestor.ingest_lines(good_lines(), IngestMode::Bulk).unwrap();

    assert_eq!(report.persisted, 4);
    assert!(report.is_clean());
    let sensors: Vec<u32> = ingestor.gateway().records().iter().map(|r| r.sensor_id).collect();
    assert_eq!(sensors, vec![1, 2, 1, 3]);
}

#[test]
fn test_bulk_storage_failure_rolls_back() {
    // sensor 3 is unknown to storage
    let mut ingestor = BatchIngestor::new(MemoryGateway::with_sensors([1, 2]));

    let err = ingestor.ingest_lines(good_lines(), IngestMode::Bulk).unwrap_err();

    match err {
        IngestError::Storage { records, source } => {
            assert_eq!(records, 4);
            assert!(source.is_integrity());
        }
        other => panic!("expected storage error, got {other:?}"),
    }
    assert!(ingestor.gateway().records().is_empty());
}

#[test]
fn test_tolerant_storage_failure_is_line_local() {
    let mut ingestor = BatchIngestor::new(MemoryGateway::with_sensors([1, 2]));

    let report = ingestor.ingest_lines(FIVE_LINES, IngestMode::Tolerant).unwrap();

    assert_eq!(report.persisted, 3);
    let lines: Vec<usize> = report.failed.iter().map(|f| f.line_number).collect();
    assert_eq!(lines, vec![3, 5]);
    assert_eq!(report.parse_failures().count(), 1);
    match &report.failed[1].reason {
        FailureReason::Storage { integrity, .. } => assert!(*integrity),
        other => panic!("expected storage failure, got {other:?}"),
    }
}

#[test]
fn test_tolerant_connection_outage_reports_every_line() {
    let mut gateway = MemoryGateway::new();
    gateway.set_outage(Some(StorageError::Connection("database is locked".into())));
    let mut ingestor = BatchIngestor::new(gateway);

    let report = ingestor.ingest_lines(good_lines(), IngestMode::Tolerant).unwrap();

    assert_eq!(report.persisted, 0);
    assert_eq!(report.failed.len(), 4);
    assert!(report.storage_failures().all(|f| matches!(
        f.reason,
        FailureReason::Storage { integrity: false, .. }
    )));
}

#[test]
fn test_blank_lines_are_failures() {
    let source = "[2023/05/01] OK sensor[1]: (temperature 1.0, vibration 2.0)\n\
                  \n\
                  [2023/05/02] OK sensor[1]: (temperature 1.0, vibration 2.0)\n\
                  \n";
    let mut ingestor = BatchIngestor::new(MemoryGateway::new());

    let report = ingestor.ingest(source.as_bytes(), IngestMode::Tolerant).unwrap();

    assert_eq!(report.persisted, 2);
    let lines: Vec<usize> = report.failed.iter().map(|f| f.line_number).collect();
    assert_eq!(lines, vec![2, 4]);
    assert_eq!(report.failed[0].reason.message(), "blank line");
}

#[test]
fn test_parallel_parse_keeps_order() {
    let mut lines: Vec<String> = (0..500)
        .map(|i| {
            format!(
                "[2023-05-01 12:{:02}:00] OK sensor[{}]: (temperature {}.5, vibration err)",
                i % 60,
                i % 7 + 1,
                i
            )
        })
        .collect();
    lines[123] = "broken".to_string();
    lines[321] = "[2023-05-01 12:00:00] OK sensor[1]: (temperature hot, vibration err)".to_string();

    let sequential = BatchIngestor::new(MemoryGateway::new())
        .ingest_lines(&lines, IngestMode::Tolerant)
        .unwrap();

    let mut parallel = BatchIngestor::new(MemoryGateway::new()).with_options(IngestOptions {
        parallel_parse: true,
        ..IngestOptions::default()
    });
    let report = parallel.ingest_lines(&lines, IngestMode::Tolerant).unwrap();

    assert_eq!(report, sequential);
    assert_eq!(report.persisted, 498);
    let failed: Vec<usize> = report.failed.iter().map(|f| f.line_number).collect();
    assert_eq!(failed, vec![124, 322]);

    let temps: Vec<f64> = parallel
        .gateway()
        .records()
        .iter()
        .filter_map(|r| r.temperature)
        .collect();
    assert_eq!(temps[0], 0.5);
    assert_eq!(temps[1], 1.5);
}

#[test]
fn test_parallel_bulk_reports_first_failure() {
    let mut lines: Vec<String> = (0..200)
        .map(|_| "[2023/05/01] OK sensor[1]: (temperature 1.0, vibration 1.0)".to_string())
        .collect();
    lines[50] = "bad".to_string();
    lines[150] = "worse".to_string();

    let mut ingestor = BatchIngestor::new(MemoryGateway::new()).with_options(IngestOptions {
        parallel_parse: true,
        ..IngestOptions::default()
    });

    match ingestor.ingest_lines(&lines, IngestMode::Bulk) {
        Err(IngestError::Parse { line_number, .. }) => assert_eq!(line_number, 51),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_cancelled_tolerant_keeps_nothing_new() {
    let cancel = Arc::new(AtomicBool::new(true));
    let mut ingestor = BatchIngestor::new(MemoryGateway::new()).with_options(IngestOptions {
        cancel: Some(cancel.clone()),
        ..IngestOptions::default()
    });

    let report = ingestor.ingest_lines(good_lines(), IngestMode::Tolerant).unwrap();
    assert!(report.cancelled);
    assert_eq!(report.persisted, 0);
    assert!(!report.is_clean());

    match ingestor.ingest_lines(good_lines(), IngestMode::Bulk) {
        Err(IngestError::Cancelled) => {}
        other => panic!("expected cancellation, got {other:?}"),
    }
}

#[test]
fn test_read_error_surfaces() {
    let invalid_utf8: &[u8] = &[0x5b, 0xff, 0xfe, 0x0a];
    let mut ingestor = BatchIngestor::new(MemoryGateway::new());

    let err = ingestor.ingest(invalid_utf8, IngestMode::Tolerant).unwrap_err();
    assert!(matches!(err, IngestError::Read(_)));
}
