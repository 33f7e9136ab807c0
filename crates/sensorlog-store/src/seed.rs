//! First-run seeding.
//!
//! [`database_check`] walks the three datasets in dependency order. A dataset
//! whose table is missing gets its table created and its resource file loaded.
//! A table that already exists is left untouched, so re-running is a no-op.

use crate::error::SeedError;
use crate::gateway::SqliteGateway;
use crate::models::{Equipment, EquipmentSensor};
use crate::schema::{self, Table, EQUIPMENT, EQUIPMENT_FAILURE_SENSORS, EQUIPMENT_SENSORS};
use rusqlite::{params, Connection};
use sensorlog_core::ingest::IngestOptions;
use sensorlog_core::{BatchIngestor, IngestMode, IngestReport};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Equipment,
    Sensors,
    Logs,
}

impl Dataset {
    /// Parents before children, so foreign keys resolve.
    pub const ALL: [Dataset; 3] = [Dataset::Equipment, Dataset::Sensors, Dataset::Logs];

    pub fn table(&self) -> &'static Table {
        match self {
            Dataset::Equipment => &EQUIPMENT,
            Dataset::Sensors => &EQUIPMENT_SENSORS,
            Dataset::Logs => &EQUIPMENT_FAILURE_SENSORS,
        }
    }

    /// Resource file name, named after the table it fills.
    pub fn file_name(&self) -> String {
        let extension = match self {
            Dataset::Equipment => "json",
            Dataset::Sensors => "csv",
            Dataset::Logs => "txt",
        };
        format!("{}.{}", self.table().name, extension)
    }
}

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub resource_dir: PathBuf,
    pub mode: IngestMode,
    pub ingest: IngestOptions,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            resource_dir: PathBuf::from("resource"),
            mode: IngestMode::Bulk,
            ingest: IngestOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DatasetStatus {
    Seeded { rows: usize },
    AlreadyPresent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOutcome {
    pub dataset: Dataset,
    pub table: &'static str,
    #[serde(flatten)]
    pub status: DatasetStatus,
    // only for the log dataset
    pub report: Option<IngestReport>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeedSummary {
    pub datasets: Vec<DatasetOutcome>,
}

impl SeedSummary {
    pub fn seeded(&self) -> impl Iterator<Item = &DatasetOutcome> {
        self.datasets
            .iter()
            .filter(|d| matches!(d.status, DatasetStatus::Seeded { .. }))
    }
}

fn open(path: &Path) -> Result<BufReader<File>, SeedError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })
}

pub fn read_equipment(path: &Path) -> Result<Vec<Equipment>, SeedError> {
    Ok(serde_json::from_reader(open(path)?)?)
}

pub fn read_sensors(path: &Path) -> Result<Vec<EquipmentSensor>, SeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(open(path)?);
    let sensors = reader.deserialize().collect::<Result<Vec<EquipmentSensor>, _>>()?;
    Ok(sensors)
}

/// Creates the equipment table and fills it in one transaction.
pub fn seed_equipment(conn: &mut Connection, path: &Path) -> Result<usize, SeedError> {
    let equipment = read_equipment(path)?;

    let tx = conn.transaction()?;
    schema::create_table(&tx, &EQUIPMENT)?;
    {
        let mut stmt = tx.prepare("INSERT INTO equipment (equipment_id, name, group_name) VALUES (?1, ?2, ?3)")?;
        for item in &equipment {
            stmt.execute(params![item.equipment_id, item.name, item.group_name])?;
        }
    }
    tx.commit()?;

    Ok(equipment.len())
}

/// Creates the sensor table and fills it in one transaction.
pub fn seed_sensors(conn: &mut Connection, path: &Path) -> Result<usize, SeedError> {
    let sensors = read_sensors(path)?;

    let tx = conn.transaction()?;
    schema::create_table(&tx, &EQUIPMENT_SENSORS)?;
    {
        let mut stmt = tx.prepare("INSERT INTO equipment_sensors (sensor_id, equipment_id) VALUES (?1, ?2)")?;
        for sensor in &sensors {
            stmt.execute(params![sensor.sensor_id, sensor.equipment_id])?;
        }
    }
    tx.commit()?;

    Ok(sensors.len())
}

/// Creates the log table and loads the log file through the batch ingestor.
///
/// The table is created before ingestion starts; a bulk failure leaves it
/// empty rather than missing.
pub fn seed_logs(
    conn: &mut Connection,
    path: &Path,
    mode: IngestMode,
    options: &IngestOptions,
) -> Result<IngestReport, SeedError> {
    schema::create_table(conn, &EQUIPMENT_FAILURE_SENSORS)?;

    let mut ingestor = BatchIngestor::new(SqliteGateway::new(conn)).with_options(options.clone());
    let report = ingestor.ingest_path(path, mode)?;

    if !report.failed.is_empty() {
        warn!(
            persisted = report.persisted,
            failed = report.failed_count(),
            "log seed finished with skipped lines"
        );
    }
    Ok(report)
}

pub fn database_check(conn: &mut Connection, options: &SeedOptions) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();

    for dataset in Dataset::ALL {
        let table = dataset.table();
        if schema::has_table(conn, table.name)? {
            info!(table = table.name, "table present, skipping seed");
            summary.datasets.push(DatasetOutcome {
                dataset,
                table: table.name,
                status: DatasetStatus::AlreadyPresent,
                report: None,
            });
            continue;
        }

        let path = options.resource_dir.join(dataset.file_name());
        info!(table = table.name, path = %path.display(), "seeding table");

        let (rows, report) = match dataset {
            Dataset::Equipment => (seed_equipment(conn, &path)?, None),
            Dataset::Sensors => (seed_sensors(conn, &path)?, None),
            Dataset::Logs => {
                let report = seed_logs(conn, &path, options.mode, &options.ingest)?;
                (report.persisted, Some(report))
            }
        };

        info!(table = table.name, rows, "table seeded");
        summary.datasets.push(DatasetOutcome {
            dataset,
            table: table.name,
            status: DatasetStatus::Seeded { rows },
            report,
        });
    }

    Ok(summary)
}
