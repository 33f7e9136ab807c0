// Table definitions, created in dependency order: equipment -> sensors -> logs

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    ddl: &'static str,
}

pub const EQUIPMENT: Table = Table {
    name: "equipment",
    ddl: r#"
        CREATE TABLE equipment (
            equipment_id INTEGER PRIMARY KEY NOT NULL UNIQUE,
            name         TEXT,
            group_name   TEXT
        )
    "#,
};

pub const EQUIPMENT_SENSORS: Table = Table {
    name: "equipment_sensors",
    ddl: r#"
        CREATE TABLE equipment_sensors (
            sensor_id    INTEGER PRIMARY KEY NOT NULL UNIQUE,
            equipment_id INTEGER REFERENCES equipment (equipment_id),
            UNIQUE (sensor_id, equipment_id)
        )
    "#,
};

pub const EQUIPMENT_FAILURE_SENSORS: Table = Table {
    name: "equipment_failure_sensors",
    ddl: r#"
        CREATE TABLE equipment_failure_sensors (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp   DATETIME,
            status      TEXT,
            temperature REAL,
            vibration   REAL,
            sensor_id   INTEGER REFERENCES equipment_sensors (sensor_id)
        )
    "#,
};

pub fn has_table(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn create_table(conn: &Connection, table: &Table) -> rusqlite::Result<()> {
    conn.execute_batch(table.ddl)?;
    info!(table = table.name, "table created");
    Ok(())
}

pub fn row_count(conn: &Connection, table: &Table) -> rusqlite::Result<usize> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table.name), [], |row| row.get(0))?;
    Ok(count as usize)
}
