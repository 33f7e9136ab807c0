// Connection string handling
// Accepts the sqlalchemy-style form: sqlite:///relative.db, sqlite:////abs/path.db, sqlite:// (memory)

use crate::error::SeedError;
use rusqlite::Connection;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_DATABASE_URI: &str = "sqlite:///database.sqlite";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUri {
    Memory,
    File(PathBuf),
}

impl FromStr for DatabaseUri {
    type Err = SeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if matches!(s, ":memory:" | "sqlite://" | "sqlite:///:memory:") {
            return Ok(Self::Memory);
        }

        let path = s
            .strip_prefix("sqlite:///")
            .or_else(|| s.strip_prefix("sqlite://"));
        match path {
            Some(p) if !p.is_empty() => Ok(Self::File(PathBuf::from(p))),
            Some(_) => Ok(Self::Memory),
            None if s.contains("://") || s.is_empty() => Err(SeedError::UnsupportedUri(s.to_string())),
            // bare path
            None => Ok(Self::File(PathBuf::from(s))),
        }
    }
}

impl DatabaseUri {
    pub fn open(&self) -> Result<Connection, SeedError> {
        let conn = match self {
            DatabaseUri::Memory => Connection::open_in_memory()?,
            DatabaseUri::File(path) => Connection::open(path)?,
        };
        conn.busy_timeout(Duration::from_secs(5))?;
        // sqlite ships with FK checks off
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        info!(database = ?self, "database opened");
        Ok(conn)
    }
}
