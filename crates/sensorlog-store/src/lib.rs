//! SQLite persistence for the sensor log seeder
//! schema, the log storage gateway and the first-run seed loaders.

pub mod database;
pub mod error;
pub mod gateway;
pub mod models;
pub mod schema;
pub mod seed;

pub use database::DatabaseUri;
pub use error::SeedError;
pub use gateway::SqliteGateway;
pub use models::{Equipment, EquipmentSensor};
pub use seed::{database_check, Dataset, DatasetOutcome, DatasetStatus, SeedOptions, SeedSummary};
