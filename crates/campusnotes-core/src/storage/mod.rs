//! Storage layer
//!
//! SQLite-backed persistence for CampusNotes. Provides the connection pool
//! wrapper and versioned schema migrations.

pub mod database;
pub mod migrations;

pub use database::{Database, DatabaseConfig};
pub use migrations::{migration_status, run_migrations, MigrationStatus, CURRENT_VERSION};
