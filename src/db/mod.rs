//! Database module
//!
//! Handles SQLite connection, migrations and column helpers.

pub mod columns;
pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
