//! Database layer
//!
//! Provides the connection-pool abstraction, embedded migrations, and the
//! repositories for the SportsHub backend. Both SQLite (default, single-file
//! deployment) and MySQL are supported; the driver is selected by
//! configuration.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DatabasePool, DynDatabasePool};
