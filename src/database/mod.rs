//! Database layer
//!
//! Handles SQLite access for the bundled row store:
//! - Connection management
//! - Catalog and row queries
//! - Cell values and insert templates
//! - Sample schema for in-memory databases

pub mod models;
pub mod schema;
pub mod connection;
pub mod queries;

pub use connection::Database;
pub use models::*;
