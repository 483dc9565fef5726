//! SQLite persistence for plans, enhancements, history and the mutation
//! queue.
//!
//! This module is the synchronous layer. [`crate::store::SqliteStore`] wraps
//! it behind the async repository traits and runs every call on the blocking
//! pool.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, StoreResult};

pub mod enhancement_queries;
pub mod history_queries;
pub mod migrations;
pub mod plan_queries;
pub mod queue_queries;
pub mod utils;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Opens a connection without touching the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .db_context("Failed to set busy timeout")?;
        Ok(Self { connection })
    }

    /// Opens a connection and creates or migrates the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = Self::open(path)?;
        db.initialize_schema()?;
        Ok(db)
    }
}
