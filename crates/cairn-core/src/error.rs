//! Error types for the cairn library.
//!
//! Two layers exist. Repository implementations raise [`StoreError`], which
//! only knows about storage mechanics. The planner and reviewer translate
//! those into [`CairnError`], the domain error every public operation
//! returns.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Low-level failure raised by a repository implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite rejected the statement or could not be reached
    #[error("{message}: {source}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Stored bytes could not be decoded, or a value could not be encoded
    #[error("Corrupt record {id}: {source}")]
    Corrupt {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    /// The blocking worker running the query was cancelled or panicked
    #[error("Storage task failed: {0}")]
    Task(String),
    /// The backing store is switched off or otherwise refusing work
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Comprehensive error type for all cairn operations.
#[derive(Error, Debug)]
pub enum CairnError {
    /// Plan not found for the given ID
    #[error("Plan with ID {id} not found")]
    PlanNotFound { id: String },
    /// Item not found inside an existing plan
    #[error("Item {item_id} not found in plan {plan_id}")]
    ItemNotFound { plan_id: String, item_id: String },
    /// Enhancement not found for the given ID
    #[error("Enhancement with ID {id} not found")]
    EnhancementNotFound { id: String },
    /// Change not found inside an existing enhancement
    #[error("Change {change_id} not found in enhancement {enhancement_id}")]
    ChangeNotFound {
        enhancement_id: String,
        change_id: String,
    },
    /// History entry not found for the given ID
    #[error("History entry with ID {id} not found")]
    HistoryEntryNotFound { id: String },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// The target is in a state that does not allow the operation
    #[error("Invalid state: {message}")]
    InvalidState { message: String },
    /// The stored version moved on since the caller read the document
    #[error("Version conflict on plan {id}: expected version {expected}, found {actual}")]
    VersionConflict {
        id: String,
        expected: u64,
        actual: u64,
    },
    /// Storage failure translated from the repository layer
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: StoreError,
    },
    /// A queued mutation could not be replayed
    #[error("Sync error: {message}")]
    Sync { message: String, retryable: bool },
    /// The suggestion generator failed
    #[error("Suggestion service error: {message}")]
    Service { message: String, retryable: bool },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> CairnError {
        CairnError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl CairnError {
    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    pub fn plan_not_found(id: impl Into<String>) -> Self {
        Self::PlanNotFound { id: id.into() }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Replay failure reported by a sync target.
    pub fn sync(message: impl Into<String>, retryable: bool) -> Self {
        Self::Sync {
            message: message.into(),
            retryable,
        }
    }

    /// Failure reported by a suggestion generator.
    pub fn service(message: impl Into<String>, retryable: bool) -> Self {
        Self::Service {
            message: message.into(),
            retryable,
        }
    }

    /// Stable lowercase tag for the error family, used in error events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PlanNotFound { .. }
            | Self::ItemNotFound { .. }
            | Self::EnhancementNotFound { .. }
            | Self::ChangeNotFound { .. }
            | Self::HistoryEntryNotFound { .. } => "not_found",
            Self::InvalidInput { .. } => "validation",
            Self::InvalidState { .. } => "invalid_state",
            Self::VersionConflict { .. } => "conflict",
            Self::Storage { .. } | Self::FileSystem { .. } => "storage",
            Self::Sync { .. } => "sync",
            Self::Service { .. } => "service",
            Self::Serialization { .. } => "serialization",
            Self::XdgDirectory(_) | Self::Configuration { .. } => "configuration",
        }
    }

    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Sync { retryable, .. } | Self::Service { retryable, .. } => *retryable,
            Self::Storage { .. } => true,
            _ => false,
        }
    }
}

/// Specialized extension trait for rusqlite Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> std::result::Result<T, StoreError>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> std::result::Result<T, StoreError> {
        self.map_err(|source| StoreError::Database {
            message: message.to_string(),
            source,
        })
    }
}

/// Extension trait translating repository failures into domain errors.
pub trait StoreResultExt<T> {
    /// Map store errors with a message describing the failed operation.
    fn store_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display;
}

impl<T> StoreResultExt<T> for std::result::Result<T, StoreError> {
    fn store_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display,
    {
        self.map_err(|source| CairnError::Storage {
            message: context.to_string(),
            source,
        })
    }
}

/// Result type alias for repository operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for cairn operations
pub type Result<T> = std::result::Result<T, CairnError>;
