//! Core library for the Cairn plan engine.
//!
//! Cairn keeps versioned plan documents, reviews proposed enhancements to
//! them, records every applied change so it can be rolled back, and queues
//! mutations made while offline for later replay.
//!
//! # Layout
//!
//! - **Models** ([`models`]): plans, items, enhancements, history entries
//!   and sync queue records
//! - **Stores** ([`store`]): the document, enhancement and queue seams with
//!   SQLite and in-memory implementations
//! - **Planner** ([`planner`]): versioned plan mutations, change
//!   notifications and offline sync
//! - **Review** ([`review`]): approve, reject, edit and roll back
//!   enhancements
//! - **Display** ([`display`]): markdown-flavoured [`std::fmt::Display`]
//!   output shared by every front end
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cairn_core::{CreatePlan, NewItem, PlannerBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let planner = PlannerBuilder::new()
//!     .with_database_path(Some("cairn.db"))
//!     .build()
//!     .await?;
//!
//! let plan = planner
//!     .create_plan(&CreatePlan::new("user-1", "Morning Routine").tags(["daily"]))
//!     .await?;
//! let plan = planner.add_item(&plan.id, NewItem::new("Stretch")).await?;
//! println!("{plan}");
//!
//! let history = planner.reviewer().get_history(&plan.id).await?;
//! assert!(history.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod db;
pub mod display;
pub mod error;
pub mod events;
pub mod models;
pub mod params;
pub mod path;
pub mod planner;
pub mod review;
pub mod store;

// Re-export commonly used types
pub use cache::PlanCache;
pub use db::Database;
pub use display::{Enhancements, History, LocalDateTime, PlanSummaries};
pub use error::{CairnError, Result, StoreError};
pub use events::{Event, EventName, Notifier, Subscription};
pub use models::{
    BatchResult, Change, ChangeHistoryEntry, ChangeOperation, DrainReport, Enhancement,
    EnhancementKind, EnhancementStatus, ItemKind, ItemStatus, Plan, PlanItem, PlanSummary,
    SyncOperation, SyncQueueItem, SyncQueueStatus,
};
pub use params::{CreatePlan, NewItem, UpdatePlan};
pub use planner::{LocalSyncTarget, Planner, PlannerBuilder, SyncPolicy, SyncTarget};
pub use review::{RetryPolicy, Reviewer, SuggestionGenerator, SuggestionOptions};
pub use store::{MemoryStore, SqliteStore, Stores};
