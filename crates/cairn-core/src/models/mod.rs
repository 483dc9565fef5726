//! Data models for plans, enhancements, history and the sync queue.
//!
//! A [`Plan`] exclusively owns its [`PlanItem`]s. An [`Enhancement`] is a
//! proposed batch of [`Change`]s against one plan; once a change is applied a
//! [`ChangeHistoryEntry`] records it together with the data needed to invert
//! it. [`SyncQueueItem`]s reference plans by identity only.
//!
//! Display implementations live in [`crate::display`].

pub mod batch;
pub mod calendar;
pub mod enhancement;
pub mod history;
pub mod item;
pub mod plan;
pub mod requests;
pub mod status;
pub mod summary;
pub mod sync;

#[cfg(test)]
mod tests;

pub use batch::{BatchFailure, BatchResult};
pub use calendar::CalendarEvent;
pub use enhancement::{Change, ChangeOperation, Enhancement, EnhancementKind};
pub use history::{ChangeHistoryEntry, RollbackData};
pub use item::{ItemKind, PlanItem, Timing};
pub use plan::{Plan, Schedule, StructuredContent};
pub use requests::{ItemPatch, StructuredPatch};
pub use status::{EnhancementStatus, ItemStatus};
pub use summary::PlanSummary;
pub use sync::{DrainReport, NewSyncItem, SyncOperation, SyncQueueItem, SyncQueueStatus};

/// Generates a fresh random identity.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
