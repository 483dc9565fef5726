//! Repository traits the planner and reviewer are built on.
//!
//! All operations are asynchronous and may fail with a [`StoreError`].
//! Implementations never mutate the values handed to them. Two backends ship
//! with the crate: [`SqliteStore`] for durable storage and [`MemoryStore`]
//! for tests and throwaway sessions.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;

use crate::{
    error::StoreResult,
    models::{ChangeHistoryEntry, Enhancement, NewSyncItem, Plan, SyncQueueItem},
};

pub mod memory;
pub mod sqlite;

pub use crate::db::plan_queries::CasOutcome;
pub use crate::error::StoreError;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Durable plan documents, secondary-indexed by owner.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Prepares the backend. Idempotent and safe to call concurrently; the
    /// other operations call it implicitly.
    async fn initialize(&self) -> StoreResult<()>;

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Plan>>;

    /// An owner's plans, most recently updated first.
    async fn get_all_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Plan>>;

    /// Full upsert.
    async fn put(&self, plan: &Plan) -> StoreResult<()>;

    /// Replaces the stored plan only if its version is `expected_version`.
    async fn compare_and_put(&self, plan: &Plan, expected_version: u64)
        -> StoreResult<CasOutcome>;

    /// Returns whether a document was removed.
    async fn delete(&self, id: &str) -> StoreResult<bool>;
}

/// Durable FIFO of mutations committed while offline.
#[async_trait]
pub trait MutationQueue: Send + Sync {
    /// Assigns identity and timestamp, then appends.
    async fn enqueue(&self, item: NewSyncItem) -> StoreResult<SyncQueueItem>;

    /// All queued items, oldest first. Nothing is removed.
    async fn drain(&self) -> StoreResult<Vec<SyncQueueItem>>;

    /// Persists retry bookkeeping (`retry_count`, `next_attempt_at`,
    /// `last_error`, `dead_lettered`).
    async fn update(&self, item: &SyncQueueItem) -> StoreResult<()>;

    async fn remove(&self, id: &str) -> StoreResult<()>;
}

/// Enhancements and their append-only change history.
#[async_trait]
pub trait EnhancementStore: Send + Sync {
    async fn save(&self, enhancement: &Enhancement) -> StoreResult<()>;

    async fn get(&self, id: &str) -> StoreResult<Option<Enhancement>>;

    /// A plan's enhancements, newest first.
    async fn list_for_plan(&self, plan_id: &str) -> StoreResult<Vec<Enhancement>>;

    async fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Saves the enhancement and appends `entries` atomically.
    async fn record_application(
        &self,
        enhancement: &Enhancement,
        entries: &[ChangeHistoryEntry],
    ) -> StoreResult<()>;

    async fn get_history_entry(&self, id: &str) -> StoreResult<Option<ChangeHistoryEntry>>;

    /// A plan's history in application order.
    async fn history_for_plan(&self, plan_id: &str) -> StoreResult<Vec<ChangeHistoryEntry>>;

    /// An enhancement's history in application order.
    async fn history_for_enhancement(
        &self,
        enhancement_id: &str,
    ) -> StoreResult<Vec<ChangeHistoryEntry>>;

    /// Deletes a plan's entries applied before `cutoff`; returns the count.
    async fn delete_history_before(&self, plan_id: &str, cutoff: Timestamp)
        -> StoreResult<usize>;
}

/// The three repositories a planner is wired with.
#[derive(Clone)]
pub struct Stores {
    pub documents: Arc<dyn DocumentStore>,
    pub queue: Arc<dyn MutationQueue>,
    pub enhancements: Arc<dyn EnhancementStore>,
}

impl Stores {
    /// Uses one backend for all three repositories.
    pub fn shared<S>(store: S) -> Self
    where
        S: DocumentStore + MutationQueue + EnhancementStore + 'static,
    {
        let store = Arc::new(store);
        Self {
            documents: store.clone(),
            queue: store.clone(),
            enhancements: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::shared(MemoryStore::new())
    }
}
