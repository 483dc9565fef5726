//! SQLite-backed repositories.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use jiff::Timestamp;
use log::debug;
use tokio::{sync::OnceCell, task};

use super::{CasOutcome, DocumentStore, EnhancementStore, MutationQueue};
use crate::{
    db::Database,
    error::{StoreError, StoreResult},
    models::{ChangeHistoryEntry, Enhancement, NewSyncItem, Plan, SyncQueueItem},
};

/// One SQLite file holding plans, enhancements, history and the queue.
///
/// Every call opens its own connection on the blocking pool, so the store is
/// cheap to share and never blocks the async runtime.
pub struct SqliteStore {
    db_path: PathBuf,
    ready: OnceCell<()>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            db_path: path.as_ref().to_path_buf(),
            ready: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    async fn ensure_ready(&self) -> StoreResult<()> {
        self.ready
            .get_or_try_init(|| async {
                let path = self.db_path.clone();
                debug!("Initializing database at {}", path.display());
                task::spawn_blocking(move || Database::new(&path).map(|_| ()))
                    .await
                    .map_err(|e| StoreError::Task(e.to_string()))?
            })
            .await
            .map(|_| ())
    }

    /// Runs `f` against a fresh connection on the blocking pool.
    async fn run<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> StoreResult<T> + Send + 'static,
    {
        self.ensure_ready().await?;
        let path = self.db_path.clone();
        task::spawn_blocking(move || {
            let mut db = Database::open(&path)?;
            f(&mut db)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn initialize(&self) -> StoreResult<()> {
        self.ensure_ready().await
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Plan>> {
        let id = id.to_string();
        self.run(move |db| db.get_plan(&id)).await
    }

    async fn get_all_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Plan>> {
        let owner_id = owner_id.to_string();
        self.run(move |db| db.list_plans_by_owner(&owner_id)).await
    }

    async fn put(&self, plan: &Plan) -> StoreResult<()> {
        let plan = plan.clone();
        self.run(move |db| db.put_plan(&plan)).await
    }

    async fn compare_and_put(
        &self,
        plan: &Plan,
        expected_version: u64,
    ) -> StoreResult<CasOutcome> {
        let plan = plan.clone();
        self.run(move |db| db.compare_and_put_plan(&plan, expected_version))
            .await
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let id = id.to_string();
        self.run(move |db| db.delete_plan(&id)).await
    }
}

#[async_trait]
impl MutationQueue for SqliteStore {
    async fn enqueue(&self, item: NewSyncItem) -> StoreResult<SyncQueueItem> {
        let item = SyncQueueItem::from_new(item);
        self.run(move |db| {
            db.insert_mutation(&item)?;
            Ok(item)
        })
        .await
    }

    async fn drain(&self) -> StoreResult<Vec<SyncQueueItem>> {
        self.run(|db| db.list_mutations()).await
    }

    async fn update(&self, item: &SyncQueueItem) -> StoreResult<()> {
        let item = item.clone();
        self.run(move |db| db.update_mutation(&item)).await
    }

    async fn remove(&self, id: &str) -> StoreResult<()> {
        let id = id.to_string();
        self.run(move |db| db.delete_mutation(&id)).await
    }
}

#[async_trait]
impl EnhancementStore for SqliteStore {
    async fn save(&self, enhancement: &Enhancement) -> StoreResult<()> {
        let enhancement = enhancement.clone();
        self.run(move |db| db.put_enhancement(&enhancement)).await
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Enhancement>> {
        let id = id.to_string();
        self.run(move |db| db.get_enhancement(&id)).await
    }

    async fn list_for_plan(&self, plan_id: &str) -> StoreResult<Vec<Enhancement>> {
        let plan_id = plan_id.to_string();
        self.run(move |db| db.list_enhancements_for_plan(&plan_id))
            .await
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let id = id.to_string();
        self.run(move |db| db.delete_enhancement(&id)).await
    }

    async fn record_application(
        &self,
        enhancement: &Enhancement,
        entries: &[ChangeHistoryEntry],
    ) -> StoreResult<()> {
        let enhancement = enhancement.clone();
        let entries = entries.to_vec();
        self.run(move |db| db.record_application(&enhancement, &entries))
            .await
    }

    async fn get_history_entry(&self, id: &str) -> StoreResult<Option<ChangeHistoryEntry>> {
        let id = id.to_string();
        self.run(move |db| db.get_history_entry(&id)).await
    }

    async fn history_for_plan(&self, plan_id: &str) -> StoreResult<Vec<ChangeHistoryEntry>> {
        let plan_id = plan_id.to_string();
        self.run(move |db| db.history_for_plan(&plan_id)).await
    }

    async fn history_for_enhancement(
        &self,
        enhancement_id: &str,
    ) -> StoreResult<Vec<ChangeHistoryEntry>> {
        let enhancement_id = enhancement_id.to_string();
        self.run(move |db| db.history_for_enhancement(&enhancement_id))
            .await
    }

    async fn delete_history_before(
        &self,
        plan_id: &str,
        cutoff: Timestamp,
    ) -> StoreResult<usize> {
        let plan_id = plan_id.to_string();
        self.run(move |db| db.delete_history_before(&plan_id, cutoff))
            .await
    }
}
