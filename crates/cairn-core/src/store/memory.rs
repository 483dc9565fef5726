//! In-process repositories.

use std::collections::HashMap;

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::Mutex;

use super::{CasOutcome, DocumentStore, EnhancementStore, MutationQueue};
use crate::{
    error::StoreResult,
    models::{ChangeHistoryEntry, Enhancement, NewSyncItem, Plan, SyncQueueItem},
};

#[derive(Default)]
struct State {
    plans: HashMap<String, Plan>,
    queue: Vec<SyncQueueItem>,
    enhancements: HashMap<String, Enhancement>,
    /// Application order is insertion order
    history: Vec<ChangeHistoryEntry>,
}

/// Keeps everything in memory; contents vanish with the value.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn initialize(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Plan>> {
        Ok(self.state.lock().await.plans.get(id).cloned())
    }

    async fn get_all_by_owner(&self, owner_id: &str) -> StoreResult<Vec<Plan>> {
        let state = self.state.lock().await;
        let mut plans: Vec<Plan> = state
            .plans
            .values()
            .filter(|plan| plan.owner_id == owner_id)
            .cloned()
            .collect();
        plans.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(plans)
    }

    async fn put(&self, plan: &Plan) -> StoreResult<()> {
        self.state
            .lock()
            .await
            .plans
            .insert(plan.id.clone(), plan.clone());
        Ok(())
    }

    async fn compare_and_put(
        &self,
        plan: &Plan,
        expected_version: u64,
    ) -> StoreResult<CasOutcome> {
        let mut state = self.state.lock().await;
        match state.plans.get(&plan.id).map(|stored| stored.version) {
            Some(actual) if actual == expected_version => {
                state.plans.insert(plan.id.clone(), plan.clone());
                Ok(CasOutcome::Written)
            }
            actual => Ok(CasOutcome::Conflict { actual }),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(self.state.lock().await.plans.remove(id).is_some())
    }
}

#[async_trait]
impl MutationQueue for MemoryStore {
    async fn enqueue(&self, item: NewSyncItem) -> StoreResult<SyncQueueItem> {
        let item = SyncQueueItem::from_new(item);
        self.state.lock().await.queue.push(item.clone());
        Ok(item)
    }

    async fn drain(&self) -> StoreResult<Vec<SyncQueueItem>> {
        let mut items = self.state.lock().await.queue.clone();
        // Stable sort keeps insertion order for equal timestamps.
        items.sort_by_key(|item| item.enqueued_at);
        Ok(items)
    }

    async fn update(&self, item: &SyncQueueItem) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if let Some(stored) = state.queue.iter_mut().find(|stored| stored.id == item.id) {
            stored.retry_count = item.retry_count;
            stored.next_attempt_at = item.next_attempt_at;
            stored.last_error = item.last_error.clone();
            stored.dead_lettered = item.dead_lettered;
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> StoreResult<()> {
        self.state.lock().await.queue.retain(|item| item.id != id);
        Ok(())
    }
}

#[async_trait]
impl EnhancementStore for MemoryStore {
    async fn save(&self, enhancement: &Enhancement) -> StoreResult<()> {
        self.state
            .lock()
            .await
            .enhancements
            .insert(enhancement.id.clone(), enhancement.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Enhancement>> {
        Ok(self.state.lock().await.enhancements.get(id).cloned())
    }

    async fn list_for_plan(&self, plan_id: &str) -> StoreResult<Vec<Enhancement>> {
        let state = self.state.lock().await;
        let mut enhancements: Vec<Enhancement> = state
            .enhancements
            .values()
            .filter(|e| e.plan_id == plan_id)
            .cloned()
            .collect();
        enhancements.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(enhancements)
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(self.state.lock().await.enhancements.remove(id).is_some())
    }

    async fn record_application(
        &self,
        enhancement: &Enhancement,
        entries: &[ChangeHistoryEntry],
    ) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state
            .enhancements
            .insert(enhancement.id.clone(), enhancement.clone());
        state.history.extend_from_slice(entries);
        Ok(())
    }

    async fn get_history_entry(&self, id: &str) -> StoreResult<Option<ChangeHistoryEntry>> {
        let state = self.state.lock().await;
        Ok(state.history.iter().find(|entry| entry.id == id).cloned())
    }

    async fn history_for_plan(&self, plan_id: &str) -> StoreResult<Vec<ChangeHistoryEntry>> {
        let state = self.state.lock().await;
        Ok(state
            .history
            .iter()
            .filter(|entry| entry.plan_id == plan_id)
            .cloned()
            .collect())
    }

    async fn history_for_enhancement(
        &self,
        enhancement_id: &str,
    ) -> StoreResult<Vec<ChangeHistoryEntry>> {
        let state = self.state.lock().await;
        Ok(state
            .history
            .iter()
            .filter(|entry| entry.enhancement_id == enhancement_id)
            .cloned()
            .collect())
    }

    async fn delete_history_before(
        &self,
        plan_id: &str,
        cutoff: Timestamp,
    ) -> StoreResult<usize> {
        let mut state = self.state.lock().await;
        let before = state.history.len();
        state
            .history
            .retain(|entry| entry.plan_id != plan_id || entry.applied_at >= cutoff);
        Ok(before - state.history.len())
    }
}
