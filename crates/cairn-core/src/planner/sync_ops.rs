//! Connectivity tracking and replay of the mutation queue.
//!
//! Mutations committed while offline land in the [`MutationQueue`] as full
//! post-mutation snapshots. A drain pass replays them against a
//! [`SyncTarget`] strictly oldest first. The first failing item stops the
//! pass so later mutations of the same plan are never replayed ahead of it;
//! the failure is recorded on the item with an exponential backoff. Items
//! that exhaust [`SyncPolicy::max_retries`], or fail with a non-retryable
//! error, are dead-lettered: kept for inspection and skipped from then on.
//!
//! [`MutationQueue`]: crate::store::MutationQueue

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use log::{debug, info, warn};

use super::Planner;
use crate::{
    error::{CairnError, Result, StoreResultExt},
    events::{ErrorEvent, Event},
    models::{DrainReport, SyncQueueItem, SyncQueueStatus},
};

/// Destination queued mutations are replayed against.
#[async_trait]
pub trait SyncTarget: Send + Sync {
    /// Delivers one mutation. Errors should be [`CairnError::sync`] with
    /// `retryable` set when a later attempt may succeed.
    async fn push(&self, item: &SyncQueueItem) -> Result<()>;
}

/// Accepts every mutation without sending it anywhere. With only local
/// storage configured, replaying simply empties the queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSyncTarget;

#[async_trait]
impl SyncTarget for LocalSyncTarget {
    async fn push(&self, item: &SyncQueueItem) -> Result<()> {
        debug!(
            "Acknowledged {} of plan {} locally",
            item.operation.as_str(),
            item.plan_id
        );
        Ok(())
    }
}

/// Retry bookkeeping for failed replays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncPolicy {
    /// Failed attempts after which an item is dead-lettered
    pub max_retries: u32,
    /// Delay after the first failure; doubled for each further one
    pub base_backoff: SignedDuration,
    pub max_backoff: SignedDuration,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_backoff: SignedDuration::from_secs(1),
            max_backoff: SignedDuration::from_mins(5),
        }
    }
}

impl SyncPolicy {
    /// Rejects policies that could never replay or never back off.
    pub fn validate(&self) -> Result<()> {
        let problem = if self.max_retries == 0 {
            Some("max_retries must be at least 1".to_string())
        } else if self.base_backoff.is_negative() || self.max_backoff.is_negative() {
            Some("backoff durations must not be negative".to_string())
        } else if self.base_backoff > self.max_backoff {
            Some(format!(
                "base_backoff {:?} exceeds max_backoff {:?}",
                self.base_backoff, self.max_backoff
            ))
        } else {
            None
        };
        match problem {
            Some(message) => Err(CairnError::Configuration { message }),
            None => Ok(()),
        }
    }

    /// Delay before the next attempt of an item that has failed
    /// `retry_count` times.
    pub fn backoff(&self, retry_count: u32) -> SignedDuration {
        let exponent = retry_count.saturating_sub(1).min(20);
        self.base_backoff
            .checked_mul(1_i32 << exponent)
            .map_or(self.max_backoff, |delay| delay.min(self.max_backoff))
    }
}

impl Planner {
    /// Switches connectivity. Coming back online triggers a drain pass,
    /// whose report is returned.
    pub async fn set_online(&self, online: bool) -> Result<Option<DrainReport>> {
        let was_online = self.online.swap(online, std::sync::atomic::Ordering::SeqCst);
        if online && !was_online {
            info!("Back online, replaying queued mutations");
            return self.drain_queue().await.map(Some);
        }
        if !online && was_online {
            info!("Offline, queueing mutations");
        }
        Ok(None)
    }

    pub async fn get_sync_queue_status(&self) -> Result<SyncQueueStatus> {
        let result = self
            .stores
            .queue
            .drain()
            .await
            .store_context("Failed to read sync queue");
        self.report("get_sync_queue_status", result)
            .map(SyncQueueStatus::from_items)
    }

    /// Replays due items oldest first; see the module docs for the failure
    /// policy. Concurrent calls are serialized.
    pub async fn drain_queue(&self) -> Result<DrainReport> {
        let _guard = self.drain_lock.lock().await;
        let result = self.drain_queue_inner().await;
        self.report("drain_queue", result)
    }

    async fn drain_queue_inner(&self) -> Result<DrainReport> {
        let items = self
            .stores
            .queue
            .drain()
            .await
            .store_context("Failed to read sync queue")?;
        let mut report = DrainReport::default();
        let now = Timestamp::now();

        let mut pending = items.into_iter().filter(|item| !item.dead_lettered);
        while let Some(mut item) = pending.next() {
            if !item.is_due(now) {
                report.deferred = 1 + pending.by_ref().count();
                break;
            }

            match self.sync_target.push(&item).await {
                Ok(()) => {
                    self.stores
                        .queue
                        .remove(&item.id)
                        .await
                        .store_context(format!("Failed to remove queued item {}", item.id))?;
                    report.replayed.push(item.id);
                }
                Err(err) => {
                    item.retry_count += 1;
                    item.last_error = Some(err.to_string());

                    if !err.is_retryable() || item.retry_count >= self.sync_policy.max_retries {
                        warn!("Dead-lettering {} after {} attempts: {err}", item.id, item.retry_count);
                        item.dead_lettered = true;
                        item.next_attempt_at = None;
                        self.persist_retry_state(&item).await?;
                        report.dead_lettered.push(item.id);
                        continue;
                    }

                    let delay = self.sync_policy.backoff(item.retry_count);
                    item.next_attempt_at = Some(now.checked_add(delay).unwrap_or(now));
                    warn!("Replay of {} failed, retrying in {delay:?}: {err}", item.id);
                    self.persist_retry_state(&item).await?;

                    self.notifier
                        .publish(&Event::Error(ErrorEvent::from_error("drain_queue", &err)));
                    report.deferred = pending.by_ref().count();
                    report.failed = Some(item.id);
                    break;
                }
            }
        }

        debug!(
            "Drain pass: {} replayed, {} dead-lettered, {} deferred",
            report.replayed.len(),
            report.dead_lettered.len(),
            report.deferred
        );
        Ok(report)
    }

    async fn persist_retry_state(&self, item: &SyncQueueItem) -> Result<()> {
        self.stores
            .queue
            .update(item)
            .await
            .store_context(format!("Failed to update queued item {}", item.id))
    }

    /// Drops every dead-lettered item from the queue; returns how many.
    pub async fn purge_dead_letters(&self) -> Result<usize> {
        let result = self.purge_dead_letters_inner().await;
        self.report("purge_dead_letters", result)
    }

    async fn purge_dead_letters_inner(&self) -> Result<usize> {
        let items = self
            .stores
            .queue
            .drain()
            .await
            .store_context("Failed to read sync queue")?;
        let mut purged = 0;
        for item in items.iter().filter(|item| item.dead_lettered) {
            self.stores
                .queue
                .remove(&item.id)
                .await
                .store_context(format!("Failed to remove queued item {}", item.id))?;
            purged += 1;
        }
        Ok(purged)
    }
}
