//! Pending mutation records accumulated while offline.

use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::Plan;

/// Kind of queued mutation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
}

impl FromStr for SyncOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(SyncOperation::Create),
            "update" => Ok(SyncOperation::Update),
            "delete" => Ok(SyncOperation::Delete),
            _ => Err(format!("Invalid sync operation: {s}")),
        }
    }
}

impl SyncOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOperation::Create => "create",
            SyncOperation::Update => "update",
            SyncOperation::Delete => "delete",
        }
    }
}

/// What a caller hands to the queue; identity and timestamp are assigned on
/// enqueue.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSyncItem {
    pub operation: SyncOperation,
    pub plan_id: String,
    pub snapshot: Option<Plan>,
}

/// One durable pending mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncQueueItem {
    pub id: String,
    pub operation: SyncOperation,
    pub plan_id: String,

    /// Full post-mutation document (absent for deletes)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Plan>,

    pub enqueued_at: Timestamp,

    #[serde(default)]
    pub retry_count: u32,

    /// Earliest time the next replay may be attempted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_attempt_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    /// Exhausted its retries; kept for inspection, never replayed
    #[serde(default)]
    pub dead_lettered: bool,
}

impl SyncQueueItem {
    pub fn from_new(item: NewSyncItem) -> Self {
        Self {
            id: super::new_id(),
            operation: item.operation,
            plan_id: item.plan_id,
            snapshot: item.snapshot,
            enqueued_at: Timestamp::now(),
            retry_count: 0,
            next_attempt_at: None,
            last_error: None,
            dead_lettered: false,
        }
    }

    /// Whether a replay may be attempted at `now`.
    pub fn is_due(&self, now: Timestamp) -> bool {
        !self.dead_lettered && self.next_attempt_at.map_or(true, |at| at <= now)
    }
}

/// Observability snapshot of the queue.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SyncQueueStatus {
    /// Items still eligible for replay
    pub pending_count: usize,
    pub dead_letter_count: usize,
    pub items: Vec<SyncQueueItem>,
}

impl SyncQueueStatus {
    pub fn from_items(items: Vec<SyncQueueItem>) -> Self {
        let dead_letter_count = items.iter().filter(|item| item.dead_lettered).count();
        Self {
            pending_count: items.len() - dead_letter_count,
            dead_letter_count,
            items,
        }
    }
}

/// Outcome of one drain pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DrainReport {
    /// Items replayed and removed, in replay order
    pub replayed: Vec<String>,
    /// Item whose replay failed and stopped the pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<String>,
    /// Items moved to the dead-letter state during this pass
    pub dead_lettered: Vec<String>,
    /// Items left untouched because their backoff had not elapsed
    pub deferred: usize,
}
