//! Immutable records of applied changes.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ChangeOperation;

/// The inverse edit of an applied change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RollbackData {
    pub operation: ChangeOperation,

    /// Stable path the inverse edit applies to
    pub target: String,

    /// Value the inverse edit writes back (`None` for removals)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Plan version produced by the application this entry records
    pub plan_version: u64,
}

/// Created once per applied change; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeHistoryEntry {
    pub id: String,
    pub enhancement_id: String,
    pub plan_id: String,
    pub change_id: String,
    pub applied_by: String,
    pub applied_at: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,

    pub description: String,

    pub rollback_data: RollbackData,

    /// Set on entries recording a rollback rather than a forward application
    #[serde(default)]
    pub is_rollback: bool,

    /// The entry this rollback undid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolled_back_entry_id: Option<String>,
}
