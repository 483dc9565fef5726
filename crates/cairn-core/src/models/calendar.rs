//! Calendar-shaped records handed to external calendar exporters.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{ItemKind, ItemStatus};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarEvent {
    pub plan_id: String,
    pub item_id: String,
    pub title: String,
    pub kind: ItemKind,
    pub starts_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<Timestamp>,
    pub status: ItemStatus,
}
