//! Plan item model definition.

use std::str::FromStr;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use super::ItemStatus;

/// Category tag of a plan item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Task,
    Event,
    Note,
    Reminder,
}

impl FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "task" => Ok(ItemKind::Task),
            "event" => Ok(ItemKind::Event),
            "note" => Ok(ItemKind::Note),
            "reminder" => Ok(ItemKind::Reminder),
            _ => Err(format!("Invalid item kind: {s}")),
        }
    }
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Task => "task",
            ItemKind::Event => "event",
            ItemKind::Note => "note",
            ItemKind::Reminder => "reminder",
        }
    }
}

/// Optional timing attached to an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Timing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

impl Timing {
    /// End of the slot: the explicit end, else start plus duration.
    pub fn resolved_end(&self) -> Option<Timestamp> {
        if self.end.is_some() {
            return self.end;
        }
        let start = self.start?;
        let minutes = self.duration_minutes?;
        start
            .checked_add(SignedDuration::from_mins(i64::from(minutes)))
            .ok()
    }
}

/// One ordered, typed entry inside a plan. Items have no identity outside
/// their parent plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanItem {
    /// Identifier, unique within the parent plan
    pub id: String,

    /// Display text
    pub text: String,

    #[serde(default)]
    pub kind: ItemKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,

    #[serde(default)]
    pub status: ItemStatus,

    /// Position within the plan (0-indexed, contiguous)
    #[serde(default)]
    pub order: u32,

    /// Whether the item was introduced by a suggestion
    #[serde(default)]
    pub ai_generated: bool,
}

impl PlanItem {
    /// Creates a pending task item with a fresh identity.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: super::new_id(),
            text: text.into(),
            kind: ItemKind::default(),
            timing: None,
            status: ItemStatus::default(),
            order: 0,
            ai_generated: false,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ItemStatus::Completed
    }
}
