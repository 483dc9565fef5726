//! Plan model definition and related functionality.

use std::collections::BTreeSet;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{CalendarEvent, PlanItem};

/// Optional schedule window of a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<Timestamp>,

    /// Free-form recurrence rule ("daily", "weekdays", an RRULE, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,
}

/// Structured payload of a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StructuredContent {
    #[serde(default)]
    pub items: Vec<PlanItem>,

    #[serde(default)]
    pub tags: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,

    #[serde(default)]
    pub goals: Vec<String>,
}

/// A versioned plan document.
///
/// `version` grows by exactly one on every committed mutation and
/// `updated_at` never precedes `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Unique identifier for the plan
    pub id: String,

    /// Owning user reference
    pub owner_id: String,

    /// Title of the plan
    pub title: String,

    /// Free-text content
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub structured: StructuredContent,

    pub version: u64,

    /// Timestamp when the plan was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the plan was last modified (UTC)
    pub updated_at: Timestamp,
}

impl Plan {
    /// Synthesizes a fresh plan at version 1.
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            id: super::new_id(),
            owner_id: owner_id.into(),
            title: title.into(),
            content: String::new(),
            structured: StructuredContent::default(),
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn items(&self) -> &[PlanItem] {
        &self.structured.items
    }

    pub fn item(&self, item_id: &str) -> Option<&PlanItem> {
        self.structured.items.iter().find(|item| item.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut PlanItem> {
        self.structured
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
    }

    /// Rewrites every item's `order` to its position, restoring the
    /// contiguous 0..n-1 sequence.
    pub fn reindex_items(&mut self) {
        for (position, item) in self.structured.items.iter_mut().enumerate() {
            item.order = position as u32;
        }
    }

    /// Bumps the version by one and refreshes `updated_at`.
    pub fn stamp(&mut self) {
        self.version += 1;
        let now = Timestamp::now();
        self.updated_at = if now < self.created_at {
            self.created_at
        } else {
            now
        };
    }

    /// Share of completed items, rounded to the nearest whole percent.
    /// Empty plans report 0.
    pub fn completion_percentage(&self) -> u8 {
        let total = self.structured.items.len();
        if total == 0 {
            return 0;
        }
        let completed = self
            .structured
            .items
            .iter()
            .filter(|item| item.is_completed())
            .count();
        ((completed as f64 * 100.0) / total as f64).round() as u8
    }

    /// Calendar-shaped records for every item that has a start time.
    pub fn calendar_events(&self) -> Vec<CalendarEvent> {
        self.structured
            .items
            .iter()
            .filter_map(|item| {
                let timing = item.timing.as_ref()?;
                let starts_at = timing.start?;
                Some(CalendarEvent {
                    plan_id: self.id.clone(),
                    item_id: item.id.clone(),
                    title: item.text.clone(),
                    kind: item.kind,
                    starts_at,
                    ends_at: timing.resolved_end(),
                    status: item.status,
                })
            })
            .collect()
    }
}
