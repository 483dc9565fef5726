//! Partial-update request types.
//!
//! Every field is optional; `None` leaves the stored value untouched. Nested
//! optionals (`Option<Option<_>>`) distinguish "leave alone" from "clear".

use std::collections::BTreeSet;

use super::{ItemKind, ItemStatus, PlanItem, Schedule, StructuredContent, Timing};

/// Field-by-field patch of a plan's structured payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredPatch {
    pub items: Option<Vec<PlanItem>>,
    pub tags: Option<BTreeSet<String>>,
    pub schedule: Option<Option<Schedule>>,
    pub goals: Option<Vec<String>>,
}

impl StructuredPatch {
    pub fn is_empty(&self) -> bool {
        self.items.is_none()
            && self.tags.is_none()
            && self.schedule.is_none()
            && self.goals.is_none()
    }

    /// Merges the patch into `target`, leaving unpatched fields intact.
    pub fn apply_to(self, target: &mut StructuredContent) {
        if let Some(items) = self.items {
            target.items = items;
        }
        if let Some(tags) = self.tags {
            target.tags = tags;
        }
        if let Some(schedule) = self.schedule {
            target.schedule = schedule;
        }
        if let Some(goals) = self.goals {
            target.goals = goals;
        }
    }
}

/// Partial update of a single plan item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub text: Option<String>,
    pub kind: Option<ItemKind>,
    pub timing: Option<Option<Timing>>,
    pub status: Option<ItemStatus>,
}

impl ItemPatch {
    pub fn status(status: ItemStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.kind.is_none() && self.timing.is_none() && self.status.is_none()
    }

    pub fn apply_to(self, item: &mut PlanItem) {
        if let Some(text) = self.text {
            item.text = text;
        }
        if let Some(kind) = self.kind {
            item.kind = kind;
        }
        if let Some(timing) = self.timing {
            item.timing = timing;
        }
        if let Some(status) = self.status {
            item.status = status;
        }
    }
}
