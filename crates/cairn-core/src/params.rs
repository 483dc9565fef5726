//! Parameter structures for cairn operations.
//!
//! These are interface-agnostic: the CLI builds them from clap arguments,
//! other front ends can build them however they like. Each carries its own
//! `validate` so every entry point rejects malformed input the same way.

use std::collections::BTreeSet;

use crate::{
    error::{CairnError, Result},
    models::{ItemKind, ItemStatus, PlanItem, Schedule, StructuredContent, StructuredPatch, Timing},
};

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CairnError::invalid_input(field).with_reason("must not be empty"));
    }
    Ok(())
}

/// Parameters for creating a plan.
#[derive(Debug, Clone, Default)]
pub struct CreatePlan {
    pub owner_id: String,
    pub title: String,
    pub content: String,
    pub structured: StructuredContent,
}

impl CreatePlan {
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.structured.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn items(mut self, items: Vec<PlanItem>) -> Self {
        self.structured.items = items;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_text("owner_id", &self.owner_id)?;
        require_text("title", &self.title)?;
        for item in &self.structured.items {
            require_text("items.text", &item.text)?;
        }
        Ok(())
    }
}

/// Parameters for a partial plan update.
#[derive(Debug, Clone, Default)]
pub struct UpdatePlan {
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub structured: StructuredPatch,
    /// Reject the update unless the stored version still equals this
    pub expected_version: Option<u64>,
}

impl UpdatePlan {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.structured.tags = Some(tags.into_iter().map(Into::into).collect::<BTreeSet<_>>());
        self
    }

    pub fn goals(mut self, goals: Vec<String>) -> Self {
        self.structured.goals = Some(goals);
        self
    }

    pub fn schedule(mut self, schedule: Option<Schedule>) -> Self {
        self.structured.schedule = Some(schedule);
        self
    }

    pub fn items(mut self, items: Vec<PlanItem>) -> Self {
        self.structured.items = Some(items);
        self
    }

    pub fn expected_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.structured.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        require_text("id", &self.id)?;
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(items) = &self.structured.items {
            for item in items {
                require_text("items.text", &item.text)?;
            }
        }
        Ok(())
    }
}

/// Parameters for adding an item to a plan.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub text: String,
    pub kind: ItemKind,
    pub timing: Option<Timing>,
    pub status: ItemStatus,
    pub ai_generated: bool,
    /// Insert before the item currently at this position; append when
    /// absent or past the end
    pub position: Option<usize>,
}

impl NewItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn kind(mut self, kind: ItemKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn timing(mut self, timing: Timing) -> Self {
        self.timing = Some(timing);
        self
    }

    pub fn status(mut self, status: ItemStatus) -> Self {
        self.status = status;
        self
    }

    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_text("text", &self.text)
    }

    pub(crate) fn into_item(self) -> PlanItem {
        PlanItem {
            kind: self.kind,
            timing: self.timing,
            status: self.status,
            ai_generated: self.ai_generated,
            ..PlanItem::new(self.text)
        }
    }
}
