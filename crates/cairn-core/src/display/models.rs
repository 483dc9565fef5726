//! Display implementations for domain models.

use std::fmt;

use serde_json::Value;

use super::datetime::{LocalDateTime, Slot};
use crate::models::{
    CalendarEvent, Change, ChangeHistoryEntry, ChangeOperation, Enhancement, EnhancementKind,
    EnhancementStatus, ItemKind, ItemStatus, Plan, PlanItem, PlanSummary, SyncOperation,
};

macro_rules! display_as_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(
    ItemStatus,
    ItemKind,
    EnhancementStatus,
    EnhancementKind,
    ChangeOperation,
    SyncOperation,
);

/// Compact single-line rendering of a JSON value.
struct Compact<'a>(&'a Value);

impl fmt::Display for Compact<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Object(map) => match map.get("text").and_then(Value::as_str) {
                Some(text) => write!(f, "item \"{text}\""),
                None => write!(f, "{}", self.0),
            },
            other => write!(f, "{other}"),
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.title)?;
        writeln!(f)?;

        writeln!(f, "- ID: {}", self.id)?;
        writeln!(f, "- Owner: {}", self.owner_id)?;
        writeln!(f, "- Version: {}", self.version)?;
        writeln!(f, "- Progress: {}%", self.completion_percentage())?;
        if !self.structured.tags.is_empty() {
            let tags: Vec<&str> = self.structured.tags.iter().map(String::as_str).collect();
            writeln!(f, "- Tags: {}", tags.join(", "))?;
        }
        if let Some(schedule) = &self.structured.schedule {
            let slot = Slot(schedule.starts_at, schedule.ends_at).to_string();
            match (&schedule.recurrence, slot.is_empty()) {
                (Some(rule), true) => writeln!(f, "- Schedule: {rule}")?,
                (Some(rule), false) => writeln!(f, "- Schedule: {slot} ({rule})")?,
                (None, false) => writeln!(f, "- Schedule: {slot}")?,
                (None, true) => {}
            }
        }
        writeln!(f, "- Created: {}", LocalDateTime(self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(self.updated_at))?;

        if !self.content.trim().is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.content.trim_end())?;
        }

        if !self.structured.goals.is_empty() {
            writeln!(f, "\n## Goals")?;
            writeln!(f)?;
            for goal in &self.structured.goals {
                writeln!(f, "- {goal}")?;
            }
        }

        if self.structured.items.is_empty() {
            writeln!(f, "\nNo items in this plan.")?;
        } else {
            writeln!(f, "\n## Items")?;
            writeln!(f)?;
            for item in &self.structured.items {
                write!(f, "{item}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for PlanItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. {} [{}] ({})",
            self.order + 1,
            self.text,
            self.kind,
            self.status.with_icon()
        )?;
        if self.ai_generated {
            write!(f, " *suggested*")?;
        }
        writeln!(f)?;
        writeln!(f, "   id: {}", self.id)?;
        if let Some(timing) = &self.timing {
            let slot = Slot(timing.start, timing.resolved_end()).to_string();
            if !slot.is_empty() {
                writeln!(f, "   when: {slot}")?;
            } else if let Some(minutes) = timing.duration_minutes {
                writeln!(f, "   takes: {minutes} min")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let progress = if self.total_items > 0 {
            format!(
                " ({}/{}, {}%)",
                self.completed_items, self.total_items, self.completion_percentage
            )
        } else {
            String::new()
        };

        writeln!(f, "## {}{progress}", self.title)?;
        writeln!(f)?;
        writeln!(f, "- **ID**: {} (v{})", self.id, self.version)?;
        writeln!(f, "- **Updated**: {}", LocalDateTime(self.updated_at))?;
        writeln!(f)
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.operation, self.target)?;
        match (self.operation, &self.old_value) {
            (ChangeOperation::Remove, _) => {}
            (_, Some(old)) => write!(f, ": {} → {}", Compact(old), Compact(&self.new_value))?,
            (_, None) => write!(f, ": {}", Compact(&self.new_value))?,
        }
        if let Some(confidence) = self.confidence {
            write!(f, " [{:.0}%]", confidence * 100.0)?;
        }
        writeln!(f)?;
        writeln!(f, "   {}", self.description)?;
        writeln!(f, "   id: {}", self.id)
    }
}

impl fmt::Display for Enhancement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "# {} enhancement ({}, {:.0}% confidence)",
            self.kind,
            self.status,
            self.confidence * 100.0
        )?;
        writeln!(f)?;
        writeln!(f, "- ID: {}", self.id)?;
        writeln!(f, "- Plan: {}", self.plan_id)?;
        writeln!(f, "- Proposed: {}", LocalDateTime(self.created_at))?;
        if let Some(at) = self.applied_at {
            writeln!(f, "- Applied: {}", LocalDateTime(at))?;
        }
        if let Some(at) = self.rejected_at {
            writeln!(f, "- Rejected: {}", LocalDateTime(at))?;
        }
        if let Some(feedback) = &self.feedback {
            writeln!(f, "- Feedback: {feedback}")?;
        }
        if !self.rationale.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.rationale)?;
        }

        writeln!(f, "\n## Changes")?;
        writeln!(f)?;
        for (index, change) in self.changes.iter().enumerate() {
            write!(f, "{}. {change}", index + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ChangeHistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_rollback { "↶ " } else { "" };
        writeln!(
            f,
            "- {marker}{} ({} by {})",
            self.description,
            LocalDateTime(self.applied_at),
            self.applied_by
        )?;
        match (&self.old_value, &self.new_value) {
            (Some(old), Some(new)) => writeln!(f, "  {} → {}", Compact(old), Compact(new))?,
            (None, Some(new)) => writeln!(f, "  added {}", Compact(new))?,
            (Some(old), None) => writeln!(f, "  removed {}", Compact(old))?,
            (None, None) => {}
        }
        write!(f, "  entry: {}", self.id)?;
        if let Some(undone) = &self.rolled_back_entry_id {
            write!(f, " (undoes {undone})")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} [{}] {}",
            Slot(Some(self.starts_at), self.ends_at),
            self.kind,
            self.title
        )
    }
}
