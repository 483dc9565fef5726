//! Newtype wrappers for displaying groups of domain objects.

use std::fmt;

use serde::Serialize;

use crate::models::{ChangeHistoryEntry, Enhancement, PlanSummary};

/// An owner's plans, as produced by `Planner::list_plan_summaries`.
#[derive(Serialize)]
#[serde(transparent)]
pub struct PlanSummaries(pub Vec<PlanSummary>);

impl fmt::Display for PlanSummaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No plans found.");
        }
        for plan in &self.0 {
            write!(f, "{plan}")?;
        }
        Ok(())
    }
}

/// One-line-per-enhancement listing.
#[derive(Serialize)]
#[serde(transparent)]
pub struct Enhancements(pub Vec<Enhancement>);

impl fmt::Display for Enhancements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No enhancements found.");
        }
        for enhancement in &self.0 {
            writeln!(
                f,
                "- {} [{} / {}] {} change(s), {:.0}%: {}",
                enhancement.id,
                enhancement.kind,
                enhancement.status,
                enhancement.changes.len(),
                enhancement.confidence * 100.0,
                enhancement.rationale
            )?;
        }
        Ok(())
    }
}

/// History entries in the order given (newest first from `get_history`).
#[derive(Serialize)]
#[serde(transparent)]
pub struct History(pub Vec<ChangeHistoryEntry>);

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No history recorded.");
        }
        for entry in &self.0 {
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}
