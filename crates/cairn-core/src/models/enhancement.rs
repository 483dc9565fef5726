//! Proposed change batches and their individual changes.

use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::EnhancementStatus;

/// What aspect of a plan an enhancement targets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementKind {
    #[default]
    Structure,
    Schedule,
    Categorization,
    Optimization,
}

impl FromStr for EnhancementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "structure" => Ok(EnhancementKind::Structure),
            "schedule" => Ok(EnhancementKind::Schedule),
            "categorization" => Ok(EnhancementKind::Categorization),
            "optimization" => Ok(EnhancementKind::Optimization),
            _ => Err(format!("Invalid enhancement kind: {s}")),
        }
    }
}

impl EnhancementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnhancementKind::Structure => "structure",
            EnhancementKind::Schedule => "schedule",
            EnhancementKind::Categorization => "categorization",
            EnhancementKind::Optimization => "optimization",
        }
    }
}

/// Operation tag of a single change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOperation {
    Add,
    Modify,
    Remove,
}

impl FromStr for ChangeOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add" => Ok(ChangeOperation::Add),
            "modify" => Ok(ChangeOperation::Modify),
            "remove" => Ok(ChangeOperation::Remove),
            _ => Err(format!("Invalid change operation: {s}")),
        }
    }
}

impl ChangeOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeOperation::Add => "add",
            ChangeOperation::Modify => "modify",
            ChangeOperation::Remove => "remove",
        }
    }
}

/// One atomic proposed edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Change {
    /// Stable identity, assigned when the enhancement is constructed or saved
    #[serde(default)]
    pub id: String,

    pub operation: ChangeOperation,

    /// Path of the affected field or element, e.g. `/structured/tags`
    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,

    /// Proposed value (`null` for removals)
    #[serde(default)]
    pub new_value: Value,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Change {
    pub fn new(
        operation: ChangeOperation,
        target: impl Into<String>,
        new_value: Value,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: super::new_id(),
            operation,
            target: target.into(),
            old_value: None,
            new_value,
            description: description.into(),
            confidence: None,
        }
    }

    pub fn with_old_value(mut self, old_value: Value) -> Self {
        self.old_value = Some(old_value);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// A proposed batch of edits against one plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Enhancement {
    #[serde(default)]
    pub id: String,

    pub plan_id: String,

    #[serde(default)]
    pub kind: EnhancementKind,

    pub changes: Vec<Change>,

    /// Overall confidence in [0, 1]
    pub confidence: f64,

    #[serde(default)]
    pub rationale: String,

    #[serde(default)]
    pub status: EnhancementStatus,

    #[serde(default = "Timestamp::now")]
    pub created_at: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<Timestamp>,

    /// Free-text reason given when rejecting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl Enhancement {
    pub fn new(
        plan_id: impl Into<String>,
        kind: EnhancementKind,
        changes: Vec<Change>,
        confidence: f64,
        rationale: impl Into<String>,
    ) -> Self {
        let mut enhancement = Self {
            id: super::new_id(),
            plan_id: plan_id.into(),
            kind,
            changes,
            confidence,
            rationale: rationale.into(),
            status: EnhancementStatus::Pending,
            created_at: Timestamp::now(),
            applied_at: None,
            rejected_at: None,
            feedback: None,
        };
        enhancement.assign_identities();
        enhancement
    }

    /// Fills in any missing enhancement or change identity.
    pub fn assign_identities(&mut self) {
        if self.id.is_empty() {
            self.id = super::new_id();
        }
        for change in &mut self.changes {
            if change.id.is_empty() {
                change.id = super::new_id();
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == EnhancementStatus::Pending
    }

    /// Positional identifier of the change at `index`.
    pub fn positional_change_id(&self, index: usize) -> String {
        format!("{}-change-{index}", self.id)
    }

    /// Finds a change by its stable id, falling back to the positional form.
    pub fn find_change(&self, change_id: &str) -> Option<(usize, &Change)> {
        self.changes
            .iter()
            .enumerate()
            .find(|(_, change)| change.id == change_id)
            .or_else(|| {
                let index = change_id
                    .strip_prefix(self.id.as_str())?
                    .strip_prefix("-change-")?
                    .parse::<usize>()
                    .ok()?;
                self.changes.get(index).map(|change| (index, change))
            })
    }

    pub fn change_ids(&self) -> Vec<String> {
        self.changes.iter().map(|change| change.id.clone()).collect()
    }
}
