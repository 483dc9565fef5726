//! Status enumerations for plan items and enhancements.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type-safe enumeration of plan item statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Item has not been started
    #[default]
    Pending,

    /// Item is being worked on
    InProgress,

    /// Item has been completed
    Completed,

    /// Item was dropped
    Cancelled,
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ItemStatus::Pending),
            "inprogress" | "in_progress" | "in-progress" => Ok(ItemStatus::InProgress),
            "completed" | "done" => Ok(ItemStatus::Completed),
            "cancelled" | "canceled" => Ok(ItemStatus::Cancelled),
            _ => Err(format!("Invalid item status: {s}")),
        }
    }
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::InProgress => "in_progress",
            ItemStatus::Completed => "completed",
            ItemStatus::Cancelled => "cancelled",
        }
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// ```rust
    /// use cairn_core::models::ItemStatus;
    ///
    /// assert_eq!(ItemStatus::Completed.with_icon(), "✓ Completed");
    /// assert_eq!(ItemStatus::Pending.with_icon(), "○ Pending");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            ItemStatus::Completed => "✓ Completed",
            ItemStatus::InProgress => "➤ In Progress",
            ItemStatus::Pending => "○ Pending",
            ItemStatus::Cancelled => "✗ Cancelled",
        }
    }
}

/// Lifecycle of an enhancement. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl FromStr for EnhancementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(EnhancementStatus::Pending),
            "approved" => Ok(EnhancementStatus::Approved),
            "rejected" => Ok(EnhancementStatus::Rejected),
            _ => Err(format!("Invalid enhancement status: {s}")),
        }
    }
}

impl EnhancementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnhancementStatus::Pending => "pending",
            EnhancementStatus::Approved => "approved",
            EnhancementStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, EnhancementStatus::Pending)
    }
}
