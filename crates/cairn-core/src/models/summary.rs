//! Plan summary types and functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::Plan;

/// Summary information about a plan with item statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub version: u64,
    pub updated_at: Timestamp,
    pub total_items: u32,
    pub completed_items: u32,
    pub completion_percentage: u8,
}

impl From<&Plan> for PlanSummary {
    fn from(plan: &Plan) -> Self {
        let total_items = plan.items().len() as u32;
        let completed_items = plan.items().iter().filter(|i| i.is_completed()).count() as u32;

        Self {
            id: plan.id.clone(),
            owner_id: plan.owner_id.clone(),
            title: plan.title.clone(),
            version: plan.version,
            updated_at: plan.updated_at,
            total_items,
            completed_items,
            completion_percentage: plan.completion_percentage(),
        }
    }
}
