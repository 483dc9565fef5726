//! Per-item outcome of batch operations.

use serde::{Deserialize, Serialize};

use crate::error::CairnError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchFailure {
    pub id: String,
    pub error: String,
}

/// Partition of addressed identifiers into successes and failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BatchResult {
    pub successful: Vec<String>,
    pub failed: Vec<BatchFailure>,
}

impl BatchResult {
    pub fn succeed(&mut self, id: impl Into<String>) {
        self.successful.push(id.into());
    }

    pub fn fail(&mut self, id: impl Into<String>, error: &CairnError) {
        self.failed.push(BatchFailure {
            id: id.into(),
            error: error.to_string(),
        });
    }
}
