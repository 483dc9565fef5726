//! The suggestion generator seam.
//!
//! Generators live outside this crate. They receive a plan and return
//! candidate enhancements; the reviewer filters, validates and stores them.
//! Retryable generator failures are retried with exponential backoff.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};

use super::Reviewer;
use crate::{
    error::{CairnError, Result},
    models::{Enhancement, EnhancementKind, Plan},
};

/// Produces candidate enhancements for a plan.
#[async_trait]
pub trait SuggestionGenerator: Send + Sync {
    /// Failures should be [`CairnError::service`] tagged retryable or not.
    async fn generate(&self, plan: &Plan, options: &SuggestionOptions) -> Result<Vec<Enhancement>>;
}

/// What the caller wants suggested.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionOptions {
    /// Kinds to keep; empty keeps every kind
    pub kinds: Vec<EnhancementKind>,
    /// Suggestions below this confidence are dropped
    pub min_confidence: f64,
    pub max_suggestions: Option<usize>,
}

impl Default for SuggestionOptions {
    fn default() -> Self {
        Self {
            kinds: Vec::new(),
            min_confidence: 0.0,
            max_suggestions: None,
        }
    }
}

impl SuggestionOptions {
    fn accepts(&self, enhancement: &Enhancement) -> bool {
        enhancement.confidence >= self.min_confidence
            && (self.kinds.is_empty() || self.kinds.contains(&enhancement.kind))
    }
}

/// Exponential backoff for retryable failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay after the `attempt`-th failure (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(20);
        self.base_delay
            .saturating_mul(1 << exponent)
            .min(self.max_delay)
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempts run out.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!("Attempt {attempt} failed, retrying in {delay:?}: {err}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Reviewer {
    /// Asks `generator` for suggestions on a plan and stores the ones that
    /// pass `options`. Returns the stored enhancements.
    pub async fn request_suggestions(
        &self,
        plan_id: &str,
        generator: &dyn SuggestionGenerator,
        options: &SuggestionOptions,
        retry: &RetryPolicy,
    ) -> Result<Vec<Enhancement>> {
        let result = self
            .request_suggestions_inner(plan_id, generator, options, retry)
            .await;
        self.report("request_suggestions", result)
    }

    async fn request_suggestions_inner(
        &self,
        plan_id: &str,
        generator: &dyn SuggestionGenerator,
        options: &SuggestionOptions,
        retry: &RetryPolicy,
    ) -> Result<Vec<Enhancement>> {
        let plan = self.planner.require_plan(plan_id).await?;
        let candidates = retry.run(|| generator.generate(&plan, options)).await?;

        let limit = options.max_suggestions.unwrap_or(usize::MAX);
        let mut stored = Vec::new();
        for mut enhancement in candidates.into_iter().filter(|e| options.accepts(e)) {
            if stored.len() == limit {
                break;
            }
            if enhancement.plan_id != plan.id {
                return Err(CairnError::invalid_input("plan_id").with_reason(format!(
                    "generator returned a suggestion for plan {} while asked about {}",
                    enhancement.plan_id, plan.id
                )));
            }
            enhancement.status = Default::default();
            stored.push(self.save_inner(enhancement).await?);
        }

        info!("Stored {} suggestions for plan {plan_id}", stored.len());
        Ok(stored)
    }
}
