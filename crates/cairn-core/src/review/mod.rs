//! Review workflow for proposed enhancements.
//!
//! A [`Reviewer`] stores enhancements produced by a suggestion generator,
//! applies the user's decisions to the target plan, and keeps the
//! append-only change history that rollbacks are computed from.
//!
//! ## Submodules
//!
//! - [`decisions`]: approve, reject and edit, singly or in batches
//! - [`history`]: history queries, rollbacks and pruning
//! - [`suggestions`]: the generator seam and its retry policy
//!
//! Plan writes go through the owning [`Planner`], so approvals bump the plan
//! version, queue while offline and announce `document-updated` exactly like
//! direct edits.

use log::{debug, error, info};
use serde_json::Value;

pub mod apply;
pub mod decisions;
pub mod history;
pub mod suggestions;

#[cfg(test)]
mod tests;

pub use suggestions::{RetryPolicy, SuggestionGenerator, SuggestionOptions};

use crate::{
    error::{CairnError, Result, StoreResultExt},
    models::{new_id, Change, ChangeHistoryEntry, ChangeOperation, Enhancement, Plan, SyncOperation},
    path,
    planner::{successor, Planner},
    store::EnhancementStore,
};

/// Items-array target that new suggested items are added under.
const ITEMS_TARGET: &str = "/structured/items";

/// The enhancement and history service of one planner.
#[derive(Clone, Debug)]
pub struct Reviewer {
    planner: Planner,
}

impl Planner {
    /// Reviewer sharing this planner's stores and notifier.
    pub fn reviewer(&self) -> Reviewer {
        Reviewer::new(self.clone())
    }
}

impl Reviewer {
    pub fn new(planner: Planner) -> Self {
        Self { planner }
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    fn store(&self) -> &dyn EnhancementStore {
        self.planner.stores.enhancements.as_ref()
    }

    fn report<T>(&self, operation: &str, result: Result<T>) -> Result<T> {
        self.planner.report(operation, result)
    }

    pub(crate) async fn require_enhancement(&self, id: &str) -> Result<Enhancement> {
        self.store()
            .get(id)
            .await
            .store_context(format!("Failed to load enhancement {id}"))?
            .ok_or_else(|| CairnError::EnhancementNotFound { id: id.to_string() })
    }

    /// Validates and stores an enhancement, assigning missing identities.
    /// Returns the enhancement as stored.
    pub async fn save(&self, enhancement: Enhancement) -> Result<Enhancement> {
        let result = self.save_inner(enhancement).await;
        self.report("save_enhancement", result)
    }

    async fn save_inner(&self, mut enhancement: Enhancement) -> Result<Enhancement> {
        normalize(&mut enhancement);
        validate(&enhancement)?;
        self.planner.require_plan(&enhancement.plan_id).await?;

        self.store()
            .save(&enhancement)
            .await
            .store_context(format!("Failed to save enhancement {}", enhancement.id))?;
        debug!(
            "Saved {} enhancement {} with {} changes",
            enhancement.kind.as_str(),
            enhancement.id,
            enhancement.changes.len()
        );
        Ok(enhancement)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Enhancement>> {
        let result = self
            .store()
            .get(id)
            .await
            .store_context(format!("Failed to load enhancement {id}"));
        self.report("get_enhancement", result)
    }

    /// A plan's enhancements, newest first.
    pub async fn list_for_plan(&self, plan_id: &str) -> Result<Vec<Enhancement>> {
        let result = self
            .store()
            .list_for_plan(plan_id)
            .await
            .store_context(format!("Failed to list enhancements of plan {plan_id}"));
        self.report("list_enhancements", result)
    }

    /// Deletes an enhancement. History entries it produced are kept.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = async {
            let removed = self
                .store()
                .delete(id)
                .await
                .store_context(format!("Failed to delete enhancement {id}"))?;
            if !removed {
                return Err(CairnError::EnhancementNotFound { id: id.to_string() });
            }
            info!("Deleted enhancement {id}");
            Ok(())
        }
        .await;
        self.report("delete_enhancement", result)
    }

    /// Persists `next` as the successor of `previous`, then records the
    /// enhancement and its history entries in one store transaction. If the
    /// second write fails the plan is put back, so nothing is half-applied.
    async fn commit_application(
        &self,
        previous: &Plan,
        next: Plan,
        enhancement: &Enhancement,
        entries: &[ChangeHistoryEntry],
    ) -> Result<Plan> {
        let next = successor(previous, next);
        self.planner.persist(&next, previous.version).await?;

        if let Err(err) = self.store().record_application(enhancement, entries).await {
            if let Err(restore_err) = self.planner.persist(previous, next.version).await {
                error!(
                    "Could not restore plan {} after failed history write: {restore_err}",
                    previous.id
                );
            }
            return Err(err).store_context(format!(
                "Failed to record application of enhancement {}",
                enhancement.id
            ));
        }

        self.planner
            .announce(SyncOperation::Update, &next.id, Some(&next))
            .await?;
        Ok(next)
    }
}

/// Whether `change` inserts a new element into the plan's item list.
fn adds_item(change: &Change) -> bool {
    if change.operation != ChangeOperation::Add {
        return false;
    }
    match change.target.strip_prefix(ITEMS_TARGET) {
        Some("") | Some("/-") => true,
        Some(rest) => rest
            .strip_prefix('/')
            .is_some_and(|index| index.parse::<usize>().is_ok()),
        None => false,
    }
}

/// Fills in identities and marks suggested items as generated.
fn normalize(enhancement: &mut Enhancement) {
    enhancement.assign_identities();
    for change in enhancement.changes.iter_mut().filter(|c| adds_item(c)) {
        if let Value::Object(item) = &mut change.new_value {
            item.entry("id")
                .or_insert_with(|| Value::String(new_id()));
            item.entry("ai_generated").or_insert(Value::Bool(true));
        }
    }
}

fn check_confidence(field: &str, confidence: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&confidence) {
        return Err(CairnError::invalid_input(field)
            .with_reason(format!("{confidence} is outside [0, 1]")));
    }
    Ok(())
}

fn validate(enhancement: &Enhancement) -> Result<()> {
    if enhancement.plan_id.trim().is_empty() {
        return Err(CairnError::invalid_input("plan_id").with_reason("must not be empty"));
    }
    if enhancement.changes.is_empty() {
        return Err(CairnError::invalid_input("changes").with_reason("must not be empty"));
    }
    check_confidence("confidence", enhancement.confidence)?;

    for change in &enhancement.changes {
        path::parse(&change.target).map_err(|err| {
            CairnError::invalid_input(format!("changes.{}.target", change.id))
                .with_reason(err.to_string())
        })?;
        if let Some(confidence) = change.confidence {
            check_confidence(&format!("changes.{}.confidence", change.id), confidence)?;
        }
    }
    Ok(())
}
