//! Change history, rollbacks and pruning.
//!
//! History is append-only. A rollback never touches the entry it undoes: it
//! synthesizes a one-change enhancement holding the inverse edit, applies it
//! as already approved and appends an entry flagged `is_rollback` that
//! points back at the original. Undoing a rollback is therefore just another
//! rollback.

use std::collections::HashSet;

use jiff::{SignedDuration, Timestamp};
use log::info;
use serde_json::Value;

use super::{apply::apply_change, Reviewer};
use crate::{
    error::{CairnError, Result, StoreResultExt},
    models::{new_id, Change, ChangeHistoryEntry, Enhancement, EnhancementStatus},
};

/// Entries older than this are pruned when no cutoff is given.
pub const DEFAULT_RETENTION: SignedDuration = SignedDuration::from_hours(30 * 24);

impl Reviewer {
    /// A plan's history, most recent first.
    pub async fn get_history(&self, plan_id: &str) -> Result<Vec<ChangeHistoryEntry>> {
        let result = self
            .store()
            .history_for_plan(plan_id)
            .await
            .store_context(format!("Failed to load history of plan {plan_id}"));
        self.report("get_history", result).map(|mut entries| {
            entries.reverse();
            entries
        })
    }

    /// Entries produced by one enhancement, in application order.
    pub async fn get_enhancement_history(
        &self,
        enhancement_id: &str,
    ) -> Result<Vec<ChangeHistoryEntry>> {
        let result = self
            .store()
            .history_for_enhancement(enhancement_id)
            .await
            .store_context(format!("Failed to load history of enhancement {enhancement_id}"));
        self.report("get_enhancement_history", result)
    }

    /// Applies the inverse of one history entry and returns the entry that
    /// records the rollback. On failure nothing is written.
    pub async fn rollback(&self, entry_id: &str, actor: &str) -> Result<ChangeHistoryEntry> {
        let result = self.rollback_inner(entry_id, actor).await;
        self.report("rollback", result)
    }

    async fn rolled_back_ids(&self, plan_id: &str) -> Result<HashSet<String>> {
        let entries = self
            .store()
            .history_for_plan(plan_id)
            .await
            .store_context(format!("Failed to load history of plan {plan_id}"))?;
        Ok(entries
            .into_iter()
            .filter_map(|entry| entry.rolled_back_entry_id)
            .collect())
    }

    async fn rollback_inner(&self, entry_id: &str, actor: &str) -> Result<ChangeHistoryEntry> {
        let entry = self
            .store()
            .get_history_entry(entry_id)
            .await
            .store_context(format!("Failed to load history entry {entry_id}"))?
            .ok_or_else(|| CairnError::HistoryEntryNotFound {
                id: entry_id.to_string(),
            })?;

        if self.rolled_back_ids(&entry.plan_id).await?.contains(entry_id) {
            return Err(CairnError::invalid_state(format!(
                "History entry {entry_id} has already been rolled back"
            )));
        }

        let plan = self.planner.require_plan(&entry.plan_id).await?;
        let kind = self
            .store()
            .get(&entry.enhancement_id)
            .await
            .store_context(format!("Failed to load enhancement {}", entry.enhancement_id))?
            .map(|original| original.kind)
            .unwrap_or_default();

        let inverse = &entry.rollback_data;
        let change = Change {
            id: new_id(),
            operation: inverse.operation,
            target: inverse.target.clone(),
            old_value: entry.new_value.clone(),
            new_value: inverse.value.clone().unwrap_or(Value::Null),
            description: format!("Rollback: {}", entry.description),
            confidence: Some(1.0),
        };
        let (next, applied) = apply_change(&plan, &change)?;

        let now = Timestamp::now();
        let mut enhancement = Enhancement::new(
            &plan.id,
            kind,
            vec![change],
            1.0,
            format!("Rollback of history entry {entry_id}"),
        );
        enhancement.status = EnhancementStatus::Approved;
        enhancement.applied_at = Some(now);

        let change = &enhancement.changes[0];
        let rollback_entry = ChangeHistoryEntry {
            id: new_id(),
            enhancement_id: enhancement.id.clone(),
            plan_id: plan.id.clone(),
            change_id: change.id.clone(),
            applied_by: actor.to_string(),
            applied_at: now,
            old_value: applied.previous,
            new_value: applied.current,
            description: change.description.clone(),
            rollback_data: applied.inverse.into_rollback_data(plan.version + 1),
            is_rollback: true,
            rolled_back_entry_id: Some(entry.id.clone()),
        };

        self.commit_application(&plan, next, &enhancement, std::slice::from_ref(&rollback_entry))
            .await?;
        info!("{actor} rolled back history entry {entry_id} on plan {}", plan.id);
        Ok(rollback_entry)
    }

    /// Rolls back every forward entry of an enhancement that is not already
    /// rolled back, most recent first. Stops at the first failure; rollbacks
    /// completed before it stay committed.
    pub async fn rollback_enhancement(
        &self,
        enhancement_id: &str,
        actor: &str,
    ) -> Result<Vec<ChangeHistoryEntry>> {
        let result = self.rollback_enhancement_inner(enhancement_id, actor).await;
        self.report("rollback_enhancement", result)
    }

    async fn rollback_enhancement_inner(
        &self,
        enhancement_id: &str,
        actor: &str,
    ) -> Result<Vec<ChangeHistoryEntry>> {
        let enhancement = self.require_enhancement(enhancement_id).await?;
        let rolled_back = self.rolled_back_ids(&enhancement.plan_id).await?;
        let entries = self
            .store()
            .history_for_enhancement(enhancement_id)
            .await
            .store_context(format!("Failed to load history of enhancement {enhancement_id}"))?;

        let mut rollbacks = Vec::new();
        for entry in entries
            .iter()
            .rev()
            .filter(|entry| !entry.is_rollback && !rolled_back.contains(&entry.id))
        {
            rollbacks.push(self.rollback_inner(&entry.id, actor).await?);
        }

        info!(
            "{actor} rolled back {} entries of enhancement {enhancement_id}",
            rollbacks.len()
        );
        Ok(rollbacks)
    }

    /// Deletes a plan's history entries older than `older_than` (default
    /// [`DEFAULT_RETENTION`]). Returns how many were deleted.
    pub async fn clear_history(
        &self,
        plan_id: &str,
        older_than: Option<SignedDuration>,
    ) -> Result<usize> {
        let result = self.clear_history_inner(plan_id, older_than).await;
        self.report("clear_history", result)
    }

    async fn clear_history_inner(
        &self,
        plan_id: &str,
        older_than: Option<SignedDuration>,
    ) -> Result<usize> {
        let older_than = older_than.unwrap_or(DEFAULT_RETENTION);
        if older_than.is_negative() {
            return Err(CairnError::invalid_input("older_than").with_reason("must not be negative"));
        }
        let cutoff = Timestamp::now()
            .checked_sub(older_than)
            .map_err(|err| CairnError::invalid_input("older_than").with_reason(err.to_string()))?;

        let deleted = self
            .store()
            .delete_history_before(plan_id, cutoff)
            .await
            .store_context(format!("Failed to prune history of plan {plan_id}"))?;
        info!("Pruned {deleted} history entries of plan {plan_id} older than {cutoff}");
        Ok(deleted)
    }
}
