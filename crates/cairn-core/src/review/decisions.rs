//! User decisions on pending enhancements.

use jiff::Timestamp;
use log::{info, warn};
use serde_json::Value;

use super::{apply::apply_change, Reviewer};
use crate::{
    error::{CairnError, Result, StoreResultExt},
    models::{BatchResult, ChangeHistoryEntry, Enhancement, EnhancementStatus},
};

/// Resolves the addressed changes to indices. Unknown ids are recorded as
/// failures; `None` addresses every change.
fn select_changes(
    enhancement: &Enhancement,
    change_ids: Option<&[String]>,
) -> (Vec<(String, usize)>, BatchResult) {
    let mut result = BatchResult::default();
    let Some(change_ids) = change_ids else {
        let all = enhancement
            .changes
            .iter()
            .enumerate()
            .map(|(index, change)| (change.id.clone(), index))
            .collect();
        return (all, result);
    };

    let mut selected = Vec::with_capacity(change_ids.len());
    for change_id in change_ids {
        match enhancement.find_change(change_id) {
            Some((index, _)) if !selected.iter().any(|(_, i)| *i == index) => {
                selected.push((change_id.clone(), index));
            }
            Some(_) => {}
            None => result.fail(
                change_id.clone(),
                &CairnError::ChangeNotFound {
                    enhancement_id: enhancement.id.clone(),
                    change_id: change_id.clone(),
                },
            ),
        }
    }
    (selected, result)
}

fn ensure_pending(enhancement: &Enhancement) -> Result<()> {
    if !enhancement.is_pending() {
        return Err(CairnError::invalid_state(format!(
            "Enhancement {} is already {}",
            enhancement.id,
            enhancement.status.as_str()
        )));
    }
    Ok(())
}

impl Reviewer {
    /// Applies the addressed changes (all when `change_ids` is `None`).
    ///
    /// Changes are applied in list order against a working copy; one that
    /// cannot be applied is reported in `failed` and skipped. When at least
    /// one change succeeds the plan is committed once, a history entry is
    /// written per applied change and the enhancement becomes approved.
    /// When none succeeds nothing is written.
    pub async fn approve(
        &self,
        enhancement_id: &str,
        change_ids: Option<&[String]>,
        actor: &str,
    ) -> Result<BatchResult> {
        let result = self.approve_inner(enhancement_id, change_ids, actor).await;
        self.report("approve", result)
    }

    async fn approve_inner(
        &self,
        enhancement_id: &str,
        change_ids: Option<&[String]>,
        actor: &str,
    ) -> Result<BatchResult> {
        let mut enhancement = self.require_enhancement(enhancement_id).await?;
        ensure_pending(&enhancement)?;
        let (selected, mut result) = select_changes(&enhancement, change_ids);
        let plan = self.planner.require_plan(&enhancement.plan_id).await?;

        let mut working = plan.clone();
        let mut applied = Vec::new();
        for (addressed, index) in selected {
            let change = &enhancement.changes[index];
            match apply_change(&working, change) {
                Ok((next, outcome)) => {
                    working = next;
                    applied.push((index, outcome));
                    result.succeed(addressed);
                }
                Err(err) => {
                    warn!("Skipping change {addressed} of {enhancement_id}: {err}");
                    result.fail(addressed, &err);
                }
            }
        }

        if applied.is_empty() {
            info!("No change of {enhancement_id} could be applied; it stays pending");
            return Ok(result);
        }

        let now = Timestamp::now();
        let version = plan.version + 1;
        let entries: Vec<ChangeHistoryEntry> = applied
            .into_iter()
            .map(|(index, outcome)| {
                let change = &enhancement.changes[index];
                ChangeHistoryEntry {
                    id: crate::models::new_id(),
                    enhancement_id: enhancement.id.clone(),
                    plan_id: plan.id.clone(),
                    change_id: change.id.clone(),
                    applied_by: actor.to_string(),
                    applied_at: now,
                    old_value: outcome.previous,
                    new_value: outcome.current,
                    description: change.description.clone(),
                    rollback_data: outcome.inverse.into_rollback_data(version),
                    is_rollback: false,
                    rolled_back_entry_id: None,
                }
            })
            .collect();

        enhancement.status = EnhancementStatus::Approved;
        enhancement.applied_at = Some(now);
        self.commit_application(&plan, working, &enhancement, &entries)
            .await?;

        info!(
            "{actor} approved {} of {} changes of enhancement {enhancement_id}",
            entries.len(),
            enhancement.changes.len()
        );
        Ok(result)
    }

    /// Marks the enhancement rejected with optional feedback. Addressing a
    /// subset only narrows what is reported; the whole enhancement is closed.
    pub async fn reject(
        &self,
        enhancement_id: &str,
        change_ids: Option<&[String]>,
        feedback: Option<&str>,
        actor: &str,
    ) -> Result<BatchResult> {
        let result = self
            .reject_inner(enhancement_id, change_ids, feedback, actor)
            .await;
        self.report("reject", result)
    }

    async fn reject_inner(
        &self,
        enhancement_id: &str,
        change_ids: Option<&[String]>,
        feedback: Option<&str>,
        actor: &str,
    ) -> Result<BatchResult> {
        let mut enhancement = self.require_enhancement(enhancement_id).await?;
        ensure_pending(&enhancement)?;
        let (selected, mut result) = select_changes(&enhancement, change_ids);
        if selected.is_empty() {
            return Ok(result);
        }
        for (addressed, _) in selected {
            result.succeed(addressed);
        }

        enhancement.status = EnhancementStatus::Rejected;
        enhancement.rejected_at = Some(Timestamp::now());
        enhancement.feedback = feedback
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        self.store()
            .save(&enhancement)
            .await
            .store_context(format!("Failed to save enhancement {enhancement_id}"))?;

        info!("{actor} rejected enhancement {enhancement_id}");
        Ok(result)
    }

    /// Replaces one pending change's proposed value before approval.
    pub async fn edit(
        &self,
        enhancement_id: &str,
        change_id: &str,
        new_value: Value,
        actor: &str,
    ) -> Result<Enhancement> {
        let result = self
            .edit_inner(enhancement_id, change_id, new_value, actor)
            .await;
        self.report("edit", result)
    }

    async fn edit_inner(
        &self,
        enhancement_id: &str,
        change_id: &str,
        new_value: Value,
        actor: &str,
    ) -> Result<Enhancement> {
        let mut enhancement = self.require_enhancement(enhancement_id).await?;
        ensure_pending(&enhancement)?;
        let index = enhancement
            .find_change(change_id)
            .map(|(index, _)| index)
            .ok_or_else(|| CairnError::ChangeNotFound {
                enhancement_id: enhancement_id.to_string(),
                change_id: change_id.to_string(),
            })?;

        let change = &mut enhancement.changes[index];
        change.new_value = new_value;
        if !change.description.ends_with(" (edited by user)") {
            change.description.push_str(" (edited by user)");
        }

        self.store()
            .save(&enhancement)
            .await
            .store_context(format!("Failed to save enhancement {enhancement_id}"))?;
        info!("{actor} edited change {change_id} of enhancement {enhancement_id}");
        Ok(enhancement)
    }

    /// Approves every change of each enhancement. An enhancement counts as
    /// successful when at least one of its changes was applied.
    pub async fn batch_approve(&self, enhancement_ids: &[String], actor: &str) -> BatchResult {
        let mut outcome = BatchResult::default();
        for id in enhancement_ids {
            match self.approve_inner(id, None, actor).await {
                Ok(result) if !result.successful.is_empty() => outcome.succeed(id.clone()),
                Ok(result) => {
                    let reasons: Vec<String> =
                        result.failed.into_iter().map(|f| f.error).collect();
                    let err = CairnError::invalid_state(format!(
                        "no change could be applied: {}",
                        reasons.join("; ")
                    ));
                    self.planner.publish_error("batch_approve", &err);
                    outcome.fail(id.clone(), &err);
                }
                Err(err) => {
                    self.planner.publish_error("batch_approve", &err);
                    outcome.fail(id.clone(), &err);
                }
            }
        }
        outcome
    }

    pub async fn batch_reject(
        &self,
        enhancement_ids: &[String],
        feedback: Option<&str>,
        actor: &str,
    ) -> BatchResult {
        let mut outcome = BatchResult::default();
        for id in enhancement_ids {
            match self.reject_inner(id, None, feedback, actor).await {
                Ok(_) => outcome.succeed(id.clone()),
                Err(err) => {
                    self.planner.publish_error("batch_reject", &err);
                    outcome.fail(id.clone(), &err);
                }
            }
        }
        outcome
    }
}
