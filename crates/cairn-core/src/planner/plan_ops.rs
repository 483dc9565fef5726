//! Plan operations for the Planner.

use log::{debug, info};

use super::Planner;
use crate::{
    error::{CairnError, Result, StoreResultExt},
    events::Event,
    models::{Plan, PlanSummary, SyncOperation},
    params::{CreatePlan, UpdatePlan},
};

impl Planner {
    /// Creates a plan at version 1 owned by `params.owner_id`.
    pub async fn create_plan(&self, params: &CreatePlan) -> Result<Plan> {
        let result = self.create_plan_inner(params).await;
        self.report("create_plan", result)
    }

    async fn create_plan_inner(&self, params: &CreatePlan) -> Result<Plan> {
        params.validate()?;

        let mut plan = Plan::new(&params.owner_id, params.title.trim());
        plan.content = params.content.clone();
        plan.structured = params.structured.clone();
        plan.reindex_items();

        self.stores
            .documents
            .put(&plan)
            .await
            .store_context("Failed to create plan")?;
        self.announce(SyncOperation::Create, &plan.id, Some(&plan))
            .await?;

        info!("Created plan {} for {}", plan.id, plan.owner_id);
        Ok(plan)
    }

    /// Retrieves a plan by its ID.
    pub async fn get_plan(&self, id: &str) -> Result<Option<Plan>> {
        let result = self
            .stores
            .documents
            .get_by_id(id)
            .await
            .store_context(format!("Failed to load plan {id}"));
        self.report("get_plan", result)
    }

    /// Lists an owner's plans, most recently updated first, and announces
    /// them as one bulk load.
    pub async fn list_plans(&self, owner_id: &str) -> Result<Vec<Plan>> {
        let result = self
            .stores
            .documents
            .get_all_by_owner(owner_id)
            .await
            .store_context(format!("Failed to list plans of {owner_id}"));
        let plans = self.report("list_plans", result)?;

        debug!("Loaded {} plans for {owner_id}", plans.len());
        self.notifier
            .publish(&Event::DocumentsBulkLoaded(plans.clone()));
        Ok(plans)
    }

    /// Summaries of an owner's plans with completion figures.
    pub async fn list_plan_summaries(&self, owner_id: &str) -> Result<Vec<PlanSummary>> {
        let plans = self.list_plans(owner_id).await?;
        Ok(plans.iter().map(PlanSummary::from).collect())
    }

    /// Applies a partial update. Absent fields are left alone; structured
    /// fields are merged one by one.
    pub async fn update_plan(&self, params: UpdatePlan) -> Result<Plan> {
        let result = self.update_plan_inner(params).await;
        self.report("update_plan", result)
    }

    async fn update_plan_inner(&self, params: UpdatePlan) -> Result<Plan> {
        params.validate()?;

        let previous = self.require_plan(&params.id).await?;
        if let Some(expected) = params.expected_version {
            if expected != previous.version {
                return Err(CairnError::VersionConflict {
                    id: params.id,
                    expected,
                    actual: previous.version,
                });
            }
        }

        let mut next = previous.clone();
        if let Some(title) = params.title {
            next.title = title.trim().to_string();
        }
        if let Some(content) = params.content {
            next.content = content;
        }
        params.structured.apply_to(&mut next.structured);

        self.commit_update(&previous, next).await
    }

    /// Permanently deletes a plan.
    pub async fn delete_plan(&self, id: &str) -> Result<()> {
        let result = self.delete_plan_inner(id).await;
        self.report("delete_plan", result)
    }

    async fn delete_plan_inner(&self, id: &str) -> Result<()> {
        let removed = self
            .stores
            .documents
            .delete(id)
            .await
            .store_context(format!("Failed to delete plan {id}"))?;
        if !removed {
            return Err(CairnError::plan_not_found(id));
        }

        self.announce(SyncOperation::Delete, id, None).await?;
        info!("Deleted plan {id}");
        Ok(())
    }
}
