//! Item operations for the Planner.
//!
//! Every item operation is a plan mutation: it bumps the owning plan's
//! version and leaves item `order` values contiguous from 0.

use super::Planner;
use crate::{
    error::{CairnError, Result},
    models::{ItemPatch, ItemStatus, Plan},
    params::NewItem,
};

fn item_not_found(plan_id: &str, item_id: &str) -> CairnError {
    CairnError::ItemNotFound {
        plan_id: plan_id.to_string(),
        item_id: item_id.to_string(),
    }
}

impl Planner {
    /// Adds an item, appended unless `item.position` says otherwise.
    pub async fn add_item(&self, plan_id: &str, item: NewItem) -> Result<Plan> {
        let result = self.add_item_inner(plan_id, item).await;
        self.report("add_item", result)
    }

    async fn add_item_inner(&self, plan_id: &str, item: NewItem) -> Result<Plan> {
        item.validate()?;
        let position = item.position;
        let item = item.into_item();

        self.mutate_plan(plan_id, |plan| {
            let items = &mut plan.structured.items;
            match position {
                Some(position) if position < items.len() => items.insert(position, item),
                _ => items.push(item),
            }
            Ok(())
        })
        .await
    }

    /// Merges `patch` into one item.
    pub async fn update_item(&self, plan_id: &str, item_id: &str, patch: ItemPatch) -> Result<Plan> {
        let result = self.update_item_inner(plan_id, item_id, patch).await;
        self.report("update_item", result)
    }

    async fn update_item_inner(
        &self,
        plan_id: &str,
        item_id: &str,
        patch: ItemPatch,
    ) -> Result<Plan> {
        if let Some(text) = &patch.text {
            if text.trim().is_empty() {
                return Err(CairnError::invalid_input("text").with_reason("must not be empty"));
            }
        }

        self.mutate_plan(plan_id, |plan| {
            let item = plan
                .item_mut(item_id)
                .ok_or_else(|| item_not_found(plan_id, item_id))?;
            patch.apply_to(item);
            Ok(())
        })
        .await
    }

    /// Shorthand for a status-only [`update_item`](Self::update_item).
    pub async fn set_item_status(
        &self,
        plan_id: &str,
        item_id: &str,
        status: ItemStatus,
    ) -> Result<Plan> {
        self.update_item(plan_id, item_id, ItemPatch::status(status))
            .await
    }

    /// Moves an item to `position`, clamped to the last slot.
    pub async fn move_item(&self, plan_id: &str, item_id: &str, position: usize) -> Result<Plan> {
        let result = self
            .mutate_plan(plan_id, |plan| {
                let items = &mut plan.structured.items;
                let from = items
                    .iter()
                    .position(|item| item.id == item_id)
                    .ok_or_else(|| item_not_found(plan_id, item_id))?;
                let item = items.remove(from);
                let to = position.min(items.len());
                items.insert(to, item);
                Ok(())
            })
            .await;
        self.report("move_item", result)
    }

    /// Removes an item; the remaining items close ranks.
    pub async fn remove_item(&self, plan_id: &str, item_id: &str) -> Result<Plan> {
        let result = self
            .mutate_plan(plan_id, |plan| {
                let before = plan.structured.items.len();
                plan.structured.items.retain(|item| item.id != item_id);
                if plan.structured.items.len() == before {
                    return Err(item_not_found(plan_id, item_id));
                }
                Ok(())
            })
            .await;
        self.report("remove_item", result)
    }
}
