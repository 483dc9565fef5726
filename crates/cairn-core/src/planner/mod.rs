//! High-level planner API for managing plans and their items.
//!
//! This module provides the main [`Planner`] interface. The planner sits
//! between callers and the repositories: every mutation runs the same commit
//! sequence and is announced on the planner's [`Notifier`].
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   Operations    │    │     Commit      │    │   Repositories  │
//! │ (plan_ops,      │───▶│ stamp, persist, │───▶│ (DocumentStore, │
//! │  item_ops)      │    │ enqueue, notify │    │  MutationQueue) │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!                                 │
//!                                 ▼
//!                        ┌─────────────────┐
//!                        │    sync_ops     │
//!                        │ drain when back │
//!                        │     online      │
//!                        └─────────────────┘
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for creating [`Planner`] instances with configuration
//! - [`plan_ops`]: Create, read, list, update and delete whole plans
//! - [`item_ops`]: Add, update, move and remove items inside a plan
//! - [`sync_ops`]: Connectivity, queue inspection and replay
//!
//! ## Commit sequence
//!
//! 1. The caller's input is validated and the stored plan loaded.
//! 2. The change is applied to a copy, the version bumped by one and
//!    `updated_at` refreshed.
//! 3. The copy is written with a compare-and-swap on the version read in
//!    step 1, so concurrent writers cannot silently overwrite each other.
//! 4. While offline, the full post-mutation document is queued.
//! 5. The matching event is published.
//!
//! Any error is returned to the caller and also published as
//! [`Event::Error`].
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use cairn_core::{CreatePlan, NewItem, PlannerBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let planner = PlannerBuilder::new()
//!     .with_database_path(Some("/tmp/cairn.db"))
//!     .build()
//!     .await?;
//!
//! let plan = planner
//!     .create_plan(&CreatePlan::new("user-1", "Morning Routine"))
//!     .await?;
//! let plan = planner.add_item(&plan.id, NewItem::new("Stretch")).await?;
//! assert_eq!(plan.version, 2);
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, warn};

pub mod builder;
pub mod item_ops;
pub mod plan_ops;
pub mod sync_ops;


pub use builder::PlannerBuilder;
pub use sync_ops::{LocalSyncTarget, SyncPolicy, SyncTarget};

use crate::{
    error::{CairnError, Result, StoreResultExt},
    events::{ErrorEvent, Event, Notifier},
    models::{NewSyncItem, Plan, SyncOperation},
    store::{CasOutcome, Stores},
};

/// Main planner interface for managing plans.
///
/// Cheap to clone; clones share stores, notifier and connectivity state.
#[derive(Clone)]
pub struct Planner {
    pub(crate) stores: Stores,
    pub(crate) notifier: Notifier,
    online: Arc<AtomicBool>,
    sync_target: Arc<dyn SyncTarget>,
    sync_policy: SyncPolicy,
    drain_lock: Arc<tokio::sync::Mutex<()>>,
}

impl Planner {
    pub(crate) fn new(
        stores: Stores,
        notifier: Notifier,
        online: bool,
        sync_target: Arc<dyn SyncTarget>,
        sync_policy: SyncPolicy,
    ) -> Self {
        Self {
            stores,
            notifier,
            online: Arc::new(AtomicBool::new(online)),
            sync_target,
            sync_policy,
            drain_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Channel on which committed mutations and failures are announced.
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Publishes `result`'s error, if any, before handing it back.
    pub(crate) fn report<T>(&self, operation: &str, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.publish_error(operation, err);
        }
        result
    }

    pub(crate) fn publish_error(&self, operation: &str, err: &CairnError) {
        warn!("{operation} failed: {err}");
        self.notifier
            .publish(&Event::Error(ErrorEvent::from_error(operation, err)));
    }

    pub(crate) async fn require_plan(&self, id: &str) -> Result<Plan> {
        self.stores
            .documents
            .get_by_id(id)
            .await
            .store_context(format!("Failed to load plan {id}"))?
            .ok_or_else(|| CairnError::plan_not_found(id))
    }

    /// Writes `next` only if the stored version is still `expected`.
    pub(crate) async fn persist(&self, next: &Plan, expected: u64) -> Result<()> {
        let outcome = self
            .stores
            .documents
            .compare_and_put(next, expected)
            .await
            .store_context(format!("Failed to save plan {}", next.id))?;

        match outcome {
            CasOutcome::Written => Ok(()),
            CasOutcome::Conflict { actual: None } => Err(CairnError::plan_not_found(&next.id)),
            CasOutcome::Conflict {
                actual: Some(actual),
            } => Err(CairnError::VersionConflict {
                id: next.id.clone(),
                expected,
                actual,
            }),
        }
    }

    /// Queues the mutation while offline, then publishes its event.
    pub(crate) async fn announce(
        &self,
        operation: SyncOperation,
        plan_id: &str,
        snapshot: Option<&Plan>,
    ) -> Result<()> {
        if !self.is_online() {
            let item = self
                .stores
                .queue
                .enqueue(NewSyncItem {
                    operation,
                    plan_id: plan_id.to_string(),
                    snapshot: snapshot.cloned(),
                })
                .await
                .store_context(format!("Failed to queue {} of plan {plan_id}", operation.as_str()))?;
            debug!("Queued {} of plan {plan_id} as {}", operation.as_str(), item.id);
        }

        let event = match (operation, snapshot) {
            (SyncOperation::Create, Some(plan)) => Event::DocumentCreated(plan.clone()),
            (SyncOperation::Update, Some(plan)) => Event::DocumentUpdated(plan.clone()),
            _ => Event::DocumentDeleted {
                id: plan_id.to_string(),
            },
        };
        self.notifier.publish(&event);
        Ok(())
    }

    /// Runs the full update commit for `next`, derived from `previous`.
    pub(crate) async fn commit_update(&self, previous: &Plan, next: Plan) -> Result<Plan> {
        let next = successor(previous, next);
        self.persist(&next, previous.version).await?;
        self.announce(SyncOperation::Update, &next.id, Some(&next))
            .await?;
        debug!("Committed plan {} at version {}", next.id, next.version);
        Ok(next)
    }

    /// Loads the plan, lets `mutate` edit a copy and commits the result.
    pub(crate) async fn mutate_plan<F>(&self, id: &str, mutate: F) -> Result<Plan>
    where
        F: FnOnce(&mut Plan) -> Result<()>,
    {
        let previous = self.require_plan(id).await?;
        let mut next = previous.clone();
        mutate(&mut next)?;
        self.commit_update(&previous, next).await
    }
}

/// Finalizes an edited copy of `previous`: contiguous item order, version
/// exactly one above the one it was derived from, fresh `updated_at`.
pub(crate) fn successor(previous: &Plan, mut next: Plan) -> Plan {
    next.reindex_items();
    next.version = previous.version;
    next.stamp();
    next
}

impl std::fmt::Debug for Planner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("online", &self.is_online())
            .field("sync_policy", &self.sync_policy)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}
