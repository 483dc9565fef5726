//! In-memory plan view with optimistic updates.
//!
//! A mutation is reflected in the cache before its persistence call
//! resolves. On success the cache takes the committed document; on failure
//! it restores the exact snapshot taken before the optimistic write.
//!
//! ```rust,no_run
//! # use cairn_core::{cache::PlanCache, Planner, UpdatePlan};
//! # async fn example(planner: Planner, id: String) -> cairn_core::Result<()> {
//! let cache = PlanCache::new();
//! cache.attach(planner.notifier());
//!
//! let update = UpdatePlan::new(&id).title("Evening Routine");
//! cache
//!     .optimistic_update(&id, |plan| plan.title = "Evening Routine".into(), planner.update_plan(update))
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use log::debug;
use parking_lot::{Mutex, RwLock};

use crate::{
    error::Result,
    events::{Event, EventName, Notifier, Subscription},
    models::Plan,
};

#[derive(Clone, Default)]
pub struct PlanCache {
    plans: Arc<RwLock<HashMap<String, Plan>>>,
    subscriptions: Arc<Mutex<Vec<Subscription>>>,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the cache in sync with committed mutations announced on
    /// `notifier`.
    pub fn attach(&self, notifier: &Notifier) {
        let mut subscriptions = self.subscriptions.lock();
        for name in [
            EventName::DocumentCreated,
            EventName::DocumentUpdated,
            EventName::DocumentDeleted,
            EventName::DocumentsBulkLoaded,
        ] {
            let plans = self.plans.clone();
            subscriptions.push(notifier.subscribe(name, move |event| {
                apply_event(&plans, event);
            }));
        }
    }

    pub fn detach(&self, notifier: &Notifier) {
        for subscription in self.subscriptions.lock().drain(..) {
            notifier.unsubscribe(&subscription);
        }
    }

    pub fn get(&self, id: &str) -> Option<Plan> {
        self.plans.read().get(id).cloned()
    }

    /// Cached plans, most recently updated first.
    pub fn plans(&self) -> Vec<Plan> {
        let mut plans: Vec<Plan> = self.plans.read().values().cloned().collect();
        plans.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        plans
    }

    pub fn len(&self) -> usize {
        self.plans.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.read().is_empty()
    }

    /// Shows `provisional` immediately, then replaces it with the committed
    /// plan, or restores whatever was cached under its id before.
    pub async fn optimistic_insert<Fut>(&self, provisional: Plan, commit: Fut) -> Result<Plan>
    where
        Fut: Future<Output = Result<Plan>>,
    {
        let provisional_id = provisional.id.clone();
        let snapshot = self.plans.write().insert(provisional_id.clone(), provisional);

        match commit.await {
            Ok(plan) => {
                let mut plans = self.plans.write();
                if plan.id != provisional_id {
                    restore(&mut plans, &provisional_id, snapshot);
                }
                plans.insert(plan.id.clone(), plan.clone());
                Ok(plan)
            }
            Err(err) => {
                debug!("Reverting optimistic insert of {provisional_id}");
                restore(&mut self.plans.write(), &provisional_id, snapshot);
                Err(err)
            }
        }
    }

    /// Applies `optimistic` to the cached plan immediately, then takes the
    /// committed plan or restores the pre-mutation snapshot.
    pub async fn optimistic_update<F, Fut>(&self, id: &str, optimistic: F, commit: Fut) -> Result<Plan>
    where
        F: FnOnce(&mut Plan),
        Fut: Future<Output = Result<Plan>>,
    {
        let snapshot = {
            let mut plans = self.plans.write();
            let snapshot = plans.get(id).cloned();
            if let Some(plan) = plans.get_mut(id) {
                optimistic(plan);
            }
            snapshot
        };

        match commit.await {
            Ok(plan) => {
                self.plans.write().insert(plan.id.clone(), plan.clone());
                Ok(plan)
            }
            Err(err) => {
                debug!("Reverting optimistic update of {id}");
                restore(&mut self.plans.write(), id, snapshot);
                Err(err)
            }
        }
    }

    /// Hides the plan immediately and puts the snapshot back if the delete
    /// fails.
    pub async fn optimistic_remove<Fut>(&self, id: &str, commit: Fut) -> Result<()>
    where
        Fut: Future<Output = Result<()>>,
    {
        let snapshot = self.plans.write().remove(id);

        match commit.await {
            Ok(()) => Ok(()),
            Err(err) => {
                debug!("Reverting optimistic removal of {id}");
                restore(&mut self.plans.write(), id, snapshot);
                Err(err)
            }
        }
    }
}

fn restore(plans: &mut HashMap<String, Plan>, id: &str, snapshot: Option<Plan>) {
    match snapshot {
        Some(plan) => {
            plans.insert(id.to_string(), plan);
        }
        None => {
            plans.remove(id);
        }
    }
}

fn apply_event(plans: &RwLock<HashMap<String, Plan>>, event: &Event) {
    let mut plans = plans.write();
    match event {
        Event::DocumentCreated(plan) | Event::DocumentUpdated(plan) => {
            plans.insert(plan.id.clone(), plan.clone());
        }
        Event::DocumentDeleted { id } => {
            plans.remove(id);
        }
        Event::DocumentsBulkLoaded(loaded) => {
            for plan in loaded {
                plans.insert(plan.id.clone(), plan.clone());
            }
        }
        Event::Error(_) => {}
    }
}
