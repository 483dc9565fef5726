//! Tests for the review module.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jiff::Timestamp;
use serde_json::json;

use super::*;
use crate::{
    error::{StoreError, StoreResult},
    events::{Event, EventName},
    models::{EnhancementKind, EnhancementStatus, ItemStatus},
    params::{CreatePlan, NewItem, UpdatePlan},
    planner::PlannerBuilder,
    store::{MemoryStore, Stores},
};

async fn planner_with(stores: Stores) -> Planner {
    PlannerBuilder::new()
        .with_stores(stores)
        .build()
        .await
        .expect("Failed to create planner")
}

/// A plan with three items whose ids are `a`, `b` and `c`.
async fn seeded(planner: &Planner) -> Plan {
    let plan = planner
        .create_plan(&CreatePlan::new("user-1", "Morning Routine").tags(["daily"]))
        .await
        .expect("create");
    let mut plan = plan;
    for text in ["Stretch", "Coffee", "Read"] {
        plan = planner.add_item(&plan.id, NewItem::new(text)).await.unwrap();
    }
    plan
}

fn three_changes(plan: &Plan) -> Enhancement {
    let items = plan.items();
    Enhancement::new(
        &plan.id,
        EnhancementKind::Structure,
        vec![
            Change::new(
                ChangeOperation::Modify,
                format!("/structured/items/@{}/text", items[0].id),
                json!("Stretch for ten minutes"),
                "Be specific",
            )
            .with_old_value(json!("Stretch")),
            Change::new(
                ChangeOperation::Add,
                "/structured/tags",
                json!("health"),
                "Tag as health",
            ),
            Change::new(
                ChangeOperation::Add,
                "/structured/items",
                json!({"text": "Drink water"}),
                "Hydrate",
            ),
        ],
        0.8,
        "Make the routine more concrete",
    )
}

#[tokio::test]
async fn test_save_normalizes_added_items() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let reviewer = planner.reviewer();

    let saved = reviewer.save(three_changes(&plan)).await.expect("save");

    let added = &saved.changes[2].new_value;
    assert!(added.get("id").and_then(|v| v.as_str()).is_some());
    assert_eq!(added.get("ai_generated"), Some(&json!(true)));
    assert_eq!(reviewer.get(&saved.id).await.unwrap(), Some(saved.clone()));
    assert_eq!(reviewer.list_for_plan(&plan.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_save_rejects_out_of_range_confidence() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let mut enhancement = three_changes(&plan);
    enhancement.confidence = 1.5;

    let err = planner.reviewer().save(enhancement).await.unwrap_err();
    assert!(matches!(err, CairnError::InvalidInput { ref field, .. } if field == "confidence"));
}

#[tokio::test]
async fn test_save_rejects_protected_target() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let enhancement = Enhancement::new(
        &plan.id,
        EnhancementKind::Structure,
        vec![Change::new(ChangeOperation::Modify, "/version", json!(99), "Cheat")],
        0.5,
        "",
    );

    assert!(planner.reviewer().save(enhancement).await.is_err());
}

#[tokio::test]
async fn test_approve_subset_records_one_entry_per_change() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let reviewer = planner.reviewer();
    let enhancement = reviewer.save(three_changes(&plan)).await.unwrap();

    let subset = vec![
        enhancement.positional_change_id(0),
        enhancement.positional_change_id(2),
    ];
    let result = reviewer
        .approve(&enhancement.id, Some(&subset), "alice")
        .await
        .expect("approve");

    assert_eq!(result.successful, subset);
    assert!(result.failed.is_empty());

    let history = reviewer.get_history(&plan.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|entry| entry.applied_by == "alice"));
    assert_eq!(history[1].change_id, enhancement.changes[0].id);
    assert_eq!(history[0].change_id, enhancement.changes[2].id);

    let stored = reviewer.get(&enhancement.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EnhancementStatus::Approved);
    assert!(stored.applied_at.is_some());

    let updated = planner.get_plan(&plan.id).await.unwrap().unwrap();
    assert_eq!(updated.version, plan.version + 1);
    assert_eq!(updated.items()[0].text, "Stretch for ten minutes");
    assert_eq!(updated.items().len(), 4);
    assert!(updated.items()[3].ai_generated);
    assert!(!updated.structured.tags.contains("health"));
}

#[tokio::test]
async fn test_approve_reports_unknown_and_failing_changes() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let reviewer = planner.reviewer();
    let mut enhancement = three_changes(&plan);
    enhancement.changes.push(Change::new(
        ChangeOperation::Modify,
        "/structured/items/@missing/text",
        json!("Nope"),
        "Targets nothing",
    ));
    let enhancement = reviewer.save(enhancement).await.unwrap();

    let ids = vec![
        enhancement.changes[0].id.clone(),
        enhancement.changes[3].id.clone(),
        "bogus".to_string(),
    ];
    let result = reviewer
        .approve(&enhancement.id, Some(&ids), "user")
        .await
        .unwrap();

    assert_eq!(result.successful, vec![enhancement.changes[0].id.clone()]);
    let failed: Vec<&str> = result.failed.iter().map(|f| f.id.as_str()).collect();
    assert!(failed.contains(&"bogus"));
    assert!(failed.contains(&enhancement.changes[3].id.as_str()));
    assert_eq!(reviewer.get_history(&plan.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_approve_with_no_applicable_change_stays_pending() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let reviewer = planner.reviewer();
    let enhancement = reviewer
        .save(Enhancement::new(
            &plan.id,
            EnhancementKind::Optimization,
            vec![Change::new(
                ChangeOperation::Remove,
                "/structured/goals/3",
                json!(null),
                "Drop a goal",
            )],
            0.4,
            "",
        ))
        .await
        .unwrap();

    let result = reviewer.approve(&enhancement.id, None, "user").await.unwrap();

    assert!(result.successful.is_empty());
    assert_eq!(result.failed.len(), 1);
    let stored = reviewer.get(&enhancement.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EnhancementStatus::Pending);
    let unchanged = planner.get_plan(&plan.id).await.unwrap().unwrap();
    assert_eq!(unchanged.version, plan.version);
}

#[tokio::test]
async fn test_second_decision_is_invalid_state() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let reviewer = planner.reviewer();
    let enhancement = reviewer.save(three_changes(&plan)).await.unwrap();

    let result = reviewer
        .reject(&enhancement.id, None, Some("Not now"), "user")
        .await
        .unwrap();
    assert_eq!(result.successful.len(), 3);

    let stored = reviewer.get(&enhancement.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EnhancementStatus::Rejected);
    assert_eq!(stored.feedback.as_deref(), Some("Not now"));
    assert!(stored.rejected_at.is_some());

    let err = reviewer.approve(&enhancement.id, None, "user").await.unwrap_err();
    assert!(matches!(err, CairnError::InvalidState { .. }));
}

#[tokio::test]
async fn test_edit_marks_description_and_applies_new_value() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let reviewer = planner.reviewer();
    let enhancement = reviewer.save(three_changes(&plan)).await.unwrap();
    let change_id = enhancement.changes[0].id.clone();

    let edited = reviewer
        .edit(&enhancement.id, &change_id, json!("Stretch for five minutes"), "user")
        .await
        .unwrap();
    assert_eq!(edited.changes[0].description, "Be specific (edited by user)");

    reviewer
        .approve(&enhancement.id, Some(&[change_id]), "user")
        .await
        .unwrap();
    let updated = planner.get_plan(&plan.id).await.unwrap().unwrap();
    assert_eq!(updated.items()[0].text, "Stretch for five minutes");
}

#[tokio::test]
async fn test_rollback_round_trip_restores_value() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let reviewer = planner.reviewer();
    let enhancement = reviewer.save(three_changes(&plan)).await.unwrap();
    let first = enhancement.changes[0].id.clone();
    reviewer
        .approve(&enhancement.id, Some(&[first]), "user")
        .await
        .unwrap();
    let history = reviewer.get_history(&plan.id).await.unwrap();
    assert_eq!(history.len(), 1);

    let rollback = reviewer.rollback(&history[0].id, "user").await.expect("rollback");

    assert!(rollback.is_rollback);
    assert_eq!(rollback.rolled_back_entry_id.as_deref(), Some(history[0].id.as_str()));
    let restored = planner.get_plan(&plan.id).await.unwrap().unwrap();
    assert_eq!(restored.items()[0].text, "Stretch");
    assert_eq!(restored.version, plan.version + 2);

    let after = reviewer.get_history(&plan.id).await.unwrap();
    assert_eq!(after.len(), 2);
    // The original entry is untouched.
    assert_eq!(after[1], history[0]);

    let err = reviewer.rollback(&history[0].id, "user").await.unwrap_err();
    assert!(matches!(err, CairnError::InvalidState { .. }));
}

#[tokio::test]
async fn test_rollback_of_removed_item_reinserts_it() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let reviewer = planner.reviewer();
    let coffee = plan.items()[1].clone();
    let enhancement = reviewer
        .save(Enhancement::new(
            &plan.id,
            EnhancementKind::Optimization,
            vec![Change::new(
                ChangeOperation::Remove,
                format!("/structured/items/@{}", coffee.id),
                json!(null),
                "Skip coffee",
            )],
            0.6,
            "",
        ))
        .await
        .unwrap();
    reviewer.approve(&enhancement.id, None, "user").await.unwrap();
    assert_eq!(planner.get_plan(&plan.id).await.unwrap().unwrap().items().len(), 2);

    let entry = reviewer.get_history(&plan.id).await.unwrap().remove(0);
    reviewer.rollback(&entry.id, "user").await.unwrap();

    let restored = planner.get_plan(&plan.id).await.unwrap().unwrap();
    assert_eq!(restored.items()[1], coffee);
}

#[tokio::test]
async fn test_rollback_enhancement_reverses_in_order() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let reviewer = planner.reviewer();
    let enhancement = reviewer.save(three_changes(&plan)).await.unwrap();
    reviewer.approve(&enhancement.id, None, "user").await.unwrap();
    let forward = reviewer
        .get_enhancement_history(&enhancement.id)
        .await
        .unwrap();
    assert_eq!(forward.len(), 3);

    let rollbacks = reviewer
        .rollback_enhancement(&enhancement.id, "user")
        .await
        .expect("rollback enhancement");

    assert_eq!(rollbacks.len(), 3);
    let undone: Vec<&str> = rollbacks
        .iter()
        .filter_map(|entry| entry.rolled_back_entry_id.as_deref())
        .collect();
    assert_eq!(undone, vec![forward[2].id.as_str(), forward[1].id.as_str(), forward[0].id.as_str()]);

    let restored = planner.get_plan(&plan.id).await.unwrap().unwrap();
    assert_eq!(restored.structured, plan.structured);

    // Nothing left to undo.
    let again = reviewer
        .rollback_enhancement(&enhancement.id, "user")
        .await
        .unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn test_clear_history_prunes_by_age() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let reviewer = planner.reviewer();
    let enhancement = reviewer.save(three_changes(&plan)).await.unwrap();
    reviewer.approve(&enhancement.id, None, "user").await.unwrap();

    assert_eq!(reviewer.clear_history(&plan.id, None).await.unwrap(), 0);
    assert_eq!(
        reviewer
            .clear_history(&plan.id, Some(jiff::SignedDuration::ZERO))
            .await
            .unwrap(),
        3
    );
    assert!(reviewer.get_history(&plan.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_batch_approve_aggregates_per_enhancement() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let reviewer = planner.reviewer();
    let good = reviewer.save(three_changes(&plan)).await.unwrap();

    let result = reviewer
        .batch_approve(&[good.id.clone(), "unknown".to_string()], "user")
        .await;

    assert_eq!(result.successful, vec![good.id.clone()]);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].id, "unknown");
}

#[tokio::test]
async fn test_batch_reject_closes_each_enhancement() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let reviewer = planner.reviewer();
    let first = reviewer.save(three_changes(&plan)).await.unwrap();
    let second = reviewer.save(three_changes(&plan)).await.unwrap();

    let result = reviewer
        .batch_reject(&[first.id.clone(), second.id.clone()], Some("Not now"), "user")
        .await;

    assert_eq!(result.successful, vec![first.id.clone(), second.id.clone()]);
    assert!(result.failed.is_empty());
    for id in [&first.id, &second.id] {
        let stored = reviewer.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, EnhancementStatus::Rejected);
        assert_eq!(stored.feedback.as_deref(), Some("Not now"));
    }
    assert_eq!(planner.get_plan(&plan.id).await.unwrap().unwrap(), plan);
}

#[tokio::test]
async fn test_batch_failures_are_published() {
    let planner = planner_with(Stores::in_memory()).await;
    let reviewer = planner.reviewer();
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    planner.notifier().subscribe(EventName::Error, move |event| {
        if let Event::Error(error) = event {
            sink.lock().unwrap().push(error.operation.clone());
        }
    });

    let missing = vec!["missing".to_string()];
    assert_eq!(reviewer.batch_approve(&missing, "user").await.failed.len(), 1);
    assert_eq!(
        reviewer.batch_reject(&missing, None, "user").await.failed.len(),
        1
    );

    assert_eq!(
        *errors.lock().unwrap(),
        vec!["batch_approve".to_string(), "batch_reject".to_string()]
    );
}

#[tokio::test]
async fn test_tag_and_goal_renames_roll_back() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let plan = planner
        .update_plan(UpdatePlan::new(&plan.id).goals(vec!["Wake early".to_string()]))
        .await
        .unwrap();
    let reviewer = planner.reviewer();
    let enhancement = reviewer
        .save(Enhancement::new(
            &plan.id,
            EnhancementKind::Categorization,
            vec![
                Change::new(
                    ChangeOperation::Modify,
                    "/structured/tags/@daily",
                    json!("weekly"),
                    "Less often",
                ),
                Change::new(
                    ChangeOperation::Modify,
                    "/structured/goals/0",
                    json!("Wake rested"),
                    "Focus on rest",
                ),
            ],
            0.7,
            "",
        ))
        .await
        .unwrap();
    reviewer.approve(&enhancement.id, None, "user").await.unwrap();
    let renamed = planner.get_plan(&plan.id).await.unwrap().unwrap();
    assert!(renamed.structured.tags.contains("weekly"));
    assert_eq!(renamed.structured.goals, vec!["Wake rested".to_string()]);

    let history = reviewer.get_history(&plan.id).await.unwrap();
    for entry in &history {
        reviewer.rollback(&entry.id, "user").await.expect("rollback");
    }

    let restored = planner.get_plan(&plan.id).await.unwrap().unwrap();
    assert_eq!(restored.structured, plan.structured);
}

#[tokio::test]
async fn test_adding_existing_tag_is_not_applied() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let reviewer = planner.reviewer();
    let enhancement = reviewer
        .save(Enhancement::new(
            &plan.id,
            EnhancementKind::Categorization,
            vec![Change::new(
                ChangeOperation::Add,
                "/structured/tags",
                json!("daily"),
                "Tag as daily",
            )],
            0.5,
            "",
        ))
        .await
        .unwrap();

    let result = reviewer.approve(&enhancement.id, None, "user").await.unwrap();

    assert!(result.successful.is_empty());
    assert_eq!(result.failed.len(), 1);
    assert_eq!(planner.get_plan(&plan.id).await.unwrap().unwrap(), plan);
    assert!(reviewer.get_history(&plan.id).await.unwrap().is_empty());
    let stored = reviewer.get(&enhancement.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EnhancementStatus::Pending);
}

#[tokio::test]
async fn test_approval_marks_items_complete_through_paths() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let reviewer = planner.reviewer();
    let target = format!("/structured/items/@{}/status", plan.items()[2].id);
    let enhancement = reviewer
        .save(Enhancement::new(
            &plan.id,
            EnhancementKind::Schedule,
            vec![Change::new(ChangeOperation::Modify, target, json!("completed"), "Done")],
            0.9,
            "",
        ))
        .await
        .unwrap();

    reviewer.approve(&enhancement.id, None, "user").await.unwrap();

    let updated = planner.get_plan(&plan.id).await.unwrap().unwrap();
    assert_eq!(updated.items()[2].status, ItemStatus::Completed);
    assert_eq!(updated.completion_percentage(), 33);
}

/// Delegates to a memory store but can refuse to record applications.
struct BrittleEnhancements {
    inner: Arc<MemoryStore>,
    refuse: AtomicBool,
}

#[async_trait]
impl EnhancementStore for BrittleEnhancements {
    async fn save(&self, enhancement: &Enhancement) -> StoreResult<()> {
        self.inner.save(enhancement).await
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Enhancement>> {
        EnhancementStore::get(self.inner.as_ref(), id).await
    }

    async fn list_for_plan(&self, plan_id: &str) -> StoreResult<Vec<Enhancement>> {
        self.inner.list_for_plan(plan_id).await
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        EnhancementStore::delete(self.inner.as_ref(), id).await
    }

    async fn record_application(
        &self,
        enhancement: &Enhancement,
        entries: &[ChangeHistoryEntry],
    ) -> StoreResult<()> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("history table locked".into()));
        }
        self.inner.record_application(enhancement, entries).await
    }

    async fn get_history_entry(&self, id: &str) -> StoreResult<Option<ChangeHistoryEntry>> {
        self.inner.get_history_entry(id).await
    }

    async fn history_for_plan(&self, plan_id: &str) -> StoreResult<Vec<ChangeHistoryEntry>> {
        self.inner.history_for_plan(plan_id).await
    }

    async fn history_for_enhancement(
        &self,
        enhancement_id: &str,
    ) -> StoreResult<Vec<ChangeHistoryEntry>> {
        self.inner.history_for_enhancement(enhancement_id).await
    }

    async fn delete_history_before(&self, plan_id: &str, cutoff: Timestamp) -> StoreResult<usize> {
        self.inner.delete_history_before(plan_id, cutoff).await
    }
}

#[tokio::test]
async fn test_failed_history_write_leaves_rollback_unapplied() {
    let memory = Arc::new(MemoryStore::new());
    let brittle = Arc::new(BrittleEnhancements {
        inner: memory.clone(),
        refuse: AtomicBool::new(false),
    });
    let planner = planner_with(Stores {
        documents: memory.clone(),
        queue: memory.clone(),
        enhancements: brittle.clone(),
    })
    .await;
    let plan = seeded(&planner).await;
    let reviewer = planner.reviewer();
    let enhancement = reviewer.save(three_changes(&plan)).await.unwrap();
    reviewer.approve(&enhancement.id, None, "user").await.unwrap();
    let approved = planner.get_plan(&plan.id).await.unwrap().unwrap();
    let history = reviewer.get_history(&plan.id).await.unwrap();

    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    planner.notifier().subscribe(EventName::Error, move |event| {
        if let Event::Error(error) = event {
            sink.lock().unwrap().push(error.operation.clone());
        }
    });

    brittle.refuse.store(true, Ordering::SeqCst);
    let err = reviewer.rollback(&history[0].id, "user").await.unwrap_err();
    assert!(matches!(err, CairnError::Storage { .. }));

    assert_eq!(planner.get_plan(&plan.id).await.unwrap().unwrap(), approved);
    assert_eq!(reviewer.get_history(&plan.id).await.unwrap(), history);
    assert_eq!(*errors.lock().unwrap(), vec!["rollback".to_string()]);

    // Once storage recovers the same rollback goes through.
    brittle.refuse.store(false, Ordering::SeqCst);
    reviewer.rollback(&history[0].id, "user").await.expect("rollback");
}

/// Fails a scripted number of calls before answering.
struct ScriptedGenerator {
    failures: usize,
    retryable: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl SuggestionGenerator for ScriptedGenerator {
    async fn generate(&self, plan: &Plan, _options: &SuggestionOptions) -> Result<Vec<Enhancement>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
            return Err(CairnError::service("rate limited", self.retryable));
        }
        let mut low = three_changes(plan);
        low.confidence = 0.2;
        Ok(vec![three_changes(plan), low])
    }
}

fn quick_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: std::time::Duration::from_millis(1),
        max_delay: std::time::Duration::from_millis(5),
    }
}

#[tokio::test]
async fn test_retryable_generator_failure_is_retried() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let generator = ScriptedGenerator {
        failures: 2,
        retryable: true,
        calls: AtomicUsize::new(0),
    };
    let options = SuggestionOptions {
        min_confidence: 0.5,
        ..Default::default()
    };

    let stored = planner
        .reviewer()
        .request_suggestions(&plan.id, &generator, &options, &quick_retry())
        .await
        .expect("suggestions");

    assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
    assert_eq!(stored.len(), 1);
    assert!(stored[0].is_pending());
}

#[tokio::test]
async fn test_non_retryable_generator_failure_surfaces() {
    let planner = planner_with(Stores::in_memory()).await;
    let plan = seeded(&planner).await;
    let generator = ScriptedGenerator {
        failures: 1,
        retryable: false,
        calls: AtomicUsize::new(0),
    };

    let err = planner
        .reviewer()
        .request_suggestions(&plan.id, &generator, &SuggestionOptions::default(), &quick_retry())
        .await
        .unwrap_err();

    assert!(matches!(err, CairnError::Service { retryable: false, .. }));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    assert!(planner.reviewer().list_for_plan(&plan.id).await.unwrap().is_empty());
}

#[test]
fn test_retry_delay_doubles_and_caps() {
    let policy = RetryPolicy {
        max_attempts: 5,
        base_delay: std::time::Duration::from_millis(100),
        max_delay: std::time::Duration::from_millis(350),
    };
    assert_eq!(policy.delay_for(1).as_millis(), 100);
    assert_eq!(policy.delay_for(2).as_millis(), 200);
    assert_eq!(policy.delay_for(3).as_millis(), 350);
}
