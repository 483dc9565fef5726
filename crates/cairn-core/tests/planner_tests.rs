mod common;

use cairn_core::{
    cache::PlanCache, display::PlanSummaries, CairnError, Change, ChangeOperation, CreatePlan,
    Enhancement, EnhancementKind, EnhancementStatus, ItemStatus, NewItem, PlannerBuilder,
    UpdatePlan,
};
use serde_json::json;
use tempfile::TempDir;

use common::{create_offline_planner, create_test_planner};

#[tokio::test]
async fn test_complete_plan_workflow() {
    let (_temp_dir, planner) = create_test_planner().await;

    let plan = planner
        .create_plan(&CreatePlan::new("user-1", "Morning Routine").tags(["daily"]))
        .await
        .expect("Failed to create plan");
    assert_eq!(plan.version, 1);

    let plan = planner
        .add_item(&plan.id, NewItem::new("Stretch"))
        .await
        .expect("Failed to add item");
    let plan = planner
        .add_item(&plan.id, NewItem::new("Coffee"))
        .await
        .expect("Failed to add item");
    let plan = planner
        .add_item(&plan.id, NewItem::new("Wake up").at(0))
        .await
        .expect("Failed to insert item");

    let texts: Vec<&str> = plan.items().iter().map(|item| item.text.as_str()).collect();
    assert_eq!(texts, vec!["Wake up", "Stretch", "Coffee"]);
    let orders: Vec<u32> = plan.items().iter().map(|item| item.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    assert_eq!(plan.version, 4);

    let first = plan.items()[0].id.clone();
    let plan = planner
        .set_item_status(&plan.id, &first, ItemStatus::Completed)
        .await
        .expect("Failed to complete item");
    assert_eq!(plan.completion_percentage(), 33);

    let plan = planner
        .move_item(&plan.id, &first, 2)
        .await
        .expect("Failed to move item");
    assert_eq!(plan.items()[2].id, first);
    assert_eq!(plan.version, 6);

    let summaries = planner
        .list_plan_summaries("user-1")
        .await
        .expect("Failed to list summaries");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].completed_items, 1);
    assert_eq!(summaries[0].total_items, 3);

    let rendered = PlanSummaries(summaries).to_string();
    assert!(rendered.contains("## Morning Routine (1/3, 33%)"));
    assert!(rendered.contains("(v6)"));
}

#[tokio::test]
async fn test_database_persistence_across_connections() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("persist.db");

    let plan_id = {
        let planner = PlannerBuilder::new()
            .with_database_path(Some(&db_path))
            .build()
            .await
            .expect("Failed to create planner");
        let plan = planner
            .create_plan(&CreatePlan::new("user-1", "Persistent").content("Survives restarts"))
            .await
            .expect("Failed to create plan");
        planner
            .add_item(&plan.id, NewItem::new("Remember me"))
            .await
            .expect("Failed to add item");
        plan.id
    };

    let planner = PlannerBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to reopen planner");
    let plan = planner
        .get_plan(&plan_id)
        .await
        .expect("Failed to get plan")
        .expect("Plan should exist");

    assert_eq!(plan.content, "Survives restarts");
    assert_eq!(plan.version, 2);
    assert_eq!(plan.items()[0].text, "Remember me");
}

#[tokio::test]
async fn test_error_handling_invalid_operations() {
    let (_temp_dir, planner) = create_test_planner().await;

    let err = planner
        .create_plan(&CreatePlan::new("user-1", "  "))
        .await
        .expect_err("blank title should be rejected");
    assert!(matches!(err, CairnError::InvalidInput { .. }));

    let err = planner
        .update_plan(UpdatePlan::new("missing").title("Nope"))
        .await
        .expect_err("missing plan should be reported");
    assert!(matches!(err, CairnError::PlanNotFound { .. }));

    let plan = planner
        .create_plan(&CreatePlan::new("user-1", "Real"))
        .await
        .expect("Failed to create plan");
    let err = planner
        .remove_item(&plan.id, "no-such-item")
        .await
        .expect_err("unknown item should be reported");
    assert!(matches!(err, CairnError::ItemNotFound { .. }));

    let err = planner
        .update_plan(UpdatePlan::new(&plan.id).title("Stale").expected_version(7))
        .await
        .expect_err("stale version should conflict");
    assert!(matches!(err, CairnError::VersionConflict { .. }));

    // Failed operations must leave the stored plan alone
    let stored = planner.get_plan(&plan.id).await.unwrap().unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.title, "Real");
}

#[tokio::test]
async fn test_review_flow_against_sqlite() {
    let (_temp_dir, planner) = create_test_planner().await;
    let plan = planner
        .create_plan(&CreatePlan::new("user-1", "Evening"))
        .await
        .unwrap();
    let plan = planner
        .add_item(&plan.id, NewItem::new("Read"))
        .await
        .unwrap();
    let reviewer = planner.reviewer();

    let enhancement = reviewer
        .save(Enhancement::new(
            &plan.id,
            EnhancementKind::Categorization,
            vec![
                Change::new(
                    ChangeOperation::Add,
                    "/structured/tags",
                    json!("wind-down"),
                    "Tag it",
                ),
                Change::new(
                    ChangeOperation::Modify,
                    format!("/structured/items/@{}/status", plan.items()[0].id),
                    json!("in_progress"),
                    "Start reading",
                ),
            ],
            0.7,
            "Organize the evening",
        ))
        .await
        .expect("Failed to save enhancement");

    let result = reviewer
        .approve(&enhancement.id, None, "user-1")
        .await
        .expect("Failed to approve");
    assert_eq!(result.successful.len(), 2);
    assert!(result.failed.is_empty());

    let approved = planner.get_plan(&plan.id).await.unwrap().unwrap();
    assert_eq!(approved.version, plan.version + 1);
    assert!(approved.structured.tags.contains("wind-down"));
    assert_eq!(approved.items()[0].status, ItemStatus::InProgress);

    let stored = reviewer.get(&enhancement.id).await.unwrap().unwrap();
    assert_eq!(stored.status, EnhancementStatus::Approved);

    let history = reviewer.get_history(&plan.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|entry| entry.applied_by == "user-1"));

    let rollbacks = reviewer
        .rollback_enhancement(&enhancement.id, "user-1")
        .await
        .expect("Failed to roll back");
    assert_eq!(rollbacks.len(), 2);

    let restored = planner.get_plan(&plan.id).await.unwrap().unwrap();
    assert_eq!(restored.structured, plan.structured);
    assert_eq!(restored.version, plan.version + 3);
    assert_eq!(reviewer.get_history(&plan.id).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_offline_queue_survives_restart() {
    let (temp_dir, planner) = create_offline_planner().await;
    let plan = planner
        .create_plan(&CreatePlan::new("user-1", "Written offline"))
        .await
        .unwrap();
    planner.delete_plan(&plan.id).await.unwrap();
    drop(planner);

    let planner = PlannerBuilder::new()
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .offline(true)
        .build()
        .await
        .expect("Failed to reopen planner");

    let status = planner.get_sync_queue_status().await.unwrap();
    assert_eq!(status.pending_count, 2);
    assert!(status.items[0].snapshot.is_some());
    assert!(status.items[1].snapshot.is_none());

    let report = planner
        .set_online(true)
        .await
        .expect("Failed to go online")
        .expect("Going online drains the queue");
    assert_eq!(report.replayed.len(), 2);
    assert_eq!(planner.get_sync_queue_status().await.unwrap().pending_count, 0);
}

#[tokio::test]
async fn test_cache_follows_committed_mutations() {
    let (_temp_dir, planner) = create_test_planner().await;
    let cache = PlanCache::new();
    cache.attach(planner.notifier());

    let plan = planner
        .create_plan(&CreatePlan::new("user-1", "Cached"))
        .await
        .unwrap();
    assert_eq!(cache.get(&plan.id).map(|p| p.version), Some(1));

    let updated = cache
        .optimistic_update(
            &plan.id,
            |cached| cached.title = "Renamed".into(),
            planner.update_plan(UpdatePlan::new(&plan.id).title("Renamed")),
        )
        .await
        .expect("Failed to update");
    assert_eq!(updated.version, 2);
    assert_eq!(cache.get(&plan.id), Some(updated));

    // A rejected write restores the snapshot
    let err = cache
        .optimistic_update(
            &plan.id,
            |cached| cached.title = "Doomed".into(),
            planner.update_plan(UpdatePlan::new(&plan.id).title("Doomed").expected_version(1)),
        )
        .await
        .expect_err("stale write should fail");
    assert!(matches!(err, CairnError::VersionConflict { .. }));
    assert_eq!(cache.get(&plan.id).map(|p| p.title), Some("Renamed".to_string()));

    planner.delete_plan(&plan.id).await.unwrap();
    assert!(cache.is_empty());
}
