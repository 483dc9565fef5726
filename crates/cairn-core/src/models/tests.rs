#[cfg(test)]
mod model_tests {
    use jiff::{SignedDuration, Timestamp};

    use crate::models::{
        Change, ChangeOperation, Enhancement, EnhancementKind, ItemPatch, ItemStatus, Plan,
        PlanItem, PlanSummary, StructuredPatch, SyncQueueItem, SyncQueueStatus, Timing,
    };

    fn create_test_plan(statuses: &[ItemStatus]) -> Plan {
        let mut plan = Plan::new("owner-1", "Test Plan Title");
        plan.created_at = Timestamp::from_second(1640995200).unwrap(); // 2022-01-01 00:00:00 UTC
        plan.updated_at = Timestamp::from_second(1641081600).unwrap(); // 2022-01-02 00:00:00 UTC
        plan.structured.items = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                let mut item = PlanItem::new(format!("Item {i}"));
                item.status = *status;
                item
            })
            .collect();
        plan.reindex_items();
        plan
    }

    #[test]
    fn test_new_plan_starts_at_version_one() {
        let plan = Plan::new("owner-1", "Morning Routine");
        assert_eq!(plan.version, 1);
        assert!(plan.updated_at >= plan.created_at);
        assert!(plan.items().is_empty());
    }

    #[test]
    fn test_completion_percentage_empty_plan_is_zero() {
        let plan = create_test_plan(&[]);
        assert_eq!(plan.completion_percentage(), 0);
    }

    #[test]
    fn test_completion_percentage_rounds() {
        let plan = create_test_plan(&[
            ItemStatus::Completed,
            ItemStatus::Pending,
            ItemStatus::InProgress,
        ]);
        // 1/3 = 33.3%
        assert_eq!(plan.completion_percentage(), 33);

        let plan = create_test_plan(&[
            ItemStatus::Completed,
            ItemStatus::Completed,
            ItemStatus::Cancelled,
        ]);
        // 2/3 = 66.7%
        assert_eq!(plan.completion_percentage(), 67);

        let plan = create_test_plan(&[ItemStatus::Completed]);
        assert_eq!(plan.completion_percentage(), 100);
    }

    #[test]
    fn test_reindex_items_is_contiguous() {
        let mut plan = create_test_plan(&[ItemStatus::Pending; 4]);
        plan.structured.items.remove(1);
        plan.structured.items[0].order = 7;
        plan.reindex_items();

        let orders: Vec<u32> = plan.items().iter().map(|i| i.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_stamp_bumps_version_and_keeps_updated_after_created() {
        let mut plan = create_test_plan(&[]);
        plan.stamp();
        plan.stamp();
        assert_eq!(plan.version, 3);
        assert!(plan.updated_at >= plan.created_at);
    }

    #[test]
    fn test_structured_patch_merges_field_by_field() {
        let mut plan = create_test_plan(&[ItemStatus::Pending]);
        plan.structured.goals = vec!["ship it".to_string()];

        StructuredPatch {
            tags: Some(["health".to_string()].into_iter().collect()),
            ..Default::default()
        }
        .apply_to(&mut plan.structured);

        assert!(plan.structured.tags.contains("health"));
        assert_eq!(plan.structured.goals, vec!["ship it".to_string()]);
        assert_eq!(plan.items().len(), 1);
    }

    #[test]
    fn test_item_patch_clears_timing() {
        let mut item = PlanItem::new("Stretch");
        item.timing = Some(Timing {
            start: Some(Timestamp::from_second(1640995200).unwrap()),
            ..Default::default()
        });

        ItemPatch {
            timing: Some(None),
            status: Some(ItemStatus::Completed),
            ..Default::default()
        }
        .apply_to(&mut item);

        assert!(item.timing.is_none());
        assert!(item.is_completed());
        assert_eq!(item.text, "Stretch");
    }

    #[test]
    fn test_calendar_events_only_for_timed_items() {
        let mut plan = create_test_plan(&[ItemStatus::Pending, ItemStatus::Pending]);
        let start = Timestamp::from_second(1640995200).unwrap();
        plan.structured.items[1].timing = Some(Timing {
            start: Some(start),
            end: None,
            duration_minutes: Some(30),
        });

        let events = plan.calendar_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].item_id, plan.items()[1].id);
        assert_eq!(
            events[0].ends_at,
            Some(start.checked_add(SignedDuration::from_mins(30)).unwrap())
        );
    }

    #[test]
    fn test_enhancement_assigns_change_ids() {
        let enhancement = Enhancement::new(
            "plan-1",
            EnhancementKind::Structure,
            vec![
                Change::new(
                    ChangeOperation::Modify,
                    "/title",
                    serde_json::json!("New"),
                    "Rename",
                ),
                Change::new(
                    ChangeOperation::Add,
                    "/structured/goals",
                    serde_json::json!("Sleep more"),
                    "Add goal",
                ),
            ],
            0.8,
            "Tidy up",
        );

        assert!(!enhancement.id.is_empty());
        assert!(enhancement.changes.iter().all(|c| !c.id.is_empty()));
        assert_ne!(enhancement.changes[0].id, enhancement.changes[1].id);
        assert!(enhancement.is_pending());
    }

    #[test]
    fn test_find_change_by_stable_and_positional_id() {
        let enhancement = Enhancement::new(
            "plan-1",
            EnhancementKind::Schedule,
            vec![
                Change::new(ChangeOperation::Modify, "/title", "a".into(), "a"),
                Change::new(ChangeOperation::Modify, "/content", "b".into(), "b"),
            ],
            0.5,
            "",
        );

        let stable = enhancement.changes[1].id.clone();
        assert_eq!(enhancement.find_change(&stable).map(|(i, _)| i), Some(1));

        let positional = enhancement.positional_change_id(0);
        assert_eq!(enhancement.find_change(&positional).map(|(i, _)| i), Some(0));

        assert!(enhancement.find_change("nope").is_none());
        assert!(enhancement
            .find_change(&enhancement.positional_change_id(5))
            .is_none());
    }

    #[test]
    fn test_enhancement_deserializes_generator_payload() {
        let json = r#"{
            "plan_id": "plan-9",
            "kind": "categorization",
            "confidence": 0.7,
            "rationale": "Group by theme",
            "changes": [
                {"operation": "add", "target": "/structured/tags/-", "new_value": "fitness", "description": "Tag it"}
            ]
        }"#;

        let mut enhancement: Enhancement = serde_json::from_str(json).unwrap();
        assert!(enhancement.id.is_empty());
        enhancement.assign_identities();

        assert_eq!(enhancement.kind, EnhancementKind::Categorization);
        assert!(enhancement.is_pending());
        assert!(!enhancement.changes[0].id.is_empty());
    }

    #[test]
    fn test_sync_queue_status_counts() {
        let plan = Plan::new("o", "t");
        let mut live = SyncQueueItem::from_new(crate::models::NewSyncItem {
            operation: crate::models::SyncOperation::Create,
            plan_id: plan.id.clone(),
            snapshot: Some(plan.clone()),
        });
        let mut dead = live.clone();
        dead.dead_lettered = true;
        live.retry_count = 1;

        let status = SyncQueueStatus::from_items(vec![live, dead]);
        assert_eq!(status.pending_count, 1);
        assert_eq!(status.dead_letter_count, 1);
        assert_eq!(status.items.len(), 2);
    }

    #[test]
    fn test_plan_summary_from_plan() {
        let plan = create_test_plan(&[ItemStatus::Completed, ItemStatus::Pending]);
        let summary = PlanSummary::from(&plan);

        assert_eq!(summary.total_items, 2);
        assert_eq!(summary.completed_items, 1);
        assert_eq!(summary.completion_percentage, 50);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("in-progress".parse::<ItemStatus>(), Ok(ItemStatus::InProgress));
        assert_eq!("done".parse::<ItemStatus>(), Ok(ItemStatus::Completed));
        assert!("bogus".parse::<ItemStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&ItemStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
    }
}
