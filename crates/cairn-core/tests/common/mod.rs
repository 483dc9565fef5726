use cairn_core::{Planner, PlannerBuilder};
use tempfile::TempDir;

/// Helper function to create a test planner backed by a throwaway database
pub async fn create_test_planner() -> (TempDir, Planner) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let planner = PlannerBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create planner");
    (temp_dir, planner)
}

/// Same as [`create_test_planner`], starting offline
#[allow(dead_code)]
pub async fn create_offline_planner() -> (TempDir, Planner) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let planner = PlannerBuilder::new()
        .with_database_path(Some(&db_path))
        .offline(true)
        .build()
        .await
        .expect("Failed to create planner");
    (temp_dir, planner)
}
