use std::path::PathBuf;

use tempfile::TempDir;
use waypoint_core::{PlanRegistry, PlanRegistryBuilder};

/// Helper function to create a temporary directory and database path
pub fn create_test_environment() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path = temp_dir.path().join("waypoint.db");
    (temp_dir, db_path)
}

/// Helper function to create a registry over a fresh SQLite file
pub async fn create_test_registry() -> (TempDir, PathBuf, PlanRegistry) {
    let (temp_dir, db_path) = create_test_environment();
    let registry = PlanRegistryBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create registry");
    (temp_dir, db_path, registry)
}
