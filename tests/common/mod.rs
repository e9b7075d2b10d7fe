#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use budget_tracker::{
    config::ConfigManager,
    core::BudgetTracker,
    ledger::{CategoryTaxonomy, MonthKey},
    storage::JsonStorage,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn month(year: i32, month: u32) -> MonthKey {
    MonthKey::new(year, month).expect("valid month")
}

/// Creates an isolated tracker backed by JSON files in a unique directory.
pub fn setup_test_env(selected: MonthKey) -> (BudgetTracker, JsonStorage, ConfigManager) {
    let base = temp_base();
    let storage = JsonStorage::new(Some(base.join("data"))).expect("create json storage backend");
    let tracker = BudgetTracker::open(
        Box::new(storage.clone()),
        CategoryTaxonomy::default(),
        selected,
    )
    .expect("open tracker");
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");

    (tracker, storage, config_manager)
}
