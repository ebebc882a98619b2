//! Common test utilities for the firm-screener tests

use std::path::PathBuf;

/// Creates an empty scratch directory unique to the calling test
#[allow(dead_code)]
pub fn scratch_dir(test_name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "firm-screener-{}-{}",
        test_name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
