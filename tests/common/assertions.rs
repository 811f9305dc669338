//! Custom assertions for release directories

use std::path::Path;

/// Assert that every expected file exists in `dir`
pub fn assert_files_exist(dir: &Path, expected_files: &[&str]) {
    for file in expected_files {
        let path = dir.join(file);
        assert!(path.exists(), "expected file {} to exist", path.display());
    }
}

/// Assert that `path` does not exist
pub fn assert_absent(path: &Path) {
    assert!(!path.exists(), "expected {} to be removed", path.display());
}

/// Names of the entries in `dir`, sorted
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
