//! Fixtures shared by the integration tests.

use std::{fs, path::Path};

use rstest::fixture;
use tempfile::TempDir;

/// Return an empty temporary directory for pooled or rotated files.
#[fixture]
pub fn output_dir() -> TempDir {
    tempfile::tempdir().expect("create temp output dir")
}

/// Concatenate every file in `dir`, in no particular order.
pub fn read_all_files(dir: &Path) -> String {
    let mut contents = String::new();
    for entry in fs::read_dir(dir).expect("read output dir") {
        let path = entry.expect("dir entry").path();
        contents.push_str(&fs::read_to_string(&path).expect("read output file"));
    }
    contents
}
