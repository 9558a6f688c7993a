//! Common test utilities for rust-sqllineage tests

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use rust_sqllineage::{AnalyzeOptions, LineageReport};

/// Test context with temporary directory for isolated test execution
pub struct TestContext {
    /// Kept to prevent temp directory cleanup until TestContext is dropped
    _temp_dir: TempDir,
    pub dump_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl TestContext {
    /// Create a new test context by copying a fixture to a temp directory
    pub fn with_fixture(fixture_name: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let fixture_path = fixture_path(fixture_name);

        let dump_dir = temp_dir.path().join("dump");
        let output_dir = temp_dir.path().join("out");

        copy_dir_recursive(&fixture_path, &dump_dir).expect("Failed to copy fixture");

        Self {
            _temp_dir: temp_dir,
            dump_dir,
            output_dir,
        }
    }

    /// Create an empty dump directory
    pub fn empty() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dump_dir = temp_dir.path().join("dump");
        let output_dir = temp_dir.path().join("out");
        fs::create_dir_all(&dump_dir).expect("Failed to create dump directory");

        Self {
            _temp_dir: temp_dir,
            dump_dir,
            output_dir,
        }
    }

    /// Add or replace a file in the dump directory
    pub fn write_file(&self, name: &str, content: &str) {
        fs::write(self.dump_dir.join(name), content).expect("Failed to write dump file");
    }

    pub fn options(&self) -> AnalyzeOptions {
        let mut options = AnalyzeOptions::new(&self.dump_dir);
        options.output_path = Some(self.output_dir.join(rust_sqllineage::LINEAGE_FILE_NAME));
        options.dot_path = Some(self.output_dir.join(rust_sqllineage::GRAPH_FILE_NAME));
        options
    }

    /// Run the full pipeline, panicking on failure
    pub fn analyze_successfully(&self) -> (LineageReport, PathBuf) {
        match rust_sqllineage::analyze_dump(&self.options()) {
            Ok(result) => result,
            Err(e) => panic!("Analysis failed for {}: {:#}", self.dump_dir.display(), e),
        }
    }
}

/// Get the path to a test fixture
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Sorted owned strings, for comparing against graph sets
pub fn names(items: &[&str]) -> Vec<String> {
    let mut names: Vec<String> = items.iter().map(|s| s.to_string()).collect();
    names.sort();
    names
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}
