use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary notes directory
pub fn create_test_notes_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a file inside the notes directory, relative to its root
pub fn create_test_file(notes_dir: &TempDir, relative_path: &str, content: &str) -> PathBuf {
    let file_path = notes_dir.path().join(relative_path);
    fs::write(&file_path, content).unwrap();
    file_path
}
