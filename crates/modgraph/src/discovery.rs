use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Check if a path is a Python source file (`.py`, matched exactly like the locator does)
fn is_python_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "py")
}

/// Collect every Python file below `root`, sorted by path.
///
/// Entries that cannot be read are logged and left out.
pub fn discover_python_files(root: &Path) -> Vec<PathBuf> {
    debug!("Scanning source directory: {:?}", root);

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.into_path()),
            Err(err) => {
                warn!("Failed to read directory entry: {err}");
                None
            }
        })
        .filter(|path| is_python_file(path))
        .collect();

    files.sort();
    debug!("Found {} Python files", files.len());
    files
}
