//! Mapping between source file paths and dotted module names.

use std::path::{Component, Path};

use crate::error::{Error, Result};

/// Dotted module name of an internal source file, e.g. `pkg.sub.mod`
pub type ModuleId = String;

/// File name that marks a directory as a package
pub const PACKAGE_INITIALIZER: &str = "__init__.py";

/// Split `file_path` into its segments relative to `root`.
///
/// The last segment keeps its file name and extension.
pub fn relative_parts(root: &Path, file_path: &Path) -> Result<Vec<String>> {
    let invalid = || Error::InvalidPath {
        path: file_path.to_path_buf(),
        root: root.to_path_buf(),
    };

    let relative = file_path.strip_prefix(root).map_err(|_| invalid())?;

    // `..` or `.` could lead back out of the root
    let parts = relative
        .components()
        .map(|component| match component {
            Component::Normal(part) => Ok(part.to_string_lossy().into_owned()),
            _ => Err(invalid()),
        })
        .collect::<Result<Vec<String>>>()?;

    if parts.is_empty() {
        return Err(invalid());
    }

    Ok(parts)
}

/// Convert a file path under `root` into its module name.
///
/// `pkg/sub/mod.py` becomes `pkg.sub.mod` and `pkg/sub/__init__.py` becomes `pkg.sub`.
/// The root itself is not a package, so an `__init__.py` directly inside it is rejected.
pub fn module_id(root: &Path, file_path: &Path) -> Result<ModuleId> {
    let mut parts = relative_parts(root, file_path)?;

    if parts.last().is_some_and(|name| name == PACKAGE_INITIALIZER) {
        parts.pop();
        if parts.is_empty() {
            return Err(Error::RootPackageInitializer {
                path: file_path.to_path_buf(),
            });
        }
    } else if let Some(last) = parts.last_mut() {
        if let Some(stem) = Path::new(last.as_str()).file_stem() {
            *last = stem.to_string_lossy().into_owned();
        }
    }

    Ok(parts.join("."))
}
