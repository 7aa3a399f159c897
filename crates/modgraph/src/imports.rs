//! Extraction of raw import targets from a single Python source file.
//!
//! Every import statement in the file is expanded to a fully-qualified dotted name:
//! relative imports are anchored at the file's own location and names pulled through
//! the lazy-import facade are recorded as themselves.

use indexmap::IndexSet;
use log::trace;
use ruff_text_size::TextRange;
use std::path::Path;

use crate::error::{Error, Result};
use crate::util::join_dotted;
use crate::visitors::{DiscoveredImport, ImportDiscoveryVisitor};

/// Where the file being scanned sits in the tree
#[derive(Debug, Clone, Copy)]
pub struct ImportContext<'a> {
    /// Path of the file, used for error reporting only
    pub path: &'a Path,
    /// Path segments relative to the tree root, including the file name
    pub relative_parts: &'a [String],
    /// Dotted name of the facade package that re-exports external modules
    pub facade: &'a str,
}

/// Parse `source` and return the set of raw imports it contains.
pub fn extract_imports(source: &str, context: ImportContext<'_>) -> Result<IndexSet<String>> {
    let parsed = ruff_python_parser::parse_module(source).map_err(|source| Error::Parse {
        path: context.path.to_path_buf(),
        source,
    })?;

    let mut visitor = ImportDiscoveryVisitor::new();
    visitor.visit_module(parsed.syntax());

    let mut imports = IndexSet::new();
    for discovered in visitor.into_imports() {
        match discovered {
            DiscoveredImport::Import { modules, range } => {
                trace!("{:?} imports {:?} at {:?}", context.path, modules, range);
                imports.extend(modules);
            }
            DiscoveredImport::ImportFrom {
                module,
                names,
                level,
                range,
            } => expand_import_from(
                module.as_deref(),
                &names,
                level,
                range,
                context,
                &mut imports,
            )?,
        }
    }

    trace!("Raw imports of {:?}: {:?}", context.path, imports);
    Ok(imports)
}

fn expand_import_from(
    module: Option<&str>,
    names: &[String],
    level: u32,
    range: TextRange,
    context: ImportContext<'_>,
    imports: &mut IndexSet<String>,
) -> Result<()> {
    if level == 0 {
        let module = module.unwrap_or_default();
        if is_facade(module, context.facade) {
            imports.extend(names.iter().cloned());
        } else {
            imports.extend(names.iter().map(|name| join_dotted(module, name)));
        }
        return Ok(());
    }

    let mut base = relative_base(level, range, context)?;
    if let Some(module) = module {
        base = join_dotted(&base, module);
    }
    imports.extend(names.iter().map(|name| join_dotted(&base, name)));
    Ok(())
}

/// The facade itself or any of its submodules
fn is_facade(module: &str, facade: &str) -> bool {
    !facade.is_empty()
        && module
            .strip_prefix(facade)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

/// Resolve the package a relative import of `level` refers to.
///
/// The file's own segments are trimmed by `level`: one dot is the containing package,
/// two dots its parent, and so on.
fn relative_base(level: u32, range: TextRange, context: ImportContext<'_>) -> Result<String> {
    let parts = context.relative_parts;
    let depth = parts.len().saturating_sub(1);
    let keep = usize::try_from(level)
        .ok()
        .filter(|&level| level <= depth)
        .map(|level| parts.len() - level)
        .ok_or_else(|| Error::InvalidImportLevel {
            path: context.path.to_path_buf(),
            offset: range.start().into(),
            level,
            depth,
        })?;

    Ok(parts[..keep].join("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parts(path: &str) -> Vec<String> {
        path.split('/').map(str::to_owned).collect()
    }

    fn extract(path: &str, source: &str, facade: &str) -> Result<Vec<String>> {
        let relative_parts = parts(path);
        let context = ImportContext {
            path: Path::new(path),
            relative_parts: &relative_parts,
            facade,
        };
        let mut imports: Vec<String> = extract_imports(source, context)?.into_iter().collect();
        imports.sort();
        Ok(imports)
    }

    #[test]
    fn test_plain_import_is_verbatim() {
        let imports = extract("pkg/mod.py", "import a.b.c\nimport os as operating_system\n", "")
            .unwrap();
        assert_eq!(imports, vec!["a.b.c", "os"]);
    }

    #[test]
    fn test_from_import_appends_names() {
        let imports = extract("pkg/mod.py", "from os.path import join, exists\n", "").unwrap();
        assert_eq!(imports, vec!["os.path.exists", "os.path.join"]);
    }

    #[test]
    fn test_facade_is_transparent() {
        let imports = extract(
            "pkg/sub/mod.py",
            "from pkg._imports import numpy, scipy\n",
            "pkg._imports",
        )
        .unwrap();
        assert_eq!(imports, vec!["numpy", "scipy"]);
    }

    #[test]
    fn test_facade_requires_dotted_boundary() {
        let imports = extract(
            "pkg/sub/mod.py",
            "from pkg._imports_extra import thing\n",
            "pkg._imports",
        )
        .unwrap();
        assert_eq!(imports, vec!["pkg._imports_extra.thing"]);
    }

    #[test]
    fn test_relative_import_levels() {
        let level_one = extract("pkg/a/b/mod.py", "from . import helper\n", "").unwrap();
        assert_eq!(level_one, vec!["pkg.a.b.helper"]);

        let level_two = extract("pkg/a/b/mod.py", "from .. import helper\n", "").unwrap();
        assert_eq!(level_two, vec!["pkg.a.helper"]);
    }

    #[test]
    fn test_relative_import_with_module() {
        let imports = extract("pkg/a/b/mod.py", "from ..c.d import thing\n", "").unwrap();
        assert_eq!(imports, vec!["pkg.a.c.d.thing"]);
    }

    #[test]
    fn test_relative_import_from_package_initializer() {
        let imports = extract("pkg/sub/__init__.py", "from .core import run\n", "").unwrap();
        assert_eq!(imports, vec!["pkg.sub.core.run"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let imports = extract(
            "pkg/mod.py",
            "import numpy\nimport numpy\n\ndef f():\n    import numpy\n",
            "",
        )
        .unwrap();
        assert_eq!(imports, vec!["numpy"]);
    }

    #[test]
    fn test_level_beyond_depth_is_rejected() {
        let err = extract("pkg/a/mod.py", "from ..... import x\n", "").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidImportLevel {
                level: 5,
                depth: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_level_reaching_root_is_rejected() {
        // `pkg/mod.py` sits one directory deep, so `..` leaves the tree
        let err = extract("pkg/mod.py", "from .. import x\n", "").unwrap_err();
        assert!(matches!(err, Error::InvalidImportLevel { level: 2, .. }));
    }

    #[test]
    fn test_level_error_reports_statement_offset() {
        let source = "import os\nfrom ... import x\n";
        let err = extract("pkg/a/mod.py", source, "").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidImportLevel {
                offset: 10,
                level: 3,
                ..
            }
        ));
        assert!(err.to_string().contains("at offset 10"));
    }

    #[test]
    fn test_invalid_syntax() {
        let err = extract("pkg/mod.py", "def broken(:\n", "").unwrap_err();
        assert!(err.is_parse_error());
    }
}
