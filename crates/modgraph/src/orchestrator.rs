use indexmap::{IndexMap, IndexSet};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{Config, ParseErrorPolicy};
use crate::discovery::discover_python_files;
use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::imports::{ImportContext, extract_imports};
use crate::locator::{ModuleId, PACKAGE_INITIALIZER, module_id, relative_parts};
use crate::resolver::{ConversionTable, Dependency, InternalModuleSet, Resolver};
use crate::util::normalize_line_endings;

/// Suffix appended to the package name when no facade is configured
const DEFAULT_FACADE_SUFFIX: &str = "_imports";

/// Everything an analysis run needs besides the files themselves
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    /// Top-level name of the internal package, e.g. `pymedphys`
    pub package: String,
    /// Dotted name of the lazy-import facade, e.g. `pymedphys._imports`
    pub facade: String,
    pub conversions: ConversionTable,
    pub on_parse_error: ParseErrorPolicy,
}

impl AnalysisSettings {
    /// Settings with the default facade, the built-in conversion table and strict parsing
    pub fn new(package: impl Into<String>) -> Self {
        let package = package.into();
        Self {
            facade: format!("{package}.{DEFAULT_FACADE_SUFFIX}"),
            package,
            conversions: ConversionTable::builtin().clone(),
            on_parse_error: ParseErrorPolicy::default(),
        }
    }

    /// Build settings from configuration, inferring the package name from `root` if unset
    pub fn from_config(config: &Config, root: &Path) -> Result<Self> {
        let package = match &config.package {
            Some(package) if !package.is_empty() => package.clone(),
            _ => infer_package(root)?,
        };

        let mut settings = Self::new(package);
        if let Some(facade) = &config.facade {
            settings.facade.clone_from(facade);
        }
        settings.conversions = settings
            .conversions
            .with_overrides(&ConversionTable::from_pairs(&config.conversions));
        settings.on_parse_error = config.parse_error_policy();
        Ok(settings)
    }
}

/// A file left out of the graph because it could not be parsed
#[derive(Debug)]
pub struct SkippedFile {
    pub module: ModuleId,
    pub path: PathBuf,
    pub error: Error,
}

/// Result of an analysis run
#[derive(Debug)]
pub struct Analysis {
    pub graph: DependencyGraph,
    /// Files skipped under [`ParseErrorPolicy::Skip`], in module order
    pub skipped: Vec<SkippedFile>,
}

/// Walk `root` for Python files and analyze all of them
pub fn analyze_tree(root: &Path, settings: &AnalysisSettings) -> Result<Analysis> {
    let files = discover_python_files(root);
    analyze(root, files, settings)
}

/// Build the dependency graph of `files`, all of which must live under `root`.
///
/// Every file is located first so the full set of internal modules is known before any
/// import is resolved. Files are then processed independently.
pub fn analyze<I, P>(root: &Path, files: I, settings: &AnalysisSettings) -> Result<Analysis>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let located = locate_modules(root, files)?;
    let internal_modules: InternalModuleSet = located.keys().cloned().collect();
    info!(
        "Located {} modules under {:?} (package `{}`)",
        internal_modules.len(),
        root,
        settings.package
    );

    let resolver = Resolver::new(
        &settings.package,
        &internal_modules,
        &settings.conversions,
    );

    let located: Vec<(ModuleId, PathBuf)> = located.into_iter().collect();
    let outcomes: Vec<Result<IndexSet<Dependency>>> = located
        .par_iter()
        .map(|(module, path)| {
            debug!("Analyzing {} ({:?})", module, path);
            module_dependencies(root, path, &settings.facade, &resolver)
        })
        .collect();

    let mut modules = Vec::with_capacity(located.len());
    let mut skipped = Vec::new();
    for ((module, path), outcome) in located.into_iter().zip(outcomes) {
        match outcome {
            Ok(dependencies) => modules.push((module, dependencies)),
            Err(error)
                if error.is_parse_error() && settings.on_parse_error == ParseErrorPolicy::Skip =>
            {
                warn!("Skipping {}: {}", module, error);
                skipped.push(SkippedFile {
                    module,
                    path,
                    error,
                });
            }
            Err(error) => return Err(error),
        }
    }

    let graph = DependencyGraph::from_modules(modules);
    let cycles = graph.cycles();
    if !cycles.is_empty() {
        info!("Found {} import cycles between internal modules", cycles.len());
    }
    info!(
        "Dependency graph built with {} modules ({} skipped)",
        graph.len(),
        skipped.len()
    );
    Ok(Analysis { graph, skipped })
}

/// Map every file to its module name, sorted by module name
fn locate_modules<I, P>(root: &Path, files: I) -> Result<IndexMap<ModuleId, PathBuf>>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let mut paths: Vec<PathBuf> = files.into_iter().map(Into::into).collect();
    paths.sort();
    paths.dedup();

    let mut located: IndexMap<ModuleId, PathBuf> = IndexMap::with_capacity(paths.len());
    for path in paths {
        let module = module_id(root, &path)?;
        if let Some(first) = located.get(&module) {
            return Err(Error::DuplicateModule {
                module,
                first: first.clone(),
                second: path,
            });
        }
        located.insert(module, path);
    }

    located.sort_keys();
    Ok(located)
}

/// Read, parse and resolve a single file
fn module_dependencies(
    root: &Path,
    path: &Path,
    facade: &str,
    resolver: &Resolver<'_>,
) -> Result<IndexSet<Dependency>> {
    let source = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::InvalidData => Error::Decode {
            path: path.to_path_buf(),
            source,
        },
        _ => Error::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let source = normalize_line_endings(source);

    let parts = relative_parts(root, path)?;
    let context = ImportContext {
        path,
        relative_parts: &parts,
        facade,
    };

    extract_imports(&source, context)?
        .iter()
        .map(|raw| resolver.resolve(raw))
        .collect()
}

/// The single top-level directory under `root` that is a package
fn infer_package(root: &Path) -> Result<String> {
    let entries = fs::read_dir(root).map_err(|source| Error::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let mut packages: Vec<String> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.join(PACKAGE_INITIALIZER).is_file())
        .filter_map(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
        .collect();

    match packages.len() {
        1 => {
            let package = packages.remove(0);
            debug!("Inferred package name `{}` from {:?}", package, root);
            Ok(package)
        }
        _ => Err(Error::MissingPackageName {
            root: root.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_duplicate_module_is_rejected() {
        let root = Path::new("/tree");
        let err = locate_modules(
            root,
            [root.join("pkg/mod.py"), root.join("pkg/mod/__init__.py")],
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateModule { ref module, .. } if module == "pkg.mod"));
    }

    #[test]
    fn test_locate_sorts_by_module() {
        let root = Path::new("/tree");
        let located = locate_modules(
            root,
            [root.join("pkg/z.py"), root.join("pkg/__init__.py"), root.join("pkg/a.py")],
        )
        .unwrap();
        assert_eq!(
            located.keys().cloned().collect::<Vec<_>>(),
            vec!["pkg", "pkg.a", "pkg.z"]
        );
    }

    #[test]
    fn test_infer_package() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "mypkg/__init__.py", "");
        write(temp.path(), "scripts/run.py", "");
        assert_eq!(infer_package(temp.path()).unwrap(), "mypkg");

        write(temp.path(), "otherpkg/__init__.py", "");
        assert!(matches!(
            infer_package(temp.path()),
            Err(Error::MissingPackageName { .. })
        ));
    }

    #[test]
    fn test_settings_from_config() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "mypkg/__init__.py", "");

        let mut config = Config::default();
        config
            .conversions
            .insert("cv2".to_owned(), "opencv-python".to_owned());
        let settings = AnalysisSettings::from_config(&config, temp.path()).unwrap();
        assert_eq!(settings.package, "mypkg");
        assert_eq!(settings.facade, "mypkg._imports");
        assert_eq!(settings.conversions.get("cv2"), Some("opencv-python"));
        assert_eq!(settings.conversions.get("PIL"), Some("Pillow"));
        assert_eq!(settings.on_parse_error, ParseErrorPolicy::Abort);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        let settings = AnalysisSettings::new("pkg");
        let err = analyze(
            temp.path(),
            [temp.path().join("pkg/__init__.py")],
            &settings,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_non_utf8_file_follows_parse_error_policy() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "pkg/__init__.py", "");
        write(temp.path(), "pkg/ok.py", "import numpy\n");
        let latin1 = temp.path().join("pkg/legacy.py");
        fs::write(
            &latin1,
            b"# -*- coding: latin-1 -*-\nname = '\xe9t\xe9'\n".as_slice(),
        )
        .unwrap();

        let mut settings = AnalysisSettings::new("pkg");
        settings.on_parse_error = ParseErrorPolicy::Skip;
        let analysis = analyze_tree(temp.path(), &settings).unwrap();
        assert_eq!(
            analysis.graph.modules().collect::<Vec<_>>(),
            vec!["pkg", "pkg.ok"]
        );
        assert_eq!(analysis.skipped.len(), 1);
        assert_eq!(analysis.skipped[0].module, "pkg.legacy");
        assert!(matches!(analysis.skipped[0].error, Error::Decode { .. }));

        settings.on_parse_error = ParseErrorPolicy::Abort;
        let err = analyze_tree(temp.path(), &settings).unwrap_err();
        assert!(matches!(err, Error::Decode { ref path, .. } if path == &latin1));
    }
}
