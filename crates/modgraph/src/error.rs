use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by the analysis core
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while locating modules, extracting imports and resolving names.
///
/// Locator and extractor errors are scoped to a single file. Resolver errors mean the
/// discovered module set and the imports disagree, and are never swallowed.
#[derive(Debug, Error)]
pub enum Error {
    /// A supplied file path is not located under the tree root
    #[error("{path:?} is not located under the tree root {root:?}")]
    InvalidPath { path: PathBuf, root: PathBuf },

    /// An `__init__.py` sits directly in the tree root instead of inside a package directory
    #[error("{path:?} is a package initializer at the tree root; use the directory containing the package as root")]
    RootPackageInitializer { path: PathBuf },

    /// Two different files map to the same module name
    #[error("module `{module}` is defined twice: {first:?} and {second:?}")]
    DuplicateModule {
        module: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Reading a source file failed
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid UTF-8
    #[error("{path:?} is not valid UTF-8")]
    Decode {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not syntactically valid Python
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ruff_python_parser::ParseError,
    },

    /// A relative import climbs above the tree root
    #[error(
        "relative import of level {level} at offset {offset} in {path:?} climbs above the tree root (file is {depth} directories deep)"
    )]
    InvalidImportLevel {
        path: PathBuf,
        /// Byte offset of the import statement
        offset: u32,
        level: u32,
        depth: usize,
    },

    /// An import that claims to be internal matches no discovered module
    #[error("internal import `{import}` matches no discovered module (also tried `{candidate}`)")]
    UnresolvedInternalImport { import: String, candidate: String },

    /// No package name was configured and none could be inferred from the root
    #[error(
        "no package name configured and {root:?} does not contain exactly one top-level package"
    )]
    MissingPackageName { root: PathBuf },
}

impl Error {
    /// Whether the error is confined to a single file and may be skipped by policy
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Decode { .. })
    }
}
