//! Classification of raw imports into internal modules and external packages.

use cow_utils::CowUtils;
use indexmap::IndexMap;
use log::debug;
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::{Error, Result};
use crate::locator::ModuleId;

/// Import names whose distribution is published under a different name
const DEFAULT_CONVERSIONS: &[(&str, &str)] = &[
    ("attr", "attrs"),
    ("PIL", "Pillow"),
    ("Image", "Pillow"),
    ("mpl_toolkits", "matplotlib"),
    ("dateutil", "python_dateutil"),
    ("skimage", "scikit-image"),
    ("yaml", "PyYAML"),
];

static DEFAULT_TABLE: Lazy<ConversionTable> =
    Lazy::new(|| ConversionTable::from_pairs(DEFAULT_CONVERSIONS.iter().copied()));

/// Hyphenated form used to key the conversion table.
///
/// Case is kept: `Image` and `image` are different import names.
fn normalize_key(name: &str) -> String {
    name.cow_replace('_', "-").into_owned()
}

/// Mapping from a top-level import name to its canonical distribution name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionTable {
    entries: IndexMap<String, String>,
}

impl ConversionTable {
    /// The built-in table of well-known import/distribution name mismatches
    pub fn builtin() -> &'static Self {
        &DEFAULT_TABLE
    }

    /// An empty table, every import name is already canonical
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from `(import name, distribution name)` pairs; later pairs win
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(key, value)| (normalize_key(key.as_ref()), value.into()))
            .collect();
        Self { entries }
    }

    /// Return a table containing these entries overridden by `overrides`
    #[must_use]
    pub fn with_overrides(&self, overrides: &Self) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(
            overrides
                .entries
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        Self { entries }
    }

    /// Canonical distribution name for an import name, if one is registered
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&normalize_key(name)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}


/// Every module name discovered in the tree
#[derive(Debug, Clone, Default)]
pub struct InternalModuleSet {
    modules: FxHashSet<ModuleId>,
}

impl InternalModuleSet {
    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains(module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl FromIterator<ModuleId> for InternalModuleSet {
    fn from_iter<T: IntoIterator<Item = ModuleId>>(iter: T) -> Self {
        Self {
            modules: iter.into_iter().collect(),
        }
    }
}

/// A resolved dependency edge target
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dependency {
    /// A module of the analyzed tree
    Internal(ModuleId),
    /// A third-party or standard library distribution name
    External(String),
}

impl Dependency {
    pub fn name(&self) -> &str {
        match self {
            Self::Internal(name) | Self::External(name) => name,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Dependency {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Resolves raw imports against the discovered module set and the conversion table
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    package: &'a str,
    modules: &'a InternalModuleSet,
    conversions: &'a ConversionTable,
}

impl<'a> Resolver<'a> {
    pub fn new(
        package: &'a str,
        modules: &'a InternalModuleSet,
        conversions: &'a ConversionTable,
    ) -> Self {
        Self {
            package,
            modules,
            conversions,
        }
    }

    /// Whether `raw` names the internal package or something inside it
    fn is_internal(&self, raw: &str) -> bool {
        raw.strip_prefix(self.package)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
    }

    /// Resolve one raw import to exactly one dependency.
    ///
    /// Internal names must match a discovered module either directly or once the last
    /// segment (an imported symbol) is dropped.
    pub fn resolve(&self, raw: &str) -> Result<Dependency> {
        if self.is_internal(raw) {
            return self.resolve_internal(raw);
        }
        Ok(Dependency::External(self.resolve_external(raw)))
    }

    fn resolve_internal(&self, raw: &str) -> Result<Dependency> {
        if self.modules.contains(raw) {
            return Ok(Dependency::Internal(raw.to_owned()));
        }

        let candidate = raw.rsplit_once('.').map_or("", |(module, _symbol)| module);
        if self.modules.contains(candidate) {
            debug!("Import `{}` names a symbol of `{}`", raw, candidate);
            return Ok(Dependency::Internal(candidate.to_owned()));
        }

        Err(Error::UnresolvedInternalImport {
            import: raw.to_owned(),
            candidate: candidate.to_owned(),
        })
    }

    fn resolve_external(&self, raw: &str) -> String {
        let top_level = raw.split('.').next().unwrap_or(raw);
        match self.conversions.get(top_level) {
            Some(canonical) => canonical.to_owned(),
            None => top_level.cow_replace('_', "-").into_owned(),
        }
    }
}
