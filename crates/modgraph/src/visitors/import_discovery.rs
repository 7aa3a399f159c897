//! Import discovery visitor that finds every import statement in a Python module,
//! including those nested within functions, classes and conditional blocks.

use ruff_python_ast::visitor::{Visitor, walk_stmt};
use ruff_python_ast::{ModModule, Stmt, StmtImport, StmtImportFrom};
use ruff_text_size::TextRange;

/// An import statement discovered during AST traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveredImport {
    /// `import a.b, c as d`
    Import {
        /// Dotted module names, aliases dropped
        modules: Vec<String>,
        range: TextRange,
    },
    /// `from a.b import c, d` or `from .. import e`
    ImportFrom {
        /// The module being imported from, absent for `from . import x`
        module: Option<String>,
        /// Imported names, aliases dropped
        names: Vec<String>,
        /// Number of leading dots
        level: u32,
        range: TextRange,
    },
}

/// Visitor that discovers all imports in a Python module
#[derive(Debug, Default)]
pub struct ImportDiscoveryVisitor {
    imports: Vec<DiscoveredImport>,
}

impl ImportDiscoveryVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all discovered imports in source order
    pub fn into_imports(self) -> Vec<DiscoveredImport> {
        self.imports
    }

    fn record_import(&mut self, stmt: &StmtImport) {
        self.imports.push(DiscoveredImport::Import {
            modules: stmt
                .names
                .iter()
                .map(|alias| alias.name.as_str().to_owned())
                .collect(),
            range: stmt.range,
        });
    }

    fn record_import_from(&mut self, stmt: &StmtImportFrom) {
        self.imports.push(DiscoveredImport::ImportFrom {
            module: stmt.module.as_ref().map(|m| m.as_str().to_owned()),
            names: stmt
                .names
                .iter()
                .map(|alias| alias.name.as_str().to_owned())
                .collect(),
            level: stmt.level,
            range: stmt.range,
        });
    }

    /// Visit a module and discover all imports
    pub fn visit_module(&mut self, module: &ModModule) {
        for stmt in &module.body {
            self.visit_stmt(stmt);
        }
    }
}

impl<'a> Visitor<'a> for ImportDiscoveryVisitor {
    fn visit_stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::Import(import_stmt) => self.record_import(import_stmt),
            Stmt::ImportFrom(import_from) => self.record_import_from(import_from),
            // Function bodies, class bodies, branches and handlers can all hold imports
            _ => walk_stmt(self, stmt),
        }
    }
}
