//! AST visitors used by the import extractor

mod import_discovery;

pub use import_discovery::{DiscoveredImport, ImportDiscoveryVisitor};
