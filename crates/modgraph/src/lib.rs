//! Static, file-level import dependency graph of a Python source tree.

pub mod combine;
pub mod config;
pub mod dirs;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod imports;
pub mod locator;
pub mod orchestrator;
pub mod output;
pub mod resolver;
pub mod util;
pub mod visitors;

pub use config::{Config, ParseErrorPolicy};
pub use error::{Error, Result};
pub use graph::DependencyGraph;
pub use orchestrator::{Analysis, AnalysisSettings, analyze, analyze_tree};
pub use resolver::{ConversionTable, Dependency};
