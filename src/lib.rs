//! Callmap - Interactive call graph visualization for Go projects
//!
//! Discovers source files, delegates call-graph extraction to an external
//! analyzer binary, and serves the result as an interactive graph whose
//! nodes jump back to the originating source location.

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod viz;

// Re-export main types
pub use config::Config;
pub use discovery::{AnalysisScope, SourceFileSet};
pub use error::{Error, Result};
pub use graph::{CallEdge, CallGraph, FunctionNode};
