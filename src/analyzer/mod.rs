//! Analyzer invocation
//!
//! Drives the external analyzer: build (via [`Toolchain`]), execute with
//! the file set as arguments, then parse the captured stdout into a
//! [`CallGraph`]. Every non-success path maps to one classified error;
//! nothing lower-level escapes this module.

mod toolchain;

pub use toolchain::Toolchain;

use crate::config::AnalyzerConfig;
use crate::discovery::SourceFileSet;
use crate::error::{Error, Result};
use crate::graph::CallGraph;
use std::time::Duration;
use tokio::process::Command;

/// One-shot runner for the external analyzer
pub struct Runner {
    toolchain: Toolchain,
    timeout: Duration,
}

impl Runner {
    pub fn new(config: AnalyzerConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            toolchain: Toolchain::new(config),
            timeout,
        }
    }

    /// Analyze the given file set and return the validated call graph.
    ///
    /// Build strictly precedes execution; execution is bounded by the
    /// configured timeout and the child is killed when the deadline
    /// passes.
    pub async fn run(&self, files: &SourceFileSet) -> Result<CallGraph> {
        if files.is_empty() {
            return Err(Error::NoFilesFound);
        }

        let binary = self.toolchain.ensure_built().await?;

        let mut command = Command::new(&binary);
        command.args(files.paths()).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                Error::execution(format!("timed out after {}s", self.timeout.as_secs()))
            })?
            .map_err(|e| Error::execution(format!("cannot run {}: {}", binary.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::execution(format!(
                "{} ({})",
                stderr.trim(),
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        CallGraph::from_json(&stdout)
    }
}
