// Editor integration
//
// The session hands navigation targets to a FileOpener; the default
// implementation spawns the configured editor command.

use crate::config::EditorConfig;
use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Command, Stdio};

/// Capability for opening a file at a line in the user's editor.
/// `line` is always the 1-based domain line number; implementations
/// translate to whatever the underlying editor expects.
pub trait FileOpener: Send {
    fn open(&self, file: &Path, line: u32) -> Result<()>;
}

/// Opens locations by spawning the configured editor command with
/// `{file}` and `{line}` substituted into its arguments.
pub struct EditorOpener {
    config: EditorConfig,
}

impl EditorOpener {
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    /// Translate the 1-based domain line number into the editor's
    /// convention. Editors taking 0-based lines (line_base = 0) get
    /// line - 1; everything else gets the number unchanged.
    fn translate_line(line: u32, line_base: u8) -> u32 {
        if line_base == 0 {
            line.saturating_sub(1)
        } else {
            line
        }
    }

    /// Build the argument list for one navigation target
    fn build_args(&self, file: &Path, line: u32) -> Vec<String> {
        let line = Self::translate_line(line, self.config.line_base);
        let file = file.to_string_lossy();

        self.config
            .args
            .iter()
            .map(|arg| {
                arg.replace("{file}", &file)
                    .replace("{line}", &line.to_string())
            })
            .collect()
    }
}

impl FileOpener for EditorOpener {
    fn open(&self, file: &Path, line: u32) -> Result<()> {
        let args = self.build_args(file, line);

        // Fire and forget: the editor may be long-lived.
        Command::new(&self.config.command)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                Error::other(format!(
                    "cannot launch editor '{}': {}",
                    self.config.command, e
                ))
            })?;

        Ok(())
    }
}
