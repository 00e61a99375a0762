use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub discovery: DiscoveryConfig,
    pub analyzer: AnalyzerConfig,
    pub viz: VizConfig,
    pub editor: EditorConfig,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
}

/// File discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Extension of analyzable source files, without the dot
    pub extension: String,
    /// Glob patterns (relative to the root) to skip
    pub exclude: Vec<String>,
}

/// External analyzer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Directory holding the analyzer source and compiled binary
    pub source_dir: PathBuf,
    /// Analyzer source file within source_dir
    pub source_file: String,
    /// Compiled binary name within source_dir
    pub binary_name: String,
    /// Command used to build the binary, run inside source_dir
    pub build_command: Vec<String>,
    /// Upper bound for one analyzer run, in seconds
    pub timeout_secs: u64,
    /// Rebuild on every run instead of only when the source changed
    pub always_rebuild: bool,
}

/// Visualization session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    /// Port to serve the graph page on (0 picks a free port)
    pub port: u16,
    /// Launch the system browser once the session is up
    pub open_browser: bool,
}

/// Editor integration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Program invoked to open a source location
    pub command: String,
    /// Arguments; `{file}` and `{line}` are substituted
    pub args: Vec<String>,
    /// Line convention the editor expects: 1 (most CLIs) or 0
    pub line_base: u8,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Untitled Project".to_string(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extension: "go".to_string(),
            exclude: vec![
                "**/*_test.go".to_string(),
                "vendor/**".to_string(),
                "testdata/**".to_string(),
                ".git/**".to_string(),
            ],
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("tools/golang"),
            source_file: "analyzer.go".to_string(),
            binary_name: "analyzer".to_string(),
            build_command: vec![
                "go".to_string(),
                "build".to_string(),
                "-o".to_string(),
                "analyzer".to_string(),
                "analyzer.go".to_string(),
            ],
            timeout_secs: 60,
            always_rebuild: false,
        }
    }
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            port: 0,
            open_browser: true,
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            command: "code".to_string(),
            args: vec!["--goto".to_string(), "{file}:{line}".to_string()],
            line_base: 1,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(
        &mut self,
        port: Option<u16>,
        exclude: Vec<String>,
        timeout: Option<u64>,
        no_open: bool,
    ) {
        if let Some(p) = port {
            self.viz.port = p;
        }

        if !exclude.is_empty() {
            self.discovery.exclude.extend(exclude);
        }

        if let Some(t) = timeout {
            self.analyzer.timeout_secs = t;
        }

        if no_open {
            self.viz.open_browser = false;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.discovery.extension.is_empty() {
            return Err(Error::config_validation("extension must not be empty"));
        }

        if self.discovery.extension.starts_with('.') {
            return Err(Error::config_validation(
                "extension must not include the leading dot",
            ));
        }

        if self.analyzer.timeout_secs == 0 {
            return Err(Error::config_validation("timeout_secs must be at least 1"));
        }

        if self.analyzer.build_command.is_empty() {
            return Err(Error::config_validation("build_command must not be empty"));
        }

        if self.analyzer.binary_name.is_empty() {
            return Err(Error::config_validation("binary_name must not be empty"));
        }

        if self.editor.command.is_empty() {
            return Err(Error::config_validation("editor command must not be empty"));
        }

        if self.editor.line_base > 1 {
            return Err(Error::config_validation("line_base must be 0 or 1"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.project.name, "Untitled Project");
        assert_eq!(config.discovery.extension, "go");
        assert_eq!(config.analyzer.timeout_secs, 60);
        assert_eq!(config.editor.line_base, 1);
        assert!(config.viz.open_browser);
        assert!(!config.analyzer.always_rebuild);
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[project]
name = "My Service"

[discovery]
extension = "go"
exclude = ["gen/**"]

[analyzer]
timeout_secs = 120
always_rebuild = true

[viz]
port = 7878
open_browser = false

[editor]
command = "vim"
args = ["+{{line}}", "{{file}}"]
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.project.name, "My Service");
        assert_eq!(config.discovery.exclude, vec!["gen/**".to_string()]);
        assert_eq!(config.analyzer.timeout_secs, 120);
        assert!(config.analyzer.always_rebuild);
        assert_eq!(config.viz.port, 7878);
        assert!(!config.viz.open_browser);
        assert_eq!(config.editor.command, "vim");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/callmap.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/callmap.toml"));
        assert_eq!(config.discovery.extension, "go");
    }

    #[test]
    fn test_validation_empty_extension() {
        let mut config = Config::default();
        config.discovery.extension.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_dotted_extension() {
        let mut config = Config::default();
        config.discovery.extension = ".go".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut config = Config::default();
        config.analyzer.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_empty_build_command() {
        let mut config = Config::default();
        config.analyzer.build_command.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_bad_line_base() {
        let mut config = Config::default();
        config.editor.line_base = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_cli_port() {
        let mut config = Config::default();
        config.merge_cli(Some(9000), vec![], None, false);
        assert_eq!(config.viz.port, 9000);
    }

    #[test]
    fn test_merge_cli_exclude() {
        let mut config = Config::default();
        let initial = config.discovery.exclude.len();
        config.merge_cli(None, vec!["gen/**".to_string()], None, false);
        assert_eq!(config.discovery.exclude.len(), initial + 1);
    }

    #[test]
    fn test_merge_cli_timeout() {
        let mut config = Config::default();
        config.merge_cli(None, vec![], Some(10), false);
        assert_eq!(config.analyzer.timeout_secs, 10);
    }

    #[test]
    fn test_merge_cli_no_open() {
        let mut config = Config::default();
        config.merge_cli(None, vec![], None, true);
        assert!(!config.viz.open_browser);
    }
}
