//! CLI module for Callmap
//!
//! The orchestrator for one end-to-end run: resolve the analysis scope,
//! obtain the file set, invoke the analyzer, and hand the graph to a
//! visualization session. Every classified failure is printed here;
//! nothing below this layer talks to the user.

mod args;

pub use args::{Args, Command};

use crate::analyzer::{Runner, Toolchain};
use crate::config::Config;
use crate::discovery::AnalysisScope;
use crate::error::Result;
use crate::viz::{EditorOpener, VizSession};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

/// Run the CLI application
pub fn run() -> ExitCode {
    let args = Args::parse_args();

    match execute(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) if e.is_warning() => {
            println!("Warning: {}", e);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(args: Args) -> Result<()> {
    match args.command {
        Command::Analyze {
            path,
            config,
            port,
            exclude,
            timeout,
            no_open,
            verbose,
        } => {
            let mut cfg = load_config(config.as_deref());
            cfg.merge_cli(port, exclude, timeout, no_open);
            cfg.validate()?;

            if verbose {
                println!("Analyzing: {}", path.display());
                println!("Extension: .{}", cfg.discovery.extension);
                println!("Exclude: {:?}", cfg.discovery.exclude);
                println!("Analyzer: {}", cfg.analyzer.source_dir.display());
                println!("Timeout: {}s", cfg.analyzer.timeout_secs);
            }

            let scope = AnalysisScope::resolve(&path)?;

            println!("Discovering files...");
            let files = scope.file_set(&cfg.discovery)?;
            if files.is_empty() {
                return Err(crate::error::Error::NoFilesFound);
            }
            println!("Found {} source files", files.len());

            println!("Analyzing...");
            let spinner = start_spinner(verbose);
            let runner = Runner::new(cfg.analyzer.clone());
            let rt = tokio::runtime::Runtime::new()?;
            let result = rt.block_on(runner.run(&files));
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }
            let graph = result?;

            let stats = graph.stats();
            println!(
                "Analysis complete: {} functions, {} calls, {} entry points",
                stats.functions, stats.calls, stats.entry_points
            );

            let project_name = project_name(&cfg, &path);
            let opener = EditorOpener::new(cfg.editor.clone());
            let mut session = VizSession::start(
                graph,
                &cfg.viz,
                &project_name,
                scope.base_dir(),
                Box::new(opener),
            )?;

            println!("Serving call graph on {}", session.url());
            println!("Close the page (or Ctrl+C) to stop");

            if cfg.viz.open_browser {
                open_browser(&session.url());
            }

            session.run()?;
            println!("Session closed");

            Ok(())
        }

        Command::Check { config } => {
            let cfg = load_config(config.as_deref());
            cfg.validate()?;

            println!("Building analyzer...");
            let toolchain = Toolchain::new(cfg.analyzer.clone());
            let rt = tokio::runtime::Runtime::new()?;
            let binary = rt.block_on(toolchain.ensure_built())?;
            println!("Analyzer ready: {}", binary.display());

            Ok(())
        }

        Command::Version => {
            println!("callmap {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Config {
    match path {
        Some(path) => Config::load_or_default(path),
        None => Config::load_or_default(Path::new("callmap.toml")),
    }
}

fn project_name(cfg: &Config, path: &Path) -> String {
    if cfg.project.name.is_empty() || cfg.project.name == "Untitled Project" {
        path.canonicalize()
            .unwrap_or_else(|_| path.to_path_buf())
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Project")
            .to_string()
    } else {
        cfg.project.name.clone()
    }
}

fn start_spinner(verbose: bool) -> Option<ProgressBar> {
    if verbose {
        return None;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message("running analyzer");
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

/// Best-effort launch of the system browser; failures are not fatal
fn open_browser(url: &str) {
    let (program, args): (&str, Vec<&str>) = if cfg!(target_os = "macos") {
        ("open", vec![url])
    } else if cfg!(target_os = "windows") {
        ("cmd", vec!["/C", "start", url])
    } else {
        ("xdg-open", vec![url])
    };

    if std::process::Command::new(program)
        .args(&args)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .is_err()
    {
        println!("Open {} in your browser", url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_name_from_config() {
        let mut cfg = Config::default();
        cfg.project.name = "My Service".to_string();
        assert_eq!(project_name(&cfg, Path::new("/tmp")), "My Service");
    }

    #[test]
    fn test_project_name_from_path() {
        let cfg = Config::default();
        let dir = tempfile::TempDir::new().unwrap();
        let name = project_name(&cfg, dir.path());
        assert_eq!(
            name,
            dir.path().file_name().unwrap().to_str().unwrap().to_string()
        );
    }

    #[test]
    fn test_load_config_missing_falls_back_to_default() {
        let cfg = load_config(Some(Path::new("/nonexistent/callmap.toml")));
        assert_eq!(cfg.discovery.extension, "go");
    }

    #[test]
    fn test_spinner_suppressed_when_verbose() {
        assert!(start_spinner(true).is_none());
    }
}
