//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Interactive call graph visualization for Go projects
#[derive(Parser, Debug)]
#[command(name = "callmap")]
#[command(about = "Interactive call graph visualization for Go projects")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a file or project and open the call graph visualization
    Analyze {
        /// A source file (active-file scope) or a project directory
        /// (whole-project scope)
        path: PathBuf,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Port for the visualization server (0 picks a free port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Glob patterns to exclude (can be repeated)
        #[arg(long)]
        exclude: Vec<String>,

        /// Analyzer timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Do not open the browser automatically
        #[arg(long)]
        no_open: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Build the analyzer binary without running an analysis
    Check {
        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show version information
    Version,
}
