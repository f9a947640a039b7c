use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Safelist Scanner CLI - Extracts CSS class names from markup trees
#[derive(Parser, Debug)]
#[command(name = "safelist-scanner-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan directory trees and persist the class safelist
    Scan(ScanArgs),
    /// Read a content payload from stdin, append the safelist fragment, write to stdout
    Inject(InjectArgs),
}

/// Arguments for the scan command
#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    /// Root directory patterns (glob patterns supported)
    #[arg(
        short = 'r',
        long = "root",
        value_name = "PATTERN",
        num_args = 1..,
        help = "Root directory patterns to scan for class attributes"
    )]
    pub roots: Vec<String>,

    /// Safelist output file path
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Path where the safelist will be written (default: extracted_classes.txt)"
    )]
    pub output: Option<PathBuf>,

    /// Scan report output path (JSON)
    #[arg(
        long = "report",
        value_name = "PATH",
        help = "Path where a JSON scan report will be written"
    )]
    pub report: Option<PathBuf>,

    /// Configuration file path (YAML or JSON)
    #[arg(
        short = 'c',
        long = "config",
        value_name = "PATH",
        help = "Path to configuration file (YAML or JSON format)"
    )]
    pub config: Option<PathBuf>,

    /// Exclude patterns (glob patterns to exclude)
    #[arg(
        short = 'e',
        long = "exclude",
        value_name = "PATTERN",
        num_args = 0..,
        help = "Patterns to exclude from scanning"
    )]
    pub exclude: Vec<String>,

    /// Verbose output
    #[arg(
        short = 'v',
        long = "verbose",
        default_value_t = false,
        help = "Enable verbose output"
    )]
    pub verbose: bool,

    /// Number of parallel threads to use
    #[arg(
        short = 'j',
        long = "jobs",
        value_name = "NUM",
        help = "Number of parallel threads to use (defaults to number of CPU cores)"
    )]
    pub jobs: Option<usize>,

    /// Dry run (don't write the safelist or report)
    #[arg(
        long = "dry-run",
        default_value_t = false,
        help = "Perform the scan but don't write output files"
    )]
    pub dry_run: bool,

    /// Allow symbolic links during traversal
    #[arg(
        long = "allow-symlinks",
        default_value_t = false,
        help = "Follow symbolic links instead of skipping them"
    )]
    pub allow_symlinks: bool,

    /// Maximum file size to scan, in megabytes
    #[arg(
        long = "max-file-size",
        value_name = "MB",
        help = "Skip files larger than this many megabytes (default: 10)"
    )]
    pub max_file_size: Option<u64>,
}

/// Arguments for the inject command
#[derive(Parser, Debug, Clone)]
pub struct InjectArgs {
    /// Safelist artifact to inject
    #[arg(
        short = 's',
        long = "safelist",
        value_name = "PATH",
        default_value = "extracted_classes.txt",
        help = "Path of the persisted safelist"
    )]
    pub safelist: PathBuf,
}

impl ScanArgs {
    /// Validate that the arguments are consistent.
    ///
    /// Roots may come from the config file instead of the CLI, so their
    /// presence is checked later, after the config merge.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(jobs) = self.jobs {
            if jobs == 0 {
                return Err("Number of jobs must be at least 1".to_string());
            }
        }

        if let (Some(output), Some(report)) = (&self.output, &self.report) {
            if output == report {
                return Err("Safelist and report paths must be different".to_string());
            }
        }

        if let Some(size) = self.max_file_size {
            if size == 0 {
                return Err("Maximum file size must be at least 1 MB".to_string());
            }
        }

        Ok(())
    }
}
