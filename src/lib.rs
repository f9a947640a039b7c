pub mod args;
pub mod config;
pub mod errors;
pub mod extractor;
pub mod injector;
pub mod report;
pub mod safelist;

pub use args::{Cli, Commands, InjectArgs, ScanArgs};
pub use config::ScanConfig;
pub use errors::{Result, ScannerError};
pub use extractor::{
    extract_classes_from_bytes, extract_classes_from_file, extract_classes_parallel, FileClasses,
    SkippedFile,
};
pub use injector::{inject_classes, Injector};
pub use report::{ReportBuilder, ScanReport};

#[cfg(feature = "cli")]
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Default artifact location, relative to the working directory.
pub const DEFAULT_SAFELIST_PATH: &str = "extracted_classes.txt";

/// Security configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Maximum file size in bytes (default: 10MB)
    pub max_file_size: u64,
    /// Allow symbolic links
    pub allow_symlinks: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024, // 10MB
            allow_symlinks: false,
        }
    }
}

/// Main scan configuration, resolved from CLI arguments and config file
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub roots: Vec<String>,
    pub exclude: Vec<String>,
    pub output: PathBuf,
    pub report: Option<PathBuf>,
    pub verbose: bool,
    pub jobs: Option<usize>,
    pub dry_run: bool,
    pub security: SecurityConfig,
}

impl ScannerConfig {
    /// Resolve the effective configuration: explicit CLI arguments win,
    /// the config file fills the gaps.
    pub fn resolve(args: &ScanArgs) -> Result<Self> {
        let file_config = match &args.config {
            Some(path) => ScanConfig::from_file(path)?,
            None => ScanConfig::default(),
        };

        let roots = if args.roots.is_empty() {
            file_config.roots.clone()
        } else {
            args.roots.clone()
        };

        let mut exclude = args.exclude.clone();
        for pattern in &file_config.exclude {
            if !exclude.contains(pattern) {
                exclude.push(pattern.clone());
            }
        }

        let output = args
            .output
            .clone()
            .or(file_config.output)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SAFELIST_PATH));

        let mut security = SecurityConfig {
            allow_symlinks: args.allow_symlinks,
            ..SecurityConfig::default()
        };
        if let Some(mb) = args.max_file_size {
            security.max_file_size = mb * 1024 * 1024;
        }

        Ok(Self {
            roots,
            exclude,
            output,
            report: args.report.clone().or(file_config.report),
            verbose: args.verbose,
            jobs: args.jobs,
            dry_run: args.dry_run,
            security,
        })
    }
}

/// Result of a scan run
#[derive(Debug)]
pub struct ScanSummary {
    /// The deduplicated, sorted safelist
    pub classes: BTreeSet<String>,
    /// Number of files whose contents were scanned
    pub total_files_scanned: usize,
    /// Files that were skipped, with reasons
    pub skipped: Vec<SkippedFile>,
    /// Where the safelist was (or would be) written
    pub output_path: PathBuf,
    /// The scan report, when one was requested
    pub report: Option<ScanReport>,
    /// Wall-clock duration of the scan
    pub duration: Duration,
}

/// Main scan entry point: expand roots, walk, extract, dedup, persist.
pub async fn scan(args: ScanArgs) -> Result<ScanSummary> {
    let start_time = Instant::now();

    args.validate().map_err(ScannerError::InvalidInput)?;

    let config = ScannerConfig::resolve(&args)?;

    if config.roots.is_empty() {
        return Err(ScannerError::InvalidInput(
            "At least one root pattern must be provided (via --root or a config file)".to_string(),
        ));
    }

    if config.verbose {
        eprintln!("Starting class safelist scan...");
        eprintln!("Root patterns: {:?}", config.roots);
        eprintln!("Safelist output: {}", config.output.display());
        eprintln!(
            "Security: max file size = {} MB",
            config.security.max_file_size / (1024 * 1024)
        );
    }

    // Resolve root patterns to concrete directories. A pattern that matches
    // nothing contributes nothing; that is not an error.
    let root_dirs = expand_root_patterns(&config.roots, config.verbose)?;

    if config.verbose {
        eprintln!("Resolved {} scan directories", root_dirs.len());
    }

    let mut collect_skipped = Vec::new();
    let files = collect_files(
        &root_dirs,
        &config.exclude,
        &config.security,
        &mut collect_skipped,
    )?;

    if config.verbose {
        eprintln!("Found {} files to scan", files.len());
    }

    #[cfg(feature = "cli")]
    let progress_bar = if !config.verbose {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({msg})")
                .unwrap()
                .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        pb.set_message("Scanning for class attributes...");
        Some(pb)
    } else {
        None
    };

    #[cfg(feature = "cli")]
    let (extracted, read_skipped) =
        extract_with_progress(&files, config.jobs, progress_bar.as_ref());
    #[cfg(not(feature = "cli"))]
    let (extracted, read_skipped) = extractor::extract_classes_parallel(&files, config.jobs);

    let classes = extractor::merge_classes(&extracted);

    let mut skipped = collect_skipped;
    skipped.extend(read_skipped);
    for skip in &skipped {
        eprintln!("Warning: skipping {}: {}", skip.path.display(), skip.reason);
    }

    // Build the optional report before persisting so its statistics can
    // include the artifact size.
    let safelist_content_len = if classes.is_empty() {
        0
    } else {
        classes.iter().map(|c| c.len() + 1).sum::<usize>() - 1
    };

    let report = if config.report.is_some() {
        let mut class_files: indexmap::IndexMap<String, Vec<String>> = indexmap::IndexMap::new();
        for file_classes in &extracted {
            for class in &file_classes.classes {
                class_files
                    .entry(class.clone())
                    .or_insert_with(Vec::new)
                    .push(file_classes.path.display().to_string());
            }
        }
        class_files.sort_keys();

        Some(
            ReportBuilder::new()
                .with_files_scanned(extracted.len())
                .with_classes_extracted(classes.len())
                .with_class_info(class_files)
                .build(safelist_content_len, skipped.len()),
        )
    } else {
        None
    };

    #[cfg(feature = "cli")]
    if let Some(pb) = &progress_bar {
        pb.set_message("Writing safelist...");
        pb.set_position(files.len() as u64);
    }

    if !config.dry_run {
        safelist::persist(&config.output, &classes)?;

        if let (Some(report_path), Some(report)) = (&config.report, &report) {
            write_report(report_path, report)?;
        }
    }

    let duration = start_time.elapsed();

    #[cfg(feature = "cli")]
    if let Some(pb) = progress_bar {
        pb.finish_with_message(format!(
            "✓ Complete ({} classes from {} files)",
            classes.len(),
            extracted.len()
        ));
    }

    if config.verbose {
        eprintln!("\nScan complete:");
        eprintln!("  - Scanned {} files", extracted.len());
        eprintln!("  - Extracted {} unique classes", classes.len());
        eprintln!("  - Skipped {} files", skipped.len());
        eprintln!("  - Total time: {:.2}s", duration.as_secs_f64());
    }

    Ok(ScanSummary {
        total_files_scanned: extracted.len(),
        classes,
        skipped,
        output_path: config.output,
        report,
        duration,
    })
}

/// Expand root patterns to existing directories, mirroring a
/// directories-only glob. Nonexistent roots yield nothing, never an error.
fn expand_root_patterns(patterns: &[String], verbose: bool) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    let mut seen = HashSet::new();

    for pattern in patterns {
        let mut matched_any = false;

        for entry in glob::glob(pattern)? {
            let path = match entry {
                Ok(path) => path,
                // Unreadable entry during expansion: skip it, keep scanning
                Err(e) => {
                    eprintln!("Warning: skipping glob match: {}", e);
                    continue;
                }
            };

            if path.is_dir() {
                matched_any = true;
                if seen.insert(path.clone()) {
                    dirs.push(path);
                }
            }
        }

        if !matched_any && verbose {
            eprintln!("Warning: root pattern '{}' matched no directories", pattern);
        }
    }

    Ok(dirs)
}

/// Check if a file is safe to read
fn validate_input_file(path: &Path, security: &SecurityConfig) -> Result<()> {
    if !security.allow_symlinks && path.is_symlink() {
        return Err(ScannerError::SecurityError(format!(
            "Symbolic link not allowed: {}",
            path.display()
        )));
    }

    let metadata = fs::metadata(path).map_err(|e| {
        ScannerError::SecurityError(format!(
            "Cannot read file metadata for '{}': {}",
            path.display(),
            e
        ))
    })?;

    if metadata.len() > security.max_file_size {
        return Err(ScannerError::SecurityError(format!(
            "File '{}' exceeds maximum size limit ({} MB > {} MB)",
            path.display(),
            metadata.len() / (1024 * 1024),
            security.max_file_size / (1024 * 1024)
        )));
    }

    Ok(())
}

/// Recursively collect regular files under the given directories, applying
/// exclude patterns and per-file security checks. Rejected files land in
/// `skipped` with the reason; they never abort the walk.
fn collect_files(
    dirs: &[PathBuf],
    exclude_patterns: &[String],
    security: &SecurityConfig,
    skipped: &mut Vec<SkippedFile>,
) -> Result<Vec<PathBuf>> {
    let exclude: Vec<glob::Pattern> = exclude_patterns
        .iter()
        .map(|p| glob::Pattern::new(p))
        .collect::<std::result::Result<_, _>>()?;

    let mut files = Vec::new();
    let mut seen_files = HashSet::new();
    let mut visited_dirs = HashSet::new();

    for dir in dirs {
        walk_directory(
            dir,
            &exclude,
            security,
            &mut files,
            &mut seen_files,
            &mut visited_dirs,
            skipped,
        );
    }

    Ok(files)
}

fn walk_directory(
    dir: &Path,
    exclude: &[glob::Pattern],
    security: &SecurityConfig,
    files: &mut Vec<PathBuf>,
    seen_files: &mut HashSet<PathBuf>,
    visited_dirs: &mut HashSet<PathBuf>,
    skipped: &mut Vec<SkippedFile>,
) {
    // Symlink cycle guard: overlapping roots and followed links must not
    // revisit a directory.
    let canonical = match dir.canonicalize() {
        Ok(path) => path,
        Err(e) => {
            skipped.push(SkippedFile {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            });
            return;
        }
    };
    if !visited_dirs.insert(canonical) {
        return;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            skipped.push(SkippedFile {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            });
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if exclude.iter().any(|p| p.matches_path(&path)) {
            continue;
        }

        if path.is_symlink() && !security.allow_symlinks {
            skipped.push(SkippedFile {
                path,
                reason: "symbolic link not allowed".to_string(),
            });
            continue;
        }

        if path.is_dir() {
            walk_directory(
                &path, exclude, security, files, seen_files, visited_dirs, skipped,
            );
        } else if path.is_file() {
            match validate_input_file(&path, security) {
                Ok(()) => {
                    if seen_files.insert(path.clone()) {
                        files.push(path);
                    }
                }
                Err(e) => skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                }),
            }
        }
    }
}

/// Write the scan report as pretty JSON, atomically like the safelist.
fn write_report(path: &Path, report: &ScanReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = report.to_pretty_json()?;
    safelist::write_atomic(path, &content).map_err(|e| ScannerError::OutputError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Extract classes from files with progress reporting
#[cfg(feature = "cli")]
fn extract_with_progress(
    files: &[PathBuf],
    jobs: Option<usize>,
    progress_bar: Option<&ProgressBar>,
) -> (Vec<FileClasses>, Vec<SkippedFile>) {
    use rayon::prelude::*;
    use std::sync::{Arc, Mutex};

    if let Some(num_jobs) = jobs {
        let _ = rayon::ThreadPoolBuilder::new()
            .num_threads(num_jobs)
            .build_global();
    }

    let processed = Arc::new(Mutex::new(0usize));

    let results: Vec<std::result::Result<FileClasses, SkippedFile>> = files
        .par_iter()
        .map(|path| {
            let result = match extractor::extract_classes_from_file(path) {
                Ok(classes) => Ok(FileClasses {
                    path: path.clone(),
                    classes,
                }),
                Err(e) => Err(SkippedFile {
                    path: path.clone(),
                    reason: e.to_string(),
                }),
            };

            if let Some(pb) = progress_bar {
                let mut count = processed.lock().unwrap();
                *count += 1;
                pb.set_position(*count as u64);
                pb.set_message(format!(
                    "Scanning: {}",
                    path.file_name().unwrap_or_default().to_string_lossy()
                ));
            }

            result
        })
        .collect();

    let mut extracted = Vec::new();
    let mut skipped = Vec::new();
    for result in results {
        match result {
            Ok(file_classes) => extracted.push(file_classes),
            Err(skip) => skipped.push(skip),
        }
    }

    (extracted, skipped)
}

/// Handle inject command - read the content payload from stdin, append the
/// safelist fragment, write the result to stdout
#[cfg(feature = "cli")]
pub async fn handle_inject_command(args: InjectArgs) -> Result<()> {
    use tokio::io::{self, AsyncReadExt, AsyncWriteExt};

    let mut content = String::new();
    let mut stdin = io::stdin();
    stdin
        .read_to_string(&mut content)
        .await
        .map_err(|e| ScannerError::InputError(format!("Failed to read from stdin: {}", e)))?;

    let injector = Injector::new(args.safelist);
    let output = injector.inject(&content)?;

    let mut stdout = io::stdout();
    stdout
        .write_all(output.as_bytes())
        .await
        .map_err(|e| ScannerError::OutputError {
            path: "stdout".to_string(),
            message: e.to_string(),
        })?;

    stdout.flush().await.map_err(|e| ScannerError::OutputError {
        path: "stdout".to_string(),
        message: e.to_string(),
    })?;

    Ok(())
}
