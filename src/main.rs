//! replicate - one-way directory replication.
//!
//! Usage:
//!   replicate sync SRC DEST        Make DEST mirror SRC
//!   replicate run [TARGET...]      Run targets from Replicate.toml
//!   replicate scan PATH            Show inventory statistics
//!   replicate --help               Show help

use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::broadcast::error::TryRecvError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use replicate_core::{Action, Inventory, InventoryStats, PatternSyntax, SyncConfig, SyncError};
use replicate_ops::{ApplySummary, LogReporter, Replication};
use replicate_scan::{ScanProgress, TreeScanner};

/// Targets file read by `replicate run` when `--config` is not given.
const DEFAULT_TARGETS_FILE: &str = "Replicate.toml";

#[derive(Parser)]
#[command(
    name = "replicate",
    version,
    about = "One-way directory replication",
    long_about = "replicate makes a destination directory mirror a source directory.\n\n\
                  Only changed entries are copied; entries missing from the source are \
                  deleted. File types, permission bits and timestamps are preserved."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replicate SOURCE into DESTINATION
    Sync {
        /// Source directory
        source: PathBuf,

        /// Destination directory (created if missing)
        destination: PathBuf,

        /// Report actions without changing anything
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Exclude matching source paths
        #[arg(long, value_name = "PATTERN")]
        exclude_source: Option<String>,

        /// Exclude matching destination paths (they are never deleted)
        #[arg(long, value_name = "PATTERN")]
        exclude_destination: Option<String>,

        /// Interpret patterns as globs instead of regular expressions
        #[arg(long)]
        glob: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Run named targets from a targets file
    Run {
        /// Targets file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Targets to run (all, in file order, if omitted)
        targets: Vec<String>,

        /// Report actions without changing anything
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Scan a directory and show inventory statistics
    Scan {
        /// Directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Exclude matching paths
        #[arg(long, value_name = "PATTERN")]
        exclude: Option<String>,

        /// Interpret the pattern as a glob instead of a regular expression
        #[arg(long)]
        glob: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// JSON rendering of one replication run.
#[derive(Serialize)]
struct RunReport<'a> {
    target: Option<&'a str>,
    source: &'a InventoryStats,
    destination: &'a InventoryStats,
    actions: &'a [Action],
    summary: &'a ApplySummary,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Command::Sync {
            source,
            destination,
            dry_run,
            exclude_source,
            exclude_destination,
            glob,
            format,
        } => {
            let config = SyncConfig {
                source,
                destination,
                dry_run,
                exclude_source,
                exclude_destination,
                pattern_syntax: syntax(glob),
            };
            run_sync(None, &config, format)?;
        }
        Command::Run {
            config,
            targets,
            dry_run,
            format,
        } => {
            run_targets(config, &targets, dry_run, format)?;
        }
        Command::Scan {
            path,
            exclude,
            glob,
            format,
        } => {
            run_scan(&path, exclude.as_deref(), syntax(glob), format)?;
        }
    }

    Ok(())
}

/// Install a stderr subscriber; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init()?;

    Ok(())
}

fn syntax(glob: bool) -> PatternSyntax {
    if glob {
        PatternSyntax::Glob
    } else {
        PatternSyntax::Regex
    }
}

/// Validate, scan, plan and apply one source/destination pair.
fn run_sync(target: Option<&str>, config: &SyncConfig, format: OutputFormat) -> Result<()> {
    config
        .validate_paths(true)
        .wrap_err("Invalid source or destination")?;

    let replication =
        Replication::prepare(config, &TreeScanner::new()).wrap_err("Planning failed")?;

    match format {
        OutputFormat::Text => {
            if let Some(name) = target {
                println!("Target {name}");
            }
            print_scan_table(&[
                ("source", replication.source()),
                ("destination", replication.destination()),
            ]);
            println!();

            if replication.plan().is_empty() {
                println!("(none)");
            }
            let mut reporter = |action: &Action| println!("{action}");
            let summary = replication
                .apply(&mut reporter, None)
                .wrap_err("Replication failed")?;

            println!();
            println!(
                " {} ({} copied in {:.2}s)",
                summary.summary(),
                format_size(summary.bytes_copied),
                summary.duration.as_secs_f64()
            );
        }
        OutputFormat::Json => {
            let summary = replication
                .apply(&mut LogReporter, None)
                .wrap_err("Replication failed")?;
            let report = RunReport {
                target,
                source: replication.source().stats(),
                destination: replication.destination().stats(),
                actions: replication.plan().actions(),
                summary: &summary,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Run targets from a TOML targets file, in file order.
fn run_targets(
    config_path: Option<PathBuf>,
    names: &[String],
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    let path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_TARGETS_FILE));
    let targets = load_targets(&path)?;

    for name in names {
        if !targets.contains_key(name) {
            let known: Vec<&str> = targets.keys().map(String::as_str).collect();
            return Err(SyncError::invalid_config(format!(
                "unknown target `{name}` (known: {})",
                known.join(", ")
            ))
            .into());
        }
    }

    for (name, config) in &targets {
        if !names.is_empty() && !names.contains(name) {
            continue;
        }
        let mut config = config.clone();
        config.dry_run |= dry_run;
        tracing::info!(target_name = %name, "running target");
        run_sync(Some(name.as_str()), &config, format)
            .wrap_err_with(|| format!("Target `{name}` failed"))?;
    }

    Ok(())
}

/// Parse a targets file. Relative roots are resolved against the file's
/// directory.
fn load_targets(path: &Path) -> Result<IndexMap<String, SyncConfig>> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read targets file {}", path.display()))?;
    let mut targets: IndexMap<String, SyncConfig> = toml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse targets file {}", path.display()))?;

    if targets.is_empty() {
        return Err(SyncError::invalid_config(format!(
            "no targets defined in {}",
            path.display()
        ))
        .into());
    }

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    for config in targets.values_mut() {
        config.source = base.join(&config.source);
        config.destination = base.join(&config.destination);
    }

    Ok(targets)
}

/// Scan one directory and print its statistics.
fn run_scan(
    path: &Path,
    exclude: Option<&str>,
    syntax: PatternSyntax,
    format: OutputFormat,
) -> Result<()> {
    let matcher = exclude.map(|p| syntax.compile(p)).transpose()?;

    eprintln!("Scanning {}...", path.display());
    let scanner = TreeScanner::new();
    let mut progress_rx = scanner.subscribe();
    let inventory = scanner
        .scan(path, matcher.as_deref())
        .wrap_err("Scan failed")?;

    // The scan runs on this thread; keep the last snapshot still buffered.
    let mut progress = ScanProgress::new();
    loop {
        match progress_rx.try_recv() {
            Ok(snapshot) => progress = snapshot,
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }

    match format {
        OutputFormat::Text => {
            print_scan_table(&[("scan", &inventory)]);
            println!();
            println!(
                " {} entries scanned in {:.2}s ({:.0} entries/s, {} excluded)",
                inventory.len(),
                inventory.scan_duration().as_secs_f64(),
                progress.entries_per_second(),
                progress.excluded
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&inventory)?);
        }
    }

    Ok(())
}

/// Print one row of statistics per inventory.
fn print_scan_table(rows: &[(&str, &Inventory)]) {
    let width = rows
        .iter()
        .map(|(_, inv)| inv.root_path().display().to_string().len())
        .max()
        .unwrap_or(0)
        .max("Directory".len());

    println!(
        "{:<12} {:<width$} {:>6} {:>8} {:>8} {:>8}",
        "Which", "Directory", "Depth", "Dirs", "Files", "Other"
    );
    println!("{}", "─".repeat(12 + width + 4 * 9 - 2));
    for (which, inventory) in rows {
        let stats = inventory.stats();
        println!(
            "{:<12} {:<width$} {:>6} {:>8} {:>8} {:>8}",
            which,
            inventory.root_path().display().to_string(),
            stats.max_depth,
            stats.dirs,
            stats.files,
            stats.others
        );
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
