//! # CLI Module
//!
//! Command-line interface for the file organizer.
//!
//! ## Usage
//! ```bash
//! # Sort ~/Downloads into Images/, Documents/, ...
//! file-organizer organize ~/Downloads
//!
//! # Year/month subfolders, preview only
//! file-organizer organize ~/Downloads --date-based --dry-run
//!
//! # JSON statistics
//! file-organizer organize ~/Downloads --output json
//!
//! # Keep sorting new downloads until Enter is pressed
//! file-organizer watch ~/Downloads
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use file_organizer::core::monitor::{LiveMonitor, MonitorConfig};
use file_organizer::core::organize::{Organizer, OrganizerConfig, RunStatistics};
use file_organizer::core::resolver::OrganizationPlan;
use file_organizer::error::{OrganizerError, Result};
use file_organizer::events::{Event, EventChannel, FileEvent, MonitorEvent, RunEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// File Organizer - Sort a messy folder by file type
#[derive(Parser, Debug)]
#[command(name = "file-organizer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Organize the files of a folder once
    Organize {
        /// Folder to organize
        path: PathBuf,

        /// Sort into Year/Month subfolders inside each category
        #[arg(short, long)]
        date_based: bool,

        /// Show where files would go without moving anything
        #[arg(long)]
        dry_run: bool,

        /// Leave dotfiles where they are
        #[arg(long)]
        skip_hidden: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Watch a folder and organize new files as they arrive
    Watch {
        /// Folder to watch
        path: PathBuf,

        /// Sort into Year/Month subfolders inside each category
        #[arg(short, long)]
        date_based: bool,

        /// Milliseconds to wait after a file appears before touching it
        #[arg(long, default_value = "500")]
        settle_ms: u64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Organize {
            path,
            date_based,
            dry_run,
            skip_hidden,
            output,
        } => {
            let organizer =
                Organizer::with_config(OrganizerConfig::new().include_hidden(!skip_hidden));
            if dry_run {
                run_preview(&organizer, &path, date_based, output)
            } else {
                run_organize(&organizer, &path, date_based, output)
            }
        }
        Commands::Watch {
            path,
            date_based,
            settle_ms,
        } => run_watch(&path, date_based, Duration::from_millis(settle_ms)),
    }
}

fn run_organize(
    organizer: &Organizer,
    path: &Path,
    date_based: bool,
    output: OutputFormat,
) -> Result<()> {
    let term = Term::stderr();
    let pretty = matches!(output, OutputFormat::Pretty);

    if pretty {
        print_header(&term);
    }

    let (sender, receiver) = EventChannel::new();

    let progress = pretty.then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {pos} files {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let progress_clone = progress.clone();

    // Handle events in a separate thread; it hands back the failures
    let event_thread = thread::spawn(move || {
        let mut failures = Vec::new();
        for event in receiver.iter() {
            match event {
                Event::File(file) => {
                    if let Some(ref pb) = progress_clone {
                        pb.inc(1);
                        pb.set_message(file.filename.clone());
                    }
                    if !file.is_success() {
                        failures.push(file);
                    }
                }
                Event::Run(RunEvent::Completed { .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
        failures
    });

    let result = organizer.organize_with_events(path, date_based, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    let failures = event_thread.join().unwrap_or_default();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let stats = result?;
    match output {
        OutputFormat::Pretty => print_pretty_stats(&term, "Organize Complete", &stats, &failures),
        OutputFormat::Json => print_json(&stats)?,
    }

    Ok(())
}

fn run_preview(
    organizer: &Organizer,
    path: &Path,
    date_based: bool,
    output: OutputFormat,
) -> Result<()> {
    let plans = organizer.preview(path, date_based)?;

    match output {
        OutputFormat::Pretty => {
            let term = Term::stderr();
            print_header(&term);
            print_pretty_plans(&term, path, &plans);
        }
        OutputFormat::Json => print_json(&plans)?,
    }

    Ok(())
}

fn run_watch(path: &Path, date_based: bool, settle: Duration) -> Result<()> {
    let term = Term::stderr();
    print_header(&term);

    let (sender, receiver) = EventChannel::new();
    let mut monitor =
        LiveMonitor::new().with_config(MonitorConfig::default().settle_delay(settle));
    monitor.start(path, date_based, sender)?;
    let started = Instant::now();

    // Statistics have exactly one owner: this thread
    let printer = thread::spawn(move || {
        let term = Term::stderr();
        let mut stats = RunStatistics::new();
        for event in receiver.iter() {
            match event {
                Event::File(file) => {
                    stats.record(&file);
                    print_file_line(&term, &file);
                }
                Event::Monitor(MonitorEvent::Started { path, .. }) => {
                    term.write_line(&format!(
                        "{} Watching {} (press Enter to stop)",
                        style("●").green(),
                        style(path.display()).cyan()
                    ))
                    .ok();
                }
                Event::Monitor(MonitorEvent::Error { message }) => {
                    term.write_line(&format!("{} {}", style("!").red().bold(), message))
                        .ok();
                }
                _ => {}
            }
        }
        stats
    });

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| OrganizerError::Output(e.to_string()))?;

    monitor.stop();
    // Releases the last sender so the printer thread can finish
    drop(monitor);
    let stats = with_elapsed(printer.join().unwrap_or_default(), started);

    print_pretty_stats(&term, "Watch Stopped", &stats, &[]);
    Ok(())
}

fn print_header(term: &Term) {
    term.write_line(&format!(
        "{} {}",
        style("File Organizer").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line("").ok();
}

fn print_file_line(term: &Term, file: &FileEvent) {
    let _ = match (file.destination(), &file.detail) {
        (Some(destination), _) => term.write_line(&format!(
            "  {} {} {} {}",
            style("✓").green(),
            file.filename,
            style("→").dim(),
            destination.display()
        )),
        (None, detail) => term.write_line(&format!(
            "  {} {} {}",
            style("✗").red(),
            file.filename,
            style(detail.as_deref().unwrap_or("failed")).dim()
        )),
    };
}

/// Watch statistics cover the whole session
fn with_elapsed(mut stats: RunStatistics, started: Instant) -> RunStatistics {
    stats.duration_ms = started.elapsed().as_millis() as u64;
    stats
}

fn print_pretty_stats(term: &Term, title: &str, stats: &RunStatistics, failures: &[FileEvent]) {
    term.write_line(&format!("{} {}", style("✓").green().bold(), title))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files moved ({}) in {:.1}s",
        style(stats.files_moved).cyan(),
        format_bytes(stats.bytes_moved),
        stats.duration_ms as f64 / 1000.0
    ))
    .ok();

    for (category, count) in &stats.by_category {
        let size = stats.size_by_category.get(category).copied().unwrap_or(0);
        term.write_line(&format!(
            "    {:<10} {:>5}  {}",
            category.dir_name(),
            count,
            style(format_bytes(size)).dim()
        ))
        .ok();
    }

    if stats.cross_volume_bytes > 0 {
        term.write_line(&format!(
            "  {} freed on the source volume",
            style(format_bytes(stats.cross_volume_bytes)).yellow()
        ))
        .ok();
    }

    if stats.failures > 0 {
        term.write_line(&format!(
            "  {} files could not be organized",
            style(stats.failures).red()
        ))
        .ok();
        for file in failures {
            print_file_line(term, file);
        }
    }
}

fn print_pretty_plans(term: &Term, root: &Path, plans: &[OrganizationPlan]) {
    if plans.is_empty() {
        term.write_line("  Nothing to organize.").ok();
        return;
    }

    for plan in plans {
        let target = plan.destination();
        let shown = target.strip_prefix(root).unwrap_or(&target);
        let renamed = if plan.is_renamed() {
            style(" (renamed)").yellow().to_string()
        } else {
            String::new()
        };
        term.write_line(&format!(
            "  {} {} {}{}",
            plan.source.file_name(),
            style("→").dim(),
            shown.display(),
            renamed
        ))
        .ok();
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style(format!("Dry run: {} files would be moved. Nothing was changed.", plans.len())).dim()
    ))
    .ok();
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| OrganizerError::Output(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
