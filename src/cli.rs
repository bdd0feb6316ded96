//! Command-line interface module for dirsort.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Configuration loading and flag precedence
//! - Plan preview (dry run)
//! - Plan execution on a worker thread with a live progress bar

use crate::classifier::ClassificationMode;
use crate::config::AppConfig;
use crate::error::CliError;
use crate::events::{ProgressChannel, ProgressEvent};
use crate::executor::{PlanExecutor, RunSummary};
use crate::output::OutputFormatter;
use crate::planner::{OrganizationPlan, PlanBuilder};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

/// Sort files from a source tree into type, date, or size folders.
#[derive(Parser, Debug, Clone)]
#[command(name = "dirsort")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan (recursively)
    pub source: PathBuf,

    /// Directory that receives the bucket folders
    pub destination: PathBuf,

    /// Classification criterion [default: type, or the config file's mode]
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Only print the plan, move nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Follow symbolic links while walking the source tree
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Print the plan or the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Silence logging
    #[arg(short, long)]
    pub quiet: bool,
}

/// Values accepted by `--mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Lowercased file extension
    Type,
    /// Modification month, YYYY-MM
    Date,
    /// small (< 1 MiB), medium (< 10 MiB), large
    Size,
}

impl From<ModeArg> for ClassificationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Type => ClassificationMode::ByType,
            ModeArg::Date => ClassificationMode::ByDate,
            ModeArg::Size => ClassificationMode::BySize,
        }
    }
}

/// What a CLI invocation produced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RunOutcome {
    /// `--dry-run`: the plan that would be executed.
    Planned { plan: OrganizationPlan },
    /// The plan and what happened when it was executed.
    Executed {
        plan: OrganizationPlan,
        summary: RunSummary,
    },
}

impl RunOutcome {
    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            RunOutcome::Planned { .. } => None,
            RunOutcome::Executed { summary, .. } => Some(summary),
        }
    }

    /// 1 when any entry failed, 0 otherwise.
    pub fn exit_status(&self) -> u8 {
        match self.summary() {
            Some(summary) if !summary.failed_entries.is_empty() => 1,
            _ => 0,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

/// Runs the CLI application for parsed arguments.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use dirsort::cli::{run_cli, Cli};
///
/// let cli = Cli::parse_from(["dirsort", "/path/to/inbox", "/path/to/sorted", "--dry-run"]);
/// match run_cli(&cli) {
///     Ok(outcome) => println!("{:?}", outcome.summary()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<RunOutcome, CliError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let filters = config.filters.compile()?;
    let mode = cli
        .mode
        .map(ClassificationMode::from)
        .or(config.defaults.mode)
        .unwrap_or_default();

    let builder = PlanBuilder::new()
        .with_filters(filters)
        .follow_symlinks(cli.follow_symlinks || config.defaults.follow_symlinks);

    let plan = build_plan(cli, &builder, mode)?;

    if cli.dry_run {
        print_dry_run(cli, &plan)?;
        return Ok(RunOutcome::Planned { plan });
    }

    let summary = execute_plan(cli, &plan)?;

    if cli.json {
        let outcome = RunOutcome::Executed { plan, summary };
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(outcome);
    }

    OutputFormatter::print_run_summary(&summary);
    if summary.is_success() {
        OutputFormatter::success("Organization complete!");
    } else if !summary.failed_entries.is_empty() {
        OutputFormatter::error("Some files could not be moved. See the failures above.");
    }

    Ok(RunOutcome::Executed { plan, summary })
}

fn build_plan(
    cli: &Cli,
    builder: &PlanBuilder,
    mode: ClassificationMode,
) -> Result<OrganizationPlan, CliError> {
    if !cli.json {
        OutputFormatter::info(&format!(
            "Organizing {} into {} by {}",
            cli.source.display(),
            cli.destination.display(),
            mode
        ));
    }

    let spinner = (!cli.json).then(|| OutputFormatter::create_spinner("Scanning source tree..."));
    let result = builder.build(&cli.source, &cli.destination, mode);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let plan = result?;

    if !cli.json {
        OutputFormatter::print_warnings(&plan.warnings);
    }
    Ok(plan)
}

fn print_dry_run(cli: &Cli, plan: &OrganizationPlan) -> Result<(), CliError> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(plan)?);
        return Ok(());
    }

    if plan.is_empty() {
        OutputFormatter::dry_run_notice("No files found to organize.");
        return Ok(());
    }

    OutputFormatter::dry_run_notice("Files would be organized as follows:");
    OutputFormatter::print_plan(plan);
    OutputFormatter::summary_table(&plan.bucket_counts(), plan.len(), plan.total_bytes());
    OutputFormatter::success("Dry run complete. No files were modified.");
    Ok(())
}

/// Runs the executor on a worker thread and drives the progress bar from
/// its event stream.
fn execute_plan(cli: &Cli, plan: &OrganizationPlan) -> Result<RunSummary, CliError> {
    let executor = PlanExecutor::new();
    let (sender, receiver) = ProgressChannel::new();
    let progress = (!cli.json && !plan.is_empty())
        .then(|| OutputFormatter::create_progress_bar(plan.len() as u64));

    thread::scope(|scope| {
        let worker = scope.spawn(move || executor.execute_with_events(plan, &sender));

        for event in receiver.iter() {
            let Some(pb) = progress.as_ref() else {
                continue;
            };
            match event {
                ProgressEvent::Progress { done, source, .. } => {
                    pb.set_position(done as u64);
                    pb.set_message(
                        source
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                    );
                }
                ProgressEvent::Finished { .. } => pb.finish_and_clear(),
                ProgressEvent::Started { .. } => {}
            }
        }

        worker.join().map_err(|_| CliError::Worker("executor"))
    })
}
