//! Plan execution: move every planned file, one at a time, in plan order.
//!
//! A failed entry is recorded and the run continues. There is no rollback
//! of entries that already moved.

use crate::error::MoveFailure;
use crate::events::{ProgressEvent, ProgressSender};
use crate::planner::{OrganizationPlan, PlanEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of a single plan entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionResult {
    Moved,
    Failed { reason: MoveFailure },
}

/// An entry that could not be moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub reason: MoveFailure,
}

/// The authoritative report of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub moved_count: usize,
    /// Every failure, in plan order.
    pub failed_entries: Vec<FailedEntry>,
    /// Entries processed before the run ended.
    pub processed: usize,
    /// Length of the plan.
    pub total: usize,
    /// True when a [`CancelToken`] stopped the run early.
    pub cancelled: bool,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn failed_count(&self) -> usize {
        self.failed_entries.len()
    }

    /// True when nothing failed and the run was not cancelled.
    pub fn is_success(&self) -> bool {
        self.failed_entries.is_empty() && !self.cancelled
    }
}

/// Cooperative cancellation, checked between entries.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Executes [`OrganizationPlan`]s.
///
/// Moves are strictly sequential. When two entries share a destination, the
/// first one in plan order wins and later ones fail with
/// [`MoveFailure::DestinationOccupied`]. A destination that already exists
/// on disk is never overwritten either.
#[derive(Debug, Clone, Default)]
pub struct PlanExecutor {
    cancel: Option<CancelToken>,
}

impl PlanExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Execute `plan`, calling `on_progress(done, total)` exactly once per
    /// processed entry with `done` counting from 1.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::classifier::ClassificationMode;
    /// use dirsort::executor::PlanExecutor;
    /// use dirsort::planner::PlanBuilder;
    /// use std::path::Path;
    ///
    /// let plan = PlanBuilder::new()
    ///     .build(Path::new("inbox"), Path::new("sorted"), ClassificationMode::BySize)
    ///     .unwrap();
    /// let summary = PlanExecutor::new().execute(&plan, |done, total| {
    ///     println!("{done}/{total}");
    /// });
    /// println!("moved {}, failed {}", summary.moved_count, summary.failed_count());
    /// ```
    pub fn execute<F>(&self, plan: &OrganizationPlan, mut on_progress: F) -> RunSummary
    where
        F: FnMut(usize, usize),
    {
        self.run(plan, |done, total, _, _| on_progress(done, total))
    }

    /// Execute `plan`, reporting through a progress channel.
    ///
    /// Emits `Started`, one `Progress` per processed entry, then `Finished`.
    pub fn execute_with_events(&self, plan: &OrganizationPlan, events: &ProgressSender) -> RunSummary {
        events.send(ProgressEvent::Started { total: plan.len() });

        let summary = self.run(plan, |done, total, entry, outcome| {
            events.send(ProgressEvent::Progress {
                done,
                total,
                source: entry.source.clone(),
                outcome: outcome.clone(),
            });
        });

        events.send(ProgressEvent::Finished {
            moved: summary.moved_count,
            failed: summary.failed_count(),
            cancelled: summary.cancelled,
        });
        summary
    }

    fn run<F>(&self, plan: &OrganizationPlan, mut report: F) -> RunSummary
    where
        F: FnMut(usize, usize, &PlanEntry, &ExecutionResult),
    {
        let start = Instant::now();
        let total = plan.len();
        let mut summary = RunSummary {
            total,
            ..Default::default()
        };
        let mut claimed: HashSet<PathBuf> = HashSet::new();

        info!(total, "executing organization plan");

        for (index, entry) in plan.entries.iter().enumerate() {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                info!(processed = summary.processed, "run cancelled");
                summary.cancelled = true;
                break;
            }

            let outcome = match Self::move_entry(entry, &claimed) {
                Ok(()) => {
                    debug!(
                        source = %entry.source.display(),
                        destination = %entry.destination.display(),
                        "moved"
                    );
                    claimed.insert(entry.destination.clone());
                    summary.moved_count += 1;
                    ExecutionResult::Moved
                }
                Err(reason) => {
                    warn!(
                        source = %entry.source.display(),
                        destination = %entry.destination.display(),
                        %reason,
                        "move failed"
                    );
                    summary.failed_entries.push(FailedEntry {
                        source: entry.source.clone(),
                        destination: entry.destination.clone(),
                        reason: reason.clone(),
                    });
                    ExecutionResult::Failed { reason }
                }
            };

            summary.processed = index + 1;
            report(index + 1, total, entry, &outcome);
        }

        summary.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            moved = summary.moved_count,
            failed = summary.failed_count(),
            "run finished"
        );
        summary
    }

    fn move_entry(entry: &PlanEntry, claimed: &HashSet<PathBuf>) -> Result<(), MoveFailure> {
        fs::symlink_metadata(&entry.source)?;

        if claimed.contains(&entry.destination) {
            return Err(MoveFailure::DestinationOccupied);
        }

        if let Some(parent) = entry.destination.parent() {
            fs::create_dir_all(parent).map_err(|e| MoveFailure::DirectoryCreation {
                reason: e.to_string(),
            })?;
        }

        match fs::symlink_metadata(&entry.destination) {
            Ok(_) => return Err(MoveFailure::DestinationOccupied),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        move_file(&entry.source, &entry.destination)
    }
}

/// Rename, falling back to copy + verify + remove across filesystems.
fn move_file(source: &Path, destination: &Path) -> Result<(), MoveFailure> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(source = %source.display(), "rename crosses devices, copying");
            copy_and_remove(source, destination)
        }
        Err(e) => Err(e.into()),
    }
}

fn copy_and_remove(source: &Path, destination: &Path) -> Result<(), MoveFailure> {
    let expected = fs::metadata(source)?.len();
    fs::copy(source, destination)?;

    let actual = fs::metadata(destination)?.len();
    if actual != expected {
        let _ = fs::remove_file(destination);
        return Err(MoveFailure::VerificationFailed { expected, actual });
    }

    if let Err(e) = fs::remove_file(source) {
        let _ = fs::remove_file(destination);
        return Err(e.into());
    }
    Ok(())
}
