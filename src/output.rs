//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output, including colored output,
//! progress tracking, and formatted tables. Library code never prints; only the
//! CLI driver goes through this module.

use crate::executor::RunSummary;
use crate::planner::{OrganizationPlan, PlanWarning};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::time::Duration;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Progress bars and spinners
/// - Plan listings and summary tables
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::success("Files organized successfully!");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for the move phase.
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Creates a spinner shown while the source tree is walked.
    pub fn create_spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Lists every planned move.
    pub fn print_plan(plan: &OrganizationPlan) {
        for entry in &plan.entries {
            println!(" - {}", entry.source.display());
            println!("   → {}", entry.destination.display().to_string().dimmed());
        }
    }

    /// Prints files that were left out of the plan.
    pub fn print_warnings(warnings: &[PlanWarning]) {
        if warnings.is_empty() {
            return;
        }
        Self::warning(&format!(
            "{} {} skipped while planning:",
            warnings.len(),
            if warnings.len() == 1 { "file was" } else { "files were" }
        ));
        for warning in warnings {
            eprintln!("    - {}: {}", warning.path.display(), warning.message);
        }
    }

    /// Prints a summary table with file counts per bucket.
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("pdf".to_string(), 15);
    /// counts.insert("jpg".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23, 1_500_000);
    /// ```
    pub fn summary_table(bucket_counts: &BTreeMap<String, usize>, total_files: usize, total_bytes: u64) {
        Self::header("SUMMARY");

        let max_bucket_len = bucket_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(6);

        println!(
            "{:<width$} | {}",
            "Bucket".bold(),
            "Files".bold(),
            width = max_bucket_len
        );
        println!("{}", "-".repeat(max_bucket_len + 10));

        for (bucket, count) in bucket_counts {
            println!(
                "{:<width$} | {} {}",
                bucket,
                count.to_string().green(),
                plural(*count),
                width = max_bucket_len
            );
        }

        println!("{}", "-".repeat(max_bucket_len + 10));
        println!(
            "{:<width$} | {} {} ({})",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            format_bytes(total_bytes),
            width = max_bucket_len
        );
    }

    /// Prints the outcome of a run, listing every failure with its reason.
    ///
    /// The whole report goes to stdout so it stays in one piece when either
    /// stream is redirected.
    pub fn print_run_summary(summary: &RunSummary) {
        Self::header("RESULT");
        for line in run_summary_lines(summary) {
            println!("{}", line);
        }
    }
}

fn run_summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "  Moved:  {} {}",
        summary.moved_count.to_string().green(),
        plural(summary.moved_count)
    )];

    if !summary.failed_entries.is_empty() {
        lines.push(format!(
            "  Failed: {} {}",
            summary.failed_count().to_string().red(),
            plural(summary.failed_count())
        ));
        for failure in &summary.failed_entries {
            lines.push(format!(
                "    {} {} → {}: {}",
                "✗".red(),
                failure.source.display(),
                failure.destination.display(),
                failure.reason
            ));
        }
    }

    if summary.cancelled {
        lines.push(format!(
            "{} Run cancelled after {} of {} files.",
            "⚠".yellow(),
            summary.processed,
            summary.total
        ));
    }

    lines
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

/// Human-readable byte count using binary units.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MoveFailure;
    use crate::executor::FailedEntry;
    use std::path::PathBuf;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1_048_576), "1.00 MB");
        assert_eq!(format_bytes(10 * 1024 * 1024 * 1024), "10.00 GB");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1), "file");
        assert_eq!(plural(0), "files");
        assert_eq!(plural(2), "files");
    }

    #[test]
    fn test_run_summary_lists_every_failure_in_one_block() {
        let summary = RunSummary {
            moved_count: 3,
            failed_entries: vec![
                FailedEntry {
                    source: PathBuf::from("inbox/a.txt"),
                    destination: PathBuf::from("sorted/txt/a.txt"),
                    reason: MoveFailure::DestinationOccupied,
                },
                FailedEntry {
                    source: PathBuf::from("inbox/b.txt"),
                    destination: PathBuf::from("sorted/txt/b.txt"),
                    reason: MoveFailure::NotFound,
                },
            ],
            processed: 5,
            total: 5,
            ..Default::default()
        };

        let lines = run_summary_lines(&summary);
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("Failed"));
        assert!(lines[2].contains("inbox/a.txt"));
        assert!(lines[2].contains(&MoveFailure::DestinationOccupied.to_string()));
        assert!(lines[3].contains("inbox/b.txt"));
    }

    #[test]
    fn test_run_summary_without_failures() {
        let summary = RunSummary {
            moved_count: 1,
            processed: 1,
            total: 1,
            ..Default::default()
        };
        assert_eq!(run_summary_lines(&summary).len(), 1);
    }
}
