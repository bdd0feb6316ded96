//! dirsort - sort a directory tree into buckets by type, date, or size
//!
//! Organizing is split into two phases so a plan can be reviewed before
//! anything moves:
//! - [`planner`] walks the source tree and classifies every file
//! - [`executor`] moves the planned files one at a time and reports progress
//!
//! The CLI driver lives in [`cli`]; everything else is usable as a library.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod logging;
pub mod output;
pub mod planner;

pub use classifier::{ClassificationMode, FileMetadata, classify};
pub use config::{AppConfig, CompiledFilters};
pub use error::{CliError, ConfigError, MoveFailure, PlanError};
pub use executor::{CancelToken, ExecutionResult, FailedEntry, PlanExecutor, RunSummary};
pub use planner::{OrganizationPlan, PlanBuilder, PlanEntry, PlanWarning};

pub use cli::{Cli, RunOutcome, run_cli};
