//! Plan building: walk a source tree and decide where every file goes.
//!
//! Building a plan never touches the filesystem beyond directory listing
//! and `stat` calls, so a preview can be shown before anything moves.

use crate::classifier::{ClassificationMode, FileMetadata, classify};
use crate::config::CompiledFilters;
use crate::error::PlanError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One planned relocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// Existing regular file at plan-build time.
    pub source: PathBuf,
    /// `{destination_root}/{bucket}/{original file name}`.
    pub destination: PathBuf,
    /// Bucket the classifier picked.
    pub bucket: String,
    /// Size observed while planning.
    pub size_bytes: u64,
}

/// A file that was left out of the plan because it could not be inspected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanWarning {
    pub path: PathBuf,
    pub message: String,
}

/// Ordered list of relocations, in directory-walk discovery order.
///
/// A plan is never mutated after it is built; rebuild it when inputs change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationPlan {
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
    pub mode: ClassificationMode,
    pub entries: Vec<PlanEntry>,
    pub warnings: Vec<PlanWarning>,
}

impl OrganizationPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of planned files per bucket, sorted by bucket name.
    pub fn bucket_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.bucket.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Total size of all planned files.
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.size_bytes).sum()
    }
}

/// Builds [`OrganizationPlan`]s.
///
/// # Examples
///
/// ```no_run
/// use dirsort::classifier::ClassificationMode;
/// use dirsort::planner::PlanBuilder;
/// use std::path::Path;
///
/// let plan = PlanBuilder::new()
///     .build(Path::new("/home/me/Downloads"), Path::new("/home/me/Sorted"), ClassificationMode::ByType)
///     .expect("source should be readable");
/// for entry in &plan.entries {
///     println!("{} -> {}", entry.source.display(), entry.destination.display());
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlanBuilder {
    filters: CompiledFilters,
    follow_symlinks: bool,
}

impl PlanBuilder {
    /// A builder that plans every regular file and does not follow symlinks.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(mut self, filters: CompiledFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Walk `source_root` and plan a destination for every regular file.
    ///
    /// Fails with [`PlanError::InvalidInput`] when either root is empty and
    /// with [`PlanError::SourceUnreadable`] when the source root cannot be
    /// listed. Files whose metadata cannot be read, and unreadable
    /// sub-directories, become [`PlanWarning`]s instead of errors.
    pub fn build(
        &self,
        source_root: &Path,
        destination_root: &Path,
        mode: ClassificationMode,
    ) -> Result<OrganizationPlan, PlanError> {
        if source_root.as_os_str().is_empty() {
            return Err(PlanError::InvalidInput { field: "source" });
        }
        if destination_root.as_os_str().is_empty() {
            return Err(PlanError::InvalidInput {
                field: "destination",
            });
        }

        Self::check_source_root(source_root)?;

        info!(
            source = %source_root.display(),
            destination = %destination_root.display(),
            %mode,
            "building organization plan"
        );

        let mut plan = OrganizationPlan {
            source_root: source_root.to_path_buf(),
            destination_root: destination_root.to_path_buf(),
            mode,
            entries: Vec::new(),
            warnings: Vec::new(),
        };

        let resolved_source = resolve_root(source_root);
        let resolved_destination = resolve_root(destination_root);

        let walker = WalkDir::new(source_root).follow_links(self.follow_symlinks);

        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| source_root.to_path_buf());
                    warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                    plan.warnings.push(PlanWarning {
                        path,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(source_root).unwrap_or(path);
            if !self.filters.should_include(relative) {
                debug!(path = %path.display(), "excluded by filters");
                continue;
            }

            let metadata = match FileMetadata::read(path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping file with unreadable metadata");
                    plan.warnings.push(PlanWarning {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let bucket = classify(&metadata, mode);
            let Some(file_name) = path.file_name() else {
                continue;
            };
            let destination = destination_root.join(&bucket).join(file_name);

            let resolved = resolved_destination.join(&bucket).join(file_name);
            if resolved == resolved_source.join(relative) {
                debug!(path = %path.display(), "already in place");
                continue;
            }

            debug!(
                source = %path.display(),
                destination = %destination.display(),
                "planned"
            );
            plan.entries.push(PlanEntry {
                source: path.to_path_buf(),
                destination,
                bucket,
                size_bytes: metadata.size_bytes,
            });
        }

        info!(
            files = plan.entries.len(),
            warnings = plan.warnings.len(),
            "plan built"
        );

        Ok(plan)
    }

    fn check_source_root(source_root: &Path) -> Result<(), PlanError> {
        let unreadable = |source: std::io::Error| PlanError::SourceUnreadable {
            path: source_root.to_path_buf(),
            source,
        };

        let metadata = fs::metadata(source_root).map_err(unreadable)?;
        if !metadata.is_dir() {
            return Err(unreadable(std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                "not a directory",
            )));
        }
        fs::read_dir(source_root).map_err(unreadable)?;
        Ok(())
    }
}

/// Absolute, symlink-free spelling of a root that may not exist yet.
///
/// The deepest existing ancestor is canonicalized and the missing tail is
/// appended unchanged.
fn resolve_root(root: &Path) -> PathBuf {
    let absolute = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = fs::canonicalize(existing) {
            return missing
                .iter()
                .rev()
                .fold(canonical, |path, name| path.join(name));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return absolute.clone(),
        }
    }
}
