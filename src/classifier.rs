//! File classification into destination buckets.
//!
//! A bucket is the name of the sub-folder a file lands in under the
//! destination root. Classification is a pure function of a file's
//! metadata and the chosen [`ClassificationMode`].
//!
//! # Examples
//!
//! ```
//! use dirsort::classifier::{classify, ClassificationMode, FileMetadata};
//! use std::time::SystemTime;
//!
//! let meta = FileMetadata::new("report.PDF", SystemTime::now(), 2048);
//! assert_eq!(classify(&meta, ClassificationMode::ByType), "pdf");
//! assert_eq!(classify(&meta, ClassificationMode::BySize), "small");
//! ```
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Bucket used by [`ClassificationMode::ByType`] when a file has no extension.
pub const NO_EXTENSION_BUCKET: &str = "no_extension";

/// Bucket used by [`ClassificationMode::ByDate`] when the modification time
/// cannot be represented as a calendar date.
pub const UNKNOWN_DATE_BUCKET: &str = "unknown_date";

/// Lower bound (inclusive) of the `medium` size bin: 1 MiB.
pub const MEDIUM_THRESHOLD: u64 = 1024 * 1024;

/// Lower bound (inclusive) of the `large` size bin: 10 MiB.
pub const LARGE_THRESHOLD: u64 = 10 * 1024 * 1024;

/// The criterion used to pick a bucket for every file in a planning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClassificationMode {
    /// Lowercased file extension (`pdf`, `jpg`, ...).
    #[default]
    #[serde(rename = "type")]
    ByType,
    /// Last-modified month in local time (`2024-03`).
    #[serde(rename = "date")]
    ByDate,
    /// One of three fixed size bins.
    #[serde(rename = "size")]
    BySize,
}

impl ClassificationMode {
    /// Short name as used on the command line and in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationMode::ByType => "type",
            ClassificationMode::ByDate => "date",
            ClassificationMode::BySize => "size",
        }
    }
}

impl std::fmt::Display for ClassificationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Size bins for [`ClassificationMode::BySize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeBin {
    /// Under 1 MiB.
    Small,
    /// From 1 MiB up to, but not including, 10 MiB.
    Medium,
    /// 10 MiB and above.
    Large,
}

impl SizeBin {
    /// Picks the bin for a byte count.
    pub fn for_size(size_bytes: u64) -> Self {
        if size_bytes < MEDIUM_THRESHOLD {
            SizeBin::Small
        } else if size_bytes < LARGE_THRESHOLD {
            SizeBin::Medium
        } else {
            SizeBin::Large
        }
    }

    /// Returns the directory name for this bin.
    pub fn dir_name(&self) -> &'static str {
        match self {
            SizeBin::Small => "small",
            SizeBin::Medium => "medium",
            SizeBin::Large => "large",
        }
    }
}

/// The metadata a classification decision is based on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    /// File name including its extension.
    pub name: String,
    /// Last modification time.
    pub modified_at: SystemTime,
    /// File size in bytes.
    pub size_bytes: u64,
}

impl FileMetadata {
    /// Creates metadata from already known values.
    pub fn new(name: impl Into<String>, modified_at: SystemTime, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            modified_at,
            size_bytes,
        }
    }

    /// Reads metadata for the file at `path`.
    ///
    /// Non UTF-8 names are converted lossily; the name is only used for
    /// extension detection, never for building destination paths.
    pub fn read(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            name,
            modified_at: metadata.modified()?,
            size_bytes: metadata.len(),
        })
    }
}

/// Maps a file to the name of its destination bucket.
pub fn classify(metadata: &FileMetadata, mode: ClassificationMode) -> String {
    match mode {
        ClassificationMode::ByType => extension_bucket(&metadata.name),
        ClassificationMode::ByDate => month_bucket(metadata.modified_at),
        ClassificationMode::BySize => SizeBin::for_size(metadata.size_bytes)
            .dir_name()
            .to_string(),
    }
}

/// Lowercased extension of a file name, if it has one.
///
/// Leading dots belong to the stem, so `.bashrc` has no extension while
/// `.config.json` has `json`. A trailing dot (`notes.`) counts as no extension.
///
/// ```
/// use dirsort::classifier::file_extension;
///
/// assert_eq!(file_extension("archive.TAR.GZ").as_deref(), Some("gz"));
/// assert_eq!(file_extension(".bashrc"), None);
/// ```
pub fn file_extension(name: &str) -> Option<String> {
    let stem_start = name.len() - name.trim_start_matches('.').len();
    match name[stem_start..].rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext.to_lowercase()),
        _ => None,
    }
}

fn extension_bucket(name: &str) -> String {
    file_extension(name).unwrap_or_else(|| NO_EXTENSION_BUCKET.to_string())
}

fn month_bucket(modified_at: SystemTime) -> String {
    match local_time(modified_at) {
        Some(local) => local.format("%Y-%m").to_string(),
        None => UNKNOWN_DATE_BUCKET.to_string(),
    }
}

/// `None` when the time is outside the range chrono can represent.
fn local_time(time: SystemTime) -> Option<DateTime<Local>> {
    let (secs, nanos) = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => (i64::try_from(after.as_secs()).ok()?, after.subsec_nanos()),
        Err(e) => {
            let before = e.duration();
            let secs = i64::try_from(before.as_secs()).ok()?;
            match before.subsec_nanos() {
                0 => (-secs, 0),
                nanos => (-secs - 1, 1_000_000_000 - nanos),
            }
        }
    };
    DateTime::<Utc>::from_timestamp(secs, nanos).map(|utc| utc.with_timezone(&Local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn named(name: &str) -> FileMetadata {
        FileMetadata::new(name, SystemTime::UNIX_EPOCH, 0)
    }

    fn sized(size: u64) -> FileMetadata {
        FileMetadata::new("blob.bin", SystemTime::UNIX_EPOCH, size)
    }

    fn modified_local(year: i32, month: u32, day: u32, hour: u32) -> FileMetadata {
        let local = Local
            .with_ymd_and_hms(year, month, day, hour, 30, 0)
            .earliest()
            .expect("valid local time");
        FileMetadata::new("photo.jpg", SystemTime::from(local), 10)
    }

    #[test]
    fn test_by_type_lowercases_extension() {
        assert_eq!(classify(&named("report.PDF"), ClassificationMode::ByType), "pdf");
        assert_eq!(classify(&named("Photo.JPG"), ClassificationMode::ByType), "jpg");
        assert_eq!(classify(&named("notes.txt"), ClassificationMode::ByType), "txt");
    }

    #[test]
    fn test_by_type_uses_last_extension() {
        assert_eq!(
            classify(&named("backup.tar.GZ"), ClassificationMode::ByType),
            "gz"
        );
    }

    #[test]
    fn test_by_type_without_extension() {
        assert_eq!(
            classify(&named("README"), ClassificationMode::ByType),
            NO_EXTENSION_BUCKET
        );
        assert_eq!(
            classify(&named("Makefile"), ClassificationMode::ByType),
            NO_EXTENSION_BUCKET
        );
    }

    #[test]
    fn test_by_type_hidden_files() {
        assert_eq!(
            classify(&named(".bashrc"), ClassificationMode::ByType),
            NO_EXTENSION_BUCKET
        );
        assert_eq!(
            classify(&named("..hidden"), ClassificationMode::ByType),
            NO_EXTENSION_BUCKET
        );
        assert_eq!(
            classify(&named(".config.json"), ClassificationMode::ByType),
            "json"
        );
    }

    #[test]
    fn test_by_type_trailing_dot() {
        assert_eq!(
            classify(&named("notes."), ClassificationMode::ByType),
            NO_EXTENSION_BUCKET
        );
    }

    #[test]
    fn test_by_size_boundaries() {
        assert_eq!(classify(&sized(0), ClassificationMode::BySize), "small");
        assert_eq!(
            classify(&sized(1_048_575), ClassificationMode::BySize),
            "small"
        );
        assert_eq!(
            classify(&sized(1_048_576), ClassificationMode::BySize),
            "medium"
        );
        assert_eq!(
            classify(&sized(10_485_759), ClassificationMode::BySize),
            "medium"
        );
        assert_eq!(
            classify(&sized(10_485_760), ClassificationMode::BySize),
            "large"
        );
    }

    #[test]
    fn test_by_date_ignores_day_and_hour() {
        assert_eq!(
            classify(&modified_local(2024, 3, 1, 0), ClassificationMode::ByDate),
            "2024-03"
        );
        assert_eq!(
            classify(&modified_local(2024, 3, 31, 23), ClassificationMode::ByDate),
            "2024-03"
        );
        assert_eq!(
            classify(&modified_local(2023, 12, 15, 12), ClassificationMode::ByDate),
            "2023-12"
        );
    }

    #[test]
    fn test_by_date_before_epoch() {
        assert_eq!(
            classify(&modified_local(1950, 6, 15, 12), ClassificationMode::ByDate),
            "1950-06"
        );
    }

    #[test]
    fn test_by_date_out_of_range_time() {
        let far_future = UNIX_EPOCH + std::time::Duration::from_secs(10_000_000_000_000);
        let meta = FileMetadata::new("a.txt", far_future, 1);
        assert_eq!(classify(&meta, ClassificationMode::ByDate), UNKNOWN_DATE_BUCKET);
    }

    #[test]
    fn test_file_extension_matches_type_buckets() {
        for name in ["..x", ".bashrc", "notes.", "README", ".config.json", "a.tar.GZ"] {
            let bucket = classify(&named(name), ClassificationMode::ByType);
            assert_eq!(
                file_extension(name).unwrap_or_else(|| NO_EXTENSION_BUCKET.to_string()),
                bucket,
                "{name}"
            );
        }
        assert_eq!(file_extension("..x"), None);
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(ClassificationMode::ByType.to_string(), "type");
        assert_eq!(ClassificationMode::ByDate.to_string(), "date");
        assert_eq!(ClassificationMode::BySize.to_string(), "size");
        assert_eq!(ClassificationMode::default(), ClassificationMode::ByType);
    }

    #[test]
    fn test_read_metadata_from_disk() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("data.CSV");
        fs::write(&path, vec![0u8; 42]).expect("Failed to write test file");

        let meta = FileMetadata::read(&path).expect("Failed to read metadata");
        assert_eq!(meta.name, "data.CSV");
        assert_eq!(meta.size_bytes, 42);
        assert_eq!(classify(&meta, ClassificationMode::ByType), "csv");
    }

    #[test]
    fn test_read_metadata_missing_file() {
        let result = FileMetadata::read(Path::new("/non/existent/file.txt"));
        assert!(result.is_err());
    }
}
