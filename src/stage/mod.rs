//! Local staging pipeline.
//!
//! Takes the directory a hub download resolved to, finds every CSV file
//! under it, and copies them flat into a destination directory. Source
//! subdirectory structure is not preserved and same-named destination
//! files are overwritten; overwriting is the documented policy, not an
//! accident.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::CsvstageError;
use crate::hub::{DatasetHub, DatasetRef};

const CSV_SUFFIX: &str = ".csv";

/// One staged file: where it came from and where it landed.
#[derive(Clone, Debug)]
pub struct StagedFile {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Outcome of a pull.
#[derive(Clone, Debug)]
pub struct StageReport {
    pub files: Vec<StagedFile>,
    pub dest: PathBuf,
}

impl StageReport {
    /// Number of files copied. Zero is a valid, successful outcome.
    pub fn copied(&self) -> usize {
        self.files.len()
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Done. Copied {} CSV files to {}",
            self.copied(),
            self.dest.display()
        )
    }
}

/// Download `dataset` through `hub` and stage its CSV files into `dest`.
pub fn pull_dataset(
    hub: &dyn DatasetHub,
    dataset: &DatasetRef,
    dest: &Path,
) -> Result<StageReport, CsvstageError> {
    let source_root = hub.dataset_download(dataset)?;
    stage_csv_files(&source_root, dest)
}

/// Stage every CSV file under `source_root` into `dest`.
///
/// The destination directory is created (with parents) before the first
/// copy is attempted.
pub fn stage_csv_files(source_root: &Path, dest: &Path) -> Result<StageReport, CsvstageError> {
    fs::create_dir_all(dest)?;

    let mut files = Vec::new();
    for source in collect_csv_files(source_root)? {
        let target = copy_into(&source, dest)?;
        files.push(StagedFile { source, target });
    }

    Ok(StageReport {
        files,
        dest: dest.to_path_buf(),
    })
}

/// Recursively collect files whose name ends with the exact `.csv` suffix.
///
/// The match is case-sensitive: `data.CSV` does not count. Results are
/// sorted so staging order is deterministic.
pub fn collect_csv_files(root: &Path) -> Result<Vec<PathBuf>, CsvstageError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|source| CsvstageError::StageFailed {
            path: root.to_path_buf(),
            message: format!("failed while traversing source directory: {source}"),
        })?;

        if entry.file_type().is_file() && has_csv_name(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

fn has_csv_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with(CSV_SUFFIX))
        .unwrap_or(false)
}

/// Copy `file` into `dest_dir` under its base name, carrying the source
/// modification time over to the copy. Returns the target path.
fn copy_into(file: &Path, dest_dir: &Path) -> Result<PathBuf, CsvstageError> {
    let name = file
        .file_name()
        .ok_or_else(|| CsvstageError::StageFailed {
            path: file.to_path_buf(),
            message: "source file has no base name".to_string(),
        })?;
    let target = dest_dir.join(name);

    fs::copy(file, &target).map_err(|source| CsvstageError::StageFailed {
        path: file.to_path_buf(),
        message: format!("copy to '{}' failed: {}", target.display(), source),
    })?;

    // fs::copy carries permissions; the modification time needs a second
    // pass. Not every filesystem supports setting it, hence best-effort.
    if let Ok(modified) = file.metadata().and_then(|meta| meta.modified()) {
        if let Ok(dest_file) = fs::File::options().write(true).open(&target) {
            let _ = dest_file.set_modified(modified);
        }
    }

    Ok(target)
}
