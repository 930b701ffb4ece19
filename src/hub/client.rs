use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CsvstageError;

use super::{DatasetHub, DatasetRef};

/// Base URL of the Kaggle API.
pub const DEFAULT_BASE_URL: &str = "https://www.kaggle.com";

const ARCHIVE_NAME: &str = "archive.zip";
const FILES_DIR: &str = "files";
const COMPLETE_MARKER: &str = "COMPLETE";

// Upper bound on a downloaded archive; ureq's default body limit is far
// too small for dataset archives.
const MAX_ARCHIVE_BYTES: u64 = 8 * 1024 * 1024 * 1024;

/// Download-and-cache client for Kaggle datasets.
///
/// Datasets are fetched anonymously as zip archives and extracted into a
/// per-dataset cache entry. A cached entry is reused until `refresh` is
/// requested; the cache layout is
/// `<root>/datasets/<owner>/<dataset>/{files/,COMPLETE}`.
pub struct KaggleHub {
    agent: ureq::Agent,
    base_url: String,
    cache_root: PathBuf,
    refresh: bool,
}

impl KaggleHub {
    /// Build a hub, resolving the cache root from the environment.
    ///
    /// `cache_override` (the `--cache-dir` flag) wins, then `CSVSTAGE_CACHE`,
    /// then `$XDG_CACHE_HOME/csvstage`, then `$HOME/.cache/csvstage`. With
    /// none of these available the hub cannot operate at all, which is the
    /// one failure reported with a remediation hint instead of a trace.
    pub fn from_env(cache_override: Option<PathBuf>) -> Result<Self, CsvstageError> {
        let explicit = cache_override.or_else(|| env_path("CSVSTAGE_CACHE"));
        let cache_root =
            resolve_cache_root(explicit, env_path("XDG_CACHE_HOME"), env_path("HOME"))?;
        Ok(Self::with_cache_root(cache_root))
    }

    /// Build a hub with an explicit cache root.
    pub fn with_cache_root(cache_root: PathBuf) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(30)))
            .build();

        KaggleHub {
            agent: config.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_root,
            refresh: false,
        }
    }

    /// Override the API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Discard any cached copy before downloading.
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    fn cache_entry(&self, dataset: &DatasetRef) -> PathBuf {
        self.cache_root
            .join("datasets")
            .join(&dataset.owner)
            .join(&dataset.dataset)
    }

    fn download_archive(&self, dataset: &DatasetRef, target: &Path) -> Result<(), CsvstageError> {
        let url = format!(
            "{}/api/v1/datasets/download/{}/{}",
            self.base_url, dataset.owner, dataset.dataset
        );
        let url = url::Url::parse(&url).map_err(|source| CsvstageError::FetchFailed {
            slug: dataset.slug(),
            message: format!("invalid download URL: {source}"),
        })?;

        let mut response =
            self.agent
                .get(url.as_str())
                .call()
                .map_err(|source| CsvstageError::FetchFailed {
                    slug: dataset.slug(),
                    message: source.to_string(),
                })?;

        // Stream to a partial file and rename, so an interrupted download
        // never looks like a finished archive.
        let partial = target.with_extension("zip.part");
        let mut file = fs::File::create(&partial)?;
        let mut reader = response
            .body_mut()
            .with_config()
            .limit(MAX_ARCHIVE_BYTES)
            .reader();
        io::copy(&mut reader, &mut file).map_err(|source| CsvstageError::FetchFailed {
            slug: dataset.slug(),
            message: format!("download interrupted: {source}"),
        })?;

        fs::rename(&partial, target)?;
        Ok(())
    }
}

impl DatasetHub for KaggleHub {
    fn dataset_download(&self, dataset: &DatasetRef) -> Result<PathBuf, CsvstageError> {
        let entry = self.cache_entry(dataset);
        let files_dir = entry.join(FILES_DIR);
        let marker = entry.join(COMPLETE_MARKER);

        if self.refresh && entry.exists() {
            fs::remove_dir_all(&entry)?;
        }

        if marker.is_file() && files_dir.is_dir() {
            return Ok(files_dir);
        }

        fs::create_dir_all(&entry)?;

        let archive = entry.join(ARCHIVE_NAME);
        self.download_archive(dataset, &archive)?;

        // A missing marker with a populated files dir means an earlier run
        // died mid-extract; start that entry over.
        if files_dir.exists() {
            fs::remove_dir_all(&files_dir)?;
        }
        extract_zip(&archive, &files_dir)?;

        fs::remove_file(&archive)?;
        fs::write(&marker, b"")?;

        Ok(files_dir)
    }
}

fn extract_zip(archive_path: &Path, destination: &Path) -> Result<(), CsvstageError> {
    let file = fs::File::open(archive_path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|source| CsvstageError::ArchiveInvalid {
            path: archive_path.to_path_buf(),
            message: source.to_string(),
        })?;

    fs::create_dir_all(destination)?;

    for index in 0..archive.len() {
        let mut entry =
            archive
                .by_index(index)
                .map_err(|source| CsvstageError::ArchiveInvalid {
                    path: archive_path.to_path_buf(),
                    message: format!("unreadable archive entry #{index}: {source}"),
                })?;

        // Entries whose names escape the destination are dropped.
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let outpath = destination.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = fs::File::create(&outpath)?;
            io::copy(&mut entry, &mut out)?;
        }
    }

    Ok(())
}

fn resolve_cache_root(
    explicit: Option<PathBuf>,
    xdg_cache: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf, CsvstageError> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Some(dir) = xdg_cache {
        return Ok(dir.join("csvstage"));
    }
    if let Some(home) = home {
        return Ok(home.join(".cache").join("csvstage"));
    }

    Err(CsvstageError::HubUnavailable {
        message: "no cache location could be resolved (CSVSTAGE_CACHE, XDG_CACHE_HOME, and HOME are all unset)"
            .to_string(),
    })
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
