//! Kaggle hub orchestration helpers.
//!
//! This module owns remote-specific concerns (dataset reference resolution,
//! preflight listing, and download-and-cache). The local copy pipeline stays
//! in `crate::stage`.

pub mod client;
pub mod preflight;
pub mod resolve;

use std::fmt;
use std::path::PathBuf;

use crate::error::CsvstageError;

/// Canonical reference to a Kaggle dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetRef {
    pub owner: String,
    pub dataset: String,
}

impl DatasetRef {
    /// The `owner/dataset` slug form used by the Kaggle API.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.dataset)
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.dataset)
    }
}

/// Download capability consumed by the staging pipeline.
///
/// Implementations obtain (and may cache) the dataset's files locally and
/// return the directory containing them. The pipeline treats that directory
/// as read-only.
pub trait DatasetHub {
    fn dataset_download(&self, dataset: &DatasetRef) -> Result<PathBuf, CsvstageError>;
}
