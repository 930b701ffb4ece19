use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::error::CsvstageError;

use super::DatasetRef;

/// One file advertised by the dataset listing API.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub name: String,
    #[serde(default)]
    pub total_bytes: Option<u64>,
}

/// List the files a dataset advertises, without downloading anything.
///
/// Uses the `datasets/list` endpoint with a short timeout. The response
/// shape is parsed defensively; rows that do not carry a file name are
/// dropped rather than failing the whole listing.
pub fn list_files(
    dataset: &DatasetRef,
    base_url: &str,
) -> Result<Vec<RemoteFile>, CsvstageError> {
    let url = format!(
        "{}/api/v1/datasets/list/{}/{}",
        base_url, dataset.owner, dataset.dataset
    );
    let url = url::Url::parse(&url).map_err(|source| CsvstageError::FetchFailed {
        slug: dataset.slug(),
        message: format!("invalid listing URL: {source}"),
    })?;

    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(10)))
        .build();
    let agent: ureq::Agent = config.into();

    let mut response =
        agent
            .get(url.as_str())
            .call()
            .map_err(|source| CsvstageError::FetchFailed {
                slug: dataset.slug(),
                message: source.to_string(),
            })?;
    let listing = response
        .body_mut()
        .read_json::<Value>()
        .map_err(|source| CsvstageError::FetchFailed {
            slug: dataset.slug(),
            message: format!("unreadable listing response: {source}"),
        })?;

    Ok(extract_files(&listing))
}

fn extract_files(listing: &Value) -> Vec<RemoteFile> {
    for key in ["datasetFiles", "files"] {
        if let Some(items) = listing.get(key).and_then(Value::as_array) {
            return parse_rows(items);
        }
    }

    if let Some(items) = listing.as_array() {
        return parse_rows(items);
    }

    Vec::new()
}

fn parse_rows(items: &[Value]) -> Vec<RemoteFile> {
    items
        .iter()
        .filter_map(|item| serde_json::from_value::<RemoteFile>(item.clone()).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_extracted_from_dataset_files_key() {
        let listing = serde_json::json!({
            "datasetFiles": [
                {"name": "runs.csv", "totalBytes": 1024},
                {"name": "README.md"}
            ]
        });

        let files = extract_files(&listing);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "runs.csv");
        assert_eq!(files[0].total_bytes, Some(1024));
        assert_eq!(files[1].total_bytes, None);
    }

    #[test]
    fn rows_without_names_are_dropped() {
        let listing = serde_json::json!({
            "datasetFiles": [
                {"totalBytes": 7},
                {"name": "kept.csv"}
            ]
        });

        let files = extract_files(&listing);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "kept.csv");
    }

    #[test]
    fn top_level_array_is_accepted() {
        let listing = serde_json::json!([{"name": "a.csv"}]);
        assert_eq!(extract_files(&listing).len(), 1);
    }

    #[test]
    fn unrecognized_shape_yields_empty_listing() {
        let listing = serde_json::json!({"message": "not found"});
        assert!(extract_files(&listing).is_empty());
    }
}
