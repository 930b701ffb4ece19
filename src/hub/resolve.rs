use crate::error::CsvstageError;

use super::DatasetRef;

/// Parse a user-supplied dataset reference (slug or kaggle.com dataset URL).
pub fn parse_dataset_input(input: &str) -> Result<DatasetRef, CsvstageError> {
    if input.starts_with("http://") || input.starts_with("https://") {
        parse_dataset_url(input)
    } else {
        parse_slug(input)
    }
}

fn parse_dataset_url(input: &str) -> Result<DatasetRef, CsvstageError> {
    let url = url::Url::parse(input).map_err(|source| CsvstageError::DatasetRefInvalid {
        input: input.to_string(),
        message: format!("invalid URL: {source}"),
    })?;

    let host = url
        .host_str()
        .ok_or_else(|| CsvstageError::DatasetRefInvalid {
            input: input.to_string(),
            message: "URL is missing a host".to_string(),
        })?
        .to_ascii_lowercase();

    if host != "www.kaggle.com" && host != "kaggle.com" {
        return Err(CsvstageError::DatasetRefInvalid {
            input: input.to_string(),
            message: format!("expected host 'www.kaggle.com', found '{}'", host),
        });
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|iter| iter.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    if segments.len() < 3 || segments[0] != "datasets" {
        return Err(CsvstageError::DatasetRefInvalid {
            input: input.to_string(),
            message: "expected dataset URL like https://www.kaggle.com/datasets/<owner>/<dataset>"
                .to_string(),
        });
    }

    parse_slug(&format!("{}/{}", segments[1], segments[2]))
}

fn parse_slug(slug: &str) -> Result<DatasetRef, CsvstageError> {
    let trimmed = slug.trim();
    let mut parts = trimmed.split('/');
    let owner = parts.next().unwrap_or_default();
    let dataset = parts.next().unwrap_or_default();
    let extra = parts.next();

    if owner.is_empty() || dataset.is_empty() || extra.is_some() {
        return Err(CsvstageError::DatasetRefInvalid {
            input: slug.to_string(),
            message: "expected a reference in '<owner>/<dataset>' form".to_string(),
        });
    }

    Ok(DatasetRef {
        owner: owner.to_string(),
        dataset: dataset.to_string(),
    })
}
