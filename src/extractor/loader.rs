use crate::extractor::sources::extract;
use crate::model::{ExtractError, RawListing, Source};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// Reads a scraped dataset (a JSON array of items) and maps every item.
pub async fn load_dataset(path: &Path, source: Source) -> Result<Vec<RawListing>, ExtractError> {
    let content = tokio::fs::read_to_string(path).await?;
    let listings = parse_dataset(&content, source)
        .map_err(|e| match e {
            ExtractError::NotAnArray(_) => ExtractError::NotAnArray(path.display().to_string()),
            other => other,
        })?;
    debug!("Loaded {} {} items from {}", listings.len(), source, path.display());
    Ok(listings)
}

pub fn parse_dataset(content: &str, source: Source) -> Result<Vec<RawListing>, ExtractError> {
    let data: Value = serde_json::from_str(content)?;
    let Value::Array(items) = data else {
        return Err(ExtractError::NotAnArray(String::new()));
    };

    let mut listings = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        if !item.is_object() {
            warn!("Skipping {} item #{}: not an object", source, idx);
            continue;
        }
        listings.push(extract(source, item));
    }
    Ok(listings)
}
