use std::collections::HashSet;

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::config::CatalogSource;
use crate::error::AppError;
use crate::model::{badge_class, Catalog, CategorySummary};

/// Message shown in place of the listing when the catalog could not be loaded.
pub const LOAD_ERROR_MESSAGE: &str = "Error loading templates. Please refresh the page.";

/// A parsed catalog together with a fingerprint of the document it came from.
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    /// Hex SHA-256 of the raw catalog document.
    pub fingerprint: String,
}

/// Fetch the catalog once from its configured source. There is no retry.
pub async fn load_catalog(source: &CatalogSource) -> Result<LoadedCatalog, AppError> {
    let content = match source {
        CatalogSource::File(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::Fetch(format!("failed to read {}: {e}", path.display())))?,
        CatalogSource::Url(url) => fetch_url(url).await?,
    };

    let loaded = parse_loaded(&content)?;
    if loaded.catalog.is_empty() {
        warn!(source = %source, "catalog contains no templates");
    }
    info!(
        source = %source,
        templates = loaded.catalog.len(),
        fingerprint = %loaded.fingerprint,
        "catalog loaded"
    );
    Ok(loaded)
}

async fn fetch_url(url: &str) -> Result<String, AppError> {
    let response = reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| AppError::Fetch(format!("GET {url}: {e}")))?;
    response
        .text()
        .await
        .map_err(|e| AppError::Fetch(format!("GET {url}: {e}")))
}

pub fn parse_loaded(content: &str) -> Result<LoadedCatalog, AppError> {
    Ok(LoadedCatalog {
        catalog: parse_catalog(content)?,
        fingerprint: fingerprint(content),
    })
}

/// Parse a `{"templates": [...]}` document and check catalog invariants.
pub fn parse_catalog(content: &str) -> Result<Catalog, AppError> {
    let catalog: Catalog = serde_json::from_str(content).map_err(|e| AppError::Parse {
        line: e.line(),
        message: e.to_string(),
    })?;

    let mut seen = HashSet::with_capacity(catalog.len());
    for record in &catalog.templates {
        if !seen.insert(record.id) {
            return Err(AppError::DuplicateId(record.id));
        }
        if record.subject.is_some() != record.body.is_some() {
            warn!(
                id = record.id,
                has_subject = record.subject.is_some(),
                has_body = record.body.is_some(),
                "template should carry both subject and body or neither"
            );
        }
    }

    Ok(catalog)
}

/// Distinct lower-cased categories in order of first appearance.
pub fn categories(catalog: &Catalog) -> Vec<CategorySummary> {
    let mut out: Vec<CategorySummary> = Vec::new();
    for record in &catalog.templates {
        let key = record.category.to_lowercase();
        match out.iter_mut().find(|c| c.key == key) {
            Some(existing) => existing.template_count += 1,
            None => out.push(CategorySummary {
                badge_class: badge_class(&key),
                key,
                template_count: 1,
            }),
        }
    }
    out
}

pub fn fingerprint(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    format!("{digest:x}")
}
