use std::path::{Path, PathBuf};

use crate::error::AppError;

const DEFAULT_SEARCH_LIMIT: usize = 20;
const MAX_SEARCH_LIMIT: usize = 100;

/// Where the template catalog JSON is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Url(String),
}

impl CatalogSource {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw.to_string())
        } else {
            Self::File(Path::new(raw).to_path_buf())
        }
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Application configuration loaded explicitly from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL. `None` keeps the selected template in process memory only.
    pub redis_url: Option<String>,
    pub catalog: CatalogSource,
    /// Default cap on displayed search results.
    pub search_limit: usize,
    /// Command line used when the system clipboard is unreachable, e.g. "xclip -selection clipboard".
    pub clipboard_command: Option<String>,
}

impl Config {
    /// Required:
    /// - `TEMPLATE_CATALOG`: path or http(s) URL of the catalog JSON
    ///
    /// Optional:
    /// - `REDIS_URL`
    /// - `SEARCH_RESULT_LIMIT` (default: 20, max: 100)
    /// - `CLIPBOARD_COMMAND`
    pub fn from_env() -> Result<Self, AppError> {
        let catalog = std::env::var("TEMPLATE_CATALOG").map_err(|_| {
            AppError::Config("TEMPLATE_CATALOG environment variable is required".to_string())
        })?;
        if catalog.trim().is_empty() {
            return Err(AppError::Config("TEMPLATE_CATALOG must not be empty".to_string()));
        }

        let search_limit = match std::env::var("SEARCH_RESULT_LIMIT") {
            Ok(raw) => parse_search_limit(&raw)?,
            Err(_) => DEFAULT_SEARCH_LIMIT,
        };

        Ok(Self {
            redis_url: std::env::var("REDIS_URL").ok(),
            catalog: CatalogSource::parse(&catalog),
            search_limit,
            clipboard_command: std::env::var("CLIPBOARD_COMMAND")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        })
    }

    /// Clamp a per-request limit to the configured bounds.
    pub fn effective_limit(&self, requested: Option<u32>) -> usize {
        requested
            .map(|n| n as usize)
            .unwrap_or(self.search_limit)
            .clamp(1, MAX_SEARCH_LIMIT)
    }
}

fn parse_search_limit(raw: &str) -> Result<usize, AppError> {
    let limit = raw.trim().parse::<usize>().map_err(|_| {
        AppError::Config(format!("SEARCH_RESULT_LIMIT must be a positive integer, got '{raw}'"))
    })?;
    if limit == 0 {
        return Err(AppError::Config("SEARCH_RESULT_LIMIT must be at least 1".to_string()));
    }
    Ok(limit.min(MAX_SEARCH_LIMIT))
}
