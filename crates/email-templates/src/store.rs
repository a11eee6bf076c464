/// Hand-off store for the selected template.
///
/// The listing side writes the chosen record under `selectedTemplate`; the detail side
/// reads it back. Values are JSON-serialized `TemplateRecord`s. Redis is used when
/// configured; an in-process copy is always kept so the hand-off works without it.
/// Within one process the in-process copy is authoritative. The backend is only read
/// when nothing has been selected since start-up.
///
/// Key schema (Redis):
/// - `etpl:v1:selectedTemplate` — JSON TemplateRecord
/// - `etpl:v1:selectedTemplate:catalog` — fingerprint of the catalog it was selected from
use std::future::Future;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::AppError;
use crate::model::TemplateRecord;
use template_common::error::CommonError;
use template_common::redis::RedisStore;

pub const KEY_NAMESPACE: &str = "etpl:v1:";
pub const SELECTED_TEMPLATE_KEY: &str = "selectedTemplate";
const SELECTED_CATALOG_KEY: &str = "selectedTemplate:catalog";

/// Key-value storage behind the selection hand-off.
pub trait SelectionBackend: Send + Sync {
    fn is_enabled(&self) -> bool;
    fn get(&self, name: &str) -> impl Future<Output = Option<String>> + Send;
    fn set(&self, name: &str, value: &str) -> impl Future<Output = bool> + Send;
}

impl SelectionBackend for RedisStore {
    fn is_enabled(&self) -> bool {
        RedisStore::is_enabled(self)
    }

    async fn get(&self, name: &str) -> Option<String> {
        RedisStore::get(self, name).await
    }

    async fn set(&self, name: &str, value: &str) -> bool {
        RedisStore::set(self, name, value).await
    }
}

pub struct SelectionStore<B = RedisStore> {
    backend: B,
    local: RwLock<Option<String>>,
    catalog_fingerprint: String,
}

impl<B: SelectionBackend> SelectionStore<B> {
    pub fn new(backend: B, catalog_fingerprint: &str) -> Self {
        Self {
            backend,
            local: RwLock::new(None),
            catalog_fingerprint: catalog_fingerprint.to_string(),
        }
    }

    /// Persist `record` as the current selection, replacing any earlier one.
    pub async fn save(&self, record: &TemplateRecord) -> Result<(), AppError> {
        let json = serde_json::to_string(record).map_err(CommonError::from)?;
        *self.local.write().await = Some(json.clone());

        if self.backend.is_enabled() {
            let template_stored = self.backend.set(SELECTED_TEMPLATE_KEY, &json).await;
            let catalog_stored = template_stored
                && self
                    .backend
                    .set(SELECTED_CATALOG_KEY, &self.catalog_fingerprint)
                    .await;
            match (template_stored, catalog_stored) {
                (false, _) => warn!(id = record.id, "selection not written to redis, kept in memory"),
                (true, false) => warn!(id = record.id, "selection written without its catalog revision"),
                (true, true) => {}
            }
        }
        info!(id = record.id, title = %record.title, "template selected");
        Ok(())
    }

    /// Read the current selection. Absent or unparsable values yield `None`.
    pub async fn load(&self) -> Option<TemplateRecord> {
        let local = self.local.read().await.clone();
        let raw = match local {
            Some(raw) => raw,
            None => {
                let raw = self.backend.get(SELECTED_TEMPLATE_KEY).await?;
                self.check_catalog().await;
                raw
            }
        };
        serde_json::from_str(&raw)
            .inspect_err(|e| warn!(error = %e, "stored selection is not a valid template"))
            .ok()
    }

    async fn check_catalog(&self) {
        if let Some(stored) = self.backend.get(SELECTED_CATALOG_KEY).await {
            if stored != self.catalog_fingerprint {
                info!(
                    stored = %stored,
                    current = %self.catalog_fingerprint,
                    "selection was made against a different catalog revision"
                );
            }
        }
    }
}
