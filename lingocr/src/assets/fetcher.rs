use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info};

use crate::config::AssetConfig;
use crate::error::{LingocrError, Result};
use crate::languages::ModelId;

use super::store::AssetStore;

/// What `ensure` did for a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// Already cached, no network traffic.
    Present,
    Downloaded { bytes: u64 },
    /// Logged and swallowed; whatever was on disk before is untouched.
    Failed { reason: String },
}

impl EnsureOutcome {
    pub fn is_available(&self) -> bool {
        !matches!(self, EnsureOutcome::Failed { .. })
    }
}

/// Downloads models into the [`AssetStore`] at most once.
///
/// Concurrent `ensure` calls for the same id are serialized on a per-id lock;
/// the presence check is repeated once the lock is held, so late arrivals
/// reuse the first caller's download instead of starting their own.
#[derive(Clone)]
pub struct ModelFetcher {
    store: AssetStore,
    client: Client,
    base_url: String,
    in_flight: Arc<Mutex<HashMap<ModelId, Arc<tokio::sync::Mutex<()>>>>>,
}

impl ModelFetcher {
    pub fn new(config: &AssetConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LingocrError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self::with_client(
            AssetStore::from_config(config),
            client,
            config.base_url.clone(),
        ))
    }

    pub fn with_client(store: AssetStore, client: Client, base_url: impl Into<String>) -> Self {
        Self {
            store,
            client,
            base_url: base_url.into(),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &AssetStore {
        &self.store
    }

    pub fn url(&self, id: ModelId) -> String {
        format!(
            "{}/{}.{}",
            self.base_url.trim_end_matches('/'),
            id,
            self.store.extension()
        )
    }

    pub async fn ensure(&self, id: ModelId) -> EnsureOutcome {
        if self.store.exists(id).await {
            debug!(model = %id, "Model already cached");
            return EnsureOutcome::Present;
        }

        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        if self.store.exists(id).await {
            debug!(model = %id, "Model downloaded by a concurrent request");
            return EnsureOutcome::Present;
        }

        match self.download(id).await {
            Ok(bytes) => {
                info!(model = %id, bytes, "Downloaded language model");
                EnsureOutcome::Downloaded { bytes }
            }
            Err(e) => {
                error!(model = %id, "Failed to download language model: {}", e);
                EnsureOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Each id is ensured independently; one failure does not affect the rest.
    pub async fn ensure_many(&self, ids: &[ModelId]) -> Vec<(ModelId, EnsureOutcome)> {
        let outcomes = join_all(ids.iter().map(|id| self.ensure(*id))).await;
        ids.iter().copied().zip(outcomes).collect()
    }

    fn lock_for(&self, id: ModelId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(id).or_default())
    }

    async fn download(&self, id: ModelId) -> Result<u64> {
        let url = self.url(id);
        debug!(model = %id, url = %url, "Fetching language model");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LingocrError::Fetch(format!("request to {url} failed: {e}")))?;

        if response.status() != StatusCode::OK {
            return Err(LingocrError::Fetch(format!(
                "{url} returned {}",
                response.status()
            )));
        }

        self.store.write(id, response.bytes_stream()).await
    }
}
