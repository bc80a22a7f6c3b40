use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::error::Result;
use crate::languages::ModelId;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct RootStatus {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub cache_dir: String,
    /// Models usable from the local cache right now.
    #[schema(value_type = Vec<String>)]
    pub cached_models: Vec<ModelId>,
    #[schema(value_type = Vec<String>)]
    pub baseline: Vec<ModelId>,
    #[schema(value_type = String)]
    pub default_language: ModelId,
}

/// `GET /`
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = RootStatus),
    )
)]
pub async fn root() -> Json<RootStatus> {
    Json(RootStatus {
        status: "running".to_string(),
        message: "OCR API is live!".to_string(),
    })
}

/// `GET /health`
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health and model cache status", body = HealthData),
        (status = 500, description = "Cache directory could not be read", body = crate::api::openapi::ErrorBody),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthData>> {
    let recognizer = state.pipeline.recognizer();
    let store = recognizer.fetcher().store();
    let cached_models = store.list().await?;

    Ok(Json(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache_dir: store.root().display().to_string(),
        cached_models,
        baseline: recognizer.baseline().to_vec(),
        default_language: state.pipeline.resolver().default_model(),
    }))
}
