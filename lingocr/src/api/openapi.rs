use axum::Json;
use serde::Serialize;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::handlers;

/// Shape of every error response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub code: u16,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "lingocr API",
        version = "1.0.0",
        description = "Language-adaptive OCR over remote images.",
    ),
    paths(
        handlers::health::root,
        handlers::health::health_check,
        handlers::ocr::ocr,
    ),
    components(schemas(
        ErrorBody,
        handlers::health::RootStatus,
        handlers::health::HealthData,
        handlers::ocr::OcrResponse,
    )),
    tags(
        (name = "health", description = "Liveness and model cache status"),
        (name = "ocr", description = "Text extraction from image URLs"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
