use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::extractors::AppQuery;
use crate::api::state::AppState;
use crate::error::{LingocrError, Result};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OcrQuery {
    /// Absolute http(s) URL of the image to read.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct OcrResponse {
    pub image_url: String,
    /// Tag reported by language detection, `null` when detection failed.
    pub detected_lang: Option<String>,
    /// Model used for the final pass.
    pub tess_language: String,
    pub result: String,
}

/// `GET /ocr?url=`
#[utoipa::path(
    get,
    path = "/ocr",
    tag = "ocr",
    params(OcrQuery),
    responses(
        (status = 200, description = "Text extracted from the image", body = OcrResponse),
        (
            status = 400,
            description = "Missing url, unreachable image, not an image, or an image outside \
                the configured size limits (by default 25 MiB and 10000 px per side)",
            body = crate::api::openapi::ErrorBody
        ),
        (status = 500, description = "Text extraction failed", body = crate::api::openapi::ErrorBody),
    )
)]
pub async fn ocr(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<OcrQuery>,
) -> Result<Json<OcrResponse>> {
    let image_url = query
        .url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| LingocrError::Validation("image url is required".to_string()))?;

    let bytes = state.images.fetch(&image_url).await?;
    let outcome = state.pipeline.process(bytes).await?;

    let response = OcrResponse {
        image_url,
        detected_lang: outcome.detected_lang.map(|tag| tag.as_str().to_string()),
        tess_language: outcome.model.to_string(),
        result: outcome.text,
    };

    info!(
        image_url = %response.image_url,
        detected_lang = response.detected_lang.as_deref().unwrap_or("unknown"),
        tess_language = %response.tess_language,
        chars = response.result.chars().count(),
        "OCR response"
    );

    Ok(Json(response))
}
