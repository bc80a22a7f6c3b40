use std::time::Duration;

use futures::StreamExt;
use reqwest::{header, Client, StatusCode};
use tracing::error;
use url::Url;

use crate::config::FetchConfig;
use crate::error::{LingocrError, Result};

/// Downloads the caller's image and checks it is one before the pipeline sees it.
#[derive(Clone, Debug)]
pub struct ImageSource {
    client: Client,
    max_bytes: u64,
}

impl ImageSource {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LingocrError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_bytes: config.max_bytes,
        })
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let url = Url::parse(url.trim())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(LingocrError::Validation(
                "image url must use http or https".to_string(),
            ));
        }

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            error!(url = %url, "failed to fetch image url: {}", e);
            LingocrError::Fetch("failed to fetch image".to_string())
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            error!(url = %url, status = %status, "failed to fetch image");
            return Err(LingocrError::Fetch(format!(
                "failed to fetch image: upstream returned {status}"
            )));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !content_type.starts_with("image/") {
            error!(
                url = %url,
                content_type = %content_type,
                "the given url does not point to an image"
            );
            return Err(LingocrError::Validation(
                "the given url does not point to an image".to_string(),
            ));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_bytes {
                return Err(self.too_large());
            }
        }

        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| {
                error!(url = %url, "failed to read image body: {}", e);
                LingocrError::Fetch("failed to fetch image".to_string())
            })?;
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(self.too_large());
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }

    fn too_large(&self) -> LingocrError {
        LingocrError::Validation(format!(
            "image exceeds the maximum size of {} bytes",
            self.max_bytes
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(max_bytes: u64) -> ImageSource {
        ImageSource::new(&FetchConfig {
            timeout_secs: 5,
            max_bytes,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetches_image_bytes() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cat.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(vec![1u8, 2, 3]),
            )
            .mount(&mock_server)
            .await;

        let bytes = source(1024)
            .fetch(&format!("{}/cat.png", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_non_200_is_fetch_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let err = source(1024)
            .fetch(&format!("{}/missing.png", mock_server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, LingocrError::Fetch(_)));
        assert!(err.to_string().contains("404"), "{err}");
    }

    #[tokio::test]
    async fn test_non_image_content_type_is_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/pdf")
                    .set_body_bytes(b"%PDF-1.7".to_vec()),
            )
            .mount(&mock_server)
            .await;

        let err = source(1024)
            .fetch(&format!("{}/doc.pdf", mock_server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, LingocrError::Validation(_)));
        assert!(err.to_string().contains("does not point to an image"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(vec![0u8; 2048]),
            )
            .mount(&mock_server)
            .await;

        let err = source(1024)
            .fetch(&format!("{}/big.jpg", mock_server.uri()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("maximum size"), "{err}");
    }

    #[tokio::test]
    async fn test_invalid_and_non_http_urls() {
        let s = source(1024);
        assert!(matches!(
            s.fetch("not a url").await,
            Err(LingocrError::UrlParse(_))
        ));
        assert!(matches!(
            s.fetch("file:///etc/passwd").await,
            Err(LingocrError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let err = source(1024)
            .fetch("http://127.0.0.1:9/image.png")
            .await
            .unwrap_err();
        assert!(matches!(err, LingocrError::Fetch(_)));
    }
}
