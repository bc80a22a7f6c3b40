mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{
    build_pipeline, png_bytes, seed_model, test_config, FakeEngine, FixedIdentifier,
    ENGLISH_SAMPLE, SPANISH_SAMPLE,
};
use lingocr::detection::{DetectionFailure, WhatlangIdentifier};
use lingocr::error::LingocrError;
use lingocr::languages::{LanguageTag, ModelId};
use lingocr::ocr::RecognitionConfig;

async fn serve_all_models(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"model-data".to_vec()))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_english_image_uses_english_model() {
    let mock_server = MockServer::start().await;
    serve_all_models(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &mock_server.uri());
    let engine = Arc::new(
        FakeEngine::new(dir.path())
            .respond("eng+spa", ENGLISH_SAMPLE)
            .respond("eng", "Hello world"),
    );
    let pipeline = build_pipeline(&config, engine.clone(), Arc::new(WhatlangIdentifier::new()));

    let result = pipeline.process(png_bytes(120, 80)).await.unwrap();

    assert_eq!(result.detected_lang, Some(LanguageTag::new("en")));
    assert_eq!(result.model, ModelId::ENGLISH);
    assert_eq!(result.text, "Hello world");

    let calls = engine.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].languages(), "eng+spa");
    assert_eq!(calls[0].page_seg_mode, None);
    assert_eq!(calls[1], RecognitionConfig::targeted(ModelId::ENGLISH, 6));
}

#[tokio::test]
async fn test_spanish_image_downloads_and_uses_spanish_model() {
    let mock_server = MockServer::start().await;
    serve_all_models(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &mock_server.uri());
    let engine = Arc::new(
        FakeEngine::new(dir.path())
            .respond("eng+spa", SPANISH_SAMPLE)
            .respond("spa", "Hola mundo"),
    );
    let pipeline = build_pipeline(&config, engine.clone(), Arc::new(WhatlangIdentifier::new()));

    let result = pipeline.process(png_bytes(120, 80)).await.unwrap();

    assert_eq!(result.detected_lang, Some(LanguageTag::new("es")));
    assert_eq!(result.model.as_str(), "spa");
    assert_eq!(result.text, "Hola mundo");
    assert!(dir.path().join("spa.traineddata").exists());
}

#[tokio::test]
async fn test_language_without_model_falls_back_to_default() {
    let mock_server = MockServer::start().await;
    serve_all_models(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &mock_server.uri());
    let engine = Arc::new(FakeEngine::new(dir.path()).respond("eng", "fallback text"));
    let identifier = Arc::new(FixedIdentifier(Ok(LanguageTag::new("sw"))));
    let pipeline = build_pipeline(&config, engine, identifier);

    let result = pipeline.process(png_bytes(64, 64)).await.unwrap();

    assert_eq!(result.detected_lang, Some(LanguageTag::new("sw")));
    assert_eq!(result.model, ModelId::ENGLISH);
    assert_eq!(result.text, "fallback text");
}

#[tokio::test]
async fn test_undetermined_language_falls_back_to_default() {
    let mock_server = MockServer::start().await;
    serve_all_models(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &mock_server.uri());
    let engine = Arc::new(FakeEngine::new(dir.path()).respond("eng", "12345"));
    let identifier = Arc::new(FixedIdentifier(Err(DetectionFailure::Undetermined)));
    let pipeline = build_pipeline(&config, engine, identifier);

    let result = pipeline.process(png_bytes(64, 64)).await.unwrap();

    assert_eq!(result.detected_lang, None);
    assert_eq!(result.model, ModelId::ENGLISH);
}

#[tokio::test]
async fn test_failed_sniff_degrades_to_default_model() {
    // spa cannot be fetched, so the baseline pass cannot run.
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spa.traineddata"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    seed_model(dir.path(), "eng");
    let config = test_config(dir.path(), &mock_server.uri());
    let engine = Arc::new(FakeEngine::new(dir.path()).respond("eng", "still readable"));
    let pipeline = build_pipeline(&config, engine.clone(), Arc::new(WhatlangIdentifier::new()));

    let result = pipeline.process(png_bytes(64, 64)).await.unwrap();

    assert_eq!(result.detected_lang, None);
    assert_eq!(result.model, ModelId::ENGLISH);
    assert_eq!(result.text, "still readable");
    assert_eq!(engine.calls().len(), 2);
}

#[tokio::test]
async fn test_download_failure_without_local_copy_fails_extraction() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &mock_server.uri());
    let engine = Arc::new(FakeEngine::new(dir.path()));
    let pipeline = build_pipeline(&config, engine.clone(), Arc::new(WhatlangIdentifier::new()));

    let err = pipeline.process(png_bytes(64, 64)).await.unwrap_err();

    assert!(matches!(err, LingocrError::Extraction(_)));
    // The final pass was still attempted.
    let calls = engine.calls();
    assert_eq!(calls.last(), Some(&RecognitionConfig::targeted(ModelId::ENGLISH, 6)));
}

#[tokio::test]
async fn test_download_failure_with_local_copy_succeeds() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    seed_model(dir.path(), "eng");
    seed_model(dir.path(), "spa");
    let config = test_config(dir.path(), &mock_server.uri());
    let engine = Arc::new(
        FakeEngine::new(dir.path())
            .respond("eng+spa", ENGLISH_SAMPLE)
            .respond("eng", "from the cache"),
    );
    let pipeline = build_pipeline(&config, engine, Arc::new(WhatlangIdentifier::new()));

    let result = pipeline.process(png_bytes(64, 64)).await.unwrap();

    assert_eq!(result.text, "from the cache");
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_undecodable_bytes_abort_before_any_download() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"model-data".to_vec()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &mock_server.uri());
    let engine = Arc::new(FakeEngine::new(dir.path()));
    let pipeline = build_pipeline(&config, engine.clone(), Arc::new(WhatlangIdentifier::new()));

    let err = pipeline.process(b"definitely not an image".to_vec()).await.unwrap_err();

    assert!(matches!(err, LingocrError::Decode(_)));
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn test_concurrent_requests_download_each_model_once() {
    let mock_server = MockServer::start().await;
    for code in ["eng", "spa"] {
        Mock::given(method("GET"))
            .and(path(format!("/{code}.traineddata")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![7u8; 32 * 1024])
                    .set_delay(std::time::Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), &mock_server.uri());
    let engine = Arc::new(
        FakeEngine::new(dir.path())
            .respond("eng+spa", ENGLISH_SAMPLE)
            .respond("eng", "Hello world"),
    );
    let pipeline = build_pipeline(&config, engine, Arc::new(WhatlangIdentifier::new()));

    let runs = (0..6).map(|_| {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { pipeline.process(png_bytes(64, 64)).await })
    });
    for handle in futures::future::join_all(runs).await {
        let result = handle.unwrap().unwrap();
        assert_eq!(result.text, "Hello world");
    }

    assert_eq!(
        std::fs::metadata(dir.path().join("eng.traineddata")).unwrap().len(),
        32 * 1024
    );
}
