use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lingocr::api::{create_router, AppState};
use lingocr::assets::ModelFetcher;
use lingocr::config::Config;
use lingocr::detection::WhatlangIdentifier;
use lingocr::languages::{parse_model_list, ModelId};
use lingocr::ocr::{Recognizer, TesseractEngine};
use lingocr::pipeline::OcrPipeline;

#[derive(Parser)]
#[command(name = "lingocr")]
#[command(about = "Language-adaptive OCR over remote images")]
struct Args {
    /// Download these models before serving (comma-separated ids, or `all`)
    #[arg(long, value_name = "IDS")]
    prefetch: Option<String>,

    /// Download the baseline models before serving
    #[arg(long)]
    warm_baseline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env();

    let fetcher = ModelFetcher::new(&config.assets)?;
    fetcher.store().ensure_root().await?;
    tracing::info!(
        "Model cache: {} (source: {})",
        config.assets.cache_dir.display(),
        config.assets.base_url
    );

    let mut warm: Vec<ModelId> = Vec::new();
    if args.warm_baseline {
        warm.extend(config.ocr.baseline_languages.iter().copied());
    }
    if let Some(ids) = args.prefetch.as_deref() {
        if ids.trim().eq_ignore_ascii_case("all") {
            warm.extend(ModelId::all());
        } else {
            warm.extend(parse_model_list(ids));
        }
    }
    warm.sort();
    warm.dedup();
    if !warm.is_empty() {
        tracing::info!("Prefetching {} model(s): {}", warm.len(), ModelId::join(&warm));
        let failed = fetcher
            .ensure_many(&warm)
            .await
            .into_iter()
            .filter(|(_, outcome)| !outcome.is_available())
            .count();
        if failed > 0 {
            tracing::warn!(
                "{} model(s) could not be prefetched, they will be retried on demand",
                failed
            );
        }
    }

    tracing::info!(
        "Initializing Tesseract engine (baseline: {}, default: {})...",
        ModelId::join(&config.ocr.baseline_languages),
        config.ocr.default_language()
    );
    let engine = Arc::new(TesseractEngine::new(config.assets.cache_dir.clone()));
    let recognizer = Recognizer::new(
        engine,
        fetcher,
        config.ocr.baseline_languages.clone(),
        config.ocr.page_seg_mode,
    );
    let identifier = Arc::new(WhatlangIdentifier::from_config(&config.ocr));
    let pipeline = OcrPipeline::new(recognizer, identifier, &config.ocr);

    let state = AppState::new(config.clone(), pipeline)?;
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("lingocr starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/health", addr);
    tracing::info!("  API docs:     http://{}/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lingocr=info,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests...");
}
