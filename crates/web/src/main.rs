use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

use floodaware_common::{FloodAwareError, Result};
use floodaware_web::client::AnalysisClient;
use floodaware_web::config;
use floodaware_web::pages::{self, PageRegistry};
use floodaware_web::server::{self, AppState};
use floodaware_web::submission::FlowSettings;

const CONFIG_ENV: &str = "FLOODAWARE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/floodaware.toml";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("FloodAware Web starting");

    if let Err(e) = run().await {
        tracing::error!(error = %e, "FloodAware Web stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config_path = std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let app_config = config::load_config(&config_path)?;

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| FloodAwareError::Server(format!("metrics recorder: {}", e)))?;

    let client = AnalysisClient::new(&app_config.backend)?;

    let settings = FlowSettings {
        request_timeout: Duration::from_secs(app_config.backend.request_timeout_seconds),
        max_image_bytes: app_config.uploads.max_image_bytes,
    };
    let registry = Arc::new(PageRegistry::new(
        Arc::new(client),
        settings,
        &app_config.pages,
    ));

    // Sweep at a tenth of the TTL, but not more than once a second.
    let sweep_every = Duration::from_secs((app_config.pages.idle_ttl_seconds / 10).max(1));
    let _sweeper = pages::spawn_sweeper(Arc::clone(&registry), sweep_every);

    let state = Arc::new(AppState {
        registry,
        metrics_handle,
        max_image_bytes: app_config.uploads.max_image_bytes,
    });

    let body_limit =
        usize::try_from(app_config.uploads.request_body_limit_bytes).unwrap_or(usize::MAX);
    let app = server::build_router(state, body_limit);

    let addr = format!(
        "{}:{}",
        app_config.server.bind_address, app_config.server.port
    );
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FloodAwareError::Server(format!("bind {}: {}", addr, e)))?;

    tracing::info!(addr = %addr, "FloodAware Web listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| FloodAwareError::Server(e.to_string()))
}
