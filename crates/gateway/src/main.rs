use std::path::PathBuf;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;

use obsgate_gateway::config;
use obsgate_gateway::routes::{self, AppState};
use obsgate_gateway::tools::handlers::register_observability_tools;
use obsgate_gateway::tools::{default_max_tokens, ToolContext, ToolRegistry};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("obsgate gateway starting");

    // Load configuration. Misconfiguration is fatal.
    let config_dir = std::env::var("OBSGATE_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    let mut gateway_config = match config::load_config(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration, refusing to start");
            std::process::exit(1);
        }
    };

    if let Ok(url) = std::env::var("OBSGATE_BACKEND_URL") {
        gateway_config.backend.base_url = url;
    }
    if let Some(port) = std::env::var("OBSGATE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
    {
        gateway_config.server.port = port;
    }

    // Resolve the default budget before any request can race on it.
    let max_tokens = default_max_tokens();
    tracing::info!(max_tokens = max_tokens, "Default response budget ready");

    // Install Prometheus metrics recorder.
    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");

    let context = match ToolContext::new(&gateway_config.backend) {
        Ok(context) => context,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build backend client");
            std::process::exit(1);
        }
    };

    let mut registry = ToolRegistry::new(context);
    if let Err(e) = register_observability_tools(&mut registry, &gateway_config.guard) {
        tracing::error!(error = %e, "Failed to register tools");
        std::process::exit(1);
    }

    let state = Arc::new(AppState {
        registry,
        metrics_handle: Some(metrics_handle),
    });

    let app = routes::router(state);

    let port = gateway_config.server.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("Failed to bind TCP listener");

    tracing::info!(
        port = port,
        backend = %gateway_config.backend.base_url,
        "obsgate gateway listening"
    );

    axum::serve(listener, app).await.expect("HTTP server error");
}
