mod api;
mod blobs;
mod catalog;
mod config;
mod pages;
mod range;
mod state;
#[cfg(test)]
mod test_support;
mod utils;

use std::path::{Path, PathBuf};

use axum::{routing::get, Router};
use api::api_router;
use config::{apply_env_overrides, config_path_from_env, load_or_create_config, StorageBackend};
use pages::pages_router;
use reqwest::Client;
use state::{open_blob_store, AppState};
use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = config_path_from_env();
    let (mut config, created) = load_or_create_config(&config_path)?;
    if created {
        info!("Created default config at {:?}", config_path);
    } else {
        info!("Loaded config from {:?}", config_path);
    }
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    let backend = config.storage_backend(&config_path);
    match &backend {
        StorageBackend::Unconfigured => {
            info!("Blob storage not configured; the library will show sample albums.")
        }
        StorageBackend::Local(root) => {
            if !root.exists() {
                std::fs::create_dir_all(root)?;
            }
            info!("Using local blob storage at {:?}", root);
        }
        StorageBackend::Remote { api_url, .. } => {
            info!("Using remote blob storage at {}", api_url)
        }
    }

    let client = Client::builder().user_agent("eras/0.1").build()?;
    let store = open_blob_store(&backend, &config, client)?;
    let web_root = web_root(&config_path);
    if !web_root.join("templates/layout.html").exists() {
        warn!("Templates not found under {:?}; pages render unstyled.", web_root);
    }

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config, store, web_root);
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub(crate) fn app_router(state: AppState) -> Router {
    let blobs = Router::new()
        .route("/blobs/*path", get(blobs::get_blob))
        .with_state(state.clone());

    Router::new()
        .nest("/api", api_router(state.clone()))
        .merge(pages_router(state))
        .merge(blobs)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
}

/// First directory holding the page templates: next to the config file, then
/// the working directory, then the server crate when run from the workspace.
fn web_root(config_path: &Path) -> PathBuf {
    let mut candidates = Vec::new();
    if let Some(parent) = config_path.parent() {
        candidates.push(parent.join("web"));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("web"));
        candidates.push(cwd.join("crates").join("server").join("web"));
    }
    candidates.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("web"));
    let fallback = candidates[candidates.len() - 1].clone();
    candidates
        .into_iter()
        .find(|dir| dir.join("templates").is_dir())
        .unwrap_or(fallback)
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = match signal(SignalKind::terminate()) {
            Ok(signal) => signal,
            Err(err) => {
                warn!("Failed to install terminate signal handler: {}", err);
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", err);
        }
    }

    info!("Shutdown signal received.");
}
