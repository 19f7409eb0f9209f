use crate::api;
use crate::config::AppConfig;
use crate::pages::PageStore;
use axum::Router;
use axum::routing::get;
use http::{HeaderMap, HeaderValue, header};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pages: Arc<dyn PageStore>,
}

impl AppState {
    pub fn new(config: AppConfig, pages: Arc<dyn PageStore>) -> Self {
        Self { config, pages }
    }
}

pub fn router(state: AppState) -> Router {
    // The script embeds per-host wiring; keep intermediaries from caching it.
    let app_script = get(api::serve_app_script).layer(SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    ));

    let enable_cors = state.config.enable_cors;
    let mut router = Router::new()
        .route("/healthz", get(api::healthz))
        .route("/static/app.js", app_script)
        .route("/bookmarklet", get(api::get_bookmarklet))
        .fallback(api::serve_page)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        );
    if enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    router
}

/// Host the request was addressed to, preferring the proxy-forwarded value.
pub fn host_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(header::HOST))
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

pub async fn run(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::warn!(?err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
