//! CampusNotes HTTP server
//!
//! Thin axum layer over `campusnotes_core`: routing, auth extraction, error
//! mapping, CORS and graceful shutdown.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use state::SharedState;

/// Build the full application router
pub fn app(state: SharedState) -> anyhow::Result<Router> {
    let cors = cors_layer(&state.config.server.cors_origin)?;

    let mut router = Router::new().nest("/api", routes::api_router());

    // Locally stored uploads are served straight from disk
    if state.config.media.upload_url.is_empty() {
        router = router.nest_service(
            "/files",
            ServeDir::new(&state.config.media.local_dir),
        );
    }

    Ok(router
        .layer(DefaultBodyLimit::max(body_limit(
            state.config.media.max_upload_bytes,
        )))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Request body limit: the configured file cap plus room for multipart
/// boundaries and the other form fields
fn body_limit(max_upload_bytes: u64) -> usize {
    max_upload_bytes as usize + 64 * 1024
}

fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let allow_origin = if origin == "*" {
        AllowOrigin::any()
    } else {
        AllowOrigin::exact(HeaderValue::from_str(origin)?)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

/// Bind and serve until SIGINT or SIGTERM
pub async fn serve(state: SharedState, port: u16) -> anyhow::Result<()> {
    let router = app(state)?;

    let address = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&address).await?;
    info!("Listening on {}", address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
