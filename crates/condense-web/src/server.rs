//! Axum server setup and router construction.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use condense_rs::Summarizer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::api::{self, AppState};

/// Build the full axum router.
pub fn build_router(summarizer: Arc<Summarizer>, request_timeout: Option<Duration>) -> Router {
    let state = AppState {
        summarizer,
        request_timeout,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/summarize", post(api::post_summarize))
        .route("/health", get(api::get_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bind `bind_addr`, serve `router` on a background task, and return the
/// bound address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;
    info!("condense-web listening on http://{addr}");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("server error: {e}");
        }
    });

    Ok(addr)
}
