//! HTTP summarization service for `condense-rs`.
//!
//! `condense-web` wraps a shared [`Summarizer`] in a small axum server:
//!
//! | Route | Description |
//! |-------|-------------|
//! | `POST /summarize` | `{"documents": [...]}` → `{"summary": "..."}` |
//! | `GET /health` | Liveness probe |
//!
//! Each document is a bare string or an object with a `text` field. Request
//! bodies are validated against the JSON Schema of the request type, and
//! failures map to status codes: 400 for malformed JSON or empty text, 415
//! for a missing JSON content type, 422 for schema violations (with
//! details), 500 for pipeline failures and 504 when the request deadline
//! elapses.
//!
//! # Quick start
//!
//! ```ignore
//! use condense_rs::prelude::*;
//! use condense_web::{WebConfig, spawn_web};
//! use std::sync::Arc;
//!
//! let tokenizer: Arc<dyn Tokenizer> = Arc::new(TiktokenTokenizer::cl100k()?);
//! let model = Arc::new(LeadModel::new(tokenizer.clone()));
//! let summarizer = Summarizer::new(model, tokenizer, SummarizerConfig::default())?;
//!
//! let addr = spawn_web(Arc::new(summarizer), WebConfig::default()).await?;
//! println!("Listening on http://{addr}");
//! ```

mod api;
mod server;

pub use api::{ApiError, SummarizeRequest, SummarizeResponse};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use condense_rs::Summarizer;

/// Configuration for the web server.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:3001`.
    pub bind_addr: SocketAddr,
    /// Per-request time limit for `POST /summarize`. Default: 300 seconds.
    ///
    /// `None` lets a request run as long as the summarizer's own deadline
    /// allows.
    pub request_timeout: Option<Duration>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            request_timeout: Some(Duration::from_secs(300)),
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// Bind to port 0 to let the OS pick a free port. The server runs until the
/// Tokio runtime shuts down.
pub async fn spawn_web(
    summarizer: Arc<Summarizer>,
    config: WebConfig,
) -> std::io::Result<SocketAddr> {
    let router = server::build_router(summarizer, config.request_timeout);
    server::start_server(router, config.bind_addr).await
}
