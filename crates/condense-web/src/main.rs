//! HTTP summarization server.
//!
//! # Usage
//!
//! ```bash
//! OPENROUTER_KEY=sk-... cargo run -p condense-web
//! cargo run -p condense-web -- --backend lead --port 8080
//! ```
//!
//! ```bash
//! curl -s localhost:3001/summarize \
//!   -H 'content-type: application/json' \
//!   -d '{"documents": ["A is a test.", {"text": "B is another test."}]}'
//! ```

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use condense_rs::cli::{ModelArgs, PipelineArgs, build_summarizer, init_tracing};
use condense_web::{WebConfig, spawn_web};
use tracing::info;

/// Serve hierarchical summarization over HTTP.
#[derive(Parser)]
#[command(name = "condense-web")]
struct Args {
    /// Interface to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Per-request time limit in seconds (0 disables it).
    #[arg(long, default_value_t = 300)]
    request_timeout_secs: u64,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    model: ModelArgs,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let summarizer = build_summarizer(&args.model, &args.pipeline)?;
    info!(
        "Using model {} with {} tokenizer",
        summarizer.model_name(),
        summarizer.tokenizer_name()
    );

    let config = WebConfig {
        bind_addr: SocketAddr::new(args.host, args.port),
        request_timeout: (args.request_timeout_secs > 0)
            .then(|| Duration::from_secs(args.request_timeout_secs)),
    };
    let addr = spawn_web(Arc::new(summarizer), config)
        .await
        .map_err(|e| format!("failed to bind: {e}"))?;
    println!("Listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to listen for ctrl-c: {e}"))?;
    info!("Shutting down");
    Ok(())
}
