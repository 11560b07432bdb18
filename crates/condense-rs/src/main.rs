//! Summarize text files (or stdin) of any length.
//!
//! Reads the API key from the `OPENROUTER_KEY` environment variable when the
//! OpenRouter backend is used.
//!
//! # Examples
//!
//! ```sh
//! # Summarize two files as one combined stream
//! condense notes-1.txt notes-2.txt
//!
//! # Pipe content from stdin, offline extractive backend
//! cat report.txt | condense --stdin --backend lead
//!
//! # Full report with per-level statistics as JSON
//! condense --json --chunk-size 3000 --max-input-tokens 4096 book.txt
//! ```

use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use condense_rs::cli::{ModelArgs, PipelineArgs, build_summarizer, init_tracing, load_documents};
use condense_rs::prelude::*;
use tracing::warn;

/// Summarize text of any length into a fixed token budget.
#[derive(Parser)]
#[command(name = "condense")]
struct Cli {
    /// Text files to summarize. Each file is one document.
    files: Vec<PathBuf>,

    /// Read one more document from stdin.
    #[arg(long)]
    stdin: bool,

    /// Print the full report (levels, calls, failures) as JSON.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    model: ModelArgs,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

async fn run(cli: Cli) -> Result<(), String> {
    let mut stdin = io::stdin();
    let documents = load_documents(
        &cli.files,
        cli.stdin.then_some(&mut stdin as &mut dyn io::Read),
    )?;
    let summarizer = build_summarizer(&cli.model, &cli.pipeline)?;

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling summarization");
            on_ctrl_c.cancel();
        }
    });

    let summary = summarizer
        .summarize_documents_with(&documents, &cancel)
        .await
        .map_err(|e| e.to_string())?;

    if cli.json {
        let report = serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("failed to serialize report: {e}"))?;
        println!("{report}");
    } else {
        println!("{}", summary.text);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
