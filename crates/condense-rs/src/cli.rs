//! Command-line arguments shared by the `condense` and `condense-web`
//! binaries.
//!
//! Flatten [`ModelArgs`] and [`PipelineArgs`] into a `clap::Parser` struct,
//! then call [`build_summarizer`].

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::api::retry::RetryConfig;
use crate::model::openrouter::DEFAULT_MODEL;
use crate::model::{LeadModel, OpenRouterModel, SummaryModel};
use crate::pipeline::{Summarizer, SummarizerConfig};
use crate::text::{Document, TiktokenTokenizer, Tokenizer, WordTokenizer};

/// Which [`SummaryModel`] to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Abstractive summaries from an OpenRouter-hosted LLM.
    Openrouter,
    /// Offline extractive summaries (leading sentences).
    Lead,
}

/// Which [`Tokenizer`] counts tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TokenizerKind {
    /// OpenAI cl100k BPE.
    Cl100k,
    /// Whitespace-separated words.
    Words,
}

/// Model and tokenizer selection.
#[derive(Debug, Clone, Args)]
pub struct ModelArgs {
    /// Summarization backend.
    #[arg(long, value_enum, default_value_t = Backend::Openrouter)]
    pub backend: Backend,

    /// OpenRouter model ID (with --backend openrouter).
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Sampling temperature (with --backend openrouter).
    #[arg(long, default_value_t = 0.0)]
    pub temperature: f32,

    /// Tokenizer used for window sizes and budgets.
    #[arg(long, value_enum, default_value_t = TokenizerKind::Cl100k)]
    pub tokenizer: TokenizerKind,
}

impl ModelArgs {
    pub fn build_tokenizer(&self) -> Result<Arc<dyn Tokenizer>, String> {
        match self.tokenizer {
            TokenizerKind::Cl100k => TiktokenTokenizer::cl100k()
                .map(|t| Arc::new(t) as Arc<dyn Tokenizer>)
                .map_err(|e| e.to_string()),
            TokenizerKind::Words => Ok(Arc::new(WordTokenizer::new())),
        }
    }

    pub fn build_model(
        &self,
        tokenizer: Arc<dyn Tokenizer>,
    ) -> Result<Arc<dyn SummaryModel>, String> {
        match self.backend {
            Backend::Openrouter => {
                let model =
                    OpenRouterModel::from_env(&self.model)?.with_temperature(self.temperature);
                Ok(Arc::new(model))
            }
            Backend::Lead => Ok(Arc::new(LeadModel::new(tokenizer))),
        }
    }
}

/// Windowing, output size, concurrency, retry, and deadline settings.
#[derive(Debug, Clone, Args)]
pub struct PipelineArgs {
    /// Maximum tokens per window.
    #[arg(long, default_value_t = 900)]
    pub chunk_size: usize,

    /// Tokens shared by consecutive windows.
    #[arg(long, default_value_t = 50)]
    pub overlap: usize,

    /// Model input limit; the final summary fits within it.
    #[arg(long, default_value_t = 1024)]
    pub max_input_tokens: usize,

    /// Minimum tokens per partial summary.
    #[arg(long, default_value_t = 40)]
    pub min_summary_tokens: usize,

    /// Maximum tokens per partial summary.
    #[arg(long, default_value_t = 150)]
    pub max_summary_tokens: usize,

    /// Windows summarized at once.
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,

    /// Attempts per window, including the first.
    #[arg(long, default_value_t = 3)]
    pub attempts: u32,

    /// Override the recursion depth ceiling.
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Give up after this many seconds.
    #[arg(long)]
    pub deadline_secs: Option<u64>,
}

impl PipelineArgs {
    pub fn to_config(&self) -> SummarizerConfig {
        let mut config = SummarizerConfig::default()
            .with_chunk_size(self.chunk_size)
            .with_overlap(self.overlap)
            .with_max_input_tokens(self.max_input_tokens)
            .with_output_limits(self.min_summary_tokens, self.max_summary_tokens)
            .with_concurrency(self.concurrency)
            .with_retry(RetryConfig::with_attempts(self.attempts));
        if let Some(depth) = self.max_depth {
            config = config.with_max_depth(depth);
        }
        if let Some(secs) = self.deadline_secs {
            config = config.with_deadline(Duration::from_secs(secs));
        }
        config
    }
}

/// Build a [`Summarizer`] from parsed arguments.
pub fn build_summarizer(model: &ModelArgs, pipeline: &PipelineArgs) -> Result<Summarizer, String> {
    let tokenizer = model.build_tokenizer()?;
    let backend = model.build_model(tokenizer.clone())?;
    Summarizer::new(backend, tokenizer, pipeline.to_config()).map_err(|e| e.to_string())
}

/// Read each file as one document, then `stdin` (if given) as one more.
pub fn load_documents(
    files: &[PathBuf],
    stdin: Option<&mut dyn Read>,
) -> Result<Vec<Document>, String> {
    let mut documents = Vec::with_capacity(files.len() + 1);
    for path in files {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        documents.push(Document::new(text));
    }
    if let Some(reader) = stdin {
        let mut buf = String::new();
        reader
            .read_to_string(&mut buf)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        documents.push(Document::new(buf));
    }
    if documents.is_empty() {
        return Err("no input: pass one or more FILES, or --stdin".into());
    }
    Ok(documents)
}

/// Install a stderr `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks the level for this
/// crate (0 = info, 1 = debug, 2+ = trace).
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,condense_rs={level},condense_web={level}"))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
    }

    #[test]
    fn defaults_match_config_defaults() {
        let cli = TestCli::parse_from(["test"]);
        let config = cli.pipeline.to_config();
        let defaults = SummarizerConfig::default();
        assert_eq!(config.chunk_size, defaults.chunk_size);
        assert_eq!(config.overlap, defaults.overlap);
        assert_eq!(config.max_input_tokens, defaults.max_input_tokens);
        assert_eq!(config.output, defaults.output);
        assert_eq!(config.max_concurrency, defaults.max_concurrency);
        assert_eq!(config.retry.max_attempts, defaults.retry.max_attempts);
        assert!(config.deadline.is_none());
        assert_eq!(cli.model.backend, Backend::Openrouter);
        assert_eq!(cli.model.tokenizer, TokenizerKind::Cl100k);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = TestCli::parse_from([
            "test",
            "--chunk-size",
            "400",
            "--overlap",
            "20",
            "--deadline-secs",
            "30",
            "--max-depth",
            "3",
        ]);
        let config = cli.pipeline.to_config();
        assert_eq!(config.chunk_size, 400);
        assert_eq!(config.overlap, 20);
        assert_eq!(config.deadline, Some(Duration::from_secs(30)));
        assert_eq!(config.max_depth, Some(3));
    }

    #[test]
    fn builds_an_offline_summarizer() {
        let cli = TestCli::parse_from(["test", "--backend", "lead", "--tokenizer", "words"]);
        let summarizer = build_summarizer(&cli.model, &cli.pipeline).unwrap();
        assert_eq!(summarizer.model_name(), "lead");
        assert_eq!(summarizer.tokenizer_name(), "words");
    }

    #[test]
    fn loads_files_then_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.txt");
        let second = dir.path().join("b.txt");
        std::fs::write(&first, "A is a test.").unwrap();
        std::fs::write(&second, "B is another test.").unwrap();

        let mut stdin = "from stdin".as_bytes();
        let docs = load_documents(&[first, second], Some(&mut stdin as &mut dyn Read)).unwrap();
        let texts: Vec<&str> = docs.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, vec!["A is a test.", "B is another test.", "from stdin"]);
    }

    #[test]
    fn missing_input_is_an_error() {
        assert!(load_documents(&[], None).is_err());

        let dir = tempfile::tempdir().unwrap();
        let err = load_documents(&[dir.path().join("missing.txt")], None).unwrap_err();
        assert!(err.contains("missing.txt"), "{err}");
    }

    #[test]
    fn invalid_pipeline_flags_are_reported() {
        let cli = TestCli::parse_from([
            "test",
            "--backend",
            "lead",
            "--tokenizer",
            "words",
            "--overlap",
            "900",
        ]);
        let err = build_summarizer(&cli.model, &cli.pipeline).err().unwrap();
        assert!(err.contains("overlap"), "{err}");
    }
}
