//! Progress events for a summarization run.
//!
//! The [`Summarizer`](super::Summarizer) reports every level transition and
//! every window outcome through an [`EventHandler`]. Handlers are called from
//! the gathering loop, never from inside worker tasks, so they see events in
//! a single sequence.
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests or fire-and-forget runs |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`FnEventHandler`] | Quick closures |
//! | [`CompositeEventHandler`] | Several handlers in order |

use tracing::{debug, info, warn};

use crate::error::ChunkError;

/// Events emitted while summarizing.
#[derive(Debug)]
pub enum PipelineEvent<'a> {
    /// A level is about to be split and summarized.
    LevelStarted {
        level: usize,
        input_tokens: usize,
        windows: usize,
    },
    /// One window produced a partial summary.
    WindowSummarized {
        level: usize,
        index: usize,
        done: usize,
        total: usize,
    },
    /// One window failed for good; its slot contributes nothing.
    WindowFailed {
        level: usize,
        index: usize,
        error: &'a ChunkError,
    },
    /// Partial summaries of a level were joined.
    LevelMerged {
        level: usize,
        merged_tokens: usize,
        budget: usize,
    },
    /// The final summary is ready.
    Finished {
        levels: usize,
        output_tokens: usize,
    },
}

/// Observer for [`PipelineEvent`]s.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &PipelineEvent<'_>) {
        let _ = event;
    }
}

/// Ignores every event.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// Logs events through `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &PipelineEvent<'_>) {
        match event {
            PipelineEvent::LevelStarted {
                level,
                input_tokens,
                windows,
            } => {
                info!("[level {level}] {input_tokens} tokens → {windows} window(s)");
            }
            PipelineEvent::WindowSummarized {
                level,
                index,
                done,
                total,
            } => {
                debug!("[level {level}] window {index} summarized ({done}/{total})");
            }
            PipelineEvent::WindowFailed {
                level,
                index,
                error,
            } => {
                warn!("[level {level}] window {index} failed: {error}");
            }
            PipelineEvent::LevelMerged {
                level,
                merged_tokens,
                budget,
            } => {
                if merged_tokens > budget {
                    info!(
                        "[level {level}] merged summary has {merged_tokens} tokens (budget {budget}), summarizing again"
                    );
                } else {
                    info!("[level {level}] merged summary has {merged_tokens} tokens");
                }
            }
            PipelineEvent::Finished {
                levels,
                output_tokens,
            } => {
                info!("Summarization complete: {levels} level(s), {output_tokens} tokens");
            }
        }
    }
}

/// An event handler backed by a closure.
pub struct FnEventHandler<F>(F)
where
    F: Fn(&PipelineEvent<'_>) + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&PipelineEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&PipelineEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &PipelineEvent<'_>) {
        (self.0)(event)
    }
}

/// Dispatches each event to several handlers, in registration order.
#[derive(Default)]
pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }
}

impl EventHandler for CompositeEventHandler {
    fn on_event(&self, event: &PipelineEvent<'_>) {
        for handler in &self.handlers {
            handler.on_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn composite_dispatches_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let a = seen.clone();
        let b = seen.clone();
        let handler = CompositeEventHandler::new()
            .with(FnEventHandler::new(move |_| a.lock().unwrap().push("a")))
            .with(LoggingHandler)
            .with(FnEventHandler::new(move |_| b.lock().unwrap().push("b")));

        handler.on_event(&PipelineEvent::Finished {
            levels: 1,
            output_tokens: 10,
        });
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
    }
}
