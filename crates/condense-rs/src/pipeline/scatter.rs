//! Bounded parallel summarization of one level's windows.
//!
//! [`ScatterGather`] keeps at most `concurrency` windows in flight on a
//! [`JoinSet`]. A new window is spawned only when a running one finishes, so
//! the pool slides over the batch instead of launching it all at once.
//! Results land in a slot vector indexed by window position, which gives
//! back the original order no matter which window finishes first.
//!
//! A failed window leaves its slot empty and is recorded as a
//! [`WindowFailure`]. The batch only fails as a whole when every window did.

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::chunk::ChunkSummarizer;
use super::events::{EventHandler, PipelineEvent};
use crate::error::{ChunkError, SummarizeError, WindowFailure};
use crate::text::Window;

/// Partial summaries of one level, in window order.
#[derive(Debug, Default)]
pub struct GatherOutcome {
    /// Successful summaries, ordered by window index. Failed windows are
    /// skipped.
    pub partials: Vec<String>,
    /// Windows that produced nothing.
    pub failures: Vec<WindowFailure>,
}

/// Runs [`ChunkSummarizer::summarize_one`] over a batch of windows with
/// bounded concurrency.
pub struct ScatterGather {
    chunk: Arc<ChunkSummarizer>,
    concurrency: usize,
}

impl ScatterGather {
    pub fn new(chunk: Arc<ChunkSummarizer>, concurrency: usize) -> Self {
        Self {
            chunk,
            concurrency: concurrency.max(1),
        }
    }

    /// Summarize every window of `level`.
    ///
    /// Returns [`SummarizeError::Cancelled`] as soon as `cancel` fires; tasks
    /// still running are aborted. Dropping the returned future aborts them
    /// too.
    pub async fn run(
        &self,
        level: usize,
        windows: Vec<Window>,
        cancel: &CancellationToken,
        events: &dyn EventHandler,
    ) -> Result<GatherOutcome, SummarizeError> {
        let total = windows.len();
        if total == 0 {
            return Ok(GatherOutcome::default());
        }

        let mut slots: Vec<Option<Result<String, ChunkError>>> = vec![None; total];
        let mut queue = windows.into_iter().enumerate();
        let mut js: JoinSet<(usize, Result<String, ChunkError>)> = JoinSet::new();

        for _ in 0..self.concurrency {
            if !self.spawn_next(&mut js, &mut queue) {
                break;
            }
        }

        let mut done = 0;
        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    js.abort_all();
                    debug!("[level {level}] cancelled with {} window(s) in flight", js.len());
                    return Err(SummarizeError::Cancelled);
                }
                next = js.join_next() => next,
            };

            match joined {
                Some(Ok((idx, result))) => {
                    done += 1;
                    match &result {
                        Ok(_) => events.on_event(&PipelineEvent::WindowSummarized {
                            level,
                            index: idx,
                            done,
                            total,
                        }),
                        Err(error) => events.on_event(&PipelineEvent::WindowFailed {
                            level,
                            index: idx,
                            error,
                        }),
                    }
                    slots[idx] = Some(result);
                }
                // The slot stays empty and is reported below.
                Some(Err(e)) => {
                    done += 1;
                    warn!("[level {level}] summarization task panicked: {e}");
                }
                None => break,
            }
            self.spawn_next(&mut js, &mut queue);
        }

        let mut outcome = GatherOutcome::default();
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(Ok(summary)) => outcome.partials.push(summary),
                Some(Err(error)) => outcome.failures.push(WindowFailure {
                    level,
                    index,
                    error: error.to_string(),
                }),
                None => {
                    let error = ChunkError::Aborted("worker task did not complete".into());
                    events.on_event(&PipelineEvent::WindowFailed {
                        level,
                        index,
                        error: &error,
                    });
                    outcome.failures.push(WindowFailure {
                        level,
                        index,
                        error: error.to_string(),
                    });
                }
            }
        }

        if outcome.partials.is_empty() {
            return Err(SummarizeError::BatchExhausted {
                level,
                windows: total,
                failures: outcome.failures,
            });
        }
        Ok(outcome)
    }

    /// Spawn the next queued window, if any. Returns whether one was spawned.
    fn spawn_next(
        &self,
        js: &mut JoinSet<(usize, Result<String, ChunkError>)>,
        queue: &mut impl Iterator<Item = (usize, Window)>,
    ) -> bool {
        let Some((idx, window)) = queue.next() else {
            return false;
        };
        let chunk = Arc::clone(&self.chunk);
        js.spawn(async move { (idx, chunk.summarize_one(&window.text).await) });
        true
    }
}
