//! The summarization pipeline.
//!
//! - [`config`]: [`SummarizerConfig`] and its validation.
//! - [`chunk`]: [`ChunkSummarizer`], one window with retries.
//! - [`scatter`]: [`ScatterGather`], bounded parallel summarization of a level.
//! - [`summarizer`]: [`Summarizer`], the recursive controller.
//! - [`events`]: progress events and handlers.

pub mod chunk;
pub mod config;
pub mod events;
pub mod scatter;
pub mod summarizer;

pub use chunk::ChunkSummarizer;
pub use config::SummarizerConfig;
pub use events::{
    CompositeEventHandler, EventHandler, FnEventHandler, LoggingHandler, NoopHandler,
    PipelineEvent,
};
pub use scatter::{GatherOutcome, ScatterGather};
pub use summarizer::{DEPTH_SLACK, LevelReport, Summarizer, Summary, depth_ceiling};
