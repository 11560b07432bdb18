//! API interaction layer: the OpenRouter HTTP client and retry policy.
//!
//! - [`client`]: [`OpenRouterClient`] for one-shot chat completions.
//! - [`retry`]: bounded retries with exponential backoff, and
//!   classification of client errors into transient and permanent failures.

pub mod client;
pub mod retry;

pub use client::{ChatCompletion, ChatRequest, Message, OpenRouterClient};
pub use retry::{RetryConfig, RetryExhausted, retry_with_backoff};
