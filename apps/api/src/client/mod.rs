//! Client half of Voice Builder, shared by the `voice` terminal client.
//!
//! `transport` talks to a running server, `orchestrator` drives the
//! four-platform transform session, `chat` runs the co-think loop, and
//! `store` persists everything between runs.

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

pub mod chat;
pub mod orchestrator;
pub mod rate_limit;
pub mod store;
pub mod transport;

use rate_limit::UsageCategory;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error (status {status}): {message}")]
    Status { status: u16, message: String },

    /// Displays the user-facing warning for the exhausted category.
    #[error("{}", .0.limit_warning())]
    RateLimited(UsageCategory),

    #[error("Message is empty")]
    EmptyMessage,

    /// The relayed body closed before the `[DONE]` sentinel.
    #[error("Stream ended before completion")]
    Truncated,
}

/// Client state is only ever mutated in short synchronous sections, so a
/// poisoned lock still holds consistent data.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
