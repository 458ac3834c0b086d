//! Voice Builder: turns raw thoughts into platform-specific social posts.
//!
//! The server half (`routes` and the service modules) proxies to Anthropic and
//! OpenAI; the `client` half carries the transform orchestrator, chat loop,
//! persisted store and rate limiter used by the `voice` terminal client.

pub mod chat;
pub mod client;
pub mod config;
pub mod errors;
pub mod illustration;
pub mod llm_client;
pub mod models;
pub mod notes;
pub mod persona;
pub mod routes;
pub mod sse;
pub mod state;
pub mod streaming;
pub mod transform;
