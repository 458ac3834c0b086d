// Transform: raw thoughts → platform-formatted post.
// All LLM calls go through llm_client — no direct Anthropic calls here.

pub mod handlers;
pub mod prompts;

pub use handlers::{TransformRequest, TransformResponse};
