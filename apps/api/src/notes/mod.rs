// Note cards: condense a conversation into a title and a few key points.

pub mod handlers;
pub mod prompts;
