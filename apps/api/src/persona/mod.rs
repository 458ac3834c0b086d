// Platform personas generated from three short Q&A answers.

pub mod handlers;
pub mod prompts;
