// Co-think: the interview-style chat that draws ideas out of the user.

pub mod handlers;
pub mod prompts;

pub use handlers::ChatBody;
