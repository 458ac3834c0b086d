// Minimal line-art illustrations for a post: Claude picks one scene,
// the image model draws it.

pub mod handlers;
pub mod prompts;
