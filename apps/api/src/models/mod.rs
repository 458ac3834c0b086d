pub mod conversation;
pub mod options;
pub mod platform;
pub mod profile;

pub use conversation::{Capture, Conversation, Message, Role};
pub use options::{Audience, ContentAngle, OutputLanguage, OutputLength};
pub use platform::{Platform, PlatformPersona};
pub use profile::{Profile, Tone};
