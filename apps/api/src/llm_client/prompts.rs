// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments only.

/// Heading that closes a transform system prompt. The user's raw content is
/// sent as the user turn and conceptually follows this heading.
pub const USER_CONTENT_PLACEHOLDER: &str = "## 用户内容\n";
