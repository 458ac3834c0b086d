use std::fmt;

use serde::{Deserialize, Serialize};

/// A posting destination. Serialized lowercase to match the web client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Twitter,
    Xiaohongshu,
    Wechat,
    Linkedin,
}

impl Platform {
    /// All platforms in tab order. Twitter is always loaded first.
    pub const ALL: [Platform; 4] = [
        Platform::Twitter,
        Platform::Xiaohongshu,
        Platform::Wechat,
        Platform::Linkedin,
    ];

    /// Name shown to users and embedded in prompts.
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Twitter => "Twitter",
            Platform::Xiaohongshu => "小红书",
            Platform::Wechat => "朋友圈",
            Platform::Linkedin => "LinkedIn",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Xiaohongshu => "xiaohongshu",
            Platform::Wechat => "wechat",
            Platform::Linkedin => "linkedin",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-platform override of the user's voice.
///
/// Only personas with `is_custom = true` are injected into transform prompts;
/// a non-custom persona is treated as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformPersona {
    pub platform_bio: String,
    pub tone: String,
    pub style_notes: String,
    #[serde(default)]
    pub is_custom: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_serializes_lowercase() {
        let json = serde_json::to_string(&Platform::Xiaohongshu).unwrap();
        assert_eq!(json, "\"xiaohongshu\"");
        let parsed: Platform = serde_json::from_str("\"linkedin\"").unwrap();
        assert_eq!(parsed, Platform::Linkedin);
    }

    #[test]
    fn test_unknown_platform_is_rejected() {
        let parsed: Result<Platform, _> = serde_json::from_str("\"jike\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_persona_uses_camel_case_and_defaults_is_custom() {
        let persona: PlatformPersona = serde_json::from_value(serde_json::json!({
            "platformBio": "写代码的产品人",
            "tone": "犀利, 真诚",
            "styleNotes": "多用短句"
        }))
        .unwrap();
        assert_eq!(persona.platform_bio, "写代码的产品人");
        assert!(!persona.is_custom);
    }
}
