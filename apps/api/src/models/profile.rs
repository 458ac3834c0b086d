use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::platform::{Platform, PlatformPersona};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Casual,
    Professional,
    Humorous,
}

impl Tone {
    pub fn label(self) -> &'static str {
        match self {
            Tone::Casual => "轻松随意",
            Tone::Professional => "专业正式",
            Tone::Humorous => "幽默风趣",
        }
    }
}

/// User-level writing preferences, created at onboarding.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub avoid_words: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_personas: Option<HashMap<Platform, PlatformPersona>>,
}

impl Profile {
    pub fn persona_for(&self, platform: Platform) -> Option<&PlatformPersona> {
        self.platform_personas
            .as_ref()
            .and_then(|personas| personas.get(&platform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_deserializes_web_client_shape() {
        let profile: Profile = serde_json::from_value(serde_json::json!({
            "bio": "独立开发者",
            "tone": "humorous",
            "avoidWords": ["赋能", "抓手"],
            "interests": ["AI"],
            "platformPersonas": {
                "twitter": {
                    "platformBio": "build in public",
                    "tone": "直接",
                    "styleNotes": "短句",
                    "isCustom": true
                }
            }
        }))
        .unwrap();

        assert_eq!(profile.tone, Tone::Humorous);
        assert_eq!(profile.avoid_words, vec!["赋能", "抓手"]);
        assert!(profile.persona_for(Platform::Twitter).unwrap().is_custom);
        assert!(profile.persona_for(Platform::Linkedin).is_none());
    }

    #[test]
    fn test_profile_without_personas() {
        let profile: Profile =
            serde_json::from_value(serde_json::json!({ "bio": "", "tone": "casual" })).unwrap();
        assert!(profile.persona_for(Platform::Wechat).is_none());
        assert!(profile.avoid_words.is_empty());
    }
}
