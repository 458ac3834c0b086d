//! Persisted client state: profile, onboarding flag, captures, conversations
//! and usage counters, kept in a single JSON document.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::client::rate_limit::{today, RateLimitCheck, RateLimitState, UsageCategory};
use crate::models::{Capture, Conversation, Message, Platform, PlatformPersona, Profile, Role};

pub const STORE_FILE_NAME: &str = "voice-builder-storage.json";

pub type SharedStore = Arc<Mutex<Store>>;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Partial update applied by [`Store::update_conversation`]; `None` fields are
/// left untouched.
#[derive(Debug, Clone, Default)]
pub struct ConversationUpdate {
    pub messages: Option<Vec<Message>>,
    pub output: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    #[serde(skip)]
    path: Option<PathBuf>,
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub has_completed_onboarding: bool,
    #[serde(default)]
    pub captures: Vec<Capture>,
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub current_conversation_id: Option<String>,
    #[serde(default)]
    pub rate_limit: RateLimitState,
}

impl Store {
    /// Loads the store from `path`. A missing file yields the empty default,
    /// which is written on the first `save`.
    pub fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let mut store = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<Store>(&raw)
                .with_context(|| format!("Failed to parse store at {}", path.display()))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No store at {}, starting empty", path.display());
                Store::default()
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read store at {}", path.display()))
            }
        };
        store.path = Some(path);
        Ok(store)
    }

    /// Writes the store back to the file it was loaded from. In-memory stores
    /// (`Store::default()`) have nowhere to go and are skipped.
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize store")?;
        fs::write(path, json).with_context(|| format!("Failed to write store to {}", path.display()))
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    // ── Profile ────────────────────────────────────────────────────────────

    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = Some(profile);
    }

    /// No-op until a profile exists.
    pub fn set_platform_persona(&mut self, platform: Platform, persona: PlatformPersona) {
        if let Some(profile) = self.profile.as_mut() {
            profile
                .platform_personas
                .get_or_insert_with(Default::default)
                .insert(platform, persona);
        }
    }

    pub fn complete_onboarding(&mut self) {
        self.has_completed_onboarding = true;
    }

    // ── Captures ───────────────────────────────────────────────────────────

    pub fn add_capture(&mut self, capture: Capture) {
        self.captures.insert(0, capture);
    }

    pub fn delete_capture(&mut self, id: &str) {
        self.captures.retain(|c| c.id != id);
    }

    // ── Conversations ──────────────────────────────────────────────────────

    /// Prepends the conversation and makes it current.
    pub fn add_conversation(&mut self, conversation: Conversation) {
        self.current_conversation_id = Some(conversation.id.clone());
        self.conversations.insert(0, conversation);
    }

    /// Creates an empty conversation, makes it current and returns its id.
    pub fn start_conversation(&mut self, capture_id: Option<String>) -> String {
        let id = new_id();
        self.add_conversation(Conversation {
            id: id.clone(),
            capture_id,
            messages: Vec::new(),
            output: None,
            timestamp: now_millis(),
        });
        id
    }

    pub fn update_conversation(&mut self, id: &str, update: ConversationUpdate) {
        if let Some(conversation) = self.conversations.iter_mut().find(|c| c.id == id) {
            if let Some(messages) = update.messages {
                conversation.messages = messages;
            }
            if let Some(output) = update.output {
                conversation.output = Some(output);
            }
        }
    }

    pub fn set_current_conversation_id(&mut self, id: Option<String>) {
        self.current_conversation_id = id;
    }

    pub fn current_conversation(&self) -> Option<&Conversation> {
        let id = self.current_conversation_id.as_deref()?;
        self.conversations.iter().find(|c| c.id == id)
    }

    fn current_conversation_mut(&mut self) -> Option<&mut Conversation> {
        let id = self.current_conversation_id.as_deref()?;
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    pub fn add_message_to_current_conversation(&mut self, message: Message) {
        if let Some(conversation) = self.current_conversation_mut() {
            conversation.messages.push(message);
        }
    }

    /// Rewrites the last message only when it is an assistant turn.
    pub fn update_last_assistant_message(&mut self, content: &str) {
        if let Some(last) = self
            .current_conversation_mut()
            .and_then(|c| c.messages.last_mut())
            .filter(|m| m.role == Role::Assistant)
        {
            last.content = content.to_string();
        }
    }

    // ── Usage ──────────────────────────────────────────────────────────────

    pub fn check_rate_limit(&self, category: UsageCategory) -> RateLimitCheck {
        self.rate_limit.check(category, today())
    }

    pub fn increment_usage(&mut self, category: UsageCategory) {
        self.rate_limit.increment(category, today());
    }
}
