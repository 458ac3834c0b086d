//! Co-think chat loop over the persisted current conversation.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{info, warn};

use crate::chat::ChatBody;
use crate::client::rate_limit::UsageCategory;
use crate::client::store::SharedStore;
use crate::client::transport::VoiceApi;
use crate::client::{lock, ClientError};
use crate::models::{Message, Role};

/// Replaces the assistant placeholder when a turn fails.
pub const CHAT_ERROR_REPLY: &str = "抱歉，发生了错误，请重试。";

pub struct ChatSession {
    api: Arc<dyn VoiceApi>,
    store: SharedStore,
}

impl ChatSession {
    pub fn new(api: Arc<dyn VoiceApi>, store: SharedStore) -> Self {
        Self { api, store }
    }

    /// Sends one user turn and streams the reply into the current conversation,
    /// creating it first if needed. `on_delta` sees each text delta as it lands.
    ///
    /// On failure the assistant placeholder is rewritten to [`CHAT_ERROR_REPLY`]
    /// and the error is returned.
    pub async fn send_message(
        &self,
        text: &str,
        image: Option<String>,
        mut on_delta: impl FnMut(&str) + Send,
    ) -> Result<String, ClientError> {
        let text = text.trim();
        if text.is_empty() && image.is_none() {
            return Err(ClientError::EmptyMessage);
        }

        let body = {
            let mut store = lock(&self.store);
            if !store.check_rate_limit(UsageCategory::Chat).allowed {
                warn!("Chat limit reached, not sending");
                return Err(ClientError::RateLimited(UsageCategory::Chat));
            }
            if store.current_conversation().is_none() {
                store.start_conversation(None);
            }

            let user = Message {
                role: Role::User,
                content: text.to_string(),
                image,
            };
            let mut messages = store
                .current_conversation()
                .map(|c| c.messages.clone())
                .unwrap_or_default();
            messages.push(user.clone());

            store.add_message_to_current_conversation(user);
            store.add_message_to_current_conversation(Message::assistant(""));

            ChatBody {
                messages,
                profile: store.profile.clone(),
            }
        };

        info!(turns = body.messages.len(), "Sending chat turn");
        match self.stream_reply(&body, &mut on_delta).await {
            Ok(reply) => {
                lock(&self.store).increment_usage(UsageCategory::Chat);
                Ok(reply)
            }
            Err(e) => {
                warn!("Chat turn failed: {e}");
                lock(&self.store).update_last_assistant_message(CHAT_ERROR_REPLY);
                Err(e)
            }
        }
    }

    async fn stream_reply(
        &self,
        body: &ChatBody,
        on_delta: &mut (impl FnMut(&str) + Send),
    ) -> Result<String, ClientError> {
        let mut deltas = self.api.stream_chat(body).await?;
        let mut reply = String::new();
        while let Some(delta) = deltas.next().await {
            let delta = delta?;
            reply.push_str(&delta);
            lock(&self.store).update_last_assistant_message(&reply);
            on_delta(&delta);
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use futures::stream;

    use super::*;
    use crate::client::store::Store;
    use crate::client::transport::DeltaStream;
    use crate::models::Profile;
    use crate::transform::TransformRequest;

    #[derive(Default)]
    struct FakeApi {
        bodies: Mutex<Vec<ChatBody>>,
        fail_after_first_delta: bool,
    }

    #[async_trait]
    impl VoiceApi for FakeApi {
        async fn stream_transform(&self, _: &TransformRequest) -> Result<DeltaStream, ClientError> {
            Ok(stream::empty().boxed())
        }

        async fn fetch_transform(&self, _: &TransformRequest) -> Result<String, ClientError> {
            Ok(String::new())
        }

        async fn stream_chat(&self, body: &ChatBody) -> Result<DeltaStream, ClientError> {
            self.bodies.lock().unwrap().push(body.clone());
            let mut items = vec![Ok("这个想法".to_string())];
            if self.fail_after_first_delta {
                items.push(Err(ClientError::Status {
                    status: 500,
                    message: "Failed to process chat request".to_string(),
                }));
            } else {
                items.push(Ok("从哪来的？".to_string()));
            }
            Ok(stream::iter(items).boxed())
        }
    }

    fn chat(api: FakeApi) -> (ChatSession, Arc<FakeApi>, SharedStore) {
        let api = Arc::new(api);
        let store = Store::default().into_shared();
        (ChatSession::new(api.clone(), store.clone()), api, store)
    }

    #[tokio::test]
    async fn test_first_message_creates_conversation() {
        let (session, api, store) = chat(FakeApi::default());
        let mut seen = Vec::new();
        let reply = session
            .send_message("我想开始写作", None, |d| seen.push(d.to_string()))
            .await
            .unwrap();

        assert_eq!(reply, "这个想法从哪来的？");
        assert_eq!(seen, vec!["这个想法", "从哪来的？"]);

        let store = lock(&store);
        let conversation = store.current_conversation().unwrap();
        assert_eq!(
            conversation.messages,
            vec![Message::user("我想开始写作"), Message::assistant(reply.as_str())]
        );
        assert_eq!(store.rate_limit.chat, 1);
        assert_eq!(api.bodies.lock().unwrap()[0].messages, vec![Message::user("我想开始写作")]);
    }

    #[tokio::test]
    async fn test_history_and_profile_are_sent() {
        let (session, api, store) = chat(FakeApi::default());
        lock(&store).set_profile(Profile {
            bio: "独立开发者".to_string(),
            ..Default::default()
        });
        session.send_message("第一句", None, |_| {}).await.unwrap();
        session
            .send_message("", Some("data:image/png;base64,AAAA".to_string()), |_| {})
            .await
            .unwrap();

        let bodies = api.bodies.lock().unwrap();
        let second = &bodies[1];
        assert_eq!(second.messages.len(), 3);
        assert_eq!(second.messages[1].role, Role::Assistant);
        assert_eq!(second.messages[2].image.as_deref(), Some("data:image/png;base64,AAAA"));
        assert_eq!(second.profile.as_ref().unwrap().bio, "独立开发者");
        assert_eq!(lock(&store).current_conversation().unwrap().messages.len(), 4);
    }

    #[tokio::test]
    async fn test_failure_rewrites_placeholder() {
        let (session, _, store) = chat(FakeApi {
            fail_after_first_delta: true,
            ..Default::default()
        });
        let result = session.send_message("hi", None, |_| {}).await;
        assert!(result.is_err());

        let store = lock(&store);
        let messages = &store.current_conversation().unwrap().messages;
        assert_eq!(messages.last().unwrap().content, CHAT_ERROR_REPLY);
        assert_eq!(store.rate_limit.chat, 0);
    }

    #[tokio::test]
    async fn test_empty_message_is_ignored() {
        let (session, api, store) = chat(FakeApi::default());
        let result = session.send_message("   ", None, |_| {}).await;
        assert!(matches!(result, Err(ClientError::EmptyMessage)));
        assert!(api.bodies.lock().unwrap().is_empty());
        assert!(lock(&store).conversations.is_empty());
    }

    #[tokio::test]
    async fn test_chat_limit_blocks_send() {
        let (session, api, store) = chat(FakeApi::default());
        {
            let mut store = lock(&store);
            for _ in 0..UsageCategory::Chat.daily_limit() {
                store.increment_usage(UsageCategory::Chat);
            }
        }
        let result = session.send_message("hi", None, |_| {}).await;
        assert!(matches!(result, Err(ClientError::RateLimited(UsageCategory::Chat))));
        assert!(api.bodies.lock().unwrap().is_empty());
    }
}
