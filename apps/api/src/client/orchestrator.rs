//! Transform session: one piece of content rendered for all four platforms.
//!
//! Each platform owns a slot: `idle → loading → streaming → done`. One
//! platform is streamed at a time (the active one); starting a new active
//! request aborts the previous one. When the first Twitter stream finishes,
//! the other platforms are prefetched in the background with batch requests,
//! 500 ms apart.
//!
//! A request claims its slot by setting `is_loading` under the session lock
//! before anything is spawned, and stamps the slot with a fresh request id.
//! Updates carrying an old id are dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::rate_limit::UsageCategory;
use crate::client::store::SharedStore;
use crate::client::transport::VoiceApi;
use crate::client::{lock, ClientError};
use crate::models::{Audience, ContentAngle, OutputLanguage, OutputLength, Platform, Profile};
use crate::transform::TransformRequest;

pub const PREFETCH_STAGGER: Duration = Duration::from_millis(500);

/// Transient per-platform view state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformResult {
    pub text: String,
    pub is_loading: bool,
    pub is_streaming: bool,
    /// The last request for this slot failed; the slot is empty and idle.
    pub failed: bool,
    pub length: OutputLength,
    pub language: OutputLanguage,
    pub audience: Audience,
    pub angle: ContentAngle,
}

/// Initial settings for a platform's slot.
pub fn defaults_for(platform: Platform) -> PlatformResult {
    let (language, audience, angle) = match platform {
        Platform::Twitter => (OutputLanguage::En, Audience::Peers, ContentAngle::Sharing),
        Platform::Xiaohongshu => (OutputLanguage::Zh, Audience::Peers, ContentAngle::Sharing),
        Platform::Wechat => (OutputLanguage::Zh, Audience::Friends, ContentAngle::Casual),
        Platform::Linkedin => (OutputLanguage::En, Audience::Peers, ContentAngle::Sharing),
    };
    PlatformResult {
        text: String::new(),
        is_loading: false,
        is_streaming: false,
        failed: false,
        length: OutputLength::Normal,
        language,
        audience,
        angle,
    }
}

/// What a trigger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Started,
    /// The slot already has text or a request in flight.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Stream,
    Batch,
}

struct Slot {
    result: PlatformResult,
    request_id: u64,
}

struct ActiveRequest {
    platform: Platform,
    request_id: u64,
    handle: JoinHandle<()>,
}

struct SessionState {
    active_platform: Platform,
    slots: HashMap<Platform, Slot>,
    next_request_id: u64,
    active: Option<ActiveRequest>,
    prefetch_started: bool,
    prefetch_tasks: Vec<JoinHandle<()>>,
}

impl SessionState {
    fn slot_mut(&mut self, platform: Platform) -> &mut Slot {
        self.slots.entry(platform).or_insert_with(|| Slot {
            result: defaults_for(platform),
            request_id: 0,
        })
    }

    /// Applies `f` only while `request_id` still owns the slot.
    fn update_current(
        &mut self,
        platform: Platform,
        request_id: u64,
        f: impl FnOnce(&mut PlatformResult),
    ) -> bool {
        let slot = self.slot_mut(platform);
        if slot.request_id != request_id {
            return false;
        }
        f(&mut slot.result);
        true
    }
}

struct Inner {
    api: Arc<dyn VoiceApi>,
    store: SharedStore,
    content: String,
    profile: Option<Profile>,
    state: Mutex<SessionState>,
}

pub struct TransformSession {
    inner: Arc<Inner>,
}

impl TransformSession {
    /// The profile is read from the store once, at session start.
    pub fn new(api: Arc<dyn VoiceApi>, store: SharedStore, content: impl Into<String>) -> Self {
        let profile = lock(&store).profile.clone();
        let slots = Platform::ALL
            .into_iter()
            .map(|p| {
                (
                    p,
                    Slot {
                        result: defaults_for(p),
                        request_id: 0,
                    },
                )
            })
            .collect();

        Self {
            inner: Arc::new(Inner {
                api,
                store,
                content: content.into(),
                profile,
                state: Mutex::new(SessionState {
                    active_platform: Platform::Twitter,
                    slots,
                    next_request_id: 0,
                    active: None,
                    prefetch_started: false,
                    prefetch_tasks: Vec::new(),
                }),
            }),
        }
    }

    /// Streams the default (Twitter) platform.
    pub fn start(&self) -> Result<Dispatch, ClientError> {
        self.select_platform(Platform::Twitter)
    }

    /// Makes `platform` active, streaming it only if it has never loaded.
    pub fn select_platform(&self, platform: Platform) -> Result<Dispatch, ClientError> {
        Inner::dispatch(&self.inner, platform, Mode::Stream, false, |_| {})
    }

    pub fn set_length(&self, length: OutputLength) -> Result<Dispatch, ClientError> {
        self.restart_active(|r| r.length = length)
    }

    pub fn set_language(&self, language: OutputLanguage) -> Result<Dispatch, ClientError> {
        self.restart_active(|r| r.language = language)
    }

    pub fn set_audience(&self, audience: Audience) -> Result<Dispatch, ClientError> {
        self.restart_active(|r| r.audience = audience)
    }

    pub fn set_angle(&self, angle: ContentAngle) -> Result<Dispatch, ClientError> {
        self.restart_active(|r| r.angle = angle)
    }

    /// Re-streams the active platform with its current settings.
    pub fn regenerate(&self) -> Result<Dispatch, ClientError> {
        self.restart_active(|_| {})
    }

    fn restart_active(&self, configure: impl FnOnce(&mut PlatformResult)) -> Result<Dispatch, ClientError> {
        let platform = self.active_platform();
        Inner::dispatch(&self.inner, platform, Mode::Stream, true, configure)
    }

    pub fn active_platform(&self) -> Platform {
        lock(&self.inner.state).active_platform
    }

    pub fn result(&self, platform: Platform) -> PlatformResult {
        lock(&self.inner.state).slot_mut(platform).result.clone()
    }

    /// All four slots in display order.
    pub fn snapshot(&self) -> Vec<(Platform, PlatformResult)> {
        let mut state = lock(&self.inner.state);
        Platform::ALL
            .into_iter()
            .map(|p| (p, state.slot_mut(p).result.clone()))
            .collect()
    }

    /// Waits for the current active request, if any, to finish.
    pub async fn wait_for_active(&self) {
        let active = lock(&self.inner.state).active.take();
        if let Some(active) = active {
            let _ = active.handle.await;
        }
    }

    /// Waits for every scheduled prefetch, including ones scheduled while waiting.
    pub async fn wait_for_prefetch(&self) {
        loop {
            let next = lock(&self.inner.state).prefetch_tasks.pop();
            match next {
                Some(handle) => {
                    let _ = handle.await;
                }
                None => break,
            }
        }
    }
}

impl Inner {
    /// Claims `platform` and spawns its request, all under the session lock.
    ///
    /// Without `force`, a slot with text or an in-flight request is left alone.
    /// `configure` edits the slot's settings before the request is built.
    fn dispatch(
        this: &Arc<Self>,
        platform: Platform,
        mode: Mode,
        force: bool,
        configure: impl FnOnce(&mut PlatformResult),
    ) -> Result<Dispatch, ClientError> {
        let mut state = lock(&this.state);
        if mode == Mode::Stream {
            state.active_platform = platform;
        }

        let slot = state.slot_mut(platform);
        if !force && (slot.result.is_loading || !slot.result.text.is_empty()) {
            debug!(%platform, "Slot already loaded or loading");
            return Ok(Dispatch::Skipped);
        }

        if !lock(&this.store)
            .check_rate_limit(UsageCategory::Transform)
            .allowed
        {
            warn!(%platform, "Transform limit reached, not requesting");
            return Err(ClientError::RateLimited(UsageCategory::Transform));
        }

        state.next_request_id += 1;
        let request_id = state.next_request_id;
        let slot = state.slot_mut(platform);
        configure(&mut slot.result);
        slot.request_id = request_id;
        slot.result.text.clear();
        slot.result.is_loading = true;
        slot.result.is_streaming = false;
        slot.result.failed = false;

        let request = TransformRequest {
            content: this.content.clone(),
            profile: this.profile.clone(),
            platform,
            length: slot.result.length,
            language: slot.result.language,
            audience: slot.result.audience,
            angle: slot.result.angle,
            stream: mode == Mode::Stream,
        };

        let task = this.clone();
        match mode {
            Mode::Stream => {
                let handle = tokio::spawn(async move {
                    let outcome = task.run_stream(platform, request_id, &request).await;
                    task.finish(platform, request_id, outcome);
                });
                if let Some(previous) = state.active.replace(ActiveRequest {
                    platform,
                    request_id,
                    handle,
                }) {
                    previous.handle.abort();
                    // A cancelled slot that never completed goes back to idle,
                    // and its id is retired so a late delta cannot land.
                    let slot = state.slot_mut(previous.platform);
                    if slot.request_id == previous.request_id && slot.result.is_loading {
                        slot.request_id = 0;
                        slot.result.text.clear();
                        slot.result.is_loading = false;
                        slot.result.is_streaming = false;
                    }
                }
            }
            Mode::Batch => {
                let handle = tokio::spawn(async move {
                    let outcome = task.api.fetch_transform(&request).await.map(|text| {
                        task.update(platform, request_id, |r| r.text = text);
                    });
                    task.finish(platform, request_id, outcome);
                });
                state.prefetch_tasks.push(handle);
            }
        }

        info!(%platform, request_id, ?mode, "Transform requested");
        Ok(Dispatch::Started)
    }

    fn update(&self, platform: Platform, request_id: u64, f: impl FnOnce(&mut PlatformResult)) -> bool {
        lock(&self.state).update_current(platform, request_id, f)
    }

    async fn run_stream(
        &self,
        platform: Platform,
        request_id: u64,
        request: &TransformRequest,
    ) -> Result<(), ClientError> {
        let mut deltas = self.api.stream_transform(request).await?;
        while let Some(delta) = deltas.next().await {
            let delta = delta?;
            let current = self.update(platform, request_id, |r| {
                r.is_streaming = true;
                r.text.push_str(&delta);
            });
            if !current {
                debug!(%platform, request_id, "Dropping superseded stream");
                return Ok(());
            }
        }
        Ok(())
    }

    fn finish(self: &Arc<Self>, platform: Platform, request_id: u64, outcome: Result<(), ClientError>) {
        let succeeded = outcome.is_ok();
        let current = self.update(platform, request_id, |r| {
            r.is_loading = false;
            r.is_streaming = false;
            if !succeeded {
                r.text.clear();
                r.failed = true;
            }
        });
        if !current {
            return;
        }

        match outcome {
            Ok(()) => {
                lock(&self.store).increment_usage(UsageCategory::Transform);
                if platform == Platform::Twitter {
                    self.schedule_prefetch();
                }
            }
            Err(e) => warn!(%platform, request_id, "Transform failed: {e}"),
        }
    }

    /// Runs once per session, after the first completed Twitter request.
    fn schedule_prefetch(self: &Arc<Self>) {
        let mut state = lock(&self.state);
        if state.prefetch_started {
            return;
        }
        state.prefetch_started = true;

        let inner = self.clone();
        let scheduler = tokio::spawn(async move {
            let others = Platform::ALL.into_iter().filter(|p| *p != Platform::Twitter);
            for (i, platform) in others.enumerate() {
                if i > 0 {
                    tokio::time::sleep(PREFETCH_STAGGER).await;
                }
                match Inner::dispatch(&inner, platform, Mode::Batch, false, |_| {}) {
                    Ok(_) => {}
                    Err(e) => {
                        warn!(%platform, "Prefetch stopped: {e}");
                        break;
                    }
                }
            }
        });
        state.prefetch_tasks.push(scheduler);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use async_trait::async_trait;
    use futures::stream;
    use tokio::time::Instant;

    use super::*;
    use crate::chat::ChatBody;
    use crate::client::store::Store;
    use crate::client::transport::DeltaStream;

    #[derive(Default)]
    struct FakeApi {
        requests: Mutex<Vec<(TransformRequest, Instant)>>,
        /// Streams for these platforms send one delta and then stall.
        stall: HashSet<Platform>,
        fail: HashSet<Platform>,
        /// How long batch requests take to answer.
        batch_delay: Duration,
    }

    impl FakeApi {
        fn requests(&self) -> Vec<TransformRequest> {
            self.requests.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
        }

        fn record(&self, request: &TransformRequest) -> Result<(), ClientError> {
            self.requests
                .lock()
                .unwrap()
                .push((request.clone(), Instant::now()));
            if self.fail.contains(&request.platform) {
                return Err(ClientError::Status {
                    status: 500,
                    message: "Failed to transform content".to_string(),
                });
            }
            Ok(())
        }
    }

    fn reply_for(request: &TransformRequest) -> String {
        format!(
            "{}:{:?}:{:?}",
            request.platform, request.length, request.language
        )
    }

    #[async_trait]
    impl VoiceApi for FakeApi {
        async fn stream_transform(&self, request: &TransformRequest) -> Result<DeltaStream, ClientError> {
            self.record(request)?;
            let reply = reply_for(request);
            let (head, tail) = reply.split_at(reply.find(':').unwrap_or(0));
            if self.stall.contains(&request.platform) {
                return Ok(stream::iter(vec![Ok(head.to_string())])
                    .chain(stream::pending())
                    .boxed());
            }
            Ok(stream::iter(vec![Ok(head.to_string()), Ok(tail.to_string())]).boxed())
        }

        async fn fetch_transform(&self, request: &TransformRequest) -> Result<String, ClientError> {
            self.record(request)?;
            tokio::time::sleep(self.batch_delay).await;
            Ok(reply_for(request))
        }

        async fn stream_chat(&self, _body: &ChatBody) -> Result<DeltaStream, ClientError> {
            Ok(stream::empty().boxed())
        }
    }

    fn session(api: FakeApi) -> (TransformSession, Arc<FakeApi>, SharedStore) {
        let api = Arc::new(api);
        let store = Store::default().into_shared();
        let session = TransformSession::new(api.clone(), store.clone(), "我的想法");
        (session, api, store)
    }

    /// Lets every spawned task run until it blocks.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[test]
    fn test_platform_defaults() {
        assert_eq!(defaults_for(Platform::Twitter).language, OutputLanguage::En);
        assert_eq!(defaults_for(Platform::Linkedin).language, OutputLanguage::En);
        assert_eq!(defaults_for(Platform::Xiaohongshu).language, OutputLanguage::Zh);
        let wechat = defaults_for(Platform::Wechat);
        assert_eq!(wechat.language, OutputLanguage::Zh);
        assert_eq!(wechat.audience, Audience::Friends);
        assert_eq!(wechat.angle, ContentAngle::Casual);
        for platform in Platform::ALL {
            assert_eq!(defaults_for(platform).length, OutputLength::Normal);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_streams_twitter_then_prefetches_others() {
        let (session, api, store) = session(FakeApi::default());
        let started = Instant::now();

        assert_eq!(session.start().unwrap(), Dispatch::Started);
        session.wait_for_active().await;
        session.wait_for_prefetch().await;

        let twitter = session.result(Platform::Twitter);
        assert_eq!(twitter.text, "twitter:Normal:En");
        assert!(!twitter.is_loading && !twitter.is_streaming);

        let requests = api.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 4);
        assert!(requests[0].0.stream);
        assert_eq!(requests[0].0.content, "我的想法");

        let prefetched: Vec<_> = requests[1..]
            .iter()
            .map(|(r, _)| (r.platform, r.language, r.stream))
            .collect();
        assert_eq!(
            prefetched,
            vec![
                (Platform::Xiaohongshu, OutputLanguage::Zh, false),
                (Platform::Wechat, OutputLanguage::Zh, false),
                (Platform::Linkedin, OutputLanguage::En, false),
            ]
        );
        assert_eq!(requests[2].0.audience, Audience::Friends);
        assert_eq!(requests[2].0.angle, ContentAngle::Casual);

        assert!(requests[2].1 - requests[1].1 >= PREFETCH_STAGGER);
        assert!(requests[3].1 - requests[2].1 >= PREFETCH_STAGGER);
        assert!(requests[3].1 - started >= PREFETCH_STAGGER * 2);

        for platform in [Platform::Xiaohongshu, Platform::Wechat, Platform::Linkedin] {
            assert!(!session.result(platform).text.is_empty());
        }
        assert_eq!(lock(&store).rate_limit.transform, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_selecting_loaded_platform_issues_no_request() {
        let (session, api, _) = session(FakeApi::default());
        session.start().unwrap();
        session.wait_for_active().await;
        session.wait_for_prefetch().await;
        let before = api.requests().len();

        assert_eq!(session.select_platform(Platform::Wechat).unwrap(), Dispatch::Skipped);
        assert_eq!(session.select_platform(Platform::Twitter).unwrap(), Dispatch::Skipped);
        assert_eq!(api.requests().len(), before);
        assert_eq!(session.active_platform(), Platform::Twitter);
    }

    #[tokio::test(start_paused = true)]
    async fn test_selecting_unloaded_platform_issues_one_request() {
        let (session, api, _) = session(FakeApi {
            stall: HashSet::from([Platform::Twitter]),
            ..Default::default()
        });
        session.start().unwrap();
        settle().await;

        // Two rapid triggers: the in-flight flag lets only one through.
        assert_eq!(session.select_platform(Platform::Linkedin).unwrap(), Dispatch::Started);
        assert_eq!(session.select_platform(Platform::Linkedin).unwrap(), Dispatch::Skipped);
        session.wait_for_active().await;

        let linkedin: Vec<_> = api
            .requests()
            .into_iter()
            .filter(|r| r.platform == Platform::Linkedin)
            .collect();
        assert_eq!(linkedin.len(), 1);
        assert!(linkedin[0].stream);
        assert_eq!(session.result(Platform::Linkedin).text, "linkedin:Normal:En");
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_stream_returns_to_idle() {
        let (session, _, store) = session(FakeApi {
            stall: HashSet::from([Platform::Twitter]),
            ..Default::default()
        });
        session.start().unwrap();
        settle().await;
        let partial = session.result(Platform::Twitter);
        assert!(partial.is_streaming);
        assert_eq!(partial.text, "twitter");

        session.select_platform(Platform::Xiaohongshu).unwrap();
        let twitter = session.result(Platform::Twitter);
        assert!(twitter.text.is_empty());
        assert!(!twitter.is_loading && !twitter.is_streaming);

        session.wait_for_active().await;
        settle().await;
        // The cancelled stream never completed, so no prefetch and no usage.
        assert_eq!(lock(&store).rate_limit.transform, 1);
        assert!(session.result(Platform::Twitter).text.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_option_changes_preserve_other_settings() {
        let (session, api, _) = session(FakeApi::default());
        session.start().unwrap();
        session.wait_for_active().await;

        session.set_language(OutputLanguage::Zh).unwrap();
        session.wait_for_active().await;
        session.set_length(OutputLength::Detailed).unwrap();
        session.wait_for_active().await;

        let last = api
            .requests()
            .into_iter()
            .filter(|r| r.platform == Platform::Twitter)
            .last()
            .unwrap();
        assert_eq!(last.length, OutputLength::Detailed);
        assert_eq!(last.language, OutputLanguage::Zh);
        assert!(last.stream);

        session.set_length(OutputLength::Concise).unwrap();
        session.wait_for_active().await;
        session.set_language(OutputLanguage::Auto).unwrap();
        session.wait_for_active().await;
        let result = session.result(Platform::Twitter);
        assert_eq!(result.length, OutputLength::Concise);
        assert_eq!(result.language, OutputLanguage::Auto);
        assert_eq!(result.text, "twitter:Concise:Auto");
    }

    #[tokio::test(start_paused = true)]
    async fn test_regenerate_reuses_current_settings() {
        let (session, api, _) = session(FakeApi::default());
        session.start().unwrap();
        session.wait_for_active().await;
        session.set_length(OutputLength::Concise).unwrap();
        session.wait_for_active().await;
        session.set_audience(Audience::Leadership).unwrap();
        session.wait_for_active().await;

        assert_eq!(session.regenerate().unwrap(), Dispatch::Started);
        session.wait_for_active().await;

        let last = api
            .requests()
            .into_iter()
            .filter(|r| r.platform == Platform::Twitter)
            .last()
            .unwrap();
        assert_eq!(last.length, OutputLength::Concise);
        assert_eq!(last.language, OutputLanguage::En);
        assert_eq!(last.audience, Audience::Leadership);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_blocks_request() {
        let (session, api, store) = session(FakeApi::default());
        {
            let mut store = lock(&store);
            for _ in 0..UsageCategory::Transform.daily_limit() {
                store.increment_usage(UsageCategory::Transform);
            }
        }

        let err = session.start().unwrap_err();
        assert!(matches!(err, ClientError::RateLimited(UsageCategory::Transform)));
        assert!(err.to_string().starts_with("今日转换次数已用完"));
        assert!(api.requests().is_empty());
        assert!(!session.result(Platform::Twitter).is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_request_leaves_slot_empty() {
        let (session, _, store) = session(FakeApi {
            fail: HashSet::from([Platform::Twitter]),
            ..Default::default()
        });
        session.start().unwrap();
        session.wait_for_active().await;

        let twitter = session.result(Platform::Twitter);
        assert!(twitter.failed);
        assert!(twitter.text.is_empty());
        assert!(!twitter.is_loading);
        assert_eq!(lock(&store).rate_limit.transform, 0);

        // No prefetch after a failure.
        session.wait_for_prefetch().await;
        assert!(session.result(Platform::Wechat).text.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefetch_failure_is_isolated() {
        let (session, _, _) = session(FakeApi {
            fail: HashSet::from([Platform::Wechat]),
            ..Default::default()
        });
        session.start().unwrap();
        session.wait_for_active().await;
        session.wait_for_prefetch().await;

        assert!(session.result(Platform::Wechat).text.is_empty());
        assert!(session.result(Platform::Wechat).failed);
        assert!(!session.result(Platform::Linkedin).text.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefetch_skips_slots_already_loading() {
        let (session, api, _) = session(FakeApi {
            stall: HashSet::from([Platform::Linkedin]),
            ..Default::default()
        });
        session.start().unwrap();
        session.wait_for_active().await;
        // LinkedIn is last in the prefetch order; claim it before that.
        session.select_platform(Platform::Linkedin).unwrap();
        settle().await;
        tokio::time::sleep(PREFETCH_STAGGER * 3).await;

        let linkedin = api
            .requests()
            .into_iter()
            .filter(|r| r.platform == Platform::Linkedin)
            .count();
        assert_eq!(linkedin, 1);
        assert_eq!(session.result(Platform::Linkedin).text, "linkedin");
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_prefetch_reply_is_discarded_after_restart() {
        let (session, api, store) = session(FakeApi {
            batch_delay: Duration::from_secs(2),
            ..Default::default()
        });
        session.start().unwrap();
        session.wait_for_active().await;
        settle().await;
        assert!(session.result(Platform::Xiaohongshu).is_loading);

        // The prefetch still owns the slot; a settings change takes it over.
        assert_eq!(session.select_platform(Platform::Xiaohongshu).unwrap(), Dispatch::Skipped);
        assert_eq!(session.set_length(OutputLength::Detailed).unwrap(), Dispatch::Started);
        session.wait_for_active().await;
        assert_eq!(session.result(Platform::Xiaohongshu).text, "xiaohongshu:Detailed:Zh");

        session.wait_for_prefetch().await;

        let xiaohongshu = session.result(Platform::Xiaohongshu);
        assert_eq!(xiaohongshu.text, "xiaohongshu:Detailed:Zh");
        assert!(!xiaohongshu.is_loading && !xiaohongshu.failed);

        let requests: Vec<_> = api
            .requests()
            .into_iter()
            .filter(|r| r.platform == Platform::Xiaohongshu)
            .map(|r| (r.stream, r.length))
            .collect();
        assert_eq!(
            requests,
            vec![(false, OutputLength::Normal), (true, OutputLength::Detailed)]
        );
        // Twitter, the winning restream, WeChat and LinkedIn; not the stale batch.
        assert_eq!(lock(&store).rate_limit.transform, 4);
    }
}
