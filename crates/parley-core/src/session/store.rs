//! Session state store

use super::categories::group_channels;
use super::outcome::{CreateOutcome, ServerCreated, SkipReason};
use super::snapshot::{CategoryMap, SessionSnapshot};
use crate::client::{MessagingClient, VideoClient};
use crate::error::{Error, Result};
use crate::settings::{StoreSettings, VoiceChannelTarget};
use crate::types::*;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Holds the current session snapshot and the operations that change it.
///
/// The store is shared by reference (usually an `Arc`) from the
/// application's composition root. Every operation replaces the snapshot in
/// one step once its client calls have finished; overlapping operations are
/// not sequenced, so the last one to finish wins.
pub struct SessionStore {
    settings: StoreSettings,
    state: watch::Sender<SessionSnapshot>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_settings(StoreSettings::default())
    }

    pub fn with_settings(settings: StoreSettings) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self { settings, state }
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Current snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn server(&self) -> Option<Server> {
        self.state.borrow().server.clone()
    }

    pub fn call_id(&self) -> Option<CallId> {
        self.state.borrow().call_id.clone()
    }

    pub fn channels_by_category(&self) -> CategoryMap {
        self.state.borrow().channels_by_category.clone()
    }

    /// Receiver that is notified on every snapshot change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    // ========================================================================
    // Server selection
    // ========================================================================

    /// Select a server (or direct messages when `None`) and rebuild the
    /// channel categories from a fresh query.
    ///
    /// A failed query leaves the snapshot untouched.
    pub async fn select_server(
        &self,
        server: Option<Server>,
        client: &dyn MessagingClient,
    ) -> Result<()> {
        let user_id = client.user_id().ok_or(Error::NotAuthenticated)?;

        let mut filter = ChannelFilter::new(&self.settings.channel_type, user_id);
        if server.is_none() {
            filter = filter.with_member_count(self.settings.direct_message_member_count);
        }

        debug!("Querying channels for {}", filter.member);
        let channels = client.query_channels(&filter).await?;

        let channels_by_category = group_channels(
            channels,
            server.as_ref(),
            &self.settings.direct_messages_label,
        );

        match &server {
            Some(s) => info!(
                "Selected server {}: {} categories, {} channels",
                s.name,
                channels_by_category.len(),
                channels_by_category.channel_count()
            ),
            None => info!(
                "Selected direct messages: {} channels",
                channels_by_category.channel_count()
            ),
        }

        self.state.send_modify(|snapshot| {
            snapshot.server = server;
            snapshot.channels_by_category = channels_by_category;
        });

        Ok(())
    }

    // ========================================================================
    // Create workflows
    // ========================================================================

    /// Create a server: its welcome channel, a default voice call, then
    /// switch the selection to it.
    ///
    /// The voice call goes to the server that was selected before this call
    /// unless `voice_channel_target` is `created`. No call is made when that
    /// target is absent.
    pub async fn create_server(
        &self,
        messaging: &dyn MessagingClient,
        video: &dyn VideoClient,
        name: &str,
        image_url: &str,
        member_ids: &[String],
    ) -> CreateOutcome<ServerCreated> {
        let previous = self.server();

        let request = ChannelRequest::new(
            &self.settings.channel_type,
            &self.settings.welcome_channel_name,
        )
        .with_id(uuid::Uuid::new_v4().to_string())
        .with_members(member_ids.to_vec())
        .with_data(
            ChannelMetadata::new()
                .with_image(image_url)
                .with_server(name)
                .with_category(&self.settings.default_text_category),
        );

        let welcome_channel = match messaging.create_channel(request).await {
            Ok(channel) => channel,
            Err(e) => {
                error!("Failed to create server {}: {}", name, e);
                return CreateOutcome::Failed(e.to_string());
            }
        };
        info!("Created server {} with channel {}", name, welcome_channel.id);

        let server = Server::new(name, image_url);
        let voice_target = match self.settings.voice_channel_target {
            VoiceChannelTarget::Previous => previous,
            VoiceChannelTarget::Created => Some(server.clone()),
        };

        let voice_call = match voice_target {
            Some(target) => self
                .create_call(
                    video,
                    &target,
                    &self.settings.default_voice_channel_name,
                    member_ids,
                )
                .await
                .into_created(),
            None => None,
        };

        if let Err(e) = self.select_server(Some(server.clone()), messaging).await {
            error!("Created server {} but failed to select it: {}", name, e);
            return CreateOutcome::Failed(e.to_string());
        }

        CreateOutcome::Created(ServerCreated {
            server,
            welcome_channel,
            voice_call,
        })
    }

    /// Create a channel in the current server.
    ///
    /// The snapshot is not refreshed; call `select_server` again to see the
    /// new channel.
    pub async fn create_channel(
        &self,
        messaging: &dyn MessagingClient,
        name: &str,
        category: &str,
        member_ids: &[String],
    ) -> CreateOutcome<Channel> {
        if messaging.user_id().is_none() {
            warn!("Not creating channel {}: no authenticated user", name);
            return CreateOutcome::Skipped(SkipReason::NotAuthenticated);
        }

        let server_name = self.state.borrow().server.as_ref().map(|s| s.name.clone());
        let data = ChannelMetadata {
            server: server_name,
            ..ChannelMetadata::new().with_category(category)
        };

        let request = ChannelRequest::new(&self.settings.channel_type, name)
            .with_members(member_ids.to_vec())
            .with_data(data);

        match messaging.create_channel(request).await {
            Ok(channel) => {
                info!("Created channel {} ({})", name, channel.id);
                CreateOutcome::Created(channel)
            }
            Err(e) => {
                error!("Failed to create channel {}: {}", name, e);
                CreateOutcome::Failed(e.to_string())
            }
        }
    }

    /// Create a voice/video call for `server` under a fresh id.
    ///
    /// The active call in the snapshot is left alone; use `set_active_call`
    /// to join it.
    pub async fn create_call(
        &self,
        video: &dyn VideoClient,
        server: &Server,
        channel_name: &str,
        member_ids: &[String],
    ) -> CreateOutcome<CreatedCall> {
        let request = CallRequest {
            call_type: self.settings.call_type.clone(),
            id: CallId::generate(),
            custom: CallCustomData {
                server_name: server.name.clone(),
                call_name: channel_name.to_string(),
            },
            members: MemberRequest::from_user_ids(member_ids),
        };

        match video.create_call(request).await {
            Ok(call) => {
                info!("Created call {} for {}", call.id, server.name);
                CreateOutcome::Created(call)
            }
            Err(e) => {
                error!("Failed to create call {}: {}", channel_name, e);
                CreateOutcome::Failed(e.to_string())
            }
        }
    }

    // ========================================================================
    // Active call
    // ========================================================================

    pub fn set_active_call(&self, call_id: Option<CallId>) {
        debug!("Active call: {:?}", call_id);
        self.state.send_modify(|snapshot| snapshot.call_id = call_id);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{
        InMemoryMessagingClient, InMemoryVideoClient, MockMessagingClient, MockVideoClient,
    };
    use crate::error::ClientError;
    use pretty_assertions::assert_eq;

    fn users(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn ids(channels: &[Channel]) -> Vec<&str> {
        channels.iter().map(|c| c.id.as_str()).collect()
    }

    async fn seed(client: &InMemoryMessagingClient, id: &str, members: &[&str], data: ChannelMetadata) {
        let request = ChannelRequest::new("messaging", id)
            .with_id(id)
            .with_members(users(members))
            .with_data(data);
        client.create_channel(request).await.unwrap();
    }

    fn rust_channel(category: &str) -> ChannelMetadata {
        ChannelMetadata::new()
            .with_server("Rustaceans")
            .with_category(category)
    }

    #[tokio::test]
    async fn test_select_server_groups_categories() {
        let client = InMemoryMessagingClient::new("alice");
        seed(&client, "c1", &["alice", "bob", "carol"], rust_channel("A")).await;
        seed(&client, "c2", &["alice", "bob", "carol"], rust_channel("A")).await;
        seed(&client, "c3", &["alice", "bob", "carol"], rust_channel("B")).await;
        seed(&client, "c4", &["bob", "carol"], rust_channel("B")).await;

        let store = SessionStore::new();
        let server = Server::new("Rustaceans", "https://img.example/crab.png");
        store.select_server(Some(server.clone()), &client).await.unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.server, Some(server));
        let map = &snapshot.channels_by_category;
        assert_eq!(map.categories().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(ids(map.get("A").unwrap()), vec!["c1", "c2"]);
        assert_eq!(ids(map.get("B").unwrap()), vec!["c3"]);
    }

    #[tokio::test]
    async fn test_select_none_lists_direct_messages() {
        let client = InMemoryMessagingClient::new("alice");
        seed(&client, "dm1", &["alice", "bob"], ChannelMetadata::new()).await;
        seed(&client, "group", &["alice", "bob", "carol"], rust_channel("A")).await;
        seed(&client, "dm2", &["carol", "alice"], ChannelMetadata::new()).await;

        let store = SessionStore::new();
        store.select_server(None, &client).await.unwrap();

        let map = store.channels_by_category();
        assert_eq!(map.len(), 1);
        assert_eq!(ids(map.get("Direct Messages").unwrap()), vec!["dm1", "dm2"]);
        assert!(store.server().is_none());
    }

    #[tokio::test]
    async fn test_select_none_requests_two_member_channels() {
        let mut client = MockMessagingClient::new();
        client.expect_user_id().return_const(Some("alice".to_string()));
        client
            .expect_query_channels()
            .withf(|f| f.channel_type == "messaging" && f.member == "alice" && f.member_count == Some(2))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let store = SessionStore::new();
        store.select_server(None, &client).await.unwrap();
    }

    #[tokio::test]
    async fn test_select_server_does_not_restrict_member_count() {
        let mut client = MockMessagingClient::new();
        client.expect_user_id().return_const(Some("alice".to_string()));
        client
            .expect_query_channels()
            .withf(|f| f.member_count.is_none())
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let store = SessionStore::new();
        store
            .select_server(Some(Server::new("Rustaceans", "")), &client)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_uncategorized_channels_not_shown() {
        let client = InMemoryMessagingClient::new("alice");
        seed(&client, "c1", &["alice", "bob", "carol"], rust_channel("A")).await;
        seed(
            &client,
            "loose",
            &["alice", "bob", "carol"],
            ChannelMetadata::new().with_server("Rustaceans"),
        )
        .await;

        let store = SessionStore::new();
        store
            .select_server(Some(Server::new("Rustaceans", "")), &client)
            .await
            .unwrap();

        let map = store.channels_by_category();
        assert_eq!(map.channel_count(), 1);
        assert_eq!(map.category_of("loose"), None);
        assert!(!map.contains("Uncategorized"));
    }

    #[tokio::test]
    async fn test_query_failure_leaves_snapshot_unchanged() {
        let client = InMemoryMessagingClient::new("alice");
        seed(&client, "c1", &["alice", "bob", "carol"], rust_channel("A")).await;

        let store = SessionStore::new();
        store
            .select_server(Some(Server::new("Rustaceans", "")), &client)
            .await
            .unwrap();
        store.set_active_call(Some(CallId::new("call-1")));
        let before = store.snapshot();

        client.fail_next_query(ClientError::Unavailable("chat backend".into()));
        let result = store.select_server(None, &client).await;

        assert!(matches!(result, Err(Error::Client(ClientError::Unavailable(_)))));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_select_without_user_is_rejected() {
        let client = InMemoryMessagingClient::anonymous();
        let store = SessionStore::new();

        let result = store.select_server(None, &client).await;
        assert!(matches!(result, Err(Error::NotAuthenticated)));
        assert_eq!(store.snapshot(), SessionSnapshot::default());
    }

    #[tokio::test]
    async fn test_select_server_keeps_call_id() {
        let client = InMemoryMessagingClient::new("alice");
        let store = SessionStore::new();
        store.set_active_call(Some(CallId::new("call-1")));

        store
            .select_server(Some(Server::new("Rustaceans", "")), &client)
            .await
            .unwrap();

        assert_eq!(store.call_id(), Some(CallId::new("call-1")));
    }

    #[tokio::test]
    async fn test_create_server_selects_new_server() {
        let messaging = InMemoryMessagingClient::new("alice");
        let video = InMemoryVideoClient::new();
        let store = SessionStore::new();
        let members = users(&["alice", "bob", "carol"]);

        let outcome = store
            .create_server(&messaging, &video, "Rustaceans", "https://img.example/crab.png", &members)
            .await;

        let created = outcome.created().expect("server created");
        assert_eq!(created.welcome_channel.name.as_deref(), Some("Welcome"));
        assert_eq!(
            created.welcome_channel.data,
            ChannelMetadata::new()
                .with_image("https://img.example/crab.png")
                .with_server("Rustaceans")
                .with_category("Text Channels")
        );

        let snapshot = store.snapshot();
        assert_eq!(
            snapshot.server,
            Some(Server::new("Rustaceans", "https://img.example/crab.png"))
        );
        let text = snapshot.channels_by_category.get("Text Channels").unwrap();
        assert_eq!(ids(text), vec![created.welcome_channel.id.as_str()]);
    }

    #[tokio::test]
    async fn test_first_server_gets_no_voice_call() {
        let messaging = InMemoryMessagingClient::new("alice");
        let video = InMemoryVideoClient::new();
        let store = SessionStore::new();

        let outcome = store
            .create_server(&messaging, &video, "Rustaceans", "", &users(&["alice"]))
            .await;

        assert!(outcome.created().unwrap().voice_call.is_none());
        assert!(video.calls().is_empty());
    }

    #[tokio::test]
    async fn test_voice_call_goes_to_previous_server() {
        let messaging = InMemoryMessagingClient::new("alice");
        let video = InMemoryVideoClient::new();
        let store = SessionStore::new();
        let members = users(&["alice", "bob"]);

        store
            .create_server(&messaging, &video, "Rustaceans", "", &members)
            .await;
        let outcome = store
            .create_server(&messaging, &video, "Gophers", "", &members)
            .await;

        let calls = video.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].custom.server_name, "Rustaceans");
        assert_eq!(calls[0].custom.call_name, "General Voice Channel");
        assert_eq!(
            outcome.created().unwrap().voice_call.as_ref().map(|c| &c.id),
            Some(&calls[0].id)
        );
        assert_eq!(store.server().map(|s| s.name), Some("Gophers".to_string()));
        assert!(store.call_id().is_none());
    }

    #[tokio::test]
    async fn test_voice_call_can_target_created_server() {
        let messaging = InMemoryMessagingClient::new("alice");
        let video = InMemoryVideoClient::new();
        let store = SessionStore::with_settings(StoreSettings {
            voice_channel_target: VoiceChannelTarget::Created,
            ..StoreSettings::default()
        });

        store
            .create_server(&messaging, &video, "Rustaceans", "", &users(&["alice"]))
            .await;

        let calls = video.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].custom.server_name, "Rustaceans");
    }

    #[tokio::test]
    async fn test_failed_voice_call_does_not_fail_server() {
        let messaging = InMemoryMessagingClient::new("alice");
        let video = InMemoryVideoClient::new();
        let store = SessionStore::new();
        let members = users(&["alice"]);

        store
            .create_server(&messaging, &video, "Rustaceans", "", &members)
            .await;
        video.fail_next_create(ClientError::Unavailable("video backend".into()));
        let outcome = store
            .create_server(&messaging, &video, "Gophers", "", &members)
            .await;

        let created = outcome.created().unwrap();
        assert!(created.voice_call.is_none());
        assert_eq!(store.server().map(|s| s.name), Some("Gophers".to_string()));
    }

    #[tokio::test]
    async fn test_create_server_failure_is_absorbed() {
        let messaging = InMemoryMessagingClient::new("alice");
        let video = InMemoryVideoClient::new();
        let store = SessionStore::new();
        messaging.fail_next_create(ClientError::Request("quota".into()));

        let outcome = store
            .create_server(&messaging, &video, "Rustaceans", "", &users(&["alice"]))
            .await;

        assert_eq!(outcome.failure(), Some("Request failed: quota"));
        assert_eq!(store.snapshot(), SessionSnapshot::default());
    }

    #[tokio::test]
    async fn test_create_channel_uses_current_server() {
        let messaging = InMemoryMessagingClient::new("alice");
        let store = SessionStore::new();
        let members = users(&["alice", "bob", "carol"]);
        store
            .select_server(Some(Server::new("Rustaceans", "")), &messaging)
            .await
            .unwrap();

        let outcome = store
            .create_channel(&messaging, "async-help", "Help", &members)
            .await;

        let channel = outcome.created().unwrap();
        assert_eq!(channel.data, rust_channel("Help"));
        assert!(store.channels_by_category().is_empty());

        store
            .select_server(Some(Server::new("Rustaceans", "")), &messaging)
            .await
            .unwrap();
        assert_eq!(store.channels_by_category().category_of(&channel.id), Some("Help"));
    }

    #[tokio::test]
    async fn test_create_channel_without_server_has_no_server_field() {
        let messaging = InMemoryMessagingClient::new("alice");
        let store = SessionStore::new();

        let outcome = store
            .create_channel(&messaging, "misc", "General", &users(&["alice"]))
            .await;

        let channel = outcome.created().unwrap();
        assert!(channel.data.server.is_none());
        assert_eq!(channel.data.category.as_deref(), Some("General"));
    }

    #[tokio::test]
    async fn test_create_channel_requires_user() {
        let mut messaging = MockMessagingClient::new();
        messaging.expect_user_id().return_const(None::<String>);
        messaging.expect_create_channel().never();

        let store = SessionStore::new();
        let outcome = store
            .create_channel(&messaging, "misc", "General", &users(&["alice"]))
            .await;

        assert_eq!(outcome, CreateOutcome::Skipped(SkipReason::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_create_channel_failure_is_absorbed() {
        let mut messaging = MockMessagingClient::new();
        messaging.expect_user_id().return_const(Some("alice".to_string()));
        messaging
            .expect_create_channel()
            .times(1)
            .returning(|_| Err(ClientError::Request("rejected".into())));

        let store = SessionStore::new();
        store.set_active_call(Some(CallId::new("call-1")));
        let before = store.snapshot();

        let outcome = store
            .create_channel(&messaging, "misc", "General", &users(&["alice"]))
            .await;

        assert_eq!(outcome.failure(), Some("Request failed: rejected"));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_create_call_builds_request() {
        let mut video = MockVideoClient::new();
        video
            .expect_create_call()
            .withf(|req| {
                req.call_type == "default"
                    && !req.id.as_str().is_empty()
                    && req.custom.server_name == "Rustaceans"
                    && req.custom.call_name == "Standup"
                    && req.members == vec![MemberRequest::new("alice"), MemberRequest::new("bob")]
            })
            .times(1)
            .returning(|req| {
                Ok(CreatedCall {
                    id: req.id,
                    call_type: req.call_type,
                    custom: req.custom,
                    members: req.members,
                    created_at: chrono::Utc::now(),
                })
            });

        let store = SessionStore::new();
        let outcome = store
            .create_call(
                &video,
                &Server::new("Rustaceans", ""),
                "Standup",
                &users(&["alice", "bob"]),
            )
            .await;

        assert!(outcome.is_created());
        assert!(store.call_id().is_none());
    }

    #[tokio::test]
    async fn test_create_call_failure_is_absorbed() {
        let mut video = MockVideoClient::new();
        video
            .expect_create_call()
            .returning(|_| Err(ClientError::Unavailable("video backend".into())));

        let store = SessionStore::new();
        let outcome = store
            .create_call(&video, &Server::new("Rustaceans", ""), "Standup", &[])
            .await;

        assert_eq!(outcome.failure(), Some("Service unavailable: video backend"));
        assert_eq!(store.snapshot(), SessionSnapshot::default());
    }

    #[tokio::test]
    async fn test_set_active_call_touches_only_call_id() {
        let client = InMemoryMessagingClient::new("alice");
        seed(&client, "c1", &["alice", "bob", "carol"], rust_channel("A")).await;
        let store = SessionStore::new();
        store
            .select_server(Some(Server::new("Rustaceans", "")), &client)
            .await
            .unwrap();
        let before = store.snapshot();

        store.set_active_call(Some(CallId::new("call-1")));
        let during = store.snapshot();
        assert_eq!(during.call_id, Some(CallId::new("call-1")));
        assert_eq!(during.server, before.server);
        assert_eq!(during.channels_by_category, before.channels_by_category);

        store.set_active_call(None);
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let client = InMemoryMessagingClient::new("alice");
        let store = SessionStore::new();
        let mut rx = store.subscribe();

        store
            .select_server(Some(Server::new("Rustaceans", "")), &client)
            .await
            .unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(
            rx.borrow_and_update().server,
            Some(Server::new("Rustaceans", ""))
        );

        store.set_active_call(Some(CallId::new("call-9")));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().call_id, Some(CallId::new("call-9")));
    }

    #[tokio::test]
    async fn test_concurrent_selects_last_finisher_wins() {
        let client = InMemoryMessagingClient::new("alice");
        seed(&client, "c1", &["alice", "bob", "carol"], rust_channel("A")).await;
        let store = SessionStore::new();

        let rust = Server::new("Rustaceans", "");
        let (first, second) = futures::join!(
            store.select_server(Some(rust.clone()), &client),
            store.select_server(None, &client),
        );
        first.unwrap();
        second.unwrap();

        let snapshot = store.snapshot();
        assert!(snapshot.is_direct_messages());
        assert!(snapshot.channels_by_category.contains("Direct Messages"));
    }
}
