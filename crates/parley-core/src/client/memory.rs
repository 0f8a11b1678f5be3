//! In-memory messaging and video clients
//!
//! Both keep everything in process and return results in creation order.
//! A one-shot failure can be queued to exercise error paths.

use super::traits::{ClientResult, MessagingClient, VideoClient};
use crate::error::ClientError;
use crate::types::{CallRequest, Channel, ChannelFilter, ChannelRequest, CreatedCall};
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

/// Messaging client backed by a channel list
pub struct InMemoryMessagingClient {
    user_id: Option<String>,
    channels: Mutex<Vec<Channel>>,
    query_failure: Mutex<Option<ClientError>>,
    create_failure: Mutex<Option<ClientError>>,
}

impl InMemoryMessagingClient {
    /// Client acting as the given user
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::anonymous()
        }
    }

    /// Client with no connected user
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            channels: Mutex::new(Vec::new()),
            query_failure: Mutex::new(None),
            create_failure: Mutex::new(None),
        }
    }

    /// Make the next `query_channels` call fail with `err`
    pub fn fail_next_query(&self, err: ClientError) {
        *self.query_failure.lock() = Some(err);
    }

    /// Make the next `create_channel` call fail with `err`
    pub fn fail_next_create(&self, err: ClientError) {
        *self.create_failure.lock() = Some(err);
    }

    /// All channels, in creation order
    pub fn channels(&self) -> Vec<Channel> {
        self.channels.lock().clone()
    }
}

#[async_trait]
impl MessagingClient for InMemoryMessagingClient {
    fn user_id(&self) -> Option<String> {
        self.user_id.clone()
    }

    async fn query_channels(&self, filter: &ChannelFilter) -> ClientResult<Vec<Channel>> {
        if let Some(err) = self.query_failure.lock().take() {
            return Err(err);
        }

        let channels: Vec<Channel> = self
            .channels
            .lock()
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();

        debug!("Query {:?} matched {} channels", filter, channels.len());
        Ok(channels)
    }

    async fn create_channel(&self, request: ChannelRequest) -> ClientResult<Channel> {
        if let Some(err) = self.create_failure.lock().take() {
            return Err(err);
        }

        let id = request
            .id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let mut channels = self.channels.lock();
        if channels
            .iter()
            .any(|c| c.id == id && c.channel_type == request.channel_type)
        {
            return Err(ClientError::AlreadyExists(format!(
                "{}:{}",
                request.channel_type, id
            )));
        }

        let mut members: Vec<String> = Vec::with_capacity(request.members.len());
        for member in request.members {
            if !members.contains(&member) {
                members.push(member);
            }
        }

        let channel = Channel {
            id,
            channel_type: request.channel_type,
            name: Some(request.name),
            member_count: members.len() as u32,
            members,
            created_at: chrono::Utc::now(),
            data: request.data,
        };
        channels.push(channel.clone());

        debug!("Created channel {}:{}", channel.channel_type, channel.id);
        Ok(channel)
    }
}

/// Video client that records created calls
#[derive(Default)]
pub struct InMemoryVideoClient {
    calls: Mutex<Vec<CreatedCall>>,
    create_failure: Mutex<Option<ClientError>>,
}

impl InMemoryVideoClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create_call` fail with `err`
    pub fn fail_next_create(&self, err: ClientError) {
        *self.create_failure.lock() = Some(err);
    }

    /// All calls, in creation order
    pub fn calls(&self) -> Vec<CreatedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl VideoClient for InMemoryVideoClient {
    async fn create_call(&self, request: CallRequest) -> ClientResult<CreatedCall> {
        if let Some(err) = self.create_failure.lock().take() {
            return Err(err);
        }

        let mut calls = self.calls.lock();
        if calls
            .iter()
            .any(|c| c.id == request.id && c.call_type == request.call_type)
        {
            return Err(ClientError::AlreadyExists(format!(
                "{}:{}",
                request.call_type, request.id
            )));
        }

        let call = CreatedCall {
            id: request.id,
            call_type: request.call_type,
            custom: request.custom,
            members: request.members,
            created_at: chrono::Utc::now(),
        };
        calls.push(call.clone());

        debug!("Created call {}:{}", call.call_type, call.id);
        Ok(call)
    }
}
