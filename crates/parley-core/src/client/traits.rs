//! Collaborator traits the session store is written against

use crate::error::ClientError;
use crate::types::{CallRequest, Channel, ChannelFilter, ChannelRequest, CreatedCall};
use async_trait::async_trait;

/// Result type for client calls
pub type ClientResult<T> = std::result::Result<T, ClientError>;

// ============================================================================
// Messaging Client Trait
// ============================================================================

/// Chat backend the store queries and creates channels on.
///
/// Implementations own transport, persistence and authentication. Channels
/// come back in the backend's order and the store keeps that order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Identity of the acting user, if one is connected
    fn user_id(&self) -> Option<String>;

    /// Query channels matching the filter
    async fn query_channels(&self, filter: &ChannelFilter) -> ClientResult<Vec<Channel>>;

    /// Create and persist a channel
    async fn create_channel(&self, request: ChannelRequest) -> ClientResult<Channel>;
}

// ============================================================================
// Video Client Trait
// ============================================================================

/// Voice/video backend the store creates calls on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoClient: Send + Sync {
    /// Create a call of the requested type and id
    async fn create_call(&self, request: CallRequest) -> ClientResult<CreatedCall>;
}
