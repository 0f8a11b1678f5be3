//! Channel types exchanged with the messaging client

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Custom data a channel carries alongside its standard fields.
///
/// The named fields are the ones the session store reads; anything else a
/// client attaches lands in `extra` and is passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChannelMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Category label, ignoring empty strings
    pub fn category_label(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

/// A messaging conversation as returned by the messaging client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub channel_type: String,
    pub name: Option<String>,
    pub members: Vec<String>,
    pub member_count: u32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub data: ChannelMetadata,
}

impl Channel {
    /// Whether this channel is attached to the server with the given name
    pub fn belongs_to(&self, server_name: &str) -> bool {
        self.data.server.as_deref() == Some(server_name)
    }

    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }
}

/// Query filter for [`MessagingClient::query_channels`](crate::client::MessagingClient::query_channels)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFilter {
    pub channel_type: String,
    /// Only channels this user is a member of
    pub member: String,
    /// Only channels with exactly this many members
    pub member_count: Option<u32>,
}

impl ChannelFilter {
    pub fn new(channel_type: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            channel_type: channel_type.into(),
            member: member.into(),
            member_count: None,
        }
    }

    pub fn with_member_count(mut self, count: u32) -> Self {
        self.member_count = Some(count);
        self
    }

    pub fn matches(&self, channel: &Channel) -> bool {
        channel.channel_type == self.channel_type
            && channel.has_member(&self.member)
            && self
                .member_count
                .map_or(true, |count| channel.member_count == count)
    }
}

/// Request to create a channel on the messaging client
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRequest {
    pub channel_type: String,
    /// Client generates an id when absent
    pub id: Option<String>,
    pub name: String,
    pub members: Vec<String>,
    pub data: ChannelMetadata,
}

impl ChannelRequest {
    pub fn new(channel_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            channel_type: channel_type.into(),
            id: None,
            name: name.into(),
            members: Vec::new(),
            data: ChannelMetadata::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_members(mut self, members: Vec<String>) -> Self {
        self.members = members;
        self
    }

    pub fn with_data(mut self, data: ChannelMetadata) -> Self {
        self.data = data;
        self
    }
}
