//! Snapshot of the session state handed to readers

use crate::types::{CallId, Channel, Server};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered mapping from category name to the channels in it.
///
/// Categories keep the order they were inserted in, and each channel list
/// keeps the order the messaging client returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryMap {
    entries: Vec<(String, Vec<Channel>)>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the channels for a category, replacing any previous list but
    /// keeping the category's position
    pub fn insert(&mut self, category: impl Into<String>, channels: Vec<Channel>) {
        let category = category.into();
        match self.entries.iter_mut().find(|(name, _)| *name == category) {
            Some((_, existing)) => *existing = channels,
            None => self.entries.push((category, channels)),
        }
    }

    pub fn get(&self, category: &str) -> Option<&[Channel]> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, channels)| channels.as_slice())
    }

    pub fn contains(&self, category: &str) -> bool {
        self.get(category).is_some()
    }

    /// Category names in display order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Channel])> {
        self.entries
            .iter()
            .map(|(name, channels)| (name.as_str(), channels.as_slice()))
    }

    /// Find the category holding a channel
    pub fn category_of(&self, channel_id: &str) -> Option<&str> {
        self.iter()
            .find(|(_, channels)| channels.iter().any(|c| c.id == channel_id))
            .map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of channels across all categories
    pub fn channel_count(&self) -> usize {
        self.entries.iter().map(|(_, channels)| channels.len()).sum()
    }
}

impl Serialize for CategoryMap {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, channels) in &self.entries {
            map.serialize_entry(name, channels)?;
        }
        map.end()
    }
}

/// Complete session state at a point in time
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Selected server; `None` means direct-message mode
    pub server: Option<Server>,
    /// Call the user is currently in
    pub call_id: Option<CallId>,
    pub channels_by_category: CategoryMap,
}

impl SessionSnapshot {
    pub fn is_direct_messages(&self) -> bool {
        self.server.is_none()
    }

    pub fn in_call(&self) -> bool {
        self.call_id.is_some()
    }
}
