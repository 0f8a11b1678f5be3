//! Core type definitions for Parley
//!
//! Values exchanged with the messaging and video clients, plus the
//! server descriptor the session store keeps as its current selection.

mod call_types;
mod channel_types;

pub use call_types::*;
pub use channel_types::*;

use serde::{Deserialize, Serialize};

/// A named grouping of channels, analogous to a guild or workspace.
///
/// Servers have no identifier of their own: channels reference them by
/// name through [`ChannelMetadata::server`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub name: String,
    pub image_url: String,
}

impl Server {
    pub fn new(name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_url: image_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_serializes_camel_case() {
        let server = Server::new("Rustaceans", "https://img.example/crab.png");
        let json = serde_json::to_value(&server).unwrap();
        assert_eq!(json["name"], "Rustaceans");
        assert_eq!(json["imageUrl"], "https://img.example/crab.png");
    }
}
