//! Store settings
//!
//! Labels and type names the session store uses when it queries and
//! creates entities. Every field has a default, so a partial JSON file is
//! enough to override a single value.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Which server the default voice channel is attached to when a server is
/// created while another one is selected
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VoiceChannelTarget {
    /// The server that was selected before the new one
    Previous,
    /// The server being created
    Created,
}

impl Default for VoiceChannelTarget {
    fn default() -> Self {
        Self::Previous
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSettings {
    pub channel_type: String,
    pub call_type: String,
    pub direct_messages_label: String,
    pub direct_message_member_count: u32,
    pub welcome_channel_name: String,
    pub default_text_category: String,
    pub default_voice_channel_name: String,
    pub voice_channel_target: VoiceChannelTarget,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            channel_type: "messaging".to_string(),
            call_type: "default".to_string(),
            direct_messages_label: "Direct Messages".to_string(),
            direct_message_member_count: 2,
            welcome_channel_name: "Welcome".to_string(),
            default_text_category: "Text Channels".to_string(),
            default_voice_channel_name: "General Voice Channel".to_string(),
            voice_channel_target: VoiceChannelTarget::default(),
        }
    }
}

impl StoreSettings {
    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&raw)?;
        settings.validate()?;
        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Read settings from the default location, falling back to defaults
    /// when no file exists there
    pub fn load_or_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            path => {
                debug!("No settings file at {:?}, using defaults", path);
                Ok(Self::default())
            }
        }
    }

    /// `<config dir>/parley/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("parley").join("settings.json"))
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("channelType", &self.channel_type),
            ("callType", &self.call_type),
            ("directMessagesLabel", &self.direct_messages_label),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Settings(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }
}
