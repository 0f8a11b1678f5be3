//! Parley Core Library
//!
//! This crate provides the client-side session state for Parley, including:
//! - The session store (selected server, active call, channel categories)
//! - Server, channel and call creation workflows
//! - Messaging and video client traits, with in-memory implementations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      parley-core                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  session/      - Snapshot, categories, store workflows      │
//! │  client/       - Messaging/video client traits, in-memory   │
//! │  types/        - Server, channel and call types             │
//! │  settings.rs   - Store settings                             │
//! │  error.rs      - Error types                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod error;
pub mod session;
pub mod settings;
pub mod types;

// Re-export commonly used types
pub use error::{ClientError, Error, Result};
pub use types::*;

// Re-export client traits and implementations
pub use client::{
    ClientResult, InMemoryMessagingClient, InMemoryVideoClient, MessagingClient, VideoClient,
};

// Re-export session components
pub use session::{
    group_channels, CategoryMap, CreateOutcome, ServerCreated, SessionSnapshot, SessionStore,
    SkipReason,
};

pub use settings::{StoreSettings, VoiceChannelTarget};
