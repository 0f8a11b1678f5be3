//! Session state
//!
//! This module handles:
//! - The current snapshot (selected server, active call, channel categories)
//! - Grouping channels into display categories
//! - Server, channel and call creation workflows

mod categories;
mod outcome;
mod snapshot;
mod store;

pub use categories::group_channels;
pub use outcome::{CreateOutcome, ServerCreated, SkipReason};
pub use snapshot::{CategoryMap, SessionSnapshot};
pub use store::SessionStore;
