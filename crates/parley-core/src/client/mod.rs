//! Messaging and video client seams
//!
//! The session store never talks to a network itself. It calls into:
//! - `MessagingClient` - channel queries and channel creation
//! - `VideoClient` - call creation
//!
//! `memory` provides process-local implementations of both.

mod memory;
mod traits;

pub use memory::{InMemoryMessagingClient, InMemoryVideoClient};
pub use traits::{ClientResult, MessagingClient, VideoClient};

#[cfg(test)]
pub use traits::{MockMessagingClient, MockVideoClient};
