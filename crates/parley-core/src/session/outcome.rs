//! Outcome of the create workflows
//!
//! Create operations never return an error to the caller. Failures are
//! logged where they happen and reported back as a `CreateOutcome`.

use crate::types::{Channel, CreatedCall, Server};

/// Why a create operation did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The messaging client has no acting user
    NotAuthenticated,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome<T> {
    Created(T),
    Skipped(SkipReason),
    /// The client rejected the request; holds the error message
    Failed(String),
}

impl<T> CreateOutcome<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    pub fn created(&self) -> Option<&T> {
        match self {
            Self::Created(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_created(self) -> Option<T> {
        match self {
            Self::Created(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason.as_str()),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CreateOutcome<U> {
        match self {
            Self::Created(value) => CreateOutcome::Created(f(value)),
            Self::Skipped(reason) => CreateOutcome::Skipped(reason),
            Self::Failed(reason) => CreateOutcome::Failed(reason),
        }
    }
}

/// Result of a successful server creation
#[derive(Debug, Clone, PartialEq)]
pub struct ServerCreated {
    pub server: Server,
    /// The "Welcome" channel that anchors the server
    pub welcome_channel: Channel,
    /// Default voice call, when one was created
    pub voice_call: Option<CreatedCall>,
}
