//! Voice/video call types exchanged with the video client

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub String);

impl CallId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CallId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CallId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Custom data attached to a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallCustomData {
    pub server_name: String,
    pub call_name: String,
}

/// Member entry in a call creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRequest {
    pub user_id: String,
}

impl MemberRequest {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn from_user_ids(user_ids: &[String]) -> Vec<Self> {
        user_ids.iter().map(|id| Self::new(id.as_str())).collect()
    }
}

/// Request to create a call on the video client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub call_type: String,
    pub id: CallId,
    pub custom: CallCustomData,
    pub members: Vec<MemberRequest>,
}

/// Call returned by the video client after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCall {
    pub id: CallId,
    pub call_type: String,
    pub custom: CallCustomData,
    pub members: Vec<MemberRequest>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_id() {
        let id = CallId::new("call-123");
        assert_eq!(id.as_str(), "call-123");
        assert_eq!(id.to_string(), "call-123");

        let id2: CallId = "call-456".into();
        assert_eq!(id2.as_str(), "call-456");
    }

    #[test]
    fn test_generated_call_ids_differ() {
        assert_ne!(CallId::generate(), CallId::generate());
    }

    #[test]
    fn test_custom_data_wire_names() {
        let custom = CallCustomData {
            server_name: "Rustaceans".into(),
            call_name: "General Voice Channel".into(),
        };
        let json = serde_json::to_value(&custom).unwrap();
        assert_eq!(json["serverName"], "Rustaceans");
        assert_eq!(json["callName"], "General Voice Channel");
    }

    #[test]
    fn test_members_from_user_ids() {
        let members = MemberRequest::from_user_ids(&["alice".to_string(), "bob".to_string()]);
        assert_eq!(members, vec![MemberRequest::new("alice"), MemberRequest::new("bob")]);
    }
}
