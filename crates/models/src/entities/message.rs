use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ChatId, ContentId, MessageId, Metadata};

/// Represents a message within a chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Server-assigned id, or a local placeholder while provisional
    pub id: MessageId,
    /// Chat this message belongs to
    pub chat_id: ChatId,
    /// Content the message refers to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<ContentId>,
    /// Role of the message sender
    pub role: MessageRole,
    /// Message body
    pub content: String,
    /// Free-form metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Creation timestamp
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    #[serde(with = "crate::timestamp")]
    pub updated_at: DateTime<Utc>,
    /// Set on messages appended locally before the server confirmed them.
    #[serde(skip)]
    provisional: bool,
}

/// Role of a message author.
///
/// Kept as an open string: the backend may introduce roles beyond the three
/// known ones and those are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageRole(String);

impl MessageRole {
    pub const USER: &'static str = "user";
    pub const ASSISTANT: &'static str = "assistant";
    pub const SYSTEM: &'static str = "system";

    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into())
    }

    pub fn user() -> Self {
        Self::new(Self::USER)
    }

    pub fn assistant() -> Self {
        Self::new(Self::ASSISTANT)
    }

    pub fn system() -> Self {
        Self::new(Self::SYSTEM)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MessageRole {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ChatMessage {
    /// Create a confirmed message instance
    pub fn new(
        id: MessageId,
        chat_id: ChatId,
        role: MessageRole,
        content: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            chat_id,
            content_id: None,
            role,
            content: content.into(),
            metadata: None,
            created_at: at,
            updated_at: at,
            provisional: false,
        }
    }

    /// Build a user message that has not been confirmed by the server yet.
    pub fn provisional(
        id: MessageId,
        chat_id: ChatId,
        content: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            chat_id,
            content_id: None,
            role: MessageRole::user(),
            content: content.into(),
            metadata: None,
            created_at: at,
            updated_at: at,
            provisional: true,
        }
    }

    pub fn is_provisional(&self) -> bool {
        self.provisional
    }

    /// Overwrite both timestamps.
    pub fn restamp(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
        self.updated_at = at;
    }

    pub fn is_user(&self) -> bool {
        self.role.as_str() == MessageRole::USER
    }

    pub fn is_assistant(&self) -> bool {
        self.role.as_str() == MessageRole::ASSISTANT
    }

    pub fn is_system(&self) -> bool {
        self.role.as_str() == MessageRole::SYSTEM
    }
}
