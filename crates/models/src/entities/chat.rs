use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::ChatMessage;
use crate::{ChatId, Metadata, UserId};

/// A chat conversation together with its messages, in server order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Server-assigned identifier
    pub id: ChatId,
    /// Chat title
    #[serde(default)]
    pub title: Option<String>,
    /// Owning user (not every backend response carries it)
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Creation timestamp
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    #[serde(with = "crate::timestamp")]
    pub updated_at: DateTime<Utc>,
    /// Messages in the order the server returned them
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Title for display, falling back to the id.
    pub fn display_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("Chat #{}", self.id),
        }
    }
}

/// Attribution record for a piece of context used to answer a message.
pub type SourceRecord = Metadata;

/// Reply to a sent message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant's reply
    pub message: ChatMessage,
    /// Context the backend retrieved for the answer
    #[serde(default)]
    pub context: Option<ResponseContext>,
    /// Source attribution records
    #[serde(default)]
    pub sources: Option<Vec<SourceRecord>>,
}

/// Retrieval context returned with a reply.
///
/// Older backends send a plain string, current ones a string mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseContext {
    Text(String),
    Fields(BTreeMap<String, String>),
}

impl ResponseContext {
    /// Flatten the context into display text.
    pub fn to_text(&self) -> String {
        match self {
            ResponseContext::Text(text) => text.clone(),
            ResponseContext::Fields(fields) => fields
                .iter()
                .map(|(key, value)| format!("{key}: {value}"))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}
