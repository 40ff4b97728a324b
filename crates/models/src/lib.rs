//! # TubeChat Models
//!
//! Records exchanged with the chat backend: ingested content, chat sessions,
//! chat messages, and the reply envelope returned when a message is sent.
//!
//! Records mirror the backend's JSON. Unknown fields are ignored and missing
//! optional fields stay `None`.

pub mod entities;
pub mod timestamp;

pub use entities::{
    ChatMessage, ChatResponse, ChatSession, ContentItem, ContentType, MessageRole,
    ResponseContext, SourceRecord,
};

pub type ContentId = i64;
pub type ChatId = i64;
pub type MessageId = i64;
pub type UserId = i64;

/// Free-form metadata attached to content and messages.
pub type Metadata = serde_json::Map<String, serde_json::Value>;
