//! Domain records for content and chats.

pub mod chat;
pub mod content;
pub mod message;

pub use chat::{ChatResponse, ChatSession, ResponseContext, SourceRecord};
pub use content::{ContentItem, ContentType};
pub use message::{ChatMessage, MessageRole};
