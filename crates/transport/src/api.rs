//! Backend operations the stores depend on.

use std::sync::Arc;

use async_trait::async_trait;
use tubechat_models::{ChatId, ChatResponse, ChatSession, ContentId, ContentItem, UserId};

use crate::error::TransportResult;

/// Content collection endpoints.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Submit a video URL for ingestion and return the created item.
    async fn ingest_video(&self, video_url: &str) -> TransportResult<ContentItem>;

    async fn list_contents(&self) -> TransportResult<Vec<ContentItem>>;

    async fn fetch_content(&self, id: ContentId) -> TransportResult<ContentItem>;

    async fn delete_content(&self, id: ContentId) -> TransportResult<()>;
}

/// Chat session endpoints.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Create an empty chat owned by `user_id`.
    async fn create_chat(&self, user_id: UserId) -> TransportResult<ChatSession>;

    /// Fetch a chat with all of its messages.
    async fn fetch_chat(&self, chat_id: ChatId) -> TransportResult<ChatSession>;

    async fn list_user_chats(&self, user_id: UserId) -> TransportResult<Vec<ChatSession>>;

    /// Send a user message and wait for the assistant's reply.
    async fn send_message(
        &self,
        chat_id: ChatId,
        message: &str,
        video_id: Option<&str>,
    ) -> TransportResult<ChatResponse>;
}

#[async_trait]
impl<T: ContentApi + ?Sized> ContentApi for Arc<T> {
    async fn ingest_video(&self, video_url: &str) -> TransportResult<ContentItem> {
        (**self).ingest_video(video_url).await
    }

    async fn list_contents(&self) -> TransportResult<Vec<ContentItem>> {
        (**self).list_contents().await
    }

    async fn fetch_content(&self, id: ContentId) -> TransportResult<ContentItem> {
        (**self).fetch_content(id).await
    }

    async fn delete_content(&self, id: ContentId) -> TransportResult<()> {
        (**self).delete_content(id).await
    }
}

#[async_trait]
impl<T: ChatApi + ?Sized> ChatApi for Arc<T> {
    async fn create_chat(&self, user_id: UserId) -> TransportResult<ChatSession> {
        (**self).create_chat(user_id).await
    }

    async fn fetch_chat(&self, chat_id: ChatId) -> TransportResult<ChatSession> {
        (**self).fetch_chat(chat_id).await
    }

    async fn list_user_chats(&self, user_id: UserId) -> TransportResult<Vec<ChatSession>> {
        (**self).list_user_chats(user_id).await
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        message: &str,
        video_id: Option<&str>,
    ) -> TransportResult<ChatResponse> {
        (**self).send_message(chat_id, message, video_id).await
    }
}
