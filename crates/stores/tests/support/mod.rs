//! In-memory backend used by the store tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tubechat_models::{
    ChatId, ChatMessage, ChatResponse, ChatSession, ContentId, ContentItem, ContentType,
    MessageRole, UserId,
};
use tubechat_transport::{ChatApi, ContentApi, TransportError, TransportResult};

/// Clock the fake server stamps its replies with; deliberately far behind
/// the client's clock.
pub fn skewed_server_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
}

pub fn content(id: ContentId, title: &str) -> ContentItem {
    let at = skewed_server_time();
    ContentItem {
        id,
        title: title.to_string(),
        content_type: ContentType::Video,
        source_url: Some(format!("https://www.youtube.com/watch?v=video{id}")),
        content_text: Some(format!("transcript of {title}")),
        metadata: None,
        created_at: at,
        updated_at: at,
    }
}

pub fn chat(id: ChatId, user_id: UserId, messages: Vec<ChatMessage>) -> ChatSession {
    let at = skewed_server_time();
    ChatSession {
        id,
        title: None,
        user_id: Some(user_id),
        created_at: at,
        updated_at: at,
        messages,
    }
}

pub fn reply_text(message: &str) -> String {
    format!("echo: {message}")
}

/// Fake backend keeping content and chats in memory.
///
/// Every call is logged by operation name. Failures can be armed per
/// operation and fire once.
#[derive(Default)]
pub struct FakeBackend {
    contents: Mutex<Vec<ContentItem>>,
    chats: Mutex<Vec<ChatSession>>,
    next_id: AtomicI64,
    failures: Mutex<HashMap<&'static str, (u16, Option<String>)>>,
    latency: Mutex<Option<Duration>>,
    reply_delays: Mutex<VecDeque<Duration>>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(100),
            ..Self::default()
        }
    }

    pub fn with_contents(items: Vec<ContentItem>) -> Self {
        let backend = Self::new();
        *backend.contents.lock().unwrap() = items;
        backend
    }

    pub fn with_chats(chats: Vec<ChatSession>) -> Self {
        let backend = Self::new();
        *backend.chats.lock().unwrap() = chats;
        backend
    }

    /// Replace (or add) the server's copy of an item.
    pub fn put_content(&self, item: ContentItem) {
        let mut contents = self.contents.lock().unwrap();
        contents.retain(|existing| existing.id != item.id);
        contents.push(item);
    }

    /// Make the next call of `operation` fail with `status`.
    pub fn fail_next(&self, operation: &'static str, status: u16, detail: Option<&str>) {
        self.failures
            .lock()
            .unwrap()
            .insert(operation, (status, detail.map(str::to_string)));
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    /// Delay successive `send_message` calls by the given durations.
    pub fn delay_replies(&self, delays: impl IntoIterator<Item = Duration>) {
        self.reply_delays.lock().unwrap().extend(delays);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|call| **call == operation).count()
    }

    async fn enter(&self, operation: &'static str) -> TransportResult<()> {
        self.calls.lock().unwrap().push(operation);

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let failure = self.failures.lock().unwrap().remove(operation);
        match failure {
            Some((status, detail)) => Err(TransportError::status(status, detail)),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn not_found(what: &str) -> TransportError {
        TransportError::status(404, Some(format!("{what} not found")))
    }
}

#[async_trait]
impl ContentApi for FakeBackend {
    async fn ingest_video(&self, video_url: &str) -> TransportResult<ContentItem> {
        self.enter("ingest_video").await?;
        let mut item = content(self.next_id(), "Ingested video");
        item.source_url = Some(video_url.to_string());
        self.contents.lock().unwrap().push(item.clone());
        Ok(item)
    }

    async fn list_contents(&self) -> TransportResult<Vec<ContentItem>> {
        self.enter("list_contents").await?;
        Ok(self.contents.lock().unwrap().clone())
    }

    async fn fetch_content(&self, id: ContentId) -> TransportResult<ContentItem> {
        self.enter("fetch_content").await?;
        self.contents
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found("Content"))
    }

    async fn delete_content(&self, id: ContentId) -> TransportResult<()> {
        self.enter("delete_content").await?;
        let mut contents = self.contents.lock().unwrap();
        let before = contents.len();
        contents.retain(|item| item.id != id);
        if contents.len() == before {
            return Err(Self::not_found("Content"));
        }
        Ok(())
    }
}

#[async_trait]
impl ChatApi for FakeBackend {
    async fn create_chat(&self, user_id: UserId) -> TransportResult<ChatSession> {
        self.enter("create_chat").await?;
        let created = chat(self.next_id(), user_id, Vec::new());
        self.chats.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn fetch_chat(&self, chat_id: ChatId) -> TransportResult<ChatSession> {
        self.enter("fetch_chat").await?;
        self.chats
            .lock()
            .unwrap()
            .iter()
            .find(|chat| chat.id == chat_id)
            .cloned()
            .ok_or_else(|| Self::not_found("Chat"))
    }

    async fn list_user_chats(&self, user_id: UserId) -> TransportResult<Vec<ChatSession>> {
        self.enter("list_user_chats").await?;
        Ok(self
            .chats
            .lock()
            .unwrap()
            .iter()
            .filter(|chat| chat.user_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        message: &str,
        video_id: Option<&str>,
    ) -> TransportResult<ChatResponse> {
        self.enter("send_message").await?;

        let delay = self.reply_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let at = skewed_server_time();
        let user = ChatMessage::new(self.next_id(), chat_id, MessageRole::user(), message, at);
        let reply = ChatMessage::new(
            self.next_id(),
            chat_id,
            MessageRole::assistant(),
            reply_text(message),
            at,
        );

        let mut chats = self.chats.lock().unwrap();
        let stored = chats
            .iter_mut()
            .find(|chat| chat.id == chat_id)
            .ok_or_else(|| Self::not_found("Chat"))?;
        stored.messages.push(user);
        stored.messages.push(reply.clone());

        Ok(ChatResponse {
            message: reply,
            context: None,
            sources: video_id.map(|id| {
                let mut source = serde_json::Map::new();
                source.insert("video_id".to_string(), serde_json::Value::from(id));
                vec![source]
            }),
        })
    }
}
