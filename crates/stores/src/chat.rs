//! Store for chat sessions and optimistic message sending.
//!
//! Sending a message runs in three steps:
//!
//! 1. A provisional user message is appended to the active chat right away.
//! 2. The message is sent to the backend, which answers with the assistant's
//!    reply.
//! 3. The reply is appended with its timestamps set to one second after the
//!    user message, so the sorted view always shows it directly after the
//!    message that triggered it, whatever the server's clock says.
//!
//! A failed send leaves the provisional message in place; the failure is
//! recorded in the store's `error` and returned.

use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;
use tracing::{debug, info};
use tubechat_models::{ChatId, ChatMessage, ChatResponse, ChatSession, UserId};
use tubechat_transport::ChatApi;

use crate::error::{StoreError, StoreResult};
use crate::resource::{ConcurrencyPolicy, RequestStatus, Resource, ResourceState};
use crate::utils::ProvisionalIds;

const CREATE_FALLBACK: &str = "Failed to create chat";
const LOAD_FALLBACK: &str = "Failed to load chat";
const LIST_FALLBACK: &str = "Failed to load chats";
const SEND_FALLBACK: &str = "Failed to send message";

/// Gap between a user message and the reconciled reply.
const REPLY_OFFSET_MS: i64 = 1_000;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    pub current_chat: Option<ChatSession>,
    pub chats: Vec<ChatSession>,
    pub status: RequestStatus,
}

impl ResourceState for ChatState {
    fn status(&self) -> &RequestStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut RequestStatus {
        &mut self.status
    }
}

/// Where the chat exchange currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    NoActiveChat,
    Ready,
    Busy,
}

impl ChatState {
    pub fn phase(&self) -> ChatPhase {
        match (&self.current_chat, self.status.loading) {
            (None, _) => ChatPhase::NoActiveChat,
            (Some(_), true) => ChatPhase::Busy,
            (Some(_), false) => ChatPhase::Ready,
        }
    }
}

/// Messages ordered by creation time.
///
/// The sort is stable: messages with equal timestamps keep the order in
/// which they were inserted.
pub fn sorted_messages(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut sorted = messages.to_vec();
    sorted.sort_by_key(|message| message.created_at);
    sorted
}

fn reply_timestamp(user_at: DateTime<Utc>) -> DateTime<Utc> {
    user_at + Duration::milliseconds(REPLY_OFFSET_MS)
}

/// Owns the active chat session and the user's chat roster.
pub struct ChatStore<A> {
    api: A,
    resource: Resource<ChatState>,
    provisional_ids: ProvisionalIds,
}

impl<A: ChatApi> ChatStore<A> {
    pub fn new(api: A) -> Self {
        Self::with_policy(api, ConcurrencyPolicy::default())
    }

    pub fn with_policy(api: A, policy: ConcurrencyPolicy) -> Self {
        Self {
            api,
            resource: Resource::new(ChatState::default(), policy),
            provisional_ids: ProvisionalIds::new(),
        }
    }

    pub fn current_chat(&self) -> Option<ChatSession> {
        self.resource.read(|state| state.current_chat.clone())
    }

    pub fn has_active_chat(&self) -> bool {
        self.resource.read(|state| state.current_chat.is_some())
    }

    pub fn chats(&self) -> Vec<ChatSession> {
        self.resource.read(|state| state.chats.clone())
    }

    pub fn policy(&self) -> ConcurrencyPolicy {
        self.resource.policy()
    }

    pub fn loading(&self) -> bool {
        self.resource.loading()
    }

    pub fn error(&self) -> Option<String> {
        self.resource.error()
    }

    pub fn phase(&self) -> ChatPhase {
        self.resource.read(ChatState::phase)
    }

    pub fn snapshot(&self) -> ChatState {
        self.resource.read(ChatState::clone)
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.resource.subscribe()
    }

    /// Messages of the active chat ordered by creation time; empty without a chat.
    pub fn sorted_messages(&self) -> Vec<ChatMessage> {
        self.resource.read(|state| {
            state
                .current_chat
                .as_ref()
                .map(|chat| sorted_messages(&chat.messages))
                .unwrap_or_default()
        })
    }

    /// Create a chat, add it to the roster and make it the active chat.
    pub async fn create(&self, user_id: UserId) -> StoreResult<ChatSession> {
        let flight = self.resource.begin(CREATE_FALLBACK).await;

        let chat = self
            .api
            .create_chat(user_id)
            .await
            .map_err(|err| flight.fail(err))?;

        info!(chat_id = chat.id, user_id, "chat created");

        let stored = chat.clone();
        self.resource.modify(|state| {
            state.chats.push(stored.clone());
            state.current_chat = Some(stored);
        });
        Ok(chat)
    }

    /// Fetch a chat and make it the active chat.
    pub async fn load(&self, chat_id: ChatId) -> StoreResult<ChatSession> {
        let flight = self.resource.begin(LOAD_FALLBACK).await;

        let chat = self
            .api
            .fetch_chat(chat_id)
            .await
            .map_err(|err| flight.fail(err))?;

        info!(chat_id, messages = chat.messages.len(), "chat loaded");

        let stored = chat.clone();
        self.resource
            .modify(|state| state.current_chat = Some(stored));
        Ok(chat)
    }

    /// Replace the roster with the user's chats.
    pub async fn load_user_chats(&self, user_id: UserId) -> StoreResult<Vec<ChatSession>> {
        let flight = self.resource.begin(LIST_FALLBACK).await;

        let chats = self
            .api
            .list_user_chats(user_id)
            .await
            .map_err(|err| flight.fail(err))?;

        info!(user_id, count = chats.len(), "chat roster replaced");

        let stored = chats.clone();
        self.resource.modify(|state| state.chats = stored);
        Ok(chats)
    }

    /// Send `text` in the active chat and reconcile the assistant's reply.
    ///
    /// Fails with [`StoreError::NoActiveChat`] before any request, and
    /// without touching `loading` or `error`, when no chat is active.
    pub async fn send_message(
        &self,
        text: &str,
        video_id: Option<&str>,
    ) -> StoreResult<ChatResponse> {
        if !self.has_active_chat() {
            return Err(StoreError::NoActiveChat);
        }

        // Visible before the queue turn; only the request and reconciliation wait.
        let user_at = Utc::now();
        let provisional_id = self.provisional_ids.next();
        let mut target = None;
        self.resource.modify(|state| {
            if let Some(chat) = state.current_chat.as_mut() {
                chat.messages
                    .push(ChatMessage::provisional(provisional_id, chat.id, text, user_at));
                target = Some(chat.id);
            }
        });
        let chat_id = target.ok_or(StoreError::NoActiveChat)?;

        debug!(chat_id, provisional_id, "user message appended optimistically");

        let flight = self.resource.begin(SEND_FALLBACK).await;

        let response = self
            .api
            .send_message(chat_id, text, video_id)
            .await
            .map_err(|err| flight.fail(err))?;

        let mut reply = response.message.clone();
        reply.restamp(reply_timestamp(user_at));

        let mut appended = false;
        self.resource.modify(|state| {
            if let Some(chat) = state.current_chat.as_mut().filter(|chat| chat.id == chat_id) {
                chat.messages.push(reply);
                appended = true;
            }
        });

        if appended {
            info!(chat_id, reply_id = response.message.id, "assistant reply reconciled");
        } else {
            debug!(chat_id, "active chat changed while waiting, reply not appended");
        }

        Ok(response)
    }
}
