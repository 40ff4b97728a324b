//! # TubeChat Stores
//!
//! Client-side state for the chat-over-content application. Two stores share
//! one request lifecycle (see [`resource`]):
//!
//! - [`ContentStore`] owns the collection of ingested content.
//! - [`ChatStore`] owns the active chat session and the user's chat roster,
//!   and implements optimistic message sending: the user's message is shown
//!   before the backend answers, and the reply is reconciled afterwards.
//!
//! State is published through `tokio::sync::watch`, so a presentation layer
//! can subscribe and re-render whenever a store changes. Nothing outside the
//! stores mutates that state.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tubechat_stores::{ChatStore, ContentStore};
//!
//! let contents = ContentStore::new(client.clone());
//! let chat = ChatStore::new(client);
//!
//! contents.ingest_from_external_source(url).await?;
//! chat.create(user_id).await?;
//! chat.send_message("What is this video about?", Some(video_id)).await?;
//! for message in chat.sorted_messages() {
//!     println!("{}: {}", message.role, message.content);
//! }
//! ```

pub mod chat;
pub mod content;
pub mod error;
pub mod resource;
pub mod utils;

pub use chat::{sorted_messages, ChatPhase, ChatState, ChatStore};
pub use content::{ContentState, ContentStore};
pub use error::{StoreError, StoreResult};
pub use resource::{ConcurrencyPolicy, RequestPhase, RequestStatus};
pub use utils::locator::video_id_from_url;
