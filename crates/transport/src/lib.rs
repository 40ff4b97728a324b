//! # TubeChat Transport
//!
//! Typed access to the chat backend's REST API. The stores only see the
//! [`ContentApi`] and [`ChatApi`] traits; [`HttpApiClient`] is the reqwest
//! implementation used at runtime.
//!
//! Retries are not attempted here. The request timeout comes from
//! [`tubechat_config::ApiConfig`].

pub mod api;
pub mod client;
pub mod error;
pub mod requests;

pub use api::{ChatApi, ContentApi};
pub use client::HttpApiClient;
pub use error::{TransportError, TransportResult};
