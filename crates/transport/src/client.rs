use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use tubechat_config::ApiConfig;
use tubechat_models::{ChatId, ChatResponse, ChatSession, ContentId, ContentItem, UserId};

use crate::api::{ChatApi, ContentApi};
use crate::error::{TransportError, TransportResult};
use crate::requests::{CreateChatRequest, IngestVideoRequest, SendMessageRequest};

/// reqwest-backed client for the chat backend's REST API.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig) -> TransportResult<Self> {
        let base_url = normalise_base_url(&config.base_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        debug!(%base_url, timeout_seconds = config.request_timeout_seconds, "http api client ready");

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "dispatching request");
        self.client.request(method, url)
    }

    async fn dispatch(&self, request: RequestBuilder) -> TransportResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);
        warn!(status = status.as_u16(), ?detail, "backend rejected request");
        Err(TransportError::status(status.as_u16(), detail))
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> TransportResult<T> {
        let response = self.dispatch(request).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| TransportError::decode(endpoint, source))
    }
}

fn normalise_base_url(raw: &str) -> TransportResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(trimmed).map_err(|err| TransportError::InvalidBaseUrl {
        url: raw.to_string(),
        message: err.to_string(),
    })?;
    Ok(trimmed.to_string())
}

/// Pull the backend's `detail` field out of an error body.
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::Null => None,
        Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl ContentApi for HttpApiClient {
    async fn ingest_video(&self, video_url: &str) -> TransportResult<ContentItem> {
        let request = self
            .request(Method::POST, "/content/youtube")
            .json(&IngestVideoRequest { video_url });
        self.fetch_json("POST /content/youtube", request).await
    }

    async fn list_contents(&self) -> TransportResult<Vec<ContentItem>> {
        let request = self.request(Method::GET, "/content");
        self.fetch_json("GET /content", request).await
    }

    async fn fetch_content(&self, id: ContentId) -> TransportResult<ContentItem> {
        let request = self.request(Method::GET, &format!("/content/{id}"));
        self.fetch_json("GET /content/{id}", request).await
    }

    async fn delete_content(&self, id: ContentId) -> TransportResult<()> {
        let request = self.request(Method::DELETE, &format!("/content/{id}"));
        self.dispatch(request).await?;
        Ok(())
    }
}

#[async_trait]
impl ChatApi for HttpApiClient {
    async fn create_chat(&self, user_id: UserId) -> TransportResult<ChatSession> {
        let request = self
            .request(Method::POST, "/chat")
            .json(&CreateChatRequest { user_id });
        self.fetch_json("POST /chat", request).await
    }

    async fn fetch_chat(&self, chat_id: ChatId) -> TransportResult<ChatSession> {
        let request = self.request(Method::GET, &format!("/chat/{chat_id}"));
        self.fetch_json("GET /chat/{id}", request).await
    }

    async fn list_user_chats(&self, user_id: UserId) -> TransportResult<Vec<ChatSession>> {
        let request = self.request(Method::GET, &format!("/chat/user/{user_id}"));
        self.fetch_json("GET /chat/user/{id}", request).await
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        message: &str,
        video_id: Option<&str>,
    ) -> TransportResult<ChatResponse> {
        let request = self
            .request(Method::POST, &format!("/chat/{chat_id}/message"))
            .json(&SendMessageRequest { message, video_id });
        self.fetch_json("POST /chat/{id}/message", request).await
    }
}
