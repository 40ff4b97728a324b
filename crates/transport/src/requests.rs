//! Request bodies sent to the backend.

use serde::Serialize;
use tubechat_models::UserId;

#[derive(Debug, Clone, Serialize)]
pub struct CreateChatRequest {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestVideoRequest<'a> {
    pub video_url: &'a str,
}
