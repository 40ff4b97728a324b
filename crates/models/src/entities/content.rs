use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ContentId, Metadata};

/// Content ingested by the backend that chats can refer to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Server-assigned identifier
    pub id: ContentId,
    /// Display title
    pub title: String,
    /// Kind of source the content came from
    pub content_type: ContentType,
    /// Where the content was fetched from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Extracted text (e.g. a transcript)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_text: Option<String>,
    /// Free-form metadata
    #[serde(default, alias = "content_metadata", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Creation timestamp
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    #[serde(with = "crate::timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Content type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "youtube")]
    Video,
    #[serde(rename = "article")]
    Article,
    #[serde(rename = "pdf")]
    Document,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Video => "youtube",
            ContentType::Article => "article",
            ContentType::Document => "pdf",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ContentItem {
    pub fn is_video(&self) -> bool {
        matches!(self.content_type, ContentType::Video)
    }

    /// Value stored under `key` in the metadata, if any.
    pub fn metadata_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.as_ref().and_then(|metadata| metadata.get(key))
    }
}
