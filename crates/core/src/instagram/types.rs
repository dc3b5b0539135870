//! Types for the Instagram Graph API module.

use serde::{Deserialize, Serialize};

/// Processing state of a media container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerStatus {
    /// Still processing.
    InProgress,
    /// Ready to publish.
    Finished,
    /// Already published.
    Published,
    /// Processing failed.
    Error,
    /// Container expired before being published.
    Expired,
    /// A status code this client does not know.
    Unknown(String),
}

impl ContainerStatus {
    /// Parses the Graph API `status_code` field.
    pub fn from_code(code: &str) -> Self {
        match code {
            "IN_PROGRESS" => Self::InProgress,
            "FINISHED" => Self::Finished,
            "PUBLISHED" => Self::Published,
            "ERROR" => Self::Error,
            "EXPIRED" => Self::Expired,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether the container can be published.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Finished | Self::Published)
    }

    /// Whether waiting longer cannot help.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, Self::Error | Self::Expired)
    }
}

/// A published post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedPost {
    /// Media id of the published post.
    pub media_id: String,
}

/// An Instagram business account reachable from a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgAccount {
    /// Facebook page id.
    pub page_id: String,
    /// Facebook page name.
    pub page_name: String,
    /// Linked Instagram business account id, when the page has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ig_user_id: Option<String>,
    /// Instagram username, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ig_username: Option<String>,
}
