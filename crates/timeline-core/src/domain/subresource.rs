//! Node sub-resources: comments, document metadata and links.
//!
//! Each is owned exclusively by one node and removed when the node is
//! deleted. Document binary payloads live in the blob store; the row here is
//! metadata only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CommentId, DocumentId, LinkId, NodeId, UserId};

/// Append-only comment on a node, listed in creation order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub node_id: NodeId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Create a comment authored by the given user
    pub fn new(node_id: NodeId, author_id: UserId, content: impl Into<String>) -> Self {
        Self {
            id: CommentId::new(),
            node_id,
            author_id,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Metadata row for a document whose payload lives in the blob store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub id: DocumentId,
    pub node_id: NodeId,
    pub title: String,
    /// Blob store path; partitioned by node id
    pub storage_path: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub uploaded_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl DocumentMeta {
    /// Create a metadata row for an uploaded blob
    pub fn new(
        node_id: NodeId,
        title: impl Into<String>,
        storage_path: impl Into<String>,
        mime_type: impl Into<String>,
        size_bytes: u64,
        uploaded_by: UserId,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            node_id,
            title: title.into(),
            storage_path: storage_path.into(),
            mime_type: mime_type.into(),
            size_bytes,
            uploaded_by,
            created_at: Utc::now(),
        }
    }
}

/// How a link should be presented to a viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPresentation {
    /// Video-hosting URL: rendered with an inline player dialog
    InlinePlayer,
    /// Anything else: opened in a new tab
    NewTab,
}

/// External link attached to a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub node_id: NodeId,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Create a link attached to a node
    pub fn new(
        node_id: NodeId,
        title: impl Into<String>,
        url: impl Into<String>,
        description: Option<String>,
        created_by: UserId,
    ) -> Self {
        Self {
            id: LinkId::new(),
            node_id,
            title: title.into(),
            url: url.into(),
            description,
            created_by,
            created_at: Utc::now(),
        }
    }

    /// Whether the URL matches a recognized video-hosting pattern.
    ///
    /// A presentation rule only; the data model does not distinguish video
    /// links from plain ones.
    pub fn is_video_url(&self) -> bool {
        is_video_url(&self.url)
    }

    /// Presentation chosen for this link
    pub fn presentation(&self) -> LinkPresentation {
        if self.is_video_url() {
            LinkPresentation::InlinePlayer
        } else {
            LinkPresentation::NewTab
        }
    }
}

/// Recognized video-hosting URL patterns
pub fn is_video_url(url: &str) -> bool {
    let lowered = url.to_ascii_lowercase();
    const VIDEO_HOST_PATTERNS: [&str; 4] = [
        "youtube.com/watch",
        "youtube.com/embed/",
        "youtu.be/",
        "vimeo.com/",
    ];
    VIDEO_HOST_PATTERNS
        .iter()
        .any(|pattern| lowered.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_urls_render_inline() {
        let node_id = NodeId::new();
        let user = UserId::new();
        let video = Link::new(
            node_id,
            "Walkthrough",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            None,
            user,
        );
        let short = Link::new(node_id, "Short", "https://youtu.be/dQw4w9WgXcQ", None, user);
        let vimeo = Link::new(node_id, "Review", "https://vimeo.com/123456", None, user);
        let plain = Link::new(node_id, "Docs", "https://example.com/docs", None, user);

        assert_eq!(video.presentation(), LinkPresentation::InlinePlayer);
        assert_eq!(short.presentation(), LinkPresentation::InlinePlayer);
        assert_eq!(vimeo.presentation(), LinkPresentation::InlinePlayer);
        assert_eq!(plain.presentation(), LinkPresentation::NewTab);
    }

    #[test]
    fn detection_is_case_insensitive() {
        assert!(is_video_url("HTTPS://YOUTU.BE/abc"));
        assert!(!is_video_url("https://example.com/youtube-tips"));
    }
}
