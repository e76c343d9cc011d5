//! Core value objects shared across the domain and application layers.

use crate::CoreError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Value object: Flow ID
    FlowId
);
entity_id!(
    /// Value object: Node ID
    NodeId
);
entity_id!(
    /// Value object: Edge ID
    EdgeId
);
entity_id!(
    /// Value object: Comment ID
    CommentId
);
entity_id!(
    /// Value object: Document metadata ID
    DocumentId
);
entity_id!(
    /// Value object: Link ID
    LinkId
);
entity_id!(
    /// Value object: Kanban board ID
    BoardId
);
entity_id!(
    /// Value object: Kanban card ID
    CardId
);
entity_id!(
    /// Value object: User ID (issued by the external auth service)
    UserId
);
entity_id!(
    /// Value object: Client timeline ID
    ClientTimelineId
);
entity_id!(
    /// Value object: Timeline item ID
    TimelineItemId
);
entity_id!(
    /// Value object: Timeline template ID
    TemplateId
);
entity_id!(
    /// Value object: Indication (referral) ID
    IndicationId
);

/// A point in free-floating canvas coordinate space.
///
/// Canvas units carry no scheduling meaning; the date ruler above the canvas
/// is purely decorative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Construct a position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Node dimensions in canvas units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Construct a size
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The authentication capability consumed from the external auth service:
/// "who is the current user" and "are they an admin".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Current user id
    pub user_id: UserId,
    /// Whether the caller holds the admin capability
    pub is_admin: bool,
}

impl AuthContext {
    /// An admin caller
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }

    /// A non-admin (client) caller
    pub fn client(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    /// Reject the caller unless they hold the admin capability
    pub fn require_admin(&self, action: &str) -> Result<(), CoreError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(CoreError::Unauthorized(format!(
                "{} requires admin capability",
                action
            )))
        }
    }
}
