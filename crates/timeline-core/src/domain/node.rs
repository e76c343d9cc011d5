//! Node aggregate: a typed, positioned visual unit on the canvas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{FlowId, NodeId, Position, Size, UserId};

use super::node_type::NodeType;

/// Visual outline of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    Rounded,
    Rectangle,
    Circle,
    Diamond,
    Hexagon,
}

/// A node placed on a flow canvas.
///
/// Position is always defined once created; nodes may overlap freely (no
/// collision constraint). Presentation fields (color, glow, shape) carry no
/// behavior beyond rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,
    /// Owning flow
    pub flow_id: FlowId,
    /// Declared type, resolved through the node type registry for rendering
    pub node_type: NodeType,
    /// Title shown on the canvas
    pub title: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Canvas position (free units, no scheduling meaning)
    pub position: Position,
    /// Explicit size; `None` means the registry default for the type
    pub size: Option<Size>,
    /// Fill color (hex)
    pub color: String,
    /// Glow color (hex)
    pub glow_color: String,
    /// Outline shape
    pub shape: NodeShape,
    /// User who created the node
    pub created_by: UserId,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Field subset applied by the detail editor in a single atomic update.
///
/// `None` fields are left untouched; `description` uses a nested option so an
/// update can clear it explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdate {
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    pub color: Option<String>,
    pub glow_color: Option<String>,
    pub shape: Option<NodeShape>,
    pub size: Option<Size>,
}

impl Node {
    /// Create a node of the given type at a canvas position, taking default
    /// color, glow, shape and size from the node type registry.
    pub fn new(
        flow_id: FlowId,
        node_type: NodeType,
        title: impl Into<String>,
        position: Position,
        created_by: UserId,
    ) -> Self {
        let descriptor = node_type.descriptor();
        let now = Utc::now();
        Self {
            id: NodeId::new(),
            flow_id,
            node_type,
            title: title.into(),
            description: None,
            position,
            size: None,
            color: descriptor.default_color.to_string(),
            glow_color: descriptor.default_glow_color.to_string(),
            shape: descriptor.default_shape,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Effective size: the explicit one, or the registry default for the type
    pub fn effective_size(&self) -> Size {
        self.size.unwrap_or(self.node_type.descriptor().default_size)
    }

    /// Apply an editor update atomically
    pub fn apply_update(&mut self, update: &NodeUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(color) = &update.color {
            self.color = color.clone();
        }
        if let Some(glow_color) = &update.glow_color {
            self.glow_color = glow_color.clone();
        }
        if let Some(shape) = update.shape {
            self.shape = shape;
        }
        if let Some(size) = update.size {
            self.size = Some(size);
        }
        self.updated_at = Utc::now();
    }

    /// Move the node to a new canvas position
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
        self.updated_at = Utc::now();
    }
}
