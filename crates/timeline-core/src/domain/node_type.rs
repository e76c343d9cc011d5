//! Node Type Registry
//!
//! Maps a node's declared type to its rendering/interaction descriptor. The
//! canvas engine and the add-node menu never branch on a node type directly;
//! they look up the descriptor here. Adding a node type means adding a
//! variant, an `ALL` entry and a `descriptor()` arm; the match is exhaustive
//! so the compiler flags anything missed.

use crate::types::Size;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::node::NodeShape;

/// The closed set of node types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Service,
    Product,
    Deliverable,
    Link,
    Document,
    Media,
    Youtube,
    Kanban,
    Milestone,
    Custom,
}

/// Rendering/interaction descriptor for a node type
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeTypeDescriptor {
    /// Human-readable label used for add-node menu entries and placeholder titles
    pub label: &'static str,
    /// Icon name resolved by the front end
    pub icon: &'static str,
    /// Default fill color (hex)
    pub default_color: &'static str,
    /// Default glow color (hex)
    pub default_glow_color: &'static str,
    /// Default shape on creation
    pub default_shape: NodeShape,
    /// Default size when the node does not carry one
    pub default_size: Size,
    /// Whether the detail editor shows a kanban tab for this type
    pub has_kanban_tab: bool,
}

impl NodeType {
    /// All registered node types, in add-node menu order
    pub const ALL: [NodeType; 10] = [
        NodeType::Service,
        NodeType::Product,
        NodeType::Deliverable,
        NodeType::Link,
        NodeType::Document,
        NodeType::Media,
        NodeType::Youtube,
        NodeType::Kanban,
        NodeType::Milestone,
        NodeType::Custom,
    ];

    /// Registry lookup for this type
    pub fn descriptor(&self) -> NodeTypeDescriptor {
        match self {
            NodeType::Service => NodeTypeDescriptor {
                label: "Service",
                icon: "briefcase",
                default_color: "#3b82f6",
                default_glow_color: "#93c5fd",
                default_shape: NodeShape::Rounded,
                default_size: Size::new(180.0, 80.0),
                has_kanban_tab: false,
            },
            NodeType::Product => NodeTypeDescriptor {
                label: "Product",
                icon: "package",
                default_color: "#8b5cf6",
                default_glow_color: "#c4b5fd",
                default_shape: NodeShape::Rounded,
                default_size: Size::new(180.0, 80.0),
                has_kanban_tab: false,
            },
            NodeType::Deliverable => NodeTypeDescriptor {
                label: "Deliverable",
                icon: "target",
                default_color: "#10b981",
                default_glow_color: "#6ee7b7",
                default_shape: NodeShape::Rectangle,
                default_size: Size::new(180.0, 80.0),
                has_kanban_tab: false,
            },
            NodeType::Link => NodeTypeDescriptor {
                label: "Link",
                icon: "link",
                default_color: "#06b6d4",
                default_glow_color: "#67e8f9",
                default_shape: NodeShape::Rounded,
                default_size: Size::new(160.0, 64.0),
                has_kanban_tab: false,
            },
            NodeType::Document => NodeTypeDescriptor {
                label: "Document",
                icon: "file-text",
                default_color: "#f59e0b",
                default_glow_color: "#fcd34d",
                default_shape: NodeShape::Rectangle,
                default_size: Size::new(160.0, 64.0),
                has_kanban_tab: false,
            },
            NodeType::Media => NodeTypeDescriptor {
                label: "Media",
                icon: "image",
                default_color: "#ec4899",
                default_glow_color: "#f9a8d4",
                default_shape: NodeShape::Rounded,
                default_size: Size::new(200.0, 120.0),
                has_kanban_tab: false,
            },
            NodeType::Youtube => NodeTypeDescriptor {
                label: "YouTube",
                icon: "youtube",
                default_color: "#ef4444",
                default_glow_color: "#fca5a5",
                default_shape: NodeShape::Rectangle,
                default_size: Size::new(200.0, 120.0),
                has_kanban_tab: false,
            },
            NodeType::Kanban => NodeTypeDescriptor {
                label: "Kanban",
                icon: "kanban",
                default_color: "#6366f1",
                default_glow_color: "#a5b4fc",
                default_shape: NodeShape::Rectangle,
                default_size: Size::new(220.0, 140.0),
                has_kanban_tab: true,
            },
            NodeType::Milestone => NodeTypeDescriptor {
                label: "Milestone",
                icon: "flag",
                default_color: "#eab308",
                default_glow_color: "#fde047",
                default_shape: NodeShape::Diamond,
                default_size: Size::new(140.0, 60.0),
                has_kanban_tab: false,
            },
            NodeType::Custom => NodeTypeDescriptor {
                label: "Custom",
                icon: "puzzle",
                default_color: "#64748b",
                default_glow_color: "#cbd5e1",
                default_shape: NodeShape::Rounded,
                default_size: Size::new(180.0, 80.0),
                has_kanban_tab: false,
            },
        }
    }

    /// Stable string form used in persistence and over the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Service => "service",
            NodeType::Product => "product",
            NodeType::Deliverable => "deliverable",
            NodeType::Link => "link",
            NodeType::Document => "document",
            NodeType::Media => "media",
            NodeType::Youtube => "youtube",
            NodeType::Kanban => "kanban",
            NodeType::Milestone => "milestone",
            NodeType::Custom => "custom",
        }
    }

    /// Parse a stored/declared type string, falling back to `Custom` for
    /// anything unrecognized so rendering never fails on unknown data.
    pub fn parse_or_custom(value: &str) -> NodeType {
        match value {
            "service" => NodeType::Service,
            "product" => NodeType::Product,
            "deliverable" => NodeType::Deliverable,
            "link" => NodeType::Link,
            "document" => NodeType::Document,
            "media" => NodeType::Media,
            "youtube" => NodeType::Youtube,
            "kanban" => NodeType::Kanban,
            "milestone" => NodeType::Milestone,
            "custom" => NodeType::Custom,
            other => {
                tracing::debug!(node_type = other, "unknown node type, rendering as custom");
                NodeType::Custom
            }
        }
    }

    /// Strict parse used where an unknown type must be an error (add-node menu)
    pub fn parse_strict(value: &str) -> Option<NodeType> {
        let parsed = Self::parse_or_custom(value);
        if parsed == NodeType::Custom && value != "custom" {
            None
        } else {
            Some(parsed)
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        if value.is_empty() {
            return Err(D::Error::custom("node type must not be empty"));
        }
        // Unknown/missing types render with the custom descriptor instead of failing
        Ok(NodeType::parse_or_custom(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_all_ten_types() {
        assert_eq!(NodeType::ALL.len(), 10);
        for node_type in NodeType::ALL {
            let descriptor = node_type.descriptor();
            assert!(!descriptor.label.is_empty());
            assert!(descriptor.default_color.starts_with('#'));
            assert!(descriptor.default_glow_color.starts_with('#'));
        }
    }

    #[test]
    fn only_kanban_has_kanban_tab() {
        for node_type in NodeType::ALL {
            assert_eq!(
                node_type.descriptor().has_kanban_tab,
                node_type == NodeType::Kanban
            );
        }
    }

    #[test]
    fn string_roundtrip() {
        for node_type in NodeType::ALL {
            assert_eq!(NodeType::parse_or_custom(node_type.as_str()), node_type);
        }
    }

    #[test]
    fn unknown_type_falls_back_to_custom() {
        assert_eq!(NodeType::parse_or_custom("gantt"), NodeType::Custom);
        assert_eq!(NodeType::parse_strict("gantt"), None);
        assert_eq!(NodeType::parse_strict("kanban"), Some(NodeType::Kanban));

        let parsed: NodeType = serde_json::from_str("\"hologram\"").unwrap();
        assert_eq!(parsed, NodeType::Custom);
    }
}
