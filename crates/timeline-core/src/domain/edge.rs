//! Edge: a directed, labelled connection between two nodes in one flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EdgeId, FlowId, NodeId};

/// Default stroke color for new connections
pub const DEFAULT_EDGE_COLOR: &str = "#94a3b8";

/// A directed connection between two nodes.
///
/// Source and target must reference existing nodes in the same flow; the
/// store enforces that on creation. Self-loops and duplicate ordered pairs
/// are tolerated; the model carries no uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier
    pub id: EdgeId,
    /// Owning flow
    pub flow_id: FlowId,
    /// Node the edge starts from
    pub source_node_id: NodeId,
    /// Node the edge points to
    pub target_node_id: NodeId,
    /// Optional label rendered along the edge
    pub label: Option<String>,
    /// Stroke color (hex), presentation only
    pub color: String,
    /// Animated stroke, presentation only
    pub animated: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Edge {
    /// Create a new edge with default presentation
    pub fn new(flow_id: FlowId, source_node_id: NodeId, target_node_id: NodeId) -> Self {
        Self {
            id: EdgeId::new(),
            flow_id,
            source_node_id,
            target_node_id,
            label: None,
            color: DEFAULT_EDGE_COLOR.to_string(),
            animated: false,
            created_at: Utc::now(),
        }
    }

    /// Whether the edge touches the given node as source or target
    pub fn touches(&self, node_id: NodeId) -> bool {
        self.source_node_id == node_id || self.target_node_id == node_id
    }
}
