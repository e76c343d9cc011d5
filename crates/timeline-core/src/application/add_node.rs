//! Add-node menu: the palette of node types and admin-gated node creation.

use tracing::info;

use crate::domain::node::Node;
use crate::domain::node_type::NodeType;
use crate::error::CoreResult;
use crate::types::{AuthContext, Position};

use super::canvas::CanvasController;

/// One selectable entry in the add-node menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub node_type: NodeType,
    pub label: &'static str,
    pub icon: &'static str,
}

/// Every registered node type, in registry order
pub fn entries() -> Vec<MenuEntry> {
    NodeType::ALL
        .iter()
        .map(|node_type| {
            let descriptor = node_type.descriptor();
            MenuEntry {
                node_type: *node_type,
                label: descriptor.label,
                icon: descriptor.icon,
            }
        })
        .collect()
}

/// Create a node of the chosen type at a canvas position.
///
/// Admin only. The node takes the registry defaults for its type and a
/// placeholder title derived from the type label.
pub async fn create_at(
    canvas: &mut CanvasController,
    auth: &AuthContext,
    node_type: NodeType,
    position: Position,
) -> CoreResult<Node> {
    auth.require_admin("create node")?;
    let flow_id = canvas.open_flow_id()?;

    let descriptor = node_type.descriptor();
    let node = Node::new(
        flow_id,
        node_type,
        format!("New {}", descriptor.label),
        position,
        auth.user_id,
    );

    canvas.repos().nodes.create_node(&node).await?;
    info!(node_id = %node.id, %flow_id, node_type = %node_type, "node created");
    canvas.insert_node(node.clone());
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_lists_every_registered_type() {
        let entries = entries();
        assert_eq!(entries.len(), NodeType::ALL.len());
        assert!(entries.iter().any(|e| e.node_type == NodeType::Kanban));
        assert!(entries.iter().all(|e| !e.label.is_empty()));
    }
}
