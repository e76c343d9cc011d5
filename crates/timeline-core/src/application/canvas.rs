//! Canvas controller: the headless engine behind the graph canvas.
//!
//! Holds the loaded flow as an in-memory arena (nodes keyed by id, edges in
//! insertion order) plus the viewport and selection, and mediates every
//! mutation through the repositories. Position drags apply optimistically
//! and revert to the last persisted position if the write fails, so the
//! arena never drifts from the store.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use timeline_content_store::BlobStorage;

use crate::domain::edge::Edge;
use crate::domain::flow::Flow;
use crate::domain::node::Node;
use crate::domain::repository::Repositories;
use crate::error::{CoreError, CoreResult};
use crate::types::{EdgeId, FlowId, NodeId, Position};

use super::viewport::{minimap_view, MinimapView, Viewport};

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// A user-facing message produced by a canvas operation
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }
}

/// In-memory arena for the loaded flow
#[derive(Debug, Default)]
pub struct GraphState {
    pub flow: Option<Flow>,
    nodes: HashMap<NodeId, Node>,
    /// Insertion order preserved for stable rendering
    node_order: Vec<NodeId>,
    edges: Vec<Edge>,
}

impl GraphState {
    fn load(&mut self, flow: Flow, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.flow = Some(flow);
        self.node_order = nodes.iter().map(|n| n.id).collect();
        self.nodes = nodes.into_iter().map(|n| (n.id, n)).collect();
        self.edges = edges;
    }

    /// Nodes in their load order (x ascending, insertion breaking ties)
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn insert_node(&mut self, node: Node) {
        self.node_order.push(node.id);
        self.nodes.insert(node.id, node);
    }

    /// Remove a node and every edge touching it
    fn remove_node(&mut self, id: NodeId) {
        self.nodes.remove(&id);
        self.node_order.retain(|n| *n != id);
        self.edges.retain(|e| !e.touches(id));
    }
}

/// Headless canvas engine over one flow
#[derive(Debug)]
pub struct CanvasController {
    repos: Repositories,
    blob_store: Arc<dyn BlobStorage>,
    state: GraphState,
    pub viewport: Viewport,
    selected: Option<NodeId>,
    notifications: Vec<Notification>,
}

impl CanvasController {
    pub fn new(repos: Repositories, blob_store: Arc<dyn BlobStorage>) -> Self {
        Self {
            repos,
            blob_store,
            state: GraphState::default(),
            viewport: Viewport::default(),
            selected: None,
            notifications: Vec::new(),
        }
    }

    /// Load a flow and its graph into the arena, replacing any prior content
    pub async fn open(&mut self, flow_id: FlowId) -> CoreResult<()> {
        let flow = self.repos.flows.get_flow(flow_id).await?;
        let nodes = self.repos.nodes.list_nodes(flow_id).await?;
        let edges = self.repos.edges.list_edges(flow_id).await?;
        debug!(%flow_id, nodes = nodes.len(), edges = edges.len(), "flow loaded");
        self.state.load(flow, nodes, edges);
        self.selected = None;
        Ok(())
    }

    /// Re-fetch the open flow from the store
    pub async fn reload(&mut self) -> CoreResult<()> {
        let flow_id = self.open_flow_id()?;
        self.open(flow_id).await
    }

    /// The loaded graph
    pub fn state(&self) -> &GraphState {
        &self.state
    }

    /// Currently selected node, if any
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Select a node (a click); selecting an unknown id clears selection
    pub fn node_click(&mut self, id: NodeId) -> Option<&Node> {
        if self.state.nodes.contains_key(&id) {
            self.selected = Some(id);
            self.state.nodes.get(&id)
        } else {
            self.selected = None;
            None
        }
    }

    /// Clear the selection (a background click)
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Place a node created elsewhere (the add-node menu) into the arena
    pub(crate) fn insert_node(&mut self, node: Node) {
        self.state.insert_node(node);
    }

    /// Finish a drag: apply the new position optimistically, persist it, and
    /// revert to the last persisted position if the write fails.
    pub async fn node_drag_end(&mut self, id: NodeId, position: Position) -> CoreResult<()> {
        let previous = match self.state.nodes.get_mut(&id) {
            Some(node) => {
                let previous = node.position;
                node.set_position(position);
                previous
            }
            None => return Err(CoreError::NotFound(format!("node {}", id))),
        };

        match self.repos.nodes.update_node_position(id, position).await {
            Ok(()) => Ok(()),
            Err(err) => {
                if let Some(node) = self.state.nodes.get_mut(&id) {
                    node.set_position(previous);
                }
                warn!(%id, error = %err, "position update failed, reverted");
                self.notifications
                    .push(Notification::warning("Could not save node position"));
                Err(err)
            }
        }
    }

    /// Connect two nodes with a new edge.
    ///
    /// Duplicate pairs and self-loops pass through; the store rejects
    /// dangling endpoints, in which case the arena's edges are re-fetched to
    /// heal any divergence.
    pub async fn connect(&mut self, source: NodeId, target: NodeId) -> CoreResult<Edge> {
        let flow_id = self.open_flow_id()?;
        let edge = Edge::new(flow_id, source, target);
        match self.repos.edges.create_edge(&edge).await {
            Ok(()) => {
                self.state.edges.push(edge.clone());
                Ok(edge)
            }
            Err(err @ CoreError::Referential(_)) => {
                self.notifications
                    .push(Notification::error("Connection endpoint no longer exists"));
                self.state.edges = self.repos.edges.list_edges(flow_id).await?;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Delete a node: cascades in the store to its edges and sub-resources,
    /// then mirrors the cascade in the arena and removes document payloads
    /// from the blob store (best effort).
    pub async fn delete_node(&mut self, id: NodeId) -> CoreResult<()> {
        let blob_paths = self.repos.nodes.delete_node(id).await?;
        self.state.remove_node(id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        for path in blob_paths {
            if let Err(err) = self.blob_store.remove(&path).await {
                warn!(%id, path, error = %err, "orphaned blob left behind");
            }
        }
        Ok(())
    }

    /// Delete one edge without touching its endpoint nodes
    pub async fn remove_edge(&mut self, id: EdgeId) -> CoreResult<()> {
        self.repos.edges.delete_edge(id).await?;
        self.state.edges.retain(|e| e.id != id);
        Ok(())
    }

    /// Fit the viewport to the loaded graph
    pub fn fit_view(&mut self, screen_width: f64, screen_height: f64) {
        let nodes: Vec<Node> = self.state.nodes().cloned().collect();
        self.viewport.fit_to_nodes(&nodes, screen_width, screen_height);
    }

    /// Minimap projection of the loaded graph for a panel of the given size
    pub fn minimap(
        &self,
        screen_width: f64,
        screen_height: f64,
        panel_width: f64,
        panel_height: f64,
    ) -> Option<MinimapView> {
        let nodes: Vec<Node> = self.state.nodes().cloned().collect();
        minimap_view(
            &nodes,
            &self.viewport,
            screen_width,
            screen_height,
            panel_width,
            panel_height,
        )
    }

    /// Drain pending user-facing notifications
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub(crate) fn repos(&self) -> &Repositories {
        &self.repos
    }

    pub(crate) fn open_flow_id(&self) -> CoreResult<FlowId> {
        self.state
            .flow
            .as_ref()
            .map(|f| f.id)
            .ok_or_else(|| CoreError::Validation("no flow is open".to_string()))
    }
}
