//! Repository traits abstracting the persistence backend.
//!
//! Implementations live in backend crates (in-memory today) and are injected
//! behind `Arc<dyn Trait>`. All methods return `CoreError::StateStore` for
//! backend failures and the domain-level variants (`NotFound`, `Referential`)
//! for semantic ones, so callers never see backend detail.

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::domain::edge::Edge;
use crate::domain::flow::Flow;
use crate::domain::kanban::{BoardWithCards, KanbanBoard, KanbanCard};
use crate::domain::node::{Node, NodeUpdate};
use crate::domain::subresource::{Comment, DocumentMeta, Link};
use crate::domain::timeline::{
    ClientTimeline, Indication, Profile, TemplateItem, TimelineItem, TimelineTemplate,
};
use crate::error::CoreResult;
use crate::types::{
    BoardId, CardId, ClientTimelineId, DocumentId, EdgeId, FlowId, IndicationId, LinkId, NodeId,
    Position, TemplateId, TimelineItemId, UserId,
};

/// Flow persistence
#[async_trait]
pub trait FlowRepository: Send + Sync + Debug {
    async fn save_flow(&self, flow: &Flow) -> CoreResult<()>;

    /// Fetch a flow by id, `NotFound` if absent
    async fn get_flow(&self, id: FlowId) -> CoreResult<Flow>;

    async fn list_flows(&self) -> CoreResult<Vec<Flow>>;

    /// Delete a flow and everything it contains (nodes, edges, sub-resources)
    async fn delete_flow(&self, id: FlowId) -> CoreResult<()>;
}

/// Node persistence.
///
/// Listing is ordered by x coordinate ascending, insertion order breaking
/// ties, so callers render a stable left-to-right sequence.
#[async_trait]
pub trait NodeRepository: Send + Sync + Debug {
    /// Insert a node; rejects with `Referential` if the flow does not exist
    async fn create_node(&self, node: &Node) -> CoreResult<()>;

    /// Fetch a node by id, `NotFound` if absent
    async fn get_node(&self, id: NodeId) -> CoreResult<Node>;

    /// All nodes of a flow, ordered by x ascending then insertion order
    async fn list_nodes(&self, flow_id: FlowId) -> CoreResult<Vec<Node>>;

    /// Apply a partial update, returning the updated node
    async fn update_node(&self, id: NodeId, update: NodeUpdate) -> CoreResult<Node>;

    /// Persist a new canvas position
    async fn update_node_position(&self, id: NodeId, position: Position) -> CoreResult<()>;

    /// Delete a node, cascading to its edges and all sub-resources.
    ///
    /// Returns the blob storage paths of the node's documents so the caller
    /// can remove the payloads from the blob store afterwards.
    async fn delete_node(&self, id: NodeId) -> CoreResult<Vec<String>>;
}

/// Edge persistence
#[async_trait]
pub trait EdgeRepository: Send + Sync + Debug {
    /// Insert an edge; rejects with `Referential` unless both endpoints
    /// exist in the edge's flow
    async fn create_edge(&self, edge: &Edge) -> CoreResult<()>;

    /// All edges of a flow, in insertion order
    async fn list_edges(&self, flow_id: FlowId) -> CoreResult<Vec<Edge>>;

    /// Delete a single edge, `NotFound` if absent
    async fn delete_edge(&self, id: EdgeId) -> CoreResult<()>;
}

/// Comment persistence (append-only per node)
#[async_trait]
pub trait CommentRepository: Send + Sync + Debug {
    /// Insert a comment; rejects with `Referential` if the node is absent
    async fn create_comment(&self, comment: &Comment) -> CoreResult<()>;

    /// Comments of a node in creation order
    async fn list_comments(&self, node_id: NodeId) -> CoreResult<Vec<Comment>>;
}

/// Document metadata persistence (payloads live in the blob store)
#[async_trait]
pub trait DocumentRepository: Send + Sync + Debug {
    /// Insert a metadata row; rejects with `Referential` if the node is absent
    async fn create_document(&self, document: &DocumentMeta) -> CoreResult<()>;

    /// Fetch one metadata row, `NotFound` if absent
    async fn get_document(&self, id: DocumentId) -> CoreResult<DocumentMeta>;

    /// Documents of a node, newest first
    async fn list_documents(&self, node_id: NodeId) -> CoreResult<Vec<DocumentMeta>>;

    /// Delete a metadata row, `NotFound` if absent
    async fn delete_document(&self, id: DocumentId) -> CoreResult<()>;
}

/// Link persistence
#[async_trait]
pub trait LinkRepository: Send + Sync + Debug {
    /// Insert a link; rejects with `Referential` if the node is absent
    async fn create_link(&self, link: &Link) -> CoreResult<()>;

    /// Links of a node, newest first
    async fn list_links(&self, node_id: NodeId) -> CoreResult<Vec<Link>>;

    /// Delete a link, `NotFound` if absent
    async fn delete_link(&self, id: LinkId) -> CoreResult<()>;
}

/// Kanban board/card persistence
#[async_trait]
pub trait KanbanRepository: Send + Sync + Debug {
    /// Insert a board; rejects with `Referential` if the node is absent
    async fn create_board(&self, board: &KanbanBoard) -> CoreResult<()>;

    /// Boards of a node with their cards, both by position ascending
    async fn list_boards_with_cards(&self, node_id: NodeId) -> CoreResult<Vec<BoardWithCards>>;

    /// Delete a board and its cards, `NotFound` if absent
    async fn delete_board(&self, id: BoardId) -> CoreResult<()>;

    /// Insert a card; rejects with `Referential` if the board is absent
    async fn create_card(&self, card: &KanbanCard) -> CoreResult<()>;

    /// Replace a card's mutable fields, returning the updated card
    async fn update_card(&self, card: &KanbanCard) -> CoreResult<KanbanCard>;

    /// Fetch one card, `NotFound` if absent
    async fn get_card(&self, id: CardId) -> CoreResult<KanbanCard>;

    /// Delete a card, `NotFound` if absent
    async fn delete_card(&self, id: CardId) -> CoreResult<()>;
}

/// Client timeline and item persistence
#[async_trait]
pub trait TimelineRepository: Send + Sync + Debug {
    async fn create_timeline(&self, timeline: &ClientTimeline) -> CoreResult<()>;

    /// Fetch a timeline by id, `NotFound` if absent
    async fn get_timeline(&self, id: ClientTimelineId) -> CoreResult<ClientTimeline>;

    /// Timelines assigned to one client, in creation order
    async fn list_timelines_for_client(&self, client_id: UserId) -> CoreResult<Vec<ClientTimeline>>;

    /// Delete a timeline and its items
    async fn delete_timeline(&self, id: ClientTimelineId) -> CoreResult<()>;

    /// Insert a batch of items; rejects with `Referential` if the timeline
    /// is absent
    async fn create_items(&self, items: &[TimelineItem]) -> CoreResult<()>;

    /// Fetch one item, `NotFound` if absent
    async fn get_item(&self, id: TimelineItemId) -> CoreResult<TimelineItem>;

    /// Items of a timeline by position ascending
    async fn list_items(&self, timeline_id: ClientTimelineId) -> CoreResult<Vec<TimelineItem>>;

    /// Replace an item's state, returning the updated item
    async fn update_item(&self, item: &TimelineItem) -> CoreResult<TimelineItem>;
}

/// Timeline template persistence
#[async_trait]
pub trait TemplateRepository: Send + Sync + Debug {
    async fn create_template(&self, template: &TimelineTemplate) -> CoreResult<()>;

    /// Fetch a template by id, `NotFound` if absent
    async fn get_template(&self, id: TemplateId) -> CoreResult<TimelineTemplate>;

    async fn list_templates(&self) -> CoreResult<Vec<TimelineTemplate>>;

    /// Delete a template and its items
    async fn delete_template(&self, id: TemplateId) -> CoreResult<()>;

    /// Insert a batch of template items; rejects with `Referential` if the
    /// template is absent
    async fn create_template_items(&self, items: &[TemplateItem]) -> CoreResult<()>;

    /// Items of a template by position ascending
    async fn list_template_items(&self, template_id: TemplateId) -> CoreResult<Vec<TemplateItem>>;
}

/// Referral indication persistence
#[async_trait]
pub trait IndicationRepository: Send + Sync + Debug {
    async fn create_indication(&self, indication: &Indication) -> CoreResult<()>;

    /// Fetch an indication by id, `NotFound` if absent
    async fn get_indication(&self, id: IndicationId) -> CoreResult<Indication>;

    /// Replace an indication's state, returning the updated row
    async fn update_indication(&self, indication: &Indication) -> CoreResult<Indication>;
}

/// Client profile persistence
#[async_trait]
pub trait ProfileRepository: Send + Sync + Debug {
    async fn create_profile(&self, profile: &Profile) -> CoreResult<()>;

    /// Fetch a profile by user id, `NotFound` if absent
    async fn get_profile(&self, user_id: UserId) -> CoreResult<Profile>;

    /// Atomically add points to a profile, returning the new balance
    async fn add_points(&self, user_id: UserId, points: i64) -> CoreResult<i64>;

    /// Delete a profile, `NotFound` if absent
    async fn delete_profile(&self, user_id: UserId) -> CoreResult<()>;
}

/// Account provisioning seam; the server wires an auth backend here.
///
/// Create/delete are paired so failed multi-step provisioning can undo the
/// account it created.
#[async_trait]
pub trait UserDirectory: Send + Sync + Debug {
    /// Create an account, returning the new user id. Rejects with
    /// `Validation` for malformed emails or passwords shorter than 6
    /// characters, `Conflict` for a duplicate email.
    async fn create_user(&self, email: &str, password: &str) -> CoreResult<UserId>;

    /// Remove an account, `NotFound` if absent
    async fn delete_user(&self, user_id: UserId) -> CoreResult<()>;
}

/// The full set of repositories the application layer operates on.
///
/// One backend typically implements every trait; this bundle keeps the
/// constructor signatures manageable.
#[derive(Debug, Clone)]
pub struct Repositories {
    pub flows: Arc<dyn FlowRepository>,
    pub nodes: Arc<dyn NodeRepository>,
    pub edges: Arc<dyn EdgeRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub documents: Arc<dyn DocumentRepository>,
    pub links: Arc<dyn LinkRepository>,
    pub kanban: Arc<dyn KanbanRepository>,
    pub timelines: Arc<dyn TimelineRepository>,
    pub templates: Arc<dyn TemplateRepository>,
    pub indications: Arc<dyn IndicationRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
}
