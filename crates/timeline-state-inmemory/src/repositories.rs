//! DashMap-backed implementations of every repository trait.
//!
//! One [`InMemoryStore`] implements the whole set so cross-table cascades
//! (node deletion, flow deletion) happen inside a single store. Each table
//! tags rows with an insertion sequence number; listings sort by it so
//! creation order is stable regardless of map iteration order.

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use timeline_core::domain::edge::Edge;
use timeline_core::domain::flow::Flow;
use timeline_core::domain::kanban::{BoardWithCards, KanbanBoard, KanbanCard};
use timeline_core::domain::node::{Node, NodeUpdate};
use timeline_core::domain::repository::{
    CommentRepository, DocumentRepository, EdgeRepository, FlowRepository, IndicationRepository,
    KanbanRepository, LinkRepository, NodeRepository, ProfileRepository, Repositories,
    TemplateRepository, TimelineRepository, UserDirectory,
};
use timeline_core::domain::subresource::{Comment, DocumentMeta, Link};
use timeline_core::domain::timeline::{
    ClientTimeline, Indication, Profile, TemplateItem, TimelineItem, TimelineTemplate,
};
use timeline_core::error::{CoreError, CoreResult};
use timeline_core::types::{
    BoardId, CardId, ClientTimelineId, CommentId, DocumentId, EdgeId, FlowId, IndicationId,
    LinkId, NodeId, Position, TemplateId, TimelineItemId, UserId,
};

#[derive(Debug, Clone)]
struct Row<V> {
    seq: u64,
    value: V,
}

/// Concurrent table with a stable insertion order
#[derive(Debug)]
struct Table<K: Eq + Hash, V> {
    rows: DashMap<K, Row<V>>,
    seq: AtomicU64,
}

impl<K: Eq + Hash, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: DashMap::new(),
            seq: AtomicU64::new(0),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Table<K, V> {
    fn insert(&self, key: K, value: V) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.rows.insert(key, Row { seq, value });
    }

    /// Insert only if the key is vacant; `false` when it already exists
    fn try_insert(&self, key: K, value: V) -> bool {
        match self.rows.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                let seq = self.seq.fetch_add(1, Ordering::Relaxed);
                vacant.insert(Row { seq, value });
                true
            }
        }
    }

    /// Replace an existing row keeping its insertion slot, or insert fresh
    fn upsert(&self, key: K, value: V) {
        match self.rows.entry(key) {
            Entry::Occupied(mut occupied) => occupied.get_mut().value = value,
            Entry::Vacant(vacant) => {
                let seq = self.seq.fetch_add(1, Ordering::Relaxed);
                vacant.insert(Row { seq, value });
            }
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        self.rows.get(key).map(|row| row.value.clone())
    }

    fn contains(&self, key: &K) -> bool {
        self.rows.contains_key(key)
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.rows.remove(key).map(|(_, row)| row.value)
    }

    fn update<F: FnOnce(&mut V)>(&self, key: &K, apply: F) -> Option<V> {
        self.rows.get_mut(key).map(|mut row| {
            apply(&mut row.value);
            row.value.clone()
        })
    }

    /// Rows matching the filter, in insertion order
    fn select<F: Fn(&V) -> bool>(&self, filter: F) -> Vec<V> {
        let mut matched: Vec<(u64, V)> = self
            .rows
            .iter()
            .filter(|entry| filter(&entry.value))
            .map(|entry| (entry.seq, entry.value.clone()))
            .collect();
        matched.sort_by_key(|(seq, _)| *seq);
        matched.into_iter().map(|(_, value)| value).collect()
    }

    /// Remove every row matching the filter, returning the removed values
    fn remove_where<F: Fn(&V) -> bool>(&self, filter: F) -> Vec<V> {
        let keys: Vec<K> = self
            .rows
            .iter()
            .filter(|entry| filter(&entry.value))
            .map(|entry| entry.key().clone())
            .collect();
        keys.iter().filter_map(|key| self.remove(key)).collect()
    }
}

/// In-memory backend implementing every repository trait.
///
/// Useful for development, testing and single-process deployments; nothing
/// survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    flows: Table<FlowId, Flow>,
    nodes: Table<NodeId, Node>,
    edges: Table<EdgeId, Edge>,
    comments: Table<CommentId, Comment>,
    documents: Table<DocumentId, DocumentMeta>,
    links: Table<LinkId, Link>,
    boards: Table<BoardId, KanbanBoard>,
    cards: Table<CardId, KanbanCard>,
    timelines: Table<ClientTimelineId, ClientTimeline>,
    items: Table<TimelineItemId, TimelineItem>,
    templates: Table<TemplateId, TimelineTemplate>,
    template_items: Table<TimelineItemId, TemplateItem>,
    indications: Table<IndicationId, Indication>,
    profiles: Table<UserId, Profile>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle of `Arc` handles to this store, one per repository trait
    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            flows: self.clone(),
            nodes: self.clone(),
            edges: self.clone(),
            comments: self.clone(),
            documents: self.clone(),
            links: self.clone(),
            kanban: self.clone(),
            timelines: self.clone(),
            templates: self.clone(),
            indications: self.clone(),
            profiles: self.clone(),
        }
    }

    /// Remove a node and everything hanging off it, returning the blob
    /// storage paths of its documents
    fn cascade_remove_node(&self, id: NodeId) -> Vec<String> {
        self.edges.remove_where(|edge| edge.touches(id));
        self.comments.remove_where(|comment| comment.node_id == id);
        self.links.remove_where(|link| link.node_id == id);
        for board in self.boards.remove_where(|board| board.node_id == id) {
            self.cards.remove_where(|card| card.board_id == board.id);
        }
        self.documents
            .remove_where(|document| document.node_id == id)
            .into_iter()
            .map(|document| document.storage_path)
            .collect()
    }
}

#[async_trait]
impl FlowRepository for InMemoryStore {
    async fn save_flow(&self, flow: &Flow) -> CoreResult<()> {
        self.flows.upsert(flow.id, flow.clone());
        Ok(())
    }

    async fn get_flow(&self, id: FlowId) -> CoreResult<Flow> {
        self.flows
            .get(&id)
            .ok_or_else(|| CoreError::NotFound(format!("flow {}", id)))
    }

    async fn list_flows(&self) -> CoreResult<Vec<Flow>> {
        Ok(self.flows.select(|_| true))
    }

    async fn delete_flow(&self, id: FlowId) -> CoreResult<()> {
        self.flows
            .remove(&id)
            .ok_or_else(|| CoreError::NotFound(format!("flow {}", id)))?;
        let node_ids: Vec<NodeId> = self
            .nodes
            .remove_where(|node| node.flow_id == id)
            .into_iter()
            .map(|node| node.id)
            .collect();
        for node_id in node_ids {
            let orphaned = self.cascade_remove_node(node_id);
            if !orphaned.is_empty() {
                debug!(%node_id, blobs = orphaned.len(), "flow delete orphaned document blobs");
            }
        }
        self.edges.remove_where(|edge| edge.flow_id == id);
        Ok(())
    }
}

#[async_trait]
impl NodeRepository for InMemoryStore {
    async fn create_node(&self, node: &Node) -> CoreResult<()> {
        if !self.flows.contains(&node.flow_id) {
            return Err(CoreError::Referential(format!(
                "flow {} does not exist",
                node.flow_id
            )));
        }
        self.nodes.insert(node.id, node.clone());
        Ok(())
    }

    async fn get_node(&self, id: NodeId) -> CoreResult<Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| CoreError::NotFound(format!("node {}", id)))
    }

    async fn list_nodes(&self, flow_id: FlowId) -> CoreResult<Vec<Node>> {
        let mut nodes = self.nodes.select(|node| node.flow_id == flow_id);
        // Stable sort: insertion order breaks x ties.
        nodes.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
        Ok(nodes)
    }

    async fn update_node(&self, id: NodeId, update: NodeUpdate) -> CoreResult<Node> {
        self.nodes
            .update(&id, |node| node.apply_update(&update))
            .ok_or_else(|| CoreError::NotFound(format!("node {}", id)))
    }

    async fn update_node_position(&self, id: NodeId, position: Position) -> CoreResult<()> {
        self.nodes
            .update(&id, |node| node.set_position(position))
            .map(|_| ())
            .ok_or_else(|| CoreError::NotFound(format!("node {}", id)))
    }

    async fn delete_node(&self, id: NodeId) -> CoreResult<Vec<String>> {
        self.nodes
            .remove(&id)
            .ok_or_else(|| CoreError::NotFound(format!("node {}", id)))?;
        Ok(self.cascade_remove_node(id))
    }
}

#[async_trait]
impl EdgeRepository for InMemoryStore {
    async fn create_edge(&self, edge: &Edge) -> CoreResult<()> {
        for endpoint in [edge.source_node_id, edge.target_node_id] {
            match self.nodes.get(&endpoint) {
                Some(node) if node.flow_id == edge.flow_id => {}
                _ => {
                    return Err(CoreError::Referential(format!(
                        "node {} does not exist in flow {}",
                        endpoint, edge.flow_id
                    )))
                }
            }
        }
        self.edges.insert(edge.id, edge.clone());
        Ok(())
    }

    async fn list_edges(&self, flow_id: FlowId) -> CoreResult<Vec<Edge>> {
        Ok(self.edges.select(|edge| edge.flow_id == flow_id))
    }

    async fn delete_edge(&self, id: EdgeId) -> CoreResult<()> {
        self.edges
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CoreError::NotFound(format!("edge {}", id)))
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create_comment(&self, comment: &Comment) -> CoreResult<()> {
        if !self.nodes.contains(&comment.node_id) {
            return Err(CoreError::Referential(format!(
                "node {} does not exist",
                comment.node_id
            )));
        }
        self.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn list_comments(&self, node_id: NodeId) -> CoreResult<Vec<Comment>> {
        Ok(self.comments.select(|comment| comment.node_id == node_id))
    }
}

#[async_trait]
impl DocumentRepository for InMemoryStore {
    async fn create_document(&self, document: &DocumentMeta) -> CoreResult<()> {
        if !self.nodes.contains(&document.node_id) {
            return Err(CoreError::Referential(format!(
                "node {} does not exist",
                document.node_id
            )));
        }
        self.documents.insert(document.id, document.clone());
        Ok(())
    }

    async fn get_document(&self, id: DocumentId) -> CoreResult<DocumentMeta> {
        self.documents
            .get(&id)
            .ok_or_else(|| CoreError::NotFound(format!("document {}", id)))
    }

    async fn list_documents(&self, node_id: NodeId) -> CoreResult<Vec<DocumentMeta>> {
        // Newest first
        let mut documents = self
            .documents
            .select(|document| document.node_id == node_id);
        documents.reverse();
        Ok(documents)
    }

    async fn delete_document(&self, id: DocumentId) -> CoreResult<()> {
        self.documents
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CoreError::NotFound(format!("document {}", id)))
    }
}

#[async_trait]
impl LinkRepository for InMemoryStore {
    async fn create_link(&self, link: &Link) -> CoreResult<()> {
        if !self.nodes.contains(&link.node_id) {
            return Err(CoreError::Referential(format!(
                "node {} does not exist",
                link.node_id
            )));
        }
        self.links.insert(link.id, link.clone());
        Ok(())
    }

    async fn list_links(&self, node_id: NodeId) -> CoreResult<Vec<Link>> {
        // Newest first
        let mut links = self.links.select(|link| link.node_id == node_id);
        links.reverse();
        Ok(links)
    }

    async fn delete_link(&self, id: LinkId) -> CoreResult<()> {
        self.links
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CoreError::NotFound(format!("link {}", id)))
    }
}

#[async_trait]
impl KanbanRepository for InMemoryStore {
    async fn create_board(&self, board: &KanbanBoard) -> CoreResult<()> {
        if !self.nodes.contains(&board.node_id) {
            return Err(CoreError::Referential(format!(
                "node {} does not exist",
                board.node_id
            )));
        }
        self.boards.insert(board.id, board.clone());
        Ok(())
    }

    async fn list_boards_with_cards(&self, node_id: NodeId) -> CoreResult<Vec<BoardWithCards>> {
        let mut boards = self.boards.select(|board| board.node_id == node_id);
        boards.sort_by_key(|board| board.position);
        Ok(boards
            .into_iter()
            .map(|board| {
                let mut cards = self.cards.select(|card| card.board_id == board.id);
                cards.sort_by_key(|card| card.position);
                BoardWithCards { board, cards }
            })
            .collect())
    }

    async fn delete_board(&self, id: BoardId) -> CoreResult<()> {
        self.boards
            .remove(&id)
            .ok_or_else(|| CoreError::NotFound(format!("board {}", id)))?;
        self.cards.remove_where(|card| card.board_id == id);
        Ok(())
    }

    async fn create_card(&self, card: &KanbanCard) -> CoreResult<()> {
        if !self.boards.contains(&card.board_id) {
            return Err(CoreError::Referential(format!(
                "board {} does not exist",
                card.board_id
            )));
        }
        self.cards.insert(card.id, card.clone());
        Ok(())
    }

    async fn update_card(&self, card: &KanbanCard) -> CoreResult<KanbanCard> {
        self.cards
            .update(&card.id, |existing| *existing = card.clone())
            .ok_or_else(|| CoreError::NotFound(format!("card {}", card.id)))
    }

    async fn get_card(&self, id: CardId) -> CoreResult<KanbanCard> {
        self.cards
            .get(&id)
            .ok_or_else(|| CoreError::NotFound(format!("card {}", id)))
    }

    async fn delete_card(&self, id: CardId) -> CoreResult<()> {
        self.cards
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CoreError::NotFound(format!("card {}", id)))
    }
}

#[async_trait]
impl TimelineRepository for InMemoryStore {
    async fn create_timeline(&self, timeline: &ClientTimeline) -> CoreResult<()> {
        self.timelines.insert(timeline.id, timeline.clone());
        Ok(())
    }

    async fn get_timeline(&self, id: ClientTimelineId) -> CoreResult<ClientTimeline> {
        self.timelines
            .get(&id)
            .ok_or_else(|| CoreError::NotFound(format!("timeline {}", id)))
    }

    async fn list_timelines_for_client(
        &self,
        client_id: UserId,
    ) -> CoreResult<Vec<ClientTimeline>> {
        Ok(self
            .timelines
            .select(|timeline| timeline.client_id == client_id))
    }

    async fn delete_timeline(&self, id: ClientTimelineId) -> CoreResult<()> {
        self.timelines
            .remove(&id)
            .ok_or_else(|| CoreError::NotFound(format!("timeline {}", id)))?;
        self.items.remove_where(|item| item.timeline_id == id);
        Ok(())
    }

    async fn create_items(&self, items: &[TimelineItem]) -> CoreResult<()> {
        for item in items {
            if !self.timelines.contains(&item.timeline_id) {
                return Err(CoreError::Referential(format!(
                    "timeline {} does not exist",
                    item.timeline_id
                )));
            }
        }
        for item in items {
            self.items.insert(item.id, item.clone());
        }
        Ok(())
    }

    async fn get_item(&self, id: TimelineItemId) -> CoreResult<TimelineItem> {
        self.items
            .get(&id)
            .ok_or_else(|| CoreError::NotFound(format!("timeline item {}", id)))
    }

    async fn list_items(&self, timeline_id: ClientTimelineId) -> CoreResult<Vec<TimelineItem>> {
        let mut items = self.items.select(|item| item.timeline_id == timeline_id);
        items.sort_by_key(|item| item.position);
        Ok(items)
    }

    async fn update_item(&self, item: &TimelineItem) -> CoreResult<TimelineItem> {
        self.items
            .update(&item.id, |existing| *existing = item.clone())
            .ok_or_else(|| CoreError::NotFound(format!("timeline item {}", item.id)))
    }
}

#[async_trait]
impl TemplateRepository for InMemoryStore {
    async fn create_template(&self, template: &TimelineTemplate) -> CoreResult<()> {
        self.templates.insert(template.id, template.clone());
        Ok(())
    }

    async fn get_template(&self, id: TemplateId) -> CoreResult<TimelineTemplate> {
        self.templates
            .get(&id)
            .ok_or_else(|| CoreError::NotFound(format!("template {}", id)))
    }

    async fn list_templates(&self) -> CoreResult<Vec<TimelineTemplate>> {
        Ok(self.templates.select(|_| true))
    }

    async fn delete_template(&self, id: TemplateId) -> CoreResult<()> {
        self.templates
            .remove(&id)
            .ok_or_else(|| CoreError::NotFound(format!("template {}", id)))?;
        self.template_items
            .remove_where(|item| item.template_id == id);
        Ok(())
    }

    async fn create_template_items(&self, items: &[TemplateItem]) -> CoreResult<()> {
        for item in items {
            if !self.templates.contains(&item.template_id) {
                return Err(CoreError::Referential(format!(
                    "template {} does not exist",
                    item.template_id
                )));
            }
        }
        for item in items {
            self.template_items.insert(item.id, item.clone());
        }
        Ok(())
    }

    async fn list_template_items(&self, template_id: TemplateId) -> CoreResult<Vec<TemplateItem>> {
        let mut items = self
            .template_items
            .select(|item| item.template_id == template_id);
        items.sort_by_key(|item| item.position);
        Ok(items)
    }
}

#[async_trait]
impl IndicationRepository for InMemoryStore {
    async fn create_indication(&self, indication: &Indication) -> CoreResult<()> {
        self.indications.insert(indication.id, indication.clone());
        Ok(())
    }

    async fn get_indication(&self, id: IndicationId) -> CoreResult<Indication> {
        self.indications
            .get(&id)
            .ok_or_else(|| CoreError::NotFound(format!("indication {}", id)))
    }

    async fn update_indication(&self, indication: &Indication) -> CoreResult<Indication> {
        self.indications
            .update(&indication.id, |existing| *existing = indication.clone())
            .ok_or_else(|| CoreError::NotFound(format!("indication {}", indication.id)))
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn create_profile(&self, profile: &Profile) -> CoreResult<()> {
        if !self.profiles.try_insert(profile.user_id, profile.clone()) {
            return Err(CoreError::Conflict(format!(
                "profile for user {} already exists",
                profile.user_id
            )));
        }
        Ok(())
    }

    async fn get_profile(&self, user_id: UserId) -> CoreResult<Profile> {
        self.profiles
            .get(&user_id)
            .ok_or_else(|| CoreError::NotFound(format!("profile for user {}", user_id)))
    }

    async fn add_points(&self, user_id: UserId, points: i64) -> CoreResult<i64> {
        self.profiles
            .update(&user_id, |profile| profile.points += points)
            .map(|profile| profile.points)
            .ok_or_else(|| CoreError::NotFound(format!("profile for user {}", user_id)))
    }

    async fn delete_profile(&self, user_id: UserId) -> CoreResult<()> {
        self.profiles
            .remove(&user_id)
            .map(|_| ())
            .ok_or_else(|| CoreError::NotFound(format!("profile for user {}", user_id)))
    }
}

#[derive(Debug, Clone)]
struct Account {
    user_id: UserId,
}

/// In-memory account directory keyed by lowercased email
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    accounts: DashMap<String, Account>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn create_user(&self, email: &str, password: &str) -> CoreResult<UserId> {
        let email = email.trim().to_ascii_lowercase();
        let well_formed = email
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
            .unwrap_or(false);
        if !well_formed {
            return Err(CoreError::Validation(format!("invalid email: {}", email)));
        }
        if password.len() < 6 {
            return Err(CoreError::Validation(
                "password must be at least 6 characters".to_string(),
            ));
        }
        match self.accounts.entry(email.clone()) {
            Entry::Occupied(_) => Err(CoreError::Conflict(format!(
                "account {} already exists",
                email
            ))),
            Entry::Vacant(vacant) => {
                let user_id = UserId::new();
                vacant.insert(Account { user_id });
                debug!(%user_id, email, "account created");
                Ok(user_id)
            }
        }
    }

    async fn delete_user(&self, user_id: UserId) -> CoreResult<()> {
        let email = self
            .accounts
            .iter()
            .find(|entry| entry.user_id == user_id)
            .map(|entry| entry.key().clone())
            .ok_or_else(|| CoreError::NotFound(format!("account for user {}", user_id)))?;
        self.accounts.remove(&email);
        Ok(())
    }
}
