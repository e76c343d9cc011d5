//! Node detail editor: a per-node editing session with tabbed sub-resources.
//!
//! Each session targets one node. Tab content (comments, documents, links,
//! kanban) is fetched lazily the first time its tab is selected and kept in
//! a per-session cache that mutations update in place. Document payloads go
//! through the blob store: upload writes the blob before the metadata row
//! and removes the blob again if the row cannot be written, so metadata
//! never points at a missing payload.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use timeline_content_store::{document_path, BlobStorage, BlobStoreError};

use crate::domain::kanban::{BoardWithCards, KanbanBoard, KanbanCard, validate_progress};
use crate::domain::node::{Node, NodeUpdate};
use crate::domain::repository::Repositories;
use crate::domain::subresource::{Comment, DocumentMeta, Link};
use crate::error::{CoreError, CoreResult};
use crate::types::{AuthContext, BoardId, CardId, DocumentId, LinkId, NodeId};

/// Tabs of the detail editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTab {
    Details,
    Comments,
    Documents,
    Links,
    Kanban,
}

/// A downloaded document: its metadata plus the payload bytes
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentDownload {
    pub meta: DocumentMeta,
    pub bytes: Vec<u8>,
}

/// Editing session over one node
#[derive(Debug)]
pub struct DetailEditor {
    repos: Repositories,
    blob_store: Arc<dyn BlobStorage>,
    node: Node,
    active_tab: DetailTab,
    comments: Option<Vec<Comment>>,
    documents: Option<Vec<DocumentMeta>>,
    links: Option<Vec<Link>>,
    boards: Option<Vec<BoardWithCards>>,
}

impl DetailEditor {
    /// Open a session on a node, starting on the details tab
    pub async fn open(
        repos: Repositories,
        blob_store: Arc<dyn BlobStorage>,
        node_id: NodeId,
    ) -> CoreResult<Self> {
        let node = repos.nodes.get_node(node_id).await?;
        Ok(Self {
            repos,
            blob_store,
            node,
            active_tab: DetailTab::Details,
            comments: None,
            documents: None,
            links: None,
            boards: None,
        })
    }

    /// The node under edit
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Tabs offered for this node; kanban only where the type registry
    /// declares a kanban tab
    pub fn available_tabs(&self) -> Vec<DetailTab> {
        let mut tabs = vec![
            DetailTab::Details,
            DetailTab::Comments,
            DetailTab::Documents,
            DetailTab::Links,
        ];
        if self.node.node_type.descriptor().has_kanban_tab {
            tabs.push(DetailTab::Kanban);
        }
        tabs
    }

    pub fn active_tab(&self) -> DetailTab {
        self.active_tab
    }

    /// Switch tabs, fetching the tab's content on first visit
    pub async fn select_tab(&mut self, tab: DetailTab) -> CoreResult<()> {
        if tab == DetailTab::Kanban && !self.node.node_type.descriptor().has_kanban_tab {
            return Err(CoreError::Validation(format!(
                "node type {} has no kanban tab",
                self.node.node_type
            )));
        }
        self.active_tab = tab;
        match tab {
            DetailTab::Details => {}
            DetailTab::Comments => {
                if self.comments.is_none() {
                    self.comments = Some(self.repos.comments.list_comments(self.node.id).await?);
                }
            }
            DetailTab::Documents => {
                if self.documents.is_none() {
                    self.documents =
                        Some(self.repos.documents.list_documents(self.node.id).await?);
                }
            }
            DetailTab::Links => {
                if self.links.is_none() {
                    self.links = Some(self.repos.links.list_links(self.node.id).await?);
                }
            }
            DetailTab::Kanban => {
                if self.boards.is_none() {
                    self.boards = Some(
                        self.repos
                            .kanban
                            .list_boards_with_cards(self.node.id)
                            .await?,
                    );
                }
            }
        }
        Ok(())
    }

    /// Cached comments, present once the tab has been visited
    pub fn comments(&self) -> Option<&[Comment]> {
        self.comments.as_deref()
    }

    pub fn documents(&self) -> Option<&[DocumentMeta]> {
        self.documents.as_deref()
    }

    pub fn links(&self) -> Option<&[Link]> {
        self.links.as_deref()
    }

    pub fn boards(&self) -> Option<&[BoardWithCards]> {
        self.boards.as_deref()
    }

    // ---- details tab ----

    /// Apply the details form in one atomic update. The title is validated
    /// before anything reaches the store. Admin only.
    pub async fn save_details(&mut self, auth: &AuthContext, update: NodeUpdate) -> CoreResult<()> {
        auth.require_admin("edit node details")?;
        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(CoreError::Validation("title must not be empty".into()));
            }
        }
        self.node = self.repos.nodes.update_node(self.node.id, update).await?;
        Ok(())
    }

    // ---- comments tab ----

    /// Append a comment as the authenticated user
    pub async fn add_comment(
        &mut self,
        auth: &AuthContext,
        content: impl Into<String>,
    ) -> CoreResult<Comment> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(CoreError::Validation("comment must not be empty".into()));
        }
        let comment = Comment::new(self.node.id, auth.user_id, content);
        self.repos.comments.create_comment(&comment).await?;
        if let Some(cache) = &mut self.comments {
            cache.push(comment.clone());
        }
        Ok(comment)
    }

    // ---- documents tab ----

    /// Upload a document: blob first, metadata second. If the metadata row
    /// cannot be written the blob is removed again. Admin only.
    pub async fn upload_document(
        &mut self,
        auth: &AuthContext,
        filename: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> CoreResult<DocumentMeta> {
        auth.require_admin("upload document")?;
        let path = document_path(
            &self.node.id.to_string(),
            filename,
            Utc::now().timestamp_millis(),
        )?;
        let size_bytes = bytes.len() as u64;
        self.blob_store.upload(&path, &bytes).await?;

        let meta = DocumentMeta::new(
            self.node.id,
            filename,
            path.clone(),
            mime_type,
            size_bytes,
            auth.user_id,
        );
        if let Err(err) = self.repos.documents.create_document(&meta).await {
            if let Err(cleanup) = self.blob_store.remove(&path).await {
                warn!(path, error = %cleanup, "orphaned blob after failed metadata write");
            }
            return Err(err);
        }
        info!(document_id = %meta.id, node_id = %self.node.id, path, "document uploaded");
        if let Some(cache) = &mut self.documents {
            // List order is newest first
            cache.insert(0, meta.clone());
        }
        Ok(meta)
    }

    /// Fetch a document's metadata and payload
    pub async fn download_document(&self, id: DocumentId) -> CoreResult<DocumentDownload> {
        let meta = self.repos.documents.get_document(id).await?;
        if meta.node_id != self.node.id {
            return Err(CoreError::NotFound(format!("document {}", id)));
        }
        let bytes = self.blob_store.download(&meta.storage_path).await?;
        Ok(DocumentDownload { meta, bytes })
    }

    /// Delete a document: blob first, metadata row second. When blob removal
    /// fails the metadata row is kept so the reference never points at a
    /// payload that may still exist. Admin only.
    pub async fn delete_document(&mut self, auth: &AuthContext, id: DocumentId) -> CoreResult<()> {
        auth.require_admin("delete document")?;
        let meta = self.repos.documents.get_document(id).await?;
        if meta.node_id != self.node.id {
            return Err(CoreError::NotFound(format!("document {}", id)));
        }
        match self.blob_store.remove(&meta.storage_path).await {
            Ok(()) => {}
            // An already-missing blob has nothing left to orphan
            Err(BlobStoreError::NotFound(path)) => {
                warn!(document_id = %id, path, "blob already gone, removing metadata");
            }
            Err(err) => return Err(err.into()),
        }
        self.repos.documents.delete_document(id).await?;
        if let Some(cache) = &mut self.documents {
            cache.retain(|d| d.id != id);
        }
        Ok(())
    }

    // ---- links tab ----

    /// Attach a link to the node. Admin only.
    pub async fn add_link(
        &mut self,
        auth: &AuthContext,
        title: impl Into<String>,
        url: impl Into<String>,
        description: Option<String>,
    ) -> CoreResult<Link> {
        auth.require_admin("add link")?;
        let url = url.into();
        if url.trim().is_empty() {
            return Err(CoreError::Validation("link URL must not be empty".into()));
        }
        let link = Link::new(self.node.id, title, url, description, auth.user_id);
        self.repos.links.create_link(&link).await?;
        if let Some(cache) = &mut self.links {
            // List order is newest first
            cache.insert(0, link.clone());
        }
        Ok(link)
    }

    /// Remove a link. Admin only.
    pub async fn delete_link(&mut self, auth: &AuthContext, id: LinkId) -> CoreResult<()> {
        auth.require_admin("delete link")?;
        self.repos.links.delete_link(id).await?;
        if let Some(cache) = &mut self.links {
            cache.retain(|l| l.id != id);
        }
        Ok(())
    }

    // ---- kanban tab ----

    /// Create a board appended after the node's existing boards. Admin only.
    pub async fn add_board(
        &mut self,
        auth: &AuthContext,
        title: impl Into<String>,
    ) -> CoreResult<KanbanBoard> {
        auth.require_admin("add kanban board")?;
        self.require_kanban()?;
        let position = self.next_board_position().await?;
        let board = KanbanBoard::new(self.node.id, title, position);
        self.repos.kanban.create_board(&board).await?;
        if let Some(cache) = &mut self.boards {
            cache.push(BoardWithCards {
                board: board.clone(),
                cards: Vec::new(),
            });
        }
        Ok(board)
    }

    /// Delete a board and its cards. Admin only.
    pub async fn delete_board(&mut self, auth: &AuthContext, id: BoardId) -> CoreResult<()> {
        auth.require_admin("delete kanban board")?;
        self.repos.kanban.delete_board(id).await?;
        if let Some(cache) = &mut self.boards {
            cache.retain(|b| b.board.id != id);
        }
        Ok(())
    }

    /// Create a card on a board, validating the manual progress value.
    /// Admin only.
    pub async fn add_card(
        &mut self,
        auth: &AuthContext,
        board_id: BoardId,
        title: impl Into<String>,
        description: Option<String>,
        tags: Vec<String>,
        progress: i64,
    ) -> CoreResult<KanbanCard> {
        auth.require_admin("add kanban card")?;
        let position = self.next_card_position(board_id).await?;
        let card = KanbanCard::new(board_id, title, description, tags, progress, position)?;
        self.repos.kanban.create_card(&card).await?;
        if let Some(cache) = &mut self.boards {
            if let Some(entry) = cache.iter_mut().find(|b| b.board.id == board_id) {
                entry.cards.push(card.clone());
            }
        }
        Ok(card)
    }

    /// Set a card's manual progress percentage. Admin only.
    pub async fn set_card_progress(
        &mut self,
        auth: &AuthContext,
        card_id: CardId,
        progress: i64,
    ) -> CoreResult<KanbanCard> {
        auth.require_admin("update kanban card")?;
        let progress = validate_progress(progress)?;
        let mut card = self.repos.kanban.get_card(card_id).await?;
        card.progress = progress;
        let card = self.repos.kanban.update_card(&card).await?;
        if let Some(cache) = &mut self.boards {
            for entry in cache.iter_mut() {
                if let Some(cached) = entry.cards.iter_mut().find(|c| c.id == card_id) {
                    *cached = card.clone();
                }
            }
        }
        Ok(card)
    }

    /// Delete a card. Admin only.
    pub async fn delete_card(&mut self, auth: &AuthContext, id: CardId) -> CoreResult<()> {
        auth.require_admin("delete kanban card")?;
        self.repos.kanban.delete_card(id).await?;
        if let Some(cache) = &mut self.boards {
            for entry in cache.iter_mut() {
                entry.cards.retain(|c| c.id != id);
            }
        }
        Ok(())
    }

    fn require_kanban(&self) -> CoreResult<()> {
        if self.node.node_type.descriptor().has_kanban_tab {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "node type {} has no kanban tab",
                self.node.node_type
            )))
        }
    }

    async fn next_board_position(&self) -> CoreResult<u32> {
        let boards = match &self.boards {
            Some(cached) => cached.len(),
            None => {
                self.repos
                    .kanban
                    .list_boards_with_cards(self.node.id)
                    .await?
                    .len()
            }
        };
        Ok(boards as u32)
    }

    async fn next_card_position(&self, board_id: BoardId) -> CoreResult<u32> {
        if let Some(entry) = self
            .boards
            .as_ref()
            .and_then(|cache| cache.iter().find(|b| b.board.id == board_id))
        {
            return Ok(entry.cards.len() as u32);
        }
        let boards = self
            .repos
            .kanban
            .list_boards_with_cards(self.node.id)
            .await?;
        Ok(boards
            .iter()
            .find(|b| b.board.id == board_id)
            .map(|entry| entry.cards.len() as u32)
            .unwrap_or(0))
    }
}
