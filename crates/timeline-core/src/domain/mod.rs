//! Domain model: flows, nodes, edges, node sub-resources, kanban, timelines
//! and the repository traits persistence backends implement.

pub mod edge;
pub mod flow;
pub mod kanban;
pub mod node;
pub mod node_type;
pub mod repository;
pub mod subresource;
pub mod timeline;

pub use edge::{Edge, DEFAULT_EDGE_COLOR};
pub use flow::{Flow, FlowKind};
pub use kanban::{validate_progress, BoardWithCards, KanbanBoard, KanbanCard};
pub use node::{Node, NodeShape, NodeUpdate};
pub use node_type::{NodeType, NodeTypeDescriptor};
pub use repository::{
    CommentRepository, DocumentRepository, EdgeRepository, FlowRepository, IndicationRepository,
    KanbanRepository, LinkRepository, NodeRepository, ProfileRepository, Repositories,
    TemplateRepository, TimelineRepository, UserDirectory,
};
pub use subresource::{is_video_url, Comment, DocumentMeta, Link, LinkPresentation};
pub use timeline::{
    ClientTimeline, Indication, IndicationStatus, Profile, ProgressStatus, TemplateItem,
    TimelineItem, TimelineTemplate,
};
