//! Application layer: the canvas engine, editor sessions and business
//! functions that drive the domain through the repository traits.

pub mod add_node;
pub mod canvas;
pub mod date_ruler;
pub mod detail_editor;
pub mod functions;
pub mod viewport;

pub use canvas::{CanvasController, GraphState, Notification, NotificationLevel};
pub use detail_editor::{DetailEditor, DetailTab, DocumentDownload};
pub use functions::{
    ApproveIndicationResult, AssignTimelineResult, Functions, UpdateProgressResult,
    INDICATION_AWARD_POINTS,
};
pub use viewport::{MinimapView, Viewport, MAX_ZOOM, MIN_ZOOM};
