//! Viewport: the pan/zoom transform between canvas and screen coordinates.
//!
//! Node positions are stored in canvas space. The viewport holds a
//! translation plus a zoom factor and converts both ways, so hit testing and
//! rendering agree on where things are.

use serde::{Deserialize, Serialize};

use crate::domain::node::Node;
use crate::types::Position;

/// Lower zoom bound
pub const MIN_ZOOM: f64 = 0.2;
/// Upper zoom bound
pub const MAX_ZOOM: f64 = 3.0;

/// Padding (canvas units) around the bounding box when fitting to content
const FIT_PADDING: f64 = 80.0;

/// Pan/zoom state of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Canvas-space translation applied before scaling
    pub offset: Position,
    /// Zoom factor, always within [`MIN_ZOOM`]..=[`MAX_ZOOM`]
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Position { x: 0.0, y: 0.0 },
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Translate the viewport by a screen-space delta
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset.x += dx / self.zoom;
        self.offset.y += dy / self.zoom;
    }

    /// Set the zoom factor, clamped to the allowed range, keeping the given
    /// screen point fixed in place
    pub fn zoom_at(&mut self, screen_anchor: Position, zoom: f64) {
        let anchor_before = self.to_canvas(screen_anchor);
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let anchor_after = self.to_canvas(screen_anchor);
        self.offset.x += anchor_after.x - anchor_before.x;
        self.offset.y += anchor_after.y - anchor_before.y;
    }

    /// Multiply the zoom factor, clamped, anchored at a screen point
    pub fn zoom_by(&mut self, screen_anchor: Position, factor: f64) {
        self.zoom_at(screen_anchor, self.zoom * factor);
    }

    /// Convert a screen point into canvas space
    pub fn to_canvas(&self, screen: Position) -> Position {
        Position {
            x: screen.x / self.zoom - self.offset.x,
            y: screen.y / self.zoom - self.offset.y,
        }
    }

    /// Convert a canvas point into screen space
    pub fn to_screen(&self, canvas: Position) -> Position {
        Position {
            x: (canvas.x + self.offset.x) * self.zoom,
            y: (canvas.y + self.offset.y) * self.zoom,
        }
    }

    /// Fit the viewport so every node is visible within the given screen
    /// size, with padding. Empty input resets to the default transform.
    pub fn fit_to_nodes(&mut self, nodes: &[Node], screen_width: f64, screen_height: f64) {
        let Some(bounds) = node_bounds(nodes) else {
            *self = Self::default();
            return;
        };
        let content_width = (bounds.max_x - bounds.min_x) + 2.0 * FIT_PADDING;
        let content_height = (bounds.max_y - bounds.min_y) + 2.0 * FIT_PADDING;

        let zoom_x = screen_width / content_width.max(1.0);
        let zoom_y = screen_height / content_height.max(1.0);
        self.zoom = zoom_x.min(zoom_y).clamp(MIN_ZOOM, MAX_ZOOM);

        // Center the content bounding box in the screen.
        let center_x = (bounds.min_x + bounds.max_x) / 2.0;
        let center_y = (bounds.min_y + bounds.max_y) / 2.0;
        self.offset.x = screen_width / (2.0 * self.zoom) - center_x;
        self.offset.y = screen_height / (2.0 * self.zoom) - center_y;
    }
}

/// Axis-aligned bounding box in canvas space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Bounding box covering all nodes including their sizes, `None` when empty
pub fn node_bounds(nodes: &[Node]) -> Option<Bounds> {
    let mut iter = nodes.iter();
    let first = iter.next()?;
    let first_size = first.effective_size();
    let mut bounds = Bounds {
        min_x: first.position.x,
        min_y: first.position.y,
        max_x: first.position.x + first_size.width,
        max_y: first.position.y + first_size.height,
    };
    for node in iter {
        let size = node.effective_size();
        bounds.min_x = bounds.min_x.min(node.position.x);
        bounds.min_y = bounds.min_y.min(node.position.y);
        bounds.max_x = bounds.max_x.max(node.position.x + size.width);
        bounds.max_y = bounds.max_y.max(node.position.y + size.height);
    }
    Some(bounds)
}

/// Minimap projection: the content bounds scaled uniformly into a panel,
/// plus the panel-space rectangle the viewport currently shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapView {
    /// Canvas-to-panel scale factor
    pub scale: f64,
    /// Content bounds the projection is anchored to
    pub content: Bounds,
    /// Top-left of the visible region, in panel coordinates
    pub view_min: Position,
    /// Bottom-right of the visible region, in panel coordinates
    pub view_max: Position,
}

impl MinimapView {
    /// Project a canvas point into panel coordinates
    pub fn project(&self, canvas: Position) -> Position {
        Position {
            x: (canvas.x - self.content.min_x) * self.scale,
            y: (canvas.y - self.content.min_y) * self.scale,
        }
    }
}

/// Derive the minimap for the given nodes and viewport: scale the content
/// bounds to fit the panel and mark the region the main view shows.
/// `None` when there is nothing to project.
pub fn minimap_view(
    nodes: &[Node],
    viewport: &Viewport,
    screen_width: f64,
    screen_height: f64,
    panel_width: f64,
    panel_height: f64,
) -> Option<MinimapView> {
    let content = node_bounds(nodes)?;
    let content_width = (content.max_x - content.min_x).max(1.0);
    let content_height = (content.max_y - content.min_y).max(1.0);
    let scale = (panel_width / content_width).min(panel_height / content_height);

    let mut view = MinimapView {
        scale,
        content,
        view_min: Position::default(),
        view_max: Position::default(),
    };
    view.view_min = view.project(viewport.to_canvas(Position { x: 0.0, y: 0.0 }));
    view.view_max = view.project(viewport.to_canvas(Position {
        x: screen_width,
        y: screen_height,
    }));
    Some(view)
}

/// Grid line spacing in screen pixels for the current zoom, doubling the
/// canvas-space step until lines are at least `min_screen_spacing` apart
pub fn grid_spacing(zoom: f64, base_canvas_step: f64, min_screen_spacing: f64) -> f64 {
    let mut step = base_canvas_step;
    while step * zoom < min_screen_spacing {
        step *= 2.0;
    }
    step * zoom
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::Node;
    use crate::domain::node_type::NodeType;
    use crate::types::{FlowId, UserId};

    fn node_at(x: f64, y: f64) -> Node {
        let mut node = Node::new(
            FlowId::new(),
            NodeType::Service,
            "n",
            Position { x, y },
            UserId::new(),
        );
        node.size = Some(crate::types::Size {
            width: 100.0,
            height: 50.0,
        });
        node
    }

    #[test]
    fn zoom_clamps_to_range() {
        let mut viewport = Viewport::default();
        let anchor = Position { x: 0.0, y: 0.0 };
        viewport.zoom_at(anchor, 10.0);
        assert_eq!(viewport.zoom, MAX_ZOOM);
        viewport.zoom_at(anchor, 0.01);
        assert_eq!(viewport.zoom, MIN_ZOOM);
    }

    #[test]
    fn transforms_round_trip() {
        let mut viewport = Viewport::default();
        viewport.pan(120.0, -40.0);
        viewport.zoom_at(Position { x: 300.0, y: 200.0 }, 1.5);

        let canvas = Position { x: 57.0, y: -13.0 };
        let back = viewport.to_canvas(viewport.to_screen(canvas));
        assert!((back.x - canvas.x).abs() < 1e-9);
        assert!((back.y - canvas.y).abs() < 1e-9);
    }

    #[test]
    fn zoom_anchor_stays_fixed() {
        let mut viewport = Viewport::default();
        viewport.pan(50.0, 50.0);
        let anchor = Position { x: 400.0, y: 300.0 };
        let before = viewport.to_canvas(anchor);
        viewport.zoom_by(anchor, 1.8);
        let after = viewport.to_canvas(anchor);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn fit_centers_and_contains_all_nodes() {
        let nodes = vec![node_at(0.0, 0.0), node_at(900.0, 500.0)];
        let mut viewport = Viewport::default();
        viewport.fit_to_nodes(&nodes, 800.0, 600.0);

        for node in &nodes {
            let screen = viewport.to_screen(node.position);
            assert!(screen.x >= 0.0 && screen.x <= 800.0);
            assert!(screen.y >= 0.0 && screen.y <= 600.0);
        }
    }

    #[test]
    fn fit_on_empty_resets() {
        let mut viewport = Viewport::default();
        viewport.pan(500.0, 500.0);
        viewport.fit_to_nodes(&[], 800.0, 600.0);
        assert_eq!(viewport, Viewport::default());
    }

    #[test]
    fn minimap_fits_content_and_covers_fitted_view() {
        let nodes = vec![node_at(0.0, 0.0), node_at(900.0, 500.0)];
        let mut viewport = Viewport::default();
        viewport.fit_to_nodes(&nodes, 800.0, 600.0);

        let map = minimap_view(&nodes, &viewport, 800.0, 600.0, 200.0, 150.0).unwrap();
        assert!(map.scale > 0.0);
        for node in &nodes {
            let projected = map.project(node.position);
            assert!(projected.x >= 0.0 && projected.x <= 200.0);
            assert!(projected.y >= 0.0 && projected.y <= 150.0);
        }
        // A fitted viewport shows at least the whole content projection.
        let content_width = (map.content.max_x - map.content.min_x) * map.scale;
        assert!(map.view_min.x <= 1e-6);
        assert!(map.view_max.x >= content_width - 1e-6);
    }

    #[test]
    fn minimap_rectangle_shrinks_when_zooming_in() {
        let nodes = vec![node_at(0.0, 0.0), node_at(900.0, 500.0)];
        let mut viewport = Viewport::default();
        viewport.fit_to_nodes(&nodes, 800.0, 600.0);

        let before = minimap_view(&nodes, &viewport, 800.0, 600.0, 200.0, 150.0).unwrap();
        viewport.zoom_by(Position { x: 400.0, y: 300.0 }, 2.0);
        let after = minimap_view(&nodes, &viewport, 800.0, 600.0, 200.0, 150.0).unwrap();

        let width = |m: &MinimapView| m.view_max.x - m.view_min.x;
        assert!(width(&after) < width(&before));
    }

    #[test]
    fn minimap_is_empty_for_an_empty_graph() {
        let map = minimap_view(&[], &Viewport::default(), 800.0, 600.0, 200.0, 150.0);
        assert!(map.is_none());
    }

    #[test]
    fn grid_spacing_never_collapses() {
        let spacing = grid_spacing(MIN_ZOOM, 20.0, 24.0);
        assert!(spacing >= 24.0);
        let spacing = grid_spacing(MAX_ZOOM, 20.0, 24.0);
        assert!(spacing >= 24.0);
    }
}
