//! Node groups: labeled background regions that move their members together.

use super::color::Rgba;
use super::node::NodeId;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Unique identifier for groups.
pub type GroupId = Uuid;

/// Default padding around member bounds when a group is created.
pub const DEFAULT_GROUP_PADDING: f64 = 20.0;

/// Side length of the collapse/expand glyph in the group's top-right corner.
pub const TOGGLE_GLYPH_SIZE: f64 = 16.0;

fn default_visible() -> bool {
    true
}

fn default_padding() -> f64 {
    DEFAULT_GROUP_PADDING
}

fn default_fill() -> Rgba {
    Rgba::new(226, 232, 240, 90)
}

fn default_border() -> Rgba {
    Rgba::new(100, 116, 139, 255)
}

/// A labeled region referencing member nodes by id.
///
/// Groups never own nodes; membership is id-based so node and group
/// lifecycles stay independent. A group whose membership drains to empty is
/// pruned by the scene store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    #[serde(default)]
    pub label: String,
    pub bounds: Rect,
    #[serde(default = "default_fill")]
    pub fill: Rgba,
    #[serde(default = "default_border")]
    pub border: Rgba,
    pub node_ids: HashSet<NodeId>,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default = "default_padding")]
    pub padding: f64,
}

impl Group {
    /// Create a group around pre-computed member bounds.
    pub fn new(label: String, member_bounds: Rect, node_ids: HashSet<NodeId>, padding: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            label,
            bounds: member_bounds.inflate(padding, padding),
            fill: default_fill(),
            border: default_border(),
            node_ids,
            collapsed: false,
            visible: true,
            padding,
        }
    }

    /// The clickable collapse/expand glyph in the top-right corner.
    pub fn toggle_rect(&self) -> Rect {
        Rect::new(
            self.bounds.x1 - TOGGLE_GLYPH_SIZE,
            self.bounds.y0,
            self.bounds.x1,
            self.bounds.y0 + TOGGLE_GLYPH_SIZE,
        )
    }

    /// Whether a world point lands on the collapse/expand glyph.
    pub fn toggle_contains(&self, point: Point) -> bool {
        self.toggle_rect().contains(point)
    }

    /// Translate the group region. Member nodes are moved by the scene store.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.bounds = self.bounds + kurbo::Vec2::new(dx, dy);
    }
}
