//! Diagram edges: curved connections between node handles.

use super::color::Rgba;
use super::node::{HandleSide, NodeId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for edges.
pub type EdgeId = Uuid;

/// Default stroke width for new edges.
pub const DEFAULT_EDGE_WIDTH: f64 = 2.0;

/// Default curvature for new edges.
pub const DEFAULT_CURVATURE: f64 = 0.5;

/// Default arrowhead size for bidirectional edges.
pub const DEFAULT_ARROW_SIZE: f64 = 10.0;

/// Stroke style for edge rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl StrokeStyle {
    /// Cycle to the next stroke style.
    pub fn next(self) -> Self {
        match self {
            StrokeStyle::Solid => StrokeStyle::Dashed,
            StrokeStyle::Dashed => StrokeStyle::Dotted,
            StrokeStyle::Dotted => StrokeStyle::Solid,
        }
    }

    /// Dash pattern for a given stroke width, or `None` for solid strokes.
    pub fn dash_pattern(self, width: f64) -> Option<Vec<f64>> {
        match self {
            StrokeStyle::Solid => None,
            StrokeStyle::Dashed => Some(vec![width * 4.0, width * 3.0]),
            StrokeStyle::Dotted => Some(vec![width, width * 2.0]),
        }
    }
}

fn default_visible() -> bool {
    true
}

fn default_width() -> f64 {
    DEFAULT_EDGE_WIDTH
}

fn default_curvature() -> f64 {
    DEFAULT_CURVATURE
}

fn default_arrow_size() -> f64 {
    DEFAULT_ARROW_SIZE
}

fn default_color() -> Rgba {
    Rgba::new(71, 85, 105, 255)
}

/// A curved connection between two node handles.
///
/// Source and target are id references; an edge whose endpoints no longer
/// resolve is filtered from rendering and hit-testing rather than treated as
/// an error (cascade deletion is the primary guarantee, this is the net).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub source_handle: HandleSide,
    pub target_handle: HandleSide,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_color")]
    pub color: Rgba,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default)]
    pub style: StrokeStyle,
    /// Uniform width with an arrowhead at each end instead of a taper.
    #[serde(default)]
    pub bidirectional: bool,
    /// Packets on this edge travel out, reverse at the target, and return.
    #[serde(default)]
    pub bounce: bool,
    /// Curve strength in [0, 1]; 0 degenerates toward a straight line.
    #[serde(default = "default_curvature")]
    pub curvature: f64,
    #[serde(default = "default_arrow_size")]
    pub arrow_size: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl Edge {
    /// Create an edge between two handles with default styling.
    pub fn new(
        source: NodeId,
        source_handle: HandleSide,
        target: NodeId,
        target_handle: HandleSide,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            target,
            source_handle,
            target_handle,
            label: String::new(),
            color: default_color(),
            width: DEFAULT_EDGE_WIDTH,
            style: StrokeStyle::default(),
            bidirectional: false,
            bounce: false,
            curvature: DEFAULT_CURVATURE,
            arrow_size: DEFAULT_ARROW_SIZE,
            visible: true,
        }
    }

    /// Whether the edge touches the given node at either end.
    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }
}
