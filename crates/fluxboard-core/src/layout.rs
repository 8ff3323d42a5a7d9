//! Auto-layout collaborator seam.
//!
//! Layout runs outside the engine behind a trait; the engine hands over a
//! read-only graph summary and applies the returned positions atomically.

use crate::scene::{Edge, Node, NodeId};
use kurbo::{Point, Size};
use thiserror::Error;

/// Arrangement requested from a layout provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPreset {
    /// Left-to-right layered flow.
    Horizontal,
    /// Top-to-bottom layered flow.
    Vertical,
    /// Uniform grid in creation order.
    Grid,
    /// Nodes on a circle in creation order.
    Radial,
}

/// One node as the layout provider sees it. Only identity and extent; a
/// provider never learns about styling.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: NodeId,
    pub position: Point,
    pub size: Size,
}

impl LayoutNode {
    pub fn from_node(node: &Node) -> Self {
        Self {
            id: node.id,
            position: node.position,
            size: node.size,
        }
    }
}

/// One edge as the layout provider sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEdge {
    pub source: NodeId,
    pub target: NodeId,
}

impl LayoutEdge {
    pub fn from_edge(edge: &Edge) -> Self {
        Self {
            source: edge.source,
            target: edge.target,
        }
    }
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout produced no positions")]
    Empty,
    #[error("unsupported preset {0:?}")]
    UnsupportedPreset(LayoutPreset),
    #[error("layout provider failed: {0}")]
    Provider(String),
}

/// An algorithm that assigns new positions to nodes. Implementations must
/// return a position for every input node or an error; partial results are
/// rejected by the caller.
pub trait LayoutProvider {
    fn layout(
        &self,
        nodes: &[LayoutNode],
        edges: &[LayoutEdge],
        preset: LayoutPreset,
    ) -> Result<Vec<(NodeId, Point)>, LayoutError>;
}

/// Built-in provider covering the simple presets. Layered presets order
/// nodes by creation and space them by their extent plus a fixed gutter.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLayout;

const GUTTER: f64 = 60.0;

impl LayoutProvider for BuiltinLayout {
    fn layout(
        &self,
        nodes: &[LayoutNode],
        _edges: &[LayoutEdge],
        preset: LayoutPreset,
    ) -> Result<Vec<(NodeId, Point)>, LayoutError> {
        if nodes.is_empty() {
            return Err(LayoutError::Empty);
        }

        let positions = match preset {
            LayoutPreset::Horizontal => {
                let mut x = 0.0;
                nodes
                    .iter()
                    .map(|n| {
                        let p = Point::new(x, 0.0);
                        x += n.size.width + GUTTER;
                        (n.id, p)
                    })
                    .collect()
            }
            LayoutPreset::Vertical => {
                let mut y = 0.0;
                nodes
                    .iter()
                    .map(|n| {
                        let p = Point::new(0.0, y);
                        y += n.size.height + GUTTER;
                        (n.id, p)
                    })
                    .collect()
            }
            LayoutPreset::Grid => {
                let columns = (nodes.len() as f64).sqrt().ceil().max(1.0) as usize;
                let cell_w = nodes
                    .iter()
                    .map(|n| n.size.width)
                    .fold(0.0f64, f64::max)
                    + GUTTER;
                let cell_h = nodes
                    .iter()
                    .map(|n| n.size.height)
                    .fold(0.0f64, f64::max)
                    + GUTTER;
                nodes
                    .iter()
                    .enumerate()
                    .map(|(i, n)| {
                        let col = i % columns;
                        let row = i / columns;
                        (n.id, Point::new(col as f64 * cell_w, row as f64 * cell_h))
                    })
                    .collect()
            }
            LayoutPreset::Radial => {
                let count = nodes.len() as f64;
                let max_extent = nodes
                    .iter()
                    .map(|n| n.size.width.max(n.size.height))
                    .fold(0.0f64, f64::max);
                // Enough circumference that neighbours do not overlap.
                let radius = ((max_extent + GUTTER) * count / std::f64::consts::TAU)
                    .max(max_extent + GUTTER);
                nodes
                    .iter()
                    .enumerate()
                    .map(|(i, n)| {
                        let angle = std::f64::consts::TAU * i as f64 / count;
                        (
                            n.id,
                            Point::new(radius * angle.cos(), radius * angle.sin()),
                        )
                    })
                    .collect()
            }
        };

        Ok(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Node, NodeKind};

    fn layout_nodes(count: usize) -> Vec<LayoutNode> {
        (0..count)
            .map(|i| {
                LayoutNode::from_node(&Node::new(
                    NodeKind::Server,
                    Point::new(i as f64 * 7.0, 13.0),
                ))
            })
            .collect()
    }

    #[test]
    fn test_horizontal_spaces_by_width() {
        let nodes = layout_nodes(3);
        let out = BuiltinLayout
            .layout(&nodes, &[], LayoutPreset::Horizontal)
            .unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].1, Point::new(0.0, 0.0));
        assert_eq!(out[1].1, Point::new(220.0, 0.0));
        assert_eq!(out[2].1, Point::new(440.0, 0.0));
    }

    #[test]
    fn test_grid_shape() {
        let nodes = layout_nodes(5);
        let out = BuiltinLayout.layout(&nodes, &[], LayoutPreset::Grid).unwrap();
        // 5 nodes round up to a 3-wide grid.
        assert_eq!(out[3].1.y, out[4].1.y);
        assert!(out[3].1.y > out[0].1.y);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let err = BuiltinLayout
            .layout(&[], &[], LayoutPreset::Horizontal)
            .unwrap_err();
        assert!(matches!(err, LayoutError::Empty));
    }

    #[test]
    fn test_radial_keeps_nodes_on_circle() {
        let nodes = layout_nodes(8);
        let out = BuiltinLayout
            .layout(&nodes, &[], LayoutPreset::Radial)
            .unwrap();
        let r0 = out[0].1.to_vec2().hypot();
        for (_, p) in &out {
            assert!((p.to_vec2().hypot() - r0).abs() < 1e-9);
        }
    }
}
