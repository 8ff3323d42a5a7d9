//! Priority-ordered hit-testing over the scene.
//!
//! The order is load-bearing: handles win over the node bodies that contain
//! them (otherwise connections cannot be started), edges win over node
//! bodies (otherwise an edge passing over a node is unselectable), and
//! groups lose to everything drawn on top of them.

use crate::geometry::EdgeCurve;
use crate::scene::{EdgeId, GroupId, HandleSide, NodeId, Scene};
use kurbo::Point;

/// Pick radius around a connection handle, in screen units.
pub const HANDLE_RADIUS: f64 = 8.0;

/// Minimum edge pick tolerance, in screen units.
pub const EDGE_BASE_TOLERANCE: f64 = 15.0;

/// What a world point resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// A connection handle on a node.
    Handle { node: NodeId, side: HandleSide },
    /// An edge curve.
    Edge(EdgeId),
    /// A node body (bounding-box containment).
    Node(NodeId),
    /// A group's collapse/expand glyph.
    GroupToggle(GroupId),
    /// A group body.
    Group(GroupId),
}

/// Resolve a world point against the scene in strict priority order:
/// handles, then edges, then node bodies, then groups (topmost first).
/// Tolerances shrink with zoom so picking feels constant-size on screen.
pub fn hit_test(scene: &Scene, point: Point, zoom: f64) -> Option<HitTarget> {
    let zoom = if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 };

    if let Some(hit) = hit_handle(scene, point, zoom) {
        return Some(hit);
    }
    if let Some(hit) = hit_edge(scene, point, zoom) {
        return Some(hit);
    }
    if let Some(hit) = hit_node(scene, point) {
        return Some(hit);
    }
    hit_group(scene, point)
}

/// Handles are checked before node bodies even though they lie inside the
/// node's bounding box.
fn hit_handle(scene: &Scene, point: Point, zoom: f64) -> Option<HitTarget> {
    let radius = HANDLE_RADIUS / zoom;
    for node in scene.node_order.iter().rev().filter_map(|id| scene.nodes.get(id)) {
        if !node.visible {
            continue;
        }
        for side in HandleSide::ALL {
            if (node.handle_anchor(side) - point).hypot() <= radius {
                return Some(HitTarget::Handle {
                    node: node.id,
                    side,
                });
            }
        }
    }
    None
}

/// The closest live visible edge within tolerance wins.
fn hit_edge(scene: &Scene, point: Point, zoom: f64) -> Option<HitTarget> {
    let mut best: Option<(f64, EdgeId)> = None;
    for edge in scene.live_edges().filter(|e| e.visible) {
        let Some((source, target)) = scene.edge_endpoints(edge) else {
            continue;
        };
        if !source.visible || !target.visible {
            continue;
        }
        let tolerance = EDGE_BASE_TOLERANCE.max(edge.width + 10.0) / zoom;
        let dist = EdgeCurve::between(source, target, edge).min_distance_to(point);
        if dist < tolerance && best.map_or(true, |(d, _)| dist < d) {
            best = Some((dist, edge.id));
        }
    }
    best.map(|(_, id)| HitTarget::Edge(id))
}

fn hit_node(scene: &Scene, point: Point) -> Option<HitTarget> {
    scene.node_at(point).map(HitTarget::Node)
}

/// Groups are tested last, topmost (most recently created) first. The
/// collapse glyph is special-cased before generic group selection. A point
/// on a member node never reaches here because node bodies win earlier.
fn hit_group(scene: &Scene, point: Point) -> Option<HitTarget> {
    for group in scene
        .group_order
        .iter()
        .rev()
        .filter_map(|id| scene.groups.get(id))
    {
        if !group.visible {
            continue;
        }
        if group.toggle_contains(point) {
            return Some(HitTarget::GroupToggle(group.id));
        }
        if group.bounds.contains(point) {
            return Some(HitTarget::Group(group.id));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Edge, Node, NodeKind};
    use kurbo::Size;

    fn make_node(scene: &mut Scene, x: f64, y: f64) -> NodeId {
        let mut node = Node::new(NodeKind::Server, Point::new(x, y));
        node.size = Size::new(200.0, 100.0);
        scene.add_node(node)
    }

    #[test]
    fn test_handle_beats_node_body() {
        let mut scene = Scene::new();
        let a = make_node(&mut scene, 0.0, 0.0);

        // The output handle anchor (200, 50) is on the node's boundary; a
        // point just inside the box but within handle radius must resolve
        // to the handle, not the body.
        let hit = hit_test(&scene, Point::new(195.0, 50.0), 1.0);
        assert_eq!(
            hit,
            Some(HitTarget::Handle {
                node: a,
                side: HandleSide::Output
            })
        );
    }

    #[test]
    fn test_handle_radius_scales_with_zoom() {
        let mut scene = Scene::new();
        let a = make_node(&mut scene, 0.0, 0.0);

        // 6 world units from the anchor: inside at zoom 1, outside at zoom 2.
        let probe = Point::new(194.0, 50.0);
        assert!(matches!(
            hit_test(&scene, probe, 1.0),
            Some(HitTarget::Handle { node, .. }) if node == a
        ));
        assert_eq!(hit_test(&scene, probe, 2.0), Some(HitTarget::Node(a)));
    }

    #[test]
    fn test_edge_beats_node_body() {
        let mut scene = Scene::new();
        let a = make_node(&mut scene, 0.0, 0.0);
        let b = make_node(&mut scene, 600.0, 0.0);
        // A node sitting right on the curve's path between a and b.
        let c = make_node(&mut scene, 300.0, 0.0);
        let mut edge = Edge::new(a, HandleSide::Output, b, HandleSide::Input);
        edge.curvature = 0.0;
        let edge_id = scene.add_edge(edge);

        // (350, 50) is inside node c's box and on the straight curve, clear
        // of every connection handle.
        let hit = hit_test(&scene, Point::new(350.0, 50.0), 1.0);
        assert_eq!(hit, Some(HitTarget::Edge(edge_id)));
        let _ = c;
    }

    #[test]
    fn test_node_beats_group() {
        let mut scene = Scene::new();
        let a = make_node(&mut scene, 0.0, 0.0);
        let b = make_node(&mut scene, 400.0, 0.0);
        let group = scene.group_nodes(&[a, b], 20.0).unwrap();

        assert_eq!(hit_test(&scene, Point::new(50.0, 50.0), 1.0), Some(HitTarget::Node(a)));
        // Between the nodes only the group remains.
        assert_eq!(
            hit_test(&scene, Point::new(300.0, 50.0), 1.0),
            Some(HitTarget::Group(group))
        );
    }

    #[test]
    fn test_group_toggle_beats_group_body() {
        let mut scene = Scene::new();
        let a = make_node(&mut scene, 0.0, 0.0);
        let b = make_node(&mut scene, 400.0, 0.0);
        let group = scene.group_nodes(&[a, b], 20.0).unwrap();
        let toggle = scene.group(group).unwrap().toggle_rect();

        let hit = hit_test(&scene, toggle.center(), 1.0);
        assert_eq!(hit, Some(HitTarget::GroupToggle(group)));
    }

    #[test]
    fn test_topmost_group_wins() {
        let mut scene = Scene::new();
        let a = make_node(&mut scene, 0.0, 0.0);
        let b = make_node(&mut scene, 400.0, 0.0);
        let first = scene.group_nodes(&[a, b], 20.0).unwrap();
        let second = scene.group_nodes(&[a, b], 60.0).unwrap();
        let _ = first;

        // Both groups cover this point; the most recently created wins.
        assert_eq!(
            hit_test(&scene, Point::new(300.0, 50.0), 1.0),
            Some(HitTarget::Group(second))
        );
    }

    #[test]
    fn test_empty_canvas_misses() {
        let mut scene = Scene::new();
        make_node(&mut scene, 0.0, 0.0);
        assert_eq!(hit_test(&scene, Point::new(5000.0, 5000.0), 1.0), None);
    }

    #[test]
    fn test_invisible_node_is_transparent() {
        let mut scene = Scene::new();
        let a = make_node(&mut scene, 0.0, 0.0);
        scene.node_mut(a).unwrap().visible = false;
        assert_eq!(hit_test(&scene, Point::new(50.0, 50.0), 1.0), None);
    }
}
