//! Edge curve geometry: control-point derivation, sampling, taper and
//! arrowhead math, label placement.

use crate::scene::{Edge, Node};
use kurbo::{CubicBez, ParamCurve, ParamCurveDeriv, ParamCurveExtrema, Point, Rect, Vec2};

/// Cap on the horizontal control-point offset, preventing runaway control
/// points on very long edges.
pub const MAX_CONTROL_OFFSET: f64 = 150.0;

/// Number of parametric samples used for drawing and hit-testing the curve.
pub const CURVE_SAMPLES: usize = 20;

/// Tapered edges shrink to this fraction of the base width at the target.
pub const TAPER_END_FRACTION: f64 = 0.3;

/// Parametric position of the target-end arrowhead tangent.
pub const ARROW_TANGENT_T_TARGET: f64 = 0.95;

/// Parametric position of the source-end arrowhead tangent.
pub const ARROW_TANGENT_T_SOURCE: f64 = 0.05;

/// The cubic bezier realizing one edge between two node handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCurve {
    pub cubic: CubicBez,
}

impl EdgeCurve {
    /// Build the curve for an edge between two resolved nodes.
    ///
    /// Endpoints are the named handle anchors; both control points are offset
    /// horizontally by `min(|dx| * curvature, MAX_CONTROL_OFFSET)` where `dx`
    /// is the horizontal distance between the node origins. Curvature 0
    /// degenerates toward a straight line.
    pub fn between(source: &Node, target: &Node, edge: &Edge) -> Self {
        let p0 = source.handle_anchor(edge.source_handle);
        let p3 = target.handle_anchor(edge.target_handle);
        let dx = target.position.x - source.position.x;
        Self::from_anchors(p0, p3, dx, edge.curvature)
    }

    /// Build a curve from raw anchors and the horizontal node distance.
    pub fn from_anchors(p0: Point, p3: Point, dx: f64, curvature: f64) -> Self {
        let offset = (dx.abs() * curvature.clamp(0.0, 1.0)).min(MAX_CONTROL_OFFSET);
        let c1 = Point::new(p0.x + offset, p0.y);
        let c2 = Point::new(p3.x - offset, p3.y);
        Self {
            cubic: CubicBez::new(p0, c1, c2, p3),
        }
    }

    /// Evaluate the curve at parameter `t` in [0, 1].
    pub fn point_at(&self, t: f64) -> Point {
        self.cubic.eval(t.clamp(0.0, 1.0))
    }

    /// Unit tangent at parameter `t`, falling back to the chord direction
    /// for degenerate (zero-derivative) configurations.
    pub fn tangent_at(&self, t: f64) -> Vec2 {
        let d = self.cubic.deriv().eval(t.clamp(0.0, 1.0)).to_vec2();
        let len = d.hypot();
        if len < f64::EPSILON {
            let chord = self.cubic.p3 - self.cubic.p0;
            let chord_len = chord.hypot();
            if chord_len < f64::EPSILON {
                Vec2::new(1.0, 0.0)
            } else {
                chord / chord_len
            }
        } else {
            d / len
        }
    }

    /// Sample the curve into `n` points, including both endpoints.
    pub fn flatten(&self, n: usize) -> Vec<Point> {
        let n = n.max(2);
        (0..n)
            .map(|i| self.point_at(i as f64 / (n - 1) as f64))
            .collect()
    }

    /// Minimum distance from a point to the sampled curve.
    pub fn min_distance_to(&self, point: Point) -> f64 {
        self.flatten(CURVE_SAMPLES)
            .into_iter()
            .map(|p| (p - point).hypot())
            .fold(f64::INFINITY, f64::min)
    }

    /// Rough centroid of the control polygon, where labels are centered.
    pub fn label_anchor(&self) -> Point {
        let c = self.cubic;
        Point::new(
            (c.p0.x + c.p1.x + c.p2.x + c.p3.x) / 4.0,
            (c.p0.y + c.p1.y + c.p2.y + c.p3.y) / 4.0,
        )
    }

    /// Tight bounding box of the curve, used for viewport culling.
    pub fn bounding_box(&self) -> Rect {
        self.cubic.bounding_box()
    }

    /// Arrowhead triangle at the target end: tip at the endpoint, base
    /// corners built from the local tangent at t = 0.95.
    pub fn target_arrowhead(&self, size: f64) -> [Point; 3] {
        arrowhead(self.cubic.p3, self.tangent_at(ARROW_TANGENT_T_TARGET), size)
    }

    /// Arrowhead triangle at the source end, pointing back along the curve.
    pub fn source_arrowhead(&self, size: f64) -> [Point; 3] {
        arrowhead(self.cubic.p0, -self.tangent_at(ARROW_TANGENT_T_SOURCE), size)
    }
}

/// Stroke width of a tapered edge at parameter `t`: full width at the
/// source shrinking linearly to 30% at the target.
pub fn taper_width(base: f64, t: f64) -> f64 {
    base * (1.0 - (1.0 - TAPER_END_FRACTION) * t.clamp(0.0, 1.0))
}

/// Build an arrowhead triangle with its tip at `tip`, pointing along `dir`.
fn arrowhead(tip: Point, dir: Vec2, size: f64) -> [Point; 3] {
    let perp = Vec2::new(-dir.y, dir.x);
    let back = Point::new(tip.x - dir.x * size, tip.y - dir.y * size);
    [
        tip,
        Point::new(back.x + perp.x * size * 0.5, back.y + perp.y * size * 0.5),
        Point::new(back.x - perp.x * size * 0.5, back.y - perp.y * size * 0.5),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Edge, HandleSide, Node, NodeKind};
    use kurbo::Size;

    fn make_node(x: f64, y: f64, w: f64, h: f64) -> Node {
        let mut node = Node::new(NodeKind::Server, Point::new(x, y));
        node.size = Size::new(w, h);
        node
    }

    #[test]
    fn test_endpoints_exact() {
        let a = make_node(0.0, 0.0, 200.0, 100.0);
        let b = make_node(300.0, 0.0, 200.0, 100.0);
        let edge = Edge::new(a.id, HandleSide::Output, b.id, HandleSide::Input);
        let curve = EdgeCurve::between(&a, &b, &edge);

        assert_eq!(curve.point_at(0.0), a.handle_anchor(HandleSide::Output));
        assert_eq!(curve.point_at(1.0), b.handle_anchor(HandleSide::Input));
    }

    #[test]
    fn test_control_offset_capped_at_150() {
        // dx = 300, curvature 0.5 -> offset min(150, 150) = 150 on each side.
        let a = make_node(0.0, 0.0, 200.0, 100.0);
        let b = make_node(300.0, 0.0, 200.0, 100.0);
        let mut edge = Edge::new(a.id, HandleSide::Output, b.id, HandleSide::Input);
        edge.curvature = 0.5;
        let curve = EdgeCurve::between(&a, &b, &edge);

        assert_eq!(curve.cubic.p1, Point::new(350.0, 50.0));
        assert_eq!(curve.cubic.p2, Point::new(150.0, 50.0));
        // Symmetric S-curve: control points mirror around the chord midpoint.
        let mid_x = (curve.cubic.p0.x + curve.cubic.p3.x) / 2.0;
        assert!((mid_x - (curve.cubic.p1.x + curve.cubic.p2.x) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_curvature_is_straight() {
        let a = make_node(0.0, 0.0, 100.0, 100.0);
        let b = make_node(400.0, 0.0, 100.0, 100.0);
        let mut edge = Edge::new(a.id, HandleSide::Output, b.id, HandleSide::Input);
        edge.curvature = 0.0;
        let curve = EdgeCurve::between(&a, &b, &edge);

        // Control points collapse onto the endpoints.
        assert_eq!(curve.cubic.p1, curve.cubic.p0);
        assert_eq!(curve.cubic.p2, curve.cubic.p3);
        let mid = curve.point_at(0.5);
        assert!((mid.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_taper_width() {
        assert!((taper_width(10.0, 0.0) - 10.0).abs() < f64::EPSILON);
        assert!((taper_width(10.0, 1.0) - 3.0).abs() < 1e-12);
        assert!((taper_width(10.0, 0.5) - 6.5).abs() < 1e-12);
    }

    #[test]
    fn test_flatten_sample_count() {
        let curve = EdgeCurve::from_anchors(Point::ZERO, Point::new(100.0, 0.0), 100.0, 0.5);
        let points = curve.flatten(CURVE_SAMPLES);
        assert_eq!(points.len(), CURVE_SAMPLES);
        assert_eq!(points[0], Point::ZERO);
        assert_eq!(points[CURVE_SAMPLES - 1], Point::new(100.0, 0.0));
    }

    #[test]
    fn test_label_anchor_is_control_polygon_centroid() {
        let curve = EdgeCurve::from_anchors(
            Point::new(0.0, 0.0),
            Point::new(100.0, 40.0),
            100.0,
            1.0,
        );
        let c = curve.cubic;
        let anchor = curve.label_anchor();
        assert!((anchor.x - (c.p0.x + c.p1.x + c.p2.x + c.p3.x) / 4.0).abs() < 1e-12);
        assert!((anchor.y - (c.p0.y + c.p1.y + c.p2.y + c.p3.y) / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_arrowhead_tips() {
        let curve = EdgeCurve::from_anchors(Point::ZERO, Point::new(100.0, 0.0), 100.0, 0.0);
        let head = curve.target_arrowhead(10.0);
        assert_eq!(head[0], Point::new(100.0, 0.0));
        // Base corners sit behind the tip.
        assert!(head[1].x < 100.0 && head[2].x < 100.0);

        let tail = curve.source_arrowhead(10.0);
        assert_eq!(tail[0], Point::ZERO);
        assert!(tail[1].x > 0.0 && tail[2].x > 0.0);
    }
}
