//! Builds the per-frame display list from the engine state.
//!
//! Paint order is fixed: grid, group plates, edges, nodes, selection and
//! handles, packets. Everything is emitted in world coordinates.

use crate::display::DisplayList;
use fluxboard_core::animation::{Direction, Packet};
use fluxboard_core::geometry::{taper_width, EdgeCurve, CURVE_SAMPLES};
use fluxboard_core::hit::HANDLE_RADIUS;
use fluxboard_core::scene::{Edge, Group, Node, NodeId, NodeShape, PacketShape, Scene};
use fluxboard_core::snap::GRID_SIZE;
use fluxboard_core::{Camera, Engine};
use kurbo::{BezPath, Circle, Point, Rect, RoundedRect, Shape, Size, Vec2};
use peniko::Color;

/// Curve flattening tolerance for shape outlines.
const PATH_TOLERANCE: f64 = 0.1;

/// Grid lines are dropped entirely once a frame would need more than this.
const MAX_GRID_LINES: usize = 400;

const LABEL_PLATE_PADDING: f64 = 6.0;

/// Everything the painter needs for one frame.
pub struct RenderContext<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub packets: &'a [Packet],
    pub selection: &'a [NodeId],
    pub selected_edge: Option<fluxboard_core::EdgeId>,
    pub viewport_size: Size,
    pub background_color: Color,
    pub selection_color: Color,
    pub show_grid: bool,
}

impl<'a> RenderContext<'a> {
    pub fn new(scene: &'a Scene, camera: &'a Camera, viewport_size: Size) -> Self {
        Self {
            scene,
            camera,
            packets: &[],
            selection: &[],
            selected_edge: None,
            viewport_size,
            background_color: Color::from_rgba8(250, 250, 250, 255),
            selection_color: Color::from_rgba8(59, 130, 246, 255),
            show_grid: true,
        }
    }

    /// A context covering the whole engine session.
    pub fn from_engine(engine: &'a Engine, viewport_size: Size) -> Self {
        Self {
            packets: engine.scheduler().packets(),
            selection: engine.selection(),
            selected_edge: engine.selected_edge(),
            ..Self::new(engine.scene(), engine.camera(), viewport_size)
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_grid(mut self, show: bool) -> Self {
        self.show_grid = show;
        self
    }
}

/// Build the display list for one frame.
pub fn build_display_list(ctx: &RenderContext) -> DisplayList {
    let mut list = DisplayList::new(ctx.camera.transform());

    if ctx.show_grid {
        paint_grid(ctx, &mut list);
    }
    for group in ctx
        .scene
        .group_order
        .iter()
        .filter_map(|id| ctx.scene.groups.get(id))
    {
        if group.visible {
            paint_group(group, &mut list);
        }
    }
    for edge in ctx.scene.live_edges() {
        if edge_is_drawn(ctx.scene, edge) {
            paint_edge(ctx, edge, &mut list);
        }
    }
    for node in ctx.scene.nodes_ordered() {
        if node.visible && !hidden_by_group(ctx.scene, node.id) {
            paint_node(node, &mut list);
        }
    }
    for id in ctx.selection {
        if let Some(node) = ctx.scene.node(*id) {
            paint_selection(ctx, node, &mut list);
        }
    }
    for packet in ctx.packets {
        paint_packet(ctx, packet, &mut list);
    }

    log::trace!("display list: {} ops", list.len());
    list
}

/// Members of a collapsed group are not drawn.
fn hidden_by_group(scene: &Scene, node: NodeId) -> bool {
    scene
        .groups
        .values()
        .any(|g| g.collapsed && g.node_ids.contains(&node))
}

fn edge_is_drawn(scene: &Scene, edge: &Edge) -> bool {
    if !edge.visible {
        return false;
    }
    let visible_end = |id: NodeId| {
        scene
            .node(id)
            .is_some_and(|n| n.visible && !hidden_by_group(scene, id))
    };
    visible_end(edge.source) && visible_end(edge.target)
}

fn paint_grid(ctx: &RenderContext, list: &mut DisplayList) {
    let visible = ctx.camera.visible_world_rect(ctx.viewport_size);
    let columns = (visible.width() / GRID_SIZE) as usize + 2;
    let rows = (visible.height() / GRID_SIZE) as usize + 2;
    if columns + rows > MAX_GRID_LINES {
        return;
    }

    let color = Color::from_rgba8(226, 232, 240, 255);
    let width = 1.0 / ctx.camera.zoom;
    let mut path = BezPath::new();

    let mut x = (visible.x0 / GRID_SIZE).floor() * GRID_SIZE;
    while x <= visible.x1 {
        path.move_to(Point::new(x, visible.y0));
        path.line_to(Point::new(x, visible.y1));
        x += GRID_SIZE;
    }
    let mut y = (visible.y0 / GRID_SIZE).floor() * GRID_SIZE;
    while y <= visible.y1 {
        path.move_to(Point::new(visible.x0, y));
        path.line_to(Point::new(visible.x1, y));
        y += GRID_SIZE;
    }
    list.stroke(path, color, width);
}

fn paint_group(group: &Group, list: &mut DisplayList) {
    let plate = RoundedRect::from_rect(group.bounds, 8.0);
    list.fill(plate.to_path(PATH_TOLERANCE), group.fill.into());
    list.stroke(plate.to_path(PATH_TOLERANCE), group.border.into(), 1.5);

    if !group.label.is_empty() {
        list.text(
            Point::new(group.bounds.x0 + 10.0, group.bounds.y0 + 16.0),
            group.label.clone(),
            12.0,
            group.border.into(),
        );
    }

    // Collapse toggle glyph: minus when expanded, plus when collapsed.
    let toggle = group.toggle_rect();
    list.stroke(toggle.to_path(PATH_TOLERANCE), group.border.into(), 1.0);
    let center = toggle.center();
    let half = toggle.width() * 0.25;
    let mut glyph = BezPath::new();
    glyph.move_to(Point::new(center.x - half, center.y));
    glyph.line_to(Point::new(center.x + half, center.y));
    if group.collapsed {
        glyph.move_to(Point::new(center.x, center.y - half));
        glyph.line_to(Point::new(center.x, center.y + half));
    }
    list.stroke(glyph, group.border.into(), 1.5);
}

fn paint_edge(ctx: &RenderContext, edge: &Edge, list: &mut DisplayList) {
    let Some((source, target)) = ctx.scene.edge_endpoints(edge) else {
        return;
    };
    let curve = EdgeCurve::between(source, target, edge);
    let color: Color = edge.color.into();

    match edge.style.dash_pattern(edge.width) {
        // Dashed styles stroke the centerline at constant width; the taper
        // does not compose with dash gaps.
        Some(dash) => {
            list.stroke_dashed(centerline(&curve), color, edge.width, dash);
            list.fill(polygon(&curve.target_arrowhead(edge.arrow_size)), color);
            if edge.bidirectional {
                list.fill(polygon(&curve.source_arrowhead(edge.arrow_size)), color);
            }
        }
        // A bidirectional body keeps uniform width, with a head at each end.
        None if edge.bidirectional => {
            list.stroke(centerline(&curve), color, edge.width);
            list.fill(polygon(&curve.target_arrowhead(edge.arrow_size)), color);
            list.fill(polygon(&curve.source_arrowhead(edge.arrow_size)), color);
        }
        // The taper substitutes for the arrowhead on one-way edges.
        None => list.fill(tapered_strip(&curve, edge.width), color),
    }

    if ctx.selected_edge == Some(edge.id) {
        list.stroke(
            centerline(&curve),
            ctx.selection_color,
            (edge.width + 4.0) / ctx.camera.zoom.max(0.1),
        );
    }

    if !edge.label.is_empty() {
        paint_edge_label(edge, &curve, list);
    }
}

fn centerline(curve: &EdgeCurve) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(curve.cubic.p0);
    path.curve_to(curve.cubic.p1, curve.cubic.p2, curve.cubic.p3);
    path
}

/// The edge body as a filled polygon whose width tapers toward the target.
fn tapered_strip(curve: &EdgeCurve, width: f64) -> BezPath {
    let samples = curve.flatten(CURVE_SAMPLES);
    let n = samples.len() - 1;
    let mut left = Vec::with_capacity(samples.len());
    let mut right = Vec::with_capacity(samples.len());

    for (i, point) in samples.iter().enumerate() {
        let t = i as f64 / n as f64;
        let tangent = curve.tangent_at(t);
        let len = tangent.hypot();
        let normal = if len > 0.0 {
            Vec2::new(-tangent.y / len, tangent.x / len)
        } else {
            Vec2::new(0.0, 1.0)
        };
        let half = taper_width(width, t) * 0.5;
        left.push(*point + normal * half);
        right.push(*point - normal * half);
    }

    let mut path = BezPath::new();
    path.move_to(left[0]);
    for p in &left[1..] {
        path.line_to(*p);
    }
    for p in right.iter().rev() {
        path.line_to(*p);
    }
    path.close_path();
    path
}

fn paint_edge_label(edge: &Edge, curve: &EdgeCurve, list: &mut DisplayList) {
    let anchor = curve.label_anchor();
    let font_size = 12.0;
    let text_width = edge.label.chars().count() as f64 * font_size * 0.6;
    let plate = Rect::from_center_size(
        anchor,
        Size::new(
            text_width + LABEL_PLATE_PADDING * 2.0,
            font_size + LABEL_PLATE_PADDING * 2.0,
        ),
    );
    list.fill(
        RoundedRect::from_rect(plate, 4.0).to_path(PATH_TOLERANCE),
        Color::from_rgba8(255, 255, 255, 230),
    );
    list.text(anchor, edge.label.clone(), font_size, edge.color.into());
}

fn node_path(node: &Node) -> BezPath {
    let bounds = node.bounds();
    match node.shape {
        NodeShape::Rectangle => bounds.to_path(PATH_TOLERANCE),
        NodeShape::Rounded => RoundedRect::from_rect(bounds, 10.0).to_path(PATH_TOLERANCE),
        NodeShape::Circle => kurbo::Ellipse::from_rect(bounds).to_path(PATH_TOLERANCE),
        NodeShape::Diamond => {
            let c = bounds.center();
            polygon(&[
                Point::new(c.x, bounds.y0),
                Point::new(bounds.x1, c.y),
                Point::new(c.x, bounds.y1),
                Point::new(bounds.x0, c.y),
            ])
        }
    }
}

fn paint_node(node: &Node, list: &mut DisplayList) {
    if node.shadow {
        let shifted = node.bounds() + Vec2::new(3.0, 3.0);
        list.fill(
            RoundedRect::from_rect(shifted, 10.0).to_path(PATH_TOLERANCE),
            Color::from_rgba8(0, 0, 0, 40),
        );
    }

    let path = node_path(node);
    list.fill(path.clone(), node.fill.into());
    list.stroke(path, node.border.into(), node.border_width);

    if !node.label.is_empty() {
        list.text(
            node.bounds().center(),
            node.label.clone(),
            node.font_size,
            node.text_color.into(),
        );
    }
}

/// Selection outline plus the four connection handles, both screen-constant
/// in thickness and radius.
fn paint_selection(ctx: &RenderContext, node: &Node, list: &mut DisplayList) {
    let zoom = ctx.camera.zoom.max(0.1);
    let outline = node.bounds().inflate(4.0 / zoom, 4.0 / zoom);
    list.stroke(outline.to_path(PATH_TOLERANCE), ctx.selection_color, 2.0 / zoom);

    for side in fluxboard_core::HandleSide::ALL {
        let anchor = node.handle_anchor(side);
        let handle = Circle::new(anchor, HANDLE_RADIUS / zoom);
        list.fill(handle.to_path(PATH_TOLERANCE), Color::WHITE);
        list.stroke(handle.to_path(PATH_TOLERANCE), ctx.selection_color, 1.5 / zoom);
    }
}

fn paint_packet(ctx: &RenderContext, packet: &Packet, list: &mut DisplayList) {
    paint_packet_marker(packet.position, packet, 1.0, list);

    if packet.trail {
        let Some(edge) = ctx.scene.edge(packet.edge) else {
            return;
        };
        let Some((source, target)) = ctx.scene.edge_endpoints(edge) else {
            return;
        };
        let curve = EdgeCurve::between(source, target, edge);
        let step = match packet.direction {
            Direction::Forward => -0.03,
            Direction::Reverse => 0.03,
        };
        for i in 1..=3 {
            let t = packet.progress + step * i as f64;
            if !(0.0..=1.0).contains(&t) {
                break;
            }
            let opacity = 1.0 - i as f64 * 0.25;
            paint_packet_marker(curve.point_at(t), packet, opacity, list);
        }
    }
}

fn paint_packet_marker(position: Point, packet: &Packet, opacity: f64, list: &mut DisplayList) {
    let color: Color = packet.color.with_opacity(opacity).into();
    let half = packet.size * 0.5;
    let path = match packet.shape {
        PacketShape::Circle => Circle::new(position, half).to_path(PATH_TOLERANCE),
        PacketShape::Square => {
            Rect::from_center_size(position, Size::new(packet.size, packet.size))
                .to_path(PATH_TOLERANCE)
        }
        PacketShape::Diamond => polygon(&[
            Point::new(position.x, position.y - half),
            Point::new(position.x + half, position.y),
            Point::new(position.x, position.y + half),
            Point::new(position.x - half, position.y),
        ]),
        PacketShape::Triangle => polygon(&[
            Point::new(position.x, position.y - half),
            Point::new(position.x + half, position.y + half),
            Point::new(position.x - half, position.y + half),
        ]),
    };
    list.fill(path, color);
}

fn polygon(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(points[0]);
    for p in &points[1..] {
        path.line_to(*p);
    }
    path.close_path();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DrawOp;
    use fluxboard_core::scene::{AnimationConfig, HandleSide, NodeKind, StrokeStyle};
    use fluxboard_core::Scene;

    fn two_node_scene() -> (Scene, NodeId, NodeId) {
        let mut scene = Scene::new();
        let a = scene.add_node(Node::new(NodeKind::Server, Point::new(0.0, 0.0)));
        let b = scene.add_node(Node::new(NodeKind::Database, Point::new(400.0, 0.0)));
        (scene, a, b)
    }

    fn fill_count(list: &DisplayList) -> usize {
        list.ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Fill { .. }))
            .count()
    }

    #[test]
    fn test_empty_scene_paints_only_grid() {
        let scene = Scene::new();
        let camera = Camera::new();
        let ctx = RenderContext::new(&scene, &camera, Size::new(800.0, 600.0));
        let list = build_display_list(&ctx);
        assert_eq!(list.len(), 1);
        assert_eq!(fill_count(&list), 0);
    }

    #[test]
    fn test_node_emits_fill_stroke_and_label() {
        let (scene, _, _) = two_node_scene();
        let camera = Camera::new();
        let ctx = RenderContext::new(&scene, &camera, Size::new(800.0, 600.0)).with_grid(false);
        let list = build_display_list(&ctx);

        assert_eq!(fill_count(&list), 2);
        let texts = list
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { .. }))
            .count();
        assert_eq!(texts, 2);
    }

    #[test]
    fn test_one_way_solid_edge_tapers_without_arrowhead() {
        let (mut scene, a, b) = two_node_scene();
        scene.add_edge(Edge::new(a, HandleSide::Output, b, HandleSide::Input));
        let camera = Camera::new();
        let ctx = RenderContext::new(&scene, &camera, Size::new(800.0, 600.0)).with_grid(false);
        let list = build_display_list(&ctx);

        // Two node fills plus the strip; the taper is the direction cue.
        assert_eq!(fill_count(&list), 3);
    }

    #[test]
    fn test_bidirectional_solid_edge_uniform_with_two_heads() {
        let (mut scene, a, b) = two_node_scene();
        let mut edge = Edge::new(a, HandleSide::Output, b, HandleSide::Input);
        edge.bidirectional = true;
        let width = edge.width;
        scene.add_edge(edge);
        let camera = Camera::new();
        let ctx = RenderContext::new(&scene, &camera, Size::new(800.0, 600.0)).with_grid(false);
        let list = build_display_list(&ctx);

        // Two node fills plus both arrowheads; the body is a stroke.
        assert_eq!(fill_count(&list), 4);
        let uniform_body = list.ops().iter().any(|op| {
            matches!(op, DrawOp::Stroke { width: w, dash: None, .. } if *w == width)
        });
        assert!(uniform_body);
    }

    #[test]
    fn test_dashed_edge_strokes_with_pattern() {
        let (mut scene, a, b) = two_node_scene();
        let mut edge = Edge::new(a, HandleSide::Output, b, HandleSide::Input);
        edge.style = StrokeStyle::Dashed;
        edge.bidirectional = true;
        scene.add_edge(edge);
        let camera = Camera::new();
        let ctx = RenderContext::new(&scene, &camera, Size::new(800.0, 600.0)).with_grid(false);
        let list = build_display_list(&ctx);

        let dashed = list.ops().iter().any(
            |op| matches!(op, DrawOp::Stroke { dash: Some(d), .. } if d == &vec![8.0, 6.0]),
        );
        assert!(dashed);
        // Two node fills plus both arrowheads.
        assert_eq!(fill_count(&list), 4);
    }

    #[test]
    fn test_collapsed_group_hides_members_and_edges() {
        let (mut scene, a, b) = two_node_scene();
        scene.add_edge(Edge::new(a, HandleSide::Output, b, HandleSide::Input));
        let group = scene.group_nodes(&[a, b], 20.0).unwrap();
        scene.groups.get_mut(&group).unwrap().collapsed = true;

        let camera = Camera::new();
        let ctx = RenderContext::new(&scene, &camera, Size::new(800.0, 600.0)).with_grid(false);
        let list = build_display_list(&ctx);

        // Only the group plate fill remains.
        assert_eq!(fill_count(&list), 1);
    }

    #[test]
    fn test_selection_draws_four_handles() {
        let (scene, a, _) = two_node_scene();
        let camera = Camera::new();
        let selection = [a];
        let mut ctx =
            RenderContext::new(&scene, &camera, Size::new(800.0, 600.0)).with_grid(false);
        ctx.selection = &selection;
        let list = build_display_list(&ctx);

        // Node fills plus four white handle fills.
        assert_eq!(fill_count(&list), 2 + 4);
    }

    #[test]
    fn test_packets_are_painted() {
        let (mut scene, a, b) = two_node_scene();
        let edge = scene.add_edge(Edge::new(a, HandleSide::Output, b, HandleSide::Input));
        scene.set_animation(
            edge,
            AnimationConfig {
                enabled: true,
                frequency: 1,
                ..AnimationConfig::default()
            },
        );

        let camera = Camera::new();
        let mut scheduler = fluxboard_core::PacketScheduler::new();
        scheduler.tick(&scene, &camera, Size::new(800.0, 600.0));
        assert_eq!(scheduler.packets().len(), 1);

        let mut ctx =
            RenderContext::new(&scene, &camera, Size::new(800.0, 600.0)).with_grid(false);
        ctx.packets = scheduler.packets();
        let list = build_display_list(&ctx);

        // Two node fills, edge strip, one packet marker.
        assert_eq!(fill_count(&list), 4);
    }
}
