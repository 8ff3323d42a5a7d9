//! The interaction engine: consumes pointer/keyboard events, drives scene
//! mutations, and owns the per-frame tick.
//!
//! All mutation funnels through this type on a single thread. A pointer
//! event is fully processed before the next frame tick observes the result;
//! history capture is debounced so a drag collapses into one entry.

use crate::animation::PacketScheduler;
use crate::camera::{Camera, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};
use crate::history::History;
use crate::hit::{hit_test, HitTarget};
use crate::input::{EditorKey, Modifiers, PointerButton, PointerEvent};
use crate::layout::{LayoutEdge, LayoutNode, LayoutPreset, LayoutProvider};
use crate::scene::{
    AnimationConfig, Edge, EdgeId, GroupId, HandleSide, Node, NodeId, NodeKind, NodeShape, Rgba,
    Scene, StrokeStyle, DEFAULT_GROUP_PADDING,
};
use crate::serialize::SceneFile;
use crate::snap::snap_to_grid;
use kurbo::{Point, Size, Vec2};
use std::time::Instant;

/// What the engine is doing with incoming mutations.
///
/// While applying a history snapshot the engine must not re-record the
/// restore as a fresh change; an explicit mode is asserted on instead of a
/// free-floating boolean flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Editing,
    ApplyingHistory,
}

/// Current pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Idle,
    /// Dragging empty canvas; the viewport follows the cursor 1:1.
    Panning,
    DraggingNode {
        id: NodeId,
        /// World offset from the grab point to the node origin.
        offset: Vec2,
    },
    DraggingGroup {
        id: GroupId,
        /// World offset from the grab point to the group origin.
        offset: Vec2,
    },
    /// A connection has been started from a handle and awaits its target.
    Connecting {
        source: NodeId,
        handle: HandleSide,
    },
}

/// Host-level scene commands, the non-pointer mutation surface.
///
/// UI layers dispatch these instead of reaching into the scene, so every
/// mutation path records history uniformly.
#[derive(Debug, Clone)]
pub enum Command {
    AddNode { kind: NodeKind, position: Point },
    RemoveNode(NodeId),
    SetNodeLabel { id: NodeId, label: String },
    SetNodeShape { id: NodeId, shape: NodeShape },
    SetNodeFill { id: NodeId, fill: Rgba },
    SetNodeVisible { id: NodeId, visible: bool },
    AddEdge {
        source: NodeId,
        source_handle: HandleSide,
        target: NodeId,
        target_handle: HandleSide,
    },
    RemoveEdge(EdgeId),
    SetEdgeLabel { id: EdgeId, label: String },
    SetEdgeStyle { id: EdgeId, style: StrokeStyle },
    SetEdgeCurvature { id: EdgeId, curvature: f64 },
    SetEdgeBidirectional { id: EdgeId, bidirectional: bool },
    SetEdgeBounce { id: EdgeId, bounce: bool },
    SetAnimation { edge: EdgeId, config: AnimationConfig },
    RemoveGroup(GroupId),
    SetGroupLabel { id: GroupId, label: String },
    SetGroupCollapsed { id: GroupId, collapsed: bool },
}

/// The engine session: scene, camera, interaction state, selection, history,
/// and the packet scheduler, driven by host events and a per-frame tick.
#[derive(Debug)]
pub struct Engine {
    scene: Scene,
    camera: Camera,
    mode: Mode,
    interaction: Interaction,
    selection: Vec<NodeId>,
    selected_edge: Option<EdgeId>,
    context_target: Option<HitTarget>,
    history: History,
    scheduler: PacketScheduler,
    viewport_size: Size,
    /// Last pointer position in screen coordinates, for pan deltas.
    last_screen: Point,
    /// User-facing messages from failed collaborator calls.
    notices: Vec<String>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_scene(Scene::new())
    }

    pub fn with_scene(scene: Scene) -> Self {
        let history = History::new(&scene);
        Self {
            scene,
            camera: Camera::new(),
            mode: Mode::Editing,
            interaction: Interaction::Idle,
            selection: Vec::new(),
            selected_edge: None,
            context_target: None,
            history,
            scheduler: PacketScheduler::new(),
            viewport_size: Size::new(800.0, 600.0),
            last_screen: Point::ZERO,
            notices: Vec::new(),
        }
    }

    // --- accessors ---

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    pub fn selected_edge(&self) -> Option<EdgeId> {
        self.selected_edge
    }

    pub fn context_target(&self) -> Option<HitTarget> {
        self.context_target
    }

    pub fn scheduler(&self) -> &PacketScheduler {
        &self.scheduler
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport_size = Size::new(width, height);
    }

    /// Drain pending user-facing messages.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    // --- event handling ---

    /// Process a pointer event. Positions are screen coordinates.
    pub fn pointer(&mut self, event: PointerEvent, now: Instant) {
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => {
                self.last_screen = position;
                match button {
                    PointerButton::Primary => self.pointer_down(position, modifiers, now),
                    PointerButton::Secondary => {
                        // Context menu target resolves by the same priority
                        // order without changing interaction state.
                        let world = self.camera.screen_to_world(position);
                        self.context_target = hit_test(&self.scene, world, self.camera.zoom);
                    }
                    PointerButton::Middle => self.interaction = Interaction::Panning,
                }
            }
            PointerEvent::Move { position } => {
                self.pointer_move(position, now);
                self.last_screen = position;
            }
            PointerEvent::Up { position, button } => {
                self.last_screen = position;
                if button != PointerButton::Secondary {
                    self.pointer_up();
                }
            }
            PointerEvent::Scroll { position, delta } => {
                let factor = if delta.y < 0.0 {
                    ZOOM_IN_FACTOR
                } else {
                    ZOOM_OUT_FACTOR
                };
                self.camera.zoom_at(position, factor);
            }
        }
    }

    fn pointer_down(&mut self, screen: Point, modifiers: Modifiers, now: Instant) {
        let world = self.camera.screen_to_world(screen);

        match hit_test(&self.scene, world, self.camera.zoom) {
            Some(HitTarget::Handle { node, side }) => {
                if let Interaction::Connecting { source, handle } = self.interaction {
                    if source != node {
                        // Second handle press commits the connection.
                        let edge = Edge::new(source, handle, node, side);
                        self.scene.add_edge(edge);
                        self.record_change(now);
                        self.interaction = Interaction::Idle;
                    }
                    // Clicking a handle of the source node keeps the
                    // connection pending.
                } else {
                    self.interaction = Interaction::Connecting {
                        source: node,
                        handle: side,
                    };
                }
            }
            Some(HitTarget::Edge(id)) => {
                self.selected_edge = Some(id);
                self.interaction = Interaction::Idle;
            }
            Some(HitTarget::Node(id)) => {
                self.update_selection(id, modifiers);
                if let Some(node) = self.scene.node(id) {
                    self.interaction = Interaction::DraggingNode {
                        id,
                        offset: world - node.position,
                    };
                }
            }
            Some(HitTarget::GroupToggle(id)) => {
                if let Some(group) = self.scene.group_mut(id) {
                    group.collapsed = !group.collapsed;
                    self.record_change(now);
                }
                self.interaction = Interaction::Idle;
            }
            Some(HitTarget::Group(id)) => {
                if let Some(group) = self.scene.group(id) {
                    self.interaction = Interaction::DraggingGroup {
                        id,
                        offset: world - group.bounds.origin(),
                    };
                }
            }
            None => {
                // Empty canvas: pan, and abandon any pending connection.
                self.interaction = Interaction::Panning;
            }
        }
    }

    fn update_selection(&mut self, id: NodeId, modifiers: Modifiers) {
        self.selected_edge = None;
        if modifiers.multi_select() {
            if let Some(pos) = self.selection.iter().position(|n| *n == id) {
                self.selection.remove(pos);
            } else {
                self.selection.push(id);
            }
        } else if !self.selection.contains(&id) {
            self.selection = vec![id];
        }
    }

    fn pointer_move(&mut self, screen: Point, now: Instant) {
        let world = self.camera.screen_to_world(screen);

        match self.interaction {
            Interaction::Panning => {
                // Screen-space delta, undivided by zoom.
                self.camera.pan(screen - self.last_screen);
            }
            Interaction::DraggingNode { id, offset } => {
                let snapped = snap_to_grid(world - offset);
                if let Some(node) = self.scene.node_mut(id) {
                    if node.position != snapped {
                        node.position = snapped;
                        self.record_change(now);
                    }
                }
            }
            Interaction::DraggingGroup { id, offset } => {
                if let Some(group) = self.scene.group(id) {
                    let target = snap_to_grid(world - offset);
                    let delta = target - group.bounds.origin();
                    if delta.hypot() > 0.0 {
                        self.scene.translate_group(id, delta);
                        self.record_change(now);
                    }
                }
            }
            Interaction::Idle | Interaction::Connecting { .. } => {}
        }
    }

    fn pointer_up(&mut self) {
        // A pending connection survives pointer-up; it commits on the next
        // handle press or is canceled by Escape / empty-canvas press.
        if !matches!(self.interaction, Interaction::Connecting { .. }) {
            self.interaction = Interaction::Idle;
        }
    }

    /// Process a keyboard action.
    pub fn key(&mut self, key: EditorKey, now: Instant) {
        match key {
            EditorKey::Undo => self.undo(),
            EditorKey::Redo => self.redo(),
            EditorKey::Duplicate => {
                if !self.selection.is_empty() {
                    let copies = self.scene.duplicate_nodes(&self.selection.clone());
                    if !copies.is_empty() {
                        self.selection = copies;
                        self.record_change(now);
                    }
                }
            }
            EditorKey::Delete => {
                if self.selection.is_empty() && self.selected_edge.is_none() {
                    return;
                }
                for id in std::mem::take(&mut self.selection) {
                    self.scene.remove_node(id);
                }
                if let Some(edge) = self.selected_edge.take() {
                    self.scene.remove_edge(edge);
                }
                self.record_change(now);
            }
            EditorKey::Group => {
                let members = self.selection.clone();
                if self
                    .scene
                    .group_nodes(&members, DEFAULT_GROUP_PADDING)
                    .is_some()
                {
                    self.record_change(now);
                }
            }
            EditorKey::Escape => {
                // Cancels a pending connection and clears selection; history
                // is untouched.
                if matches!(self.interaction, Interaction::Connecting { .. }) {
                    self.interaction = Interaction::Idle;
                }
                self.selection.clear();
                self.selected_edge = None;
                self.context_target = None;
            }
            EditorKey::ResetZoom => self.camera.reset(),
        }
    }

    /// Apply a host command.
    pub fn dispatch(&mut self, command: Command, now: Instant) {
        let changed = self.apply_command(command);
        if changed {
            self.record_change(now);
        }
    }

    fn apply_command(&mut self, command: Command) -> bool {
        match command {
            Command::AddNode { kind, position } => {
                self.scene.add_node(Node::new(kind, position));
                true
            }
            Command::RemoveNode(id) => self.scene.remove_node(id).is_some(),
            Command::SetNodeLabel { id, label } => {
                self.scene.node_mut(id).map(|n| n.label = label).is_some()
            }
            Command::SetNodeShape { id, shape } => {
                self.scene.node_mut(id).map(|n| n.shape = shape).is_some()
            }
            Command::SetNodeFill { id, fill } => {
                self.scene.node_mut(id).map(|n| n.fill = fill).is_some()
            }
            Command::SetNodeVisible { id, visible } => {
                self.scene.node_mut(id).map(|n| n.visible = visible).is_some()
            }
            Command::AddEdge {
                source,
                source_handle,
                target,
                target_handle,
            } => {
                if self.scene.node(source).is_none() || self.scene.node(target).is_none() {
                    return false;
                }
                self.scene
                    .add_edge(Edge::new(source, source_handle, target, target_handle));
                true
            }
            Command::RemoveEdge(id) => self.scene.remove_edge(id).is_some(),
            Command::SetEdgeLabel { id, label } => {
                self.scene.edge_mut(id).map(|e| e.label = label).is_some()
            }
            Command::SetEdgeStyle { id, style } => {
                self.scene.edge_mut(id).map(|e| e.style = style).is_some()
            }
            Command::SetEdgeCurvature { id, curvature } => self
                .scene
                .edge_mut(id)
                .map(|e| e.curvature = curvature.clamp(0.0, 1.0))
                .is_some(),
            Command::SetEdgeBidirectional { id, bidirectional } => self
                .scene
                .edge_mut(id)
                .map(|e| e.bidirectional = bidirectional)
                .is_some(),
            Command::SetEdgeBounce { id, bounce } => {
                self.scene.edge_mut(id).map(|e| e.bounce = bounce).is_some()
            }
            Command::SetAnimation { edge, config } => self.scene.set_animation(edge, config),
            Command::RemoveGroup(id) => self.scene.remove_group(id).is_some(),
            Command::SetGroupLabel { id, label } => {
                self.scene.group_mut(id).map(|g| g.label = label).is_some()
            }
            Command::SetGroupCollapsed { id, collapsed } => self
                .scene
                .group_mut(id)
                .map(|g| g.collapsed = collapsed)
                .is_some(),
        }
    }

    // --- per-frame tick ---

    /// Advance one frame: move packets, then commit any debounced snapshot.
    pub fn frame(&mut self, now: Instant) {
        self.scheduler.tick(&self.scene, &self.camera, self.viewport_size);
        self.history.maybe_commit(&self.scene, now);
    }

    // --- history ---

    fn record_change(&mut self, now: Instant) {
        debug_assert_eq!(self.mode, Mode::Editing, "mutation while applying history");
        self.history.note_change(now);
    }

    pub fn undo(&mut self) {
        self.history.flush(&self.scene);
        if let Some(snapshot) = self.history.undo() {
            self.restore(snapshot);
        }
    }

    pub fn redo(&mut self) {
        if let Some(snapshot) = self.history.redo() {
            self.restore(snapshot);
        }
    }

    fn restore(&mut self, snapshot: Scene) {
        self.mode = Mode::ApplyingHistory;
        self.scene.replace_with(snapshot);
        self.mode = Mode::Editing;
        log::debug!(
            "restored snapshot: {} nodes, {} edges, {} groups",
            self.scene.nodes.len(),
            self.scene.edges.len(),
            self.scene.groups.len()
        );
        self.prune_stale_refs();
    }

    /// Drop selection, context, and packet references that no longer
    /// resolve after a wholesale scene replacement.
    fn prune_stale_refs(&mut self) {
        self.selection.retain(|id| self.scene.nodes.contains_key(id));
        if let Some(edge) = self.selected_edge {
            if !self.scene.edges.contains_key(&edge) {
                self.selected_edge = None;
            }
        }
        self.context_target = None;
        self.scheduler.clear();
    }

    // --- collaborators ---

    /// Run the auto-layout collaborator and apply its result atomically.
    /// Only x/y move; every other node field is untouched. On failure the
    /// scene is left exactly as it was and a notice is surfaced.
    pub fn apply_layout(
        &mut self,
        provider: &dyn LayoutProvider,
        preset: LayoutPreset,
        now: Instant,
    ) {
        let nodes: Vec<LayoutNode> = self
            .scene
            .nodes_ordered()
            .map(LayoutNode::from_node)
            .collect();
        let edges: Vec<LayoutEdge> = self.scene.live_edges().map(LayoutEdge::from_edge).collect();

        match provider.layout(&nodes, &edges, preset) {
            Ok(positions) => {
                let mut moved = 0usize;
                for (id, position) in positions {
                    if let Some(node) = self.scene.node_mut(id) {
                        node.position = position;
                        moved += 1;
                    }
                }
                if moved > 0 {
                    self.record_change(now);
                }
                log::info!("auto-layout {preset:?} moved {moved} nodes");
            }
            Err(err) => {
                log::warn!("auto-layout {preset:?} failed: {err}");
                self.notices.push(format!("Auto-layout failed: {err}"));
            }
        }
    }

    /// Replace the whole scene from an imported file. Missing optional
    /// fields were already defaulted during deserialization.
    pub fn load_scene(&mut self, file: SceneFile, now: Instant) {
        let (scene, camera) = file.into_parts();
        self.scene.replace_with(scene);
        self.camera = camera;
        self.interaction = Interaction::Idle;
        self.prune_stale_refs();
        self.record_change(now);
    }

    /// Export the scene and viewport for persistence.
    pub fn save_scene(&self) -> SceneFile {
        SceneFile::from_scene(&self.scene, &self.camera)
    }
}
