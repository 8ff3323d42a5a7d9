//! The retained scene store: nodes, edges, groups, and per-edge animation
//! configuration for one diagram.

mod color;
mod edge;
mod group;
mod node;

pub use color::Rgba;
pub use edge::{Edge, EdgeId, StrokeStyle, DEFAULT_ARROW_SIZE, DEFAULT_CURVATURE, DEFAULT_EDGE_WIDTH};
pub use group::{Group, GroupId, DEFAULT_GROUP_PADDING, TOGGLE_GLYPH_SIZE};
pub use node::{HandleSide, Node, NodeId, NodeKind, NodeShape, DEFAULT_NODE_SIZE};

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// World-space offset applied to duplicated nodes, one grid cell down-right.
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(20.0, 20.0);

/// Default packet progress advance per frame.
pub const DEFAULT_PACKET_SPEED: f64 = 0.02;

/// Default frames between packet spawns.
pub const DEFAULT_PACKET_FREQUENCY: u64 = 60;

/// Default packet marker size.
pub const DEFAULT_PACKET_SIZE: f64 = 6.0;

/// Marker drawn for an animated packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PacketShape {
    #[default]
    Circle,
    Square,
    Diamond,
    Triangle,
}

fn default_speed() -> f64 {
    DEFAULT_PACKET_SPEED
}

fn default_frequency() -> u64 {
    DEFAULT_PACKET_FREQUENCY
}

fn default_packet_size() -> f64 {
    DEFAULT_PACKET_SIZE
}

fn default_packet_color() -> Rgba {
    Rgba::new(59, 130, 246, 255)
}

/// Per-edge packet animation settings, keyed by edge id in the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Progress advance per frame.
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Frames between spawns.
    #[serde(default = "default_frequency")]
    pub frequency: u64,
    #[serde(default = "default_packet_size")]
    pub size: f64,
    #[serde(default = "default_packet_color")]
    pub color: Rgba,
    #[serde(default)]
    pub shape: PacketShape,
    #[serde(default)]
    pub trail: bool,
    #[serde(default)]
    pub enabled: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_PACKET_SPEED,
            frequency: DEFAULT_PACKET_FREQUENCY,
            size: DEFAULT_PACKET_SIZE,
            color: default_packet_color(),
            shape: PacketShape::default(),
            trail: false,
            enabled: false,
        }
    }
}

/// The mutable collections forming one diagram.
///
/// All cross-entity relationships are id-keyed; nothing holds a pointer into
/// another collection, so snapshots for undo are plain clones. Insertion
/// order is kept separately (`node_order`, `group_order`) because hit-testing
/// and rendering are order-sensitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    pub nodes: HashMap<NodeId, Node>,
    pub edges: HashMap<EdgeId, Edge>,
    pub groups: HashMap<GroupId, Group>,
    /// Node creation order, back to front.
    pub node_order: Vec<NodeId>,
    /// Group creation order; hit-testing walks it in reverse.
    pub group_order: Vec<GroupId>,
    pub animations: HashMap<EdgeId, AnimationConfig>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty() && self.groups.is_empty()
    }

    // --- nodes ---

    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.node_order.push(id);
        self.nodes.insert(id, node);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Nodes in creation order, back to front.
    pub fn nodes_ordered(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Remove a node and everything that depends on it: edges touching the
    /// node (with their animation configs), its membership in every group,
    /// and any group left with zero members.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        self.node_order.retain(|n| *n != id);

        let dead_edges: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|e| e.touches(id))
            .map(|e| e.id)
            .collect();
        for edge_id in dead_edges {
            self.remove_edge(edge_id);
        }

        let mut empty_groups = Vec::new();
        for group in self.groups.values_mut() {
            group.node_ids.remove(&id);
            if group.node_ids.is_empty() {
                empty_groups.push(group.id);
            }
        }
        for group_id in empty_groups {
            self.remove_group(group_id);
        }

        Some(node)
    }

    /// Clone the given nodes (fresh ids, offset position) along with any
    /// edges whose endpoints both lie in the set, including their animation
    /// configs. Returns the ids of the new nodes in input order.
    pub fn duplicate_nodes(&mut self, ids: &[NodeId]) -> Vec<NodeId> {
        let mut id_map: HashMap<NodeId, NodeId> = HashMap::new();
        let mut new_ids = Vec::new();

        for &id in ids {
            let Some(original) = self.nodes.get(&id) else {
                continue;
            };
            let mut copy = original.clone();
            copy.id = uuid::Uuid::new_v4();
            copy.position += DUPLICATE_OFFSET;
            id_map.insert(id, copy.id);
            new_ids.push(copy.id);
            self.add_node(copy);
        }

        let internal: Vec<Edge> = self
            .edges
            .values()
            .filter(|e| id_map.contains_key(&e.source) && id_map.contains_key(&e.target))
            .cloned()
            .collect();
        for mut edge in internal {
            let old_id = edge.id;
            edge.id = uuid::Uuid::new_v4();
            edge.source = id_map[&edge.source];
            edge.target = id_map[&edge.target];
            if let Some(config) = self.animations.get(&old_id).cloned() {
                self.animations.insert(edge.id, config);
            }
            self.edges.insert(edge.id, edge);
        }

        new_ids
    }

    // --- edges ---

    pub fn add_edge(&mut self, edge: Edge) -> EdgeId {
        let id = edge.id;
        self.edges.insert(id, edge);
        id
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(&id)
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        self.animations.remove(&id);
        self.edges.remove(&id)
    }

    /// Edges whose endpoints both resolve to live nodes. Dangling edges are
    /// skipped, never an error; they exist only transiently in imported data.
    pub fn live_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .values()
            .filter(|e| self.nodes.contains_key(&e.source) && self.nodes.contains_key(&e.target))
    }

    /// Resolve an edge's endpoint nodes.
    pub fn edge_endpoints(&self, edge: &Edge) -> Option<(&Node, &Node)> {
        Some((self.nodes.get(&edge.source)?, self.nodes.get(&edge.target)?))
    }

    // --- groups ---

    /// Group the given nodes, computing bounds as the padded union of member
    /// bounding boxes. Requires at least two live member nodes.
    pub fn group_nodes(&mut self, ids: &[NodeId], padding: f64) -> Option<GroupId> {
        let mut members = HashSet::new();
        let mut bounds: Option<Rect> = None;
        for &id in ids {
            if let Some(node) = self.nodes.get(&id) {
                members.insert(id);
                bounds = Some(match bounds {
                    Some(r) => r.union(node.bounds()),
                    None => node.bounds(),
                });
            }
        }
        if members.len() < 2 {
            return None;
        }
        let group = Group::new(String::new(), bounds?, members, padding);
        let id = group.id;
        self.group_order.push(id);
        self.groups.insert(id, group);
        Some(id)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.get_mut(&id)
    }

    pub fn remove_group(&mut self, id: GroupId) -> Option<Group> {
        self.group_order.retain(|g| *g != id);
        self.groups.remove(&id)
    }

    /// Groups in creation order, back to front.
    pub fn groups_ordered(&self) -> impl Iterator<Item = &Group> {
        self.group_order.iter().filter_map(|id| self.groups.get(id))
    }

    /// Translate a group region and every member node by the same delta.
    pub fn translate_group(&mut self, id: GroupId, delta: Vec2) {
        let Some(group) = self.groups.get_mut(&id) else {
            return;
        };
        group.translate(delta.x, delta.y);
        let members: Vec<NodeId> = group.node_ids.iter().copied().collect();
        for node_id in members {
            if let Some(node) = self.nodes.get_mut(&node_id) {
                node.position += delta;
            }
        }
    }

    // --- animation configs ---

    pub fn animation(&self, edge: EdgeId) -> Option<&AnimationConfig> {
        self.animations.get(&edge)
    }

    /// Attach or replace the animation config for an edge. Configs for
    /// unknown edges are rejected so the map cannot accumulate garbage.
    pub fn set_animation(&mut self, edge: EdgeId, config: AnimationConfig) -> bool {
        if !self.edges.contains_key(&edge) {
            return false;
        }
        self.animations.insert(edge, config);
        true
    }

    // --- whole-scene operations ---

    /// Union bounding box of all visible nodes and groups.
    pub fn bounds(&self) -> Option<Rect> {
        let mut result: Option<Rect> = None;
        let mut extend = |r: Rect| {
            result = Some(match result {
                Some(acc) => acc.union(r),
                None => r,
            });
        };
        for node in self.nodes.values().filter(|n| n.visible) {
            extend(node.bounds());
        }
        for group in self.groups.values().filter(|g| g.visible) {
            extend(group.bounds);
        }
        result
    }

    /// Replace every collection wholesale. The only legitimate external
    /// mutation path besides undo/redo; partial patches would expose
    /// intermediate states that violate the invariants.
    pub fn replace_with(&mut self, other: Scene) {
        *self = other;
    }

    /// The topmost visible node containing a world point, if any.
    pub fn node_at(&self, point: Point) -> Option<NodeId> {
        self.node_order
            .iter()
            .rev()
            .filter_map(|id| self.nodes.get(id))
            .find(|n| n.visible && n.contains(point))
            .map(|n| n.id)
    }
}
