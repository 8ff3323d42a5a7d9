//! On-disk document format.
//!
//! A `SceneFile` is the JSON shape of one diagram plus its viewport. Entity
//! lists are ordered so creation order survives a round trip; every styling
//! field carries a serde default, so files written by older versions (or
//! hand-edited with fields removed) still import.

use crate::camera::Camera;
use crate::scene::{AnimationConfig, Edge, EdgeId, Group, Node, Scene};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const FORMAT_VERSION: u32 = 1;

fn default_version() -> u32 {
    FORMAT_VERSION
}

fn default_zoom() -> f64 {
    1.0
}

/// Saved camera state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    #[serde(default)]
    pub offset: Vec2,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

/// One diagram as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub animations: HashMap<EdgeId, AnimationConfig>,
    #[serde(default)]
    pub viewport: Viewport,
}

impl SceneFile {
    /// Capture a scene and camera for persistence. Nodes and groups are
    /// written in creation order; edges are sorted by id so output is
    /// stable across runs.
    pub fn from_scene(scene: &Scene, camera: &Camera) -> Self {
        let nodes = scene.nodes_ordered().cloned().collect();
        let mut edges: Vec<Edge> = scene.edges.values().cloned().collect();
        edges.sort_by_key(|e| e.id);
        let groups = scene
            .group_order
            .iter()
            .filter_map(|id| scene.groups.get(id))
            .cloned()
            .collect();

        Self {
            version: FORMAT_VERSION,
            name: String::new(),
            nodes,
            edges,
            groups,
            animations: scene.animations.clone(),
            viewport: Viewport {
                offset: camera.offset,
                zoom: camera.zoom,
            },
        }
    }

    /// Rebuild the live scene and camera. List order becomes creation
    /// order; animation configs for edges absent from the file are dropped.
    pub fn into_parts(self) -> (Scene, Camera) {
        let mut scene = Scene::new();
        for node in self.nodes {
            scene.add_node(node);
        }
        for edge in self.edges {
            scene.add_edge(edge);
        }
        for group in self.groups {
            scene.group_order.push(group.id);
            scene.groups.insert(group.id, group);
        }
        for (edge, config) in self.animations {
            scene.set_animation(edge, config);
        }

        let camera = Camera {
            offset: self.viewport.offset,
            zoom: self.viewport.zoom.clamp(crate::camera::MIN_ZOOM, crate::camera::MAX_ZOOM),
        };
        (scene, camera)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
