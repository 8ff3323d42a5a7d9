//! Fluxboard Core Library
//!
//! Platform-agnostic engine for the Fluxboard diagram editor: the retained
//! scene, camera, hit-testing, interaction state machine, edge geometry,
//! packet animation, history, and persistence.

pub mod animation;
pub mod camera;
pub mod engine;
pub mod geometry;
pub mod history;
pub mod hit;
pub mod input;
pub mod layout;
pub mod scene;
pub mod serialize;
pub mod snap;
pub mod storage;

pub use animation::{Direction, Packet, PacketScheduler};
pub use camera::{Camera, MAX_ZOOM, MIN_ZOOM};
pub use engine::{Command, Engine, Interaction, Mode};
pub use geometry::EdgeCurve;
pub use history::History;
pub use hit::{hit_test, HitTarget};
pub use input::{EditorKey, Modifiers, PointerButton, PointerEvent};
pub use layout::{BuiltinLayout, LayoutEdge, LayoutError, LayoutNode, LayoutPreset, LayoutProvider};
pub use scene::{
    AnimationConfig, Edge, EdgeId, Group, GroupId, HandleSide, Node, NodeId, NodeKind, NodeShape,
    PacketShape, Rgba, Scene, StrokeStyle,
};
pub use serialize::SceneFile;
pub use snap::{snap_to_grid, snap_value, GRID_SIZE};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
