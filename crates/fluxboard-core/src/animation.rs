//! Per-frame packet animation scheduler.
//!
//! Runs once per rendered frame for the lifetime of the engine. Packets are
//! ephemeral: spawned on the configured cadence for every enabled edge that
//! intersects the viewport, advanced along the edge curve, and removed at a
//! terminal progress/direction combination.

use crate::camera::Camera;
use crate::geometry::EdgeCurve;
use crate::scene::{EdgeId, PacketShape, Rgba, Scene};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Direction of travel along an edge curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Reverse,
}

/// An ephemeral marker traveling along an edge.
///
/// Visual fields are copied from the edge's `AnimationConfig` at spawn time,
/// so reconfiguring an edge does not restyle packets already in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Packet {
    pub id: u64,
    pub edge: EdgeId,
    pub position: Point,
    /// Parametric position on the edge curve, within [0, 1] while alive.
    pub progress: f64,
    pub direction: Direction,
    pub size: f64,
    pub color: Rgba,
    pub shape: PacketShape,
    pub trail: bool,
    /// Whether this packet reverses at the target instead of terminating.
    pub bouncing: bool,
    /// Set when a bouncing packet has flipped at the target end.
    pub bounced_once: bool,
}

/// Spawns, advances, and retires packets, one tick per rendered frame.
#[derive(Debug, Clone, Default)]
pub struct PacketScheduler {
    frame: u64,
    next_id: u64,
    packets: Vec<Packet>,
}

impl PacketScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Packets currently in flight.
    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Drop all packets, e.g. after a bulk scene replace.
    pub fn clear(&mut self) {
        self.packets.clear();
    }

    /// Advance one frame: move live packets, retire terminal ones, then
    /// spawn new packets for enabled configs whose edge is in view.
    pub fn tick(&mut self, scene: &Scene, camera: &Camera, viewport: Size) {
        self.advance(scene);
        self.spawn(scene, camera, viewport);
        self.frame = self.frame.wrapping_add(1);
    }

    fn advance(&mut self, scene: &Scene) {
        self.packets.retain_mut(|packet| {
            let Some(edge) = scene.edge(packet.edge) else {
                // Edge deleted mid-flight.
                return false;
            };
            let Some((source, target)) = scene.edge_endpoints(edge) else {
                return false;
            };
            let speed = scene
                .animation(edge.id)
                .map(|c| c.speed)
                .unwrap_or(crate::scene::DEFAULT_PACKET_SPEED);

            match packet.direction {
                Direction::Forward => {
                    packet.progress += speed;
                    if packet.progress >= 1.0 {
                        if packet.bouncing {
                            // The outbound leg never terminates on overshoot:
                            // it flips and pins to the target end.
                            packet.direction = Direction::Reverse;
                            packet.progress = 1.0;
                            packet.bounced_once = true;
                        } else if packet.progress > 1.0 {
                            return false;
                        }
                    }
                }
                Direction::Reverse => {
                    packet.progress -= speed;
                    if packet.bounced_once && packet.progress <= 0.0 {
                        // Round trip complete.
                        return false;
                    }
                    if packet.progress < 0.0 {
                        return false;
                    }
                }
            }

            let curve = EdgeCurve::between(source, target, edge);
            packet.position = curve.point_at(packet.progress);
            true
        });
    }

    fn spawn(&mut self, scene: &Scene, camera: &Camera, viewport: Size) {
        let visible = camera.visible_world_rect(viewport);

        for (edge_id, config) in &scene.animations {
            if !config.enabled || config.frequency == 0 || self.frame % config.frequency != 0 {
                continue;
            }
            let Some(edge) = scene.edge(*edge_id) else {
                continue;
            };
            if !edge.visible {
                continue;
            }
            let Some((source, target)) = scene.edge_endpoints(edge) else {
                continue;
            };
            let curve = EdgeCurve::between(source, target, edge);
            // Off-screen edges spawn nothing this frame. A level or plumb
            // edge has a degenerate bounding box, so the box is inflated
            // before the overlap test.
            if visible
                .intersect(curve.bounding_box().inflate(1.0, 1.0))
                .is_zero_area()
            {
                continue;
            }

            let bouncing = edge.bounce;
            self.push_packet(*edge_id, &curve, config, Direction::Forward, 0.0, bouncing);
            if edge.bidirectional && !edge.bounce {
                self.push_packet(*edge_id, &curve, config, Direction::Reverse, 1.0, false);
            }
        }
    }

    fn push_packet(
        &mut self,
        edge: EdgeId,
        curve: &EdgeCurve,
        config: &crate::scene::AnimationConfig,
        direction: Direction,
        progress: f64,
        bouncing: bool,
    ) {
        let id = self.next_id;
        self.next_id += 1;
        self.packets.push(Packet {
            id,
            edge,
            position: curve.point_at(progress),
            progress,
            direction,
            size: config.size,
            color: config.color,
            shape: config.shape,
            trail: config.trail,
            bouncing,
            bounced_once: false,
        });
    }
}
