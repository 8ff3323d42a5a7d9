//! Diagram nodes: typed, styled boxes that edges attach to.

use super::color::Rgba;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for nodes.
pub type NodeId = Uuid;

/// Default node size in world units.
pub const DEFAULT_NODE_SIZE: Size = Size::new(160.0, 80.0);

/// The closed set of domain icons a node can carry.
///
/// The icon only affects how a node is drawn and exported; the engine treats
/// every kind identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeKind {
    #[default]
    Server,
    Database,
    Cache,
    Queue,
    LoadBalancer,
    ApiGateway,
    WebApp,
    MobileApp,
    Cli,
    User,
    UserGroup,
    Cloud,
    Cdn,
    Dns,
    Firewall,
    Router,
    Switch,
    Storage,
    ObjectStore,
    Lambda,
    Container,
    Kubernetes,
    Scheduler,
    Worker,
    Search,
    Analytics,
    Monitoring,
    Logging,
    Auth,
    Email,
    Payment,
    External,
}

impl NodeKind {
    /// Human-readable display name, used for default labels.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Server => "Server",
            NodeKind::Database => "Database",
            NodeKind::Cache => "Cache",
            NodeKind::Queue => "Queue",
            NodeKind::LoadBalancer => "Load Balancer",
            NodeKind::ApiGateway => "API Gateway",
            NodeKind::WebApp => "Web App",
            NodeKind::MobileApp => "Mobile App",
            NodeKind::Cli => "CLI",
            NodeKind::User => "User",
            NodeKind::UserGroup => "User Group",
            NodeKind::Cloud => "Cloud",
            NodeKind::Cdn => "CDN",
            NodeKind::Dns => "DNS",
            NodeKind::Firewall => "Firewall",
            NodeKind::Router => "Router",
            NodeKind::Switch => "Switch",
            NodeKind::Storage => "Storage",
            NodeKind::ObjectStore => "Object Store",
            NodeKind::Lambda => "Function",
            NodeKind::Container => "Container",
            NodeKind::Kubernetes => "Kubernetes",
            NodeKind::Scheduler => "Scheduler",
            NodeKind::Worker => "Worker",
            NodeKind::Search => "Search",
            NodeKind::Analytics => "Analytics",
            NodeKind::Monitoring => "Monitoring",
            NodeKind::Logging => "Logging",
            NodeKind::Auth => "Auth",
            NodeKind::Email => "Email",
            NodeKind::Payment => "Payment",
            NodeKind::External => "External Service",
        }
    }
}

/// Outline used when drawing a node. Hit tests always use the bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeShape {
    #[default]
    Rectangle,
    Rounded,
    Circle,
    Diamond,
}

impl NodeShape {
    /// Cycle to the next shape.
    pub fn next(self) -> Self {
        match self {
            NodeShape::Rectangle => NodeShape::Rounded,
            NodeShape::Rounded => NodeShape::Circle,
            NodeShape::Circle => NodeShape::Diamond,
            NodeShape::Diamond => NodeShape::Rectangle,
        }
    }
}

/// One of the four named attachment points on a node's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleSide {
    /// Left-mid anchor, conventionally where edges arrive.
    Input,
    /// Right-mid anchor, conventionally where edges leave.
    Output,
    /// Top-mid anchor.
    Top,
    /// Bottom-mid anchor.
    Bottom,
}

impl HandleSide {
    /// All four sides, in hit-test probe order.
    pub const ALL: [HandleSide; 4] = [
        HandleSide::Input,
        HandleSide::Output,
        HandleSide::Top,
        HandleSide::Bottom,
    ];

    /// The anchor point for this side on a bounding box.
    pub fn anchor(self, bounds: Rect) -> Point {
        match self {
            HandleSide::Input => Point::new(bounds.x0, bounds.center().y),
            HandleSide::Output => Point::new(bounds.x1, bounds.center().y),
            HandleSide::Top => Point::new(bounds.center().x, bounds.y0),
            HandleSide::Bottom => Point::new(bounds.center().x, bounds.y1),
        }
    }
}

fn default_visible() -> bool {
    true
}

fn default_font_size() -> f64 {
    14.0
}

fn default_border_width() -> f64 {
    2.0
}

fn default_fill() -> Rgba {
    Rgba::new(240, 244, 248, 255)
}

fn default_border() -> Rgba {
    Rgba::new(51, 65, 85, 255)
}

fn default_text_color() -> Rgba {
    Rgba::black()
}

fn default_size() -> Size {
    DEFAULT_NODE_SIZE
}

/// A typed diagram node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Top-left corner in world coordinates.
    pub position: Point,
    #[serde(default = "default_size")]
    pub size: Size,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub shape: NodeShape,
    #[serde(default = "default_fill")]
    pub fill: Rgba,
    #[serde(default = "default_border")]
    pub border: Rgba,
    #[serde(default = "default_text_color")]
    pub text_color: Rgba,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_border_width")]
    pub border_width: f64,
    #[serde(default)]
    pub shadow: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl Node {
    /// Create a node of the given kind at a world position, with the kind's
    /// display name as the initial label.
    pub fn new(kind: NodeKind, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            size: DEFAULT_NODE_SIZE,
            label: kind.name().to_string(),
            kind,
            shape: NodeShape::default(),
            fill: default_fill(),
            border: default_border(),
            text_color: default_text_color(),
            font_size: default_font_size(),
            border_width: default_border_width(),
            shadow: false,
            visible: true,
        }
    }

    /// Bounding box in world coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Axis-aligned containment test. The drawn outline is not consulted.
    pub fn contains(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    /// The anchor point of one of the four connection handles.
    pub fn handle_anchor(&self, side: HandleSide) -> Point {
        side.anchor(self.bounds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_anchors() {
        let node = Node::new(NodeKind::Server, Point::new(0.0, 0.0));
        let node = Node {
            size: Size::new(200.0, 100.0),
            ..node
        };
        assert_eq!(node.handle_anchor(HandleSide::Input), Point::new(0.0, 50.0));
        assert_eq!(node.handle_anchor(HandleSide::Output), Point::new(200.0, 50.0));
        assert_eq!(node.handle_anchor(HandleSide::Top), Point::new(100.0, 0.0));
        assert_eq!(node.handle_anchor(HandleSide::Bottom), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_contains_uses_bounding_box() {
        let mut node = Node::new(NodeKind::Database, Point::new(10.0, 10.0));
        node.shape = NodeShape::Circle;
        // Corner of the box is outside any inscribed circle but still hits.
        assert!(node.contains(Point::new(11.0, 11.0)));
        assert!(!node.contains(Point::new(9.0, 9.0)));
    }

    #[test]
    fn test_default_label_from_kind() {
        let node = Node::new(NodeKind::LoadBalancer, Point::ZERO);
        assert_eq!(node.label, "Load Balancer");
    }
}
