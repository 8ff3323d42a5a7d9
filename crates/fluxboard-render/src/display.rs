//! The display list: an ordered batch of backend-neutral draw operations.
//!
//! One list is rebuilt from scratch every frame in world coordinates; the
//! camera transform is carried alongside so a backend applies it once.

use kurbo::{Affine, BezPath, Point};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("initialization failed: {0}")]
    InitFailed(String),
    #[error("render failed: {0}")]
    RenderFailed(String),
}

pub type RenderResult<T> = Result<T, RendererError>;

/// A single draw operation, in paint order.
#[derive(Debug, Clone)]
pub enum DrawOp {
    Fill {
        path: BezPath,
        color: Color,
    },
    Stroke {
        path: BezPath,
        color: Color,
        width: f64,
        dash: Option<Vec<f64>>,
    },
    Text {
        position: Point,
        content: String,
        size: f64,
        color: Color,
    },
}

/// Ordered draw operations for one frame, plus the world-to-screen
/// transform under which they were produced.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    ops: Vec<DrawOp>,
    transform: Affine,
}

impl DisplayList {
    pub fn new(transform: Affine) -> Self {
        Self {
            ops: Vec::new(),
            transform,
        }
    }

    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn fill(&mut self, path: BezPath, color: Color) {
        self.ops.push(DrawOp::Fill { path, color });
    }

    pub fn stroke(&mut self, path: BezPath, color: Color, width: f64) {
        self.ops.push(DrawOp::Stroke {
            path,
            color,
            width,
            dash: None,
        });
    }

    pub fn stroke_dashed(&mut self, path: BezPath, color: Color, width: f64, dash: Vec<f64>) {
        self.ops.push(DrawOp::Stroke {
            path,
            color,
            width,
            dash: Some(dash),
        });
    }

    pub fn text(&mut self, position: Point, content: String, size: f64, color: Color) {
        self.ops.push(DrawOp::Text {
            position,
            content,
            size,
            color,
        });
    }
}

/// A rendering backend. Implementations rasterize a display list with
/// whatever engine they wrap; the builder side never learns which.
pub trait Renderer: Send + Sync {
    fn render(&mut self, list: &DisplayList, viewport: kurbo::Size) -> RenderResult<()>;
}
