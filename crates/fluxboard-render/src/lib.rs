//! Fluxboard Render Library
//!
//! Turns engine state into an ordered, backend-neutral display list.
//! Rasterization backends implement [`Renderer`] over the list.

mod display;
mod paint;

pub use display::{DisplayList, DrawOp, RenderResult, Renderer, RendererError};
pub use paint::{build_display_list, RenderContext};
