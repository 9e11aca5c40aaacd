//! Rendering interface: renderer-agnostic view, viewport sizing and a text
//! debug renderer.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - Viewport pixel ratio never exceeds [`MAX_PIXEL_RATIO`].

mod renderer;
mod viewport;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use viewport::{MAX_PIXEL_RATIO, Viewport};
