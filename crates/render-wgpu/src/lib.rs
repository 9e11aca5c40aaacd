//! wgpu render backend for the showcase scene.
//!
//! Draws every material-bearing object with a matcap shader, or a lit
//! fallback when the matcap texture is unavailable. Wireframe materials go
//! through a line-list pipeline. The camera orbits a target with damping.
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - One GPU mesh per geometry id, shared by every object using it.

mod camera;
mod frame;
mod gpu;
mod shaders;

pub use camera::{DAMPING_FACTOR, OrbitCamera};
pub use frame::FrameState;
pub use gpu::WgpuRenderer;
