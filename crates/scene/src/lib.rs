//! Scene state: the Shapes, Decorations and Labels collections, spin
//! animation, and the populator that fills them.
//!
//! # Invariants
//! - Collections are append-only; objects live for the whole process.
//! - Labels are only created after the font request resolves, exactly once.
//! - Asset failures degrade the scene, they never stop it.

mod collection;
pub mod config;
mod object;
pub mod populate;
mod state;

pub use collection::{Collection, CollectionKind};
pub use object::{Material, Spin, VisualObject};
pub use state::{AmbientLight, Lighting, PointLight, SceneState};
