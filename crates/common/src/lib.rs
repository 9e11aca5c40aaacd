//! Shared value types for the showcase workspace.

pub mod types;

pub use types::{Axis, Color, ObjectId, Transform};
