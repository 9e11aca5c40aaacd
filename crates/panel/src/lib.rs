//! Parameter binding panel: live controls bound to the scene collections.
//!
//! # Invariants
//! - Position sliders overwrite the axis on every member; they never offset.
//! - The wireframe toggle is a global override with no per-collection memory.
//! - Drawing never mutates the scene; only [`PanelAction::apply`] does.

mod action;
mod panel;

pub use action::PanelAction;
pub use panel::{CollectionControls, ParameterPanel};
