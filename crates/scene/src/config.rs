//! Fixed demo constants. Nothing here is read from the environment.

use showcase_common::Color;
use std::ops::RangeInclusive;

pub const TEXTURE_PATH: &str = "assets/textures/matcaps/8.png";
pub const FONT_PATH: &str = "assets/fonts/block_regular.typeface.json";

/// Horizontal distance between neighbouring shapes in the showcase row.
pub const SHAPE_SPACING: f32 = 2.0;

pub const DECORATION_COUNT: usize = 100;
pub const DECORATION_POSITION_RANGE: RangeInclusive<f32> = -10.0..=10.0;
pub const DECORATION_ROTATION_RANGE: RangeInclusive<f32> = 0.0..=std::f32::consts::PI;
pub const DECORATION_SCALE_RANGE: RangeInclusive<f32> = 0.2..=0.7;

pub const LABEL_TEXTS: [&str; 3] = ["Geometry", "Matcap", "Showcase"];
pub const LABEL_SIZE: f32 = 0.5;
pub const LABEL_DEPTH: f32 = 0.2;
pub const LABEL_CURVE_SEGMENTS: u32 = 5;
pub const LABEL_TOP: f32 = 3.0;
pub const LABEL_SPACING: f32 = 1.0;
pub const LABEL_Z: f32 = -3.0;

/// Automatic x/y rotation added to shapes and decorations every tick, radians.
pub const ROTATION_STEP: f32 = 0.01;
pub const SPIN_DURATION: f32 = 1.0;

pub const SLIDER_RANGE: RangeInclusive<f32> = -5.0..=5.0;
pub const SLIDER_STEP: f64 = 0.01;

pub const SHAPE_COLOR: Color = Color::rgb(1.0, 1.0, 1.0);
pub const DECORATION_COLOR: Color = Color::rgb(1.0, 1.0, 1.0);
pub const LABEL_COLOR: Color = Color::rgb(1.0, 1.0, 1.0);
