use crate::Viewport;
use glam::Vec3;
use showcase_scene::{CollectionKind, SceneState};
use std::fmt::Write;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(1.0, 1.0, 6.0),
            target: Vec3::ZERO,
            fov_degrees: 75.0,
            aspect: 16.0 / 9.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads scene state, a view and the viewport, then produces
/// output. It never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&mut self, scene: &SceneState, view: &RenderView, viewport: &Viewport) -> Self::Output;
}

/// Text renderer for headless runs, logs and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, scene: &SceneState, view: &RenderView, viewport: &Viewport) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Scene (tick={}, objects={}) ===",
            scene.ticks(),
            scene.object_count()
        );
        let _ = writeln!(
            out,
            "Viewport: {}x{} @{:.1}",
            viewport.width, viewport.height, viewport.pixel_ratio
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.2}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees,
            view.aspect
        );

        for kind in CollectionKind::ALL {
            let collection = scene.collection(kind);
            let _ = writeln!(out, "{}: {}", kind.title(), collection.len());
            for object in collection {
                let p = object.transform.position;
                let mode = match &object.material {
                    Some(m) if m.wireframe => "wire",
                    Some(_) => "fill",
                    None => "none",
                };
                let _ = writeln!(
                    out,
                    "  [{}] {} pos=({:.2}, {:.2}, {:.2}) {mode}",
                    object.id.short(),
                    object.name,
                    p.x,
                    p.y,
                    p.z
                );
            }
        }
        out
    }
}
