use glam::Vec3;
use showcase_assets::TextureHandle;
use showcase_common::{Color, ObjectId, Transform};
use showcase_geometry::Geometry;
use std::sync::Arc;

/// Matcap material: a tint, a wireframe switch and the shading texture.
#[derive(Debug, Clone)]
pub struct Material {
    pub color: Color,
    pub wireframe: bool,
    pub matcap: TextureHandle,
}

impl Material {
    pub fn matcap(matcap: TextureHandle, color: Color) -> Self {
        Self {
            color,
            wireframe: false,
            matcap,
        }
    }
}

/// One running spin: turns the object a full revolution about Y over `duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    elapsed: f32,
    duration: f32,
    applied: f32,
}

impl Spin {
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration,
            applied: 0.0,
        }
    }

    /// Advance by `dt` and return the rotation delta to add, in radians.
    fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;
        let t = if self.duration > 0.0 {
            (self.elapsed / self.duration).min(1.0)
        } else {
            1.0
        };
        let progress = ease_out_quad(t);
        let delta = progress - self.applied;
        self.applied = progress;
        delta * std::f32::consts::TAU
    }

    pub fn is_finished(&self) -> bool {
        self.applied >= 1.0
    }
}

fn ease_out_quad(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

/// One renderable mesh instance.
#[derive(Debug, Clone)]
pub struct VisualObject {
    pub id: ObjectId,
    pub name: String,
    pub geometry: Arc<Geometry>,
    pub material: Option<Material>,
    pub transform: Transform,
    spins: Vec<Spin>,
}

impl VisualObject {
    pub fn new(name: impl Into<String>, geometry: Arc<Geometry>, material: Option<Material>) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            geometry,
            material,
            transform: Transform::default(),
            spins: Vec::new(),
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Queue a full turn starting from wherever the rotation is when it runs.
    pub fn spin(&mut self, duration: f32) {
        self.spins.push(Spin::new(duration));
    }

    pub fn active_spins(&self) -> usize {
        self.spins.len()
    }

    pub fn advance_spins(&mut self, dt: f32) {
        for spin in &mut self.spins {
            self.transform.rotation.y += spin.advance(dt);
        }
        self.spins.retain(|s| !s.is_finished());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_geometry::GeometryDescriptor;
    use std::f32::consts::TAU;

    fn object() -> VisualObject {
        let g = Geometry::build(GeometryDescriptor::Octahedron { radius: 1.0 }).unwrap();
        VisualObject::new("octa", Arc::new(g), None)
    }

    #[test]
    fn spin_completes_one_turn() {
        let mut o = object();
        o.spin(1.0);
        for _ in 0..30 {
            o.advance_spins(0.05);
        }
        assert!((o.transform.rotation.y - TAU).abs() < 1e-4);
        assert_eq!(o.active_spins(), 0);
    }

    #[test]
    fn spin_is_eased_out() {
        let mut s = Spin::new(1.0);
        let first = s.advance(0.1);
        let mut last = 0.0;
        for _ in 0..9 {
            last = s.advance(0.1);
        }
        assert!(first > last);
        assert!(s.is_finished());
    }

    #[test]
    fn spin_starts_from_current_rotation() {
        let mut o = object();
        o.transform.rotation.y = 1.0;
        o.spin(0.5);
        o.advance_spins(0.25);
        o.transform.rotation.y += 2.0;
        o.advance_spins(1.0);
        assert!((o.transform.rotation.y - (3.0 + TAU)).abs() < 1e-4);
    }

    #[test]
    fn zero_duration_spin_finishes_immediately() {
        let mut o = object();
        o.spin(0.0);
        o.advance_spins(0.0);
        assert!((o.transform.rotation.y - TAU).abs() < 1e-6);
        assert_eq!(o.active_spins(), 0);
    }
}
