//! Geometry descriptors and CPU tessellation.
//!
//! A [`GeometryDescriptor`] names a shape kind and its parameters; building it
//! yields a [`Geometry`] holding the triangle mesh. Geometries are immutable
//! once built and are shared by `Arc` between every object that uses them.
//!
//! # Invariants
//! - Every mesh has one normal per position and indices within range.
//! - Text geometry is only built from a resolved font.

mod mesh;
pub mod outline;
pub mod primitives;
pub mod text;

pub use mesh::{Aabb, MeshData};

use showcase_assets::Font;
use uuid::Uuid;

/// Errors from geometry construction.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("tessellation failed: {0}")]
    Tessellation(String),
    #[error("outline produced no fillable contours")]
    EmptyOutline,
    #[error("text geometry needs a loaded font")]
    MissingFont,
}

/// Identity of a built geometry; renderers key GPU buffers by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub Uuid);

/// Every shape kind the scene can show.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryDescriptor {
    Box { width: f32, height: f32, depth: f32 },
    Sphere { radius: f32, width_segments: u32, height_segments: u32 },
    Plane { width: f32, height: f32 },
    Circle { radius: f32, segments: u32 },
    Ring { inner_radius: f32, outer_radius: f32, segments: u32 },
    Cone { radius: f32, height: f32, radial_segments: u32 },
    Cylinder { radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32 },
    Capsule { radius: f32, length: f32, cap_segments: u32, radial_segments: u32 },
    Torus { radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32 },
    TorusKnot { radius: f32, tube: f32, tubular_segments: u32, radial_segments: u32, p: u32, q: u32 },
    Octahedron { radius: f32 },
    Icosahedron { radius: f32 },
    /// Flat fill of a closed heart-shaped curve.
    ShapeOutline,
    /// Circle swept along a wave path.
    Tube { tubular_segments: u32, radius: f32, radial_segments: u32 },
    ExtrudedStar { points: u32, outer_radius: f32, inner_radius: f32, depth: f32 },
    Text { text: String, size: f32, depth: f32, curve_segments: u32 },
}

impl GeometryDescriptor {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Sphere { .. } => "sphere",
            Self::Plane { .. } => "plane",
            Self::Circle { .. } => "circle",
            Self::Ring { .. } => "ring",
            Self::Cone { .. } => "cone",
            Self::Cylinder { .. } => "cylinder",
            Self::Capsule { .. } => "capsule",
            Self::Torus { .. } => "torus",
            Self::TorusKnot { .. } => "torus_knot",
            Self::Octahedron { .. } => "octahedron",
            Self::Icosahedron { .. } => "icosahedron",
            Self::ShapeOutline => "shape",
            Self::Tube { .. } => "tube",
            Self::ExtrudedStar { .. } => "extruded_star",
            Self::Text { .. } => "text",
        }
    }

    /// Tessellate. `font` is only consulted for [`GeometryDescriptor::Text`].
    pub fn tessellate(&self, font: Option<&Font>) -> Result<MeshData, GeometryError> {
        use primitives as p;
        let mesh = match *self {
            Self::Box { width, height, depth } => p::cuboid(width, height, depth),
            Self::Sphere { radius, width_segments, height_segments } => {
                p::sphere(radius, width_segments, height_segments)
            }
            Self::Plane { width, height } => p::plane(width, height),
            Self::Circle { radius, segments } => p::circle(radius, segments),
            Self::Ring { inner_radius, outer_radius, segments } => {
                p::ring(inner_radius, outer_radius, segments)
            }
            Self::Cone { radius, height, radial_segments } => p::cone(radius, height, radial_segments),
            Self::Cylinder { radius_top, radius_bottom, height, radial_segments } => {
                p::cylinder(radius_top, radius_bottom, height, radial_segments)
            }
            Self::Capsule { radius, length, cap_segments, radial_segments } => {
                p::capsule(radius, length, cap_segments, radial_segments)
            }
            Self::Torus { radius, tube, radial_segments, tubular_segments } => {
                p::torus(radius, tube, radial_segments, tubular_segments)
            }
            Self::TorusKnot { radius, tube, tubular_segments, radial_segments, p: wind, q } => {
                p::torus_knot(radius, tube, tubular_segments, radial_segments, wind, q)
            }
            Self::Octahedron { radius } => p::octahedron(radius),
            Self::Icosahedron { radius } => p::icosahedron(radius),
            Self::ShapeOutline => {
                let mut mesh = outline::fill(&outline::heart_path(), 0.005)?;
                mesh.center();
                mesh
            }
            Self::Tube { tubular_segments, radius, radial_segments } => {
                outline::tube(outline::wave_point, tubular_segments, radius, radial_segments)
            }
            Self::ExtrudedStar { points, outer_radius, inner_radius, depth } => outline::extrude(
                &outline::star_path(points, outer_radius, inner_radius),
                depth,
                0.005,
            )?,
            Self::Text { ref text, size, depth, curve_segments } => {
                let font = font.ok_or(GeometryError::MissingFont)?;
                text::text_mesh(font, text, size, depth, curve_segments)?
            }
        };
        Ok(mesh)
    }
}

/// A built, immutable mesh with its descriptor.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub id: GeometryId,
    pub descriptor: GeometryDescriptor,
    pub mesh: MeshData,
}

impl Geometry {
    pub fn build(descriptor: GeometryDescriptor) -> Result<Self, GeometryError> {
        Self::build_with_font(descriptor, None)
    }

    pub fn build_with_font(
        descriptor: GeometryDescriptor,
        font: Option<&Font>,
    ) -> Result<Self, GeometryError> {
        let mesh = descriptor.tessellate(font)?;
        tracing::debug!(
            "built {} geometry: {} vertices, {} triangles",
            descriptor.kind(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(Self {
            id: GeometryId(Uuid::new_v4()),
            descriptor,
            mesh,
        })
    }

    /// Recenter the mesh on its own bounding box.
    pub fn centered(mut self) -> Self {
        self.mesh.center();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_font_fails() {
        let d = GeometryDescriptor::Text {
            text: "hi".into(),
            size: 0.5,
            depth: 0.2,
            curve_segments: 5,
        };
        assert!(matches!(Geometry::build(d), Err(GeometryError::MissingFont)));
    }

    #[test]
    fn procedural_shapes_build() {
        for d in [
            GeometryDescriptor::ShapeOutline,
            GeometryDescriptor::Tube { tubular_segments: 48, radius: 0.1, radial_segments: 8 },
            GeometryDescriptor::ExtrudedStar {
                points: 5,
                outer_radius: 0.5,
                inner_radius: 0.2,
                depth: 0.2,
            },
        ] {
            let g = Geometry::build(d).unwrap();
            assert!(!g.mesh.is_empty(), "{} is empty", g.descriptor.kind());
            assert_eq!(g.mesh.positions.len(), g.mesh.normals.len());
        }
    }

    #[test]
    fn shape_outline_is_centered() {
        let g = Geometry::build(GeometryDescriptor::ShapeOutline).unwrap();
        let c = g.mesh.bounding_box().unwrap().center();
        assert!(c.length() < 1e-5);
    }

    #[test]
    fn each_build_gets_a_fresh_id() {
        let a = Geometry::build(GeometryDescriptor::Octahedron { radius: 1.0 }).unwrap();
        let b = Geometry::build(GeometryDescriptor::Octahedron { radius: 1.0 }).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.descriptor, b.descriptor);
    }
}
