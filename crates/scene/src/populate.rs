//! The scene populator: the fixed shape catalog, randomized decorations and
//! font-dependent labels.

use crate::config::{
    DECORATION_POSITION_RANGE, DECORATION_ROTATION_RANGE, DECORATION_SCALE_RANGE, LABEL_COLOR,
    LABEL_CURVE_SEGMENTS, LABEL_DEPTH, LABEL_SIZE, LABEL_SPACING, LABEL_TEXTS, LABEL_TOP, LABEL_Z,
    SHAPE_SPACING,
};
use crate::object::{Material, VisualObject};
use glam::Vec3;
use rand::Rng;
use showcase_assets::{Font, TextureHandle};
use showcase_common::Transform;
use showcase_geometry::{Geometry, GeometryDescriptor};
use std::sync::Arc;

/// Every shape kind on show, in row order: twelve primitives then the three
/// procedural shapes.
pub fn shape_catalog() -> Vec<GeometryDescriptor> {
    use GeometryDescriptor as G;
    vec![
        G::Box { width: 1.0, height: 1.0, depth: 1.0 },
        G::Sphere { radius: 0.5, width_segments: 32, height_segments: 16 },
        G::Plane { width: 1.0, height: 1.0 },
        G::Circle { radius: 0.5, segments: 32 },
        G::Ring { inner_radius: 0.25, outer_radius: 0.5, segments: 32 },
        G::Cone { radius: 0.5, height: 1.0, radial_segments: 32 },
        G::Cylinder { radius_top: 0.5, radius_bottom: 0.5, height: 1.0, radial_segments: 32 },
        G::Capsule { radius: 0.3, length: 0.5, cap_segments: 8, radial_segments: 16 },
        G::Torus { radius: 0.35, tube: 0.15, radial_segments: 16, tubular_segments: 48 },
        G::TorusKnot { radius: 0.35, tube: 0.1, tubular_segments: 100, radial_segments: 12, p: 2, q: 3 },
        G::Octahedron { radius: 0.5 },
        G::Icosahedron { radius: 0.5 },
        G::ShapeOutline,
        G::Tube { tubular_segments: 64, radius: 0.1, radial_segments: 8 },
        G::ExtrudedStar { points: 5, outer_radius: 0.5, inner_radius: 0.22, depth: 0.25 },
    ]
}

/// Row position of the `index`-th of `count` shapes, centered on the origin.
pub fn row_position(index: usize, count: usize) -> Vec3 {
    let offset = (count.saturating_sub(1)) as f32 * 0.5;
    Vec3::new((index as f32 - offset) * SHAPE_SPACING, 0.0, 0.0)
}

/// The shared decoration mesh.
pub fn decoration_geometry() -> GeometryDescriptor {
    GeometryDescriptor::Torus {
        radius: 0.3,
        tube: 0.2,
        radial_segments: 20,
        tubular_segments: 45,
    }
}

/// Independent random placement: position per axis, x/y rotation, uniform scale.
pub fn random_decoration_transform(rng: &mut impl Rng) -> Transform {
    let scale = rng.gen_range(DECORATION_SCALE_RANGE);
    Transform {
        position: Vec3::new(
            rng.gen_range(DECORATION_POSITION_RANGE),
            rng.gen_range(DECORATION_POSITION_RANGE),
            rng.gen_range(DECORATION_POSITION_RANGE),
        ),
        rotation: Vec3::new(
            rng.gen_range(DECORATION_ROTATION_RANGE),
            rng.gen_range(DECORATION_ROTATION_RANGE),
            0.0,
        ),
        scale: Vec3::splat(scale),
    }
}

/// Build the decorations around one shared geometry.
pub fn decorations(
    geometry: Arc<Geometry>,
    matcap: &TextureHandle,
    color: showcase_common::Color,
    count: usize,
    rng: &mut impl Rng,
) -> Vec<VisualObject> {
    (0..count)
        .map(|i| {
            let mut object = VisualObject::new(
                format!("decoration {i}"),
                geometry.clone(),
                Some(Material::matcap(matcap.clone(), color)),
            );
            object.transform = random_decoration_transform(rng);
            object
        })
        .collect()
}

/// Text labels stacked downwards, each centered on its own bounding box.
/// Labels whose geometry fails to build are skipped.
pub fn labels(font: &Font, matcap: &TextureHandle) -> Vec<VisualObject> {
    LABEL_TEXTS
        .iter()
        .enumerate()
        .filter_map(|(i, text)| {
            let descriptor = GeometryDescriptor::Text {
                text: (*text).to_string(),
                size: LABEL_SIZE,
                depth: LABEL_DEPTH,
                curve_segments: LABEL_CURVE_SEGMENTS,
            };
            match Geometry::build_with_font(descriptor, Some(font)) {
                Ok(geometry) => Some(
                    VisualObject::new(
                        format!("label {text}"),
                        Arc::new(geometry.centered()),
                        Some(Material::matcap(matcap.clone(), LABEL_COLOR)),
                    )
                    .at(Vec3::new(0.0, LABEL_TOP - i as f32 * LABEL_SPACING, LABEL_Z)),
                ),
                Err(e) => {
                    tracing::warn!("skipping label {text:?}: {e}");
                    None
                }
            }
        })
        .collect()
}
