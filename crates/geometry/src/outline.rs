//! 2D outlines (lyon paths) turned into flat or extruded meshes, plus the
//! swept tube.

use crate::{GeometryError, MeshData};
use glam::{Vec2, Vec3};
use lyon::math::point;
use lyon::path::iterator::PathIterator;
use lyon::path::{Path, PathEvent};
use lyon::tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers};
use std::f32::consts::{PI, TAU};

/// Heart-shaped closed curve, about one unit tall.
pub fn heart_path() -> Path {
    let s = 0.05;
    let p = |x: f32, y: f32| point(x * s, -y * s);
    let mut b = Path::builder();
    b.begin(p(5.0, 5.0));
    b.cubic_bezier_to(p(5.0, 5.0), p(4.0, 0.0), p(0.0, 0.0));
    b.cubic_bezier_to(p(-6.0, 0.0), p(-6.0, 7.0), p(-6.0, 7.0));
    b.cubic_bezier_to(p(-6.0, 11.0), p(-3.0, 15.4), p(5.0, 19.0));
    b.cubic_bezier_to(p(12.0, 15.4), p(16.0, 11.0), p(16.0, 7.0));
    b.cubic_bezier_to(p(16.0, 7.0), p(16.0, 0.0), p(10.0, 0.0));
    b.cubic_bezier_to(p(7.0, 0.0), p(5.0, 5.0), p(5.0, 5.0));
    b.end(true);
    b.build()
}

/// Star polygon alternating between `outer` and `inner` radii.
pub fn star_path(points: u32, outer: f32, inner: f32) -> Path {
    let mut b = Path::builder();
    let corners = points * 2;
    for i in 0..corners {
        let angle = i as f32 / corners as f32 * TAU + PI / 2.0;
        let r = if i % 2 == 0 { outer } else { inner };
        let at = point(angle.cos() * r, angle.sin() * r);
        if i == 0 {
            b.begin(at);
        } else {
            b.line_to(at);
        }
    }
    b.end(true);
    b.build()
}

/// Triangulate a path into a flat mesh in the z = 0 plane facing +Z.
pub fn fill(path: &Path, tolerance: f32) -> Result<MeshData, GeometryError> {
    let mut buffers: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            path,
            &FillOptions::tolerance(tolerance),
            &mut BuffersBuilder::new(&mut buffers, |v: FillVertex| v.position().to_array()),
        )
        .map_err(|e| GeometryError::Tessellation(format!("{e:?}")))?;
    if buffers.indices.is_empty() {
        return Err(GeometryError::EmptyOutline);
    }

    let mut mesh = MeshData::new();
    for [x, y] in &buffers.vertices {
        mesh.push_vertex(Vec3::new(*x, *y, 0.0), Vec3::Z);
    }
    for tri in buffers.indices.chunks_exact(3) {
        mesh.push_triangle(tri[0], tri[1], tri[2]);
    }
    Ok(mesh)
}

/// Flattened closed contours of a path.
pub fn contours(path: &Path, tolerance: f32) -> Vec<Vec<Vec2>> {
    let mut out = Vec::new();
    let mut current: Vec<Vec2> = Vec::new();
    for event in path.iter().flattened(tolerance) {
        match event {
            PathEvent::Begin { at } => {
                current = vec![Vec2::new(at.x, at.y)];
            }
            PathEvent::Line { to, .. } => current.push(Vec2::new(to.x, to.y)),
            PathEvent::End { .. } => {
                if current.len() > 1 && current.first() == current.last() {
                    current.pop();
                }
                if current.len() >= 3 {
                    out.push(std::mem::take(&mut current));
                }
            }
            PathEvent::Quadratic { .. } | PathEvent::Cubic { .. } => {}
        }
    }
    out
}

fn signed_area(contour: &[Vec2]) -> f32 {
    let n = contour.len();
    (0..n)
        .map(|i| contour[i].perp_dot(contour[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

/// Extrude a path along Z into a solid of `depth`, centered on z = 0.
pub fn extrude(path: &Path, depth: f32, tolerance: f32) -> Result<MeshData, GeometryError> {
    let face = fill(path, tolerance)?;
    let half = depth * 0.5;
    let mut mesh = MeshData::new();

    let mut front = face.clone();
    front.translate(Vec3::new(0.0, 0.0, half));
    mesh.append(&front);

    let mut back = face;
    back.translate(Vec3::new(0.0, 0.0, -half));
    for n in &mut back.normals {
        *n = [0.0, 0.0, -1.0];
    }
    for tri in back.indices.chunks_exact_mut(3) {
        tri.swap(1, 2);
    }
    mesh.append(&back);

    // Side walls face away from the solid when the dominant contour's winding
    // sets the sign; holes wind the other way and come out right too.
    let rings = contours(path, tolerance);
    let orientation = rings
        .iter()
        .map(|c| signed_area(c))
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .map_or(1.0, f32::signum);
    for ring in &rings {
        for i in 0..ring.len() {
            let a = ring[i];
            let b = ring[(i + 1) % ring.len()];
            let edge = b - a;
            let normal = Vec3::new(edge.y, -edge.x, 0.0) * orientation;
            let i0 = mesh.push_vertex(a.extend(half), normal);
            let i1 = mesh.push_vertex(b.extend(half), normal);
            let i2 = mesh.push_vertex(b.extend(-half), normal);
            let i3 = mesh.push_vertex(a.extend(-half), normal);
            mesh.push_triangle(i0, i3, i2);
            mesh.push_triangle(i2, i1, i0);
        }
    }
    Ok(mesh)
}

/// Point on the tube's wave-shaped sweep path, `t` in [0, 1].
pub fn wave_point(t: f32) -> Vec3 {
    Vec3::new(
        (t * 2.0 - 1.0) * 0.8,
        (t * TAU).sin() * 0.4,
        (t * TAU).cos() * 0.2,
    )
}

/// Sweep a circle of `radius` along `curve` using parallel-transport frames.
pub fn tube(
    curve: impl Fn(f32) -> Vec3,
    tubular_segments: u32,
    radius: f32,
    radial_segments: u32,
) -> MeshData {
    let samples: Vec<Vec3> = (0..=tubular_segments)
        .map(|i| curve(i as f32 / tubular_segments as f32))
        .collect();
    let tangents: Vec<Vec3> = (0..samples.len())
        .map(|i| {
            let prev = samples[i.saturating_sub(1)];
            let next = samples[(i + 1).min(samples.len() - 1)];
            (next - prev).normalize()
        })
        .collect();

    let mut normals = Vec::with_capacity(samples.len());
    let mut normal = tangents[0].any_orthonormal_vector();
    normals.push(normal);
    for w in tangents.windows(2) {
        let axis = w[0].cross(w[1]);
        if axis.length_squared() > 1e-12 {
            let angle = w[0].dot(w[1]).clamp(-1.0, 1.0).acos();
            normal = glam::Quat::from_axis_angle(axis.normalize(), angle) * normal;
        }
        normals.push(normal);
    }

    MeshData::parametric(tubular_segments, radial_segments, |u, v| {
        let i = (v * tubular_segments as f32).round() as usize;
        let binormal = tangents[i].cross(normals[i]);
        let (s, c) = (u * TAU).sin_cos();
        let dir = normals[i] * c + binormal * s;
        (samples[i] + dir * radius, dir)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heart_fills_flat() {
        let m = fill(&heart_path(), 0.01).unwrap();
        assert!(m.triangle_count() > 10);
        let size = m.bounding_box().unwrap().size();
        assert_eq!(size.z, 0.0);
        assert!(size.y > 0.8 && size.y < 1.1);
    }

    #[test]
    fn star_contour_has_all_corners() {
        let rings = contours(&star_path(5, 0.8, 0.35), 0.01);
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 10);
    }

    #[test]
    fn extruded_star_has_depth_and_outward_walls() {
        let m = extrude(&star_path(5, 0.8, 0.35), 0.3, 0.01).unwrap();
        let bounds = m.bounding_box().unwrap();
        assert!((bounds.size().z - 0.3).abs() < 1e-6);
        // Wall normals point away from the star center.
        for (p, n) in m.positions.iter().zip(&m.normals) {
            let n = Vec3::from_array(*n);
            if n.z == 0.0 {
                let p = Vec3::from_array(*p);
                assert!(n.dot(Vec3::new(p.x, p.y, 0.0)) > -1e-4);
            }
        }
    }

    #[test]
    fn empty_path_is_rejected() {
        let empty = Path::builder().build();
        assert!(matches!(fill(&empty, 0.01), Err(GeometryError::EmptyOutline)));
    }

    #[test]
    fn tube_surface_stays_at_radius() {
        let m = tube(wave_point, 32, 0.1, 8);
        assert_eq!(m.vertex_count(), 33 * 9);
        for (p, n) in m.positions.iter().zip(&m.normals) {
            assert!(Vec3::from_array(*n).is_normalized());
            assert!(p.iter().all(|c| c.is_finite()));
        }
    }
}
