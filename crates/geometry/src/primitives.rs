//! Closed-form primitive meshes. All are centered on the origin with +Y up.

use crate::MeshData;
use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

pub fn cuboid(width: f32, height: f32, depth: f32) -> MeshData {
    let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);
    let mut mesh = MeshData::new();
    // (face normal, u axis, v axis) with u x v == normal
    #[rustfmt::skip]
    let faces = [
        (Vec3::Z,     Vec3::X * hx,     Vec3::Y * hy, hz),
        (Vec3::NEG_Z, Vec3::NEG_X * hx, Vec3::Y * hy, hz),
        (Vec3::X,     Vec3::NEG_Z * hz, Vec3::Y * hy, hx),
        (Vec3::NEG_X, Vec3::Z * hz,     Vec3::Y * hy, hx),
        (Vec3::Y,     Vec3::X * hx,     Vec3::NEG_Z * hz, hy),
        (Vec3::NEG_Y, Vec3::X * hx,     Vec3::Z * hz, hy),
    ];
    for (normal, u, v, offset) in faces {
        let c = normal * offset;
        let a = mesh.push_vertex(c - u - v, normal);
        let b = mesh.push_vertex(c + u - v, normal);
        let d = mesh.push_vertex(c + u + v, normal);
        let e = mesh.push_vertex(c - u + v, normal);
        mesh.push_triangle(a, b, d);
        mesh.push_triangle(d, e, a);
    }
    mesh
}

pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    MeshData::parametric(height_segments, width_segments, |u, v| {
        let theta = u * TAU;
        let phi = v * PI;
        let normal = Vec3::new(
            -theta.cos() * phi.sin(),
            phi.cos(),
            theta.sin() * phi.sin(),
        );
        (normal * radius, normal)
    })
}

pub fn plane(width: f32, height: f32) -> MeshData {
    MeshData::parametric(1, 1, |u, v| {
        (
            Vec3::new((u - 0.5) * width, (0.5 - v) * height, 0.0),
            Vec3::Z,
        )
    })
}

pub fn circle(radius: f32, segments: u32) -> MeshData {
    let mut mesh = MeshData::new();
    let center = mesh.push_vertex(Vec3::ZERO, Vec3::Z);
    for i in 0..=segments {
        let t = i as f32 / segments as f32 * TAU;
        mesh.push_vertex(Vec3::new(t.cos(), t.sin(), 0.0) * radius, Vec3::Z);
    }
    for i in 1..=segments {
        mesh.push_triangle(center, i, i + 1);
    }
    mesh
}

pub fn ring(inner_radius: f32, outer_radius: f32, segments: u32) -> MeshData {
    MeshData::parametric(1, segments, |u, v| {
        let t = u * TAU;
        let r = inner_radius + (outer_radius - inner_radius) * v;
        (Vec3::new(t.cos(), t.sin(), 0.0) * r, Vec3::Z)
    })
}

/// Truncated cone with optional caps. `radius_top == 0` gives a cone.
pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> MeshData {
    let half = height * 0.5;
    let slope = (radius_bottom - radius_top) / height;
    let mut mesh = MeshData::parametric(1, radial_segments, |u, v| {
        let theta = u * TAU;
        let r = radius_top + (radius_bottom - radius_top) * v;
        let (s, c) = theta.sin_cos();
        (
            Vec3::new(r * s, half - v * height, r * c),
            Vec3::new(s, slope, c),
        )
    });
    for (radius, y, normal) in [(radius_top, half, Vec3::Y), (radius_bottom, -half, Vec3::NEG_Y)] {
        if radius > 0.0 {
            mesh.append(&cap(radius, y, normal, radial_segments));
        }
    }
    mesh
}

fn cap(radius: f32, y: f32, normal: Vec3, segments: u32) -> MeshData {
    let mut mesh = MeshData::new();
    let center = mesh.push_vertex(Vec3::new(0.0, y, 0.0), normal);
    for i in 0..=segments {
        let (s, c) = (i as f32 / segments as f32 * TAU).sin_cos();
        mesh.push_vertex(Vec3::new(radius * s, y, radius * c), normal);
    }
    for i in 1..=segments {
        mesh.push_triangle(center, i, i + 1);
    }
    mesh
}

pub fn cone(radius: f32, height: f32, radial_segments: u32) -> MeshData {
    cylinder(0.0, radius, height, radial_segments)
}

/// Cylinder of `length` with hemispherical ends of `radius`.
pub fn capsule(radius: f32, length: f32, cap_segments: u32, radial_segments: u32) -> MeshData {
    let half = length * 0.5;
    // Profile from the top pole down to the bottom pole: (radius, y, normal.xz, normal.y).
    let mut profile = Vec::new();
    for i in 0..=cap_segments {
        let a = FRAC_PI_2 - i as f32 / cap_segments as f32 * FRAC_PI_2;
        profile.push((a.cos() * radius, half + a.sin() * radius, a.cos(), a.sin()));
    }
    for i in 0..=cap_segments {
        let a = -(i as f32 / cap_segments as f32) * FRAC_PI_2;
        profile.push((a.cos() * radius, -half + a.sin() * radius, a.cos(), a.sin()));
    }
    let rows = profile.len() as u32 - 1;
    MeshData::parametric(rows, radial_segments, |u, v| {
        let row = (v * rows as f32).round() as usize;
        let (r, y, nr, ny) = profile[row];
        let (s, c) = (u * TAU).sin_cos();
        (Vec3::new(r * s, y, r * c), Vec3::new(nr * s, ny, nr * c))
    })
}

pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    MeshData::parametric(radial_segments, tubular_segments, |u, v| {
        let around = u * TAU;
        let section = v * TAU;
        let center = Vec3::new(around.cos(), around.sin(), 0.0) * radius;
        let position = Vec3::new(
            (radius + tube * section.cos()) * around.cos(),
            (radius + tube * section.cos()) * around.sin(),
            tube * section.sin(),
        );
        (position, position - center)
    })
}

/// (p, q) torus knot: winds `p` times around the axis and `q` times through the hole.
pub fn torus_knot(
    radius: f32,
    tube: f32,
    tubular_segments: u32,
    radial_segments: u32,
    p: u32,
    q: u32,
) -> MeshData {
    let (p, q) = (p as f32, q as f32);
    let curve = |t: f32| {
        let quotient = q / p * t;
        let cs = quotient.cos();
        Vec3::new(
            radius * (2.0 + cs) * 0.5 * t.cos(),
            radius * (2.0 + cs) * 0.5 * t.sin(),
            radius * quotient.sin() * 0.5,
        )
    };
    MeshData::parametric(radial_segments, tubular_segments, |u, v| {
        let t = u * p * TAU;
        let p1 = curve(t);
        let p2 = curve(t + 0.01);
        let tangent = p2 - p1;
        let binormal = tangent.cross(p2 + p1).normalize();
        let normal = binormal.cross(tangent).normalize();
        let angle = v * TAU;
        let position = p1 + normal * (-tube * angle.cos()) + binormal * (tube * angle.sin());
        (position, position - p1)
    })
}

pub fn octahedron(radius: f32) -> MeshData {
    #[rustfmt::skip]
    let vertices = [
        [1.0, 0.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0, -1.0],
    ];
    #[rustfmt::skip]
    let faces = [
        [0, 2, 4], [0, 4, 3], [0, 3, 5], [0, 5, 2],
        [1, 2, 5], [1, 5, 3], [1, 3, 4], [1, 4, 2],
    ];
    polyhedron(&vertices, &faces, radius)
}

pub fn icosahedron(radius: f32) -> MeshData {
    let t = (1.0 + 5f32.sqrt()) / 2.0;
    #[rustfmt::skip]
    let vertices = [
        [-1.0, t, 0.0], [1.0, t, 0.0], [-1.0, -t, 0.0], [1.0, -t, 0.0],
        [0.0, -1.0, t], [0.0, 1.0, t], [0.0, -1.0, -t], [0.0, 1.0, -t],
        [t, 0.0, -1.0], [t, 0.0, 1.0], [-t, 0.0, -1.0], [-t, 0.0, 1.0],
    ];
    #[rustfmt::skip]
    let faces = [
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];
    polyhedron(&vertices, &faces, radius)
}

/// Flat-shaded polyhedron with vertices projected onto a sphere of `radius`.
fn polyhedron(vertices: &[[f32; 3]], faces: &[[usize; 3]], radius: f32) -> MeshData {
    let project = |i: usize| Vec3::from_array(vertices[i]).normalize() * radius;
    let triangles: Vec<[Vec3; 3]> = faces
        .iter()
        .map(|f| [project(f[0]), project(f[1]), project(f[2])])
        .collect();
    MeshData::from_flat_triangles(&triangles)
}
