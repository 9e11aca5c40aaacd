use glam::Vec3;
use std::collections::BTreeSet;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Indexed triangle mesh on the CPU.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.to_array());
        self.normals.push(normal.normalize_or_zero().to_array());
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Append another mesh, rebasing its indices.
    pub fn append(&mut self, other: &MeshData) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Non-indexed-style mesh with one face normal per triangle (flat shading).
    pub fn from_flat_triangles(triangles: &[[Vec3; 3]]) -> Self {
        let mut mesh = Self::new();
        for [a, b, c] in triangles {
            let normal = (*b - *a).cross(*c - *a);
            let ia = mesh.push_vertex(*a, normal);
            let ib = mesh.push_vertex(*b, normal);
            let ic = mesh.push_vertex(*c, normal);
            mesh.push_triangle(ia, ib, ic);
        }
        mesh
    }

    /// Build a `(rows + 1) x (cols + 1)` vertex grid from a parametric
    /// function of `(u, v)` in [0, 1], two triangles per cell.
    pub fn parametric(
        rows: u32,
        cols: u32,
        mut f: impl FnMut(f32, f32) -> (Vec3, Vec3),
    ) -> Self {
        let mut mesh = Self::new();
        for r in 0..=rows {
            let v = r as f32 / rows as f32;
            for c in 0..=cols {
                let u = c as f32 / cols as f32;
                let (position, normal) = f(u, v);
                mesh.push_vertex(position, normal);
            }
        }
        let stride = cols + 1;
        for r in 0..rows {
            for c in 0..cols {
                let a = r * stride + c;
                let b = a + 1;
                let d = a + stride;
                let e = d + 1;
                mesh.push_triangle(a, d, b);
                mesh.push_triangle(b, d, e);
            }
        }
        mesh
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        let mut iter = self.positions.iter().map(|p| Vec3::from_array(*p));
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Aabb { min, max })
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p = (Vec3::from_array(*p) + offset).to_array();
        }
    }

    /// Move the mesh so its bounding box is centered on the origin. Returns
    /// the applied offset.
    pub fn center(&mut self) -> Vec3 {
        let Some(bounds) = self.bounding_box() else {
            return Vec3::ZERO;
        };
        let offset = -bounds.center();
        self.translate(offset);
        offset
    }

    /// Unique triangle edges as a line list.
    pub fn wireframe_indices(&self) -> Vec<u32> {
        let mut edges = BTreeSet::new();
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                edges.insert((a.min(b), a.max(b)));
            }
        }
        edges.into_iter().flat_map(|(a, b)| [a, b]).collect()
    }
}
