//! Procedural mesh generators.

use super::{Mesh, RenderMeta};

/// Per-face frame of a box: outward normal, then the directions of
/// increasing `u` and `v`. `right × up == normal`, so the quad is
/// counter-clockwise seen from outside.
const BOX_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

const QUAD_CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

impl Mesh {
    /// An axis-aligned box centered on the origin.
    ///
    /// `size` is the full extent along X, Y and Z. Every face has its own four
    /// vertices (24 in total) so normals stay flat, and each face's UVs span
    /// `[0, 1]`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use storey_core::color::HexColor;
    /// # use storey_core::mesh::{Mesh, MeshKind, RenderMeta};
    /// let meta = RenderMeta::new(MeshKind::Item, HexColor::new(0xcfcfcf));
    /// let cube = Mesh::cuboid("box", [2.0, 2.0, 2.0], meta);
    ///
    /// assert_eq!(cube.vertex_count(), 24);
    /// assert_eq!(cube.triangle_count(), 12);
    /// ```
    pub fn cuboid(name: impl Into<String>, size: [f32; 3], meta: RenderMeta) -> Self {
        let half = [size[0] / 2.0, size[1] / 2.0, size[2] / 2.0];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut uvs = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, right, up) in BOX_FACES {
            let base = positions.len() as u32;
            for (su, sv) in QUAD_CORNERS {
                let mut p = [0.0f32; 3];
                for axis in 0..3 {
                    p[axis] = (normal[axis] + right[axis] * su + up[axis] * sv) * half[axis];
                }
                positions.push(p);
                normals.push(normal);
                uvs.push([(su + 1.0) / 2.0, (sv + 1.0) / 2.0]);
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Mesh::new(name, positions, indices, meta)
            .with_normals(normals)
            .with_uvs(uvs)
    }

    /// Replaces the UVs with `f(position)` for every vertex.
    pub fn with_planar_uvs(self, f: impl Fn([f32; 3]) -> [f32; 2]) -> Self {
        let uvs = self.positions.iter().map(|&p| f(p)).collect();
        self.with_uvs(uvs)
    }

    /// Multiplies every UV by `(u, v)`. A mesh without UVs is returned
    /// unchanged.
    pub fn with_uv_scale(mut self, u: f32, v: f32) -> Self {
        if let Some(uvs) = self.uvs.as_mut() {
            for uv in uvs.iter_mut() {
                uv[0] *= u;
                uv[1] *= v;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::color::HexColor;
    use crate::mesh::{MeshKind, cross, dot, sub};

    fn cube(size: [f32; 3]) -> Mesh {
        Mesh::cuboid(
            "cube",
            size,
            RenderMeta::new(MeshKind::Item, HexColor::new(0xcfcfcf)),
        )
    }

    #[test]
    fn test_cuboid_extent() {
        let mesh = cube([4.0, 2.0, 6.0]);
        mesh.validate().unwrap();

        for axis in 0..3 {
            let min = mesh.positions().iter().map(|p| p[axis]).fold(f32::MAX, f32::min);
            let max = mesh.positions().iter().map(|p| p[axis]).fold(f32::MIN, f32::max);
            assert_approx_eq!(f32, max - min, [4.0, 2.0, 6.0][axis]);
            assert_approx_eq!(f32, max + min, 0.0);
        }
    }

    #[test]
    fn test_cuboid_winding_matches_normals() {
        let mesh = cube([1.0, 2.0, 3.0]);
        let normals = mesh.normals().unwrap();

        for tri in mesh.indices().chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let p = mesh.positions();
            let face = cross(sub(p[b], p[a]), sub(p[c], p[a]));
            assert!(dot(face, normals[a]) > 0.0);
        }
    }

    #[test]
    fn test_cuboid_uvs_in_unit_range() {
        let mesh = cube([3.0, 3.0, 3.0]);
        for uv in mesh.uvs().unwrap() {
            assert!((0.0..=1.0).contains(&uv[0]));
            assert!((0.0..=1.0).contains(&uv[1]));
        }
    }

    #[test]
    fn test_uv_scale() {
        let mesh = cube([1.0, 1.0, 1.0]).with_uv_scale(2.0, 3.0);
        let max_u = mesh.uvs().unwrap().iter().map(|uv| uv[0]).fold(0.0, f32::max);
        let max_v = mesh.uvs().unwrap().iter().map(|uv| uv[1]).fold(0.0, f32::max);
        assert_approx_eq!(f32, max_u, 2.0);
        assert_approx_eq!(f32, max_v, 3.0);
    }

    #[test]
    fn test_planar_uvs() {
        let mesh = cube([2.0, 2.0, 2.0]).with_planar_uvs(|p| [p[0], p[1]]);
        for (p, uv) in mesh.positions().iter().zip(mesh.uvs().unwrap()) {
            assert_eq!([p[0], p[1]], *uv);
        }
    }
}
