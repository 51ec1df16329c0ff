//! Tangent basis generation and validation for normal-mapped meshes.

use super::{Mesh, add, cross, dot, normalize_or_zero, scale, sub};

/// A tangent whose xyz length is at or below this is unusable.
pub const TANGENT_EPSILON: f32 = 1e-6;

/// Checks that every tangent has a finite xyz length above
/// [`TANGENT_EPSILON`].
pub fn tangents_are_valid(tangents: &[[f32; 4]]) -> bool {
    tangents.iter().all(|t| {
        let len = (t[0] * t[0] + t[1] * t[1] + t[2] * t[2]).sqrt();
        len.is_finite() && len > TANGENT_EPSILON
    })
}

impl Mesh {
    /// Per-vertex tangents (xyz direction, w handedness) derived from
    /// positions, normals, UVs and indices.
    ///
    /// Returns `None` when the mesh has no normals or no UVs. Triangles with
    /// a degenerate UV mapping contribute nothing; a vertex left without any
    /// UV-derived direction gets an arbitrary unit vector perpendicular to its
    /// normal. The result is not validated, see [`tangents_are_valid`].
    pub fn computed_tangents(&self) -> Option<Vec<[f32; 4]>> {
        let normals = self.normals.as_ref()?;
        let uvs = self.uvs.as_ref()?;
        let count = self.positions.len();
        if normals.len() != count || uvs.len() != count {
            return None;
        }

        let mut tan_u = vec![[0.0f32; 3]; count];
        let mut tan_v = vec![[0.0f32; 3]; count];

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if a >= count || b >= count || c >= count {
                return None;
            }

            let e1 = sub(self.positions[b], self.positions[a]);
            let e2 = sub(self.positions[c], self.positions[a]);
            let (du1, dv1) = (uvs[b][0] - uvs[a][0], uvs[b][1] - uvs[a][1]);
            let (du2, dv2) = (uvs[c][0] - uvs[a][0], uvs[c][1] - uvs[a][1]);

            let det = du1 * dv2 - du2 * dv1;
            if !det.is_finite() || det.abs() <= f32::EPSILON {
                continue;
            }
            let r = 1.0 / det;
            let sdir = scale(sub(scale(e1, dv2), scale(e2, dv1)), r);
            let tdir = scale(sub(scale(e2, du1), scale(e1, du2)), r);

            for v in [a, b, c] {
                tan_u[v] = add(tan_u[v], sdir);
                tan_v[v] = add(tan_v[v], tdir);
            }
        }

        let tangents = (0..count)
            .map(|i| {
                let n = normals[i];
                // Gram-Schmidt against the normal.
                let mut t = normalize_or_zero(sub(tan_u[i], scale(n, dot(n, tan_u[i]))));
                if t == [0.0; 3] {
                    t = any_perpendicular(n);
                }
                let w = if dot(cross(n, t), tan_v[i]) < 0.0 {
                    -1.0
                } else {
                    1.0
                };
                [t[0], t[1], t[2], w]
            })
            .collect();

        Some(tangents)
    }
}

/// Unit vector perpendicular to `n`, or zero when `n` itself is zero.
fn any_perpendicular(n: [f32; 3]) -> [f32; 3] {
    let axis = if n[0].abs() < 0.9 {
        [1.0, 0.0, 0.0]
    } else {
        [0.0, 1.0, 0.0]
    };
    normalize_or_zero(cross(n, axis))
}
