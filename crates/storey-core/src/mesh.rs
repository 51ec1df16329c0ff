//! Triangulated meshes.
//!
//! A [`Mesh`] is indexed triangle-list geometry (positions plus optional
//! normals, UVs and tangents) tagged with a [`RenderMeta`]. Meshes are
//! authored in the local space of the scene node that owns them; the exporter
//! bakes world transforms with [`Mesh::baked`].

mod meta;
mod primitives;
mod tangent;

pub use meta::{MeshKind, RenderMeta, SurfaceExtent};
pub use tangent::{TANGENT_EPSILON, tangents_are_valid};

use thiserror::Error;

use crate::geometry::Transform;

/// Structural problems that make a mesh unusable for export.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("mesh `{mesh}` has no vertices")]
    Empty { mesh: String },

    #[error("mesh `{mesh}` index count {count} is not a multiple of 3")]
    IncompleteTriangle { mesh: String, count: usize },

    #[error("mesh `{mesh}` references vertex {index} but has {vertex_count} vertices")]
    IndexOutOfRange {
        mesh: String,
        index: u32,
        vertex_count: usize,
    },

    #[error("mesh `{mesh}` attribute `{attribute}` has {len} entries, expected {expected}")]
    AttributeLength {
        mesh: String,
        attribute: &'static str,
        len: usize,
        expected: usize,
    },
}

/// Indexed triangle-list geometry with render metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    name: String,
    positions: Vec<[f32; 3]>,
    normals: Option<Vec<[f32; 3]>>,
    uvs: Option<Vec<[f32; 2]>>,
    tangents: Option<Vec<[f32; 4]>>,
    indices: Vec<u32>,
    meta: RenderMeta,
}

impl Mesh {
    /// Creates a mesh from positions and triangle indices.
    pub fn new(
        name: impl Into<String>,
        positions: Vec<[f32; 3]>,
        indices: Vec<u32>,
        meta: RenderMeta,
    ) -> Self {
        Self {
            name: name.into(),
            positions,
            normals: None,
            uvs: None,
            tangents: None,
            indices,
            meta,
        }
    }

    pub fn with_normals(mut self, normals: Vec<[f32; 3]>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<[f32; 2]>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    pub fn with_tangents(mut self, tangents: Vec<[f32; 4]>) -> Self {
        self.tangents = Some(tangents);
        self
    }

    /// Drops the tangent attribute.
    pub fn without_tangents(mut self) -> Self {
        self.tangents = None;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn normals(&self) -> Option<&[[f32; 3]]> {
        self.normals.as_deref()
    }

    pub fn uvs(&self) -> Option<&[[f32; 2]]> {
        self.uvs.as_deref()
    }

    pub fn tangents(&self) -> Option<&[[f32; 4]]> {
        self.tangents.as_deref()
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn meta(&self) -> &RenderMeta {
        &self.meta
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks index bounds, triangle completeness and attribute lengths.
    ///
    /// # Errors
    ///
    /// Returns the first [`MeshError`] found.
    pub fn validate(&self) -> Result<(), MeshError> {
        let vertex_count = self.positions.len();
        if vertex_count == 0 {
            return Err(MeshError::Empty {
                mesh: self.name.clone(),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::IncompleteTriangle {
                mesh: self.name.clone(),
                count: self.indices.len(),
            });
        }
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange {
                mesh: self.name.clone(),
                index,
                vertex_count,
            });
        }

        let lengths = [
            ("NORMAL", self.normals.as_ref().map(Vec::len)),
            ("TEXCOORD_0", self.uvs.as_ref().map(Vec::len)),
            ("TANGENT", self.tangents.as_ref().map(Vec::len)),
        ];
        for (attribute, len) in lengths {
            if let Some(len) = len.filter(|&len| len != vertex_count) {
                return Err(MeshError::AttributeLength {
                    mesh: self.name.clone(),
                    attribute,
                    len,
                    expected: vertex_count,
                });
            }
        }

        Ok(())
    }

    /// Returns a copy of this mesh with `transform` baked into its vertex data.
    ///
    /// Positions take the full affine transform, normals the inverse-transpose
    /// (renormalized) and tangent directions the linear part with their
    /// handedness kept.
    pub fn baked(&self, transform: &Transform) -> Mesh {
        if transform.is_identity() {
            return self.clone();
        }

        let positions = self
            .positions
            .iter()
            .map(|&p| transform.transform_point(p))
            .collect();
        let normals = self.normals.as_ref().map(|normals| {
            normals
                .iter()
                .map(|&n| transform.transform_normal(n))
                .collect()
        });
        let tangents = self.tangents.as_ref().map(|tangents| {
            tangents
                .iter()
                .map(|&[x, y, z, w]| {
                    let [tx, ty, tz] = transform.transform_vector([x, y, z]);
                    let len = (tx * tx + ty * ty + tz * tz).sqrt();
                    if len > 0.0 {
                        [tx / len, ty / len, tz / len, w]
                    } else {
                        [tx, ty, tz, w]
                    }
                })
                .collect()
        });

        Mesh {
            name: self.name.clone(),
            positions,
            normals,
            uvs: self.uvs.clone(),
            tangents,
            indices: self.indices.clone(),
            meta: self.meta.clone(),
        }
    }

    /// Area-weighted vertex normals derived from triangle winding
    /// (counter-clockwise triangles face the viewer).
    ///
    /// Vertices not referenced by any non-degenerate triangle get a zero
    /// normal.
    pub fn computed_normals(&self) -> Vec<[f32; 3]> {
        let mut accum = vec![[0.0f32; 3]; self.positions.len()];

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (pa, pb, pc) = (self.positions[a], self.positions[b], self.positions[c]);
            let e1 = sub(pb, pa);
            let e2 = sub(pc, pa);
            let face = cross(e1, e2);
            for v in [a, b, c] {
                accum[v] = add(accum[v], face);
            }
        }

        accum.into_iter().map(normalize_or_zero).collect()
    }
}

pub(crate) fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn add(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub(crate) fn scale(a: [f32; 3], s: f32) -> [f32; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

pub(crate) fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub(crate) fn normalize_or_zero(v: [f32; 3]) -> [f32; 3] {
    let len = dot(v, v).sqrt();
    if len > 0.0 && len.is_finite() {
        scale(v, 1.0 / len)
    } else {
        [0.0; 3]
    }
}
