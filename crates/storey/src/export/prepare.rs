//! World-space mesh preparation ahead of emission.

use std::sync::Arc;

use log::debug;

use storey_core::{
    mesh::{Mesh, tangents_are_valid},
    scene::WorldMesh,
};

use super::Error;
use crate::resolve::{Material, Resolved, Resolver};

/// A baked mesh and the material it is emitted with.
#[derive(Debug, Clone)]
pub(crate) struct PreparedMesh {
    pub(crate) mesh: Mesh,
    pub(crate) material: Arc<Material>,
}

/// Bakes `world` and settles its attributes against `resolved`.
///
/// Normals are computed when missing and UVs are tiled by the repeat factors.
/// A normal-mapped material keeps its normal map only if the mesh ends up with
/// a valid tangent for every vertex; otherwise the mesh falls back to the same
/// material without one. Meshes whose material has no normal map never carry
/// tangents.
pub(crate) fn prepare(
    world: &WorldMesh<'_>,
    resolved: &Resolved,
    resolver: &Resolver<'_>,
) -> Result<PreparedMesh, Error> {
    let mut mesh = world.mesh().baked(world.transform());
    if mesh.normals().is_none() {
        let normals = mesh.computed_normals();
        mesh = mesh.with_normals(normals);
    }
    if let Some([u, v]) = resolved.uv_repeat() {
        mesh = mesh.with_uv_scale(u, v);
    }

    let mut material = Arc::clone(resolved.material());
    if material.normal_map().is_some() {
        let tangents = match mesh.tangents() {
            Some(tangents) => Some(tangents.to_vec()),
            None => mesh.computed_tangents(),
        };
        match tangents.filter(|t| tangents_are_valid(t)) {
            Some(tangents) => mesh = mesh.with_tangents(tangents),
            None => {
                debug!(mesh = mesh.name(); "Dropping normal map without a valid tangent basis");
                mesh = mesh.without_tangents();
                material = resolver.without_normal_map(&material);
            }
        }
    } else {
        mesh = mesh.without_tangents();
    }

    mesh.validate()?;
    Ok(PreparedMesh { mesh, material })
}
