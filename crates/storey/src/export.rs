//! Binary glTF serialization of a built scene.
//!
//! This module is the final stage of the Storey pipeline.
//!
//! # Pipeline Position
//!
//! ```text
//! Floor-plan JSON
//!     ↓ read
//! FloorPlan
//!     ↓ build
//! Scene (nodes + meshes with render metadata)
//!     ↓ export (this module)
//! GLB bytes
//! ```
//!
//! Exporting sanitizes node transforms, flattens the tree depth-first while
//! baking world transforms into each mesh, resolves every mesh's material
//! (on the rayon pool when enabled), settles normals, UV tiling and tangents,
//! and then emits one glTF node per mesh into a single binary buffer.
//!
//! # Error Handling
//!
//! Export operations return [`Error`]. [`Error`] converts into
//! [`StoreyError`](crate::StoreyError) at the crate boundary.

mod glb;
mod prepare;

use log::{debug, info, warn};
use rayon::prelude::*;
use thiserror::Error;

use storey_core::{
    mesh::MeshError,
    scene::{Scene, WorldMesh},
};

use crate::resolve::{ResolveError, Resolved, Resolver};

use glb::ExportContext;

/// Errors that can occur while serializing a scene.
#[derive(Debug, Error)]
pub enum Error {
    /// A mesh's material needs a texture that could not be provided.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A mesh failed its structural check.
    #[error("invalid mesh: {0}")]
    InvalidMesh(#[from] MeshError),

    /// The glTF document could not be encoded as JSON.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The output does not fit the 32-bit GLB length field.
    #[error("output of {bytes} bytes exceeds the GLB size limit")]
    Oversized { bytes: usize },
}

/// Serializes `scene` into a GLB payload.
///
/// # Arguments
///
/// * `scene` - The built scene. Non-finite local transforms are reset.
/// * `resolver` - The per-export material resolver.
/// * `parallel` - Resolve materials on the rayon thread pool.
/// * `generator` - Value of the `asset.generator` field.
///
/// # Errors
///
/// Returns the first [`Error`] in mesh order.
pub(crate) fn write_glb(
    mut scene: Scene,
    resolver: &Resolver<'_>,
    parallel: bool,
    generator: &str,
) -> Result<Vec<u8>, Error> {
    let reset = scene.sanitize_transforms();
    if reset > 0 {
        warn!(nodes = reset; "Reset non-finite node transforms");
    }

    let world = scene.world_meshes();
    info!(meshes = world.len(); "Resolving materials");

    let resolve = |w: &WorldMesh<'_>| resolver.resolve(w.mesh().meta());
    let resolved: Vec<Result<Resolved, ResolveError>> = if parallel {
        world.par_iter().map(resolve).collect()
    } else {
        world.iter().map(resolve).collect()
    };
    let resolved = resolved.into_iter().collect::<Result<Vec<_>, _>>()?;
    debug!(
        materials = resolver.material_count(),
        textures = resolver.texture_count();
        "Materials resolved"
    );

    let mut context = ExportContext::new();
    for (mesh, resolved) in world.iter().zip(&resolved) {
        let prepared = prepare::prepare(mesh, resolved, resolver)?;
        context.push_mesh(&prepared);
    }

    let glb = context.finish(scene.root().name(), generator)?;
    info!(bytes = glb.len(); "GLB written");
    Ok(glb)
}
