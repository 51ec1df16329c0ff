//! Render metadata + texture catalog → deduplicated materials.
//!
//! # Overview
//!
//! A [`Resolver`] lives for exactly one export. For every mesh it looks up the
//! catalog entry selected by the mesh's `(element type, texture name)` pair,
//! loads the referenced images through a [`TextureFetcher`] and hands back a
//! shared [`Material`] plus the UV repeat factors for that mesh.
//!
//! Textures are memoized by URI and materials by [`MaterialKey`]; both caches
//! let concurrent callers wait on the first caller's work, so each distinct
//! URI is fetched at most once per export, failures included.

mod cache;
mod fetch;
mod material;

pub use fetch::{DefaultFetcher, FetchError, Payload, TextureFetcher, decode_data_uri};
pub use material::{Material, NormalMap, Texture};

pub(crate) use material::MaterialKey;

use std::sync::Arc;

use log::{debug, trace};
use thiserror::Error;

use storey_core::mesh::{RenderMeta, SurfaceExtent};
use storey_reader::{TextureCatalog, catalog::TextureDef};

use cache::OnceCache;
use material::image_mime_type;

/// A texture the catalog selected could not be provided.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("texture `{texture}` for `{element_type}` has no uri")]
    MissingUri {
        element_type: String,
        texture: String,
    },

    #[error("texture `{uri}` is unavailable: {reason}")]
    Unavailable { uri: String, reason: FetchError },
}

/// A mesh's material and how much to tile its UVs.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    material: Arc<Material>,
    uv_repeat: Option<[f32; 2]>,
}

impl Resolved {
    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    /// `(u, v)` multipliers for meshes with a catalog entry.
    pub fn uv_repeat(&self) -> Option<[f32; 2]> {
        self.uv_repeat
    }
}

/// Per-export material and texture resolver.
pub struct Resolver<'a> {
    catalog: &'a TextureCatalog,
    fetcher: &'a dyn TextureFetcher,
    textures: OnceCache<String, Result<Arc<Texture>, ResolveError>>,
    materials: OnceCache<MaterialKey, Result<Arc<Material>, ResolveError>>,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a TextureCatalog, fetcher: &'a dyn TextureFetcher) -> Self {
        Self {
            catalog,
            fetcher,
            textures: OnceCache::default(),
            materials: OnceCache::default(),
        }
    }

    /// Resolves the material of a mesh carrying `meta`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the selected catalog entry has no URI or
    /// one of its images cannot be loaded.
    pub fn resolve(&self, meta: &RenderMeta) -> Result<Resolved, ResolveError> {
        let selected = meta
            .element_type()
            .zip(meta.texture_key())
            .and_then(|(element_type, texture)| {
                self.catalog
                    .get(element_type, texture)
                    .map(|def| (element_type, texture, def))
            });

        let Some((element_type, texture, def)) = selected else {
            let base_color = meta.color().to_linear_factor(1.0);
            let key = MaterialKey::new(meta.kind(), meta.element_type(), None, None, base_color);
            let material = self.material(key, |key| {
                Ok(Material::new(key.clone(), base_color, None, None))
            })?;
            return Ok(Resolved {
                material,
                uv_repeat: None,
            });
        };

        let uri = def.uri().ok_or_else(|| ResolveError::MissingUri {
            element_type: element_type.to_string(),
            texture: texture.to_string(),
        })?;
        let normal = def
            .normal()
            .and_then(|normal| normal.uri().map(|uri| (uri, normal.scale() as f32)));

        let white = [1.0; 4];
        let key = MaterialKey::new(
            meta.kind(),
            meta.element_type(),
            Some(uri),
            normal.map(|(uri, _)| uri),
            white,
        );
        let material = self.material(key, |key| {
            let base = self.texture(uri)?;
            let normal_map = normal
                .map(|(uri, scale)| self.texture(uri).map(|t| NormalMap::new(t, scale)))
                .transpose()?;
            Ok(Material::new(key.clone(), white, Some(base), normal_map))
        })?;

        Ok(Resolved {
            material,
            uv_repeat: Some(uv_repeat(meta.extent(), def)),
        })
    }

    /// The shared variant of `material` without a normal map.
    pub fn without_normal_map(&self, material: &Arc<Material>) -> Arc<Material> {
        if material.normal_map().is_none() {
            return Arc::clone(material);
        }
        let key = material.key().without_normal_map();
        // Building the variant cannot fail; a stored error would be a bug.
        match self.material(key, |_| Ok(material.without_normal_map())) {
            Ok(variant) => variant,
            Err(_) => Arc::new(material.without_normal_map()),
        }
    }

    /// Distinct textures requested so far.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Distinct materials requested so far.
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    fn material(
        &self,
        key: MaterialKey,
        build: impl FnOnce(&MaterialKey) -> Result<Material, ResolveError>,
    ) -> Result<Arc<Material>, ResolveError> {
        self.materials.get_or_init(&key, || {
            trace!(key:?; "Building material");
            build(&key).map(Arc::new)
        })
    }

    fn texture(&self, uri: &str) -> Result<Arc<Texture>, ResolveError> {
        self.textures.get_or_init(&uri.to_string(), || {
            let unavailable = |reason| ResolveError::Unavailable {
                uri: uri.to_string(),
                reason,
            };
            let payload = self.fetcher.fetch(uri).map_err(unavailable)?;
            let mime_type = image_mime_type(uri, payload.media_type(), payload.bytes())
                .ok_or_else(|| unavailable(FetchError::UnsupportedFormat))?;
            let bytes = payload.into_bytes();
            debug!(mime_type, bytes = bytes.len(); "Texture loaded");
            Ok(Arc::new(Texture::new(uri, mime_type, bytes)))
        })
    }
}

/// UV multipliers `(extent.u × lengthRepeatScale, extent.v × heightRepeatScale)`.
///
/// A factor that is zero or not finite (including a missing extent or scale)
/// becomes 1.
fn uv_repeat(extent: Option<SurfaceExtent>, def: &TextureDef) -> [f32; 2] {
    let factor = |size: Option<f64>, scale: Option<f64>| {
        let repeat = size.zip(scale).map_or(f64::NAN, |(size, scale)| size * scale);
        if repeat.is_finite() && repeat != 0.0 {
            repeat as f32
        } else {
            1.0
        }
    };
    [
        factor(extent.map(SurfaceExtent::u), def.length_repeat_scale()),
        factor(extent.map(SurfaceExtent::v), def.height_repeat_scale()),
    ]
}
