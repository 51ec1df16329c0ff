//! Resolved material and texture resources.

use std::sync::Arc;

use storey_core::mesh::MeshKind;

/// An image ready to be embedded in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    uri: String,
    name: Option<String>,
    mime_type: &'static str,
    bytes: Vec<u8>,
}

impl Texture {
    pub(crate) fn new(uri: &str, mime_type: &'static str, bytes: Vec<u8>) -> Self {
        Self {
            uri: uri.to_string(),
            name: texture_name(uri),
            mime_type,
            bytes,
        }
    }

    /// The catalog URI the texture was loaded from.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Last path segment of the URI; `None` for `data:` URIs.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// `image/png` or `image/jpeg`.
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Last path segment of `uri`, without query or fragment.
fn texture_name(uri: &str) -> Option<String> {
    if uri.starts_with("data:") {
        return None;
    }
    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    path.rsplit(['/', '\\'])
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Picks the glTF image MIME type for a payload.
///
/// Candidates in order: the data URI header, the URI's file extension, the
/// declared content type, then the magic bytes. Only PNG and JPEG qualify.
pub(crate) fn image_mime_type(
    uri: &str,
    declared: Option<&str>,
    bytes: &[u8],
) -> Option<&'static str> {
    let from_media_type = |media_type: &str| match media_type {
        "image/png" => Some("image/png"),
        "image/jpeg" | "image/jpg" => Some("image/jpeg"),
        _ => None,
    };

    if uri.starts_with("data:") {
        if let Some(mime) = declared.and_then(from_media_type) {
            return Some(mime);
        }
    }

    let path = uri.split(['?', '#']).next().unwrap_or(uri).to_ascii_lowercase();
    if path.ends_with(".png") {
        return Some("image/png");
    }
    if path.ends_with(".jpg") || path.ends_with(".jpeg") {
        return Some("image/jpeg");
    }

    if let Some(mime) = declared.and_then(from_media_type) {
        return Some(mime);
    }

    match image::guess_format(bytes).ok()? {
        image::ImageFormat::Png => Some("image/png"),
        image::ImageFormat::Jpeg => Some("image/jpeg"),
        _ => None,
    }
}

/// The identity of a material: equal keys share one [`Material`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct MaterialKey {
    kind: MeshKind,
    element_type: Option<String>,
    texture_uri: Option<String>,
    normal_uri: Option<String>,
    base_color: [u32; 4],
    double_sided: bool,
}

impl MaterialKey {
    pub(crate) fn new(
        kind: MeshKind,
        element_type: Option<&str>,
        texture_uri: Option<&str>,
        normal_uri: Option<&str>,
        base_color: [f32; 4],
    ) -> Self {
        Self {
            kind,
            element_type: element_type.map(str::to_string),
            texture_uri: texture_uri.map(str::to_string),
            normal_uri: normal_uri.map(str::to_string),
            base_color: base_color.map(f32::to_bits),
            double_sided: kind.is_double_sided(),
        }
    }

    pub(crate) fn without_normal_map(&self) -> Self {
        Self {
            normal_uri: None,
            ..self.clone()
        }
    }

    pub(crate) fn kind(&self) -> MeshKind {
        self.kind
    }

    pub(crate) fn double_sided(&self) -> bool {
        self.double_sided
    }
}

/// A normal texture and its strength.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalMap {
    texture: Arc<Texture>,
    scale: f32,
}

impl NormalMap {
    pub(crate) fn new(texture: Arc<Texture>, scale: f32) -> Self {
        Self { texture, scale }
    }

    pub fn texture(&self) -> &Arc<Texture> {
        &self.texture
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

/// A metallic-roughness material: metallic 0, roughness 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    key: MaterialKey,
    base_color: [f32; 4],
    base_texture: Option<Arc<Texture>>,
    normal_map: Option<NormalMap>,
}

impl Material {
    pub(crate) fn new(
        key: MaterialKey,
        base_color: [f32; 4],
        base_texture: Option<Arc<Texture>>,
        normal_map: Option<NormalMap>,
    ) -> Self {
        Self {
            key,
            base_color,
            base_texture,
            normal_map,
        }
    }

    pub(crate) fn key(&self) -> &MaterialKey {
        &self.key
    }

    /// The same material with its normal map removed.
    pub(crate) fn without_normal_map(&self) -> Self {
        Self {
            key: self.key.without_normal_map(),
            normal_map: None,
            ..self.clone()
        }
    }

    /// Material name: the kind of mesh it was made for.
    pub fn name(&self) -> &'static str {
        self.key.kind().name()
    }

    /// Linear RGBA factor; opaque white when a base texture is set.
    pub fn base_color(&self) -> [f32; 4] {
        self.base_color
    }

    pub fn base_texture(&self) -> Option<&Arc<Texture>> {
        self.base_texture.as_ref()
    }

    pub fn normal_map(&self) -> Option<&NormalMap> {
        self.normal_map.as_ref()
    }

    pub fn double_sided(&self) -> bool {
        self.key.double_sided()
    }
}
