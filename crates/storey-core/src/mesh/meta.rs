//! Typed render metadata attached to every mesh.
//!
//! The builder fills a [`RenderMeta`] when it creates a mesh. The resolver
//! and exporter read it to pick materials, textures and UV repeat scaling;
//! geometry construction never looks at it again.

use std::fmt;

use crate::color::HexColor;

/// The floor-plan element a mesh was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshKind {
    /// Triangulated floor polygon of an area.
    Floor,
    /// One box segment of a wall.
    Wall,
    /// Decorative box filling a wall opening.
    Hole,
    /// Box approximation of a furniture item.
    Item,
}

impl MeshKind {
    /// Returns the lowercase name used for materials and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Floor => "floor",
            Self::Wall => "wall",
            Self::Hole => "hole",
            Self::Item => "item",
        }
    }

    /// Floors are visible from below as well, everything else is closed.
    pub fn is_double_sided(self) -> bool {
        matches!(self, Self::Floor)
    }
}

impl fmt::Display for MeshKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Real-world size of the surface a mesh's `[0, 1]` UVs span.
///
/// `u` runs along the wall length (or floor width), `v` along the wall height
/// (or floor depth).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceExtent {
    u: f64,
    v: f64,
}

impl SurfaceExtent {
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    pub fn u(self) -> f64 {
        self.u
    }

    pub fn v(self) -> f64 {
        self.v
    }
}

/// Per-mesh render metadata.
///
/// Built once by the geometry builder with the `with_*` methods and then only
/// read.
///
/// # Examples
///
/// ```
/// # use storey_core::color::HexColor;
/// # use storey_core::mesh::{MeshKind, RenderMeta, SurfaceExtent};
/// let meta = RenderMeta::new(MeshKind::Wall, HexColor::new(0xd3d3d3))
///     .with_element_type(Some("wall".to_string()))
///     .with_texture_key(Some("bricks".to_string()))
///     .with_extent(SurfaceExtent::new(300.0, 300.0));
///
/// assert_eq!(meta.kind(), MeshKind::Wall);
/// assert_eq!(meta.texture_key(), Some("bricks"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RenderMeta {
    kind: MeshKind,
    element_type: Option<String>,
    texture_key: Option<String>,
    color: HexColor,
    extent: Option<SurfaceExtent>,
    layer_id: Option<String>,
}

impl RenderMeta {
    pub fn new(kind: MeshKind, color: HexColor) -> Self {
        Self {
            kind,
            element_type: None,
            texture_key: None,
            color,
            extent: None,
            layer_id: None,
        }
    }

    pub fn with_element_type(mut self, element_type: Option<String>) -> Self {
        self.element_type = element_type;
        self
    }

    pub fn with_texture_key(mut self, texture_key: Option<String>) -> Self {
        self.texture_key = texture_key;
        self
    }

    pub fn with_extent(mut self, extent: SurfaceExtent) -> Self {
        self.extent = Some(extent);
        self
    }

    pub fn with_layer_id(mut self, layer_id: Option<String>) -> Self {
        self.layer_id = layer_id;
        self
    }

    pub fn kind(&self) -> MeshKind {
        self.kind
    }

    /// The floor-plan element type (e.g. `"wall"`, `"door"`), used as the
    /// first key into the texture catalog.
    pub fn element_type(&self) -> Option<&str> {
        self.element_type.as_deref()
    }

    /// The texture name selected on the element, used as the second key into
    /// the texture catalog.
    pub fn texture_key(&self) -> Option<&str> {
        self.texture_key.as_deref()
    }

    pub fn color(&self) -> HexColor {
        self.color
    }

    pub fn extent(&self) -> Option<SurfaceExtent> {
        self.extent
    }

    pub fn layer_id(&self) -> Option<&str> {
        self.layer_id.as_deref()
    }
}
