//! Typed floor-plan entities.
//!
//! Everything here is already normalized: ids are strings, numeric
//! properties are finite with fallbacks applied, and per-layer collections
//! are [`IndexMap`]s keyed by id in document order. The geometry builder can
//! therefore resolve references (hole → line, area → hole areas, line →
//! vertices) with plain map lookups.

use indexmap::{IndexMap, IndexSet};

use storey_core::{color::HexColor, geometry::PlanPoint};

/// Identity shared by every floor-plan element.
pub trait Element {
    fn id(&self) -> &str;

    /// The editor's element type (e.g. `"wall"`, `"door"`, `"sofa"`).
    fn element_type(&self) -> Option<&str>;

    fn name(&self) -> Option<&str>;

    /// Name used for the element's scene node: its name, else its type,
    /// else its id.
    fn display_name(&self) -> &str {
        self.name()
            .or_else(|| self.element_type())
            .unwrap_or_else(|| self.id())
    }
}

macro_rules! impl_element {
    ($($ty:ty),*) => {
        $(
            impl Element for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn element_type(&self) -> Option<&str> {
                    self.element_type.as_deref()
                }

                fn name(&self) -> Option<&str> {
                    self.name.as_deref()
                }
            }
        )*
    };
}

impl_element!(Line, Hole, Area, Item);

/// A plan vertex, shared by id between the lines and areas of one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub(crate) id: String,
    pub(crate) point: PlanPoint,
}

impl Vertex {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn point(&self) -> PlanPoint {
        self.point
    }
}

/// A straight wall between two vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub(crate) id: String,
    pub(crate) element_type: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) vertices: Vec<String>,
    pub(crate) holes: Vec<String>,
    pub(crate) height: f64,
    pub(crate) thickness: f64,
    pub(crate) texture: Option<String>,
}

impl Line {
    /// Vertex ids; only the first two are used.
    pub fn vertices(&self) -> &[String] {
        &self.vertices
    }

    /// Ids of the openings cut into this wall.
    pub fn holes(&self) -> &[String] {
        &self.holes
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    /// Selected texture name: side B if set, else side A.
    pub fn texture(&self) -> Option<&str> {
        self.texture.as_deref()
    }
}

/// A rectangular opening (door, window) placed along a line.
#[derive(Debug, Clone, PartialEq)]
pub struct Hole {
    pub(crate) id: String,
    pub(crate) element_type: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) line: Option<String>,
    pub(crate) offset: f64,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) altitude: f64,
}

impl Hole {
    /// Id of the owning line.
    pub fn line(&self) -> Option<&str> {
        self.line.as_deref()
    }

    /// Fractional position of the opening center along its line, in `[0, 1]`.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Height of the opening's bottom edge above the floor.
    pub fn altitude(&self) -> f64 {
        self.altitude
    }
}

/// A polygonal floor area, optionally with cutouts given as other areas.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub(crate) id: String,
    pub(crate) element_type: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) vertices: Vec<String>,
    pub(crate) holes: Vec<String>,
    pub(crate) color: HexColor,
    pub(crate) texture: Option<String>,
}

impl Area {
    pub fn vertices(&self) -> &[String] {
        &self.vertices
    }

    /// Ids of the areas cut out of this one.
    pub fn holes(&self) -> &[String] {
        &self.holes
    }

    pub fn color(&self) -> HexColor {
        self.color
    }

    pub fn texture(&self) -> Option<&str> {
        self.texture.as_deref()
    }
}

/// A furniture item approximated by an oriented box.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub(crate) id: String,
    pub(crate) element_type: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) position: PlanPoint,
    pub(crate) rotation: f64,
    pub(crate) width: f64,
    pub(crate) depth: f64,
    pub(crate) height: f64,
    pub(crate) altitude: f64,
    pub(crate) color: HexColor,
}

impl Item {
    pub fn position(&self) -> PlanPoint {
        self.position
    }

    /// Rotation about the vertical axis, in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    pub fn color(&self) -> HexColor {
        self.color
    }
}

/// One storey of the plan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layer {
    pub(crate) id: String,
    pub(crate) altitude: f64,
    pub(crate) visible: bool,
    pub(crate) vertices: IndexMap<String, Vertex>,
    pub(crate) lines: IndexMap<String, Line>,
    pub(crate) holes: IndexMap<String, Hole>,
    pub(crate) areas: IndexMap<String, Area>,
    pub(crate) items: IndexMap<String, Item>,
}

impl Layer {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Elevation of the layer's floor.
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn vertices(&self) -> &IndexMap<String, Vertex> {
        &self.vertices
    }

    pub fn lines(&self) -> &IndexMap<String, Line> {
        &self.lines
    }

    pub fn holes(&self) -> &IndexMap<String, Hole> {
        &self.holes
    }

    pub fn areas(&self) -> &IndexMap<String, Area> {
        &self.areas
    }

    pub fn items(&self) -> &IndexMap<String, Item> {
        &self.items
    }

    /// Resolves a vertex id to its plan position.
    pub fn point(&self, vertex_id: &str) -> Option<PlanPoint> {
        self.vertices.get(vertex_id).map(Vertex::point)
    }
}

/// A whole floor-plan document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FloorPlan {
    pub(crate) layers: Vec<Layer>,
}

impl FloorPlan {
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn visible_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|layer| layer.visible)
    }

    /// Element types of the lines and areas on visible layers, in first-seen
    /// order.
    ///
    /// Used to restrict a texture catalog to the entries an export can
    /// actually select.
    pub fn used_element_types(&self) -> IndexSet<&str> {
        let mut types = IndexSet::new();
        for layer in self.visible_layers() {
            let lines = layer.lines.values().filter_map(Element::element_type);
            let areas = layer.areas.values().filter_map(Element::element_type);
            types.extend(lines.chain(areas));
        }
        types
    }
}
