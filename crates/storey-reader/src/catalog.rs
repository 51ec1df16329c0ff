//! Texture catalog: element type → texture name → texture definition.
//!
//! The catalog is supplied next to the floor plan (the `texturesByType`
//! field of an export request, or a separate file). It is read with the same
//! leniency as the plan: numeric fields accept numbers or numeric strings and
//! malformed entries are dropped with a warning.
//!
//! ```json
//! {
//!   "wall": {
//!     "bricks": {
//!       "uri": "https://cdn.example.com/bricks.jpg",
//!       "lengthRepeatScale": 0.01,
//!       "heightRepeatScale": 0.01,
//!       "normal": { "uri": "data:image/png;base64,...", "normalScaleX": 1, "normalScaleY": 0.5 }
//!     }
//!   }
//! }
//! ```

use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::coerce;

/// Normal map attached to a texture definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalMapDef {
    uri: Option<String>,
    scale_x: Option<f64>,
    scale_y: Option<f64>,
}

impl NormalMapDef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, x: Option<f64>, y: Option<f64>) -> Self {
        self.scale_x = x.filter(|v| v.is_finite());
        self.scale_y = y.filter(|v| v.is_finite());
        self
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// The scalar normal scale written to the material.
    ///
    /// The average of the X and Y scales when both are set, else the X
    /// scale, else 1. A lone Y scale is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// # use storey_reader::catalog::NormalMapDef;
    /// let normal = NormalMapDef::new("n.png");
    /// assert_eq!(normal.clone().with_scale(Some(1.0), Some(0.5)).scale(), 0.75);
    /// assert_eq!(normal.clone().with_scale(Some(2.0), None).scale(), 2.0);
    /// assert_eq!(normal.with_scale(None, Some(3.0)).scale(), 1.0);
    /// ```
    pub fn scale(&self) -> f64 {
        match (self.scale_x, self.scale_y) {
            (Some(x), Some(y)) => (x + y) / 2.0,
            (Some(x), None) => x,
            _ => 1.0,
        }
    }

    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            uri: coerce::text(object, "uri"),
            scale_x: object.get("normalScaleX").and_then(coerce::number),
            scale_y: object.get("normalScaleY").and_then(coerce::number),
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextureDef {
    uri: Option<String>,
    normal: Option<NormalMapDef>,
    length_repeat_scale: Option<f64>,
    height_repeat_scale: Option<f64>,
}

impl TextureDef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    pub fn with_normal(mut self, normal: NormalMapDef) -> Self {
        self.normal = Some(normal);
        self
    }

    pub fn with_repeat_scale(mut self, length: f64, height: f64) -> Self {
        self.length_repeat_scale = Some(length).filter(|v| v.is_finite());
        self.height_repeat_scale = Some(height).filter(|v| v.is_finite());
        self
    }

    /// Base color image URI. An entry without one still counts as selected.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn normal(&self) -> Option<&NormalMapDef> {
        self.normal.as_ref()
    }

    /// Texture repeats per unit of surface length (along `u`).
    pub fn length_repeat_scale(&self) -> Option<f64> {
        self.length_repeat_scale
    }

    /// Texture repeats per unit of surface height (along `v`).
    pub fn height_repeat_scale(&self) -> Option<f64> {
        self.height_repeat_scale
    }

    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            uri: coerce::text(object, "uri"),
            normal: object
                .get("normal")
                .and_then(Value::as_object)
                .map(NormalMapDef::from_object),
            length_repeat_scale: object.get("lengthRepeatScale").and_then(coerce::number),
            height_repeat_scale: object.get("heightRepeatScale").and_then(coerce::number),
        }
    }
}

/// Texture definitions keyed by element type, then texture name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextureCatalog {
    types: IndexMap<String, IndexMap<String, TextureDef>>,
}

impl TextureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the definition for `(element_type, texture_name)`.
    pub fn with_texture(
        mut self,
        element_type: impl Into<String>,
        texture_name: impl Into<String>,
        def: TextureDef,
    ) -> Self {
        self.types
            .entry(element_type.into())
            .or_default()
            .insert(texture_name.into(), def);
        self
    }

    /// Looks up the definition an element selects.
    pub fn get(&self, element_type: &str, texture_name: &str) -> Option<&TextureDef> {
        self.types.get(element_type)?.get(texture_name)
    }

    pub fn is_empty(&self) -> bool {
        self.types.values().all(IndexMap::is_empty)
    }

    /// Number of texture definitions across all element types.
    pub fn len(&self) -> usize {
        self.types.values().map(IndexMap::len).sum()
    }

    /// Element types with at least one definition.
    pub fn element_types(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Keeps only the element types in `used`.
    pub fn restricted_to<'a>(&self, used: impl IntoIterator<Item = &'a str>) -> Self {
        let used: Vec<&str> = used.into_iter().collect();
        let types = self
            .types
            .iter()
            .filter(|(element_type, _)| used.contains(&element_type.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self { types }
    }

    /// Builds a catalog from an already-parsed JSON object.
    pub(crate) fn from_object(object: &Map<String, Value>) -> Self {
        let mut types = IndexMap::new();
        for (element_type, textures) in object {
            let Some(textures) = textures.as_object() else {
                warn!(element_type = element_type.as_str(); "Skipping catalog type that is not an object");
                continue;
            };
            let defs: IndexMap<String, TextureDef> = textures
                .iter()
                .filter_map(|(name, def)| match def.as_object() {
                    Some(def) => Some((name.clone(), TextureDef::from_object(def))),
                    None => {
                        warn!(
                            element_type = element_type.as_str(),
                            texture = name.as_str();
                            "Skipping catalog entry that is not an object"
                        );
                        None
                    }
                })
                .collect();
            types.insert(element_type.clone(), defs);
        }
        Self { types }
    }
}

impl<'de> Deserialize<'de> for TextureCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Object(object) => Ok(Self::from_object(&object)),
            Value::Null => Ok(Self::default()),
            _ => Err(serde::de::Error::custom("texture catalog must be an object")),
        }
    }
}
