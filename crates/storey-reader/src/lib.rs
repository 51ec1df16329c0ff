//! Storey Reader
//!
//! Reads floor-plan documents, texture catalogs and export requests into the
//! typed model consumed by the geometry builder.
//!
//! The reader is deliberately forgiving. Collections may be lists or keyed
//! objects, numbers may arrive as strings or `{ "length": .. }` objects, and
//! broken values fall back to [`ReaderConfig`] defaults instead of failing.
//! Only input that is not JSON at all, or whose top level is not an object,
//! produces a [`ReadError`].
//!
//! # Example
//!
//! ```
//! # use storey_reader::{ReaderConfig, model::Element};
//! let source = r#"{
//!   "layers": {
//!     "layer-1": {
//!       "vertices": { "a": { "x": 0, "y": 0 }, "b": { "x": 500, "y": 0 } },
//!       "lines": { "w1": { "type": "wall", "vertices": ["a", "b"],
//!                           "properties": { "height": { "length": 280 } } } }
//!     }
//!   }
//! }"#;
//!
//! let plan = storey_reader::read(source, &ReaderConfig::default()).unwrap();
//! let layer = &plan.layers()[0];
//! let wall = &layer.lines()["w1"];
//! assert_eq!(wall.display_name(), "wall");
//! assert_eq!(wall.height(), 280.0);
//! assert_eq!(wall.thickness(), 20.0);
//! ```

pub mod catalog;
mod coerce;
mod config;
mod document;
pub mod error;
pub mod model;

use log::{debug, info};
use serde_json::Value;

pub use catalog::TextureCatalog;
pub use config::ReaderConfig;
pub use error::ReadError;
pub use model::FloorPlan;

use crate::error::ErrorCode;

/// A floor plan together with the texture catalog it should be exported
/// with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportRequest {
    plan: FloorPlan,
    catalog: TextureCatalog,
}

impl ExportRequest {
    pub fn new(plan: FloorPlan, catalog: TextureCatalog) -> Self {
        Self { plan, catalog }
    }

    /// Replaces the request's catalog.
    pub fn with_catalog(mut self, catalog: TextureCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn plan(&self) -> &FloorPlan {
        &self.plan
    }

    pub fn catalog(&self) -> &TextureCatalog {
        &self.catalog
    }

    pub fn into_parts(self) -> (FloorPlan, TextureCatalog) {
        (self.plan, self.catalog)
    }
}

/// Reads a floor-plan document from JSON text.
///
/// # Errors
///
/// Returns [`ReadError`] if `source` is not valid JSON or is not an object.
pub fn read(source: &str, config: &ReaderConfig) -> Result<FloorPlan, ReadError> {
    let value = parse(source)?;
    read_value(&value, config)
}

/// Reads a floor-plan document from an already-parsed JSON value.
///
/// # Errors
///
/// Returns [`ReadError::NotAnObject`] if `value` is not an object.
pub fn read_value(value: &Value, config: &ReaderConfig) -> Result<FloorPlan, ReadError> {
    let document = value
        .as_object()
        .ok_or_else(|| ReadError::not_an_object(ErrorCode::E200, "floor plan", value))?;

    let plan = document::floor_plan(document, config);
    info!(layers = plan.layers().len(); "Floor plan read");
    Ok(plan)
}

/// Reads a texture catalog from JSON text.
///
/// # Errors
///
/// Returns [`ReadError`] if `source` is not valid JSON or is not an object.
pub fn read_catalog(source: &str) -> Result<TextureCatalog, ReadError> {
    let value = parse(source)?;
    let object = value
        .as_object()
        .ok_or_else(|| ReadError::not_an_object(ErrorCode::E201, "texture catalog", &value))?;

    let catalog = TextureCatalog::from_object(object);
    debug!(textures = catalog.len(); "Texture catalog read");
    Ok(catalog)
}

/// Reads an export request.
///
/// The body is either `{ "scene": <floor plan>, "texturesByType": <catalog> }`
/// or a bare floor-plan document (with an empty catalog). A `texturesByType`
/// that is not an object is treated as empty.
///
/// # Errors
///
/// Returns [`ReadError`] if `source` is not valid JSON, is not an object, or
/// its `scene` is not an object.
pub fn read_request(source: &str, config: &ReaderConfig) -> Result<ExportRequest, ReadError> {
    let value = parse(source)?;
    let body = value
        .as_object()
        .ok_or_else(|| ReadError::not_an_object(ErrorCode::E202, "request", &value))?;

    let plan = match body.get("scene").filter(|scene| !scene.is_null()) {
        Some(scene) => read_value(scene, config)?,
        None => read_value(&value, config)?,
    };
    let catalog = body
        .get("texturesByType")
        .and_then(Value::as_object)
        .map(TextureCatalog::from_object)
        .unwrap_or_default();

    debug!(textures = catalog.len(); "Export request read");
    Ok(ExportRequest { plan, catalog })
}

fn parse(source: &str) -> Result<Value, ReadError> {
    serde_json::from_str(source).map_err(ReadError::syntax)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use serde_json::json;

    use super::*;
    use crate::model::Element;
    use storey_core::color::HexColor;

    fn plan(value: Value) -> FloorPlan {
        read_value(&value, &ReaderConfig::default()).unwrap()
    }

    #[test]
    fn test_map_and_list_encodings_agree() {
        let as_map = plan(json!({
            "layers": {"l1": {
                "id": "l1",
                "vertices": {"a": {"id": "a", "x": 0, "y": 0}, "b": {"id": "b", "x": 100, "y": 0}},
                "lines": {"w": {"id": "w", "type": "wall", "vertices": ["a", "b"]}}
            }}
        }));
        let as_list = plan(json!({
            "layers": [{
                "id": "l1",
                "vertices": [{"id": "a", "x": 0, "y": 0}, {"id": "b", "x": 100, "y": 0}],
                "lines": [{"id": "w", "type": "wall", "vertices": ["a", "b"]}]
            }]
        }));

        assert_eq!(as_map, as_list);
    }

    #[test]
    fn test_list_entries_without_id_keyed_by_position() {
        let plan = plan(json!({
            "layers": [{"vertices": [{"x": 1, "y": 2}, {"x": 3, "y": 4}]}]
        }));

        let layer = &plan.layers()[0];
        assert_eq!(layer.id(), "0");
        assert_eq!(layer.vertices().keys().collect::<Vec<_>>(), ["0", "1"]);
        assert_eq!(layer.point("1").unwrap().x(), 3.0);
    }

    #[test]
    fn test_numeric_ids_normalize_to_strings() {
        let plan = plan(json!({
            "layers": [{
                "vertices": [{"id": 1, "x": 0, "y": 0}, {"id": 2, "x": 10, "y": 0}],
                "lines": [{"id": 5, "vertices": [1, 2]}]
            }]
        }));

        let line = &plan.layers()[0].lines()["5"];
        assert_eq!(line.vertices(), ["1", "2"]);
    }

    #[test]
    fn test_line_defaults_and_texture_sides() {
        let plan = plan(json!({
            "layers": [{"lines": [
                {"id": "a", "properties": {"textureA": "plaster", "textureB": "none"}},
                {"id": "b", "properties": {"textureA": "plaster", "textureB": "bricks", "height": "250"}},
                {"id": "c", "properties": {"textureA": "none", "thickness": {"length": "bad"}}}
            ]}]
        }));

        let lines = plan.layers()[0].lines();
        assert_eq!(lines["a"].texture(), Some("plaster"));
        assert_eq!(lines["b"].texture(), Some("bricks"));
        assert_eq!(lines["c"].texture(), None);
        assert_approx_eq!(f64, lines["a"].height(), 300.0);
        assert_approx_eq!(f64, lines["b"].height(), 250.0);
        assert_approx_eq!(f64, lines["c"].thickness(), 20.0);
    }

    #[test]
    fn test_hole_offset_clamped_and_defaulted() {
        let plan = plan(json!({
            "layers": [{"holes": [
                {"id": "h1", "line": "w", "offset": 1.4},
                {"id": "h2", "line": "w", "offset": "abc"},
                {"id": "h3", "line": "w", "offset": -0.2, "properties": {"width": {"length": 120}}}
            ]}]
        }));

        let holes = plan.layers()[0].holes();
        assert_approx_eq!(f64, holes["h1"].offset(), 1.0);
        assert_approx_eq!(f64, holes["h2"].offset(), 0.5);
        assert_approx_eq!(f64, holes["h3"].offset(), 0.0);
        assert_approx_eq!(f64, holes["h1"].width(), 90.0);
        assert_approx_eq!(f64, holes["h1"].height(), 210.0);
        assert_approx_eq!(f64, holes["h3"].width(), 120.0);
        assert_eq!(holes["h1"].line(), Some("w"));
    }

    #[test]
    fn test_non_finite_vertex_dropped() {
        let plan = plan(json!({
            "layers": [{"vertices": [
                {"id": "ok", "x": 1, "y": 1},
                {"id": "bad", "x": "far", "y": 1},
                {"id": "missing", "x": 1}
            ]}]
        }));

        let vertices = plan.layers()[0].vertices();
        assert_eq!(vertices.len(), 1);
        assert!(vertices.contains_key("ok"));
    }

    #[test]
    fn test_item_dimension_fallbacks() {
        let plan = plan(json!({
            "layers": [{"items": [
                {"id": "plain", "type": "chair"},
                {"id": "long", "properties": {"length": {"length": 200}}},
                {"id": "wide", "properties": {"width": 150, "height": 90, "color": "#ff0000"}},
                {"id": "flat", "properties": {"width": 0, "patternColor": 0x00ff00}}
            ]}]
        }));

        let items = plan.layers()[0].items();
        assert_approx_eq!(f64, items["plain"].width(), 80.0);
        assert_approx_eq!(f64, items["plain"].depth(), 80.0);
        assert_approx_eq!(f64, items["plain"].height(), 80.0);
        assert_eq!(items["plain"].color(), HexColor::new(0xcfcfcf));

        assert_approx_eq!(f64, items["long"].width(), 200.0);
        assert_approx_eq!(f64, items["long"].depth(), 200.0);

        assert_approx_eq!(f64, items["wide"].depth(), 150.0);
        assert_approx_eq!(f64, items["wide"].height(), 90.0);
        assert_eq!(items["wide"].color(), HexColor::new(0xff0000));

        assert_approx_eq!(f64, items["flat"].width(), 0.0);
        assert_eq!(items["flat"].color(), HexColor::new(0x00ff00));
    }

    #[test]
    fn test_area_color_and_texture() {
        let plan = plan(json!({
            "layers": [{"areas": [
                {"id": "a", "properties": {"patternColor": "#112233", "texture": "oak"}},
                {"id": "b", "properties": {"patternColor": "nope", "texture": "none"}}
            ]}]
        }));

        let areas = plan.layers()[0].areas();
        assert_eq!(areas["a"].color(), HexColor::new(0x112233));
        assert_eq!(areas["a"].texture(), Some("oak"));
        assert_eq!(areas["b"].color(), HexColor::new(0xdcdcdc));
        assert_eq!(areas["b"].texture(), None);
    }

    #[test]
    fn test_layer_visibility_and_altitude() {
        let plan = plan(json!({
            "layers": [
                {"id": "a", "visible": false},
                {"id": "b", "visible": "no", "altitude": "NaN"},
                {"id": "c", "altitude": 300}
            ]
        }));

        let layers = plan.layers();
        assert!(!layers[0].is_visible());
        assert!(layers[1].is_visible());
        assert_approx_eq!(f64, layers[1].altitude(), 0.0);
        assert_approx_eq!(f64, layers[2].altitude(), 300.0);
        assert_eq!(plan.visible_layers().count(), 2);
    }

    #[test]
    fn test_display_name_chain() {
        let plan = plan(json!({
            "layers": [{"items": [
                {"id": "i1", "name": "Sofa", "type": "sofa"},
                {"id": "i2", "type": "sofa"},
                {"id": "i3"}
            ]}]
        }));

        let items = plan.layers()[0].items();
        assert_eq!(items["i1"].display_name(), "Sofa");
        assert_eq!(items["i2"].display_name(), "sofa");
        assert_eq!(items["i3"].display_name(), "i3");
    }

    #[test]
    fn test_used_element_types_skips_hidden_layers() {
        let plan = plan(json!({
            "layers": [
                {"lines": [{"type": "wall"}], "areas": [{"type": "floor"}], "items": [{"type": "sofa"}]},
                {"visible": false, "lines": [{"type": "fence"}]},
                {"lines": [{"type": "wall"}, {"type": "glass"}]}
            ]
        }));

        let types: Vec<_> = plan.used_element_types().into_iter().collect();
        assert_eq!(types, ["wall", "floor", "glass"]);
    }

    #[test]
    fn test_read_rejects_non_object() {
        let err = read("[1, 2, 3]", &ReaderConfig::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E200);

        let err = read("{\"layers\": ", &ReaderConfig::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E101);
    }

    #[test]
    fn test_read_request_envelope() {
        let source = r#"{
            "scene": {"layers": [{"id": "l"}]},
            "texturesByType": {"wall": {"bricks": {"uri": "b.png"}}}
        }"#;
        let request = read_request(source, &ReaderConfig::default()).unwrap();
        assert_eq!(request.plan().layers()[0].id(), "l");
        assert!(request.catalog().get("wall", "bricks").is_some());
    }

    #[test]
    fn test_read_request_bare_scene() {
        let source = r#"{"layers": [{"id": "l"}], "texturesByType": 5}"#;
        let request = read_request(source, &ReaderConfig::default()).unwrap();
        assert_eq!(request.plan().layers().len(), 1);
        assert!(request.catalog().is_empty());

        let err = read_request(r#"{"scene": 3}"#, &ReaderConfig::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::E200);
    }

    #[test]
    fn test_read_catalog_rejects_non_object() {
        let err = read_catalog("\"wall\"").unwrap_err();
        assert_eq!(err.code(), ErrorCode::E201);
    }
}
