//! Lenient conversions from raw JSON values.
//!
//! Floor-plan editors are inconsistent about how they encode the same
//! property: a length may be `120`, `"120"` or `{ "length": 120, "unit": "cm" }`,
//! a collection may be a list or a keyed object. These helpers accept all of
//! them and return `None` for anything unusable so callers can pick their
//! fallback.

use serde_json::{Map, Value};

use storey_core::color::HexColor;

/// Reads a finite number from a bare number, a numeric string or an object
/// carrying a `length` field.
pub(crate) fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Object(map) => return map.get("length").and_then(number),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Looks up `name` under the element's `properties` object first, then on
/// the element itself.
pub(crate) fn property<'a>(element: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    element
        .get("properties")
        .and_then(Value::as_object)
        .and_then(|props| props.get(name))
        .filter(|v| !v.is_null())
        .or_else(|| element.get(name).filter(|v| !v.is_null()))
}

/// Numeric property via [`property`] and [`number`].
pub(crate) fn number_property(element: &Map<String, Value>, name: &str) -> Option<f64> {
    property(element, name).and_then(number)
}

/// Normalizes an id that may be a string or a number.
pub(crate) fn id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A non-empty string field.
pub(crate) fn text(element: &Map<String, Value>, name: &str) -> Option<String> {
    element
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A texture selection: any string except the editor's `"none"` sentinel.
pub(crate) fn texture_name(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty() && *s != "none")
        .map(str::to_string)
}

/// A packed `0xRRGGBB` number or a `#rrggbb` string.
pub(crate) fn color(value: &Value) -> Option<HexColor> {
    match value {
        Value::Number(n) => n.as_f64().and_then(HexColor::from_number),
        Value::String(s) => HexColor::parse(s),
        _ => None,
    }
}

/// A list of ids; anything that is not a list yields an empty one and
/// entries that are not ids are dropped.
pub(crate) fn id_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(id).collect(),
        _ => Vec::new(),
    }
}

/// Flattens a list or a keyed object into `(key, entry)` pairs in document
/// order. List entries are keyed by their position.
pub(crate) fn entries(value: Option<&Value>) -> Vec<(String, &Value)> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        _ => Vec::new(),
    }
}
