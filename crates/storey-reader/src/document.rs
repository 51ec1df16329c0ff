//! Conversion of a raw JSON floor-plan document into the typed model.

use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::{Map, Value};

use storey_core::geometry::PlanPoint;

use crate::{
    coerce,
    config::ReaderConfig,
    model::{Area, FloorPlan, Hole, Item, Layer, Line, Vertex},
};

/// Hole offset used when the document's offset is not a finite number.
const CENTERED_OFFSET: f64 = 0.5;

pub(crate) fn floor_plan(document: &Map<String, Value>, config: &ReaderConfig) -> FloorPlan {
    let layers = coerce::entries(document.get("layers"))
        .into_iter()
        .filter_map(|(key, value)| match value.as_object() {
            Some(layer) => Some(read_layer(&key, layer, config)),
            None => {
                warn!(layer = key.as_str(); "Skipping layer that is not an object");
                None
            }
        })
        .collect();

    FloorPlan { layers }
}

/// Builds an id → entity map from a map-or-list collection.
///
/// Entries that are not objects are dropped; an entry's own `id` wins over
/// its key. On duplicate ids the first entry is kept.
fn collect<T>(
    value: Option<&Value>,
    what: &'static str,
    mut read: impl FnMut(String, &Map<String, Value>) -> Option<T>,
) -> IndexMap<String, T> {
    let mut out = IndexMap::new();
    for (key, entry) in coerce::entries(value) {
        let Some(object) = entry.as_object() else {
            warn!(kind = what, key = key.as_str(); "Skipping entry that is not an object");
            continue;
        };
        let id = object.get("id").and_then(coerce::id).unwrap_or(key);
        if out.contains_key(&id) {
            warn!(kind = what, id = id.as_str(); "Skipping entry with duplicate id");
            continue;
        }
        if let Some(entity) = read(id.clone(), object) {
            out.insert(id, entity);
        }
    }
    out
}

fn read_layer(key: &str, layer: &Map<String, Value>, config: &ReaderConfig) -> Layer {
    let id = layer
        .get("id")
        .and_then(coerce::id)
        .unwrap_or_else(|| key.to_string());
    let altitude = layer.get("altitude").and_then(coerce::number).unwrap_or(0.0);
    let visible = layer.get("visible").and_then(Value::as_bool) != Some(false);

    let vertices = collect(layer.get("vertices"), "vertex", read_vertex);
    let lines = collect(layer.get("lines"), "line", |id, line| {
        Some(read_line(id, line, config))
    });
    let holes = collect(layer.get("holes"), "hole", |id, hole| {
        Some(read_hole(id, hole, config))
    });
    let areas = collect(layer.get("areas"), "area", |id, area| {
        Some(read_area(id, area, config))
    });
    let items = collect(layer.get("items"), "item", |id, item| {
        Some(read_item(id, item, config))
    });

    debug!(
        layer = id.as_str(),
        vertices = vertices.len(),
        lines = lines.len(),
        holes = holes.len(),
        areas = areas.len(),
        items = items.len();
        "Read layer"
    );

    Layer {
        id,
        altitude,
        visible,
        vertices,
        lines,
        holes,
        areas,
        items,
    }
}

fn read_vertex(id: String, vertex: &Map<String, Value>) -> Option<Vertex> {
    let x = vertex.get("x").and_then(coerce::number);
    let y = vertex.get("y").and_then(coerce::number);
    match (x, y) {
        (Some(x), Some(y)) => Some(Vertex {
            id,
            point: PlanPoint::new(x, y),
        }),
        _ => {
            warn!(vertex = id.as_str(); "Dropping vertex with non-finite coordinates");
            None
        }
    }
}

fn read_line(id: String, line: &Map<String, Value>, config: &ReaderConfig) -> Line {
    let texture = ["textureB", "textureA"]
        .into_iter()
        .find_map(|side| coerce::property(line, side).and_then(coerce::texture_name));

    Line {
        element_type: coerce::text(line, "type"),
        name: coerce::text(line, "name"),
        vertices: coerce::id_list(line.get("vertices")),
        holes: coerce::id_list(line.get("holes")),
        height: coerce::number_property(line, "height").unwrap_or(config.wall_height()),
        thickness: coerce::number_property(line, "thickness").unwrap_or(config.wall_thickness()),
        texture,
        id,
    }
}

fn read_hole(id: String, hole: &Map<String, Value>, config: &ReaderConfig) -> Hole {
    let offset = hole
        .get("offset")
        .and_then(coerce::number)
        .map_or(CENTERED_OFFSET, |offset| offset.clamp(0.0, 1.0));

    Hole {
        element_type: coerce::text(hole, "type"),
        name: coerce::text(hole, "name"),
        line: hole.get("line").and_then(coerce::id),
        offset,
        width: coerce::number_property(hole, "width").unwrap_or(config.hole_width()),
        height: coerce::number_property(hole, "height").unwrap_or(config.hole_height()),
        altitude: coerce::number_property(hole, "altitude").unwrap_or(config.hole_altitude()),
        id,
    }
}

fn read_area(id: String, area: &Map<String, Value>, config: &ReaderConfig) -> Area {
    Area {
        element_type: coerce::text(area, "type"),
        name: coerce::text(area, "name"),
        vertices: coerce::id_list(area.get("vertices")),
        holes: coerce::id_list(area.get("holes")),
        color: coerce::property(area, "patternColor")
            .and_then(coerce::color)
            .unwrap_or(config.floor_color()),
        texture: coerce::property(area, "texture").and_then(coerce::texture_name),
        id,
    }
}

fn read_item(id: String, item: &Map<String, Value>, config: &ReaderConfig) -> Item {
    let explicit_width = coerce::number_property(item, "width")
        .or_else(|| coerce::number_property(item, "length"));
    let width = explicit_width.unwrap_or(config.item_width());
    let depth = coerce::number_property(item, "depth")
        .or(explicit_width)
        .unwrap_or(config.item_depth());

    let color = ["color", "patternColor"]
        .into_iter()
        .find_map(|key| coerce::property(item, key).and_then(coerce::color))
        .unwrap_or(config.item_color());

    Item {
        element_type: coerce::text(item, "type"),
        name: coerce::text(item, "name"),
        position: PlanPoint::new(
            item.get("x").and_then(coerce::number).unwrap_or(0.0),
            item.get("y").and_then(coerce::number).unwrap_or(0.0),
        ),
        rotation: item.get("rotation").and_then(coerce::number).unwrap_or(0.0),
        width,
        depth,
        height: coerce::number_property(item, "height").unwrap_or(config.item_height()),
        altitude: coerce::number_property(item, "altitude").unwrap_or(config.item_altitude()),
        color,
        id,
    }
}
