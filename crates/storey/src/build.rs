//! Floor plan → scene graph.
//!
//! # Overview
//!
//! [`build_scene`] turns every visible layer of a [`FloorPlan`] into a layer
//! group under a single root:
//!
//! ```text
//! planner-model
//! └── layer-<id>            translated to the layer altitude
//!     ├── <area>            floor mesh
//!     ├── <line>            wall group
//!     │   ├── wall-seg-0
//!     │   ├── wall-lintel-1
//!     │   └── ...
//!     ├── <hole>-group      opening fill, on its wall
//!     │   └── <hole>
//!     └── <item>-pivot      item position and rotation
//!         └── <item>
//! ```
//!
//! Elements that cannot be built are left out with a warning and counted in
//! the [`BuildReport`]; the build itself never fails.

mod floor;
mod item;
mod opening;
mod report;
mod wall;

pub use opening::HOLE_COLOR;
pub use report::{BuildReport, SkipReason};
pub use wall::WALL_COLOR;

use log::{debug, info, warn};
use rayon::prelude::*;

use storey_core::{
    geometry::Transform,
    scene::{Scene, SceneNode},
};
use storey_reader::{
    FloorPlan,
    model::{Element, Layer},
};

/// Name of the scene's root node.
pub const ROOT_NAME: &str = "planner-model";

type BuildResult = Result<SceneNode, SkipReason>;

/// Builds the scene for every visible layer of `plan`.
///
/// With `parallel` set, the elements of each layer are built on the rayon
/// thread pool. Node order is the document order either way.
///
/// # Examples
///
/// ```
/// # use storey::build::build_scene;
/// # use storey_reader::{read, ReaderConfig};
/// let plan = read(
///     r#"{"layers": {"l0": {"vertices": {"a": {"x": 0, "y": 0}, "b": {"x": 300, "y": 0}},
///                           "lines": {"w": {"vertices": ["a", "b"]}}}}}"#,
///     &ReaderConfig::default(),
/// )
/// .unwrap();
///
/// let (scene, report) = build_scene(&plan, false);
/// assert_eq!(scene.root().name(), "planner-model");
/// assert_eq!(report.meshes(), 1);
/// ```
pub fn build_scene(plan: &FloorPlan, parallel: bool) -> (Scene, BuildReport) {
    let mut report = BuildReport::default();
    let mut root = SceneNode::group(ROOT_NAME);

    for layer in plan.visible_layers() {
        let node = build_layer(layer, parallel, &mut report);
        report.record_layer();
        root.push_child(node);
    }

    let scene = Scene::new(root);
    report.record_meshes(scene.mesh_count());
    info!(
        layers = report.layers(),
        meshes = report.meshes(),
        skipped = report.total_skipped();
        "Scene built"
    );

    (scene, report)
}

fn build_layer(layer: &Layer, parallel: bool, report: &mut BuildReport) -> SceneNode {
    debug!(layer = layer.id(), altitude = layer.altitude(); "Building layer");

    let floors = build_all(layer.areas().values(), parallel, |area| {
        floor::floor_node(area, layer)
    });
    let walls = build_all(layer.lines().values(), parallel, |line| {
        wall::wall_node(line, layer)
    });
    let openings = build_all(layer.holes().values(), parallel, |hole| {
        opening::opening_node(hole, layer)
    });
    let items = build_all(layer.items().values(), parallel, |item| {
        item::item_node(item, layer)
    });

    let mut node = SceneNode::group(format!("layer-{}", layer.id())).with_transform(
        Transform::from_translation(0.0, layer.altitude() as f32, 0.0),
    );

    for (kind, results) in [
        ("area", floors),
        ("line", walls),
        ("hole", openings),
        ("item", items),
    ] {
        for (id, result) in results {
            match result {
                Ok(child) => node.push_child(child),
                Err(reason) => {
                    warn!(
                        layer = layer.id(),
                        kind = kind,
                        id = id,
                        reason = reason.as_str();
                        "Skipping element"
                    );
                    report.record_skip(reason);
                }
            }
        }
    }

    node
}

/// Runs `build` over `elements`, keeping their order.
fn build_all<'a, T, I, F>(elements: I, parallel: bool, build: F) -> Vec<(&'a str, BuildResult)>
where
    T: Element + Sync + 'a,
    I: Iterator<Item = &'a T>,
    F: Fn(&T) -> BuildResult + Sync,
{
    let elements: Vec<&T> = elements.collect();
    if parallel {
        elements
            .into_par_iter()
            .map(|element| (element.id(), build(element)))
            .collect()
    } else {
        elements
            .into_iter()
            .map(|element| (element.id(), build(element)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use serde_json::json;

    use super::*;
    use storey_reader::{ReaderConfig, read_value};

    fn plan(value: serde_json::Value) -> FloorPlan {
        read_value(&value, &ReaderConfig::default()).unwrap()
    }

    fn two_storey() -> FloorPlan {
        plan(json!({
            "layers": {
                "ground": {
                    "vertices": {
                        "a": {"x": 0, "y": 0}, "b": {"x": 400, "y": 0},
                        "c": {"x": 400, "y": 300}, "d": {"x": 0, "y": 300}
                    },
                    "lines": {
                        "w1": {"type": "wall", "vertices": ["a", "b"], "holes": ["door"]},
                        "broken": {"vertices": ["a"]}
                    },
                    "holes": {"door": {"type": "door", "line": "w1", "offset": 0.5}},
                    "areas": {"room": {"type": "area", "vertices": ["a", "b", "c", "d"]}},
                    "items": {"bed": {"type": "bed", "x": 100, "y": 100}}
                },
                "upper": {"altitude": 300, "vertices": {}},
                "hidden": {"visible": false, "items": {"lamp": {}}}
            }
        }))
    }

    #[test]
    fn test_scene_structure() {
        let (scene, report) = build_scene(&two_storey(), false);
        let root = scene.root();
        assert_eq!(root.name(), ROOT_NAME);

        let layers: Vec<_> = root.children().iter().map(SceneNode::name).collect();
        assert_eq!(layers, ["layer-ground", "layer-upper"]);

        let ground: Vec<_> = root.children()[0]
            .children()
            .iter()
            .map(SceneNode::name)
            .collect();
        assert_eq!(ground, ["area", "wall", "door-group", "bed-pivot"]);

        let upper = root.children()[1].transform().transform_point([0.0; 3]);
        assert_approx_eq!(f32, upper[1], 300.0);

        assert_eq!(report.layers(), 2);
        assert_eq!(report.skipped(SkipReason::TooFewVertices), 1);
        assert_eq!(report.total_skipped(), 1);
        // Floor, three wall segments, door fill, bed.
        assert_eq!(report.meshes(), 6);
        assert_eq!(scene.mesh_count(), 6);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let plan = two_storey();
        let (sequential, seq_report) = build_scene(&plan, false);
        let (parallel, par_report) = build_scene(&plan, true);
        assert_eq!(sequential, parallel);
        assert_eq!(seq_report, par_report);
    }

    #[test]
    fn test_empty_plan() {
        let (scene, report) = build_scene(&FloorPlan::default(), true);
        assert!(scene.root().children().is_empty());
        assert_eq!(report.meshes(), 0);
    }
}
