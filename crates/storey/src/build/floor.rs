//! Floors: triangulated area polygons lying on the layer's ground plane.

use storey_core::{
    geometry::{EPSILON, PlanPoint},
    mesh::{Mesh, MeshKind, RenderMeta, SurfaceExtent},
    scene::SceneNode,
};
use storey_reader::model::{Area, Element, Layer};

use super::report::SkipReason;

/// Resolves `ids` to plan points; `None` if any id is unknown.
fn ring(ids: &[String], layer: &Layer) -> Option<Vec<PlanPoint>> {
    ids.iter().map(|id| layer.point(id)).collect()
}

/// Axis-aligned bounds of `points` as `(min, size)`.
fn bounds(points: &[PlanPoint]) -> (PlanPoint, PlanPoint) {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x());
        min_y = min_y.min(p.y());
        max_x = max_x.max(p.x());
        max_y = max_y.max(p.y());
    }
    (
        PlanPoint::new(min_x, min_y),
        PlanPoint::new(max_x - min_x, max_y - min_y),
    )
}

/// Builds the floor mesh of `area`.
///
/// Hole rings come from the areas listed in the area's `holes`; a hole area
/// that cannot be resolved is ignored. UVs map the outer polygon's bounding
/// box onto `[0, 1]²`.
pub(crate) fn floor_node(area: &Area, layer: &Layer) -> Result<SceneNode, SkipReason> {
    let outer = ring(area.vertices(), layer).ok_or(SkipReason::MissingVertex)?;
    if outer.len() < 3 {
        return Err(SkipReason::TooFewVertices);
    }

    let mut points = outer.clone();
    let mut hole_starts = Vec::new();
    for hole_id in area.holes() {
        let Some(hole) = layer.areas().get(hole_id) else {
            continue;
        };
        let Some(mut hole_ring) = ring(hole.vertices(), layer) else {
            continue;
        };
        if hole_ring.len() < 3 {
            continue;
        }
        hole_ring.reverse();
        hole_starts.push(points.len());
        points.extend(hole_ring);
    }

    let flat: Vec<f64> = points.iter().flat_map(|p| [p.x(), p.y()]).collect();
    let triangles = earcutr::earcut(&flat, &hole_starts, 2).map_err(|_| SkipReason::DegenerateFloor)?;
    if triangles.is_empty() {
        return Err(SkipReason::DegenerateFloor);
    }

    let mut indices = Vec::with_capacity(triangles.len());
    for tri in triangles.chunks_exact(3) {
        let (a, b, c) = (points[tri[0]], points[tri[1]], points[tri[2]]);
        let ab = a.to(b);
        let ac = a.to(c);
        let cross = ab.x() * ac.y() - ab.y() * ac.x();
        // Plan counter-clockwise faces world +Y.
        if cross < 0.0 {
            indices.extend([tri[0] as u32, tri[2] as u32, tri[1] as u32]);
        } else {
            indices.extend([tri[0] as u32, tri[1] as u32, tri[2] as u32]);
        }
    }

    let (min, size) = bounds(&outer);
    let (width, depth) = (size.x().max(EPSILON), size.y().max(EPSILON));
    let uvs = points
        .iter()
        .map(|p| {
            [
                ((p.x() - min.x()) / width) as f32,
                ((p.y() - min.y()) / depth) as f32,
            ]
        })
        .collect();
    let positions: Vec<[f32; 3]> = points
        .iter()
        .map(|p| {
            let w = p.to_world(0.0);
            [w.x, w.y, w.z]
        })
        .collect();
    let normals = vec![[0.0, 1.0, 0.0]; positions.len()];

    let meta = RenderMeta::new(MeshKind::Floor, area.color())
        .with_element_type(area.element_type().map(str::to_string))
        .with_texture_key(area.texture().map(str::to_string))
        .with_extent(SurfaceExtent::new(size.x(), size.y()))
        .with_layer_id(Some(layer.id().to_string()));

    let mesh = Mesh::new(area.display_name(), positions, indices, meta)
        .with_normals(normals)
        .with_uvs(uvs);

    Ok(SceneNode::leaf(mesh))
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use storey_reader::{ReaderConfig, read_value};

    /// Y component of `(b - a) × (c - a)`: twice the signed area seen from above.
    fn up(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> f32 {
        let u = [b[0] - a[0], b[2] - a[2]];
        let v = [c[0] - a[0], c[2] - a[2]];
        u[1] * v[0] - u[0] * v[1]
    }

    fn layer(value: serde_json::Value) -> Layer {
        let plan = read_value(&json!({ "layers": [value] }), &ReaderConfig::default()).unwrap();
        plan.layers()[0].clone()
    }

    fn square(winding_cw: bool) -> Layer {
        let ids = if winding_cw {
            json!(["a", "d", "c", "b"])
        } else {
            json!(["a", "b", "c", "d"])
        };
        layer(json!({
            "id": "l",
            "vertices": [
                {"id": "a", "x": 0, "y": 0}, {"id": "b", "x": 400, "y": 0},
                {"id": "c", "x": 400, "y": 200}, {"id": "d", "x": 0, "y": 200}
            ],
            "areas": [{"id": "room", "type": "area", "vertices": ids, "properties": {"texture": "oak"}}]
        }))
    }

    fn face_normals_y(mesh: &Mesh) -> Vec<f32> {
        let p = mesh.positions();
        mesh.indices()
            .chunks_exact(3)
            .map(|t| up(p[t[0] as usize], p[t[1] as usize], p[t[2] as usize]))
            .collect()
    }

    #[test]
    fn test_square_floor() {
        let layer = square(false);
        let node = floor_node(&layer.areas()["room"], &layer).unwrap();
        let mesh = node.mesh().unwrap();

        assert_eq!(node.name(), "area");
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.meta().kind(), MeshKind::Floor);
        assert_eq!(mesh.meta().texture_key(), Some("oak"));

        let extent = mesh.meta().extent().unwrap();
        assert_approx_eq!(f64, extent.u(), 400.0);
        assert_approx_eq!(f64, extent.v(), 200.0);

        for p in mesh.positions() {
            assert_approx_eq!(f32, p[1], 0.0);
            assert!(p[2] <= 0.0);
        }
        assert!(mesh.normals().unwrap().iter().all(|n| *n == [0.0, 1.0, 0.0]));
        assert!(mesh.uvs().unwrap().contains(&[1.0, 1.0]));
    }

    #[test]
    fn test_clockwise_input_still_faces_up() {
        for cw in [false, true] {
            let layer = square(cw);
            let mesh = floor_node(&layer.areas()["room"], &layer).unwrap();
            let mesh = mesh.mesh().unwrap();
            assert!(face_normals_y(mesh).iter().all(|&y| y > 0.0));
        }
    }

    #[test]
    fn test_area_hole_is_cut_out() {
        let layer = layer(json!({
            "vertices": [
                {"id": "a", "x": 0, "y": 0}, {"id": "b", "x": 100, "y": 0},
                {"id": "c", "x": 100, "y": 100}, {"id": "d", "x": 0, "y": 100},
                {"id": "e", "x": 40, "y": 40}, {"id": "f", "x": 60, "y": 40},
                {"id": "g", "x": 60, "y": 60}, {"id": "h", "x": 40, "y": 60}
            ],
            "areas": [
                {"id": "outer", "vertices": ["a", "b", "c", "d"], "holes": ["inner", "ghost"]},
                {"id": "inner", "vertices": ["e", "f", "g", "h"]}
            ]
        }));

        let node = floor_node(&layer.areas()["outer"], &layer).unwrap();
        let mesh = node.mesh().unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 8);

        // Triangulated area is the square minus the hole.
        let p = mesh.positions();
        let area: f32 = mesh
            .indices()
            .chunks_exact(3)
            .map(|t| up(p[t[0] as usize], p[t[1] as usize], p[t[2] as usize]) / 2.0)
            .sum();
        assert_approx_eq!(f32, area, 9600.0, epsilon = 1e-2);
    }

    #[test]
    fn test_floor_skips() {
        let layer = layer(json!({
            "vertices": [
                {"id": "a", "x": 0, "y": 0}, {"id": "b", "x": 100, "y": 0}, {"id": "c", "x": 200, "y": 0}
            ],
            "areas": [
                {"id": "two", "vertices": ["a", "b"]},
                {"id": "dangling", "vertices": ["a", "b", "zz"]},
                {"id": "flat", "vertices": ["a", "b", "c"]}
            ]
        }));

        let areas = layer.areas();
        assert_eq!(
            floor_node(&areas["two"], &layer).unwrap_err(),
            SkipReason::TooFewVertices
        );
        assert_eq!(
            floor_node(&areas["dangling"], &layer).unwrap_err(),
            SkipReason::MissingVertex
        );
        assert_eq!(
            floor_node(&areas["flat"], &layer).unwrap_err(),
            SkipReason::DegenerateFloor
        );
    }

    fn check_star_floor(center: (f64, f64), radii: &[f64]) -> Result<(), TestCaseError> {
        let step = std::f64::consts::TAU / radii.len() as f64;
        let vertices: Vec<_> = radii
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let angle = step * i as f64;
                json!({"id": format!("v{i}"), "x": center.0 + r * angle.cos(), "y": center.1 + r * angle.sin()})
            })
            .collect();
        let ids: Vec<_> = (0..radii.len()).map(|i| format!("v{i}")).collect();
        let layer = layer(json!({
            "vertices": vertices,
            "areas": [{"id": "star", "vertices": ids}]
        }));

        let node = floor_node(&layer.areas()["star"], &layer).unwrap();
        let mesh = node.mesh().unwrap();
        prop_assert!(mesh.triangle_count() > 0);

        let uvs = mesh.uvs().unwrap();
        prop_assert!(uvs.iter().flatten().all(|c| (0.0..=1.0).contains(c)));
        prop_assert!(face_normals_y(mesh).iter().all(|&y| y >= 0.0));
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_star_floor_uvs_in_unit_square(
            cx in -1000.0f64..1000.0,
            cy in -1000.0f64..1000.0,
            radii in prop::collection::vec(10.0f64..500.0, 3..12),
        ) {
            check_star_floor((cx, cy), &radii)?;
        }
    }
}
