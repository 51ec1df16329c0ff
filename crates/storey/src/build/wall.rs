//! Walls: box segments partitioned around their openings.
//!
//! A wall is authored in its own local frame: `x` runs along the wall from
//! `-length/2` (first vertex) to `+length/2` (second vertex), `y` is up from
//! the floor and `z` spans the thickness. The wall group node then places the
//! frame at the wall midpoint with the wall's yaw.
//!
//! ```text
//!   y
//!   ▲      ┌───────┐ lintel
//!   │ seg  ├───────┤          seg
//!   │      │ open  │
//!   │      ├───────┤ sill
//!   └──────┴───────┴──────────────► x
//!  -L/2                          +L/2
//! ```

use std::cmp::Ordering;

use storey_core::{
    color::HexColor,
    geometry::{EPSILON, PlanPoint, Transform},
    mesh::{Mesh, MeshKind, RenderMeta, SurfaceExtent},
    scene::SceneNode,
};
use storey_reader::model::{Element, Hole, Layer, Line};

use super::report::SkipReason;

/// Color of untextured wall segments.
pub const WALL_COLOR: HexColor = HexColor::new(0xd3d3d3);

/// Endpoints and derived placement of a line.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WallFrame {
    start: PlanPoint,
    end: PlanPoint,
    length: f64,
}

impl WallFrame {
    /// Resolves the first two vertices of `line`.
    pub(crate) fn resolve(line: &Line, layer: &Layer) -> Result<Self, SkipReason> {
        let [first, second, ..] = line.vertices() else {
            return Err(SkipReason::TooFewVertices);
        };
        let start = layer.point(first).ok_or(SkipReason::MissingVertex)?;
        let end = layer.point(second).ok_or(SkipReason::MissingVertex)?;

        let length = start.to(end).length();
        if !length.is_finite() || length <= EPSILON {
            return Err(SkipReason::DegenerateWall);
        }

        Ok(Self { start, end, length })
    }

    pub(crate) fn length(&self) -> f64 {
        self.length
    }

    /// Plan position at fraction `t` of the way from the first vertex.
    pub(crate) fn point_at(&self, t: f64) -> PlanPoint {
        self.start.lerp(self.end, t)
    }

    /// Transform placing local `+x` along the wall, origin at plan `origin`.
    pub(crate) fn transform_at(&self, origin: PlanPoint) -> Transform {
        Transform::from_yaw_translation(self.start.yaw_towards(self.end), origin.to_world(0.0))
    }
}

/// An opening clamped to the wall, in wall-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OpeningSpan {
    start: f64,
    end: f64,
    altitude: f64,
    height: f64,
}

impl OpeningSpan {
    fn width(&self) -> f64 {
        self.end - self.start
    }

    fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Clamps openings to a wall of `length × height` and sorts them by start.
///
/// Openings that end up narrower than [`EPSILON`] are dropped.
pub(crate) fn opening_spans<'a>(
    length: f64,
    height: f64,
    holes: impl IntoIterator<Item = &'a Hole>,
) -> Vec<OpeningSpan> {
    let half = length / 2.0;
    let mut spans: Vec<OpeningSpan> = holes
        .into_iter()
        .filter_map(|hole| {
            let center = hole.offset() * length - half;
            let start = (center - hole.width() / 2.0).clamp(-half, half);
            let end = (center + hole.width() / 2.0).clamp(-half, half);
            if !(end - start > EPSILON) {
                return None;
            }
            Some(OpeningSpan {
                start,
                end,
                altitude: hole.altitude().clamp(0.0, height),
                height: hole.height().clamp(0.0, height),
            })
        })
        .collect();

    spans.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(Ordering::Equal));
    spans
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SegmentKind {
    /// Full-height piece between openings.
    Run,
    /// Below an opening.
    Sill,
    /// Above an opening.
    Lintel,
    /// The whole wall, when nothing else was produced.
    Whole,
}

impl SegmentKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Run => "wall-seg",
            Self::Sill => "wall-sill",
            Self::Lintel => "wall-lintel",
            Self::Whole => "wall",
        }
    }
}

/// One box of a wall, centered at `(cx, cy)` in wall-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Segment {
    pub(crate) kind: SegmentKind,
    pub(crate) len: f64,
    pub(crate) cx: f64,
    pub(crate) h: f64,
    pub(crate) cy: f64,
}

/// Partitions a wall left to right around `spans` (sorted by start).
pub(crate) fn segments(length: f64, height: f64, spans: &[OpeningSpan]) -> Vec<Segment> {
    let mut out = Vec::with_capacity(spans.len() * 3 + 1);
    let mut cursor = -length / 2.0;

    let run = |from: f64, len: f64| Segment {
        kind: SegmentKind::Run,
        len,
        cx: from + len / 2.0,
        h: height,
        cy: height / 2.0,
    };

    for span in spans {
        let left = span.start - cursor;
        if left > EPSILON {
            out.push(run(cursor, left));
        }

        if span.altitude > EPSILON {
            out.push(Segment {
                kind: SegmentKind::Sill,
                len: span.width(),
                cx: span.center(),
                h: span.altitude,
                cy: span.altitude / 2.0,
            });
        }

        let top = span.altitude + span.height;
        let above = height - top;
        if above > EPSILON {
            out.push(Segment {
                kind: SegmentKind::Lintel,
                len: span.width(),
                cx: span.center(),
                h: above,
                cy: top + above / 2.0,
            });
        }

        cursor = cursor.max(span.end);
    }

    let right = length / 2.0 - cursor;
    if right > EPSILON {
        out.push(run(cursor, right));
    }

    if out.is_empty() {
        out.push(Segment {
            kind: SegmentKind::Whole,
            len: length,
            cx: 0.0,
            h: height,
            cy: height / 2.0,
        });
    }

    out
}

/// Builds the wall group for `line`: one child per segment.
pub(crate) fn wall_node(line: &Line, layer: &Layer) -> Result<SceneNode, SkipReason> {
    let frame = WallFrame::resolve(line, layer)?;
    let (length, height, thickness) = (frame.length(), line.height(), line.thickness());
    if !(height > EPSILON && thickness > EPSILON) {
        return Err(SkipReason::DegenerateWall);
    }

    let holes = line.holes().iter().filter_map(|id| layer.holes().get(id));
    let spans = opening_spans(length, height, holes);

    let meta = RenderMeta::new(MeshKind::Wall, WALL_COLOR)
        .with_element_type(line.element_type().map(str::to_string))
        .with_texture_key(line.texture().map(str::to_string))
        .with_extent(SurfaceExtent::new(length, height))
        .with_layer_id(Some(layer.id().to_string()));

    let children = segments(length, height, &spans)
        .into_iter()
        .enumerate()
        .map(|(index, segment)| segment_node(index, &segment, length, height, thickness, &meta));

    Ok(SceneNode::group(line.display_name())
        .with_transform(frame.transform_at(frame.point_at(0.5)))
        .with_children(children))
}

fn segment_node(
    index: usize,
    segment: &Segment,
    length: f64,
    height: f64,
    thickness: f64,
    meta: &RenderMeta,
) -> SceneNode {
    let name = format!("{}-{index}", segment.kind.prefix());
    let (cx, cy) = (segment.cx as f32, segment.cy as f32);
    let (length, height) = (length as f32, height as f32);

    let mesh = Mesh::cuboid(
        name,
        [segment.len as f32, segment.h as f32, thickness as f32],
        meta.clone(),
    )
    .with_planar_uvs(|[x, y, _]| [(x + cx) / length + 0.5, (y + cy) / height]);

    SceneNode::leaf(mesh).with_transform(Transform::from_translation(cx, cy, 0.0))
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use storey_reader::{ReaderConfig, read_value};

    fn layer(value: serde_json::Value) -> Layer {
        let plan = read_value(&json!({ "layers": [value] }), &ReaderConfig::default()).unwrap();
        plan.layers()[0].clone()
    }

    fn span(start: f64, end: f64, altitude: f64, height: f64) -> OpeningSpan {
        OpeningSpan {
            start,
            end,
            altitude,
            height,
        }
    }

    #[test]
    fn test_no_openings_single_box() {
        let segs = segments(500.0, 300.0, &[]);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].kind, SegmentKind::Run);
        assert_approx_eq!(f64, segs[0].len, 500.0);
        assert_approx_eq!(f64, segs[0].cx, 0.0);
        assert_approx_eq!(f64, segs[0].h, 300.0);
        assert_approx_eq!(f64, segs[0].cy, 150.0);
    }

    #[test]
    fn test_centered_door() {
        let segs = segments(300.0, 300.0, &[span(-45.0, 45.0, 0.0, 210.0)]);
        let kinds: Vec<_> = segs.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [SegmentKind::Run, SegmentKind::Lintel, SegmentKind::Run]
        );

        assert_approx_eq!(f64, segs[0].len, 105.0);
        assert_approx_eq!(f64, segs[0].cx, -97.5);
        assert_approx_eq!(f64, segs[1].len, 90.0);
        assert_approx_eq!(f64, segs[1].h, 90.0);
        assert_approx_eq!(f64, segs[1].cy, 255.0);
        assert_approx_eq!(f64, segs[2].len, 105.0);
        assert_approx_eq!(f64, segs[2].cx, 97.5);
    }

    #[test]
    fn test_window_has_sill_and_lintel() {
        let segs = segments(400.0, 300.0, &[span(-50.0, 50.0, 90.0, 120.0)]);
        let sill = segs.iter().find(|s| s.kind == SegmentKind::Sill).unwrap();
        let lintel = segs.iter().find(|s| s.kind == SegmentKind::Lintel).unwrap();

        assert_approx_eq!(f64, sill.h, 90.0);
        assert_approx_eq!(f64, sill.cy, 45.0);
        assert_approx_eq!(f64, lintel.h, 90.0);
        assert_approx_eq!(f64, lintel.cy, 255.0);
        assert_eq!(segs.len(), 4);
    }

    #[test]
    fn test_full_size_opening_falls_back_to_whole_wall() {
        let segs = segments(100.0, 300.0, &[span(-50.0, 50.0, 0.0, 300.0)]);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].kind, SegmentKind::Whole);
        assert_approx_eq!(f64, segs[0].len, 100.0);
    }

    #[test]
    fn test_opening_spans_clamp_and_sort() {
        let layer = layer(json!({
            "holes": [
                {"id": "late", "offset": 0.9, "properties": {"width": 100, "height": 400, "altitude": -5}},
                {"id": "early", "offset": 0.1, "properties": {"width": 40}},
                {"id": "thin", "offset": 0.5, "properties": {"width": 0}}
            ]
        }));

        let spans = opening_spans(300.0, 250.0, layer.holes().values());
        assert_eq!(spans.len(), 2);

        assert_approx_eq!(f64, spans[0].start, -140.0);
        assert_approx_eq!(f64, spans[0].end, -100.0);

        // 0.9 * 300 - 150 = 120, so [70, 170] clamps to [70, 150].
        assert_approx_eq!(f64, spans[1].start, 70.0);
        assert_approx_eq!(f64, spans[1].end, 150.0);
        assert_approx_eq!(f64, spans[1].altitude, 0.0);
        assert_approx_eq!(f64, spans[1].height, 250.0);
    }

    #[test]
    fn test_wall_node_structure_and_uvs() {
        let layer = layer(json!({
            "id": "l1",
            "vertices": [{"id": "a", "x": 0, "y": 0}, {"id": "b", "x": 300, "y": 0}],
            "lines": [{"id": "w", "type": "wall", "vertices": ["a", "b"], "holes": ["d"],
                       "properties": {"textureA": "bricks"}}],
            "holes": [{"id": "d", "type": "door", "line": "w", "offset": 0.5,
                       "properties": {"width": 90, "height": 210}}]
        }));

        let node = wall_node(&layer.lines()["w"], &layer).unwrap();
        assert_eq!(node.name(), "wall");
        let names: Vec<_> = node.children().iter().map(|c| c.name()).collect();
        assert_eq!(names, ["wall-seg-0", "wall-lintel-1", "wall-seg-2"]);

        for child in node.children() {
            let mesh = child.mesh().unwrap();
            assert_eq!(mesh.meta().texture_key(), Some("bricks"));
            assert_eq!(mesh.meta().layer_id(), Some("l1"));
            for uv in mesh.uvs().unwrap() {
                assert!((-1e-6..=1.0 + 1e-6).contains(&uv[0]));
                assert!((-1e-6..=1.0 + 1e-6).contains(&uv[1]));
            }
        }

        // Left run's outer face starts the texture at u = 0.
        let left = node.children()[0].mesh().unwrap();
        let min_u = left.uvs().unwrap().iter().map(|uv| uv[0]).fold(f32::MAX, f32::min);
        assert_approx_eq!(f32, min_u, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_wall_node_places_first_vertex_at_local_minus_x() {
        let layer = layer(json!({
            "vertices": [{"id": "a", "x": 100, "y": 100}, {"id": "b", "x": 100, "y": 500}],
            "lines": [{"id": "w", "vertices": ["a", "b"]}]
        }));

        let node = wall_node(&layer.lines()["w"], &layer).unwrap();
        let start = node.transform().transform_point([-200.0, 0.0, 0.0]);
        assert_approx_eq!(f32, start[0], 100.0, epsilon = 1e-3);
        assert_approx_eq!(f32, start[2], -100.0, epsilon = 1e-3);

        let end = node.transform().transform_point([200.0, 0.0, 0.0]);
        assert_approx_eq!(f32, end[0], 100.0, epsilon = 1e-3);
        assert_approx_eq!(f32, end[2], -500.0, epsilon = 1e-3);
    }

    #[test]
    fn test_wall_node_skips() {
        let layer = layer(json!({
            "vertices": [{"id": "a", "x": 0, "y": 0}, {"id": "b", "x": 0, "y": 0}],
            "lines": [
                {"id": "short", "vertices": ["a"]},
                {"id": "dangling", "vertices": ["a", "zz"]},
                {"id": "point", "vertices": ["a", "b"]}
            ]
        }));

        let lines = layer.lines();
        assert_eq!(
            wall_node(&lines["short"], &layer).unwrap_err(),
            SkipReason::TooFewVertices
        );
        assert_eq!(
            wall_node(&lines["dangling"], &layer).unwrap_err(),
            SkipReason::MissingVertex
        );
        assert_eq!(
            wall_node(&lines["point"], &layer).unwrap_err(),
            SkipReason::DegenerateWall
        );
    }

    fn check_partition(
        length: f64,
        height: f64,
        offset: f64,
        width: f64,
        altitude: f64,
        hole_height: f64,
    ) -> Result<(), TestCaseError> {
        let center = offset * length - length / 2.0;
        let spans = [span(
            (center - width / 2.0).clamp(-length / 2.0, length / 2.0),
            (center + width / 2.0).clamp(-length / 2.0, length / 2.0),
            altitude.clamp(0.0, height),
            hole_height.clamp(0.0, height),
        )];
        prop_assume!(spans[0].width() > EPSILON);

        let segs = segments(length, height, &spans);
        prop_assert!(!segs.is_empty() && segs.len() <= 4);

        let runs: Vec<_> = segs.iter().filter(|s| s.kind == SegmentKind::Run).collect();
        let run_total: f64 = runs.iter().map(|s| s.len).sum();
        prop_assert!((run_total - (length - spans[0].width())).abs() < 1e-6 * length.max(1.0));

        // Runs never overlap each other or the opening.
        for s in &runs {
            let (lo, hi) = (s.cx - s.len / 2.0, s.cx + s.len / 2.0);
            prop_assert!(hi <= spans[0].start + 1e-9 || lo >= spans[0].end - 1e-9);
            prop_assert!(lo >= -length / 2.0 - 1e-9 && hi <= length / 2.0 + 1e-9);
        }

        // Sill and lintel stay within the wall height and off the opening.
        for s in segs.iter().filter(|s| matches!(s.kind, SegmentKind::Sill | SegmentKind::Lintel)) {
            let (bottom, top) = (s.cy - s.h / 2.0, s.cy + s.h / 2.0);
            prop_assert!(bottom >= -1e-9 && top <= height + 1e-9);
            let opening_top = spans[0].altitude + spans[0].height;
            prop_assert!(top <= spans[0].altitude + 1e-9 || bottom >= opening_top - 1e-9);
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_single_opening_partition(
            length in 1.0f64..2000.0,
            height in 1.0f64..600.0,
            offset in 0.0f64..=1.0,
            width in 0.0f64..400.0,
            altitude in -50.0f64..300.0,
            hole_height in 0.0f64..400.0,
        ) {
            check_partition(length, height, offset, width, altitude, hole_height)?;
        }
    }
}
