//! Openings: a flat box filling each door or window cut into a wall.

use storey_core::{
    color::HexColor,
    geometry::{EPSILON, Transform},
    mesh::{Mesh, MeshKind, RenderMeta, SurfaceExtent},
    scene::SceneNode,
};
use storey_reader::model::{Element, Hole, Layer};

use super::{report::SkipReason, wall::WallFrame};

/// Color of opening fills.
pub const HOLE_COLOR: HexColor = HexColor::new(0xb0b0b0);

/// Builds `<name>-group`, placed on the owning wall at the hole's offset and
/// turned with it, holding one box as thick as the wall.
pub(crate) fn opening_node(hole: &Hole, layer: &Layer) -> Result<SceneNode, SkipReason> {
    let line = hole
        .line()
        .and_then(|id| layer.lines().get(id))
        .ok_or(SkipReason::MissingLine)?;
    let frame = WallFrame::resolve(line, layer)?;

    let (width, height) = (hole.width(), hole.height());
    if !(width > EPSILON && height > EPSILON && line.thickness() > EPSILON) {
        return Err(SkipReason::NonPositiveDimensions);
    }

    let meta = RenderMeta::new(MeshKind::Hole, HOLE_COLOR)
        .with_element_type(hole.element_type().map(str::to_string))
        .with_extent(SurfaceExtent::new(width, height))
        .with_layer_id(Some(layer.id().to_string()));

    let name = hole.display_name();
    let mesh = Mesh::cuboid(
        name,
        [width as f32, height as f32, line.thickness() as f32],
        meta,
    );
    let center_y = (hole.altitude() + height / 2.0) as f32;

    Ok(SceneNode::group(format!("{name}-group"))
        .with_transform(frame.transform_at(frame.point_at(hole.offset())))
        .with_child(SceneNode::leaf(mesh).with_transform(Transform::from_translation(
            0.0, center_y, 0.0,
        ))))
}
