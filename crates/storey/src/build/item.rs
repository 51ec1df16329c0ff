//! Furniture items, approximated by oriented boxes.

use storey_core::{
    geometry::{EPSILON, Transform},
    mesh::{Mesh, MeshKind, RenderMeta, SurfaceExtent},
    scene::SceneNode,
};
use storey_reader::model::{Element, Item, Layer};

use super::report::SkipReason;

pub(crate) fn item_node(item: &Item, layer: &Layer) -> Result<SceneNode, SkipReason> {
    let size = [item.width(), item.height(), item.depth()];
    if !size.iter().all(|&d| d > EPSILON) {
        return Err(SkipReason::NonPositiveDimensions);
    }

    let meta = RenderMeta::new(MeshKind::Item, item.color())
        .with_element_type(item.element_type().map(str::to_string))
        .with_extent(SurfaceExtent::new(item.width(), item.height()))
        .with_layer_id(Some(layer.id().to_string()));

    let name = item.display_name();
    let mesh = Mesh::cuboid(name, size.map(|d| d as f32), meta);
    let center_y = (item.altitude() + item.height() / 2.0) as f32;

    let pivot = Transform::from_yaw_translation(
        item.rotation().to_radians(),
        item.position().to_world(0.0),
    );

    Ok(SceneNode::group(format!("{name}-pivot"))
        .with_transform(pivot)
        .with_child(
            SceneNode::leaf(mesh).with_transform(Transform::from_translation(0.0, center_y, 0.0)),
        ))
}
