//! glTF document assembly and GLB framing.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use gltf_json as gj;
use gj::validation::{Checked, USize64};

use super::{Error, prepare::PreparedMesh};
use crate::resolve::{Material, Texture};

const GLB_MAGIC: u32 = 0x4654_6C67;
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

// =============================================================================
// Export context
// =============================================================================

/// Accumulates one glTF document and its single binary buffer.
///
/// Materials and textures are deduplicated by [`Arc`] identity; the resolver
/// already guarantees that equal resources share one allocation.
pub(super) struct ExportContext {
    root: gj::Root,
    buffer_data: Vec<u8>,
    material_map: HashMap<*const Material, u32>,
    texture_map: HashMap<*const Texture, u32>,
    sampler: Option<u32>,
    scene_nodes: Vec<gj::Index<gj::Node>>,
}

impl ExportContext {
    pub(super) fn new() -> Self {
        Self {
            root: gj::Root::default(),
            buffer_data: Vec::new(),
            material_map: HashMap::new(),
            texture_map: HashMap::new(),
            sampler: None,
            scene_nodes: Vec::new(),
        }
    }

    /// Emits one mesh, its primitive and a root node referencing it.
    pub(super) fn push_mesh(&mut self, prepared: &PreparedMesh) {
        let mesh = &prepared.mesh;
        let material = self.material_index(&prepared.material);

        let mut attributes = BTreeMap::new();

        let positions = mesh.positions();
        let (min, max) = position_bounds(positions);
        let view = self.push_buffer_view(&flatten(positions), Some(gj::buffer::Target::ArrayBuffer));
        let accessor = self.push_accessor(
            view,
            positions.len(),
            gj::accessor::ComponentType::F32,
            gj::accessor::Type::Vec3,
            Some(json_f32_array(&min)),
            Some(json_f32_array(&max)),
        );
        attributes.insert(Checked::Valid(gj::mesh::Semantic::Positions), accessor);

        if let Some(normals) = mesh.normals() {
            let accessor = self.push_vertex_attribute(&flatten(normals), normals.len(), gj::accessor::Type::Vec3);
            attributes.insert(Checked::Valid(gj::mesh::Semantic::Normals), accessor);
        }
        if let Some(uvs) = mesh.uvs() {
            let accessor = self.push_vertex_attribute(&flatten(uvs), uvs.len(), gj::accessor::Type::Vec2);
            attributes.insert(Checked::Valid(gj::mesh::Semantic::TexCoords(0)), accessor);
        }
        if let Some(tangents) = mesh.tangents() {
            let accessor = self.push_vertex_attribute(&flatten(tangents), tangents.len(), gj::accessor::Type::Vec4);
            attributes.insert(Checked::Valid(gj::mesh::Semantic::Tangents), accessor);
        }

        let index_bytes: Vec<u8> = mesh.indices().iter().flat_map(|i| i.to_le_bytes()).collect();
        let view = self.push_buffer_view(&index_bytes, Some(gj::buffer::Target::ElementArrayBuffer));
        let indices = self.push_accessor(
            view,
            mesh.indices().len(),
            gj::accessor::ComponentType::U32,
            gj::accessor::Type::Scalar,
            None,
            None,
        );

        let primitive = gj::mesh::Primitive {
            attributes,
            extensions: None,
            extras: gj::Extras::default(),
            indices: Some(indices),
            material: Some(gj::Index::new(material)),
            mode: Checked::Valid(gj::mesh::Mode::Triangles),
            targets: None,
        };

        let mesh_index = self.root.meshes.len() as u32;
        self.root.meshes.push(gj::Mesh {
            name: Some(mesh.name().to_string()),
            primitives: vec![primitive],
            weights: None,
            extensions: None,
            extras: gj::Extras::default(),
        });

        let node_index = self.root.nodes.len() as u32;
        self.root.nodes.push(gj::Node {
            name: Some(mesh.name().to_string()),
            mesh: Some(gj::Index::new(mesh_index)),
            ..gj::Node::default()
        });
        self.scene_nodes.push(gj::Index::new(node_index));
    }

    /// Writes the buffer, scene and asset entries and frames the result.
    pub(super) fn finish(mut self, scene_name: &str, generator: &str) -> Result<Vec<u8>, Error> {
        self.align_buffer();
        if !self.buffer_data.is_empty() {
            self.root.buffers.push(gj::Buffer {
                byte_length: USize64(self.buffer_data.len() as u64),
                name: None,
                uri: None,
                extensions: None,
                extras: gj::Extras::default(),
            });
        }

        self.root.scenes.push(gj::Scene {
            name: Some(scene_name.to_string()),
            nodes: std::mem::take(&mut self.scene_nodes),
            extensions: None,
            extras: gj::Extras::default(),
        });
        self.root.scene = Some(gj::Index::new(0));
        self.root.asset = gj::Asset {
            generator: Some(generator.to_string()),
            version: "2.0".into(),
            ..Default::default()
        };

        self.to_glb()
    }

    // -- Materials and textures -------------------------------------------------

    fn material_index(&mut self, material: &Arc<Material>) -> u32 {
        if let Some(&index) = self.material_map.get(&Arc::as_ptr(material)) {
            return index;
        }

        let base_color_texture = material.base_texture().map(|texture| gj::texture::Info {
            index: gj::Index::new(self.texture_index(texture)),
            tex_coord: 0,
            extensions: None,
            extras: gj::Extras::default(),
        });
        let normal_texture = material.normal_map().map(|normal| gj::material::NormalTexture {
            index: gj::Index::new(self.texture_index(normal.texture())),
            scale: normal.scale(),
            tex_coord: 0,
            extensions: None,
            extras: gj::Extras::default(),
        });

        let pbr = gj::material::PbrMetallicRoughness {
            base_color_factor: gj::material::PbrBaseColorFactor(material.base_color()),
            base_color_texture,
            metallic_factor: gj::material::StrengthFactor(0.0),
            roughness_factor: gj::material::StrengthFactor(1.0),
            metallic_roughness_texture: None,
            extensions: None,
            extras: gj::Extras::default(),
        };

        let index = self.root.materials.len() as u32;
        self.root.materials.push(gj::Material {
            name: Some(material.name().to_string()),
            alpha_cutoff: None,
            alpha_mode: Checked::Valid(gj::material::AlphaMode::Opaque),
            double_sided: material.double_sided(),
            pbr_metallic_roughness: pbr,
            normal_texture,
            occlusion_texture: None,
            emissive_texture: None,
            emissive_factor: gj::material::EmissiveFactor([0.0, 0.0, 0.0]),
            extensions: None,
            extras: gj::Extras::default(),
        });
        self.material_map.insert(Arc::as_ptr(material), index);
        index
    }

    fn texture_index(&mut self, texture: &Arc<Texture>) -> u32 {
        if let Some(&index) = self.texture_map.get(&Arc::as_ptr(texture)) {
            return index;
        }

        let view = self.push_buffer_view(texture.bytes(), None);
        let image = self.root.images.len() as u32;
        self.root.images.push(gj::Image {
            buffer_view: Some(gj::Index::new(view)),
            mime_type: Some(gj::image::MimeType(texture.mime_type().to_string())),
            name: texture.name().map(str::to_string),
            uri: None,
            extensions: None,
            extras: gj::Extras::default(),
        });

        let sampler = self.sampler_index();
        let index = self.root.textures.len() as u32;
        self.root.textures.push(gj::Texture {
            name: texture.name().map(str::to_string),
            sampler: Some(gj::Index::new(sampler)),
            source: gj::Index::new(image),
            extensions: None,
            extras: gj::Extras::default(),
        });
        self.texture_map.insert(Arc::as_ptr(texture), index);
        index
    }

    /// The single repeating, trilinear sampler shared by every texture.
    fn sampler_index(&mut self) -> u32 {
        if let Some(index) = self.sampler {
            return index;
        }
        let index = self.root.samplers.len() as u32;
        self.root.samplers.push(gj::texture::Sampler {
            mag_filter: Some(Checked::Valid(gj::texture::MagFilter::Linear)),
            min_filter: Some(Checked::Valid(gj::texture::MinFilter::LinearMipmapLinear)),
            wrap_s: Checked::Valid(gj::texture::WrappingMode::Repeat),
            wrap_t: Checked::Valid(gj::texture::WrappingMode::Repeat),
            name: None,
            extensions: None,
            extras: gj::Extras::default(),
        });
        self.sampler = Some(index);
        index
    }

    // -- Buffer/accessor helpers ------------------------------------------------

    fn align_buffer(&mut self) {
        let padding = (4 - (self.buffer_data.len() % 4)) % 4;
        self.buffer_data.extend(std::iter::repeat_n(0u8, padding));
    }

    fn push_buffer_view(&mut self, data: &[u8], target: Option<gj::buffer::Target>) -> u32 {
        self.align_buffer();
        let offset = self.buffer_data.len();
        self.buffer_data.extend_from_slice(data);

        let view_idx = self.root.buffer_views.len() as u32;
        self.root.buffer_views.push(gj::buffer::View {
            buffer: gj::Index::new(0),
            byte_offset: Some(USize64(offset as u64)),
            byte_length: USize64(data.len() as u64),
            byte_stride: None,
            target: target.map(Checked::Valid),
            name: None,
            extensions: None,
            extras: gj::Extras::default(),
        });

        view_idx
    }

    fn push_vertex_attribute(
        &mut self,
        data: &[u8],
        count: usize,
        type_: gj::accessor::Type,
    ) -> gj::Index<gj::Accessor> {
        let view = self.push_buffer_view(data, Some(gj::buffer::Target::ArrayBuffer));
        self.push_accessor(view, count, gj::accessor::ComponentType::F32, type_, None, None)
    }

    fn push_accessor(
        &mut self,
        buffer_view: u32,
        count: usize,
        component_type: gj::accessor::ComponentType,
        type_: gj::accessor::Type,
        min: Option<gj::Value>,
        max: Option<gj::Value>,
    ) -> gj::Index<gj::Accessor> {
        let acc_idx = self.root.accessors.len() as u32;
        self.root.accessors.push(gj::Accessor {
            buffer_view: Some(gj::Index::new(buffer_view)),
            byte_offset: Some(USize64(0)),
            count: USize64(count as u64),
            component_type: Checked::Valid(gj::accessor::GenericComponentType(component_type)),
            type_: Checked::Valid(type_),
            min,
            max,
            normalized: false,
            name: None,
            sparse: None,
            extensions: None,
            extras: gj::Extras::default(),
        });
        gj::Index::new(acc_idx)
    }

    // -- GLB assembly -----------------------------------------------------------

    fn to_glb(&self) -> Result<Vec<u8>, Error> {
        let json_bytes = self.root.to_vec()?;

        let json_pad = (4 - (json_bytes.len() % 4)) % 4;
        let json_chunk_len = json_bytes.len() + json_pad;

        let bin_pad = (4 - (self.buffer_data.len() % 4)) % 4;
        let bin_chunk_len = self.buffer_data.len() + bin_pad;

        let has_bin = !self.buffer_data.is_empty();
        let total_length = 12 + 8 + json_chunk_len + if has_bin { 8 + bin_chunk_len } else { 0 };
        let total_u32 =
            u32::try_from(total_length).map_err(|_| Error::Oversized { bytes: total_length })?;

        let mut glb = Vec::with_capacity(total_length);

        // Header
        glb.extend_from_slice(&GLB_MAGIC.to_le_bytes());
        glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
        glb.extend_from_slice(&total_u32.to_le_bytes());

        // JSON chunk
        glb.extend_from_slice(&(json_chunk_len as u32).to_le_bytes());
        glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
        glb.extend_from_slice(&json_bytes);
        glb.extend(std::iter::repeat_n(b' ', json_pad));

        // BIN chunk
        if has_bin {
            glb.extend_from_slice(&(bin_chunk_len as u32).to_le_bytes());
            glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
            glb.extend_from_slice(&self.buffer_data);
            glb.extend(std::iter::repeat_n(0u8, bin_pad));
        }

        Ok(glb)
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Little-endian bytes of a slice of float vectors.
fn flatten<const N: usize>(values: &[[f32; N]]) -> Vec<u8> {
    values
        .iter()
        .flatten()
        .flat_map(|v| v.to_le_bytes())
        .collect()
}

/// Build a JSON array of f32 values (for accessor min/max).
fn json_f32_array(values: &[f32]) -> gj::Value {
    gj::Value::Array(values.iter().map(|&v| gj::Value::from(v as f64)).collect())
}

fn position_bounds(positions: &[[f32; 3]]) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for p in positions {
        for c in 0..3 {
            min[c] = min[c].min(p[c]);
            max[c] = max[c].max(p[c]);
        }
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use storey_core::{
        color::HexColor,
        mesh::{Mesh, MeshKind, RenderMeta},
    };

    use super::*;
    use crate::resolve::MaterialKey;

    fn read_u32(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
    }

    fn prepared(name: &str, material: &Arc<Material>) -> PreparedMesh {
        let meta = RenderMeta::new(MeshKind::Item, HexColor::new(0xcfcfcf));
        PreparedMesh {
            mesh: Mesh::cuboid(name, [1.0, 2.0, 3.0], meta),
            material: Arc::clone(material),
        }
    }

    fn material() -> Arc<Material> {
        let key = MaterialKey::new(MeshKind::Item, None, None, None, [1.0; 4]);
        Arc::new(Material::new(key, [1.0; 4], None, None))
    }

    #[test]
    fn test_glb_framing() {
        let mut context = ExportContext::new();
        context.push_mesh(&prepared("a", &material()));
        let glb = context.finish("root", "test").unwrap();

        assert_eq!(read_u32(&glb, 0), GLB_MAGIC);
        assert_eq!(read_u32(&glb, 4), 2);
        assert_eq!(read_u32(&glb, 8) as usize, glb.len());
        assert_eq!(glb.len() % 4, 0);

        let json_len = read_u32(&glb, 12) as usize;
        assert_eq!(read_u32(&glb, 16), CHUNK_JSON);
        assert_eq!(json_len % 4, 0);
        let json: serde_json::Value = serde_json::from_slice(&glb[20..20 + json_len]).unwrap();
        assert_eq!(json["asset"]["version"], "2.0");
        assert_eq!(json["asset"]["generator"], "test");

        let bin_offset = 20 + json_len;
        assert_eq!(read_u32(&glb, bin_offset + 4), CHUNK_BIN);
        assert_eq!(read_u32(&glb, bin_offset) as usize, glb.len() - bin_offset - 8);
    }

    #[test]
    fn test_shared_material_emitted_once() {
        let shared = material();
        let mut context = ExportContext::new();
        context.push_mesh(&prepared("a", &shared));
        context.push_mesh(&prepared("b", &shared));
        context.push_mesh(&prepared("c", &material()));

        assert_eq!(context.root.materials.len(), 2);
        assert_eq!(context.root.meshes.len(), 3);
        assert_eq!(context.scene_nodes.len(), 3);
        // Position, normal, uv and index accessors per mesh.
        assert_eq!(context.root.accessors.len(), 12);
    }

    #[test]
    fn test_position_bounds() {
        let (min, max) = position_bounds(&[[1.0, -2.0, 3.0], [-1.0, 5.0, 0.0]]);
        assert_eq!(min, [-1.0, -2.0, 0.0]);
        assert_eq!(max, [1.0, 5.0, 3.0]);
    }
}
