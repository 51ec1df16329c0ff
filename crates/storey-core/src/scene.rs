//! Scene graph handed from the geometry builder to the exporter.
//!
//! Every [`SceneNode`] is owned by exactly one parent, so the graph is a tree
//! by construction. The exporter only ever reads it through
//! [`Scene::sanitize_transforms`] and [`Scene::world_meshes`].

use log::warn;

use crate::geometry::Transform;
use crate::mesh::Mesh;

/// A named node with a local transform, optional mesh and owned children.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    name: String,
    transform: Transform,
    mesh: Option<Mesh>,
    children: Vec<SceneNode>,
}

impl SceneNode {
    /// Creates an empty group node with an identity transform.
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::identity(),
            mesh: None,
            children: Vec::new(),
        }
    }

    /// Creates a leaf node carrying `mesh`, named after the mesh.
    pub fn leaf(mesh: Mesh) -> Self {
        Self {
            name: mesh.name().to_string(),
            transform: Transform::identity(),
            mesh: Some(mesh),
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = SceneNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn push_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    /// Number of meshes in this subtree.
    pub fn mesh_count(&self) -> usize {
        usize::from(self.mesh.is_some())
            + self.children.iter().map(SceneNode::mesh_count).sum::<usize>()
    }

    fn sanitize(&mut self) -> usize {
        let mut reset = 0;
        if !self.transform.is_finite() {
            warn!(node = self.name.as_str(); "Non-finite transform reset to identity");
            self.transform = Transform::identity();
            reset += 1;
        }
        reset + self.children.iter_mut().map(SceneNode::sanitize).sum::<usize>()
    }

    fn collect_world<'a>(&'a self, parent: &Transform, out: &mut Vec<WorldMesh<'a>>) {
        let world = parent.then(&self.transform);
        if let Some(mesh) = &self.mesh {
            out.push(WorldMesh {
                mesh,
                transform: world,
            });
        }
        for child in &self.children {
            child.collect_world(&world, out);
        }
    }
}

/// A mesh paired with its accumulated world transform.
#[derive(Debug, Clone, Copy)]
pub struct WorldMesh<'a> {
    mesh: &'a Mesh,
    transform: Transform,
}

impl<'a> WorldMesh<'a> {
    pub fn mesh(&self) -> &'a Mesh {
        self.mesh
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }
}

/// A complete scene: one root node owning the whole tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    root: SceneNode,
}

impl Scene {
    pub fn new(root: SceneNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    pub fn mesh_count(&self) -> usize {
        self.root.mesh_count()
    }

    /// Resets every node whose local transform has a non-finite element to
    /// identity. Returns how many nodes were reset.
    pub fn sanitize_transforms(&mut self) -> usize {
        self.root.sanitize()
    }

    /// All meshes in depth-first child order with their world transforms.
    ///
    /// # Examples
    ///
    /// ```
    /// # use storey_core::color::HexColor;
    /// # use storey_core::geometry::Transform;
    /// # use storey_core::mesh::{Mesh, MeshKind, RenderMeta};
    /// # use storey_core::scene::{Scene, SceneNode};
    /// let meta = RenderMeta::new(MeshKind::Item, HexColor::new(0xcfcfcf));
    /// let leaf = SceneNode::leaf(Mesh::cuboid("box", [1.0, 1.0, 1.0], meta))
    ///     .with_transform(Transform::from_translation(0.0, 0.5, 0.0));
    /// let scene = Scene::new(
    ///     SceneNode::group("root")
    ///         .with_transform(Transform::from_translation(10.0, 0.0, 0.0))
    ///         .with_child(leaf),
    /// );
    ///
    /// let meshes = scene.world_meshes();
    /// assert_eq!(meshes.len(), 1);
    /// assert_eq!(meshes[0].transform().transform_point([0.0; 3]), [10.0, 0.5, 0.0]);
    /// ```
    pub fn world_meshes(&self) -> Vec<WorldMesh<'_>> {
        let mut out = Vec::with_capacity(self.mesh_count());
        self.root.collect_world(&Transform::identity(), &mut out);
        out
    }
}
