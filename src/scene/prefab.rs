//! Prefab node trees

use glam::Mat4;

use super::transform::Transform;
use crate::resources::{MaterialId, MeshId};

/// One node of a prefab hierarchy
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub name: String,
    pub visible: bool,
    pub local: Transform,
    pub mesh: Option<MeshId>,
    pub material: Option<MaterialId>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            visible: true,
            ..Default::default()
        }
    }

    pub fn with_mesh(mut self, mesh: MeshId, material: MaterialId) -> Self {
        self.mesh = Some(mesh);
        self.material = Some(material);
        self
    }

    pub fn with_transform(mut self, local: Transform) -> Self {
        self.local = local;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first walk over visible nodes with their accumulated world matrix
    pub fn visit<F: FnMut(&Node, &Mat4)>(&self, parent: &Mat4, f: &mut F) {
        if !self.visible {
            return;
        }
        let world = *parent * self.local.matrix();
        f(self, &world);
        for child in &self.children {
            child.visit(&world, f);
        }
    }
}

/// A reusable hierarchy of meshes
#[derive(Debug, Clone)]
pub struct Prefab {
    pub name: String,
    pub root: Node,
}

impl Prefab {
    pub fn new(name: &str, root: Node) -> Self {
        Self {
            name: name.to_string(),
            root,
        }
    }

    /// Prefab with a single mesh at its root
    pub fn single(name: &str, mesh: MeshId, material: MaterialId) -> Self {
        Self::new(name, Node::new(name).with_mesh(mesh, material))
    }
}
