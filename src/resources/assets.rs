//! Arena tables for meshes, materials and prefabs

use slotmap::SlotMap;

use super::material::Material;
use super::mesh::{BoundingBox, Mesh};
use crate::backend::traits::*;
use crate::scene::prefab::Prefab;

slotmap::new_key_type! {
    pub struct MeshId;
    pub struct MaterialId;
    pub struct PrefabId;
}

/// A mesh living on the device together with its local bounds
#[derive(Debug, Clone, Copy)]
pub struct MeshAsset {
    /// `None` when there was nothing to upload
    pub handle: Option<MeshHandle>,
    pub bounds: BoundingBox,
    pub vertex_count: usize,
}

impl MeshAsset {
    pub fn is_drawable(&self) -> bool {
        self.vertex_count > 0 && self.handle.is_some()
    }
}

/// Owns every asset a scene refers to. Entities hold keys only.
#[derive(Default)]
pub struct Assets {
    pub meshes: SlotMap<MeshId, MeshAsset>,
    pub materials: SlotMap<MaterialId, Material>,
    pub prefabs: SlotMap<PrefabId, Prefab>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload a mesh and register it
    pub fn add_mesh<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        mesh: &Mesh,
    ) -> BackendResult<MeshId> {
        let handle = if mesh.is_empty() {
            log::warn!("Mesh '{}' has no geometry", mesh.name);
            None
        } else {
            Some(backend.upload_mesh(&mesh.vertices, &mesh.indices)?)
        };
        Ok(self.meshes.insert(MeshAsset {
            handle,
            bounds: mesh.bounds(),
            vertex_count: mesh.vertex_count(),
        }))
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.insert(material)
    }

    pub fn add_prefab(&mut self, prefab: Prefab) -> PrefabId {
        self.prefabs.insert(prefab)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&MeshAsset> {
        self.meshes.get(id)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn prefab(&self, id: PrefabId) -> Option<&Prefab> {
        self.prefabs.get(id)
    }
}
