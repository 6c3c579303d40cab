//! Scene management

mod camera;
mod entity;
mod light;
pub mod prefab;
mod transform;

pub use camera::*;
pub use entity::*;
pub use light::*;
pub use prefab::{Node, Prefab};
pub use transform::*;

use glam::{Vec3, Vec4};

use crate::backend::TextureHandle;
use crate::resources::{Assets, PrefabId};

/// Index of an entity in [`Scene::entities`]
pub type EntityIndex = usize;

/// Everything the renderer needs to draw a frame
pub struct Scene {
    pub entities: Vec<Entity>,
    pub assets: Assets,
    pub camera: Camera,
    pub ambient_light: Vec3,
    pub background_color: Vec4,
    /// Cubemap drawn behind everything and captured by probes
    pub environment: Option<TextureHandle>,
    /// Light driving the volumetric pass
    pub primary_light: Option<EntityIndex>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            assets: Assets::new(),
            camera: Camera::default(),
            ambient_light: Vec3::splat(0.1),
            background_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            environment: None,
            primary_light: None,
        }
    }

    pub fn add_entity(&mut self, entity: Entity) -> EntityIndex {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    pub fn add_prefab(&mut self, name: &str, prefab: Option<PrefabId>, transform: Transform) -> EntityIndex {
        self.add_entity(Entity::new(name, transform, EntityKind::Prefab(prefab)))
    }

    pub fn add_light(&mut self, name: &str, light: Light, transform: Transform) -> EntityIndex {
        self.add_entity(Entity::new(name, transform, EntityKind::Light(light)))
    }

    pub fn add_decal(&mut self, name: &str, decal: Decal, transform: Transform) -> EntityIndex {
        self.add_entity(Entity::new(name, transform, EntityKind::Decal(decal)))
    }

    pub fn light(&self, index: EntityIndex) -> Option<&Light> {
        self.entities.get(index).and_then(Entity::as_light)
    }

    /// The primary light, if it is a visible light entity
    pub fn primary(&self) -> Option<(&Entity, &Light)> {
        let entity = self.entities.get(self.primary_light?)?;
        if !entity.visible {
            return None;
        }
        entity.as_light().map(|light| (entity, light))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
