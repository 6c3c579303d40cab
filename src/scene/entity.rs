//! Scene entities

use glam::Mat4;

use super::light::Light;
use super::transform::Transform;
use crate::backend::TextureHandle;
use crate::resources::PrefabId;

/// Projected texture stamped onto G-buffer albedo
#[derive(Debug, Clone, Default)]
pub struct Decal {
    pub albedo: Option<TextureHandle>,
}

/// Per-variant payload of an entity
#[derive(Debug, Clone)]
pub enum EntityKind {
    /// `None` when the referenced prefab could not be resolved
    Prefab(Option<PrefabId>),
    Light(Light),
    Decal(Decal),
}

/// An object placed in the scene
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(name: &str, transform: Transform, kind: EntityKind) -> Self {
        Self {
            name: name.to_string(),
            transform,
            visible: true,
            kind,
        }
    }

    pub fn model(&self) -> Mat4 {
        self.transform.matrix()
    }

    pub fn as_light(&self) -> Option<&Light> {
        match &self.kind {
            EntityKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn as_light_mut(&mut self) -> Option<&mut Light> {
        match &mut self.kind {
            EntityKind::Light(light) => Some(light),
            _ => None,
        }
    }
}
