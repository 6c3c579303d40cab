//! Render-call collection
//!
//! Walks the entity list, culls prefab nodes against the camera frustum and
//! emits a flat, sorted list of draw units. Visible lights are gathered at the
//! same time and their shadow cameras are re-oriented.

use std::cmp::Ordering;

use glam::Mat4;

use super::shadow::ShadowConfig;
use crate::resources::{AlphaMode, Assets, BoundingBox, MaterialId, MeshId};
use crate::scene::{Camera, Entity, EntityIndex, EntityKind};

/// One mesh + material + transform scheduled for drawing
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCall {
    pub model: Mat4,
    pub mesh: MeshId,
    pub material: MaterialId,
    /// World-space bounds
    pub bounds: BoundingBox,
    /// Distance from the camera eye to the bounds center
    pub distance: f32,
    pub alpha_mode: AlphaMode,
}

impl RenderCall {
    pub fn is_blended(&self) -> bool {
        self.alpha_mode == AlphaMode::Blend
    }
}

/// Opaque and masked calls front to back, then blended calls back to front.
/// Equal keys keep their input order.
pub fn sort_render_calls(calls: &mut [RenderCall]) {
    calls.sort_by(|a, b| match (a.is_blended(), b.is_blended()) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (false, false) => a.distance.total_cmp(&b.distance),
        (true, true) => b.distance.total_cmp(&a.distance),
    });
}

/// Append the visible draw units of every visible prefab entity
pub fn collect_render_calls(
    calls: &mut Vec<RenderCall>,
    entities: &[Entity],
    assets: &Assets,
    camera: &Camera,
) {
    let frustum = camera.frustum();
    let eye = camera.eye();

    for entity in entities.iter().filter(|e| e.visible) {
        let EntityKind::Prefab(prefab_id) = &entity.kind else {
            continue;
        };
        let Some(prefab) = prefab_id.and_then(|id| assets.prefab(id)) else {
            log::trace!("Entity '{}' has no resolvable prefab", entity.name);
            continue;
        };

        prefab.root.visit(&entity.model(), &mut |node, world| {
            let (Some(mesh_id), Some(material_id)) = (node.mesh, node.material) else {
                return;
            };
            let (Some(mesh), Some(material)) = (assets.mesh(mesh_id), assets.material(material_id))
            else {
                return;
            };
            if !mesh.is_drawable() {
                return;
            }
            let bounds = mesh.bounds.transformed(world);
            if !frustum.contains_box(&bounds) {
                return;
            }
            calls.push(RenderCall {
                model: *world,
                mesh: mesh_id,
                material: material_id,
                bounds,
                distance: bounds.center.distance(eye),
                alpha_mode: material.alpha_mode,
            });
        });
    }
}

/// Per-frame draw units and visible lights
#[derive(Debug, Default)]
pub struct RenderCallCollector {
    calls: Vec<RenderCall>,
    lights: Vec<EntityIndex>,
}

impl RenderCallCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the call and light lists for `camera`.
    ///
    /// Each visible light's shadow camera is updated from its transform, so this
    /// must run before shadow maps are generated.
    pub fn collect(
        &mut self,
        entities: &mut [Entity],
        assets: &Assets,
        camera: &Camera,
        shadows: &ShadowConfig,
    ) {
        self.calls.clear();
        self.lights.clear();

        collect_render_calls(&mut self.calls, entities, assets, camera);
        sort_render_calls(&mut self.calls);

        for (index, entity) in entities.iter_mut().enumerate() {
            if !entity.visible {
                continue;
            }
            let model = entity.model();
            if let Some(light) = entity.as_light_mut() {
                light.update_shadow_camera(&model, shadows);
                self.lights.push(index);
            }
        }

        log::trace!(
            "Collected {} render calls and {} lights",
            self.calls.len(),
            self.lights.len()
        );
    }

    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    pub fn lights(&self) -> &[EntityIndex] {
        &self.lights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use rstest::rstest;
    use slotmap::SlotMap;

    fn ids() -> (MeshId, MaterialId) {
        let mut meshes: SlotMap<MeshId, ()> = SlotMap::with_key();
        let mut materials: SlotMap<MaterialId, ()> = SlotMap::with_key();
        (meshes.insert(()), materials.insert(()))
    }

    fn call(distance: f32, alpha_mode: AlphaMode) -> RenderCall {
        let (mesh, material) = ids();
        RenderCall {
            model: Mat4::from_translation(Vec3::new(distance, 0.0, 0.0)),
            mesh,
            material,
            bounds: BoundingBox::new(Vec3::ZERO, Vec3::ONE),
            distance,
            alpha_mode,
        }
    }

    #[rstest]
    #[case::mixed(vec![
        (5.0, AlphaMode::Blend),
        (3.0, AlphaMode::Opaque),
        (9.0, AlphaMode::Blend),
        (1.0, AlphaMode::Mask),
        (7.0, AlphaMode::Opaque),
    ])]
    #[case::only_blended(vec![(1.0, AlphaMode::Blend), (2.0, AlphaMode::Blend), (3.0, AlphaMode::Blend)])]
    #[case::only_opaque(vec![(3.0, AlphaMode::Opaque), (2.0, AlphaMode::Opaque), (1.0, AlphaMode::Mask)])]
    #[case::empty(vec![])]
    fn test_sort_partitions_and_orders(#[case] input: Vec<(f32, AlphaMode)>) {
        let mut calls: Vec<_> = input.into_iter().map(|(d, m)| call(d, m)).collect();
        sort_render_calls(&mut calls);

        let first_blend = calls.iter().position(|c| c.is_blended()).unwrap_or(calls.len());
        assert!(calls[first_blend..].iter().all(|c| c.is_blended()));

        let (opaque, blended) = calls.split_at(first_blend);
        assert!(opaque.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert!(blended.windows(2).all(|w| w[0].distance >= w[1].distance));
    }

    #[test]
    fn test_sort_is_stable_for_equal_distances() {
        let mut calls = vec![call(2.0, AlphaMode::Opaque), call(2.0, AlphaMode::Mask)];
        calls[0].model = Mat4::IDENTITY;
        calls[1].model = Mat4::ZERO;
        sort_render_calls(&mut calls);
        assert_eq!(calls[0].model, Mat4::IDENTITY);
        assert_eq!(calls[1].model, Mat4::ZERO);
    }
}
