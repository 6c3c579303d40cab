//! Shadow map generation
//!
//! Every shadow-casting spot or directional light owns a square depth target.
//! The scene is collected again from the light's camera and opaque geometry is
//! drawn depth-only into it.

use super::collector::{collect_render_calls, sort_render_calls, RenderCall};
use super::uniforms::{set_camera_uniforms, use_shader};
use crate::backend::*;
use crate::resources::{shaders, AlphaMode, Assets, FallbackTextures};
use crate::scene::{Entity, EntityIndex};

/// Shadow map resolution
pub const SHADOW_MAP_SIZE: u32 = 2048;

/// Configuration for shadow rendering
#[derive(Debug, Clone)]
pub struct ShadowConfig {
    pub enabled: bool,
    pub map_size: u32,
    /// Near plane of spot shadow cameras
    pub spot_near: f32,
    pub directional_near: f32,
    pub directional_far: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            map_size: SHADOW_MAP_SIZE,
            spot_near: 1.0,
            directional_near: 10.0,
            directional_far: 10000.0,
        }
    }
}

/// What one shadow pass produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShadowOutput {
    /// Lights whose map was rendered this frame
    pub maps: u32,
    pub draws: u32,
}

/// Renders depth from every shadow-casting light
pub struct ShadowPass {
    config: ShadowConfig,
    calls: Vec<RenderCall>,
}

impl ShadowPass {
    pub fn new(config: ShadowConfig) -> Self {
        Self {
            config,
            calls: Vec::new(),
        }
    }

    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    /// Render all shadow maps.
    ///
    /// Every light's map is withdrawn first and handed back only once its
    /// depth has been rendered this frame, so a skipped or failed pass never
    /// leaves last frame's depth to be sampled.
    pub fn execute<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        entities: &mut [Entity],
        assets: &Assets,
        lights: &[EntityIndex],
        fallback: &FallbackTextures,
    ) -> BackendResult<ShadowOutput> {
        for &index in lights {
            if let Some(light) = entities.get_mut(index).and_then(Entity::as_light_mut) {
                light.shadow.map = None;
            }
        }

        let mut output = ShadowOutput::default();
        if !self.config.enabled {
            return Ok(output);
        }

        for &index in lights {
            let Some(light) = entities.get(index).and_then(Entity::as_light) else {
                continue;
            };
            if !light.casts_shadows() {
                continue;
            }
            let camera = light.shadow.camera.clone();

            self.calls.clear();
            collect_render_calls(&mut self.calls, entities, assets, &camera);
            sort_render_calls(&mut self.calls);

            let Some(light) = entities.get_mut(index).and_then(Entity::as_light_mut) else {
                continue;
            };
            let target = match light.shadow.target {
                Some(target) => target,
                None => {
                    let target = backend.create_framebuffer(&FramebufferDescriptor::depth_only(
                        "shadowmap",
                        self.config.map_size,
                        self.config.map_size,
                    ))?;
                    log::info!(
                        "Allocated {}x{} shadow map for light {}",
                        self.config.map_size,
                        self.config.map_size,
                        index
                    );
                    light.shadow.target = Some(target);
                    target
                }
            };

            let mut gpu = StateGuard::new(&mut *backend);
            gpu.bind_framebuffer(Some(target))?;
            gpu.set_viewport(Viewport::full(self.config.map_size, self.config.map_size));
            gpu.clear(ClearValue::depth());
            gpu.set_color_writes(ColorWrites::NONE);
            gpu.set_blend(None);

            if use_shader(&mut *gpu, shaders::DEPTH)?.is_none() {
                drop(gpu);
                backend.bind_framebuffer(None)?;
                return Ok(output);
            }
            set_camera_uniforms(&mut *gpu, &camera);

            for call in &self.calls {
                // Translucent geometry does not cast shadows
                if call.is_blended() {
                    continue;
                }
                let (Some(mesh), Some(material)) =
                    (assets.mesh(call.mesh), assets.material(call.material))
                else {
                    continue;
                };
                let Some(handle) = mesh.handle else {
                    continue;
                };
                gpu.set_uniform("u_model", call.model);
                if material.alpha_mode == AlphaMode::Mask {
                    gpu.set_texture("u_texture", fallback.white_or(material.color_texture), 0);
                    gpu.set_uniform("u_alpha_cutoff", material.alpha_cutoff);
                } else {
                    gpu.set_uniform("u_alpha_cutoff", 0.0f32);
                }
                gpu.draw_mesh(handle)?;
                output.draws += 1;
            }

            gpu.disable_shader();
            gpu.check_errors()?;
            drop(gpu);

            light.shadow.map = backend.framebuffer_depth(target);
            output.maps += 1;
        }

        backend.bind_framebuffer(None)?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::collector::RenderCallCollector;
    use crate::resources::{AlphaMode, Material, Mesh};
    use crate::scene::{Light, Prefab, Scene, Transform};
    use glam::Vec3;

    fn scene(backend: &mut HeadlessBackend) -> Scene {
        let mut scene = Scene::new();
        let mesh = scene.assets.add_mesh(backend, &Mesh::cube(2.0)).unwrap();
        let material = scene.assets.add_material(Material::new("grey"));
        let prefab = scene.assets.add_prefab(Prefab::single("box", mesh, material));
        scene.add_prefab("box", Some(prefab), Transform::default());
        for x in [-20.0, 20.0] {
            scene.add_light(
                "spot",
                Light::spot(Vec3::ONE, 1.0, 100.0, 30.0).with_shadows(true),
                Transform::facing(Vec3::new(x, 20.0, 0.0), Vec3::ZERO),
            );
        }
        scene.add_light(
            "point",
            Light::point(Vec3::ONE, 1.0, 10.0).with_shadows(true),
            Transform::from_position(Vec3::new(0.0, 5.0, 0.0)),
        );
        scene
    }

    #[test]
    fn test_each_light_owns_its_target() {
        let mut backend = HeadlessBackend::new(64, 64);
        let fallback = FallbackTextures::create(&mut backend).unwrap();
        let mut scene = scene(&mut backend);
        let mut collector = RenderCallCollector::new();
        let config = ShadowConfig::default();
        collector.collect(&mut scene.entities, &scene.assets, &scene.camera, &config);

        let mut pass = ShadowPass::new(config);
        let output = pass
            .execute(&mut backend, &mut scene.entities, &scene.assets, collector.lights(), &fallback)
            .unwrap();
        assert_eq!(output.maps, 2);
        assert_eq!(output.draws, 2);
        assert_eq!(output.draws as usize, backend.draws_with_shader(shaders::DEPTH).count());

        let maps: Vec<_> = scene.entities[1..3]
            .iter()
            .map(|e| e.as_light().unwrap().shadow_map().unwrap())
            .collect();
        assert_ne!(maps[0], maps[1]);
        for map in &maps {
            assert!(backend.texture(*map).unwrap().is_written());
            assert_eq!(backend.texture_descriptor(*map).unwrap().width, SHADOW_MAP_SIZE);
        }
        assert!(scene.entities[3].as_light().unwrap().shadow_map().is_none());
        assert_eq!(backend.render_state(), RenderState::default());
    }

    #[test]
    fn test_target_allocated_once() {
        let mut backend = HeadlessBackend::new(64, 64);
        let fallback = FallbackTextures::create(&mut backend).unwrap();
        let mut scene = scene(&mut backend);
        let mut collector = RenderCallCollector::new();
        let mut pass = ShadowPass::new(ShadowConfig::default());

        collector.collect(&mut scene.entities, &scene.assets, &scene.camera, pass.config());
        pass.execute(&mut backend, &mut scene.entities, &scene.assets, collector.lights(), &fallback)
            .unwrap();
        let count = backend.framebuffer_count();
        pass.execute(&mut backend, &mut scene.entities, &scene.assets, collector.lights(), &fallback)
            .unwrap();
        assert_eq!(backend.framebuffer_count(), count);
    }

    #[test]
    fn test_missing_depth_shader_skips() {
        let mut backend = HeadlessBackend::new(64, 64);
        backend.remove_shader(shaders::DEPTH);
        let fallback = FallbackTextures::create(&mut backend).unwrap();
        let mut scene = scene(&mut backend);
        let mut collector = RenderCallCollector::new();
        let mut pass = ShadowPass::new(ShadowConfig::default());
        collector.collect(&mut scene.entities, &scene.assets, &scene.camera, pass.config());

        let output = pass
            .execute(&mut backend, &mut scene.entities, &scene.assets, collector.lights(), &fallback)
            .unwrap();
        assert_eq!(output, ShadowOutput::default());
        assert!(backend.draws().is_empty());
        assert_eq!(backend.render_state(), RenderState::default());
    }

    #[test]
    fn test_skipped_pass_withdraws_last_frame_maps() {
        let mut backend = HeadlessBackend::new(64, 64);
        let fallback = FallbackTextures::create(&mut backend).unwrap();
        let mut scene = scene(&mut backend);
        let mut collector = RenderCallCollector::new();
        let mut pass = ShadowPass::new(ShadowConfig::default());
        collector.collect(&mut scene.entities, &scene.assets, &scene.camera, pass.config());

        pass.execute(&mut backend, &mut scene.entities, &scene.assets, collector.lights(), &fallback)
            .unwrap();
        assert!(scene.entities[1].as_light().unwrap().shadow_map().is_some());

        backend.remove_shader(shaders::DEPTH);
        let output = pass
            .execute(&mut backend, &mut scene.entities, &scene.assets, collector.lights(), &fallback)
            .unwrap();
        assert_eq!(output.maps, 0);
        for entity in &scene.entities[1..3] {
            assert!(entity.as_light().unwrap().shadow_map().is_none());
        }
    }

    #[test]
    fn test_blended_units_cast_no_shadow_and_masks_cut_out() {
        let mut backend = HeadlessBackend::new(64, 64);
        let fallback = FallbackTextures::create(&mut backend).unwrap();
        let mut scene = scene(&mut backend);

        let mut add_box = |scene: &mut Scene, material: Material| {
            let mesh = scene.assets.add_mesh(&mut backend, &Mesh::cube(1.0)).unwrap();
            let material = scene.assets.add_material(material);
            let prefab = scene.assets.add_prefab(Prefab::single("box", mesh, material));
            scene.add_prefab("box", Some(prefab), Transform::from_position(Vec3::Y));
            scene.assets.mesh(mesh).unwrap().handle.unwrap()
        };
        let glass = add_box(&mut scene, Material::glass());
        let leaves = add_box(
            &mut scene,
            Material::new("leaves")
                .with_alpha_mode(AlphaMode::Mask)
                .with_alpha_cutoff(0.25),
        );

        let mut collector = RenderCallCollector::new();
        let mut pass = ShadowPass::new(ShadowConfig::default());
        collector.collect(&mut scene.entities, &scene.assets, &scene.camera, pass.config());
        let output = pass
            .execute(&mut backend, &mut scene.entities, &scene.assets, collector.lights(), &fallback)
            .unwrap();

        // Two spot lights, each drawing the opaque and the masked box
        assert_eq!(output.draws, 4);
        let draws: Vec<_> = backend.draws_with_shader(shaders::DEPTH).collect();
        assert!(draws.iter().all(|d| d.mesh != Some(glass)));

        let masked: Vec<_> = draws.iter().filter(|d| d.mesh == Some(leaves)).collect();
        assert_eq!(masked.len(), 2);
        for draw in masked {
            assert_eq!(draw.uniform("u_alpha_cutoff"), Some(&UniformValue::Float(0.25)));
            assert_eq!(
                draw.uniform("u_texture").and_then(UniformValue::as_texture),
                Some(fallback.white)
            );
        }
        for draw in draws.iter().filter(|d| d.mesh != Some(leaves)) {
            assert_eq!(draw.uniform("u_alpha_cutoff"), Some(&UniformValue::Float(0.0)));
        }
    }
}
