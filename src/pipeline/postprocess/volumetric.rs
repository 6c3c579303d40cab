//! Volumetric light shafts
//!
//! Ray-marches from the camera to each pixel's surface through the primary
//! light's shadow map and adds in-scattered light wherever the sample is lit.

use super::{begin_effect, PostContext};
use crate::backend::*;
use crate::pipeline::PassResult;
use crate::resources::shaders;

#[derive(Debug, Clone)]
pub struct VolumetricConfig {
    pub enabled: bool,
    /// Ray-march steps per pixel
    pub samples: i32,
    /// Scattering density of the medium
    pub density: f32,
}

impl Default for VolumetricConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            samples: 64,
            density: 0.02,
        }
    }
}

pub struct VolumetricPass {
    pub config: VolumetricConfig,
}

impl VolumetricPass {
    pub fn new(config: VolumetricConfig) -> Self {
        Self { config }
    }

    /// Skipped when the scene has no primary light or it has no shadow map
    pub fn apply<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        ctx: &PostContext,
        input: TextureHandle,
        output: FramebufferHandle,
    ) -> PassResult {
        let Some((entity, light)) = ctx.view.scene.primary() else {
            return Ok(0);
        };
        if light.shadow_map().is_none() {
            log::debug!("Primary light '{}' has no shadow map yet", entity.name);
            return Ok(0);
        }
        if !begin_effect(backend, output, shaders::VOLUMETRIC, input, None)? {
            return Ok(0);
        }

        let camera = ctx.view.camera;
        backend.set_texture("u_depth_texture", ctx.depth, 1);
        backend.set_uniform("u_inverse_viewprojection", camera.inverse_view_projection_matrix());
        backend.set_uniform("u_camera_position", camera.eye());
        light.set_uniforms(backend, &entity.model(), true);
        backend.set_uniform("u_samples", self.config.samples);
        backend.set_uniform("u_air_density", self.config.density);
        backend.draw_fullscreen_quad()?;
        Ok(1)
    }
}
