//! Decal projection into the G-buffer
//!
//! A decal is a box in world space. Its cube is rasterized over the scene,
//! each fragment reconstructs the world position under it from G-buffer depth,
//! moves it into decal space with the inverse model matrix and samples the
//! decal albedo there. Since the G-buffer cannot be sampled and written at the
//! same time, its colors are copied into a scratch target, decals are blended
//! on top of the copy and the result is copied back.

use super::bind_gbuffer;
use crate::backend::*;
use crate::pipeline::uniforms::{screen_pass_state, set_model_uniform, use_shader};
use crate::pipeline::{PassResult, SceneView, SharedResources};
use crate::resources::shaders;
use crate::scene::{Entity, EntityKind};
use crate::targets::{FrameTargets, GBUFFER_ALBEDO};

const GBUFFER_COLORS: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct DecalPass;

impl DecalPass {
    /// Visible decals that have an albedo to project
    fn decals<'a>(view: &SceneView<'a>) -> impl Iterator<Item = (&'a Entity, TextureHandle)> + 'a {
        view.scene.entities.iter().filter_map(|entity| match &entity.kind {
            EntityKind::Decal(decal) if entity.visible => decal.albedo.map(|tex| (entity, tex)),
            _ => None,
        })
    }

    fn copy_colors<B: GraphicsBackend>(
        backend: &mut B,
        src: FramebufferHandle,
        dst: FramebufferHandle,
    ) -> BackendResult<()> {
        for index in 0..GBUFFER_COLORS {
            let (Some(from), Some(to)) = (
                backend.framebuffer_color(src, index),
                backend.framebuffer_color(dst, index),
            ) else {
                return Err(BackendError::InvalidHandle("decal attachment"));
            };
            backend.copy_texture(from, to)?;
        }
        Ok(())
    }

    pub fn execute<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        view: &SceneView,
        targets: &FrameTargets,
        shared: &SharedResources,
    ) -> PassResult {
        if Self::decals(view).next().is_none() {
            return Ok(0);
        }
        if backend.shader(shaders::DECAL).is_none() {
            log::warn!("Shader '{}' not found, skipping pass", shaders::DECAL);
            return Ok(0);
        }

        Self::copy_colors(backend, targets.gbuffer, targets.decal_scratch)?;

        let mut draws = 0;
        {
            let mut gpu = StateGuard::new(&mut *backend);
            gpu.bind_framebuffer(Some(targets.decal_scratch))?;
            gpu.set_draw_buffers(&[GBUFFER_ALBEDO])?;

            let mut state = screen_pass_state(Some(BlendState::alpha_blending()));
            // Back faces stay visible when the camera is inside the box
            state.cull_mode = CullMode::Front;
            gpu.set_render_state(state);

            if use_shader(&mut *gpu, shaders::DECAL)?.is_none() {
                return Ok(0);
            }
            bind_gbuffer(&mut *gpu, targets, view.camera)?;

            for (entity, albedo) in Self::decals(view) {
                let model = entity.model();
                set_model_uniform(&mut *gpu, &model);
                gpu.set_uniform("u_imodel", model.inverse());
                gpu.set_texture("u_decal_texture", albedo, 4);
                gpu.draw_mesh(shared.unit_cube)?;
                draws += 1;
            }
            gpu.disable_shader();
            gpu.check_errors()?;
        }

        Self::copy_colors(backend, targets.decal_scratch, targets.gbuffer)?;
        Ok(draws)
    }
}

