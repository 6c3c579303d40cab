//! Deferred lighting accumulation
//!
//! Runs into the illumination target with the G-buffer depth copied in:
//! 1. Ambient and indirect light: one full-screen pass reading SSAO and the
//!    irradiance grid
//! 2. Point and spot lights: a sphere scaled to the light range, additive,
//!    front face flipped so the inside of the sphere is shaded even with the
//!    camera inside it
//! 3. Directional lights: additive full-screen quads
//! 4. Skybox, depth-tested at the far plane so it only fills empty pixels

use glam::{Mat4, Vec3};

use super::bind_gbuffer;
use crate::backend::*;
use crate::pipeline::forward::render_skybox;
use crate::pipeline::probes::IrradianceGrid;
use crate::pipeline::uniforms::{screen_pass_state, set_model_uniform, use_shader};
use crate::pipeline::{PassResult, SceneView, SharedResources};
use crate::resources::shaders;
use crate::scene::{Entity, Light, LightType};
use crate::targets::FrameTargets;

const SLOT_SSAO: u32 = 4;
const SLOT_IRRADIANCE: u32 = 6;

/// Screen-space lighting over the G-buffer
#[derive(Debug, Clone, Copy)]
pub struct LightingPass {
    pub shadows: bool,
    pub use_irradiance: bool,
}

impl Default for LightingPass {
    fn default() -> Self {
        Self {
            shadows: true,
            use_irradiance: true,
        }
    }
}

impl LightingPass {
    pub fn new(shadows: bool, use_irradiance: bool) -> Self {
        Self {
            shadows,
            use_irradiance,
        }
    }

    pub fn execute<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        view: &SceneView,
        targets: &FrameTargets,
        shared: &SharedResources,
        ssao: Option<TextureHandle>,
        irradiance: Option<&IrradianceGrid>,
    ) -> PassResult {
        let mut gpu = StateGuard::new(backend);
        gpu.bind_framebuffer(Some(targets.illumination))?;
        gpu.clear(ClearValue::color_and_depth([0.0, 0.0, 0.0, 1.0]));
        gpu.blit_depth(targets.gbuffer, Some(targets.illumination))?;

        let mut draws = self.ambient(&mut *gpu, view, targets, shared, ssao, irradiance)?;

        let (volumes, directional): (Vec<_>, Vec<_>) = view
            .lights()
            .partition(|(_, light, _)| light.light_type != LightType::Directional);
        draws += self.light_volumes(&mut *gpu, view, targets, shared, &volumes)?;
        draws += self.light_quads(&mut *gpu, view, targets, &directional)?;

        let depth = targets.gbuffer_depth(&*gpu)?;
        draws += render_skybox(&mut *gpu, view, shared, Some(depth))?;

        gpu.disable_shader();
        gpu.check_errors()?;
        Ok(draws)
    }

    fn ambient<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        view: &SceneView,
        targets: &FrameTargets,
        shared: &SharedResources,
        ssao: Option<TextureHandle>,
        irradiance: Option<&IrradianceGrid>,
    ) -> BackendResult<u32> {
        if use_shader(backend, shaders::DEFERRED_AMBIENT)?.is_none() {
            return Ok(0);
        }
        backend.set_render_state(screen_pass_state(Some(BlendState::additive())));
        bind_gbuffer(backend, targets, view.camera)?;
        backend.set_uniform("u_ambient_light", view.scene.ambient_light);
        backend.set_texture(
            "u_ssao_texture",
            ssao.unwrap_or(shared.fallback.white),
            SLOT_SSAO,
        );

        let grid = irradiance.filter(|_| self.use_irradiance);
        let bound = grid.is_some_and(|grid| grid.bind_uniforms(backend, SLOT_IRRADIANCE));
        backend.set_uniform("u_use_irradiance", bound);

        backend.draw_fullscreen_quad()?;
        Ok(1)
    }

    fn light_volumes<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        view: &SceneView,
        targets: &FrameTargets,
        shared: &SharedResources,
        lights: &[(&Entity, &Light, Mat4)],
    ) -> BackendResult<u32> {
        if lights.is_empty() || use_shader(backend, shaders::DEFERRED_LIGHT_VOLUME)?.is_none() {
            return Ok(0);
        }
        let mut state = screen_pass_state(Some(BlendState::additive()));
        state.cull_mode = CullMode::Back;
        state.front_face = FrontFace::Cw;
        backend.set_render_state(state);
        bind_gbuffer(backend, targets, view.camera)?;

        for (_, light, model) in lights {
            let position = model.transform_point3(Vec3::ZERO);
            let volume = Mat4::from_translation(position)
                * Mat4::from_scale(Vec3::splat(light.max_distance));
            set_model_uniform(backend, &volume);
            light.set_uniforms(backend, model, self.shadows);
            backend.draw_mesh(shared.light_sphere)?;
        }
        Ok(lights.len() as u32)
    }

    fn light_quads<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        view: &SceneView,
        targets: &FrameTargets,
        lights: &[(&Entity, &Light, Mat4)],
    ) -> BackendResult<u32> {
        if lights.is_empty() || use_shader(backend, shaders::DEFERRED_LIGHT_QUAD)?.is_none() {
            return Ok(0);
        }
        backend.set_render_state(screen_pass_state(Some(BlendState::additive())));
        bind_gbuffer(backend, targets, view.camera)?;

        for (_, light, model) in lights {
            light.set_uniforms(backend, model, self.shadows);
            backend.draw_fullscreen_quad()?;
        }
        Ok(lights.len() as u32)
    }
}
