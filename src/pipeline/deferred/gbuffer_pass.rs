//! G-buffer generation
//!
//! Writes three color targets in one draw per unit:
//! - albedo and alpha
//! - world-space normal
//! - material properties (occlusion, metallic, roughness) and emissive

use crate::backend::*;
use crate::pipeline::uniforms::{bind_material, material_state, set_camera_uniforms, set_model_uniform, use_shader};
use crate::pipeline::{PassResult, SceneView, SharedResources};
use crate::resources::shaders;
use crate::targets::{FrameTargets, GBUFFER_ALBEDO, GBUFFER_MATERIAL, GBUFFER_NORMAL};

/// Geometry pass of the deferred pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct GBufferPass {
    /// Approximate alpha blending with a dither pattern. When off, blended
    /// units are left for a forward pass over the lit result.
    pub dithering: bool,
}

impl GBufferPass {
    pub fn new(dithering: bool) -> Self {
        Self { dithering }
    }

    pub fn execute<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        view: &SceneView,
        targets: &FrameTargets,
        shared: &SharedResources,
    ) -> PassResult {
        let mut gpu = StateGuard::new(backend);
        gpu.bind_framebuffer(Some(targets.gbuffer))?;

        // Albedo gets the background tint, the others start black
        gpu.set_draw_buffers(&[GBUFFER_ALBEDO])?;
        gpu.clear(ClearValue::color_and_depth(view.scene.background_color.to_array()));
        gpu.set_draw_buffers(&[GBUFFER_NORMAL, GBUFFER_MATERIAL])?;
        gpu.clear(ClearValue::color([0.0, 0.0, 0.0, 1.0]));
        gpu.set_draw_buffers(&[GBUFFER_ALBEDO, GBUFFER_NORMAL, GBUFFER_MATERIAL])?;

        if use_shader(&mut *gpu, shaders::GBUFFERS)?.is_none() {
            return Ok(0);
        }
        set_camera_uniforms(&mut *gpu, view.camera);
        gpu.set_uniform("u_dither", self.dithering);

        let mut draws = 0;
        for call in view.calls {
            if call.is_blended() && !self.dithering {
                continue;
            }
            let (Some(mesh), Some(material)) = (
                view.scene.assets.mesh(call.mesh),
                view.scene.assets.material(call.material),
            ) else {
                continue;
            };
            let Some(handle) = mesh.handle else {
                continue;
            };

            let mut state = material_state(material, RenderState::default());
            // Attributes cannot be blended, dithered units discard instead
            state.blend = None;
            gpu.set_render_state(state);

            set_model_uniform(&mut *gpu, &call.model);
            bind_material(&mut *gpu, material, &shared.fallback);
            gpu.draw_mesh(handle)?;
            draws += 1;
        }

        gpu.disable_shader();
        gpu.check_errors()?;
        Ok(draws)
    }
}
