//! Reflection probe overlay

use super::bind_gbuffer;
use crate::backend::*;
use crate::pipeline::probes::ReflectionProbe;
use crate::pipeline::uniforms::{screen_pass_state, use_shader};
use crate::pipeline::{PassResult, SceneView};
use crate::resources::shaders;
use crate::targets::FrameTargets;

const SLOT_PROBE: u32 = 4;

/// Blends a probe cubemap, sampled along the reflected view vector, over the
/// lit image
#[derive(Debug, Clone, Copy)]
pub struct ReflectionPass {
    /// Overall strength, further scaled by material metalness in the shader
    pub factor: f32,
}

impl Default for ReflectionPass {
    fn default() -> Self {
        Self { factor: 0.5 }
    }
}

impl ReflectionPass {
    pub fn new(factor: f32) -> Self {
        Self { factor }
    }

    pub fn execute<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        view: &SceneView,
        targets: &FrameTargets,
        probe: Option<&ReflectionProbe>,
    ) -> PassResult {
        let Some((probe, cubemap)) = probe.and_then(|p| p.cubemap.map(|c| (p, c))) else {
            return Ok(0);
        };

        let mut gpu = StateGuard::new(backend);
        gpu.bind_framebuffer(Some(targets.illumination))?;
        if use_shader(&mut *gpu, shaders::REFLECTION)?.is_none() {
            return Ok(0);
        }
        gpu.set_render_state(screen_pass_state(Some(BlendState::alpha_blending())));
        bind_gbuffer(&mut *gpu, targets, view.camera)?;
        gpu.set_texture("u_environment", cubemap, SLOT_PROBE);
        gpu.set_uniform("u_probe_position", probe.position);
        gpu.set_uniform("u_reflection_factor", self.factor);
        gpu.draw_fullscreen_quad()?;

        gpu.disable_shader();
        gpu.check_errors()?;
        Ok(1)
    }
}
