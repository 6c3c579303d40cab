//! Tonemapping and presentation

use crate::backend::*;
use crate::pipeline::uniforms::{screen_pass_state, use_shader};
use crate::pipeline::{PassResult, SceneView};
use crate::resources::shaders;

/// Tonemapping operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TonemapOperator {
    Reinhard,
    #[default]
    Aces,
    Uncharted2,
    None,
}

impl TonemapOperator {
    /// Value of the `u_operator` uniform
    pub fn index(&self) -> i32 {
        match self {
            TonemapOperator::Reinhard => 0,
            TonemapOperator::Aces => 1,
            TonemapOperator::Uncharted2 => 2,
            TonemapOperator::None => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TonemapConfig {
    pub operator: TonemapOperator,
    pub exposure: f32,
    pub gamma: f32,
}

impl Default for TonemapConfig {
    fn default() -> Self {
        Self {
            operator: TonemapOperator::Aces,
            exposure: 1.0,
            gamma: 2.2,
        }
    }
}

/// Draws an HDR image to the default framebuffer
pub struct CompositePass {
    pub config: TonemapConfig,
}

impl CompositePass {
    pub fn new(config: TonemapConfig) -> Self {
        Self { config }
    }

    pub fn execute<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        view: &SceneView,
        hdr: TextureHandle,
    ) -> PassResult {
        let (width, height) = backend.surface_size();
        let mut gpu = StateGuard::new(backend);
        gpu.bind_framebuffer(None)?;
        gpu.set_viewport(Viewport::full(width, height));
        gpu.clear(ClearValue::color_and_depth(view.scene.background_color.to_array()));

        if use_shader(&mut *gpu, shaders::COMPOSITE)?.is_none() {
            return Ok(0);
        }
        gpu.set_render_state(screen_pass_state(None));
        gpu.set_texture("u_texture", hdr, 0);
        gpu.set_uniform("u_exposure", self.config.exposure);
        gpu.set_uniform("u_gamma", self.config.gamma);
        gpu.set_uniform("u_operator", self.config.operator.index());
        gpu.draw_fullscreen_quad()?;

        gpu.disable_shader();
        gpu.check_errors()?;
        Ok(1)
    }
}
