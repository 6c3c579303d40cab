//! Depth of field

use glam::Vec2;

use super::{begin_effect, PostContext};
use crate::backend::*;
use crate::pipeline::PassResult;
use crate::resources::shaders;

#[derive(Debug, Clone)]
pub struct DepthOfFieldConfig {
    pub enabled: bool,
    /// Distance from the camera that stays sharp
    pub focus_distance: f32,
    /// Depth range around the focus distance blended from sharp to blurred
    pub focus_range: f32,
    /// Blur radius in pixels at full defocus
    pub max_blur: f32,
}

impl Default for DepthOfFieldConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            focus_distance: 50.0,
            focus_range: 30.0,
            max_blur: 4.0,
        }
    }
}

/// Blurs by circle of confusion computed from linearized depth
pub struct DepthOfFieldPass {
    pub config: DepthOfFieldConfig,
}

impl DepthOfFieldPass {
    pub fn new(config: DepthOfFieldConfig) -> Self {
        Self { config }
    }

    pub fn apply<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        ctx: &PostContext,
        input: TextureHandle,
        output: FramebufferHandle,
    ) -> PassResult {
        if !begin_effect(backend, output, shaders::DEPTH_OF_FIELD, input, None)? {
            return Ok(0);
        }
        let camera = ctx.view.camera;
        backend.set_texture("u_depth_texture", ctx.depth, 1);
        backend.set_uniform("u_camera_nearfar", Vec2::new(camera.near(), camera.far()));
        backend.set_uniform("u_focus_distance", self.config.focus_distance);
        backend.set_uniform("u_focus_range", self.config.focus_range.max(f32::EPSILON));
        backend.set_uniform("u_max_blur", self.config.max_blur);
        backend.draw_fullscreen_quad()?;
        Ok(1)
    }
}
