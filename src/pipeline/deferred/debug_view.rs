//! Presentation of intermediate buffers
//!
//! Selected by [`RenderMode`]; upstream passes run as usual and only what
//! reaches the screen changes.

use glam::Vec2;

use super::bind_gbuffer;
use crate::backend::*;
use crate::pipeline::probes::IrradianceGrid;
use crate::pipeline::uniforms::{screen_pass_state, use_shader};
use crate::pipeline::{PassResult, RenderMode, SceneView};
use crate::resources::shaders;
use crate::targets::{FrameTargets, GBUFFER_ALBEDO, GBUFFER_MATERIAL, GBUFFER_NORMAL};

#[derive(Debug, Clone, Copy, Default)]
pub struct DebugView;

impl DebugView {
    /// Whether `mode` is presented by this view instead of the composite
    pub fn handles(mode: RenderMode) -> bool {
        matches!(
            mode,
            RenderMode::GBuffers | RenderMode::Ssao | RenderMode::Irradiance
        )
    }

    /// Draw the buffer selected by `mode` to the screen
    pub fn execute<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        mode: RenderMode,
        view: &SceneView,
        targets: &FrameTargets,
        ssao: Option<TextureHandle>,
        irradiance: Option<&IrradianceGrid>,
    ) -> PassResult {
        let (width, height) = backend.surface_size();
        let mut gpu = StateGuard::new(backend);
        gpu.bind_framebuffer(None)?;
        gpu.set_render_state(screen_pass_state(None));
        gpu.clear(ClearValue::color_and_depth([0.0, 0.0, 0.0, 1.0]));

        let draws = match mode {
            RenderMode::GBuffers => Self::gbuffers(&mut *gpu, view, targets, width, height)?,
            RenderMode::Ssao => match ssao {
                Some(texture) => Self::texture(&mut *gpu, texture, Viewport::full(width, height))?,
                None => 0,
            },
            RenderMode::Irradiance => Self::irradiance(&mut *gpu, view, targets, irradiance)?,
            _ => 0,
        };

        gpu.disable_shader();
        gpu.check_errors()?;
        Ok(draws)
    }

    fn texture<B: GraphicsBackend>(
        backend: &mut B,
        texture: TextureHandle,
        viewport: Viewport,
    ) -> BackendResult<u32> {
        if use_shader(backend, shaders::QUAD_TEXTURE)?.is_none() {
            return Ok(0);
        }
        backend.set_viewport(viewport);
        backend.set_texture("u_texture", texture, 0);
        backend.draw_fullscreen_quad()?;
        Ok(1)
    }

    /// Albedo bottom left, normal bottom right, material top left, depth top right
    fn gbuffers<B: GraphicsBackend>(
        backend: &mut B,
        view: &SceneView,
        targets: &FrameTargets,
        width: u32,
        height: u32,
    ) -> BackendResult<u32> {
        let (w, h) = (width as f32 / 2.0, height as f32 / 2.0);
        let quadrants = [
            (GBUFFER_ALBEDO, Viewport::new(0.0, 0.0, w, h)),
            (GBUFFER_NORMAL, Viewport::new(w, 0.0, w, h)),
            (GBUFFER_MATERIAL, Viewport::new(0.0, h, w, h)),
        ];

        let mut draws = 0;
        for (index, viewport) in quadrants {
            let texture = targets.gbuffer_texture(backend, index)?;
            draws += Self::texture(backend, texture, viewport)?;
        }

        let depth = targets.gbuffer_depth(backend)?;
        if use_shader(backend, shaders::QUAD_DEPTH)?.is_some() {
            backend.set_viewport(Viewport::new(w, h, w, h));
            backend.set_texture("u_texture", depth, 0);
            backend.set_uniform(
                "u_camera_nearfar",
                Vec2::new(view.camera.near(), view.camera.far()),
            );
            backend.draw_fullscreen_quad()?;
            draws += 1;
        }
        backend.set_viewport(Viewport::full(width, height));
        Ok(draws)
    }

    fn irradiance<B: GraphicsBackend>(
        backend: &mut B,
        view: &SceneView,
        targets: &FrameTargets,
        irradiance: Option<&IrradianceGrid>,
    ) -> BackendResult<u32> {
        let Some(grid) = irradiance else {
            log::debug!("No irradiance grid baked, nothing to show");
            return Ok(0);
        };
        if use_shader(backend, shaders::IRRADIANCE_VIEW)?.is_none() {
            return Ok(0);
        }
        bind_gbuffer(backend, targets, view.camera)?;
        if !grid.bind_uniforms(backend, 6) {
            return Ok(0);
        }
        backend.draw_fullscreen_quad()?;
        Ok(1)
    }
}
