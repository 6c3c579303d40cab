//! Screen-space ambient occlusion
//!
//! A full-screen pass samples a hemisphere kernel around each G-buffer pixel
//! and writes an occlusion factor, followed by an optional separable blur.

use glam::{Vec2, Vec3};
use rand::prelude::*;
use rand::rngs::StdRng;

use super::uniforms::{set_screen_uniforms, use_shader};
use super::{PassResult, SceneView};
use crate::backend::*;
use crate::resources::shaders;
use crate::targets::{FrameTargets, GBUFFER_NORMAL};

/// SSAO configuration
#[derive(Debug, Clone)]
pub struct SsaoConfig {
    pub enabled: bool,
    /// Number of samples in the hemisphere kernel
    pub kernel_size: u32,
    /// World-space sampling radius
    pub radius: f32,
    pub bias: f32,
    pub blur: bool,
    /// Seed for kernel generation
    pub seed: u64,
}

impl Default for SsaoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kernel_size: 64,
            radius: 10.0,
            bias: 0.005,
            blur: true,
            seed: 0x55A0,
        }
    }
}

/// Sample points inside a hemisphere oriented along +Z
#[derive(Debug, Clone)]
pub struct SsaoKernel {
    pub samples: Vec<Vec3>,
}

impl SsaoKernel {
    /// Uniformly distributed directions with radius `cbrt(rand * 0.9 + 0.1) * radius`.
    /// Points below the XY plane are mirrored up.
    pub fn new(size: u32, radius: f32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let samples = (0..size)
            .map(|_| {
                let theta = rng.gen::<f32>() * std::f32::consts::TAU;
                let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
                let r = (rng.gen::<f32>() * 0.9 + 0.1).cbrt() * radius;
                let mut p = Vec3::new(
                    r * phi.sin() * theta.cos(),
                    r * phi.sin() * theta.sin(),
                    r * phi.cos(),
                );
                if p.z < 0.0 {
                    p.z = -p.z;
                }
                p
            })
            .collect();
        Self { samples }
    }
}

/// Occlusion pass plus horizontal and vertical blur
pub struct SsaoPass {
    config: SsaoConfig,
    kernel: SsaoKernel,
}

impl SsaoPass {
    pub fn new(config: SsaoConfig) -> Self {
        let kernel = SsaoKernel::new(config.kernel_size, config.radius, config.seed);
        Self { config, kernel }
    }

    pub fn config(&self) -> &SsaoConfig {
        &self.config
    }

    pub fn kernel(&self) -> &SsaoKernel {
        &self.kernel
    }

    /// Texture holding the final occlusion, valid after [`SsaoPass::execute`]
    pub fn output<B: GraphicsBackend>(
        &self,
        backend: &B,
        targets: &FrameTargets,
    ) -> BackendResult<TextureHandle> {
        FrameTargets::color(backend, targets.ssao)
    }

    pub fn execute<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        view: &SceneView,
        targets: &FrameTargets,
    ) -> PassResult {
        if !self.config.enabled {
            return Ok(0);
        }
        let depth = targets.gbuffer_depth(backend)?;
        let normal = targets.gbuffer_texture(backend, GBUFFER_NORMAL)?;

        let mut gpu = StateGuard::new(backend);
        gpu.set_depth_test(false);
        gpu.set_depth_write(false);
        gpu.set_blend(None);
        gpu.set_cull_mode(CullMode::None);

        gpu.bind_framebuffer(Some(targets.ssao))?;
        gpu.clear(ClearValue::color([1.0, 1.0, 1.0, 1.0]));
        if use_shader(&mut *gpu, shaders::SSAO)?.is_none() {
            return Ok(0);
        }
        set_screen_uniforms(&mut *gpu, view.camera, targets.width, targets.height);
        gpu.set_texture("u_depth_texture", depth, 0);
        gpu.set_texture("u_normal_texture", normal, 1);
        gpu.set_uniform("u_points", self.kernel.samples.clone());
        gpu.set_uniform("u_num_points", self.kernel.samples.len() as i32);
        gpu.set_uniform("u_radius", self.config.radius);
        gpu.set_uniform("u_bias", self.config.bias);
        gpu.draw_fullscreen_quad()?;
        let mut draws = 1;

        if self.config.blur {
            let passes = [
                (targets.ssao, targets.ssao_blur, Vec2::X),
                (targets.ssao_blur, targets.ssao, Vec2::Y),
            ];
            for (src, dst, direction) in passes {
                let source = FrameTargets::color(&*gpu, src)?;
                gpu.bind_framebuffer(Some(dst))?;
                if use_shader(&mut *gpu, shaders::SSAO_BLUR)?.is_none() {
                    break;
                }
                gpu.set_texture("u_texture", source, 0);
                gpu.set_uniform("u_direction", direction);
                gpu.set_uniform(
                    "u_iRes",
                    Vec2::new(1.0 / targets.width as f32, 1.0 / targets.height as f32),
                );
                gpu.draw_fullscreen_quad()?;
                draws += 1;
            }
        }

        gpu.disable_shader();
        gpu.check_errors()?;
        Ok(draws)
    }
}
