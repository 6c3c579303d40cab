//! Bloom post-processing effect
//!
//! Bright parts of the image are extracted into the first bloom target, then
//! repeatedly downsampled through progressively halved targets. The pyramid is
//! walked back up with additive upsampling and finally combined with the
//! source image.

use super::{begin_effect, PostContext};
use crate::backend::*;
use crate::pipeline::PassResult;
use crate::resources::shaders;
use crate::targets::FrameTargets;

#[derive(Debug, Clone)]
pub struct BloomConfig {
    pub enabled: bool,
    /// Luminance above which pixels bloom
    pub threshold: f32,
    pub intensity: f32,
    /// Pyramid depth, capped by the allocated bloom targets
    pub levels: u32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 1.0,
            intensity: 0.5,
            levels: 5,
        }
    }
}

/// Bloom post-processing pass
pub struct BloomPass {
    pub config: BloomConfig,
}

impl BloomPass {
    pub fn new(config: BloomConfig) -> Self {
        Self { config }
    }

    pub fn apply<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        ctx: &PostContext,
        input: TextureHandle,
        output: FramebufferHandle,
    ) -> PassResult {
        let levels = (self.config.levels as usize).min(ctx.targets.bloom_mips.len());
        if levels == 0 {
            return Ok(0);
        }
        let mips = &ctx.targets.bloom_mips[..levels];
        let mut draws = 0;

        // Downsample, thresholding on the first step only
        let mut source = input;
        for (level, &mip) in mips.iter().enumerate() {
            if !begin_effect(backend, mip, shaders::BLOOM_DOWNSAMPLE, source, None)? {
                return Ok(0);
            }
            backend.clear(ClearValue::color([0.0, 0.0, 0.0, 0.0]));
            backend.set_uniform("u_threshold", if level == 0 { self.config.threshold } else { 0.0 });
            backend.draw_fullscreen_quad()?;
            draws += 1;
            source = FrameTargets::color(backend, mip)?;
        }

        // Upsample back into the larger levels
        for pair in mips.windows(2).rev() {
            let (larger, smaller) = (pair[0], pair[1]);
            let source = FrameTargets::color(backend, smaller)?;
            if !begin_effect(backend, larger, shaders::BLOOM_UPSAMPLE, source, Some(BlendState::additive()))? {
                return Ok(0);
            }
            backend.set_uniform("u_combine", false);
            backend.set_uniform("u_intensity", 1.0f32);
            backend.draw_fullscreen_quad()?;
            draws += 1;
        }

        let bloom = FrameTargets::color(backend, mips[0])?;
        if !begin_effect(backend, output, shaders::BLOOM_UPSAMPLE, bloom, None)? {
            return Ok(0);
        }
        backend.set_texture("u_base_texture", input, 1);
        backend.set_uniform("u_combine", true);
        backend.set_uniform("u_intensity", self.config.intensity);
        backend.draw_fullscreen_quad()?;
        Ok(draws + 1)
    }
}
