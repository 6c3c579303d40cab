//! Lens effects: chromatic aberration and barrel/pincushion distortion

use super::{begin_effect, PostContext};
use crate::backend::*;
use crate::pipeline::PassResult;
use crate::resources::shaders;

#[derive(Debug, Clone)]
pub struct ChromaticAberrationConfig {
    pub enabled: bool,
    /// Red/blue channel offset at the screen edge, in UV units
    pub strength: f32,
}

impl Default for ChromaticAberrationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            strength: 0.005,
        }
    }
}

pub struct ChromaticAberrationPass {
    pub config: ChromaticAberrationConfig,
}

impl ChromaticAberrationPass {
    pub fn new(config: ChromaticAberrationConfig) -> Self {
        Self { config }
    }

    pub fn apply<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        _ctx: &PostContext,
        input: TextureHandle,
        output: FramebufferHandle,
    ) -> PassResult {
        if !begin_effect(backend, output, shaders::CHROMATIC_ABERRATION, input, None)? {
            return Ok(0);
        }
        backend.set_uniform("u_strength", self.config.strength);
        backend.draw_fullscreen_quad()?;
        Ok(1)
    }
}

/// Radial distortion `r' = r (1 + k1 r² + k2 r⁴)`
#[derive(Debug, Clone)]
pub struct LensDistortionConfig {
    pub enabled: bool,
    pub k1: f32,
    pub k2: f32,
    /// Zoom applied after distortion to hide the stretched borders
    pub scale: f32,
}

impl Default for LensDistortionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            k1: -0.1,
            k2: 0.0,
            scale: 1.0,
        }
    }
}

impl LensDistortionConfig {
    /// Where a point at distance `r` from the image center is sampled from
    pub fn distort(&self, r: f32) -> f32 {
        let r2 = r * r;
        r * (1.0 + self.k1 * r2 + self.k2 * r2 * r2) / self.scale
    }
}

pub struct LensDistortionPass {
    pub config: LensDistortionConfig,
}

impl LensDistortionPass {
    pub fn new(config: LensDistortionConfig) -> Self {
        Self { config }
    }

    pub fn apply<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        _ctx: &PostContext,
        input: TextureHandle,
        output: FramebufferHandle,
    ) -> PassResult {
        if !begin_effect(backend, output, shaders::LENS_DISTORTION, input, None)? {
            return Ok(0);
        }
        backend.set_uniform("u_k1", self.config.k1);
        backend.set_uniform("u_k2", self.config.k2);
        backend.set_uniform("u_scale", self.config.scale);
        backend.draw_fullscreen_quad()?;
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distortion_keeps_center() {
        let config = LensDistortionConfig::default();
        assert_relative_eq!(config.distort(0.0), 0.0);
        // Negative k1 pulls the edge inwards (barrel)
        assert!(config.distort(1.0) < 1.0);

        let pincushion = LensDistortionConfig {
            k1: 0.2,
            ..Default::default()
        };
        assert_relative_eq!(pincushion.distort(1.0), 1.2);
    }
}
