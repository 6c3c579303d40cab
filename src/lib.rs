//! Scene Renderer - forward and deferred rendering core for a 3D scene viewer
//!
//! Given a scene of prefabs, lights and decals, the renderer produces one
//! shaded image per frame through either pipeline:
//! - **Forward**: lights evaluated per unit, packed in one draw or one additive
//!   draw per light
//! - **Deferred**: G-buffer, decals, SSAO, screen-space lighting with probe GI,
//!   reflections and a post-process chain
//!
//! # Features
//! - Frustum-culled, ordered draw-unit collection
//! - Shadow maps for spot and directional lights
//! - Irradiance probe grid (spherical harmonics) and reflection probes
//! - Bloom, depth of field, volumetric light, lens effects, tonemapping
//! - Device abstraction with a headless backend for tests and tooling

pub mod backend;
pub mod error;
pub mod pipeline;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod targets;

pub use error::RenderError;
pub use pipeline::probes::ProbeConfig;
pub use pipeline::postprocess::PostProcessConfig;
pub use pipeline::{LightingMode, PipelineMode, RenderMode, ShadowConfig, SsaoConfig};
pub use renderer::{FrameStats, Renderer};

/// Configuration for creating a [`Renderer`]
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Initial viewport width
    pub width: u32,
    /// Initial viewport height
    pub height: u32,
    pub pipeline: PipelineMode,
    /// Light application in the forward pipeline
    pub lighting: LightingMode,
    pub render_mode: RenderMode,
    pub shadows: ShadowConfig,
    pub ssao: SsaoConfig,
    pub probes: ProbeConfig,
    pub post: PostProcessConfig,
    /// Render blended units into the G-buffer with dithered alpha instead of
    /// a forward pass after lighting
    pub dithered_transparency: bool,
    /// Light cap for single-pass forward lighting
    pub max_forward_lights: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            pipeline: PipelineMode::Deferred,
            lighting: LightingMode::SinglePass,
            render_mode: RenderMode::Final,
            shadows: ShadowConfig::default(),
            ssao: SsaoConfig::default(),
            probes: ProbeConfig::default(),
            post: PostProcessConfig::default(),
            dithered_transparency: false,
            max_forward_lights: 5,
        }
    }
}

impl RendererConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_pipeline(mut self, pipeline: PipelineMode) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_lighting(mut self, lighting: LightingMode) -> Self {
        self.lighting = lighting;
        self
    }

    pub fn with_render_mode(mut self, mode: RenderMode) -> Self {
        self.render_mode = mode;
        self
    }

    pub fn with_shadows(mut self, shadows: ShadowConfig) -> Self {
        self.shadows = shadows;
        self
    }

    pub fn with_ssao(mut self, ssao: SsaoConfig) -> Self {
        self.ssao = ssao;
        self
    }

    pub fn with_probes(mut self, probes: ProbeConfig) -> Self {
        self.probes = probes;
        self
    }

    pub fn with_post(mut self, post: PostProcessConfig) -> Self {
        self.post = post;
        self
    }

    pub fn with_dithered_transparency(mut self, dithered: bool) -> Self {
        self.dithered_transparency = dithered;
        self
    }
}
