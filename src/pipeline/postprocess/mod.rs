//! Post-processing effects
//!
//! Effects run over the lit HDR image in a fixed order, ping-ponging between
//! the two post targets. A disabled or skipped effect leaves the current image
//! untouched. The composite pass tonemaps the result onto the screen.

mod bloom;
mod dof;
mod lens;
mod tonemapping;
mod volumetric;

pub use bloom::{BloomConfig, BloomPass};
pub use dof::{DepthOfFieldConfig, DepthOfFieldPass};
pub use lens::{ChromaticAberrationConfig, ChromaticAberrationPass, LensDistortionConfig, LensDistortionPass};
pub use tonemapping::{CompositePass, TonemapConfig, TonemapOperator};
pub use volumetric::{VolumetricConfig, VolumetricPass};

use glam::Vec2;

use super::uniforms::{screen_pass_state, use_shader};
use super::{PassResult, SceneView};
use crate::backend::*;
use crate::targets::FrameTargets;

/// Settings for the whole chain
#[derive(Debug, Clone, Default)]
pub struct PostProcessConfig {
    pub volumetric: VolumetricConfig,
    pub bloom: BloomConfig,
    pub depth_of_field: DepthOfFieldConfig,
    pub chromatic_aberration: ChromaticAberrationConfig,
    pub lens_distortion: LensDistortionConfig,
    pub tonemap: TonemapConfig,
}

/// Everything an effect reads besides its input image
pub struct PostContext<'a> {
    pub view: &'a SceneView<'a>,
    pub targets: &'a FrameTargets,
    /// Scene depth from the G-buffer
    pub depth: TextureHandle,
}

/// Bind `output`, enable `shader` and feed it `input`. Returns `false` when
/// the shader is missing and the effect should be skipped.
pub(crate) fn begin_effect<B: GraphicsBackend>(
    backend: &mut B,
    output: FramebufferHandle,
    shader: &str,
    input: TextureHandle,
    blend: Option<BlendState>,
) -> BackendResult<bool> {
    backend.bind_framebuffer(Some(output))?;
    if use_shader(backend, shader)?.is_none() {
        return Ok(false);
    }
    backend.set_render_state(screen_pass_state(blend));
    backend.set_texture("u_texture", input, 0);

    let size = backend
        .texture_descriptor(input)
        .map(|d| (d.width, d.height))
        .unwrap_or((1, 1));
    backend.set_uniform(
        "u_iRes",
        Vec2::new(1.0 / size.0.max(1) as f32, 1.0 / size.1.max(1) as f32),
    );
    Ok(true)
}

/// Result of running the chain
#[derive(Debug, Clone)]
pub struct PostOutput {
    /// Final HDR image, the input itself when nothing ran
    pub texture: TextureHandle,
    pub draws: u32,
    /// Names of effects that failed this frame
    pub failed: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    Volumetric,
    Bloom,
    DepthOfField,
    ChromaticAberration,
    LensDistortion,
}

impl Effect {
    const ORDER: [Effect; 5] = [
        Effect::Volumetric,
        Effect::Bloom,
        Effect::DepthOfField,
        Effect::ChromaticAberration,
        Effect::LensDistortion,
    ];

    fn name(&self) -> &'static str {
        match self {
            Effect::Volumetric => "volumetric",
            Effect::Bloom => "bloom",
            Effect::DepthOfField => "depth_of_field",
            Effect::ChromaticAberration => "chromatic_aberration",
            Effect::LensDistortion => "lens_distortion",
        }
    }
}

/// Runs the enabled effects in order
pub struct PostProcessChain {
    pub volumetric: VolumetricPass,
    pub bloom: BloomPass,
    pub depth_of_field: DepthOfFieldPass,
    pub chromatic_aberration: ChromaticAberrationPass,
    pub lens_distortion: LensDistortionPass,
}

impl PostProcessChain {
    pub fn new(config: &PostProcessConfig) -> Self {
        Self {
            volumetric: VolumetricPass::new(config.volumetric.clone()),
            bloom: BloomPass::new(config.bloom.clone()),
            depth_of_field: DepthOfFieldPass::new(config.depth_of_field.clone()),
            chromatic_aberration: ChromaticAberrationPass::new(config.chromatic_aberration.clone()),
            lens_distortion: LensDistortionPass::new(config.lens_distortion.clone()),
        }
    }

    fn enabled(&self, effect: Effect) -> bool {
        match effect {
            Effect::Volumetric => self.volumetric.config.enabled,
            Effect::Bloom => self.bloom.config.enabled,
            Effect::DepthOfField => self.depth_of_field.config.enabled,
            Effect::ChromaticAberration => self.chromatic_aberration.config.enabled,
            Effect::LensDistortion => self.lens_distortion.config.enabled,
        }
    }

    fn apply<B: GraphicsBackend>(
        &self,
        effect: Effect,
        backend: &mut B,
        ctx: &PostContext,
        input: TextureHandle,
        output: FramebufferHandle,
    ) -> PassResult {
        let mut gpu = StateGuard::new(backend);
        let draws = match effect {
            Effect::Volumetric => self.volumetric.apply(&mut *gpu, ctx, input, output)?,
            Effect::Bloom => self.bloom.apply(&mut *gpu, ctx, input, output)?,
            Effect::DepthOfField => self.depth_of_field.apply(&mut *gpu, ctx, input, output)?,
            Effect::ChromaticAberration => {
                self.chromatic_aberration.apply(&mut *gpu, ctx, input, output)?
            }
            Effect::LensDistortion => self.lens_distortion.apply(&mut *gpu, ctx, input, output)?,
        };
        gpu.disable_shader();
        gpu.check_errors()?;
        Ok(draws)
    }

    /// Run every enabled effect starting from `input`.
    ///
    /// A failing effect is logged and dropped from this frame; the chain goes
    /// on with the last good image.
    pub fn execute<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        ctx: &PostContext,
        input: TextureHandle,
    ) -> PostOutput {
        let mut output = PostOutput {
            texture: input,
            draws: 0,
            failed: Vec::new(),
        };
        let mut next = 0;

        for effect in Effect::ORDER {
            if !self.enabled(effect) {
                continue;
            }
            let target = ctx.targets.post[next];
            match self.apply(effect, backend, ctx, output.texture, target) {
                Ok(0) => log::debug!("Post effect {} skipped", effect.name()),
                Ok(draws) => match FrameTargets::color(backend, target) {
                    Ok(texture) => {
                        output.texture = texture;
                        output.draws += draws;
                        next ^= 1;
                    }
                    Err(e) => {
                        log::error!("Post effect {} has no output: {}", effect.name(), e);
                        output.failed.push(effect.name());
                    }
                },
                Err(e) => {
                    log::error!("Post effect {} failed: {}", effect.name(), e);
                    reset_render_state(backend);
                    output.failed.push(effect.name());
                }
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SceneView;
    use crate::scene::Scene;

    fn chain_with(config: PostProcessConfig) -> PostProcessChain {
        PostProcessChain::new(&config)
    }

    #[test]
    fn test_disabled_chain_passes_input_through() {
        let mut backend = HeadlessBackend::new(64, 64);
        let targets = FrameTargets::create(&mut backend, 64, 64, 4).unwrap();
        let scene = Scene::new();
        let view = SceneView {
            scene: &scene,
            camera: &scene.camera,
            calls: &[],
            lights: &[],
        };
        let ctx = PostContext {
            view: &view,
            targets: &targets,
            depth: targets.gbuffer_depth(&backend).unwrap(),
        };
        let input = FrameTargets::color(&backend, targets.illumination).unwrap();

        let mut config = PostProcessConfig::default();
        config.bloom.enabled = false;
        let output = chain_with(config).execute(&mut backend, &ctx, input);
        assert_eq!(output.texture, input);
        assert_eq!(output.draws, 0);
        assert!(output.failed.is_empty());
    }

    #[test]
    fn test_effects_ping_pong() {
        let mut backend = HeadlessBackend::new(64, 64);
        let targets = FrameTargets::create(&mut backend, 64, 64, 3).unwrap();
        let scene = Scene::new();
        let view = SceneView {
            scene: &scene,
            camera: &scene.camera,
            calls: &[],
            lights: &[],
        };
        let ctx = PostContext {
            view: &view,
            targets: &targets,
            depth: targets.gbuffer_depth(&backend).unwrap(),
        };
        let input = FrameTargets::color(&backend, targets.illumination).unwrap();

        let mut config = PostProcessConfig::default();
        config.bloom.enabled = true;
        config.depth_of_field.enabled = true;
        let output = chain_with(config).execute(&mut backend, &ctx, input);

        // Bloom writes post[0], depth of field reads it and writes post[1]
        let second = FrameTargets::color(&backend, targets.post[1]).unwrap();
        assert_eq!(output.texture, second);
        let dof = backend
            .draws_with_shader(crate::resources::shaders::DEPTH_OF_FIELD)
            .next()
            .unwrap();
        let first = FrameTargets::color(&backend, targets.post[0]).unwrap();
        assert_eq!(dof.uniform("u_texture").and_then(UniformValue::as_texture), Some(first));
        assert_eq!(backend.render_state(), RenderState::default());
    }

    #[test]
    fn test_missing_shader_skips_effect() {
        let mut backend = HeadlessBackend::new(64, 64);
        backend.remove_shader(crate::resources::shaders::BLOOM_DOWNSAMPLE);
        let targets = FrameTargets::create(&mut backend, 64, 64, 3).unwrap();
        let scene = Scene::new();
        let view = SceneView {
            scene: &scene,
            camera: &scene.camera,
            calls: &[],
            lights: &[],
        };
        let ctx = PostContext {
            view: &view,
            targets: &targets,
            depth: targets.gbuffer_depth(&backend).unwrap(),
        };
        let input = FrameTargets::color(&backend, targets.illumination).unwrap();

        let output = chain_with(PostProcessConfig::default()).execute(&mut backend, &ctx, input);
        assert_eq!(output.texture, input);
        assert!(output.failed.is_empty());
    }
}
