//! Main renderer orchestrator

use crate::backend::*;
use crate::error::RenderError;
use crate::pipeline::deferred::{DebugView, DecalPass, GBufferPass, LightingPass, ReflectionPass};
use crate::pipeline::postprocess::{CompositePass, PostContext, PostProcessChain};
use crate::pipeline::probes::ProbeSystem;
use crate::pipeline::{
    ForwardOptions, ForwardPass, LightingMode, PassResult, PipelineMode, RenderCall,
    RenderCallCollector, RenderMode, SceneView, ShadowPass, SharedResources, SsaoPass,
};
use crate::scene::Scene;
use crate::targets::FrameTargets;
use crate::RendererConfig;

/// Summary of one rendered frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Draw units collected from the main camera
    pub render_calls: usize,
    pub lights: usize,
    pub shadow_maps: u32,
    pub draws: u32,
    /// Stages that failed and were skipped this frame
    pub failed_passes: Vec<&'static str>,
}

/// Account for a finished stage. A failure is logged, the device state is put
/// back to defaults and the frame goes on.
fn finish_stage<B: GraphicsBackend>(
    backend: &mut B,
    stats: &mut FrameStats,
    stage: &'static str,
    result: PassResult,
) {
    match result {
        Ok(draws) => stats.draws += draws,
        Err(e) => {
            log::error!("{} pass failed: {}", stage, e);
            stats.failed_passes.push(stage);
            reset_render_state(backend);
            backend.disable_shader();
            // Errors raised after the failure belong to the same stage
            let _ = backend.check_errors();
        }
    }
}

/// The scene renderer
pub struct Renderer<B: GraphicsBackend> {
    backend: B,
    config: RendererConfig,
    shared: SharedResources,
    targets: FrameTargets,
    collector: RenderCallCollector,
    shadows: ShadowPass,
    ssao: SsaoPass,
    probes: ProbeSystem,
    post: PostProcessChain,
    composite: CompositePass,
    frame: u64,
}

impl<B: GraphicsBackend> Renderer<B> {
    /// Create the renderer and allocate shared resources and frame targets
    pub fn new(mut backend: B, config: RendererConfig) -> Result<Self, RenderError> {
        let width = config.width.max(1);
        let height = config.height.max(1);
        log::info!(
            "Creating renderer on {} at {}x{} ({:?} pipeline)",
            backend.name(),
            width,
            height,
            config.pipeline
        );

        let shared = SharedResources::create(&mut backend)?;
        let targets = FrameTargets::create(&mut backend, width, height, config.post.bloom.levels)?;

        Ok(Self {
            shared,
            targets,
            collector: RenderCallCollector::new(),
            shadows: ShadowPass::new(config.shadows.clone()),
            ssao: SsaoPass::new(config.ssao.clone()),
            probes: ProbeSystem::new(config.probes.clone()),
            post: PostProcessChain::new(&config.post),
            composite: CompositePass::new(config.post.tonemap.clone()),
            frame: 0,
            backend,
            config,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn targets(&self) -> &FrameTargets {
        &self.targets
    }

    pub fn probes(&self) -> &ProbeSystem {
        &self.probes
    }

    pub fn shared(&self) -> &SharedResources {
        &self.shared
    }

    /// Draw units collected for the last frame
    pub fn render_calls(&self) -> &[RenderCall] {
        self.collector.calls()
    }

    pub fn set_pipeline(&mut self, pipeline: PipelineMode) {
        self.config.pipeline = pipeline;
    }

    pub fn set_lighting(&mut self, lighting: LightingMode) {
        self.config.lighting = lighting;
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.config.render_mode = mode;
    }

    /// Reallocate viewport-sized targets. Zero sizes (minimized window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        if (width, height) == (self.targets.width, self.targets.height) {
            return Ok(());
        }
        log::info!("Resizing renderer to {}x{}", width, height);
        self.targets.resize(&mut self.backend, width, height)?;
        self.backend.resize(width, height);
        self.config.width = width;
        self.config.height = height;
        Ok(())
    }

    /// Render `scene` through the active pipeline into the default framebuffer.
    ///
    /// Never fails: a stage that errors is logged and skipped, and the rest of
    /// the frame still runs.
    pub fn render_frame(&mut self, scene: &mut Scene) -> FrameStats {
        let mut stats = FrameStats::default();

        self.collector.collect(
            &mut scene.entities,
            &scene.assets,
            &scene.camera,
            self.shadows.config(),
        );
        stats.render_calls = self.collector.calls().len();
        stats.lights = self.collector.lights().len();

        let result = self.shadows.execute(
            &mut self.backend,
            &mut scene.entities,
            &scene.assets,
            self.collector.lights(),
            &self.shared.fallback,
        );
        if let Ok(output) = result {
            stats.shadow_maps = output.maps;
        }
        finish_stage(&mut self.backend, &mut stats, "shadow", result.map(|output| output.draws));

        let collector = std::mem::take(&mut self.collector);
        {
            let scene: &Scene = scene;
            let view = SceneView {
                scene,
                camera: &scene.camera,
                calls: collector.calls(),
                lights: collector.lights(),
            };
            match self.config.pipeline {
                PipelineMode::Forward => self.render_forward(&view, &mut stats),
                PipelineMode::Deferred => self.render_deferred(&view, &mut stats),
            }
        }
        self.collector = collector;

        self.frame += 1;
        log::debug!(
            "Frame {}: {} calls, {} lights, {} shadow maps, {} draws",
            self.frame,
            stats.render_calls,
            stats.lights,
            stats.shadow_maps,
            stats.draws
        );
        stats
    }

    fn forward_options(&self) -> ForwardOptions {
        ForwardOptions {
            lighting: self.config.lighting,
            render_mode: self.config.render_mode,
            max_lights: self.config.max_forward_lights,
            shadows: self.config.shadows.enabled,
            ..ForwardOptions::default()
        }
    }

    fn render_forward(&mut self, view: &SceneView, stats: &mut FrameStats) {
        let (width, height) = self.backend.surface_size();
        let options = self.forward_options();
        let result = match self.backend.bind_framebuffer(None) {
            Ok(()) => {
                self.backend.set_viewport(Viewport::full(width, height));
                ForwardPass::new(options).execute(&mut self.backend, view, &self.shared)
            }
            Err(e) => Err(e),
        };
        finish_stage(&mut self.backend, stats, "forward", result);
    }

    fn render_deferred(&mut self, view: &SceneView, stats: &mut FrameStats) {
        let mode = self.config.render_mode;
        // Per-unit debug views have nothing to show from the G-buffer
        if mode.forward_debug_shader().is_some() {
            self.render_forward(view, stats);
            return;
        }

        let result = GBufferPass::new(self.config.dithered_transparency).execute(
            &mut self.backend,
            view,
            &self.targets,
            &self.shared,
        );
        finish_stage(&mut self.backend, stats, "gbuffer", result);

        let result = DecalPass.execute(&mut self.backend, view, &self.targets, &self.shared);
        finish_stage(&mut self.backend, stats, "decals", result);

        let ssao = if self.ssao.config().enabled {
            let result = self.ssao.execute(&mut self.backend, view, &self.targets);
            let ok = result.is_ok();
            finish_stage(&mut self.backend, stats, "ssao", result);
            ok.then(|| self.ssao.output(&self.backend, &self.targets).ok())
                .flatten()
        } else {
            None
        };

        let irradiance = self
            .probes
            .irradiance
            .as_ref()
            .filter(|_| self.config.probes.use_irradiance);

        if DebugView::handles(mode) {
            let result =
                DebugView.execute(&mut self.backend, mode, view, &self.targets, ssao, irradiance);
            finish_stage(&mut self.backend, stats, "debug_view", result);
            return;
        }

        let lighting = LightingPass::new(self.config.shadows.enabled, self.config.probes.use_irradiance);
        let result = lighting.execute(
            &mut self.backend,
            view,
            &self.targets,
            &self.shared,
            ssao,
            irradiance,
        );
        finish_stage(&mut self.backend, stats, "lighting", result);

        if self.config.probes.use_reflections {
            let probe = self.probes.nearest_reflection(view.camera.eye());
            let result = ReflectionPass::new(self.config.probes.reflection_factor).execute(
                &mut self.backend,
                view,
                &self.targets,
                probe,
            );
            finish_stage(&mut self.backend, stats, "reflections", result);
        }

        if !self.config.dithered_transparency && view.calls.iter().any(RenderCall::is_blended) {
            let result = self.render_transparent(view);
            finish_stage(&mut self.backend, stats, "transparency", result);
        }

        let inputs = FrameTargets::color(&self.backend, self.targets.illumination)
            .and_then(|hdr| Ok((hdr, self.targets.gbuffer_depth(&self.backend)?)));
        let (hdr, depth) = match inputs {
            Ok(inputs) => inputs,
            Err(e) => {
                finish_stage(&mut self.backend, stats, "post", Err(e));
                return;
            }
        };
        let ctx = PostContext {
            view,
            targets: &self.targets,
            depth,
        };
        let post = self.post.execute(&mut self.backend, &ctx, hdr);
        stats.draws += post.draws;
        stats.failed_passes.extend(post.failed);

        let result = self.composite.execute(&mut self.backend, view, post.texture);
        finish_stage(&mut self.backend, stats, "composite", result);
    }

    /// Blended units drawn forward over the lit image, depth tested against
    /// the opaque geometry
    fn render_transparent(&mut self, view: &SceneView) -> PassResult {
        self.backend.bind_framebuffer(Some(self.targets.illumination))?;
        let options = ForwardOptions {
            clear: false,
            skybox: false,
            blended_only: true,
            ..self.forward_options()
        };
        ForwardPass::new(options).execute(&mut self.backend, view, &self.shared)
    }

    /// Re-capture every irradiance probe and upload the lookup texture.
    /// Blocks until done; uses whatever shadow maps the last frame produced.
    pub fn bake_irradiance(&mut self, scene: &Scene) -> Result<usize, RenderError> {
        let result = self.probes.bake_irradiance(&mut self.backend, scene, &self.shared);
        self.after_bake();
        let count = result?;
        log::info!("Irradiance bake finished: {} probes", count);
        Ok(count)
    }

    /// Re-capture every reflection probe
    pub fn bake_reflections(&mut self, scene: &Scene) -> Result<usize, RenderError> {
        let result = self.probes.bake_reflections(&mut self.backend, scene, &self.shared);
        self.after_bake();
        let count = result?;
        log::info!("Reflection bake finished: {} probes", count);
        Ok(count)
    }

    fn after_bake(&mut self) {
        reset_render_state(&mut self.backend);
        self.backend.disable_shader();
        if let Err(e) = self.backend.bind_framebuffer(None) {
            log::error!("Failed to restore default framebuffer after bake: {}", e);
        }
    }
}
