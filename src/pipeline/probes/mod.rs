//! Global illumination probes
//!
//! Irradiance probes store nine SH coefficients baked from six rendered faces
//! and are packed into a lookup texture. Reflection probes keep the rendered
//! faces as a mipmapped cubemap. Both are baked on demand and stay untouched
//! between bakes.

pub mod capture;
pub mod irradiance;
pub mod reflection;
pub mod sh;

pub use capture::{face_camera, FaceRenderer, CUBE_FACES};
pub use irradiance::{IrradianceGrid, IrradianceProbe};
pub use reflection::ReflectionProbe;
pub use sh::{SphericalHarmonics, SH_COEFFICIENTS};

use glam::{UVec3, Vec3};

use super::{ForwardOptions, LightingMode, RenderMode, SharedResources};
use crate::backend::*;
use crate::error::RenderError;
use crate::scene::Scene;

/// Probe placement and capture settings
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub grid_start: Vec3,
    pub grid_end: Vec3,
    pub grid_dim: UVec3,
    /// Face size used when capturing irradiance probes
    pub capture_size: u32,
    pub capture_near: f32,
    pub capture_far: f32,
    pub reflection_positions: Vec<Vec3>,
    pub reflection_size: u32,
    /// Sample the irradiance grid in the ambient pass
    pub use_irradiance: bool,
    /// Overlay the nearest reflection probe
    pub use_reflections: bool,
    pub reflection_factor: f32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            grid_start: Vec3::new(-300.0, 5.0, -400.0),
            grid_end: Vec3::new(300.0, 150.0, 400.0),
            grid_dim: UVec3::new(8, 6, 12),
            capture_size: 64,
            capture_near: 0.1,
            capture_far: 10000.0,
            reflection_positions: vec![Vec3::new(0.0, 50.0, 0.0)],
            reflection_size: 256,
            use_irradiance: true,
            use_reflections: true,
            reflection_factor: 0.5,
        }
    }
}

/// Owns baked probe data and the capture targets
pub struct ProbeSystem {
    config: ProbeConfig,
    pub irradiance: Option<IrradianceGrid>,
    pub reflections: Vec<ReflectionProbe>,
    capture_target: Option<FramebufferHandle>,
    reflection_target: Option<FramebufferHandle>,
}

impl ProbeSystem {
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            config,
            irradiance: None,
            reflections: Vec::new(),
            capture_target: None,
            reflection_target: None,
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    fn face_renderer<'a>(&self, scene: &'a Scene, shared: &'a SharedResources) -> FaceRenderer<'a> {
        FaceRenderer {
            scene,
            shared,
            options: ForwardOptions {
                lighting: LightingMode::SinglePass,
                render_mode: RenderMode::Final,
                ..ForwardOptions::default()
            },
            near: self.config.capture_near,
            far: self.config.capture_far,
        }
    }

    /// Rebuild the irradiance grid: capture every probe, project to SH and
    /// upload the lookup texture. Blocks until all readbacks complete.
    pub fn bake_irradiance<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        scene: &Scene,
        shared: &SharedResources,
    ) -> Result<usize, RenderError> {
        let mut grid = IrradianceGrid::new(
            self.config.grid_start,
            self.config.grid_end,
            self.config.grid_dim,
        )?;
        let size = self.config.capture_size;
        let target = match self.capture_target {
            Some(target) => target,
            None => {
                let target = backend.create_framebuffer(
                    &FramebufferDescriptor::color(
                        "irradiance_capture",
                        size,
                        size,
                        &[TextureFormat::Rgba32Float],
                    )
                    .with_depth(),
                )?;
                self.capture_target = Some(target);
                target
            }
        };

        log::info!("Baking {} irradiance probes", grid.probe_count());
        let faces = self.face_renderer(scene, shared);
        for probe in &mut grid.probes {
            let images = faces.capture(backend, target, size, probe.position)?;
            probe.sh = SphericalHarmonics::project_cubemap(&images);
        }

        if let Some(mut old) = self.irradiance.take() {
            old.destroy(backend);
        }
        grid.upload(backend)?;
        let count = grid.probe_count();
        self.irradiance = Some(grid);
        Ok(count)
    }

    /// Re-capture every reflection probe
    pub fn bake_reflections<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        scene: &Scene,
        shared: &SharedResources,
    ) -> Result<usize, RenderError> {
        if self.config.reflection_positions.is_empty() {
            return Err(RenderError::NoProbes("reflection"));
        }
        let size = self.config.reflection_size;
        let target = match self.reflection_target {
            Some(target) => target,
            None => {
                let target = backend.create_framebuffer(&FramebufferDescriptor::depth_only(
                    "reflection_capture",
                    size,
                    size,
                ))?;
                self.reflection_target = Some(target);
                target
            }
        };

        if self.reflections.len() != self.config.reflection_positions.len() {
            for probe in &mut self.reflections {
                probe.destroy(backend);
            }
            self.reflections = self
                .config
                .reflection_positions
                .iter()
                .map(|p| ReflectionProbe::new(*p, size))
                .collect();
        }

        log::info!("Baking {} reflection probes", self.reflections.len());
        let faces = self.face_renderer(scene, shared);
        for probe in &mut self.reflections {
            probe.bake(backend, &faces, target)?;
        }
        Ok(self.reflections.len())
    }

    /// Baked reflection probe closest to `point`
    pub fn nearest_reflection(&self, point: Vec3) -> Option<&ReflectionProbe> {
        self.reflections
            .iter()
            .filter(|p| p.cubemap.is_some())
            .min_by(|a, b| {
                a.position
                    .distance_squared(point)
                    .total_cmp(&b.position.distance_squared(point))
            })
    }

    pub fn destroy<B: GraphicsBackend>(&mut self, backend: &mut B) {
        if let Some(mut grid) = self.irradiance.take() {
            grid.destroy(backend);
        }
        for probe in &mut self.reflections {
            probe.destroy(backend);
        }
        for target in [self.capture_target.take(), self.reflection_target.take()]
            .into_iter()
            .flatten()
        {
            backend.destroy_framebuffer(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_reflection_ignores_unbaked() {
        let mut probes = ProbeSystem::new(ProbeConfig::default());
        let mut backend = HeadlessBackend::new(8, 8);
        let cubemap = backend
            .create_texture(&TextureDescriptor {
                width: 4,
                height: 4,
                dimension: TextureDimension::Cube,
                ..Default::default()
            })
            .unwrap();

        let mut far = ReflectionProbe::new(Vec3::new(100.0, 0.0, 0.0), 4);
        far.cubemap = Some(cubemap);
        let near_unbaked = ReflectionProbe::new(Vec3::new(1.0, 0.0, 0.0), 4);
        let mut middle = ReflectionProbe::new(Vec3::new(10.0, 0.0, 0.0), 4);
        middle.cubemap = Some(cubemap);
        probes.reflections = vec![far, near_unbaked, middle];

        let nearest = probes.nearest_reflection(Vec3::ZERO).unwrap();
        assert_eq!(nearest.position, Vec3::new(10.0, 0.0, 0.0));
    }
}
