//! Frame pipeline
//!
//! Per frame the renderer runs:
//! 1. Render-call collection (and shadow camera update)
//! 2. Shadow maps
//! 3. Either the forward pipeline, or the deferred pipeline:
//!    G-buffer, decals, SSAO, lighting, reflections, post-processing, composite

pub mod collector;
pub mod deferred;
pub mod forward;
pub mod postprocess;
pub mod probes;
pub mod shadow;
pub mod ssao;
pub mod uniforms;

pub use collector::{sort_render_calls, RenderCall, RenderCallCollector};
pub use deferred::{DebugView, DecalPass, GBufferPass, LightingPass, ReflectionPass};
pub use forward::{ForwardOptions, ForwardPass};
pub use postprocess::{PostProcessChain, PostProcessConfig};
pub use probes::{ProbeConfig, ProbeSystem};
pub use shadow::{ShadowConfig, ShadowOutput, ShadowPass};
pub use ssao::{SsaoConfig, SsaoKernel, SsaoPass};

use glam::Mat4;

use crate::backend::*;
use crate::resources::{FallbackTextures, Mesh};
use crate::scene::{Camera, Entity, EntityIndex, Light, Scene};

/// Which shading pipeline renders the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineMode {
    Forward,
    #[default]
    Deferred,
}

/// How the forward pipeline applies lights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightingMode {
    /// All lights packed into uniform arrays, one draw per unit
    #[default]
    SinglePass,
    /// One additive draw per light
    MultiPass,
}

/// What ends up on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Final,
    /// Albedo only
    Texture,
    Normal,
    /// Material occlusion texture
    Occlusion,
    Uvs,
    Depth,
    /// Albedo, normal, material and depth in four quadrants
    GBuffers,
    Ssao,
    /// Indirect diffuse from the irradiance grid only
    Irradiance,
}

impl RenderMode {
    /// Name of the per-unit debug shader used by the forward path
    pub fn forward_debug_shader(&self) -> Option<&'static str> {
        use crate::resources::shaders;
        match self {
            RenderMode::Texture => Some(shaders::SHOW_TEXTURE),
            RenderMode::Normal => Some(shaders::SHOW_NORMAL),
            RenderMode::Occlusion => Some(shaders::SHOW_OCCLUSION),
            RenderMode::Uvs => Some(shaders::SHOW_UVS),
            RenderMode::Depth => Some(shaders::SHOW_DEPTH),
            _ => None,
        }
    }
}

/// Device resources shared by every pass
#[derive(Debug, Clone, Copy)]
pub struct SharedResources {
    pub fallback: FallbackTextures,
    /// Unit sphere used as point/spot light volume
    pub light_sphere: MeshHandle,
    /// Cube spanning -1..1, used for decals and the skybox
    pub unit_cube: MeshHandle,
}

impl SharedResources {
    pub fn create<B: GraphicsBackend>(backend: &mut B) -> BackendResult<Self> {
        let sphere = Mesh::sphere(1.0, 20, 12);
        let cube = Mesh::cube(2.0);
        Ok(Self {
            fallback: FallbackTextures::create(backend)?,
            light_sphere: backend.upload_mesh(&sphere.vertices, &sphere.indices)?,
            unit_cube: backend.upload_mesh(&cube.vertices, &cube.indices)?,
        })
    }
}

/// What to draw and from where
#[derive(Clone, Copy)]
pub struct SceneView<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    /// Sorted draw units
    pub calls: &'a [RenderCall],
    /// Visible light entities
    pub lights: &'a [EntityIndex],
}

impl<'a> SceneView<'a> {
    /// Visible lights with their entity and model matrix
    pub fn lights(&self) -> impl Iterator<Item = (&'a Entity, &'a Light, Mat4)> + 'a {
        let entities = &self.scene.entities;
        self.lights.iter().filter_map(move |&index| {
            let entity = entities.get(index)?;
            entity.as_light().map(|light| (entity, light, entity.model()))
        })
    }
}

/// Result of one render routine
pub type PassResult = BackendResult<u32>;
