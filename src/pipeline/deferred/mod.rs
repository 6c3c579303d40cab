//! Deferred shading
//!
//! Geometry is rasterized once into the G-buffer. Decals are blended into it,
//! then lighting is accumulated in screen space into the illumination target:
//! one ambient/indirect full-screen pass followed by one additive pass per
//! light. An optional reflection overlay samples the nearest reflection probe.

mod debug_view;
mod decal_pass;
mod gbuffer_pass;
mod lighting_pass;
mod reflection_pass;

pub use debug_view::DebugView;
pub use decal_pass::DecalPass;
pub use gbuffer_pass::GBufferPass;
pub use lighting_pass::LightingPass;
pub use reflection_pass::ReflectionPass;

use crate::backend::*;
use crate::scene::Camera;
use crate::targets::{FrameTargets, GBUFFER_ALBEDO, GBUFFER_MATERIAL, GBUFFER_NORMAL};

use super::uniforms::set_screen_uniforms;

pub const SLOT_GBUFFER_COLOR: u32 = 0;
pub const SLOT_GBUFFER_NORMAL: u32 = 1;
pub const SLOT_GBUFFER_EXTRA: u32 = 2;
pub const SLOT_GBUFFER_DEPTH: u32 = 3;

/// Bind the G-buffer and the camera data needed to reconstruct world
/// position for the enabled shader
pub fn bind_gbuffer<B: GraphicsBackend>(
    backend: &mut B,
    targets: &FrameTargets,
    camera: &Camera,
) -> BackendResult<()> {
    let albedo = targets.gbuffer_texture(backend, GBUFFER_ALBEDO)?;
    let normal = targets.gbuffer_texture(backend, GBUFFER_NORMAL)?;
    let extra = targets.gbuffer_texture(backend, GBUFFER_MATERIAL)?;
    let depth = targets.gbuffer_depth(backend)?;

    backend.set_texture("u_color_texture", albedo, SLOT_GBUFFER_COLOR);
    backend.set_texture("u_normal_texture", normal, SLOT_GBUFFER_NORMAL);
    backend.set_texture("u_extra_texture", extra, SLOT_GBUFFER_EXTRA);
    backend.set_texture("u_depth_texture", depth, SLOT_GBUFFER_DEPTH);
    set_screen_uniforms(backend, camera, targets.width, targets.height);
    Ok(())
}

