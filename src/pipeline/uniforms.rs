//! Shared shader binding helpers

use glam::{Mat4, Vec2};

use crate::backend::*;
use crate::resources::{AlphaMode, FallbackTextures, Material};
use crate::scene::Camera;

pub const SLOT_COLOR: u32 = 0;
pub const SLOT_METALLIC_ROUGHNESS: u32 = 1;
pub const SLOT_EMISSIVE: u32 = 2;
pub const SLOT_OCCLUSION: u32 = 3;
pub const SLOT_NORMAL: u32 = 4;

/// Enable a shader by name. `Ok(None)` means the device does not have it and
/// the caller should skip its pass.
pub fn use_shader<B: GraphicsBackend>(
    backend: &mut B,
    name: &str,
) -> BackendResult<Option<ShaderHandle>> {
    match backend.shader(name) {
        Some(shader) => {
            backend.enable_shader(shader)?;
            Ok(Some(shader))
        }
        None => {
            log::warn!("Shader '{}' not found, skipping pass", name);
            Ok(None)
        }
    }
}

pub fn set_camera_uniforms<B: GraphicsBackend>(backend: &mut B, camera: &Camera) {
    backend.set_uniform("u_viewprojection", camera.view_projection_matrix());
    backend.set_uniform("u_camera_position", camera.eye());
    backend.set_uniform("u_camera_nearfar", Vec2::new(camera.near(), camera.far()));
}

/// Uniforms needed by full-screen passes that reconstruct world position from depth
pub fn set_screen_uniforms<B: GraphicsBackend>(
    backend: &mut B,
    camera: &Camera,
    width: u32,
    height: u32,
) {
    set_camera_uniforms(backend, camera);
    backend.set_uniform("u_inverse_viewprojection", camera.inverse_view_projection_matrix());
    backend.set_uniform(
        "u_iRes",
        Vec2::new(1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32),
    );
}

/// Bind material factors and textures.
///
/// Absent color, metallic-roughness, emissive and occlusion textures are
/// replaced by the white fallback. An absent normal map turns normal mapping
/// off instead.
pub fn bind_material<B: GraphicsBackend>(
    backend: &mut B,
    material: &Material,
    fallback: &FallbackTextures,
) {
    backend.set_uniform("u_color", material.color);
    backend.set_uniform("u_emissive_factor", material.emissive_factor);
    backend.set_uniform("u_metallic_factor", material.metallic_factor);
    backend.set_uniform("u_roughness_factor", material.roughness_factor);
    backend.set_uniform("u_tiling", material.tiling);

    backend.set_texture("u_texture", fallback.white_or(material.color_texture), SLOT_COLOR);
    backend.set_texture(
        "u_metallic_roughness_texture",
        fallback.white_or(material.metallic_roughness_texture),
        SLOT_METALLIC_ROUGHNESS,
    );
    backend.set_texture(
        "u_emissive_texture",
        fallback.white_or(material.emissive_texture),
        SLOT_EMISSIVE,
    );
    backend.set_texture(
        "u_occlusion_texture",
        fallback.white_or(material.occlusion_texture),
        SLOT_OCCLUSION,
    );
    match material.normal_texture {
        Some(normal) => {
            backend.set_uniform("u_read_normal", true);
            backend.set_texture("u_normal_texture", normal, SLOT_NORMAL);
        }
        None => backend.set_uniform("u_read_normal", false),
    }

    let cutoff = match material.alpha_mode {
        AlphaMode::Mask => material.alpha_cutoff,
        _ => 0.0,
    };
    backend.set_uniform("u_alpha_cutoff", cutoff);
}

/// Render state for drawing `material` on top of `base`
pub fn material_state(material: &Material, base: RenderState) -> RenderState {
    let mut state = base;
    state.blend = match material.alpha_mode {
        AlphaMode::Blend => Some(BlendState::alpha_blending()),
        AlphaMode::Opaque | AlphaMode::Mask => None,
    };
    state.cull_mode = if material.two_sided {
        CullMode::None
    } else {
        CullMode::Back
    };
    state
}

/// State for full-screen passes: no depth, no culling, optional blending
pub fn screen_pass_state(blend: Option<BlendState>) -> RenderState {
    RenderState {
        depth_test: false,
        depth_write: false,
        blend,
        cull_mode: CullMode::None,
        ..RenderState::default()
    }
}

pub fn set_model_uniform<B: GraphicsBackend>(backend: &mut B, model: &Mat4) {
    backend.set_uniform("u_model", *model);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_state() {
        let base = RenderState::default();
        let blended = material_state(&Material::glass().with_two_sided(true), base);
        assert_eq!(blended.blend, Some(BlendState::alpha_blending()));
        assert_eq!(blended.cull_mode, CullMode::None);

        let opaque = material_state(&Material::new("plain"), base);
        assert_eq!(opaque.blend, None);
        assert_eq!(opaque.cull_mode, CullMode::Back);
    }
}
