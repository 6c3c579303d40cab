//! Forward shading
//!
//! Draws every unit straight into the bound target with lighting computed per
//! fragment. Lights are either packed into uniform arrays for one draw
//! (single-pass) or applied one additive draw at a time (multi-pass).

use glam::{Mat4, Vec3};

use super::uniforms::{bind_material, material_state, set_camera_uniforms, set_model_uniform, use_shader};
use super::{LightingMode, PassResult, RenderMode, SceneView, SharedResources};
use crate::backend::*;
use crate::resources::{shaders, Material};
use crate::scene::{Light, LightType, SHADOW_MAP_SLOT};

/// Forward pass settings
#[derive(Debug, Clone, Copy)]
pub struct ForwardOptions {
    /// Clear color and depth to the scene background first
    pub clear: bool,
    pub skybox: bool,
    /// Draw only alpha-blended units
    pub blended_only: bool,
    pub lighting: LightingMode,
    pub render_mode: RenderMode,
    /// Cap on lights packed in single-pass mode
    pub max_lights: usize,
    pub shadows: bool,
}

impl Default for ForwardOptions {
    fn default() -> Self {
        Self {
            clear: true,
            skybox: true,
            blended_only: false,
            lighting: LightingMode::SinglePass,
            render_mode: RenderMode::Final,
            max_lights: 5,
            shadows: true,
        }
    }
}

/// Forward renderer
pub struct ForwardPass {
    pub options: ForwardOptions,
}

impl ForwardPass {
    pub fn new(options: ForwardOptions) -> Self {
        Self { options }
    }

    /// Render `view` into whatever target is bound
    pub fn execute<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        view: &SceneView,
        shared: &SharedResources,
    ) -> PassResult {
        let mut gpu = StateGuard::new(backend);
        let mut draws = 0;

        if self.options.clear {
            gpu.clear(ClearValue::color_and_depth(view.scene.background_color.to_array()));
        }
        if self.options.skybox {
            draws += render_skybox(&mut *gpu, view, shared, None)?;
        }

        let debug = self.options.render_mode.forward_debug_shader();
        let shader = match (debug, self.options.lighting) {
            (Some(name), _) => name,
            (None, LightingMode::SinglePass) => shaders::FORWARD_SINGLE,
            (None, LightingMode::MultiPass) => shaders::FORWARD_MULTI,
        };
        if use_shader(&mut *gpu, shader)?.is_none() {
            return Ok(draws);
        }
        set_camera_uniforms(&mut *gpu, view.camera);

        if debug.is_none() && self.options.lighting == LightingMode::SinglePass {
            self.bind_light_arrays(&mut *gpu, view);
        }

        for call in view.calls {
            if self.options.blended_only && !call.is_blended() {
                continue;
            }
            let (Some(mesh), Some(material)) = (
                view.scene.assets.mesh(call.mesh),
                view.scene.assets.material(call.material),
            ) else {
                log::warn!("Render call references a missing mesh or material");
                continue;
            };
            let Some(handle) = mesh.handle else {
                continue;
            };

            gpu.set_render_state(material_state(material, RenderState::default()));
            set_model_uniform(&mut *gpu, &call.model);
            bind_material(&mut *gpu, material, &shared.fallback);

            draws += match (debug, self.options.lighting) {
                (Some(_), _) | (None, LightingMode::SinglePass) => {
                    gpu.set_uniform("u_ambient_light", view.scene.ambient_light);
                    gpu.draw_mesh(handle)?;
                    1
                }
                (None, LightingMode::MultiPass) => {
                    self.draw_multi_pass(&mut *gpu, view, material, handle)?
                }
            };
        }

        gpu.disable_shader();
        gpu.check_errors()?;
        Ok(draws)
    }

    /// Pack up to `max_lights` lights into uniform arrays
    fn bind_light_arrays<B: GraphicsBackend>(&self, backend: &mut B, view: &SceneView) {
        let mut positions = Vec::new();
        let mut colors = Vec::new();
        let mut types = Vec::new();
        let mut max_distances = Vec::new();
        let mut factors = Vec::new();
        let mut directions = Vec::new();
        let mut cutoffs = Vec::new();
        let mut exponents = Vec::new();
        let mut shadow_light = -1;

        for (i, (_, light, model)) in view.lights().take(self.options.max_lights).enumerate() {
            positions.push(model.transform_point3(Vec3::ZERO));
            colors.push(light.color);
            types.push(light.light_type as i32);
            max_distances.push(light.max_distance);
            factors.push(light.intensity);
            directions.push(match light.light_type {
                LightType::Point => Vec3::ZERO,
                _ => -Light::direction(&model),
            });
            cutoffs.push(light.cone_angle.to_radians().cos());
            exponents.push(light.cone_exponent);

            if shadow_light < 0 && self.options.shadows && light.casts_shadows() {
                if let Some(map) = light.shadow_map() {
                    shadow_light = i as i32;
                    backend.set_texture("shadowmap", map, SHADOW_MAP_SLOT);
                    backend.set_uniform(
                        "u_shadow_viewproj",
                        light.shadow.camera.view_projection_matrix(),
                    );
                    backend.set_uniform("u_shadow_bias", light.shadow_bias);
                }
            }
        }

        backend.set_uniform("u_num_lights", positions.len() as i32);
        backend.set_uniform("u_light_position", positions);
        backend.set_uniform("u_light_color", colors);
        backend.set_uniform("u_light_type", types);
        backend.set_uniform("u_maxdist", max_distances);
        backend.set_uniform("u_light_factor", factors);
        backend.set_uniform("u_direction", directions);
        backend.set_uniform("u_spotCosineCutoff", cutoffs);
        backend.set_uniform("u_spotExponent", exponents);
        backend.set_uniform("u_shadow_light", shadow_light);
    }

    /// One draw per light. The first uses the material's blend mode; the rest
    /// add on top with ambient and emissive zeroed so they are counted once.
    fn draw_multi_pass<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        view: &SceneView,
        material: &Material,
        mesh: MeshHandle,
    ) -> BackendResult<u32> {
        let base = backend.render_state();
        backend.set_uniform("u_ambient_light", view.scene.ambient_light);

        let mut draws = 0;
        for (i, (_, light, model)) in view.lights().enumerate() {
            if i > 0 {
                let mut state = base;
                state.blend = Some(BlendState::additive_alpha());
                state.depth_func = CompareFunction::LessEqual;
                backend.set_render_state(state);
                backend.set_uniform("u_ambient_light", Vec3::ZERO);
                backend.set_uniform("u_emissive_factor", Vec3::ZERO);
            }
            backend.set_uniform("u_light_enabled", true);
            light.set_uniforms(backend, &model, self.options.shadows);
            backend.draw_mesh(mesh)?;
            draws += 1;
        }

        if draws == 0 {
            backend.set_uniform("u_light_enabled", false);
            backend.draw_mesh(mesh)?;
            draws = 1;
        }

        backend.set_render_state(base);
        backend.set_uniform("u_emissive_factor", material.emissive_factor);
        Ok(draws)
    }
}

/// Draw the environment cubemap around the camera.
///
/// Without `depth` the sky is drawn first and opaque geometry overwrites it.
/// With the scene depth bound, the cube is projected onto the far plane and
/// depth-tested with `LessEqual`, so only pixels no geometry covered receive
/// the sky.
pub fn render_skybox<B: GraphicsBackend>(
    backend: &mut B,
    view: &SceneView,
    shared: &SharedResources,
    depth: Option<TextureHandle>,
) -> BackendResult<u32> {
    let Some(environment) = view.scene.environment else {
        return Ok(0);
    };
    if use_shader(backend, shaders::SKYBOX)?.is_none() {
        return Ok(0);
    }

    let mut gpu = StateGuard::new(backend);
    let mut state = RenderState {
        depth_test: false,
        depth_write: false,
        cull_mode: CullMode::None,
        blend: None,
        ..RenderState::default()
    };
    if let Some(depth) = depth {
        state.depth_test = true;
        state.depth_func = CompareFunction::LessEqual;
        gpu.set_texture("u_depth_texture", depth, 1);
    }
    gpu.set_render_state(state);
    gpu.set_uniform("u_far_plane", depth.is_some());

    set_camera_uniforms(&mut *gpu, view.camera);
    let model = Mat4::from_translation(view.camera.eye())
        * Mat4::from_scale(Vec3::splat(view.camera.near() * 10.0));
    set_model_uniform(&mut *gpu, &model);
    gpu.set_texture("u_environment", environment, 0);
    gpu.draw_mesh(shared.unit_cube)?;
    gpu.disable_shader();
    Ok(1)
}
