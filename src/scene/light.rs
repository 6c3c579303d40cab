//! Light definitions

use glam::{Mat4, Vec3};

use super::camera::Camera;
use crate::backend::{FramebufferHandle, GraphicsBackend, TextureHandle};
use crate::pipeline::shadow::ShadowConfig;

/// Texture slot the shadow map is bound to
pub const SHADOW_MAP_SLOT: u32 = 5;

/// Light type, with the integer the shaders switch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Point = 0,
    Spot = 1,
    Directional = 2,
}

/// Per-light shadow resources. Never shared between lights.
#[derive(Debug, Clone, Default)]
pub struct ShadowCaster {
    pub camera: Camera,
    /// Depth-only target, allocated on first use
    pub target: Option<FramebufferHandle>,
    /// Depth texture of the last rendered shadow pass
    pub map: Option<TextureHandle>,
}

/// A light entity's payload
#[derive(Debug, Clone)]
pub struct Light {
    pub light_type: LightType,
    pub color: Vec3,
    pub intensity: f32,
    pub max_distance: f32,
    /// Half angle of the spot cone in degrees
    pub cone_angle: f32,
    pub cone_exponent: f32,
    /// Half extent of the directional shadow volume
    pub area_size: f32,
    pub cast_shadows: bool,
    pub shadow_bias: f32,
    pub shadow: ShadowCaster,
}

impl Light {
    fn new(light_type: LightType, color: Vec3, intensity: f32) -> Self {
        Self {
            light_type,
            color,
            intensity,
            max_distance: 100.0,
            cone_angle: 45.0,
            cone_exponent: 1.0,
            area_size: 1000.0,
            cast_shadows: false,
            shadow_bias: 0.001,
            shadow: ShadowCaster::default(),
        }
    }

    pub fn point(color: Vec3, intensity: f32, max_distance: f32) -> Self {
        Self {
            max_distance,
            ..Self::new(LightType::Point, color, intensity)
        }
    }

    pub fn spot(color: Vec3, intensity: f32, max_distance: f32, cone_angle: f32) -> Self {
        Self {
            max_distance,
            cone_angle,
            ..Self::new(LightType::Spot, color, intensity)
        }
    }

    pub fn directional(color: Vec3, intensity: f32, area_size: f32) -> Self {
        Self {
            area_size,
            ..Self::new(LightType::Directional, color, intensity)
        }
    }

    pub fn with_shadows(mut self, cast_shadows: bool) -> Self {
        self.cast_shadows = cast_shadows;
        self
    }

    pub fn with_bias(mut self, bias: f32) -> Self {
        self.shadow_bias = bias;
        self
    }

    pub fn with_cone_exponent(mut self, exponent: f32) -> Self {
        self.cone_exponent = exponent;
        self
    }

    /// Point lights never cast shadows
    pub fn casts_shadows(&self) -> bool {
        self.cast_shadows && self.light_type != LightType::Point
    }

    /// Direction light travels in, from the model's local +Z
    pub fn direction(model: &Mat4) -> Vec3 {
        model.transform_vector3(Vec3::Z).normalize_or_zero()
    }

    pub fn shadow_camera(&self) -> Option<&Camera> {
        match self.light_type {
            LightType::Point => None,
            _ => Some(&self.shadow.camera),
        }
    }

    pub fn shadow_map(&self) -> Option<TextureHandle> {
        self.shadow.map
    }

    /// Re-orient the shadow camera to the light's current transform
    pub fn update_shadow_camera(&mut self, model: &Mat4, config: &ShadowConfig) {
        let eye = model.transform_point3(Vec3::ZERO);
        let front = Self::direction(model);
        let up = if front.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let camera = &mut self.shadow.camera;
        match self.light_type {
            LightType::Point => {}
            LightType::Spot => {
                camera.look_at(eye, eye + front, up);
                camera.set_perspective(
                    (self.cone_angle * 2.0).clamp(1.0, 179.0),
                    1.0,
                    config.spot_near,
                    self.max_distance,
                );
            }
            LightType::Directional => {
                camera.look_at(eye, eye + front, up);
                let a = self.area_size;
                camera.set_orthographic(-a, a, -a, a, config.directional_near, config.directional_far);
            }
        }
    }

    /// Bind this light's parameters for a single-light shading pass
    pub fn set_uniforms<B: GraphicsBackend>(&self, backend: &mut B, model: &Mat4, shadows: bool) {
        let has_shadow = shadows && self.casts_shadows() && self.shadow.map.is_some();
        backend.set_uniform("u_light_cast_shadows", has_shadow);
        if let (true, Some(map)) = (has_shadow, self.shadow.map) {
            backend.set_texture("shadowmap", map, SHADOW_MAP_SLOT);
            backend.set_uniform(
                "u_shadow_viewproj",
                self.shadow.camera.view_projection_matrix(),
            );
            backend.set_uniform("u_shadow_bias", self.shadow_bias);
        }

        backend.set_uniform("u_light_color", self.color);
        backend.set_uniform("u_light_type", self.light_type as i32);
        backend.set_uniform("u_light_position", model.transform_point3(Vec3::ZERO));
        backend.set_uniform("u_maxdist", self.max_distance);
        backend.set_uniform("u_light_factor", self.intensity);
        let to_light = match self.light_type {
            LightType::Point => Vec3::ZERO,
            _ => -Self::direction(model),
        };
        backend.set_uniform("u_direction", to_light);
        backend.set_uniform("u_spotCosineCutoff", self.cone_angle.to_radians().cos());
        backend.set_uniform("u_spotExponent", self.cone_exponent);
    }
}
