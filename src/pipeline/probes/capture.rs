//! Rendering the scene around a point into six cube faces

use glam::Vec3;
use image::Rgb32FImage;

use crate::backend::*;
use crate::error::RenderError;
use crate::pipeline::collector::{collect_render_calls, sort_render_calls};
use crate::pipeline::{ForwardOptions, ForwardPass, SceneView, SharedResources};
use crate::scene::{Camera, EntityIndex, Scene};

/// View direction and up vector of each face, +X, -X, +Y, -Y, +Z, -Z
pub const CUBE_FACES: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Y),
    (Vec3::NEG_X, Vec3::NEG_Y),
    (Vec3::Y, Vec3::Z),
    (Vec3::NEG_Y, Vec3::NEG_Z),
    (Vec3::Z, Vec3::NEG_Y),
    (Vec3::NEG_Z, Vec3::NEG_Y),
];

/// 90° square camera looking through `face`
pub fn face_camera(position: Vec3, face: usize, near: f32, far: f32) -> Camera {
    let (dir, up) = CUBE_FACES[face % 6];
    let mut camera = Camera::default();
    camera.look_at(position, position + dir, up);
    camera.set_perspective(90.0, 1.0, near, far);
    camera
}

/// Draws the scene once per cube face
pub struct FaceRenderer<'a> {
    pub scene: &'a Scene,
    pub shared: &'a SharedResources,
    pub options: ForwardOptions,
    pub near: f32,
    pub far: f32,
}

impl FaceRenderer<'_> {
    fn visible_lights(&self) -> Vec<EntityIndex> {
        self.scene
            .entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.visible && e.as_light().is_some())
            .map(|(i, _)| i)
            .collect()
    }

    /// Render one face into the currently bound target
    pub fn render_face<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        position: Vec3,
        face: usize,
    ) -> BackendResult<u32> {
        let camera = face_camera(position, face, self.near, self.far);
        let mut calls = Vec::new();
        collect_render_calls(&mut calls, &self.scene.entities, &self.scene.assets, &camera);
        sort_render_calls(&mut calls);
        let lights = self.visible_lights();

        let view = SceneView {
            scene: self.scene,
            camera: &camera,
            calls: &calls,
            lights: &lights,
        };
        ForwardPass::new(self.options).execute(backend, &view, self.shared)
    }

    /// Render all faces through a 2D target and read each back as float RGB
    pub fn capture<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        target: FramebufferHandle,
        size: u32,
        position: Vec3,
    ) -> Result<[Rgb32FImage; 6], RenderError> {
        let mut faces: [Rgb32FImage; 6] = Default::default();
        for (face, slot) in faces.iter_mut().enumerate() {
            backend.bind_framebuffer(Some(target))?;
            backend.set_viewport(Viewport::full(size, size));
            self.render_face(backend, position, face)?;
            let pixels = backend.read_pixels_rgb_f32(target, 0)?;
            *slot = Rgb32FImage::from_raw(size, size, pixels).ok_or_else(|| {
                BackendError::ReadbackFailed(format!("face {} has the wrong size", face))
            })?;
        }
        backend.bind_framebuffer(None)?;
        Ok(faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_face_cameras_look_along_axes() {
        for (face, (dir, _)) in CUBE_FACES.iter().enumerate() {
            let camera = face_camera(Vec3::new(1.0, 2.0, 3.0), face, 0.1, 100.0);
            let forward = camera.forward();
            assert_relative_eq!(forward.dot(*dir), 1.0, epsilon = 1e-5);
        }
    }
}
