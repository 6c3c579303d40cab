//! Specular reflection probes

use glam::Vec3;

use super::capture::FaceRenderer;
use crate::backend::*;

/// An environment cubemap captured at a point
#[derive(Debug, Clone)]
pub struct ReflectionProbe {
    pub position: Vec3,
    pub size: u32,
    /// Cubemap with a full mip chain, allocated on first bake
    pub cubemap: Option<TextureHandle>,
}

impl ReflectionProbe {
    pub fn new(position: Vec3, size: u32) -> Self {
        Self {
            position,
            size,
            cubemap: None,
        }
    }

    fn allocate<B: GraphicsBackend>(&mut self, backend: &mut B) -> BackendResult<TextureHandle> {
        if let Some(cubemap) = self.cubemap {
            return Ok(cubemap);
        }
        let cubemap = backend.create_texture(&TextureDescriptor {
            label: Some("reflection_probe".to_string()),
            width: self.size,
            height: self.size,
            dimension: TextureDimension::Cube,
            mip_levels: self.size.max(1).ilog2() + 1,
            format: TextureFormat::Rgba16Float,
            usage: TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
            filter: FilterMode::Linear,
        })?;
        self.cubemap = Some(cubemap);
        Ok(cubemap)
    }

    /// Render the six faces straight into the cubemap and rebuild its mips.
    /// `target` supplies the depth buffer and must match the probe size.
    pub fn bake<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        faces: &FaceRenderer,
        target: FramebufferHandle,
    ) -> BackendResult<u32> {
        let cubemap = self.allocate(backend)?;
        let mut draws = 0;
        for face in 0..6 {
            backend.bind_cubemap_face(target, cubemap, face as u32)?;
            backend.set_viewport(Viewport::full(self.size, self.size));
            draws += faces.render_face(backend, self.position, face)?;
        }
        backend.bind_framebuffer(None)?;
        backend.generate_mipmaps(cubemap)?;
        Ok(draws)
    }

    pub fn destroy<B: GraphicsBackend>(&mut self, backend: &mut B) {
        if let Some(cubemap) = self.cubemap.take() {
            backend.destroy_texture(cubemap);
        }
    }
}
