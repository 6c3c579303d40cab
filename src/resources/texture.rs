//! Texture data and the fallback textures

use crate::backend::traits::*;
use crate::backend::types::*;
use image::RgbaImage;

/// CPU-side texture data ready for upload
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: Vec<u8>,
    pub name: String,
}

impl TextureData {
    /// Wrap an already decoded image
    pub fn from_image(image: RgbaImage, name: &str) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            format: TextureFormat::Rgba8UnormSrgb,
            data: image.into_raw(),
            name: name.to_string(),
        }
    }

    /// Create a 1x1 solid color texture
    pub fn solid_color(color: [u8; 4], name: &str) -> Self {
        Self {
            width: 1,
            height: 1,
            format: TextureFormat::Rgba8Unorm,
            data: color.to_vec(),
            name: name.to_string(),
        }
    }

    pub fn white() -> Self {
        Self::solid_color([255, 255, 255, 255], "white")
    }

    pub fn black() -> Self {
        Self::solid_color([0, 0, 0, 255], "black")
    }

    pub fn descriptor(&self) -> TextureDescriptor {
        TextureDescriptor {
            label: Some(self.name.clone()),
            width: self.width,
            height: self.height,
            format: self.format,
            ..Default::default()
        }
    }

    pub fn upload<B: GraphicsBackend>(&self, backend: &mut B) -> BackendResult<TextureHandle> {
        let handle = backend.create_texture(&self.descriptor())?;
        backend.write_texture(handle, &self.data)?;
        Ok(handle)
    }
}

/// Constant textures bound in place of absent material slots
#[derive(Debug, Clone, Copy)]
pub struct FallbackTextures {
    pub white: TextureHandle,
    pub black: TextureHandle,
}

impl FallbackTextures {
    pub fn create<B: GraphicsBackend>(backend: &mut B) -> BackendResult<Self> {
        Ok(Self {
            white: TextureData::white().upload(backend)?,
            black: TextureData::black().upload(backend)?,
        })
    }

    /// The texture to bind for an optional slot
    pub fn white_or(&self, texture: Option<TextureHandle>) -> TextureHandle {
        texture.unwrap_or(self.white)
    }
}
