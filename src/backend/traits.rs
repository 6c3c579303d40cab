//! Core device abstraction
//!
//! The renderer drives the device in immediate mode: bind a target, set global
//! render state, enable a named shader, push uniforms, draw. Every pipeline
//! stage is written against [`GraphicsBackend`] only.

use crate::backend::types::*;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Failed to create texture: {0}")]
    TextureCreationFailed(String),
    #[error("Failed to create framebuffer: {0}")]
    FramebufferCreationFailed(String),
    #[error("Failed to upload mesh: {0}")]
    MeshUploadFailed(String),
    #[error("Invalid {0} handle")]
    InvalidHandle(&'static str),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("No shader is enabled")]
    NoShaderBound,
    #[error("Readback failed: {0}")]
    ReadbackFailed(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

slotmap::new_key_type! {
    /// Handle to a GPU texture (2D or cubemap)
    pub struct TextureHandle;
    /// Handle to an offscreen framebuffer
    pub struct FramebufferHandle;
    /// Handle to uploaded vertex/index data
    pub struct MeshHandle;
    /// Handle to a linked shader program
    pub struct ShaderHandle;
}

/// Immediate-mode graphics device.
///
/// Render state is global: anything set through [`GraphicsBackend::set_render_state`]
/// stays in effect until changed. Passes use
/// [`StateGuard`](crate::backend::StateGuard) to put it back.
pub trait GraphicsBackend {
    /// Get the backend name
    fn name(&self) -> &'static str;

    /// Size of the default framebuffer
    fn surface_size(&self) -> (u32, u32);

    /// Handle window resize
    fn resize(&mut self, width: u32, height: u32);

    // Textures

    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> BackendResult<TextureHandle>;

    /// Upload the full base level. Cubemaps expect six faces back to back.
    fn write_texture(&mut self, texture: TextureHandle, data: &[u8]) -> BackendResult<()>;

    fn generate_mipmaps(&mut self, texture: TextureHandle) -> BackendResult<()>;

    fn copy_texture(&mut self, src: TextureHandle, dst: TextureHandle) -> BackendResult<()>;

    fn texture_descriptor(&self, texture: TextureHandle) -> Option<&TextureDescriptor>;

    fn destroy_texture(&mut self, texture: TextureHandle);

    // Meshes

    fn upload_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> BackendResult<MeshHandle>;

    fn destroy_mesh(&mut self, mesh: MeshHandle);

    // Framebuffers

    /// Create a framebuffer and its attachment textures
    fn create_framebuffer(
        &mut self,
        descriptor: &FramebufferDescriptor,
    ) -> BackendResult<FramebufferHandle>;

    /// Destroy a framebuffer and the attachment textures it created
    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle);

    fn framebuffer_color(&self, framebuffer: FramebufferHandle, index: usize)
        -> Option<TextureHandle>;

    fn framebuffer_depth(&self, framebuffer: FramebufferHandle) -> Option<TextureHandle>;

    /// Bind an offscreen target, or the default framebuffer when `None`.
    /// All color attachments become draw buffers.
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) -> BackendResult<()>;

    /// Bind `framebuffer` with one face of `cubemap` as its only color target
    fn bind_cubemap_face(
        &mut self,
        framebuffer: FramebufferHandle,
        cubemap: TextureHandle,
        face: u32,
    ) -> BackendResult<()>;

    /// Restrict output to the given color attachments of the bound framebuffer
    fn set_draw_buffers(&mut self, buffers: &[u32]) -> BackendResult<()>;

    fn set_viewport(&mut self, viewport: Viewport);

    fn clear(&mut self, value: ClearValue);

    /// Copy depth from `src` into `dst` (default framebuffer when `None`)
    fn blit_depth(
        &mut self,
        src: FramebufferHandle,
        dst: Option<FramebufferHandle>,
    ) -> BackendResult<()>;

    /// Read a color attachment back as tightly packed RGB floats.
    /// Blocks until the device has finished writing it.
    fn read_pixels_rgb_f32(
        &mut self,
        framebuffer: FramebufferHandle,
        attachment: usize,
    ) -> BackendResult<Vec<f32>>;

    // Shaders

    /// Look up a shader program by name
    fn shader(&self, name: &str) -> Option<ShaderHandle>;

    fn enable_shader(&mut self, shader: ShaderHandle) -> BackendResult<()>;

    fn disable_shader(&mut self);

    fn set_uniform_value(&mut self, name: &str, value: UniformValue);

    fn set_uniform<V: Into<UniformValue>>(&mut self, name: &str, value: V)
    where
        Self: Sized,
    {
        self.set_uniform_value(name, value.into());
    }

    fn set_texture(&mut self, name: &str, texture: TextureHandle, slot: u32) {
        self.set_uniform_value(name, UniformValue::Texture { texture, slot });
    }

    // Render state

    fn render_state(&self) -> RenderState;

    fn set_render_state(&mut self, state: RenderState);

    fn set_depth_test(&mut self, enabled: bool) {
        let mut state = self.render_state();
        state.depth_test = enabled;
        self.set_render_state(state);
    }

    fn set_depth_write(&mut self, enabled: bool) {
        let mut state = self.render_state();
        state.depth_write = enabled;
        self.set_render_state(state);
    }

    fn set_depth_func(&mut self, func: CompareFunction) {
        let mut state = self.render_state();
        state.depth_func = func;
        self.set_render_state(state);
    }

    fn set_blend(&mut self, blend: Option<BlendState>) {
        let mut state = self.render_state();
        state.blend = blend;
        self.set_render_state(state);
    }

    fn set_cull_mode(&mut self, cull_mode: CullMode) {
        let mut state = self.render_state();
        state.cull_mode = cull_mode;
        self.set_render_state(state);
    }

    fn set_front_face(&mut self, front_face: FrontFace) {
        let mut state = self.render_state();
        state.front_face = front_face;
        self.set_render_state(state);
    }

    fn set_color_writes(&mut self, writes: ColorWrites) {
        let mut state = self.render_state();
        state.color_writes = writes;
        self.set_render_state(state);
    }

    // Drawing

    fn draw_mesh(&mut self, mesh: MeshHandle) -> BackendResult<()>;

    /// Draw a quad covering the whole viewport
    fn draw_fullscreen_quad(&mut self) -> BackendResult<()>;

    /// Post-call error check. Returns the first error raised since the last call.
    fn check_errors(&mut self) -> BackendResult<()>;
}
