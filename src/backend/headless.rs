//! Headless device for tests and offline tooling.
//!
//! Nothing is rasterized. Resources live in slotmaps, render state is tracked
//! exactly like a real device would track it, and every clear and draw is
//! recorded together with the bound shader, its uniforms, the target and the
//! render state at the time of the call. Attachments remember their last clear
//! value and how many draws touched them, so readbacks are deterministic.

use std::collections::HashMap;

use slotmap::SlotMap;

use super::traits::*;
use super::types::*;
use crate::resources::shaders;

/// Contents model of a texture
#[derive(Debug, Clone)]
pub struct HeadlessTexture {
    pub descriptor: TextureDescriptor,
    /// Value of the last clear (depth is stored in the first channel)
    pub clear_value: [f32; 4],
    /// Draws that wrote to this texture since the last clear
    pub draw_count: u32,
    pub data: Option<Vec<u8>>,
    pub mipmaps_generated: bool,
}

impl HeadlessTexture {
    fn new(descriptor: TextureDescriptor) -> Self {
        Self {
            descriptor,
            clear_value: [0.0; 4],
            draw_count: 0,
            data: None,
            mipmaps_generated: false,
        }
    }

    pub fn is_written(&self) -> bool {
        self.draw_count > 0
    }
}

#[derive(Debug, Clone)]
struct HeadlessMesh {
    vertex_count: usize,
    index_count: usize,
}

#[derive(Debug, Clone)]
struct HeadlessFramebuffer {
    descriptor: FramebufferDescriptor,
    colors: Vec<TextureHandle>,
    depth: Option<TextureHandle>,
}

/// Where output of a clear or draw went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    Screen,
    Framebuffer(FramebufferHandle),
    CubeFace {
        framebuffer: FramebufferHandle,
        cubemap: TextureHandle,
        face: u32,
    },
}

/// One recorded draw call
#[derive(Debug, Clone)]
pub struct DrawRecord {
    pub shader: String,
    pub target: RenderTarget,
    pub draw_buffers: Vec<u32>,
    pub state: RenderState,
    pub viewport: Viewport,
    /// `None` for a full-screen quad
    pub mesh: Option<MeshHandle>,
    pub uniforms: HashMap<String, UniformValue>,
}

impl DrawRecord {
    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    pub fn is_fullscreen(&self) -> bool {
        self.mesh.is_none()
    }
}

/// One recorded clear
#[derive(Debug, Clone)]
pub struct ClearRecord {
    pub target: RenderTarget,
    pub draw_buffers: Vec<u32>,
    pub value: ClearValue,
}

/// GPU-less implementation of [`GraphicsBackend`]
pub struct HeadlessBackend {
    width: u32,
    height: u32,
    textures: SlotMap<TextureHandle, HeadlessTexture>,
    meshes: SlotMap<MeshHandle, HeadlessMesh>,
    framebuffers: SlotMap<FramebufferHandle, HeadlessFramebuffer>,
    shaders: SlotMap<ShaderHandle, String>,
    shader_names: HashMap<String, ShaderHandle>,
    uniforms: HashMap<ShaderHandle, HashMap<String, UniformValue>>,
    active_shader: Option<ShaderHandle>,
    state: RenderState,
    target: RenderTarget,
    draw_buffers: Vec<u32>,
    viewport: Viewport,
    screen_clear: [f32; 4],
    screen_draws: u32,
    draws: Vec<DrawRecord>,
    clears: Vec<ClearRecord>,
    pending_error: Option<BackendError>,
    max_texture_size: u32,
}

/// Largest texture extent accepted by default
pub const DEFAULT_MAX_TEXTURE_SIZE: u32 = 8192;

impl HeadlessBackend {
    /// Create a device with every shader the renderer knows about
    pub fn new(width: u32, height: u32) -> Self {
        let mut backend = Self::without_shaders(width, height);
        for name in shaders::ALL {
            backend.register_shader(name);
        }
        backend
    }

    /// Create a device with an empty shader table
    pub fn without_shaders(width: u32, height: u32) -> Self {
        log::debug!("HeadlessBackend: created {}x{}", width, height);
        Self {
            width,
            height,
            textures: SlotMap::with_key(),
            meshes: SlotMap::with_key(),
            framebuffers: SlotMap::with_key(),
            shaders: SlotMap::with_key(),
            shader_names: HashMap::new(),
            uniforms: HashMap::new(),
            active_shader: None,
            state: RenderState::default(),
            target: RenderTarget::Screen,
            draw_buffers: vec![0],
            viewport: Viewport::full(width, height),
            screen_clear: [0.0; 4],
            screen_draws: 0,
            draws: Vec::new(),
            clears: Vec::new(),
            pending_error: None,
            max_texture_size: DEFAULT_MAX_TEXTURE_SIZE,
        }
    }

    /// Reject textures wider or taller than `size`, like a device limit
    pub fn with_max_texture_size(mut self, size: u32) -> Self {
        self.max_texture_size = size;
        self
    }

    pub fn register_shader(&mut self, name: &str) -> ShaderHandle {
        if let Some(handle) = self.shader_names.get(name) {
            return *handle;
        }
        let handle = self.shaders.insert(name.to_string());
        self.shader_names.insert(name.to_string(), handle);
        handle
    }

    /// Simulate a shader that failed to load
    pub fn remove_shader(&mut self, name: &str) {
        if let Some(handle) = self.shader_names.remove(name) {
            self.shaders.remove(handle);
            self.uniforms.remove(&handle);
            if self.active_shader == Some(handle) {
                self.active_shader = None;
            }
        }
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn draws_with_shader<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DrawRecord> {
        self.draws.iter().filter(move |d| d.shader == name)
    }

    pub fn clears(&self) -> &[ClearRecord] {
        &self.clears
    }

    /// Forget recorded draws and clears, keeping resources
    pub fn clear_log(&mut self) {
        self.draws.clear();
        self.clears.clear();
    }

    pub fn texture(&self, texture: TextureHandle) -> Option<&HeadlessTexture> {
        self.textures.get(texture)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn framebuffer_count(&self) -> usize {
        self.framebuffers.len()
    }

    pub fn bound_target(&self) -> RenderTarget {
        self.target
    }

    pub fn screen_draw_count(&self) -> u32 {
        self.screen_draws
    }

    pub fn screen_clear_value(&self) -> [f32; 4] {
        self.screen_clear
    }

    fn raise(&mut self, error: BackendError) {
        log::trace!("HeadlessBackend: error raised: {}", error);
        if self.pending_error.is_none() {
            self.pending_error = Some(error);
        }
    }

    fn bound_colors(&self) -> Vec<TextureHandle> {
        match self.target {
            RenderTarget::Screen => Vec::new(),
            RenderTarget::Framebuffer(fb) => match self.framebuffers.get(fb) {
                Some(framebuffer) => self
                    .draw_buffers
                    .iter()
                    .filter_map(|i| framebuffer.colors.get(*i as usize).copied())
                    .collect(),
                None => Vec::new(),
            },
            RenderTarget::CubeFace { cubemap, .. } => vec![cubemap],
        }
    }

    fn bound_depth(&self) -> Option<TextureHandle> {
        let fb = match self.target {
            RenderTarget::Screen => return None,
            RenderTarget::Framebuffer(fb) => fb,
            RenderTarget::CubeFace { framebuffer, .. } => framebuffer,
        };
        self.framebuffers.get(fb).and_then(|f| f.depth)
    }

    fn record_draw(&mut self, mesh: Option<MeshHandle>) -> BackendResult<()> {
        let shader = self.active_shader.ok_or(BackendError::NoShaderBound)?;
        let name = self
            .shaders
            .get(shader)
            .cloned()
            .ok_or(BackendError::InvalidHandle("shader"))?;

        if self.state.color_writes != ColorWrites::NONE {
            for texture in self.bound_colors() {
                if let Some(t) = self.textures.get_mut(texture) {
                    t.draw_count += 1;
                }
            }
            if self.target == RenderTarget::Screen {
                self.screen_draws += 1;
            }
        }
        if self.state.depth_test && self.state.depth_write {
            if let Some(depth) = self.bound_depth() {
                if let Some(t) = self.textures.get_mut(depth) {
                    t.draw_count += 1;
                }
            }
        }

        log::trace!(
            "HeadlessBackend: draw {:?} with '{}' into {:?}",
            mesh,
            name,
            self.target
        );
        self.draws.push(DrawRecord {
            shader: name,
            target: self.target,
            draw_buffers: self.draw_buffers.clone(),
            state: self.state,
            viewport: self.viewport,
            mesh,
            uniforms: self.uniforms.get(&shader).cloned().unwrap_or_default(),
        });
        Ok(())
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn name(&self) -> &'static str {
        "Headless Backend"
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        log::trace!("HeadlessBackend: resize to {}x{}", width, height);
        self.width = width;
        self.height = height;
    }

    fn create_texture(&mut self, descriptor: &TextureDescriptor) -> BackendResult<TextureHandle> {
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(BackendError::TextureCreationFailed(format!(
                "{:?} has zero extent",
                descriptor.label
            )));
        }
        if descriptor.width.max(descriptor.height) > self.max_texture_size {
            return Err(BackendError::TextureCreationFailed(format!(
                "{:?} exceeds the {} texel limit",
                descriptor.label, self.max_texture_size
            )));
        }
        if descriptor.dimension == TextureDimension::Cube && descriptor.width != descriptor.height {
            return Err(BackendError::TextureCreationFailed(format!(
                "cubemap {:?} faces must be square",
                descriptor.label
            )));
        }
        log::trace!(
            "HeadlessBackend: creating texture {:?} ({}x{}, {:?})",
            descriptor.label,
            descriptor.width,
            descriptor.height,
            descriptor.format
        );
        Ok(self.textures.insert(HeadlessTexture::new(descriptor.clone())))
    }

    fn write_texture(&mut self, texture: TextureHandle, data: &[u8]) -> BackendResult<()> {
        let t = self
            .textures
            .get_mut(texture)
            .ok_or(BackendError::InvalidHandle("texture"))?;
        let desc = &t.descriptor;
        let faces = match desc.dimension {
            TextureDimension::D2 => 1,
            TextureDimension::Cube => 6,
        };
        let expected =
            (desc.width * desc.height * desc.format.bytes_per_pixel()) as usize * faces;
        if data.len() != expected {
            return Err(BackendError::InvalidOperation(format!(
                "texture {:?} expects {} bytes, got {}",
                desc.label,
                expected,
                data.len()
            )));
        }
        t.data = Some(data.to_vec());
        Ok(())
    }

    fn generate_mipmaps(&mut self, texture: TextureHandle) -> BackendResult<()> {
        let t = self
            .textures
            .get_mut(texture)
            .ok_or(BackendError::InvalidHandle("texture"))?;
        t.mipmaps_generated = true;
        Ok(())
    }

    fn copy_texture(&mut self, src: TextureHandle, dst: TextureHandle) -> BackendResult<()> {
        let source = self
            .textures
            .get(src)
            .cloned()
            .ok_or(BackendError::InvalidHandle("texture"))?;
        let target = self
            .textures
            .get_mut(dst)
            .ok_or(BackendError::InvalidHandle("texture"))?;
        if (source.descriptor.width, source.descriptor.height)
            != (target.descriptor.width, target.descriptor.height)
        {
            return Err(BackendError::InvalidOperation(
                "copy between textures of different size".to_string(),
            ));
        }
        target.clear_value = source.clear_value;
        target.draw_count = source.draw_count;
        target.data = source.data;
        Ok(())
    }

    fn texture_descriptor(&self, texture: TextureHandle) -> Option<&TextureDescriptor> {
        self.textures.get(texture).map(|t| &t.descriptor)
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(texture);
    }

    fn upload_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> BackendResult<MeshHandle> {
        if let Some(bad) = indices.iter().find(|i| **i as usize >= vertices.len()) {
            return Err(BackendError::MeshUploadFailed(format!(
                "index {} out of range for {} vertices",
                bad,
                vertices.len()
            )));
        }
        Ok(self.meshes.insert(HeadlessMesh {
            vertex_count: vertices.len(),
            index_count: indices.len(),
        }))
    }

    fn destroy_mesh(&mut self, mesh: MeshHandle) {
        self.meshes.remove(mesh);
    }

    fn create_framebuffer(
        &mut self,
        descriptor: &FramebufferDescriptor,
    ) -> BackendResult<FramebufferHandle> {
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(BackendError::FramebufferCreationFailed(format!(
                "{:?} has zero extent",
                descriptor.label
            )));
        }
        let usage = TextureUsage::RENDER_ATTACHMENT
            | TextureUsage::TEXTURE_BINDING
            | TextureUsage::COPY_SRC
            | TextureUsage::COPY_DST;
        let mut colors = Vec::with_capacity(descriptor.color_formats.len());
        for (i, format) in descriptor.color_formats.iter().enumerate() {
            colors.push(self.create_texture(&TextureDescriptor {
                label: descriptor.label.as_ref().map(|l| format!("{l}_color{i}")),
                width: descriptor.width,
                height: descriptor.height,
                format: *format,
                usage,
                filter: descriptor.filter,
                ..Default::default()
            })?);
        }
        let depth = match descriptor.depth_format {
            Some(format) => Some(self.create_texture(&TextureDescriptor {
                label: descriptor.label.as_ref().map(|l| format!("{l}_depth")),
                width: descriptor.width,
                height: descriptor.height,
                format,
                usage,
                filter: descriptor.filter,
                ..Default::default()
            })?),
            None => None,
        };
        log::trace!(
            "HeadlessBackend: creating framebuffer {:?} ({} color, depth: {})",
            descriptor.label,
            colors.len(),
            depth.is_some()
        );
        Ok(self.framebuffers.insert(HeadlessFramebuffer {
            descriptor: descriptor.clone(),
            colors,
            depth,
        }))
    }

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        if let Some(fb) = self.framebuffers.remove(framebuffer) {
            for texture in fb.colors.into_iter().chain(fb.depth) {
                self.textures.remove(texture);
            }
            let bound = match self.target {
                RenderTarget::Framebuffer(f) => f == framebuffer,
                RenderTarget::CubeFace { framebuffer: f, .. } => f == framebuffer,
                RenderTarget::Screen => false,
            };
            if bound {
                self.target = RenderTarget::Screen;
                self.draw_buffers = vec![0];
            }
        }
    }

    fn framebuffer_color(
        &self,
        framebuffer: FramebufferHandle,
        index: usize,
    ) -> Option<TextureHandle> {
        self.framebuffers
            .get(framebuffer)
            .and_then(|fb| fb.colors.get(index).copied())
    }

    fn framebuffer_depth(&self, framebuffer: FramebufferHandle) -> Option<TextureHandle> {
        self.framebuffers.get(framebuffer).and_then(|fb| fb.depth)
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) -> BackendResult<()> {
        match framebuffer {
            Some(handle) => {
                let fb = self
                    .framebuffers
                    .get(handle)
                    .ok_or(BackendError::InvalidHandle("framebuffer"))?;
                self.draw_buffers = (0..fb.colors.len() as u32).collect();
                self.viewport = Viewport::full(fb.descriptor.width, fb.descriptor.height);
                self.target = RenderTarget::Framebuffer(handle);
            }
            None => {
                self.draw_buffers = vec![0];
                self.viewport = Viewport::full(self.width, self.height);
                self.target = RenderTarget::Screen;
            }
        }
        Ok(())
    }

    fn bind_cubemap_face(
        &mut self,
        framebuffer: FramebufferHandle,
        cubemap: TextureHandle,
        face: u32,
    ) -> BackendResult<()> {
        if !self.framebuffers.contains_key(framebuffer) {
            return Err(BackendError::InvalidHandle("framebuffer"));
        }
        let texture = self
            .textures
            .get(cubemap)
            .ok_or(BackendError::InvalidHandle("texture"))?;
        if texture.descriptor.dimension != TextureDimension::Cube || face >= 6 {
            return Err(BackendError::InvalidOperation(format!(
                "cannot attach face {} of {:?}",
                face, texture.descriptor.label
            )));
        }
        self.viewport = Viewport::full(texture.descriptor.width, texture.descriptor.height);
        self.draw_buffers = vec![0];
        self.target = RenderTarget::CubeFace {
            framebuffer,
            cubemap,
            face,
        };
        Ok(())
    }

    fn set_draw_buffers(&mut self, buffers: &[u32]) -> BackendResult<()> {
        let available = match self.target {
            RenderTarget::Framebuffer(fb) => self
                .framebuffers
                .get(fb)
                .map(|f| f.colors.len())
                .unwrap_or(0),
            RenderTarget::Screen | RenderTarget::CubeFace { .. } => 1,
        };
        if let Some(bad) = buffers.iter().find(|b| **b as usize >= available) {
            return Err(BackendError::InvalidOperation(format!(
                "draw buffer {} not attached",
                bad
            )));
        }
        self.draw_buffers = buffers.to_vec();
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn clear(&mut self, value: ClearValue) {
        if let Some(color) = value.color {
            for texture in self.bound_colors() {
                if let Some(t) = self.textures.get_mut(texture) {
                    t.clear_value = color;
                    t.draw_count = 0;
                }
            }
            if self.target == RenderTarget::Screen {
                self.screen_clear = color;
                self.screen_draws = 0;
            }
        }
        if let Some(depth) = value.depth {
            if let Some(texture) = self.bound_depth() {
                if let Some(t) = self.textures.get_mut(texture) {
                    t.clear_value = [depth, 0.0, 0.0, 0.0];
                    t.draw_count = 0;
                }
            }
        }
        self.clears.push(ClearRecord {
            target: self.target,
            draw_buffers: self.draw_buffers.clone(),
            value,
        });
    }

    fn blit_depth(
        &mut self,
        src: FramebufferHandle,
        dst: Option<FramebufferHandle>,
    ) -> BackendResult<()> {
        let source = self
            .framebuffer_depth(src)
            .and_then(|d| self.textures.get(d))
            .cloned()
            .ok_or_else(|| BackendError::InvalidOperation("blit source has no depth".into()))?;
        if let Some(dst) = dst {
            let depth = self
                .framebuffer_depth(dst)
                .ok_or_else(|| BackendError::InvalidOperation("blit target has no depth".into()))?;
            if let Some(t) = self.textures.get_mut(depth) {
                t.clear_value = source.clear_value;
                t.draw_count = source.draw_count;
            }
        }
        Ok(())
    }

    fn read_pixels_rgb_f32(
        &mut self,
        framebuffer: FramebufferHandle,
        attachment: usize,
    ) -> BackendResult<Vec<f32>> {
        let texture = self
            .framebuffer_color(framebuffer, attachment)
            .and_then(|t| self.textures.get(t))
            .ok_or_else(|| {
                BackendError::ReadbackFailed(format!("no color attachment {}", attachment))
            })?;
        let pixels = (texture.descriptor.width * texture.descriptor.height) as usize;
        let [r, g, b, _] = texture.clear_value;
        let mut out = Vec::with_capacity(pixels * 3);
        for _ in 0..pixels {
            out.extend_from_slice(&[r, g, b]);
        }
        Ok(out)
    }

    fn shader(&self, name: &str) -> Option<ShaderHandle> {
        self.shader_names.get(name).copied()
    }

    fn enable_shader(&mut self, shader: ShaderHandle) -> BackendResult<()> {
        if !self.shaders.contains_key(shader) {
            return Err(BackendError::InvalidHandle("shader"));
        }
        self.active_shader = Some(shader);
        Ok(())
    }

    fn disable_shader(&mut self) {
        self.active_shader = None;
    }

    fn set_uniform_value(&mut self, name: &str, value: UniformValue) {
        match self.active_shader {
            Some(shader) => {
                self.uniforms
                    .entry(shader)
                    .or_default()
                    .insert(name.to_string(), value);
            }
            None => self.raise(BackendError::NoShaderBound),
        }
    }

    fn render_state(&self) -> RenderState {
        self.state
    }

    fn set_render_state(&mut self, state: RenderState) {
        self.state = state;
    }

    fn draw_mesh(&mut self, mesh: MeshHandle) -> BackendResult<()> {
        let m = self
            .meshes
            .get(mesh)
            .ok_or(BackendError::InvalidHandle("mesh"))?;
        if m.vertex_count == 0 || m.index_count == 0 {
            return Err(BackendError::InvalidOperation("draw of empty mesh".into()));
        }
        self.record_draw(Some(mesh))
    }

    fn draw_fullscreen_quad(&mut self) -> BackendResult<()> {
        self.record_draw(None)
    }

    fn check_errors(&mut self) -> BackendResult<()> {
        match self.pending_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_and_readback() {
        let mut backend = HeadlessBackend::new(64, 64);
        let fb = backend
            .create_framebuffer(&FramebufferDescriptor::color(
                "capture",
                4,
                4,
                &[TextureFormat::Rgba32Float],
            ))
            .unwrap();
        backend.bind_framebuffer(Some(fb)).unwrap();
        backend.clear(ClearValue::color([0.25, 0.5, 1.0, 1.0]));
        let pixels = backend.read_pixels_rgb_f32(fb, 0).unwrap();
        assert_eq!(pixels.len(), 4 * 4 * 3);
        assert_eq!(&pixels[..3], &[0.25, 0.5, 1.0]);
    }

    #[test]
    fn test_draw_marks_attachments() {
        let mut backend = HeadlessBackend::new(64, 64);
        let fb = backend
            .create_framebuffer(&FramebufferDescriptor::depth_only("shadow", 16, 16))
            .unwrap();
        let depth = backend.framebuffer_depth(fb).unwrap();
        backend.bind_framebuffer(Some(fb)).unwrap();
        backend.clear(ClearValue::depth());
        backend.set_color_writes(ColorWrites::NONE);
        let shader = backend.shader(shaders::DEPTH).unwrap();
        backend.enable_shader(shader).unwrap();
        backend.draw_fullscreen_quad().unwrap();
        assert!(backend.texture(depth).unwrap().is_written());
    }

    #[test]
    fn test_uniform_without_shader_raises() {
        let mut backend = HeadlessBackend::new(64, 64);
        backend.set_uniform("u_time", 1.0f32);
        assert_eq!(backend.check_errors(), Err(BackendError::NoShaderBound));
        assert_eq!(backend.check_errors(), Ok(()));
    }

    #[test]
    fn test_draw_without_shader_fails() {
        let mut backend = HeadlessBackend::new(64, 64);
        assert_eq!(
            backend.draw_fullscreen_quad(),
            Err(BackendError::NoShaderBound)
        );
    }

    #[test]
    fn test_destroy_framebuffer_releases_attachments() {
        let mut backend = HeadlessBackend::new(64, 64);
        let fb = backend
            .create_framebuffer(
                &FramebufferDescriptor::color("gbuffer", 8, 8, &[TextureFormat::Rgba8Unorm; 3])
                    .with_depth(),
            )
            .unwrap();
        assert_eq!(backend.texture_count(), 4);
        backend.destroy_framebuffer(fb);
        assert_eq!(backend.texture_count(), 0);
        assert_eq!(backend.framebuffer_count(), 0);
    }

    #[test]
    fn test_texture_size_limit() {
        let mut backend = HeadlessBackend::new(64, 64).with_max_texture_size(512);
        let too_wide = TextureDescriptor {
            width: 1024,
            height: 16,
            ..Default::default()
        };
        assert!(matches!(
            backend.create_texture(&too_wide),
            Err(BackendError::TextureCreationFailed(_))
        ));
        assert!(backend
            .create_framebuffer(&FramebufferDescriptor::depth_only("shadow", 2048, 2048))
            .is_err());
        assert_eq!(backend.texture_count(), 0);
        assert_eq!(backend.framebuffer_count(), 0);
    }
}
