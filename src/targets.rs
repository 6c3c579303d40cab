//! Viewport-sized offscreen render targets
//!
//! Every target here is sized relative to the viewport and reallocated on
//! resize. Shadow and probe capture targets have fixed sizes and live with
//! their owners.

use crate::backend::*;

pub const GBUFFER_ALBEDO: u32 = 0;
pub const GBUFFER_NORMAL: u32 = 1;
pub const GBUFFER_MATERIAL: u32 = 2;

/// Color formats of the three G-buffer attachments
const GBUFFER_FORMATS: [TextureFormat; 3] = [
    TextureFormat::Rgba8Unorm,
    TextureFormat::Rgba16Float,
    TextureFormat::Rgba8Unorm,
];

/// Description of one viewport-relative framebuffer
#[derive(Debug, Clone)]
struct TargetSpec {
    name: &'static str,
    size: TextureSize,
    formats: Vec<TextureFormat>,
    depth: bool,
}

impl TargetSpec {
    fn new(name: &'static str, size: TextureSize, formats: &[TextureFormat], depth: bool) -> Self {
        Self {
            name,
            size,
            formats: formats.to_vec(),
            depth,
        }
    }

    fn create<B: GraphicsBackend>(
        &self,
        backend: &mut B,
        width: u32,
        height: u32,
    ) -> BackendResult<FramebufferHandle> {
        let (w, h) = self.size.resolve(width, height);
        let mut descriptor = FramebufferDescriptor::color(self.name, w, h, &self.formats);
        if self.depth {
            descriptor = descriptor.with_depth();
        }
        backend.create_framebuffer(&descriptor)
    }
}

/// All viewport-sized targets used by one frame
#[derive(Debug, Clone)]
pub struct FrameTargets {
    pub width: u32,
    pub height: u32,
    /// Albedo, normal, material properties + depth
    pub gbuffer: FramebufferHandle,
    /// Same layout as the G-buffer colors, used to round-trip decals
    pub decal_scratch: FramebufferHandle,
    /// Lit HDR color + depth
    pub illumination: FramebufferHandle,
    pub ssao: FramebufferHandle,
    pub ssao_blur: FramebufferHandle,
    /// Ping-pong pair for the post-process chain
    pub post: [FramebufferHandle; 2],
    /// Progressively halved targets, largest first
    pub bloom_mips: Vec<FramebufferHandle>,
    /// Bloom depth asked for, before clamping to the viewport
    requested_bloom_levels: u32,
}

/// Deepest bloom pyramid a viewport supports: halving stops at one pixel
pub fn max_bloom_levels(width: u32, height: u32) -> u32 {
    width.min(height).max(1).ilog2()
}

impl FrameTargets {
    /// Allocate every target. On failure, whatever was already allocated is
    /// released again.
    pub fn create<B: GraphicsBackend>(
        backend: &mut B,
        width: u32,
        height: u32,
        bloom_levels: u32,
    ) -> BackendResult<Self> {
        let mut created = Vec::new();
        match Self::allocate(backend, width, height, bloom_levels, &mut created) {
            Ok(targets) => Ok(targets),
            Err(e) => {
                for framebuffer in created {
                    backend.destroy_framebuffer(framebuffer);
                }
                Err(e)
            }
        }
    }

    fn allocate<B: GraphicsBackend>(
        backend: &mut B,
        width: u32,
        height: u32,
        bloom_levels: u32,
        created: &mut Vec<FramebufferHandle>,
    ) -> BackendResult<Self> {
        let mut alloc = |spec: TargetSpec| -> BackendResult<FramebufferHandle> {
            let framebuffer = spec.create(backend, width, height)?;
            created.push(framebuffer);
            Ok(framebuffer)
        };
        let full = TextureSize::full();
        let hdr = [TextureFormat::Rgba16Float];
        let ldr = [TextureFormat::Rgba8Unorm];

        let gbuffer = alloc(TargetSpec::new("gbuffer", full, &GBUFFER_FORMATS, true))?;
        let decal_scratch = alloc(TargetSpec::new("decal_scratch", full, &GBUFFER_FORMATS, false))?;
        let illumination = alloc(TargetSpec::new("illumination", full, &hdr, true))?;
        let ssao = alloc(TargetSpec::new("ssao", full, &ldr, false))?;
        let ssao_blur = alloc(TargetSpec::new("ssao_blur", full, &ldr, false))?;
        let post = [
            alloc(TargetSpec::new("post_a", full, &hdr, false))?,
            alloc(TargetSpec::new("post_b", full, &hdr, false))?,
        ];

        let levels = bloom_levels.min(max_bloom_levels(width, height));
        if levels < bloom_levels {
            log::debug!(
                "Bloom clamped to {} levels at {}x{} ({} requested)",
                levels,
                width,
                height,
                bloom_levels
            );
        }
        let mut bloom_mips = Vec::with_capacity(levels as usize);
        for level in 0..levels {
            let scale = 1.0 / (2u32 << level) as f32;
            let size = TextureSize::Relative {
                width_scale: scale,
                height_scale: scale,
            };
            bloom_mips.push(alloc(TargetSpec::new("bloom_mip", size, &hdr, false))?);
        }

        log::info!(
            "Allocated frame targets at {}x{} ({} bloom levels)",
            width,
            height,
            levels
        );

        Ok(Self {
            width,
            height,
            gbuffer,
            decal_scratch,
            illumination,
            ssao,
            ssao_blur,
            post,
            bloom_mips,
            requested_bloom_levels: bloom_levels,
        })
    }

    fn all(&self) -> impl Iterator<Item = FramebufferHandle> + '_ {
        [
            self.gbuffer,
            self.decal_scratch,
            self.illumination,
            self.ssao,
            self.ssao_blur,
        ]
        .into_iter()
        .chain(self.post)
        .chain(self.bloom_mips.iter().copied())
    }

    pub fn destroy<B: GraphicsBackend>(&self, backend: &mut B) {
        for framebuffer in self.all() {
            backend.destroy_framebuffer(framebuffer);
        }
    }

    /// Allocate targets at the new size, then release the old ones. A failed
    /// allocation leaves the current targets in place.
    pub fn resize<B: GraphicsBackend>(
        &mut self,
        backend: &mut B,
        width: u32,
        height: u32,
    ) -> BackendResult<()> {
        let resized = Self::create(backend, width, height, self.requested_bloom_levels)?;
        let old = std::mem::replace(self, resized);
        old.destroy(backend);
        Ok(())
    }

    /// Color attachment `index` of the G-buffer
    pub fn gbuffer_texture<B: GraphicsBackend>(
        &self,
        backend: &B,
        index: u32,
    ) -> BackendResult<TextureHandle> {
        backend
            .framebuffer_color(self.gbuffer, index as usize)
            .ok_or(BackendError::InvalidHandle("gbuffer attachment"))
    }

    pub fn gbuffer_depth<B: GraphicsBackend>(&self, backend: &B) -> BackendResult<TextureHandle> {
        backend
            .framebuffer_depth(self.gbuffer)
            .ok_or(BackendError::InvalidHandle("gbuffer depth"))
    }

    pub fn color<B: GraphicsBackend>(
        backend: &B,
        framebuffer: FramebufferHandle,
    ) -> BackendResult<TextureHandle> {
        backend
            .framebuffer_color(framebuffer, 0)
            .ok_or(BackendError::InvalidHandle("color attachment"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_reallocates() {
        let mut backend = HeadlessBackend::new(320, 240);
        let mut targets = FrameTargets::create(&mut backend, 320, 240, 3).unwrap();
        let before = backend.texture_count();
        let albedo = targets.gbuffer_texture(&backend, GBUFFER_ALBEDO).unwrap();
        assert_eq!(backend.texture_descriptor(albedo).unwrap().width, 320);

        targets.resize(&mut backend, 640, 480).unwrap();
        assert_eq!(backend.texture_count(), before);
        assert!(backend.texture_descriptor(albedo).is_none());

        let albedo = targets.gbuffer_texture(&backend, GBUFFER_ALBEDO).unwrap();
        assert_eq!(backend.texture_descriptor(albedo).unwrap().width, 640);
        let mip = FrameTargets::color(&backend, targets.bloom_mips[1]).unwrap();
        assert_eq!(backend.texture_descriptor(mip).unwrap().width, 160);
    }

    #[test]
    fn test_bloom_levels_clamped_to_viewport() {
        let mut backend = HeadlessBackend::new(64, 48);
        let mut targets = FrameTargets::create(&mut backend, 64, 48, 40).unwrap();
        assert_eq!(targets.bloom_mips.len(), 5);
        let smallest = FrameTargets::color(&backend, targets.bloom_mips[4]).unwrap();
        assert_eq!(backend.texture_descriptor(smallest).unwrap().height, 1);

        // The requested depth comes back when the viewport grows again
        targets.resize(&mut backend, 8, 8).unwrap();
        assert_eq!(targets.bloom_mips.len(), 3);
        targets.resize(&mut backend, 1024, 1024).unwrap();
        assert_eq!(targets.bloom_mips.len(), 10);
    }

    #[test]
    fn test_failed_resize_keeps_current_targets() {
        let mut backend = HeadlessBackend::new(320, 240).with_max_texture_size(1024);
        let mut targets = FrameTargets::create(&mut backend, 320, 240, 3).unwrap();
        let textures = backend.texture_count();
        let framebuffers = backend.framebuffer_count();

        assert!(targets.resize(&mut backend, 2048, 240).is_err());
        assert_eq!((targets.width, targets.height), (320, 240));
        assert_eq!(backend.texture_count(), textures);
        assert_eq!(backend.framebuffer_count(), framebuffers);
        let albedo = targets.gbuffer_texture(&backend, GBUFFER_ALBEDO).unwrap();
        assert_eq!(backend.texture_descriptor(albedo).unwrap().width, 320);
    }
}
