//! Names of the shader programs the renderer looks up.
//!
//! Programs are compiled and owned by the device; the renderer only refers to
//! them by name. A name the device cannot resolve skips the pass that needs it.

// Geometry
pub const DEPTH: &str = "depth";
pub const FORWARD_SINGLE: &str = "forward_single";
pub const FORWARD_MULTI: &str = "forward_multi";
pub const SKYBOX: &str = "skybox";

// Forward debug views
pub const SHOW_TEXTURE: &str = "show_texture";
pub const SHOW_NORMAL: &str = "show_normal";
pub const SHOW_OCCLUSION: &str = "show_occlusion";
pub const SHOW_UVS: &str = "show_uvs";
pub const SHOW_DEPTH: &str = "show_depth";

// Deferred
pub const GBUFFERS: &str = "gbuffers";
pub const DECAL: &str = "decal";
pub const DEFERRED_AMBIENT: &str = "deferred_ambient";
pub const DEFERRED_LIGHT_QUAD: &str = "deferred_light_quad";
pub const DEFERRED_LIGHT_VOLUME: &str = "deferred_light_volume";
pub const REFLECTION: &str = "reflection";
pub const SSAO: &str = "ssao";
pub const SSAO_BLUR: &str = "ssao_blur";
pub const IRRADIANCE_VIEW: &str = "irradiance_view";

// Full-screen quads
pub const QUAD_TEXTURE: &str = "quad_texture";
pub const QUAD_DEPTH: &str = "quad_depth";
pub const COMPOSITE: &str = "composite";

// Post-process
pub const BLOOM_DOWNSAMPLE: &str = "bloom_downsample";
pub const BLOOM_UPSAMPLE: &str = "bloom_upsample";
pub const DEPTH_OF_FIELD: &str = "depth_of_field";
pub const VOLUMETRIC: &str = "volumetric";
pub const CHROMATIC_ABERRATION: &str = "chromatic_aberration";
pub const LENS_DISTORTION: &str = "lens_distortion";

pub const ALL: &[&str] = &[
    DEPTH,
    FORWARD_SINGLE,
    FORWARD_MULTI,
    SKYBOX,
    SHOW_TEXTURE,
    SHOW_NORMAL,
    SHOW_OCCLUSION,
    SHOW_UVS,
    SHOW_DEPTH,
    GBUFFERS,
    DECAL,
    DEFERRED_AMBIENT,
    DEFERRED_LIGHT_QUAD,
    DEFERRED_LIGHT_VOLUME,
    REFLECTION,
    SSAO,
    SSAO_BLUR,
    IRRADIANCE_VIEW,
    QUAD_TEXTURE,
    QUAD_DEPTH,
    COMPOSITE,
    BLOOM_DOWNSAMPLE,
    BLOOM_UPSAMPLE,
    DEPTH_OF_FIELD,
    VOLUMETRIC,
    CHROMATIC_ABERRATION,
    LENS_DISTORTION,
];
