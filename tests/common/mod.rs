//! Common utilities for renderer integration tests.
//!
//! Scenes are built on a [`HeadlessBackend`], so every test can inspect the
//! draws, clears and attachment contents a frame produced.

#![allow(dead_code)]

use glam::{Vec3, Vec4};

use scene_renderer::backend::{DrawRecord, HeadlessBackend};
use scene_renderer::resources::{Material, Mesh, TextureData};
use scene_renderer::scene::{Decal, EntityIndex, Light, Prefab, Scene, Transform};
use scene_renderer::{PipelineMode, Renderer, RendererConfig};

pub const WIDTH: u32 = 64;
pub const HEIGHT: u32 = 64;

pub const BACKGROUND: Vec4 = Vec4::new(0.2, 0.4, 0.6, 1.0);

/// Route `log` output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Renderer on a headless device of the test size
pub fn renderer(config: RendererConfig) -> Renderer<HeadlessBackend> {
    init_logging();
    let config = config.with_size(WIDTH, HEIGHT);
    Renderer::new(HeadlessBackend::new(WIDTH, HEIGHT), config).expect("renderer creation")
}

pub fn forward_renderer() -> Renderer<HeadlessBackend> {
    renderer(RendererConfig::default().with_pipeline(PipelineMode::Forward))
}

pub fn deferred_renderer() -> Renderer<HeadlessBackend> {
    renderer(RendererConfig::default().with_pipeline(PipelineMode::Deferred))
}

/// Empty scene with a known background, camera looking at the origin
pub fn empty_scene() -> Scene {
    let mut scene = Scene::new();
    scene.background_color = BACKGROUND;
    scene
}

/// Add a unit cube with `material` at `position`
pub fn add_cube(
    scene: &mut Scene,
    backend: &mut HeadlessBackend,
    name: &str,
    material: Material,
    position: Vec3,
) -> EntityIndex {
    let mesh = scene
        .assets
        .add_mesh(backend, &Mesh::cube(1.0))
        .expect("cube upload");
    let material = scene.assets.add_material(material);
    let prefab = scene.assets.add_prefab(Prefab::single(name, mesh, material));
    scene.add_prefab(name, Some(prefab), Transform::from_position(position))
}

/// One grey cube lit by a shadow-casting directional light
pub fn lit_cube_scene(backend: &mut HeadlessBackend) -> Scene {
    let mut scene = empty_scene();
    add_cube(&mut scene, backend, "cube", Material::new("grey"), Vec3::ZERO);
    let sun = scene.add_light(
        "sun",
        Light::directional(Vec3::ONE, 1.0, 200.0).with_shadows(true),
        Transform::facing(Vec3::new(100.0, 100.0, 0.0), Vec3::ZERO),
    );
    scene.primary_light = Some(sun);
    scene
}

pub fn add_point_light(scene: &mut Scene, name: &str, position: Vec3) -> EntityIndex {
    scene.add_light(
        name,
        Light::point(Vec3::new(1.0, 0.8, 0.6), 2.0, 20.0),
        Transform::from_position(position),
    )
}

pub fn add_decal(scene: &mut Scene, backend: &mut HeadlessBackend, position: Vec3) -> EntityIndex {
    let albedo = TextureData::solid_color([255, 0, 0, 255], "decal")
        .upload(backend)
        .expect("decal texture upload");
    scene.add_decal(
        "decal",
        Decal {
            albedo: Some(albedo),
        },
        Transform::from_position(position),
    )
}

/// Index of the first draw using `shader`
pub fn first_draw(draws: &[DrawRecord], shader: &str) -> Option<usize> {
    draws.iter().position(|d| d.shader == shader)
}
