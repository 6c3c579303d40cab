//! Deferred pipeline integration tests.

mod common;

use glam::{Mat4, Vec3};
use rstest::rstest;

use common::{
    add_cube, add_decal, add_point_light, deferred_renderer, empty_scene, first_draw,
    lit_cube_scene, renderer, BACKGROUND,
};
use scene_renderer::backend::{
    BlendState, CompareFunction, CullMode, FrontFace, GraphicsBackend, RenderState, RenderTarget,
    TextureDescriptor, TextureDimension, UniformValue,
};
use scene_renderer::resources::{shaders, Material};
use scene_renderer::targets::FrameTargets;
use scene_renderer::{PipelineMode, PostProcessConfig, RenderMode, RendererConfig};

#[test]
fn test_deferred_frame_order() {
    let mut renderer = deferred_renderer();
    let mut scene = lit_cube_scene(renderer.backend_mut());

    let stats = renderer.render_frame(&mut scene);
    assert!(stats.failed_passes.is_empty(), "{:?}", stats.failed_passes);
    assert_eq!(stats.shadow_maps, 1);

    let backend = renderer.backend();
    let draws = backend.draws();
    let order: Vec<usize> = [
        shaders::DEPTH,
        shaders::GBUFFERS,
        shaders::SSAO,
        shaders::DEFERRED_AMBIENT,
        shaders::DEFERRED_LIGHT_QUAD,
        shaders::VOLUMETRIC,
        shaders::BLOOM_DOWNSAMPLE,
        shaders::COMPOSITE,
    ]
    .iter()
    .map(|shader| first_draw(draws, shader).unwrap_or_else(|| panic!("no {} draw", shader)))
    .collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]), "{:?}", order);

    let composite = draws.last().unwrap();
    assert_eq!(composite.shader, shaders::COMPOSITE);
    assert_eq!(composite.target, RenderTarget::Screen);
    assert_eq!(backend.screen_draw_count(), 1);
    assert_eq!(backend.render_state(), RenderState::default());
    assert_eq!(backend.bound_target(), RenderTarget::Screen);
}

#[test]
fn test_gbuffer_clears_and_targets() {
    let mut renderer = deferred_renderer();
    let mut scene = lit_cube_scene(renderer.backend_mut());
    renderer.render_frame(&mut scene);

    let gbuffer = RenderTarget::Framebuffer(renderer.targets().gbuffer);
    let backend = renderer.backend();
    let clears: Vec<_> = backend.clears().iter().filter(|c| c.target == gbuffer).collect();
    assert_eq!(clears.len(), 2);
    assert_eq!(clears[0].draw_buffers, vec![0]);
    assert_eq!(clears[0].value.color, Some(BACKGROUND.to_array()));
    assert_eq!(clears[0].value.depth, Some(1.0));
    assert_eq!(clears[1].draw_buffers, vec![1, 2]);
    assert_eq!(clears[1].value.color, Some([0.0, 0.0, 0.0, 1.0]));
    assert_eq!(clears[1].value.depth, None);

    let draw = backend.draws_with_shader(shaders::GBUFFERS).next().unwrap();
    assert_eq!(draw.target, gbuffer);
    assert_eq!(draw.draw_buffers, vec![0, 1, 2]);
    assert_eq!(draw.state.blend, None);
    assert_eq!(draw.uniform("u_dither"), Some(&UniformValue::Bool(false)));
}

#[test]
fn test_lighting_reads_ssao_and_blends_additively() {
    let mut renderer = deferred_renderer();
    let mut scene = lit_cube_scene(renderer.backend_mut());
    renderer.render_frame(&mut scene);

    let targets = renderer.targets();
    let backend = renderer.backend();
    let ssao = FrameTargets::color(backend, targets.ssao).unwrap();
    let illumination = RenderTarget::Framebuffer(targets.illumination);

    let ambient = backend.draws_with_shader(shaders::DEFERRED_AMBIENT).next().unwrap();
    assert_eq!(ambient.target, illumination);
    assert_eq!(ambient.state.blend, Some(BlendState::additive()));
    assert!(!ambient.state.depth_test);
    assert_eq!(
        ambient.uniform("u_ssao_texture").and_then(UniformValue::as_texture),
        Some(ssao)
    );
    assert_eq!(ambient.uniform("u_use_irradiance"), Some(&UniformValue::Bool(false)));
    assert!(ambient.uniform("u_inverse_viewprojection").is_some());
    assert!(ambient.uniform("u_iRes").is_some());

    let sun = backend.draws_with_shader(shaders::DEFERRED_LIGHT_QUAD).next().unwrap();
    assert!(sun.is_fullscreen());
    assert_eq!(sun.uniform("u_light_cast_shadows"), Some(&UniformValue::Bool(true)));
}

#[test]
fn test_sky_fills_only_empty_pixels() {
    let mut renderer = deferred_renderer();
    let mut scene = lit_cube_scene(renderer.backend_mut());
    let environment = renderer
        .backend_mut()
        .create_texture(&TextureDescriptor {
            width: 8,
            height: 8,
            dimension: TextureDimension::Cube,
            ..Default::default()
        })
        .unwrap();
    scene.environment = Some(environment);
    renderer.render_frame(&mut scene);

    let depth = renderer.targets().gbuffer_depth(renderer.backend()).unwrap();
    let illumination = RenderTarget::Framebuffer(renderer.targets().illumination);
    let backend = renderer.backend();
    let draws = backend.draws();

    let sky_index = first_draw(draws, shaders::SKYBOX).unwrap();
    let sky = &draws[sky_index];
    assert_eq!(sky.target, illumination);
    assert!(sky.state.depth_test);
    assert!(!sky.state.depth_write);
    assert_eq!(sky.state.depth_func, CompareFunction::LessEqual);
    assert_eq!(sky.state.blend, None);
    assert_eq!(sky.uniform("u_far_plane"), Some(&UniformValue::Bool(true)));
    assert_eq!(
        sky.uniform("u_depth_texture").and_then(UniformValue::as_texture),
        Some(depth)
    );

    // Lighting is accumulated before the sky, so lit pixels never sum sky
    let ambient = first_draw(draws, shaders::DEFERRED_AMBIENT).unwrap();
    let sun = first_draw(draws, shaders::DEFERRED_LIGHT_QUAD).unwrap();
    assert!(ambient < sky_index);
    assert!(sun < sky_index);
}

#[test]
fn test_point_lights_draw_volumes() {
    let mut renderer = deferred_renderer();
    let mut scene = empty_scene();
    add_cube(&mut scene, renderer.backend_mut(), "cube", Material::new("grey"), Vec3::ZERO);
    add_point_light(&mut scene, "bulb", Vec3::new(1.0, 2.0, 0.0));

    renderer.render_frame(&mut scene);
    let sphere = renderer.shared().light_sphere;
    let backend = renderer.backend();
    let volumes: Vec<_> = backend.draws_with_shader(shaders::DEFERRED_LIGHT_VOLUME).collect();
    assert_eq!(volumes.len(), 1);
    let volume = volumes[0];
    assert_eq!(volume.mesh, Some(sphere));
    assert_eq!(volume.state.cull_mode, CullMode::Back);
    assert_eq!(volume.state.front_face, FrontFace::Cw);
    assert_eq!(volume.state.blend, Some(BlendState::additive()));
    let expected = Mat4::from_translation(Vec3::new(1.0, 2.0, 0.0)) * Mat4::from_scale(Vec3::splat(20.0));
    assert_eq!(volume.uniform("u_model"), Some(&UniformValue::Mat4(expected)));
    assert_eq!(backend.draws_with_shader(shaders::DEFERRED_LIGHT_QUAD).count(), 0);
}

#[test]
fn test_blended_units_drawn_forward_after_lighting() {
    let mut renderer = deferred_renderer();
    let mut scene = empty_scene();
    add_cube(&mut scene, renderer.backend_mut(), "cube", Material::new("grey"), Vec3::ZERO);
    add_cube(&mut scene, renderer.backend_mut(), "glass", Material::glass(), Vec3::new(0.0, 0.0, 2.0));

    renderer.render_frame(&mut scene);
    let illumination = RenderTarget::Framebuffer(renderer.targets().illumination);
    let backend = renderer.backend();
    assert_eq!(backend.draws_with_shader(shaders::GBUFFERS).count(), 1);

    let glass: Vec<_> = backend.draws_with_shader(shaders::FORWARD_SINGLE).collect();
    assert_eq!(glass.len(), 1);
    assert_eq!(glass[0].target, illumination);
    assert_eq!(glass[0].state.blend, Some(BlendState::alpha_blending()));

    let ambient = first_draw(backend.draws(), shaders::DEFERRED_AMBIENT).unwrap();
    let forward = first_draw(backend.draws(), shaders::FORWARD_SINGLE).unwrap();
    assert!(ambient < forward);
}

#[test]
fn test_dithered_transparency_stays_in_gbuffer() {
    let mut renderer = renderer(RendererConfig::default().with_dithered_transparency(true));
    let mut scene = empty_scene();
    add_cube(&mut scene, renderer.backend_mut(), "cube", Material::new("grey"), Vec3::ZERO);
    add_cube(&mut scene, renderer.backend_mut(), "glass", Material::glass(), Vec3::new(0.0, 0.0, 2.0));

    renderer.render_frame(&mut scene);
    let backend = renderer.backend();
    let gbuffer: Vec<_> = backend.draws_with_shader(shaders::GBUFFERS).collect();
    assert_eq!(gbuffer.len(), 2);
    assert!(gbuffer.iter().all(|d| d.state.blend.is_none()));
    assert_eq!(gbuffer[0].uniform("u_dither"), Some(&UniformValue::Bool(true)));
    assert_eq!(backend.draws_with_shader(shaders::FORWARD_SINGLE).count(), 0);
}

#[test]
fn test_decals_round_trip_through_scratch() {
    let mut renderer = deferred_renderer();
    let mut scene = empty_scene();
    add_cube(&mut scene, renderer.backend_mut(), "cube", Material::new("grey"), Vec3::ZERO);
    add_decal(&mut scene, renderer.backend_mut(), Vec3::new(0.0, 0.5, 0.0));

    let stats = renderer.render_frame(&mut scene);
    assert!(stats.failed_passes.is_empty());

    let targets = renderer.targets();
    let backend = renderer.backend();
    let decal = backend.draws_with_shader(shaders::DECAL).next().unwrap();
    assert_eq!(decal.target, RenderTarget::Framebuffer(targets.decal_scratch));
    assert_eq!(decal.draw_buffers, vec![0]);
    assert_eq!(decal.state.cull_mode, CullMode::Front);
    assert_eq!(decal.state.blend, Some(BlendState::alpha_blending()));
    assert_eq!(decal.mesh, Some(renderer.shared().unit_cube));
    assert!(matches!(
        decal.uniform("u_decal_texture"),
        Some(UniformValue::Texture { slot: 4, .. })
    ));

    // The G-buffer albedo carries the geometry draw plus the decal
    let albedo = targets.gbuffer_texture(backend, 0).unwrap();
    assert_eq!(backend.texture(albedo).unwrap().draw_count, 2);
}

#[test]
fn test_decal_without_albedo_is_ignored() {
    let mut renderer = deferred_renderer();
    let mut scene = empty_scene();
    add_cube(&mut scene, renderer.backend_mut(), "cube", Material::new("grey"), Vec3::ZERO);
    scene.add_decal("blank", Default::default(), Default::default());

    renderer.render_frame(&mut scene);
    assert_eq!(renderer.backend().draws_with_shader(shaders::DECAL).count(), 0);
}

#[rstest]
#[case::gbuffers(RenderMode::GBuffers, 3, 1)]
#[case::ssao(RenderMode::Ssao, 1, 0)]
fn test_buffer_debug_views(
    #[case] mode: RenderMode,
    #[case] quads: usize,
    #[case] depth_quads: usize,
) {
    let mut renderer = renderer(RendererConfig::default().with_render_mode(mode));
    let mut scene = lit_cube_scene(renderer.backend_mut());

    let stats = renderer.render_frame(&mut scene);
    assert!(stats.failed_passes.is_empty());
    let backend = renderer.backend();
    assert_eq!(backend.draws_with_shader(shaders::QUAD_TEXTURE).count(), quads);
    assert_eq!(backend.draws_with_shader(shaders::QUAD_DEPTH).count(), depth_quads);
    assert_eq!(backend.draws_with_shader(shaders::DEFERRED_AMBIENT).count(), 0);
    assert_eq!(backend.draws_with_shader(shaders::COMPOSITE).count(), 0);
    assert_eq!(backend.screen_draw_count() as usize, quads + depth_quads);
    assert!(backend
        .draws_with_shader(shaders::QUAD_TEXTURE)
        .all(|d| d.target == RenderTarget::Screen));
}

#[test]
fn test_gbuffer_quadrants() {
    let mut renderer = renderer(RendererConfig::default().with_render_mode(RenderMode::GBuffers));
    let mut scene = lit_cube_scene(renderer.backend_mut());
    renderer.render_frame(&mut scene);

    let backend = renderer.backend();
    let half = common::WIDTH as f32 / 2.0;
    let origins: Vec<_> = backend
        .draws()
        .iter()
        .filter(|d| d.shader == shaders::QUAD_TEXTURE || d.shader == shaders::QUAD_DEPTH)
        .map(|d| (d.viewport.x, d.viewport.y))
        .collect();
    assert_eq!(origins, vec![(0.0, 0.0), (half, 0.0), (0.0, half), (half, half)]);
}

#[test]
fn test_missing_lighting_shader_keeps_frame_going() {
    let mut renderer = deferred_renderer();
    renderer.backend_mut().remove_shader(shaders::DEFERRED_AMBIENT);
    let mut scene = lit_cube_scene(renderer.backend_mut());

    let stats = renderer.render_frame(&mut scene);
    assert!(stats.failed_passes.is_empty());
    let backend = renderer.backend();
    assert_eq!(backend.draws_with_shader(shaders::DEFERRED_LIGHT_QUAD).count(), 1);
    assert_eq!(backend.draws_with_shader(shaders::COMPOSITE).count(), 1);
}

#[rstest]
#[case::deferred(PipelineMode::Deferred, "gbuffer")]
#[case::forward(PipelineMode::Forward, "forward")]
fn test_failing_stage_is_skipped(#[case] pipeline: PipelineMode, #[case] stage: &str) {
    let mut renderer = renderer(RendererConfig::default().with_pipeline(pipeline));
    let mut scene = empty_scene();
    add_cube(&mut scene, renderer.backend_mut(), "broken", Material::new("grey"), Vec3::ZERO);
    let mesh = scene.assets.meshes.values().next().unwrap().handle.unwrap();
    renderer.backend_mut().destroy_mesh(mesh);

    let stats = renderer.render_frame(&mut scene);
    assert_eq!(stats.failed_passes, vec![stage]);
    assert_eq!(renderer.backend().render_state(), RenderState::default());

    // The next frame starts from a clean device
    renderer.backend_mut().clear_log();
    let stats = renderer.render_frame(&mut scene);
    assert_eq!(stats.failed_passes, vec![stage]);
    if pipeline == PipelineMode::Deferred {
        assert_eq!(renderer.backend().draws_with_shader(shaders::COMPOSITE).count(), 1);
    }
}

#[test]
fn test_post_chain_feeds_composite() {
    let mut post = PostProcessConfig::default();
    post.depth_of_field.enabled = true;
    let mut renderer = renderer(RendererConfig::default().with_post(post));
    let mut scene = lit_cube_scene(renderer.backend_mut());
    renderer.render_frame(&mut scene);

    // Volumetric, bloom and depth of field alternate between the two targets
    let targets = renderer.targets();
    let backend = renderer.backend();
    let first = FrameTargets::color(backend, targets.post[0]).unwrap();
    let second = FrameTargets::color(backend, targets.post[1]).unwrap();
    let dof = backend.draws_with_shader(shaders::DEPTH_OF_FIELD).next().unwrap();
    assert_eq!(dof.uniform("u_texture").and_then(UniformValue::as_texture), Some(second));
    assert_eq!(dof.target, RenderTarget::Framebuffer(targets.post[0]));

    let composite = backend.draws_with_shader(shaders::COMPOSITE).next().unwrap();
    assert_eq!(composite.uniform("u_texture").and_then(UniformValue::as_texture), Some(first));
}
