//! Lightmap Bake Pipeline Tests
//!
//! Tests for:
//! - Orchestrator validation and empty-scene behavior
//! - Node enumeration (UV1, disabled subtrees, instancing, subsets)
//! - Per-light render sequencing (virtual samples, direction pass, ambient)
//! - Shadow render scheduling per light type
//! - Texture pooling and final texture lifetime
//! - Restoration of every piece of mutated engine state

use std::collections::{HashMap, HashSet};

use glam::Vec3;

use lumabake::bake::light::VirtualLight;
use lumabake::bake::material::{BakeMaterial, BakePass};
use lumabake::render::{
    ActiveLights, FilterPass, ForwardRenderer, RenderDevice, RenderTargetId, TextureDesc,
    TextureId,
};
use lumabake::resources::BoundingBox;
use lumabake::scene::{
    Camera, FogMode, InstanceKey, LightMask, MeshComponent, MeshInstance, NodeIndex, ShadowUpdate,
};
use lumabake::{BakeError, BakeMode, Light, Lightmapper, Scene};

// ============================================================================
// Mocks
// ============================================================================

#[derive(Default)]
struct MockDevice {
    next_id: u64,
    texture_widths: HashMap<TextureId, u32>,
    live_textures: HashSet<TextureId>,
    targets: HashMap<RenderTargetId, TextureId>,
    created_textures: usize,
    destroyed_textures: usize,
    filters: Vec<FilterPass>,
}

impl RenderDevice for MockDevice {
    fn create_texture(&mut self, desc: &TextureDesc) -> TextureId {
        self.next_id += 1;
        let id = TextureId(self.next_id);
        self.texture_widths.insert(id, desc.width);
        self.live_textures.insert(id);
        self.created_textures += 1;
        id
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        assert!(self.live_textures.remove(&texture), "double free: {texture:?}");
        self.destroyed_textures += 1;
    }

    fn create_render_target(&mut self, color: TextureId) -> RenderTargetId {
        self.next_id += 1;
        let id = RenderTargetId(self.next_id);
        self.targets.insert(id, color);
        id
    }

    fn destroy_render_target(&mut self, target: RenderTargetId) {
        assert!(self.targets.remove(&target).is_some(), "double free: {target:?}");
    }

    fn render_target_color(&self, target: RenderTargetId) -> TextureId {
        self.targets[&target]
    }

    fn draw_filter(&mut self, pass: FilterPass, source: TextureId, destination: RenderTargetId) {
        assert!(self.live_textures.contains(&source));
        assert!(self.targets.contains_key(&destination));
        self.filters.push(pass);
    }
}

#[derive(Default)]
struct MockRenderer {
    culled_casters: Vec<InstanceKey>,
    shadow_renders: usize,
    forward_renders: usize,
    material_passes: Vec<BakePass>,
    fog_during_render: Vec<FogMode>,
    ambient_during_render: Vec<Vec3>,
    released_shadow_maps: Vec<u64>,
    cache_clears: usize,
}

impl ForwardRenderer for MockRenderer {
    fn update_transforms(&mut self, _scene: &mut Scene) {}

    fn cull_shadow_casters(&mut self, _scene: &Scene, casters: &[InstanceKey]) {
        self.culled_casters = casters.to_vec();
    }

    fn render_shadow_map(&mut self, _scene: &Scene, _light: &VirtualLight, _camera: &Camera) {
        self.shadow_renders += 1;
    }

    fn render_forward(
        &mut self,
        scene: &mut Scene,
        _camera: &Camera,
        instances: &[InstanceKey],
        lights: &ActiveLights,
        material: &BakeMaterial,
        _target: RenderTargetId,
    ) {
        assert!(!instances.is_empty());
        assert!(lights.single().is_some(), "exactly one light per bake draw");
        self.forward_renders += 1;
        self.material_passes.push(material.pass);
        self.fog_during_render.push(scene.fog);
        self.ambient_during_render.push(scene.ambient_color);
    }

    fn update_shaders(&mut self, _scene: &Scene, _instances: &[InstanceKey]) {}

    fn update_light_atlas(&mut self, _light: &VirtualLight) {}

    fn update_clusters(&mut self, _light: &VirtualLight) {}

    fn release_shadow_map(&mut self, light_id: u64) {
        self.released_shadow_maps.push(light_id);
    }

    fn clear_shadow_cache(&mut self) {
        self.cache_clears += 1;
    }
}

// ============================================================================
// Scene builders
// ============================================================================

/// A lightmapped single-instance node with the given world bounds.
fn add_lightmapped(
    scene: &mut Scene,
    geometry: u64,
    min: Vec3,
    max: Vec3,
) -> (NodeIndex, InstanceKey) {
    let key = scene.add_instance(MeshInstance::new(geometry, BoundingBox::new(min, max)));
    let mut component = MeshComponent::new();
    component.lightmapped = true;
    component.instances.push(key);
    (scene.add_mesh("mesh", component), key)
}

/// A flat unit quad; resolves to an 8x8 lightmap at default settings.
fn add_unit_quad(scene: &mut Scene, geometry: u64) -> (NodeIndex, InstanceKey) {
    add_lightmapped(
        scene,
        geometry,
        Vec3::new(-0.5, 0.0, -0.5),
        Vec3::new(0.5, 0.0, 0.5),
    )
}

fn add_bake_light(scene: &mut Scene, mut light: Light) -> NodeIndex {
    light.mask |= LightMask::BAKE;
    scene.add_light(light)
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn bake(
    scene: &mut Scene,
    nodes: Option<&[NodeIndex]>,
    mode: BakeMode,
) -> (lumabake::BakeStats, MockDevice, MockRenderer) {
    init_logs();
    let mut device = MockDevice::default();
    let mut renderer = MockRenderer::default();
    let stats = Lightmapper::new()
        .bake(scene, nodes, mode, &mut device, &mut renderer)
        .expect("bake failed");
    (stats, device, renderer)
}

// ============================================================================
// Validation and Empty Scene Tests
// ============================================================================

#[test]
fn empty_scene_bakes_to_a_noop() {
    let mut scene = Scene::new();
    let (stats, device, renderer) = bake(&mut scene, None, BakeMode::ColorOnly);
    assert_eq!(stats.nodes_baked, 0);
    assert_eq!(stats.lights_baked, 0);
    assert_eq!(device.created_textures, 0);
    assert_eq!(renderer.forward_renders, 0);
}

#[test]
fn zero_max_resolution_is_rejected() {
    let mut scene = Scene::new();
    scene.lightmap_max_resolution = 0;
    let mut device = MockDevice::default();
    let mut renderer = MockRenderer::default();
    let err = Lightmapper::new()
        .bake(&mut scene, None, BakeMode::ColorOnly, &mut device, &mut renderer)
        .unwrap_err();
    assert!(matches!(err, BakeError::InvalidConfig(_)));
}

#[test]
fn zero_size_multiplier_is_rejected() {
    let mut scene = Scene::new();
    scene.lightmap_size_multiplier = 0.0;
    let mut device = MockDevice::default();
    let mut renderer = MockRenderer::default();
    let err = Lightmapper::new()
        .bake(&mut scene, None, BakeMode::ColorOnly, &mut device, &mut renderer)
        .unwrap_err();
    assert!(matches!(err, BakeError::InvalidConfig(_)));
}

#[test]
fn unknown_node_in_subset_is_rejected() {
    let mut other = Scene::new();
    let foreign = other.add_node(lumabake::Node::new("elsewhere"));

    let mut scene = Scene::new();
    let mut device = MockDevice::default();
    let mut renderer = MockRenderer::default();
    let err = Lightmapper::new()
        .bake(
            &mut scene,
            Some(&[foreign]),
            BakeMode::ColorOnly,
            &mut device,
            &mut renderer,
        )
        .unwrap_err();
    assert!(matches!(err, BakeError::UnknownNode));
}

// ============================================================================
// End-to-End: Single Quad, Directional Light
// ============================================================================

#[test]
fn single_quad_directional_color_only() {
    let mut scene = Scene::new();
    let (_, instance) = add_unit_quad(&mut scene, 1);
    add_bake_light(&mut scene, Light::new_directional(Vec3::ONE, 3.0));

    let (stats, device, renderer) = bake(&mut scene, None, BakeMode::ColorOnly);

    assert_eq!(stats.nodes_baked, 1);
    assert_eq!(stats.lights_baked, 1);
    assert_eq!(renderer.forward_renders, 1);
    assert_eq!(renderer.shadow_renders, 1);
    assert_eq!(renderer.material_passes, vec![BakePass::Color]);

    let baked = &scene.instances[instance];
    assert!(baked.lightmapped);
    assert_eq!(baked.mask, LightMask::AFFECT_LIGHTMAPPED);
    assert!(baked.shader_flags.contains(lumabake::scene::InstanceFlags::LIGHTMAP));
    assert!(!baked.shader_flags.contains(lumabake::scene::InstanceFlags::DIR_LIGHTMAP));

    let color = baked.lightmap_textures[0].expect("color lightmap bound");
    assert_eq!(device.texture_widths[&color], 8);
    assert!(baked.lightmap_textures[1].is_none());
}

#[test]
fn rebake_releases_previously_bound_lightmaps() {
    init_logs();
    let mut scene = Scene::new();
    let (_, instance) = add_unit_quad(&mut scene, 1);
    add_bake_light(&mut scene, Light::new_directional(Vec3::ONE, 1.0));

    let mut device = MockDevice::default();
    let mut renderer = MockRenderer::default();
    let mut lightmapper = Lightmapper::new();

    lightmapper
        .bake(&mut scene, None, BakeMode::ColorOnly, &mut device, &mut renderer)
        .unwrap();
    let first = scene.instances[instance].lightmap_textures[0].unwrap();

    lightmapper
        .bake(&mut scene, None, BakeMode::ColorOnly, &mut device, &mut renderer)
        .unwrap();
    let second = scene.instances[instance].lightmap_textures[0].unwrap();

    assert_ne!(first, second);
    assert!(
        !device.live_textures.contains(&first),
        "lightmap from the previous bake must be freed once unbound"
    );
    assert!(device.live_textures.contains(&second));
    // Only the freshly bound lightmap survives the second bake
    assert_eq!(device.live_textures.len(), 1);
}

#[test]
fn final_textures_survive_target_cleanup() {
    let mut scene = Scene::new();
    let (_, instance) = add_unit_quad(&mut scene, 1);
    add_bake_light(&mut scene, Light::new_directional(Vec3::ONE, 1.0));

    let (_, device, _) = bake(&mut scene, None, BakeMode::ColorOnly);

    // 1 node target + 1 pooled scratch + the 1x1 black placeholder
    assert_eq!(device.created_textures, 3);
    // scratch and black are freed; the bound lightmap survives
    assert_eq!(device.destroyed_textures, 2);
    assert!(device.targets.is_empty(), "all render targets released");
    let color = scene.instances[instance].lightmap_textures[0].unwrap();
    assert!(device.live_textures.contains(&color));
}

// ============================================================================
// Direction Pass Tests
// ============================================================================

#[test]
fn color_and_direction_binds_both_slots() {
    let mut scene = Scene::new();
    let (_, instance) = add_unit_quad(&mut scene, 1);
    let mut light = Light::new_directional(Vec3::ONE, 1.0);
    light.bake_num_samples = 4; // incompatible with the direction map
    add_bake_light(&mut scene, light);

    let (_, _, renderer) = bake(&mut scene, None, BakeMode::ColorAndDirection);

    // Sample count forced down to one, then one color + one direction draw
    assert_eq!(renderer.forward_renders, 2);
    assert_eq!(
        renderer.material_passes,
        vec![BakePass::Color, BakePass::Direction]
    );

    let baked = &scene.instances[instance];
    assert!(baked.shader_flags.contains(lumabake::scene::InstanceFlags::DIR_LIGHTMAP));
    assert!(baked.lightmap_textures[0].is_some());
    assert!(baked.lightmap_textures[1].is_some());
}

#[test]
fn direction_pass_only_uses_first_virtual_sample() {
    let mut scene = Scene::new();
    add_unit_quad(&mut scene, 1);
    let mut light = Light::new_directional(Vec3::ONE, 1.0);
    light.bake_num_samples = 4;
    light.bake_area = 10.0;
    light.bake_dir = false; // keeps all four samples in dual-pass mode
    add_bake_light(&mut scene, light);

    let (_, _, renderer) = bake(&mut scene, None, BakeMode::ColorAndDirection);

    // 4 color draws, 1 direction draw on the first sample only
    assert_eq!(renderer.forward_renders, 5);
    let direction_draws = renderer
        .material_passes
        .iter()
        .filter(|p| **p == BakePass::Direction)
        .count();
    assert_eq!(direction_draws, 1);
    assert_eq!(renderer.material_passes[1], BakePass::Direction);
}

#[test]
fn area_light_samples_accumulate() {
    let mut scene = Scene::new();
    add_unit_quad(&mut scene, 1);
    let mut light = Light::new_directional(Vec3::ONE, 1.0);
    light.bake_num_samples = 4;
    light.bake_area = 15.0;
    add_bake_light(&mut scene, light);

    let (_, _, renderer) = bake(&mut scene, None, BakeMode::ColorOnly);
    assert_eq!(renderer.forward_renders, 4);
    assert!(renderer.material_passes.iter().all(|p| *p == BakePass::Color));
}

// ============================================================================
// Ambient Bake Tests
// ============================================================================

#[test]
fn ambient_bake_adds_a_light_and_an_ao_pass() {
    let mut scene = Scene::new();
    scene.ambient_color = Vec3::new(0.2, 0.2, 0.3);
    scene.ambient_bake = true;
    scene.ambient_bake_num_samples = 3;
    let (_, instance) = add_unit_quad(&mut scene, 1);

    let (stats, _, renderer) = bake(&mut scene, None, BakeMode::ColorOnly);

    assert_eq!(stats.lights_baked, 1);
    assert_eq!(
        renderer.material_passes,
        vec![BakePass::Color, BakePass::Color, BakePass::AmbientOcclusion]
    );
    assert!(
        scene.instances[instance]
            .shader_flags
            .contains(lumabake::scene::InstanceFlags::AMBIENT_LIGHTMAP)
    );
}

#[test]
fn ambient_never_writes_the_direction_map() {
    let mut scene = Scene::new();
    scene.ambient_bake = true;
    scene.ambient_bake_num_samples = 3;
    add_unit_quad(&mut scene, 1);

    let (_, _, renderer) = bake(&mut scene, None, BakeMode::ColorAndDirection);

    // All three samples survive (ambient has no direction) and none of them
    // touches the direction pass.
    assert_eq!(renderer.forward_renders, 3);
    assert!(
        renderer
            .material_passes
            .iter()
            .all(|p| *p != BakePass::Direction)
    );
}

// ============================================================================
// Enumeration Tests
// ============================================================================

#[test]
fn nodes_without_uv1_are_skipped() {
    let mut scene = Scene::new();
    let (_, instance) = add_unit_quad(&mut scene, 1);
    scene.instances[instance].has_uv1 = false;
    add_bake_light(&mut scene, Light::new_directional(Vec3::ONE, 1.0));

    let (stats, _, renderer) = bake(&mut scene, None, BakeMode::ColorOnly);
    assert_eq!(stats.nodes_baked, 0);
    assert_eq!(renderer.forward_renders, 0);
    assert!(!scene.instances[instance].lightmapped);
}

#[test]
fn disabled_subtrees_are_not_enumerated() {
    let mut scene = Scene::new();
    let (parent, _) = add_unit_quad(&mut scene, 1);

    let child_key = scene.add_instance(MeshInstance::new(
        2,
        BoundingBox::new(Vec3::splat(-1.0), Vec3::splat(1.0)),
    ));
    let mut component = MeshComponent::new();
    component.lightmapped = true;
    component.instances.push(child_key);
    let mut child = lumabake::Node::new("child");
    child.mesh = Some(scene.components.insert(component));
    scene.add_to_parent(child, parent);

    scene.get_node_mut(parent).unwrap().enabled = false;
    add_bake_light(&mut scene, Light::new_directional(Vec3::ONE, 1.0));

    let (stats, _, _) = bake(&mut scene, None, BakeMode::ColorOnly);
    assert_eq!(stats.nodes_baked, 0);
}

#[test]
fn instanced_geometry_splits_into_singletons() {
    let mut scene = Scene::new();
    let (_, a) = add_unit_quad(&mut scene, 7);
    let (_, b) = add_unit_quad(&mut scene, 7); // same geometry id
    add_bake_light(&mut scene, Light::new_directional(Vec3::ONE, 1.0));

    let (stats, _, _) = bake(&mut scene, None, BakeMode::ColorOnly);

    assert_eq!(stats.nodes_baked, 2);
    let tex_a = scene.instances[a].lightmap_textures[0].unwrap();
    let tex_b = scene.instances[b].lightmap_textures[0].unwrap();
    assert_ne!(tex_a, tex_b, "instanced copies must not share a lightmap");
}

#[test]
fn subset_bakes_only_requested_nodes() {
    let mut scene = Scene::new();
    let (wanted, wanted_instance) = add_unit_quad(&mut scene, 1);
    let (_, other_instance) = add_unit_quad(&mut scene, 2);
    add_bake_light(&mut scene, Light::new_directional(Vec3::ONE, 1.0));

    let (stats, _, _) = bake(&mut scene, Some(&[wanted]), BakeMode::ColorOnly);

    assert_eq!(stats.nodes_baked, 1);
    assert!(scene.instances[wanted_instance].lightmapped);
    assert!(!scene.instances[other_instance].lightmapped);
}

// ============================================================================
// Texture Pool Tests
// ============================================================================

#[test]
fn scratch_pool_is_shared_per_resolution() {
    let mut scene = Scene::new();
    add_unit_quad(&mut scene, 1);
    add_unit_quad(&mut scene, 2);
    add_bake_light(&mut scene, Light::new_directional(Vec3::ONE, 1.0));

    let (_, device, _) = bake(&mut scene, None, BakeMode::ColorOnly);
    // 2 node targets + 1 shared scratch (both nodes are 8x8) + black
    assert_eq!(device.created_textures, 4);
}

#[test]
fn scratch_pool_allocates_per_distinct_resolution() {
    let mut scene = Scene::new();
    add_unit_quad(&mut scene, 1);
    add_lightmapped(&mut scene, 2, Vec3::new(-2.0, 0.0, -2.0), Vec3::new(2.0, 0.0, 2.0));
    add_bake_light(&mut scene, Light::new_directional(Vec3::ONE, 1.0));

    let (_, device, _) = bake(&mut scene, None, BakeMode::ColorOnly);
    // 2 node targets + 2 scratches (8x8 and 32x32) + black
    assert_eq!(device.created_textures, 5);
}

// ============================================================================
// Light Culling and Shadow Scheduling Tests
// ============================================================================

#[test]
fn spot_light_outside_range_contributes_nothing() {
    let mut scene = Scene::new();
    add_lightmapped(
        &mut scene,
        1,
        Vec3::new(99.5, 0.0, -0.5),
        Vec3::new(100.5, 0.0, 0.5),
    );
    add_bake_light(&mut scene, Light::new_spot(Vec3::ONE, 1.0, 5.0, 0.3, 0.5));

    let (_, _, renderer) = bake(&mut scene, None, BakeMode::ColorOnly);
    assert_eq!(renderer.forward_renders, 0);
    assert_eq!(renderer.shadow_renders, 0);
}

#[test]
fn point_light_in_range_renders() {
    let mut scene = Scene::new();
    add_unit_quad(&mut scene, 1);
    let light_node = add_bake_light(&mut scene, Light::new_point(Vec3::ONE, 1.0, 10.0));
    scene.get_node_mut(light_node).unwrap().transform.position = Vec3::new(0.0, 2.0, 0.0);

    let (_, _, renderer) = bake(&mut scene, None, BakeMode::ColorOnly);
    assert_eq!(renderer.forward_renders, 1);
    assert_eq!(renderer.shadow_renders, 1);
}

#[test]
fn directional_shadow_map_is_refit_per_node() {
    let mut scene = Scene::new();
    add_unit_quad(&mut scene, 1);
    add_lightmapped(&mut scene, 2, Vec3::new(4.5, 0.0, -0.5), Vec3::new(5.5, 0.0, 0.5));
    add_bake_light(&mut scene, Light::new_directional(Vec3::ONE, 1.0));

    let (_, _, renderer) = bake(&mut scene, None, BakeMode::ColorOnly);
    assert_eq!(renderer.shadow_renders, 2);
}

#[test]
fn local_light_shadow_map_renders_once_per_sample() {
    let mut scene = Scene::new();
    add_unit_quad(&mut scene, 1);
    add_lightmapped(&mut scene, 2, Vec3::new(1.5, 0.0, -0.5), Vec3::new(2.5, 0.0, 0.5));
    let light_node = add_bake_light(&mut scene, Light::new_point(Vec3::ONE, 1.0, 20.0));
    scene.get_node_mut(light_node).unwrap().transform.position = Vec3::new(1.0, 3.0, 0.0);

    let (_, _, renderer) = bake(&mut scene, None, BakeMode::ColorOnly);
    assert_eq!(renderer.forward_renders, 2);
    assert_eq!(renderer.shadow_renders, 1, "one shadow render shared by both nodes");
}

// ============================================================================
// Post-Filter Tests
// ============================================================================

#[test]
fn filter_chain_is_double_dilation_by_default() {
    let mut scene = Scene::new();
    add_unit_quad(&mut scene, 1);
    add_bake_light(&mut scene, Light::new_directional(Vec3::ONE, 1.0));

    let (_, device, _) = bake(&mut scene, None, BakeMode::ColorOnly);
    assert_eq!(device.filters, vec![FilterPass::Dilate, FilterPass::Dilate]);
}

#[test]
fn denoise_replaces_the_first_color_dilation() {
    let mut scene = Scene::new();
    scene.lightmap_filter_enabled = true;
    scene.lightmap_filter_range = 12.0;
    scene.lightmap_filter_smoothness = 0.1;
    add_unit_quad(&mut scene, 1);
    add_bake_light(&mut scene, Light::new_directional(Vec3::ONE, 1.0));

    let (_, device, _) = bake(&mut scene, None, BakeMode::ColorAndDirection);
    assert_eq!(
        device.filters,
        vec![
            FilterPass::BilateralDenoise {
                range: 12.0,
                smoothness: 0.1
            },
            FilterPass::Dilate,
            // direction pass is never denoised
            FilterPass::Dilate,
            FilterPass::Dilate,
        ]
    );
}

// ============================================================================
// State Restoration Tests
// ============================================================================

#[test]
fn lights_are_restored_after_bake() {
    let mut scene = Scene::new();
    add_unit_quad(&mut scene, 1);

    let mut light = Light::new_directional(Vec3::ONE, 1.0);
    light.is_static = true;
    light.shadow_update_mode = ShadowUpdate::None;
    let light_node = add_bake_light(&mut scene, light);
    let key = scene.light_key_of(light_node).unwrap();
    let before_mask = scene.lights[key].mask;

    let (_, _, renderer) = bake(&mut scene, None, BakeMode::ColorOnly);

    let light = &scene.lights[key];
    assert!(light.enabled);
    assert!(light.is_static);
    assert_eq!(light.mask, before_mask);
    assert_eq!(light.shadow_update_mode, ShadowUpdate::None);
    assert_eq!(renderer.released_shadow_maps, vec![light.id]);
    assert_eq!(renderer.cache_clears, 1);
}

#[test]
fn excluded_light_is_untouched_and_unused() {
    let mut scene = Scene::new();
    add_unit_quad(&mut scene, 1);
    // Default mask carries no BAKE bit
    let light_node = scene.add_light(Light::new_point(Vec3::ONE, 1.0, 10.0));
    let key = scene.light_key_of(light_node).unwrap();

    let (stats, _, renderer) = bake(&mut scene, None, BakeMode::ColorOnly);

    assert_eq!(stats.lights_baked, 0);
    assert_eq!(renderer.forward_renders, 0);
    let light = &scene.lights[key];
    assert!(light.enabled);
    assert_eq!(light.mask, LightMask::AFFECT_DYNAMIC);
}

#[test]
fn cast_shadows_flags_are_restored() {
    let mut scene = Scene::new();

    let (baked_node, baked_instance) = add_unit_quad(&mut scene, 1);
    let baked_mesh = scene.get_node(baked_node).unwrap().mesh.unwrap();
    scene.components[baked_mesh].cast_shadows = false;
    scene.components[baked_mesh].cast_shadows_lightmap = true;

    // Lightmapped but not bakeable (no UV1): still a forced shadow caster
    let (other_node, other_instance) = add_unit_quad(&mut scene, 2);
    scene.instances[other_instance].has_uv1 = false;
    let other_mesh = scene.get_node(other_node).unwrap().mesh.unwrap();
    scene.components[other_mesh].cast_shadows = true;
    scene.components[other_mesh].cast_shadows_lightmap = false;

    add_bake_light(&mut scene, Light::new_directional(Vec3::ONE, 1.0));
    let (_, _, renderer) = bake(&mut scene, None, BakeMode::ColorOnly);

    // During the bake only the forced caster was submitted
    assert_eq!(renderer.culled_casters, vec![baked_instance]);
    // Both components return to their live flags afterwards
    assert!(!scene.components[baked_mesh].cast_shadows);
    assert!(scene.components[other_mesh].cast_shadows);
}

#[test]
fn fog_and_ambient_are_neutral_during_and_restored_after() {
    let mut scene = Scene::new();
    scene.fog = FogMode::Exp;
    scene.ambient_color = Vec3::new(0.1, 0.2, 0.3);
    scene.needs_static_prepare = false;
    add_unit_quad(&mut scene, 1);
    add_bake_light(&mut scene, Light::new_directional(Vec3::ONE, 1.0));

    let (_, _, renderer) = bake(&mut scene, None, BakeMode::ColorOnly);

    assert!(renderer.fog_during_render.iter().all(|f| *f == FogMode::None));
    assert!(renderer.ambient_during_render.iter().all(|c| *c == Vec3::ZERO));
    assert_eq!(scene.fog, FogMode::Exp);
    assert_eq!(scene.ambient_color, Vec3::new(0.1, 0.2, 0.3));
    assert!(!scene.needs_static_prepare);
}
