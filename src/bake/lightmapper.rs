use std::time::{Duration, Instant};

use glam::Vec3;
use rustc_hash::FxHashSet;

use crate::bake::filters::LightmapFilters;
use crate::bake::light::{BakeLight, SavedLight, VirtualLight};
use crate::bake::material::{BakePass, MaterialVariantFactory};
use crate::bake::node::BakeNode;
use crate::bake::shadow;
use crate::bake::targets::{
    LightmapCache, TexturePool, allocate_node_targets, calculate_lightmap_size,
};
use crate::bake::{PASS_COLOR, PASS_DIR};
use crate::errors::{BakeError, Result};
use crate::render::device::{RenderDevice, TextureDesc, TextureId};
use crate::render::forward::{ActiveLights, ForwardRenderer};
use crate::resources::BoundingBox;
use crate::scene::camera::Camera;
use crate::scene::light::{LightKind, LightMask, ShadowUpdate};
use crate::scene::mesh::InstanceFlags;
use crate::scene::{FogMode, InstanceKey, MeshKey, NodeIndex, Scene};

/// Which maps a bake produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BakeMode {
    ColorOnly,
    ColorAndDirection,
}

impl BakeMode {
    #[must_use]
    pub fn pass_count(self) -> usize {
        match self {
            BakeMode::ColorOnly => 1,
            BakeMode::ColorAndDirection => 2,
        }
    }
}

/// Summary of one bake, also logged at `info` level.
#[derive(Debug, Clone, Default)]
pub struct BakeStats {
    pub nodes_baked: usize,
    pub lights_baked: usize,
    pub shadow_map_renders: usize,
    pub forward_renders: usize,
    pub texture_bytes: u64,
    pub elapsed: Duration,
}

/// Snapshot of every piece of external state the bake mutates, captured up
/// front and restored unconditionally once the bake body finishes.
struct BakeSession {
    fog: FogMode,
    ambient_color: Vec3,
    needs_static_prepare: bool,
    /// Saved `cast_shadows` for every enumerated component, baked or not.
    components: Vec<(MeshKey, bool)>,
    lights: Vec<SavedLight>,
}

impl BakeSession {
    fn capture(scene: &Scene, all_nodes: &[BakeNode]) -> Self {
        let mut components = Vec::with_capacity(all_nodes.len());
        let mut seen = FxHashSet::default();
        for node in all_nodes {
            if seen.insert(node.component) {
                if let Some(component) = scene.components.get(node.component) {
                    components.push((node.component, component.cast_shadows));
                }
            }
        }
        Self {
            fog: scene.fog,
            ambient_color: scene.ambient_color,
            needs_static_prepare: scene.needs_static_prepare,
            components,
            lights: Vec::new(),
        }
    }

    fn restore(&self, scene: &mut Scene) {
        scene.fog = self.fog;
        scene.ambient_color = self.ambient_color;
        scene.needs_static_prepare = self.needs_static_prepare;
        for &(key, cast_shadows) in &self.components {
            if let Some(component) = scene.components.get_mut(key) {
                component.cast_shadows = cast_shadows;
            }
        }
        for light in &self.lights {
            light.restore(scene);
        }
    }
}

/// The orchestrator: enumerates bake nodes, sizes and allocates their
/// textures, prepares bake lights, drives the per-light/per-node/per-pass
/// render loop, post-filters the results, and restores all mutated state.
pub struct Lightmapper {
    cache: LightmapCache,
}

impl Lightmapper {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: LightmapCache::new(),
        }
    }

    /// Bakes lightmaps for `nodes` (or every enabled lightmapped node when
    /// `None`), blocking until every light, node and pass has been rendered
    /// and all touched engine state is restored.
    pub fn bake(
        &mut self,
        scene: &mut Scene,
        nodes: Option<&[NodeIndex]>,
        mode: BakeMode,
        device: &mut dyn RenderDevice,
        renderer: &mut dyn ForwardRenderer,
    ) -> Result<BakeStats> {
        if scene.lightmap_max_resolution == 0 {
            return Err(BakeError::InvalidConfig(
                "lightmap_max_resolution must be at least 1".into(),
            ));
        }
        if scene.lightmap_size_multiplier <= 0.0 {
            return Err(BakeError::InvalidConfig(
                "lightmap_size_multiplier must be positive".into(),
            ));
        }
        if let Some(subset) = nodes {
            for &idx in subset {
                if scene.get_node(idx).is_none() {
                    return Err(BakeError::UnknownNode);
                }
            }
        }

        let start = Instant::now();
        let mut stats = BakeStats::default();

        scene.update_matrix_world();
        renderer.update_transforms(scene);
        renderer.update_skinning(scene);

        let (mut bake_nodes, all_nodes) = collect_bake_nodes(scene, nodes);
        if bake_nodes.is_empty() {
            log::info!("lightmapper: nothing to bake");
            stats.elapsed = start.elapsed();
            return Ok(stats);
        }

        log::info!(
            "lightmapper: baking {} node(s), {} enumerated, mode {:?}",
            bake_nodes.len(),
            all_nodes.len(),
            mode,
        );

        let mut session = BakeSession::capture(scene, &all_nodes);
        let (mut bake_lights, saved_lights) = prepare_lights(scene);
        session.lights = saved_lights;

        // Environment neutralized after light preparation: the ambient bake
        // light has already captured the ambient color.
        scene.fog = FogMode::None;
        scene.ambient_color = Vec3::ZERO;

        let result = self.bake_internal(
            scene,
            device,
            renderer,
            &mut bake_nodes,
            &all_nodes,
            &mut bake_lights,
            mode,
            &mut stats,
        );

        // Restoration runs whether or not the body completed.
        session.restore(scene);
        if !scene.clustered_lighting_enabled {
            renderer.clear_shadow_cache();
        }
        result?;

        stats.nodes_baked = bake_nodes.len();
        stats.lights_baked = bake_lights.len();
        stats.elapsed = start.elapsed();
        log::info!(
            "lightmapper: baked {} node(s) with {} light(s) in {:.1?} ({} shadow renders, {} forward renders, {} KiB)",
            stats.nodes_baked,
            stats.lights_baked,
            stats.elapsed,
            stats.shadow_map_renders,
            stats.forward_renders,
            stats.texture_bytes / 1024,
        );
        Ok(stats)
    }

    fn bake_internal(
        &mut self,
        scene: &mut Scene,
        device: &mut dyn RenderDevice,
        renderer: &mut dyn ForwardRenderer,
        bake_nodes: &mut [BakeNode],
        all_nodes: &[BakeNode],
        bake_lights: &mut [BakeLight],
        mode: BakeMode,
        stats: &mut BakeStats,
    ) -> Result<()> {
        let pass_count = mode.pass_count();
        let mut pool = TexturePool::new();
        let factory = MaterialVariantFactory::new(scene);
        let filters = LightmapFilters::new(scene);

        // === Texture allocation ===
        for node in bake_nodes.iter_mut() {
            node.update_bounds(scene);
            let resolution = scene
                .components
                .get(node.component)
                .map_or(1, |c| calculate_lightmap_size(scene, c, &node.bounds));
            allocate_node_targets(device, &mut pool, &mut self.cache, node, resolution, pass_count);
            stats.texture_bytes +=
                u64::from(resolution) * u64::from(resolution) * 8 * pass_count as u64;
        }

        // === Transition instances into the baking state ===
        let black = device.create_texture(&TextureDesc::lightmap(1, "lightmap-black"));
        self.cache.acquire(black);
        let mut stale: FxHashSet<TextureId> = FxHashSet::default();
        for node in bake_nodes.iter() {
            for &key in &node.instances {
                if let Some(instance) = scene.instances.get_mut(key) {
                    instance.lightmapped = false;
                    instance.mask = LightMask::BAKE;
                    instance.shader_flags = InstanceFlags::empty();
                    for slot in &mut instance.lightmap_textures {
                        if let Some(texture) = slot.take() {
                            stale.insert(texture);
                        }
                    }
                    instance.lightmap_textures = [Some(black), Some(black)];
                }
            }
        }
        // Lightmaps bound by an earlier bake are unreferenced now.
        for texture in stale {
            if self.cache.release(texture) {
                device.destroy_texture(texture);
            }
        }

        // Every enumerated node casts shadows with its lightmap-time flag,
        // whether or not it receives a bake itself.
        for node in all_nodes {
            if let Some(component) = scene.components.get_mut(node.component) {
                component.cast_shadows = component.cast_shadows_lightmap;
            }
        }

        let casters = collect_casters(scene, all_nodes);
        let caster_bounds = union_bounds(scene, &casters);
        renderer.cull_shadow_casters(scene, &casters);

        let baked_instances: Vec<InstanceKey> = bake_nodes
            .iter()
            .flat_map(|n| n.instances.iter().copied())
            .collect();
        renderer.update_shaders(scene, &baked_instances);

        // UV-space rasterization camera shared by every forward pass.
        let bake_camera = Camera::new_orthographic(1.0, 0.0, 1.0);

        let ambient_baked = bake_lights.iter().any(BakeLight::is_ambient);

        // === Per-light render loop ===
        for bake_light in bake_lights.iter_mut() {
            self.bake_one_light(
                scene,
                device,
                renderer,
                bake_nodes,
                bake_light,
                &factory,
                &mut pool,
                &bake_camera,
                &caster_bounds,
                pass_count,
                stats,
            );
        }

        // === Post filtering ===
        filters.process(device, &mut pool, &mut self.cache, bake_nodes, pass_count);

        // === Final state: bind real textures and shader features ===
        for node in bake_nodes.iter() {
            for &key in &node.instances {
                if let Some(instance) = scene.instances.get_mut(key) {
                    instance.mask = LightMask::AFFECT_LIGHTMAPPED;
                    instance.lightmapped = true;
                    instance.shader_flags |= InstanceFlags::LIGHTMAP;
                    if ambient_baked {
                        instance.shader_flags |= InstanceFlags::AMBIENT_LIGHTMAP;
                    }
                    instance.lightmap_textures[PASS_COLOR] =
                        Some(device.render_target_color(node.targets[PASS_COLOR]));
                    if pass_count > 1 {
                        instance.shader_flags |= InstanceFlags::DIR_LIGHTMAP;
                        instance.lightmap_textures[PASS_DIR] =
                            Some(device.render_target_color(node.targets[PASS_DIR]));
                    } else {
                        instance.lightmap_textures[PASS_DIR] = None;
                    }
                }
            }
        }
        renderer.update_shaders(scene, &baked_instances);

        // === Cleanup: targets go away, bound textures survive ===
        for node in bake_nodes.iter_mut() {
            for target in node.targets.drain(..) {
                device.destroy_render_target(target);
            }
        }
        pool.destroy(device, &mut self.cache);
        if self.cache.release(black) {
            device.destroy_texture(black);
        }

        Ok(())
    }

    fn bake_one_light(
        &mut self,
        scene: &mut Scene,
        device: &mut dyn RenderDevice,
        renderer: &mut dyn ForwardRenderer,
        bake_nodes: &mut [BakeNode],
        bake_light: &mut BakeLight,
        factory: &MaterialVariantFactory,
        pool: &mut TexturePool,
        bake_camera: &Camera,
        caster_bounds: &BoundingBox,
        pass_count: usize,
        stats: &mut BakeStats,
    ) {
        let is_ambient = bake_light.is_ambient();
        let directional = bake_light.is_directional(scene);

        let mut num_virtual = bake_light.num_virtual_lights(scene);
        // A single virtual sample keeps the direction map artifact-free when
        // this light contributes to it.
        if pass_count > 1 && bake_light.bake_dir(scene) {
            num_virtual = 1;
        }

        log::debug!(
            "lightmapper: light (ambient: {is_ambient}, directional: {directional}), {num_virtual} virtual sample(s)",
        );

        for virtual_index in 0..num_virtual {
            bake_light.start_bake(scene);
            let virtual_light = bake_light.virtual_light(scene, virtual_index, num_virtual);

            let shadow_camera = prepare_shadow_camera(&virtual_light);
            let mut shadow_rendered = false;

            for node in bake_nodes.iter_mut() {
                if !light_affects_node(scene, &virtual_light, node, shadow_camera.as_ref()) {
                    continue;
                }

                let lights = ActiveLights::with(virtual_light.clone());

                let clustered = scene.clustered_lighting_enabled;
                if clustered && !directional {
                    renderer.update_light_atlas(&virtual_light);
                }

                if virtual_light.cast_shadows {
                    if directional {
                        // The ortho frustum is fitted to the caster volume on
                        // every call.
                        let camera = shadow::fit_directional_camera(caster_bounds);
                        renderer.render_shadow_map(scene, &virtual_light, &camera);
                        stats.shadow_map_renders += 1;
                    } else if !shadow_rendered {
                        if let Some(camera) = shadow_camera.as_ref() {
                            renderer.render_shadow_map(scene, &virtual_light, camera);
                            stats.shadow_map_renders += 1;
                        }
                        shadow_rendered = true;
                    }
                }

                if clustered {
                    renderer.update_clusters(&virtual_light);
                }

                let saved_materials: Vec<_> = node
                    .instances
                    .iter()
                    .map(|&key| (key, scene.instances.get(key).map(|i| i.material)))
                    .collect();

                for pass in 0..pass_count {
                    // Direction accumulation only uses the first virtual
                    // sample, and ambient has no dominant direction.
                    if pass == PASS_DIR && (virtual_index > 0 || is_ambient) {
                        continue;
                    }

                    let variant = if pass == PASS_DIR {
                        BakePass::Direction
                    } else if is_ambient && virtual_index + 1 == num_virtual {
                        BakePass::AmbientOcclusion
                    } else {
                        BakePass::Color
                    };
                    let material = factory.variant(variant);

                    let scratch = pool.scratch(device, &mut self.cache, node.resolution);
                    let current_texture = device.render_target_color(node.targets[pass]);
                    for &key in &node.instances {
                        if let Some(instance) = scene.instances.get_mut(key) {
                            instance.material = material.id;
                            instance.lightmap_textures[pass] = Some(current_texture);
                        }
                    }

                    renderer.render_forward(
                        scene,
                        bake_camera,
                        &node.instances,
                        &lights,
                        material,
                        scratch,
                    );
                    stats.forward_renders += 1;

                    // Ping-pong swap: the scratch becomes this node's current
                    // target, the previous target becomes the shared scratch.
                    let previous = node.targets[pass];
                    node.targets[pass] = scratch;
                    pool.put(node.resolution, previous);

                    let new_texture = device.render_target_color(scratch);
                    for &key in &node.instances {
                        if let Some(instance) = scene.instances.get_mut(key) {
                            instance.lightmap_textures[pass] = Some(new_texture);
                            instance.shader_flags |= InstanceFlags::LIGHTMAP;
                        }
                    }
                }

                for (key, material) in saved_materials {
                    if let (Some(instance), Some(material)) =
                        (scene.instances.get_mut(key), material)
                    {
                        instance.material = material;
                    }
                }
            }

            bake_light.end_bake(scene, renderer);
        }
    }
}

impl Default for Lightmapper {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Enumeration
// ============================================================================

/// Walks the enabled scene graph and produces (a) the nodes to bake and (b)
/// every lightmapped and enabled node, needed later purely for shadow
/// casting.
fn collect_bake_nodes(
    scene: &Scene,
    subset: Option<&[NodeIndex]>,
) -> (Vec<BakeNode>, Vec<BakeNode>) {
    let candidates = enumerate_lightmapped(scene);

    let all_nodes: Vec<BakeNode> = candidates
        .iter()
        .map(|(idx, mesh, instances)| BakeNode::new(*idx, *mesh, instances.clone()))
        .collect();

    let mut bake_nodes = Vec::new();
    let mut seen_geometry: FxHashSet<u64> = FxHashSet::default();

    for (idx, mesh, instances) in &candidates {
        if let Some(wanted) = subset {
            if !wanted.contains(idx) {
                continue;
            }
        }

        // A node missing the second UV channel cannot receive a lightmap;
        // skipped silently, but it still casts shadows via `all_nodes`.
        let missing_uv1 = instances.iter().any(|&key| {
            scene
                .instances
                .get(key)
                .is_some_and(|instance| !instance.has_uv1)
        });
        if missing_uv1 {
            log::warn!(
                "lightmapper: node {:?} has mesh instances without UV1, skipping",
                scene.get_node(*idx).map(|n| n.name.clone()),
            );
            continue;
        }

        // Instanced copies of a mesh cannot share a baked texture: any
        // instance whose geometry was already seen goes into its own node.
        let mut grouped = Vec::new();
        for &key in instances {
            let Some(instance) = scene.instances.get(key) else {
                continue;
            };
            if seen_geometry.insert(instance.geometry) {
                grouped.push(key);
            } else {
                bake_nodes.push(BakeNode::new(*idx, *mesh, vec![key]));
            }
        }
        if !grouped.is_empty() {
            bake_nodes.push(BakeNode::new(*idx, *mesh, grouped));
        }
    }

    (bake_nodes, all_nodes)
}

/// Depth-first traversal over enabled nodes only; disabled subtrees are
/// skipped entirely. Iterative to survive deep hierarchies.
fn enumerate_lightmapped(scene: &Scene) -> Vec<(NodeIndex, MeshKey, Vec<InstanceKey>)> {
    let mut result = Vec::new();
    let mut stack: Vec<NodeIndex> = scene.root_nodes.iter().rev().copied().collect();

    while let Some(idx) = stack.pop() {
        let Some(node) = scene.get_node(idx) else {
            continue;
        };
        if !node.enabled {
            continue;
        }

        if let Some(mesh_key) = node.mesh {
            if let Some(component) = scene.components.get(mesh_key) {
                if component.enabled && component.lightmapped && !component.instances.is_empty() {
                    result.push((idx, mesh_key, component.instances.clone()));
                }
            }
        }

        for &child in node.children().iter().rev() {
            stack.push(child);
        }
    }

    result
}

// ============================================================================
// Light preparation
// ============================================================================

/// Builds the bake light list (ambient first) and the unconditional
/// restoration list covering every scene light.
fn prepare_lights(scene: &mut Scene) -> (Vec<BakeLight>, Vec<SavedLight>) {
    let mut bake_lights = Vec::new();
    let mut saved = Vec::new();

    if scene.ambient_bake {
        bake_lights.push(BakeLight::ambient(scene));
    }

    let keys: Vec<_> = scene.lights.keys().collect();
    for key in keys {
        let Some(light) = scene.lights.get(key) else {
            continue;
        };
        saved.push(SavedLight::capture(key, light));

        if !(light.enabled && light.mask.contains(LightMask::BAKE)) {
            continue;
        }

        let wrapped = BakeLight::wrap(scene, key);
        let directional = light.is_directional();
        if let Some(light) = scene.lights.get_mut(key) {
            // Sampled with everything visible: static-batching exclusion and
            // the real-time affect mask must not suppress the light mid-bake.
            light.is_static = false;
            light.mask = LightMask::ALL;
            light.shadow_update_mode = if directional {
                ShadowUpdate::EveryFrame
            } else {
                ShadowUpdate::ThisFrame
            };
        }
        bake_lights.push(wrapped);
    }

    (bake_lights, saved)
}

// ============================================================================
// Culling and shadow helpers
// ============================================================================

/// Spot lights get a perspective camera derived from the light pose; point
/// lights get a pose-and-range carrier (face setup is the shadow renderer's
/// business); directional cameras are fitted per caster volume instead.
fn prepare_shadow_camera(light: &VirtualLight) -> Option<Camera> {
    match &light.kind {
        LightKind::Directional(_) => None,
        LightKind::Point(point) => {
            let mut camera = Camera::new_perspective(
                std::f32::consts::FRAC_PI_2,
                1.0,
                point.range / 1000.0,
                point.range,
            );
            camera.position = light.position;
            camera.update_matrices();
            Some(camera)
        }
        LightKind::Spot(spot) => {
            let rotation = rotation_from_direction(light.direction);
            Some(shadow::prepare_spot_camera(
                light.position,
                rotation,
                spot.range,
                spot.outer_cone,
            ))
        }
    }
}

/// Rotation taking the light convention axis (-Y) onto `direction`.
fn rotation_from_direction(direction: Vec3) -> glam::Quat {
    let dir = direction.normalize_or_zero();
    if dir == Vec3::ZERO {
        glam::Quat::IDENTITY
    } else {
        glam::Quat::from_rotation_arc(-Vec3::Y, dir)
    }
}

/// Directional lights affect every node; local lights must overlap the node
/// bounds, and spot lights additionally need one instance inside the shadow
/// camera frustum.
fn light_affects_node(
    scene: &Scene,
    light: &VirtualLight,
    node: &BakeNode,
    shadow_camera: Option<&Camera>,
) -> bool {
    match &light.kind {
        LightKind::Directional(_) => true,
        LightKind::Point(point) => node.bounds.intersects_sphere(light.position, point.range),
        LightKind::Spot(spot) => {
            if !node.bounds.intersects_sphere(light.position, spot.range) {
                return false;
            }
            let Some(camera) = shadow_camera else {
                return false;
            };
            node.instances.iter().any(|&key| {
                scene.instances.get(key).is_some_and(|instance| {
                    let (center, radius) = instance.bounding_sphere();
                    camera.frustum().intersects_sphere(center, radius)
                })
            })
        }
    }
}

/// Shadow-casting instances from every enumerated node, post cast-shadows
/// forcing.
fn collect_casters(scene: &Scene, all_nodes: &[BakeNode]) -> Vec<InstanceKey> {
    let mut casters = Vec::new();
    let mut seen = FxHashSet::default();
    for node in all_nodes {
        let Some(component) = scene.components.get(node.component) else {
            continue;
        };
        if !component.cast_shadows {
            continue;
        }
        for &key in &node.instances {
            if seen.insert(key) {
                casters.push(key);
            }
        }
    }
    casters
}

fn union_bounds(scene: &Scene, instances: &[InstanceKey]) -> BoundingBox {
    let mut bounds = BoundingBox::empty();
    for &key in instances {
        if let Some(instance) = scene.instances.get(key) {
            bounds = bounds.union(&instance.world_bounds);
        }
    }
    bounds
}
