use rustc_hash::FxHashMap;

use crate::bake::MAX_LIGHTMAP_SIZE;
use crate::bake::node::BakeNode;
use crate::render::device::{RenderDevice, RenderTargetId, TextureDesc, TextureId};
use crate::scene::Scene;
use crate::scene::mesh::MeshComponent;

/// Deterministic per-node lightmap resolution.
///
/// Weights the three face-pair areas of the node's world bounds by the
/// asset's area hints, scales by the scene and per-node multipliers, and
/// rounds up to a power of two so the scratch pool can be keyed by exact
/// resolution.
#[must_use]
pub fn calculate_lightmap_size(
    scene: &Scene,
    component: &MeshComponent,
    bounds: &crate::resources::BoundingBox,
) -> u32 {
    let area = component.area;
    let scale = if bounds.is_empty() {
        glam::Vec3::ZERO
    } else {
        bounds.half_extents()
    };

    let total_area = (area.x * scale.y * scale.z
        + area.y * scale.x * scale.z
        + area.z * scale.x * scale.y)
        / area.uv;

    let size = total_area.max(0.0).sqrt()
        * scene.lightmap_size_multiplier
        * component.lightmap_size_multiplier;

    // Clamp in float space first: infinite or huge sizes (zero uv hint,
    // kilometer-scale bounds) must cap at the maximum, not overflow the cast.
    let max = scene.lightmap_max_resolution.min(MAX_LIGHTMAP_SIZE).max(1);
    let size = (size.ceil().clamp(1.0, max as f32) as u32).next_power_of_two();
    size.clamp(1, max)
}

/// Shared pool of temporary ping-pong render targets, one per distinct
/// lightmap resolution present in the current bake.
///
/// At any instant at most one (light, node, pass) triple holds the scratch
/// target for a given resolution; program order enforces this, no lock.
pub struct TexturePool {
    entries: FxHashMap<u32, RenderTargetId>,
}

impl TexturePool {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// The scratch target for `resolution`, created lazily on first request.
    pub fn scratch(
        &mut self,
        device: &mut dyn RenderDevice,
        cache: &mut LightmapCache,
        resolution: u32,
    ) -> RenderTargetId {
        if let Some(&target) = self.entries.get(&resolution) {
            return target;
        }
        let texture = device.create_texture(&TextureDesc::lightmap(resolution, "lightmap-scratch"));
        cache.acquire(texture);
        let target = device.create_render_target(texture);
        self.entries.insert(resolution, target);
        target
    }

    /// Ping-pong swap: `current` becomes the pool's scratch slot for this
    /// resolution. The caller keeps whatever `scratch` returned earlier.
    pub fn put(&mut self, resolution: u32, current: RenderTargetId) {
        self.entries.insert(resolution, current);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Destroys every pooled target and its backing texture (the pooled
    /// textures never end up bound to mesh instances).
    pub fn destroy(&mut self, device: &mut dyn RenderDevice, cache: &mut LightmapCache) {
        for (_, target) in self.entries.drain() {
            let texture = device.render_target_color(target);
            device.destroy_render_target(target);
            if cache.release(texture) {
                device.destroy_texture(texture);
            }
        }
    }
}

impl Default for TexturePool {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide refcounts for lightmap textures, so a texture still bound to
/// a mesh instance after the bake is not freed with its render target.
pub struct LightmapCache {
    refs: FxHashMap<TextureId, u32>,
}

impl LightmapCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            refs: FxHashMap::default(),
        }
    }

    pub fn acquire(&mut self, texture: TextureId) {
        *self.refs.entry(texture).or_insert(0) += 1;
    }

    /// Returns true when the last reference was dropped and the texture may
    /// be destroyed. Textures this cache never tracked (bound by the host
    /// engine) return false and are left alone.
    pub fn release(&mut self, texture: TextureId) -> bool {
        match self.refs.get_mut(&texture) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                self.refs.remove(&texture);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn ref_count(&self, texture: TextureId) -> u32 {
        self.refs.get(&texture).copied().unwrap_or(0)
    }
}

impl Default for LightmapCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates the per-pass destination targets for one bake node and seeds the
/// scratch pool for its resolution. Never leaves a node partially allocated.
pub fn allocate_node_targets(
    device: &mut dyn RenderDevice,
    pool: &mut TexturePool,
    cache: &mut LightmapCache,
    node: &mut BakeNode,
    resolution: u32,
    pass_count: usize,
) {
    node.resolution = resolution;
    node.targets.clear();
    for _ in 0..pass_count {
        let texture = device.create_texture(&TextureDesc::lightmap(resolution, "lightmap"));
        cache.acquire(texture);
        node.targets.push(device.create_render_target(texture));
    }
    pool.scratch(device, cache, resolution);
}
