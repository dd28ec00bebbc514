use smallvec::SmallVec;

use crate::render::device::RenderTargetId;
use crate::resources::BoundingBox;
use crate::scene::{InstanceKey, MeshKey, NodeIndex, Scene};

/// One scene node (or one isolated instanced mesh) queued for baking.
///
/// Owns its per-pass destination render targets for the duration of the bake;
/// the targets are created by the allocator and released when the bake ends,
/// while their color textures live on, bound to the mesh instances.
pub struct BakeNode {
    pub node: NodeIndex,
    pub component: MeshKey,
    /// May be a subset of the component's instances: GPU-instanced copies are
    /// isolated into their own bake node.
    pub instances: Vec<InstanceKey>,

    /// World-space union of the instance bounds, recomputed each bake.
    pub bounds: BoundingBox,
    /// Destination lightmap resolution, filled in by the allocator.
    pub resolution: u32,
    /// One target per pass: slot 0 = color, slot 1 = direction.
    pub targets: SmallVec<[RenderTargetId; 2]>,
}

impl BakeNode {
    #[must_use]
    pub fn new(node: NodeIndex, component: MeshKey, instances: Vec<InstanceKey>) -> Self {
        Self {
            node,
            component,
            instances,
            bounds: BoundingBox::empty(),
            resolution: 0,
            targets: SmallVec::new(),
        }
    }

    /// Recomputes the cached world bounds from the instance bounds union.
    pub fn update_bounds(&mut self, scene: &Scene) {
        let mut bounds = BoundingBox::empty();
        for &key in &self.instances {
            if let Some(instance) = scene.instances.get(key) {
                bounds = bounds.union(&instance.world_bounds);
            }
        }
        self.bounds = bounds;
    }
}
