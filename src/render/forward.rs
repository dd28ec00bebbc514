use smallvec::SmallVec;

use crate::bake::light::VirtualLight;
use crate::bake::material::BakeMaterial;
use crate::render::device::RenderTargetId;
use crate::scene::camera::Camera;
use crate::scene::light::LightKind;
use crate::scene::{InstanceKey, Scene};

/// Per-type light arrays handed to the forward renderer.
///
/// During a bake exactly one light is active at a time; the shader side still
/// expects lights grouped by type, so the one virtual light lands in the
/// array matching its kind.
#[derive(Default)]
pub struct ActiveLights {
    pub directional: SmallVec<[VirtualLight; 1]>,
    pub point: SmallVec<[VirtualLight; 1]>,
    pub spot: SmallVec<[VirtualLight; 1]>,
}

impl ActiveLights {
    #[must_use]
    pub fn with(light: VirtualLight) -> Self {
        let mut lights = Self::default();
        match light.kind {
            LightKind::Directional(_) => lights.directional.push(light),
            LightKind::Point(_) => lights.point.push(light),
            LightKind::Spot(_) => lights.spot.push(light),
        }
        lights
    }

    #[must_use]
    pub fn single(&self) -> Option<&VirtualLight> {
        self.directional
            .first()
            .or_else(|| self.point.first())
            .or_else(|| self.spot.first())
    }
}

/// Forward renderer interface consumed by the baker.
///
/// The host engine implements this over its real shadow-map and forward
/// subsystems; the baker only sequences the calls.
pub trait ForwardRenderer {
    /// Flush pending node transform changes into renderer-side data.
    fn update_transforms(&mut self, scene: &mut Scene);

    /// Update skinned mesh palettes so casters deform correctly in shadow
    /// renders.
    fn update_skinning(&mut self, scene: &mut Scene) {
        let _ = scene;
    }

    /// Submit the set of shadow-casting instances for this bake.
    fn cull_shadow_casters(&mut self, scene: &Scene, casters: &[InstanceKey]);

    /// Render or refresh the shadow map for one virtual light.
    fn render_shadow_map(&mut self, scene: &Scene, light: &VirtualLight, camera: &Camera);

    /// Render `instances` with a single active light into `target`, using the
    /// bake material currently assigned to the instances.
    fn render_forward(
        &mut self,
        scene: &mut Scene,
        camera: &Camera,
        instances: &[InstanceKey],
        lights: &ActiveLights,
        material: &BakeMaterial,
        target: RenderTargetId,
    );

    /// Recompile shader variants after instance feature flags changed.
    fn update_shaders(&mut self, scene: &Scene, instances: &[InstanceKey]);

    // === Clustered lighting path ===

    /// Upload this local light into the shared light texture atlas.
    fn update_light_atlas(&mut self, light: &VirtualLight);

    /// Rebuild cluster data with only this light's bucket.
    fn update_clusters(&mut self, light: &VirtualLight);

    /// Release a per-light shadow-map cache entry (no-op under clustered
    /// lighting).
    fn release_shadow_map(&mut self, light_id: u64);

    /// Drop every cached shadow map (end of a non-clustered bake).
    fn clear_shadow_cache(&mut self);
}
