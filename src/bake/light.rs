use glam::{Quat, Vec3};
use rand::rngs::SmallRng;
use rand::{RngExt, SeedableRng};

use crate::scene::light::{Light, LightKind, LightMask, ShadowUpdate};
use crate::scene::{LightKey, Scene};

/// Seed for ambient hemisphere sampling; fixed so repeated bakes of the same
/// scene produce identical lightmaps.
const AMBIENT_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// One sampled light position/direction handed to the forward renderer.
///
/// Built per virtual-light iteration so the render loop never mutates scene
/// lights to reposition samples.
#[derive(Clone, Debug)]
pub struct VirtualLight {
    pub id: u64,
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub direction: Vec3,
    pub cast_shadows: bool,
    pub is_ambient: bool,
}

/// Snapshot of the restorable fields of one scene light.
///
/// Captured for every light before preparation, whether or not the light
/// ends up contributing to the bake.
#[derive(Clone, Debug)]
pub struct SavedLight {
    pub key: LightKey,
    pub enabled: bool,
    pub mask: LightMask,
    pub is_static: bool,
    pub shadow_update_mode: ShadowUpdate,
}

impl SavedLight {
    #[must_use]
    pub fn capture(key: LightKey, light: &Light) -> Self {
        Self {
            key,
            enabled: light.enabled,
            mask: light.mask,
            is_static: light.is_static,
            shadow_update_mode: light.shadow_update_mode,
        }
    }

    pub fn restore(&self, scene: &mut Scene) {
        if let Some(light) = scene.lights.get_mut(self.key) {
            light.enabled = self.enabled;
            light.mask = self.mask;
            light.is_static = self.is_static;
            light.shadow_update_mode = self.shadow_update_mode;
        }
    }
}

/// Adapts a scene light (or the scene's ambient term) into the uniform
/// virtual-light iteration protocol the orchestrator drives.
pub enum BakeLight {
    Scene {
        key: LightKey,
        /// Base pose captured at preparation time; virtual samples perturb
        /// around it without touching the node.
        position: Vec3,
        direction: Vec3,
        rng: SmallRng,
    },
    Ambient {
        /// Synthetic directional light standing in for the ambient term.
        light: Light,
        num_virtual: u32,
        sphere_part: f32,
        rng: SmallRng,
        /// Direction of the current virtual sample.
        current_dir: Vec3,
    },
}

impl BakeLight {
    #[must_use]
    pub fn wrap(scene: &Scene, key: LightKey) -> Self {
        let (position, direction) = scene.light_pose(key);
        BakeLight::Scene {
            key,
            position,
            direction,
            rng: SmallRng::seed_from_u64(AMBIENT_SEED),
        }
    }

    /// Builds the synthetic ambient bake light. Captures the scene ambient
    /// color now, before the orchestrator blacks it out for the bake.
    #[must_use]
    pub fn ambient(scene: &Scene) -> Self {
        let mut light = Light::new_directional(scene.ambient_color, 1.0);
        light.cast_shadows = true;
        light.bake_dir = false;
        BakeLight::Ambient {
            light,
            num_virtual: scene.ambient_bake_num_samples.clamp(1, 255),
            sphere_part: scene.ambient_bake_sphere_part.clamp(0.0, 1.0),
            rng: SmallRng::seed_from_u64(AMBIENT_SEED),
            current_dir: -Vec3::Y,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_ambient(&self) -> bool {
        matches!(self, BakeLight::Ambient { .. })
    }

    #[must_use]
    pub fn num_virtual_lights(&self, scene: &Scene) -> u32 {
        match self {
            BakeLight::Scene { key, .. } => scene
                .lights
                .get(*key)
                .map_or(1, Light::num_virtual_lights),
            BakeLight::Ambient { num_virtual, .. } => *num_virtual,
        }
    }

    /// Whether this light may contribute to the dominant-direction pass.
    /// Ambient has no meaningful dominant direction.
    #[must_use]
    pub fn bake_dir(&self, scene: &Scene) -> bool {
        match self {
            BakeLight::Scene { key, .. } => scene.lights.get(*key).is_some_and(|l| l.bake_dir),
            BakeLight::Ambient { .. } => false,
        }
    }

    #[must_use]
    pub fn is_directional(&self, scene: &Scene) -> bool {
        match self {
            BakeLight::Scene { key, .. } => {
                scene.lights.get(*key).is_some_and(Light::is_directional)
            }
            BakeLight::Ambient { .. } => true,
        }
    }

    /// Marks the wrapped light enabled and visible for this iteration.
    pub fn start_bake(&mut self, scene: &mut Scene) {
        if let BakeLight::Scene { key, .. } = self {
            if let Some(light) = scene.lights.get_mut(*key) {
                light.enabled = true;
            }
        }
    }

    /// Ends this light's iterations; releases the shadow-map cache entry
    /// unless the clustered atlas owns the maps.
    pub fn end_bake(
        &mut self,
        scene: &mut Scene,
        renderer: &mut dyn crate::render::ForwardRenderer,
    ) {
        match self {
            BakeLight::Scene { key, .. } => {
                let id = scene.lights.get(*key).map(|l| l.id);
                if let Some(light) = scene.lights.get_mut(*key) {
                    light.enabled = false;
                }
                if !scene.clustered_lighting_enabled {
                    if let Some(id) = id {
                        renderer.release_shadow_map(id);
                    }
                }
            }
            BakeLight::Ambient { .. } => {}
        }
    }

    /// Produces the virtual light for sample `index` of `count`.
    ///
    /// Real directional area lights spread samples inside a cone of
    /// `bake_area` degrees around the base direction; the ambient light draws
    /// each sample from the configured part of the upper hemisphere.
    pub fn virtual_light(&mut self, scene: &Scene, index: u32, count: u32) -> VirtualLight {
        match self {
            BakeLight::Scene {
                key,
                position,
                direction,
                rng,
            } => {
                let light = &scene.lights[*key];
                let mut dir = *direction;
                if index > 0 && count > 1 && light.is_directional() && light.bake_area > 0.0 {
                    dir = perturb_in_cone(rng, *direction, light.bake_area.to_radians());
                }
                VirtualLight {
                    id: light.id,
                    kind: light.kind.clone(),
                    color: light.color,
                    intensity: light.intensity,
                    position: *position,
                    direction: dir,
                    cast_shadows: light.cast_shadows,
                    is_ambient: false,
                }
            }
            BakeLight::Ambient {
                light,
                sphere_part,
                rng,
                current_dir,
                ..
            } => {
                let dir = if index == 0 {
                    -Vec3::Y
                } else {
                    sample_hemisphere(rng, *sphere_part)
                };
                *current_dir = dir;
                VirtualLight {
                    id: light.id,
                    kind: light.kind.clone(),
                    color: light.color,
                    intensity: light.intensity / count as f32,
                    position: Vec3::ZERO,
                    direction: dir,
                    cast_shadows: light.cast_shadows,
                    is_ambient: true,
                }
            }
        }
    }
}

/// Uniform direction inside the downward-facing spherical cap covering
/// `sphere_part` of the hemisphere (1.0 = the whole upper hemisphere).
fn sample_hemisphere(rng: &mut SmallRng, sphere_part: f32) -> Vec3 {
    let cos_min = 1.0 - sphere_part;
    let cos_theta = cos_min + (1.0 - cos_min) * rng.random::<f32>();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = rng.random::<f32>() * std::f32::consts::TAU;

    // Cap around +Y, negated so the emission direction points down.
    -Vec3::new(sin_theta * phi.cos(), cos_theta, sin_theta * phi.sin())
}

/// Random direction inside a cone of half-angle `half_angle` around `axis`.
fn perturb_in_cone(rng: &mut SmallRng, axis: Vec3, half_angle: f32) -> Vec3 {
    let cos_min = half_angle.cos();
    let cos_theta = cos_min + (1.0 - cos_min) * rng.random::<f32>();
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = rng.random::<f32>() * std::f32::consts::TAU;

    let local = Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
    let axis = axis.normalize_or_zero();
    if axis == Vec3::ZERO {
        return local;
    }
    Quat::from_rotation_arc(Vec3::Z, axis) * local
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hemisphere_samples_point_downward() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..64 {
            let dir = sample_hemisphere(&mut rng, 1.0);
            assert!(dir.y <= 0.0, "ambient sample must shine downward: {dir:?}");
            assert!((dir.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn sphere_part_restricts_the_cap() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..64 {
            let dir = sample_hemisphere(&mut rng, 0.2);
            // cos(theta) >= 0.8 around straight down
            assert!(-dir.y >= 0.8 - 1e-4, "cap too wide: {dir:?}");
        }
    }

    #[test]
    fn cone_perturbation_stays_near_axis() {
        let mut rng = SmallRng::seed_from_u64(3);
        let axis = Vec3::new(0.3, -0.9, 0.1).normalize();
        for _ in 0..64 {
            let dir = perturb_in_cone(&mut rng, axis, 10f32.to_radians());
            assert!(dir.dot(axis) >= 10f32.to_radians().cos() - 1e-3);
        }
    }
}
