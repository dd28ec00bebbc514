//! Shadow-camera preparation for the bake loop.
//!
//! Pure functions: the orchestrator feeds the result straight to the
//! external shadow renderer and uses the frustum for spot culling.

use glam::{Quat, Vec3};
use std::f32::consts::FRAC_PI_2;

use crate::resources::BoundingBox;
use crate::scene::camera::Camera;

/// Ratio between a spot camera's far and near clip planes.
const SPOT_NEAR_RATIO: f32 = 1000.0;

/// Perspective shadow camera for a spot light.
///
/// Lights emit along their node's -Y while cameras look along -Z, so the
/// light orientation is corrected by a fixed -90° tilt around X. The frustum
/// is recomputed before returning.
#[must_use]
pub fn prepare_spot_camera(
    position: Vec3,
    rotation: Quat,
    range: f32,
    outer_cone: f32,
) -> Camera {
    let mut camera = Camera::new_perspective(
        (outer_cone * 2.0).clamp(0.01, std::f32::consts::PI - 0.01),
        1.0,
        range / SPOT_NEAR_RATIO,
        range,
    );
    camera.position = position;
    camera.rotation = rotation * Quat::from_rotation_x(-FRAC_PI_2);
    camera.update_matrices();
    camera
}

/// Orthographic shadow camera fitted over the union of all shadow-caster
/// bounds: positioned above the caster volume, looking straight down, with
/// the ortho half-size covering the horizontal extent and near/far spanning
/// the vertical extent.
#[must_use]
pub fn fit_directional_camera(caster_bounds: &BoundingBox) -> Camera {
    let (center, half) = if caster_bounds.is_empty() {
        (Vec3::ZERO, Vec3::ONE)
    } else {
        (caster_bounds.center(), caster_bounds.half_extents())
    };

    let mut camera =
        Camera::new_orthographic(half.x.max(half.z).max(1e-3), 0.0, (half.y * 2.0).max(1e-3));
    camera.position = center + Vec3::Y * half.y;
    camera.rotation = Quat::from_rotation_x(-FRAC_PI_2);
    camera.update_matrices();
    camera
}
