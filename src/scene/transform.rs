use glam::{Affine3A, Mat3, Quat, Vec3};

/// TRS transform with cached local and world matrices.
///
/// The baker operates on a scene snapshot, so there is no per-frame dirty
/// tracking here; [`Scene::update_matrix_world`](crate::scene::Scene::update_matrix_world)
/// recomputes the whole hierarchy before enumeration.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,
        }
    }

    pub fn update_local_matrix(&mut self) {
        self.local_matrix =
            Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position);
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    pub fn set_world_matrix(&mut self, mat: Affine3A) {
        self.world_matrix = mat;
    }

    /// `target` and `up` are in the parent coordinate system.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize();
        if forward.cross(up).length_squared() < 1e-4 {
            return;
        }

        let right = forward.cross(up).normalize();
        let new_up = right.cross(forward).normalize();

        let rot_mat = Mat3::from_cols(right, new_up, -forward);
        self.rotation = Quat::from_mat3(&rot_mat);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
