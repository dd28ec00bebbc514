use glam::{Affine3A, Mat4, Quat, Vec3, Vec4};

/// Shadow camera used during the bake.
///
/// Only the projection state and the derived frustum matter here; the baker
/// never presents through this camera, it only hands it to the external
/// shadow renderer and uses the frustum for spot-light culling.
#[derive(Debug, Clone)]
pub struct Camera {
    pub projection_type: ProjectionType,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub ortho_size: f32,

    pub position: Vec3,
    pub rotation: Quat,

    pub(crate) view_matrix: Mat4,
    pub(crate) projection_matrix: Mat4,
    pub(crate) view_projection_matrix: Mat4,
    pub(crate) frustum: Frustum,
}

#[derive(Debug, Clone, Copy)]
pub enum ProjectionType {
    Perspective,
    Orthographic,
}

impl Camera {
    #[must_use]
    pub fn new_perspective(fov_radians: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            projection_type: ProjectionType::Perspective,
            fov: fov_radians,
            aspect,
            near,
            far,
            ortho_size: 10.0,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
            frustum: Frustum::default(),
        };
        cam.update_matrices();
        cam
    }

    #[must_use]
    pub fn new_orthographic(ortho_size: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            projection_type: ProjectionType::Orthographic,
            fov: 0.0,
            aspect: 1.0,
            near,
            far,
            ortho_size,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
            frustum: Frustum::default(),
        };
        cam.update_matrices();
        cam
    }

    /// Recomputes view, projection, view-projection and the frustum from the
    /// current pose and projection parameters. Must be called after any of
    /// them change.
    pub fn update_matrices(&mut self) {
        self.projection_matrix = match self.projection_type {
            ProjectionType::Perspective => {
                Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
            }
            ProjectionType::Orthographic => {
                let w = self.ortho_size * self.aspect;
                let h = self.ortho_size;
                Mat4::orthographic_rh(-w, w, -h, h, self.near, self.far)
            }
        };

        let world = Affine3A::from_rotation_translation(self.rotation, self.position);
        self.view_matrix = Mat4::from(world).inverse();
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
        self.frustum = Frustum::from_matrix(self.view_projection_matrix);
    }

    #[inline]
    #[must_use]
    pub fn view_projection(&self) -> &Mat4 {
        &self.view_projection_matrix
    }

    #[inline]
    #[must_use]
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Frustum {
    planes: [Vec4; 6], // Left, Right, Bottom, Top, Near, Far
}

impl Frustum {
    /// Gribb-Hartmann plane extraction for a wgpu-style [0, 1] depth range.
    #[must_use]
    pub fn from_matrix(m: Mat4) -> Self {
        let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];

        let mut planes = [Vec4::ZERO; 6];
        planes[0] = rows[3] + rows[0];
        planes[1] = rows[3] - rows[0];
        planes[2] = rows[3] + rows[1];
        planes[3] = rows[3] - rows[1];
        planes[4] = rows[2];
        planes[5] = rows[3] - rows[2];

        for plane in &mut planes {
            let length = Vec3::new(plane.x, plane.y, plane.z).length();
            if length > 0.0 {
                *plane /= length;
            }
        }

        Self { planes }
    }

    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        for plane in &self.planes {
            let dist = plane.x * center.x + plane.y * center.y + plane.z * center.z + plane.w;
            if dist < -radius {
                return false;
            }
        }
        true
    }
}
