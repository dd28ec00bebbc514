use bitflags::bitflags;
use glam::Vec3;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

bitflags! {
    /// Which categories of geometry a light affects.
    ///
    /// `BAKE` marks a light as a lightmap contributor; during the bake the
    /// orchestrator temporarily widens the mask to [`LightMask::ALL`] so the
    /// real-time affect restriction cannot suppress the light while it is
    /// being sampled.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct LightMask: u32 {
        const AFFECT_DYNAMIC     = 1 << 0;
        const AFFECT_LIGHTMAPPED = 1 << 1;
        const BAKE               = 1 << 2;
        const ALL = Self::AFFECT_DYNAMIC.bits()
            | Self::AFFECT_LIGHTMAPPED.bits()
            | Self::BAKE.bits();
    }
}

impl Default for LightMask {
    fn default() -> Self {
        LightMask::AFFECT_DYNAMIC
    }
}

/// When a light's shadow map is re-rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowUpdate {
    None,
    /// Render once on the next frame, then fall back to `None`.
    ThisFrame,
    EveryFrame,
}

#[derive(Debug, Clone)]
pub struct DirectionalLight;

#[derive(Debug, Clone)]
pub struct PointLight {
    pub range: f32,
}

#[derive(Debug, Clone)]
pub struct SpotLight {
    pub range: f32,
    pub inner_cone: f32,
    pub outer_cone: f32,
}

#[derive(Debug, Clone)]
pub enum LightKind {
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

/// Light component.
///
/// Lights emit along their node's **-Y** axis; position and direction are
/// derived from the owning node's world matrix via
/// [`Scene::light_pose`](crate::scene::Scene::light_pose).
#[derive(Debug, Clone)]
pub struct Light {
    pub uuid: Uuid,
    pub id: u64,
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,

    pub enabled: bool,
    pub cast_shadows: bool,
    pub mask: LightMask,
    /// Static lights are skipped by the real-time static-batching path; the
    /// bake forces this off so the light is not excluded mid-bake.
    pub is_static: bool,
    pub shadow_update_mode: ShadowUpdate,

    /// Number of virtual samples used to approximate an area light (1..=255).
    pub bake_num_samples: u32,
    /// Cone half-angle in degrees over which directional virtual samples are
    /// spread.
    pub bake_area: f32,
    /// Whether this light may contribute to the dominant-direction pass.
    pub bake_dir: bool,
}

impl Light {
    fn generate_id_from_uuid(uuid: &Uuid) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        uuid.hash(&mut hasher);
        hasher.finish()
    }

    fn base(kind: LightKind, color: Vec3, intensity: f32) -> Self {
        let uuid = Uuid::new_v4();
        Self {
            uuid,
            id: Self::generate_id_from_uuid(&uuid),
            color,
            intensity,
            kind,
            enabled: true,
            cast_shadows: true,
            mask: LightMask::default(),
            is_static: false,
            shadow_update_mode: ShadowUpdate::EveryFrame,
            bake_num_samples: 1,
            bake_area: 0.0,
            bake_dir: true,
        }
    }

    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32) -> Self {
        Self::base(LightKind::Directional(DirectionalLight), color, intensity)
    }

    #[must_use]
    pub fn new_point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self::base(LightKind::Point(PointLight { range }), color, intensity)
    }

    #[must_use]
    pub fn new_spot(
        color: Vec3,
        intensity: f32,
        range: f32,
        inner_cone: f32,
        outer_cone: f32,
    ) -> Self {
        Self::base(
            LightKind::Spot(SpotLight {
                range,
                inner_cone,
                outer_cone,
            }),
            color,
            intensity,
        )
    }

    #[inline]
    #[must_use]
    pub fn is_directional(&self) -> bool {
        matches!(self.kind, LightKind::Directional(_))
    }

    /// Outer influence range for local lights; directional lights are
    /// unbounded and return `None`.
    #[must_use]
    pub fn range(&self) -> Option<f32> {
        match &self.kind {
            LightKind::Directional(_) => None,
            LightKind::Point(point) => Some(point.range),
            LightKind::Spot(spot) => Some(spot.range),
        }
    }

    /// Clamped virtual-light count used by the bake loop.
    #[must_use]
    pub fn num_virtual_lights(&self) -> u32 {
        self.bake_num_samples.clamp(1, 255)
    }
}
