use bitflags::bitflags;

use crate::render::device::TextureId;
use crate::resources::{BoundingBox, MaterialId};
use crate::scene::InstanceKey;
use crate::scene::light::LightMask;

bitflags! {
    /// Shader-variant feature bits OR'd into a mesh instance's key so the
    /// real-time shader picks up the baked result on the next frame.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct InstanceFlags: u32 {
        const LIGHTMAP         = 1 << 0;
        const DIR_LIGHTMAP     = 1 << 1;
        const AMBIENT_LIGHTMAP = 1 << 2;
    }
}

/// Per-asset area hints used by lightmap size calculation.
///
/// `x`/`y`/`z` weight the three face-pair areas of the node bounds, `uv`
/// compensates for UV-space coverage of the unwrap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightmapArea {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub uv: f32,
}

impl Default for LightmapArea {
    fn default() -> Self {
        Self {
            x: 1.0,
            y: 1.0,
            z: 1.0,
            uv: 1.0,
        }
    }
}

/// The renderable component attached to a scene node.
#[derive(Debug, Clone)]
pub struct MeshComponent {
    pub enabled: bool,
    /// Marks the component as a lightmap receiver.
    pub lightmapped: bool,
    /// Live shadow-casting flag; saved and restored around the bake.
    pub cast_shadows: bool,
    /// Value forced into `cast_shadows` for the duration of the bake.
    pub cast_shadows_lightmap: bool,

    /// Per-node resolution multiplier on top of the scene-wide one.
    pub lightmap_size_multiplier: f32,
    pub area: LightmapArea,

    pub instances: Vec<InstanceKey>,
}

impl MeshComponent {
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: true,
            lightmapped: false,
            cast_shadows: true,
            cast_shadows_lightmap: true,
            lightmap_size_multiplier: 1.0,
            area: LightmapArea::default(),
            instances: Vec::new(),
        }
    }
}

impl Default for MeshComponent {
    fn default() -> Self {
        Self::new()
    }
}

/// One drawable mesh instance.
///
/// `geometry` identifies the underlying mesh resource; two instances sharing
/// a geometry id are treated as GPU-instanced by bake enumeration and split
/// into their own bake nodes.
#[derive(Debug, Clone)]
pub struct MeshInstance {
    pub geometry: u64,
    /// Whether the vertex format carries the second UV channel lightmaps
    /// sample through.
    pub has_uv1: bool,
    pub world_bounds: BoundingBox,

    pub material: MaterialId,
    pub mask: LightMask,
    /// Whether this instance is marked as a lightmap receiver. Cleared while
    /// the instance is being baked, set again when the final texture is bound.
    pub lightmapped: bool,

    /// Realtime lightmap inputs: slot 0 = color, slot 1 = direction.
    pub lightmap_textures: [Option<TextureId>; 2],
    pub shader_flags: InstanceFlags,
}

impl MeshInstance {
    #[must_use]
    pub fn new(geometry: u64, world_bounds: BoundingBox) -> Self {
        Self {
            geometry,
            has_uv1: true,
            world_bounds,
            material: MaterialId::next(),
            mask: LightMask::AFFECT_DYNAMIC,
            lightmapped: false,
            lightmap_textures: [None, None],
            shader_flags: InstanceFlags::empty(),
        }
    }

    /// Center and radius of the instance's bounding sphere, for frustum tests.
    #[must_use]
    pub fn bounding_sphere(&self) -> (glam::Vec3, f32) {
        (
            self.world_bounds.center(),
            self.world_bounds.bounding_radius(),
        )
    }
}
