//! Offline lightmap baking pipeline.
//!
//! The [`Lightmapper`] converts a scene graph of static, lit meshes and a set
//! of lights into per-node baked-lighting textures: a color lightmap and,
//! optionally, a dominant-light-direction map. It is a synchronous, blocking
//! operation over a snapshot of the scene; every piece of engine state it
//! temporarily mutates (light masks, materials, lightmap bindings, scene
//! fog/ambient, shadow-casting flags) is restored before it returns.

pub mod filters;
pub mod light;
pub mod lightmapper;
pub mod material;
pub mod node;
pub mod shadow;
pub mod targets;

pub use lightmapper::{BakeMode, BakeStats, Lightmapper};

/// Hard upper bound on lightmap resolution, regardless of scene settings.
pub const MAX_LIGHTMAP_SIZE: u32 = 2048;

/// Render-target slot for color accumulation.
pub const PASS_COLOR: usize = 0;
/// Render-target slot for dominant-direction accumulation.
pub const PASS_DIR: usize = 1;
