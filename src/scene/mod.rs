//! Scene graph snapshot the baker operates on.
//!
//! - `Node`: scene node (hierarchy, transform, enabled flag)
//! - `Scene`: node arena plus component pools and scene-level bake settings
//! - `Light`: light component with bake-related state
//! - `MeshComponent` / `MeshInstance`: renderable component and its instances
//! - `Camera`: shadow camera with frustum extraction

pub mod camera;
pub mod light;
pub mod mesh;
pub mod node;
pub mod scene;
pub mod transform;

pub use camera::{Camera, Frustum, ProjectionType};
pub use light::{Light, LightKind, LightMask, ShadowUpdate};
pub use mesh::{InstanceFlags, LightmapArea, MeshComponent, MeshInstance};
pub use node::Node;
pub use scene::{FogMode, Scene};
pub use transform::Transform;

use thunderdome::Index;
pub type NodeIndex = Index;

use slotmap::new_key_type;

new_key_type! {
    pub struct MeshKey;
    pub struct InstanceKey;
    pub struct LightKey;
}
