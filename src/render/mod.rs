//! Interfaces to the external rendering collaborators.
//!
//! The baker owns no GPU resources directly; it drives the host engine's
//! device and forward renderer through these traits. Descriptors use `wgpu`
//! types so a wgpu-backed engine can implement them without translation.

pub mod device;
pub mod forward;

pub use device::{FilterPass, RenderDevice, RenderTargetId, TextureDesc, TextureId};
pub use forward::{ActiveLights, ForwardRenderer};
