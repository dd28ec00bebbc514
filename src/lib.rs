#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod bake;
pub mod errors;
pub mod render;
pub mod resources;
pub mod scene;

pub use bake::{BakeMode, BakeStats, Lightmapper};
pub use errors::{BakeError, Result};
pub use render::{ForwardRenderer, RenderDevice};
pub use resources::{BoundingBox, MaterialId};
pub use scene::{Light, LightKind, Node, Scene};
