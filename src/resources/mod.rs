pub mod bounds;
pub mod material;

pub use bounds::BoundingBox;
pub use material::MaterialId;
