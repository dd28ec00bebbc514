//! Error Types
//!
//! The bake pipeline treats almost every anomalous input as a silent skip
//! rather than a propagated failure: a node without a second UV channel is
//! excluded, a light failing its cull test simply contributes nothing, and an
//! empty scene bakes to a no-op. The variants below cover the remaining
//! caller-misuse cases that genuinely cannot proceed.

use thiserror::Error;

/// The error type for the lightmap baker.
#[derive(Error, Debug)]
pub enum BakeError {
    /// A scene-level bake setting is unusable (e.g. a zero maximum
    /// resolution or a zero size multiplier).
    #[error("Invalid bake configuration: {0}")]
    InvalidConfig(String),

    /// An explicit node list referenced a node that is not in the scene.
    #[error("Unknown scene node passed to bake")]
    UnknownNode,
}

/// Alias for `Result<T, BakeError>`.
pub type Result<T> = std::result::Result<T, BakeError>;
