use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_MATERIAL_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque handle to a material owned by the host engine's material system.
///
/// The baker never inspects materials it did not create itself; it only saves
/// the handles bound to mesh instances, substitutes its own bake variants
/// during the render loop, and puts the originals back afterwards.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MaterialId(u64);

impl MaterialId {
    /// Allocates a fresh, process-unique material handle.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_MATERIAL_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}
