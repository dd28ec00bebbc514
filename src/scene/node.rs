use crate::scene::transform::Transform;
use crate::scene::{LightKey, MeshKey, NodeIndex};
use glam::Affine3A;
use std::borrow::Cow;

/// A minimal scene node: hierarchy, transform, and component keys.
///
/// Mesh and light data live in the [`Scene`](crate::scene::Scene) component
/// pools; the node only carries the keys. Disabled nodes (and their whole
/// subtree) are invisible to bake enumeration.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: Cow<'static, str>,

    /// Parent node handle (None for root nodes)
    pub(crate) parent: Option<NodeIndex>,
    /// Child node handles
    pub(crate) children: Vec<NodeIndex>,

    pub transform: Transform,
    pub enabled: bool,

    pub mesh: Option<MeshKey>,
    pub light: Option<LightKey>,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Cow::Owned(name.to_string()),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            enabled: true,
            mesh: None,
            light: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("Node")
    }
}
