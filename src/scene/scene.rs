use glam::{Affine3A, Vec3};
use slotmap::SlotMap;
use thunderdome::Arena;

use crate::scene::light::Light;
use crate::scene::mesh::{MeshComponent, MeshInstance};
use crate::scene::node::Node;
use crate::scene::{InstanceKey, LightKey, MeshKey, NodeIndex};

/// Scene-level fog mode, saved and restored around a bake (fog must not leak
/// into accumulated lightmaps).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FogMode {
    None,
    Linear,
    Exp,
    Exp2,
}

/// Scene container: node hierarchy plus component pools and the scene-level
/// bake settings.
///
/// The scene is pure data; GPU work happens behind the
/// [`RenderDevice`](crate::render::RenderDevice) and
/// [`ForwardRenderer`](crate::render::ForwardRenderer) interfaces.
pub struct Scene {
    pub nodes: Arena<Node>,
    pub root_nodes: Vec<NodeIndex>,

    pub components: SlotMap<MeshKey, MeshComponent>,
    pub instances: SlotMap<InstanceKey, MeshInstance>,
    pub lights: SlotMap<LightKey, Light>,

    // === Environment state (captured by the bake session) ===
    pub fog: FogMode,
    pub ambient_color: Vec3,
    /// Set when static batching needs a rebuild; the bake touches static
    /// flags so it raises this on exit.
    pub needs_static_prepare: bool,

    // === Lightmap settings ===
    /// Scene-wide texels-per-unit style multiplier.
    pub lightmap_size_multiplier: f32,
    pub lightmap_max_resolution: u32,
    pub lightmap_filter_enabled: bool,
    pub lightmap_filter_range: f32,
    pub lightmap_filter_smoothness: f32,

    // === Ambient bake settings ===
    pub ambient_bake: bool,
    pub ambient_bake_num_samples: u32,
    /// Fraction of the upper hemisphere ambient sample directions are drawn
    /// from, 0..=1.
    pub ambient_bake_sphere_part: f32,
    pub ambient_bake_occlusion_brightness: f32,
    pub ambient_bake_occlusion_contrast: f32,

    pub clustered_lighting_enabled: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root_nodes: Vec::new(),
            components: SlotMap::with_key(),
            instances: SlotMap::with_key(),
            lights: SlotMap::with_key(),

            fog: FogMode::None,
            ambient_color: Vec3::ZERO,
            needs_static_prepare: false,

            lightmap_size_multiplier: 16.0,
            lightmap_max_resolution: 2048,
            lightmap_filter_enabled: false,
            lightmap_filter_range: 10.0,
            lightmap_filter_smoothness: 0.2,

            ambient_bake: false,
            ambient_bake_num_samples: 1,
            ambient_bake_sphere_part: 0.4,
            ambient_bake_occlusion_brightness: 0.0,
            ambient_bake_occlusion_contrast: 0.0,

            clustered_lighting_enabled: false,
        }
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        let idx = self.nodes.insert(node);
        self.root_nodes.push(idx);
        idx
    }

    pub fn add_to_parent(&mut self, child: Node, parent_idx: NodeIndex) -> NodeIndex {
        let idx = self.nodes.insert(child);

        if let Some(p) = self.nodes.get_mut(parent_idx) {
            p.children.push(idx);
        }
        if let Some(c) = self.nodes.get_mut(idx) {
            c.parent = Some(parent_idx);
        }

        idx
    }

    #[must_use]
    pub fn get_node(&self, idx: NodeIndex) -> Option<&Node> {
        self.nodes.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: NodeIndex) -> Option<&mut Node> {
        self.nodes.get_mut(idx)
    }

    // ========================================================================
    // Component helpers
    // ========================================================================

    /// Creates a node carrying a mesh component with the given instances.
    pub fn add_mesh(&mut self, name: &str, component: MeshComponent) -> NodeIndex {
        let mut node = Node::new(name);
        node.mesh = Some(self.components.insert(component));
        self.add_node(node)
    }

    pub fn add_instance(&mut self, instance: MeshInstance) -> InstanceKey {
        self.instances.insert(instance)
    }

    pub fn add_light(&mut self, light: Light) -> NodeIndex {
        let mut node = Node::new("Light");
        node.light = Some(self.lights.insert(light));
        self.add_node(node)
    }

    #[must_use]
    pub fn light_key_of(&self, node_idx: NodeIndex) -> Option<LightKey> {
        self.nodes.get(node_idx)?.light
    }

    /// World-space position and emission direction of a light.
    ///
    /// Lights emit along their node's -Y axis.
    #[must_use]
    pub fn light_pose(&self, key: LightKey) -> (Vec3, Vec3) {
        for (_, node) in &self.nodes {
            if node.light == Some(key) {
                let world = node.world_matrix();
                let pos = Vec3::from(world.translation);
                let dir = world.transform_vector3(-Vec3::Y).normalize_or_zero();
                return (pos, dir);
            }
        }
        (Vec3::ZERO, -Vec3::Y)
    }

    /// World rotation of the node owning a light.
    #[must_use]
    pub fn light_rotation(&self, key: LightKey) -> glam::Quat {
        for (_, node) in &self.nodes {
            if node.light == Some(key) {
                let (_, rotation, _) = node.world_matrix().to_scale_rotation_translation();
                return rotation;
            }
        }
        glam::Quat::IDENTITY
    }

    // ========================================================================
    // Matrix update pipeline
    // ========================================================================

    /// Recomputes world matrices for the whole hierarchy, iteratively to
    /// survive deep scenes.
    pub fn update_matrix_world(&mut self) {
        let mut stack: Vec<(NodeIndex, Affine3A)> = self
            .root_nodes
            .iter()
            .map(|&idx| (idx, Affine3A::IDENTITY))
            .collect();

        while let Some((idx, parent_world)) = stack.pop() {
            let children = if let Some(node) = self.nodes.get_mut(idx) {
                node.transform.update_local_matrix();
                let world = parent_world * *node.transform.local_matrix();
                node.transform.set_world_matrix(world);
                node.children.clone()
            } else {
                continue;
            };

            let world = *self.nodes[idx].world_matrix();
            for child in children {
                stack.push((child, world));
            }
        }
    }
}
