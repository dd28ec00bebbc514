use crate::bake::PASS_COLOR;
use crate::bake::node::BakeNode;
use crate::bake::targets::{LightmapCache, TexturePool};
use crate::render::device::{FilterPass, RenderDevice};
use crate::scene::Scene;

/// Two successive 1-texel dilations per pass (one "double dilation").
const DILATE_ITERATIONS: usize = 2;

/// Post-filter stage: seam-filling dilation plus optional bilateral
/// denoising over finished lightmaps.
pub struct LightmapFilters {
    /// `(range, smoothness)` when scene-level lightmap filtering is on.
    denoise: Option<(f32, f32)>,
}

impl LightmapFilters {
    #[must_use]
    pub fn new(scene: &Scene) -> Self {
        Self {
            denoise: scene
                .lightmap_filter_enabled
                .then_some((scene.lightmap_filter_range, scene.lightmap_filter_smoothness)),
        }
    }

    /// Runs the filter chain over every bake node, once after all lights have
    /// contributed.
    ///
    /// Each iteration reads the node's current texture and writes the shared
    /// scratch target for its resolution, then swaps, same ping-pong
    /// discipline as the render loop. When denoising is enabled it replaces
    /// the first dilation of the color pass only; the direction pass is
    /// always plain-dilated.
    pub fn process(
        &self,
        device: &mut dyn RenderDevice,
        pool: &mut TexturePool,
        cache: &mut LightmapCache,
        nodes: &mut [BakeNode],
        pass_count: usize,
    ) {
        for node in nodes {
            for pass in 0..pass_count {
                for iteration in 0..DILATE_ITERATIONS {
                    let filter = match self.denoise {
                        Some((range, smoothness)) if iteration == 0 && pass == PASS_COLOR => {
                            FilterPass::BilateralDenoise { range, smoothness }
                        }
                        _ => FilterPass::Dilate,
                    };

                    let current = node.targets[pass];
                    let scratch = pool.scratch(device, cache, node.resolution);
                    device.draw_filter(filter, device.render_target_color(current), scratch);

                    node.targets[pass] = scratch;
                    pool.put(node.resolution, current);
                }
            }
        }
    }
}
