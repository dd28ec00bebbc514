use crate::bake::{PASS_COLOR, PASS_DIR};
use crate::resources::MaterialId;
use crate::scene::Scene;

/// Which bake output a material variant produces.
///
/// A single tagged enum replaces per-instance shader-hook injection: the
/// shader-option resolver switches on the variant instead of calling back
/// into the material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BakePass {
    /// Accumulate lit color into the lightmap.
    Color,
    /// Accumulate the dominant light direction, weighted by luminance.
    Direction,
    /// Color accumulation with ambient occlusion applied; used only for the
    /// final virtual sample of the ambient light.
    AmbientOcclusion,
}

impl BakePass {
    /// The render-target slot this variant writes.
    #[must_use]
    pub fn target_slot(self) -> usize {
        match self {
            BakePass::Color | BakePass::AmbientOcclusion => PASS_COLOR,
            BakePass::Direction => PASS_DIR,
        }
    }
}

/// A specialized lit-material variant that redirects shading output into
/// lightmap accumulation instead of framebuffer color.
#[derive(Clone, Debug)]
pub struct BakeMaterial {
    pub id: MaterialId,
    pub pass: BakePass,
    /// Shader chunk injected at the start of the fragment stage.
    pub base_chunk: String,
    /// Shader chunk replacing the end of the fragment stage; blends against
    /// the texture bound as the instance's existing lightmap.
    pub end_chunk: String,
    /// AO remap parameters, only meaningful for `AmbientOcclusion`.
    pub occlusion_brightness: f32,
    pub occlusion_contrast: f32,
}

/// Produces the per-pass material variants used by the render loop.
///
/// Variants are built once per bake and shared across nodes; assignment to a
/// mesh instance is just a `MaterialId` write.
pub struct MaterialVariantFactory {
    color: BakeMaterial,
    direction: BakeMaterial,
    ambient_occlusion: BakeMaterial,
}

impl MaterialVariantFactory {
    #[must_use]
    pub fn new(scene: &Scene) -> Self {
        Self {
            color: BakeMaterial {
                id: MaterialId::next(),
                pass: BakePass::Color,
                base_chunk: chunk_vertex_uv1(),
                end_chunk: String::from(
                    "out_color = vec4<f32>(accumulated.rgb + textureSample(lightmap, lightmap_sampler, uv1).rgb, 1.0);",
                ),
                occlusion_brightness: 0.0,
                occlusion_contrast: 0.0,
            },
            direction: BakeMaterial {
                id: MaterialId::next(),
                pass: BakePass::Direction,
                base_chunk: chunk_vertex_uv1(),
                end_chunk: String::from(
                    "let weight = dot(accumulated.rgb, vec3<f32>(0.2126, 0.7152, 0.0722));\n\
                     let prev = textureSample(lightmap, lightmap_sampler, uv1);\n\
                     out_color = select(prev, vec4<f32>(light_dir * 0.5 + 0.5, weight), weight > prev.a);",
                ),
                occlusion_brightness: 0.0,
                occlusion_contrast: 0.0,
            },
            ambient_occlusion: BakeMaterial {
                id: MaterialId::next(),
                pass: BakePass::AmbientOcclusion,
                base_chunk: chunk_vertex_uv1(),
                end_chunk: String::from(
                    "let ao = clamp((occlusion - 0.5) * (1.0 + ao_contrast) + 0.5 + ao_brightness, 0.0, 1.0);\n\
                     out_color = vec4<f32>(accumulated.rgb * ao + textureSample(lightmap, lightmap_sampler, uv1).rgb, 1.0);",
                ),
                occlusion_brightness: scene.ambient_bake_occlusion_brightness,
                occlusion_contrast: scene.ambient_bake_occlusion_contrast,
            },
        }
    }

    #[must_use]
    pub fn variant(&self, pass: BakePass) -> &BakeMaterial {
        match pass {
            BakePass::Color => &self.color,
            BakePass::Direction => &self.direction,
            BakePass::AmbientOcclusion => &self.ambient_occlusion,
        }
    }
}

/// Vertex-stage override: rasterize into UV1 space instead of clip space.
fn chunk_vertex_uv1() -> String {
    String::from("out.position = vec4<f32>(uv1 * 2.0 - 1.0, 0.5, 1.0);")
}
