/// Handle to a GPU texture owned by the host device.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TextureId(pub u64);

/// Handle to a render target (color attachment wrapper around a texture).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RenderTargetId(pub u64);

/// Descriptor for requesting a 2D texture from the device.
#[derive(Clone, Debug)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub mip_level_count: u32,
    pub label: &'static str,
}

impl TextureDesc {
    /// Lightmap accumulation texture: HDR color, single mip, square.
    #[must_use]
    pub fn lightmap(resolution: u32, label: &'static str) -> Self {
        Self {
            width: resolution,
            height: resolution,
            format: wgpu::TextureFormat::Rgba16Float,
            mip_level_count: 1,
            label,
        }
    }
}

/// A full-screen post-filter pass over a finished lightmap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterPass {
    /// Seam filling: an empty texel adopts the first non-empty neighbor.
    Dilate,
    /// Edge-preserving blur run before dilation to knock down sampling noise.
    BilateralDenoise { range: f32, smoothness: f32 },
}

/// GPU device abstraction consumed by the baker.
///
/// Destroying a render target releases only the attachment wrapper; the
/// underlying texture survives (finished lightmaps stay bound to mesh
/// instances after their targets are gone).
pub trait RenderDevice {
    fn create_texture(&mut self, desc: &TextureDesc) -> TextureId;
    fn destroy_texture(&mut self, texture: TextureId);

    fn create_render_target(&mut self, color: TextureId) -> RenderTargetId;
    fn destroy_render_target(&mut self, target: RenderTargetId);

    /// The color texture backing a render target.
    fn render_target_color(&self, target: RenderTargetId) -> TextureId;

    /// Draws a full-screen quad running `pass` over `source`, writing into
    /// `destination`.
    fn draw_filter(&mut self, pass: FilterPass, source: TextureId, destination: RenderTargetId);
}
