//! Per-body shadow maps.
//!
//! A [`ShadowCaster`] is a square depth-only texture rendered from the light's
//! point of view with standard (non-reversed) depth: cleared to 1.0, nearer
//! fragments win. Colour passes sample it through a comparison sampler that
//! treats everything outside the map as lit.

/// Default edge length of a shadow map in texels.
pub const DEFAULT_SHADOW_MAP_RESOLUTION: u32 = 2048;

/// Depth-only render target owned by one shadow-casting body.
pub struct ShadowCaster {
    pub texture: wgpu::Texture,
    view: wgpu::TextureView,
    resolution: u32,
}

impl ShadowCaster {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Far plane of the light projection.
    pub const CLEAR_VALUE: f32 = 1.0;

    /// Comparison used by the sampler: lit when the fragment is not behind the stored depth.
    pub const SAMPLE_COMPARE: wgpu::CompareFunction = wgpu::CompareFunction::LessEqual;

    /// Create a shadow map with `resolution`² texels (at least 1).
    pub fn new(device: &wgpu::Device, resolution: u32, label: &str) -> Self {
        let resolution = resolution.max(1);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: resolution,
                height: resolution,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            resolution,
        }
    }

    /// Open the depth pass that writes this map, cleared to the far plane.
    pub fn begin_write_pass<'encoder>(
        &'encoder self,
        encoder: &'encoder mut wgpu::CommandEncoder,
    ) -> wgpu::RenderPass<'encoder> {
        crate::pass::begin_depth_pass(encoder, "shadow-map-pass", &self.view, Self::CLEAR_VALUE)
    }

    /// View to bind when sampling the map.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Depth state for pipelines drawing into a shadow map. The slope bias
    /// keeps curved surfaces from shadowing themselves.
    pub fn depth_stencil_state() -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: Self::FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState {
                constant: 2,
                slope_scale: 1.75,
                clamp: 0.0,
            },
        }
    }
}

/// Address mode and border colour for shadow sampling on a device with `features`.
///
/// Clamp-to-border with an opaque white border makes texels outside the map
/// read as "far", i.e. lit. Without the feature the sampler clamps to edge
/// and the shader's own frustum test covers the outside.
pub fn shadow_address_mode(
    features: wgpu::Features,
) -> (wgpu::AddressMode, Option<wgpu::SamplerBorderColor>) {
    if features.contains(wgpu::Features::ADDRESS_MODE_CLAMP_TO_BORDER) {
        (
            wgpu::AddressMode::ClampToBorder,
            Some(wgpu::SamplerBorderColor::OpaqueWhite),
        )
    } else {
        (wgpu::AddressMode::ClampToEdge, None)
    }
}

/// Nearest-filtered comparison sampler shared by all shadow maps.
pub fn create_shadow_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    let (address_mode, border_color) = shadow_address_mode(device.features());
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("shadow-comparison-sampler"),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        compare: Some(ShadowCaster::SAMPLE_COMPARE),
        border_color,
        ..Default::default()
    })
}
