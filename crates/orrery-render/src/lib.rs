//! wgpu plumbing for Orrery: device and surface, frame encoding, depth and
//! shadow targets, camera matrices, mesh buffers and shader loading.

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod shader;
pub mod shadow;

pub use buffer::{BufferAllocator, MeshBuffer, VertexPositionNormalUv};
pub use camera::Camera;
pub use depth::DepthBuffer;
pub use gpu::{
    RenderContext, RenderContextError, SurfaceError, headless_device,
    init_render_context_blocking,
};
pub use pass::{FrameEncoder, RenderPassBuilder, SPACE_BLACK, begin_depth_pass};
pub use shader::{ShaderError, ShaderLibrary, capture_validation};
pub use shadow::{
    DEFAULT_SHADOW_MAP_RESOLUTION, ShadowCaster, create_shadow_sampler, shadow_address_mode,
};
