//! Per-body uniform block shared by the depth and colour passes.

use bytemuck::{Pod, Zeroable};

use crate::surface::SurfaceUniforms;

/// Upper bound on bodies in one scene; sizes the `bodyPosRadii` array.
pub const MAX_BODIES: usize = 16;

/// Which pass a uniform block is filled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Light-space depth pass writing the body's shadow map.
    ShadowDepth,
    /// Main camera pass.
    Color,
}

/// GPU layout of `BodyUniforms` in `common.wgsl`.
///
/// WGSL names follow the shader's camelCase (`cameraWorldPos`,
/// `lightViewMatrix`, `bodyPosRadii`, ...). Every `vec3` is packed with the
/// scalar that follows it so no implicit padding appears.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BodyUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub light_view: [[f32; 4]; 4],
    pub light_projection: [[f32; 4]; 4],

    pub camera_world_pos: [f32; 3],
    pub radius: f32,
    pub planet_center: [f32; 3],
    pub screen_height: f32,
    pub light_position: [f32; 3],
    pub fov: f32,
    pub sun_pos_rad: [f32; 4],

    pub target_pixel_size: f32,
    pub tessellate: u32,
    pub num_bodies: u32,
    pub enable_eclipse: u32,

    pub only_depth: u32,
    pub use_shadow_map: u32,
    pub kind: u32,
    pub time: f32,

    pub body_pos_radii: [[f32; 4]; MAX_BODIES],
    pub surface: SurfaceUniforms,
}

impl BodyUniforms {
    pub const SIZE: wgpu::BufferAddress = std::mem::size_of::<Self>() as wgpu::BufferAddress;
}
