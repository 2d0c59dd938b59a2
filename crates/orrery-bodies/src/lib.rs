//! Orbiting celestial bodies for Orrery.
//!
//! [`BodySystem`] owns the body arena and advances the closed-form orbits;
//! [`BodyRenderer`] draws it with per-body shadow maps, eclipse occlusion
//! and a screen-space icosphere LOD.

pub mod body;
pub mod icosphere;
pub mod orbit;
pub mod renderer;
pub mod surface;
pub mod system;
pub mod tessellation;
pub mod uniforms;

pub use body::{BodyId, BodyKind, BodyKindTag, LightFrame, OrbitingBody};
pub use icosphere::{Icosphere, lod_chain};
pub use orbit::{Orbit, OrbitError, OrbitParams};
pub use renderer::{BodyRenderError, BodyRenderer};
pub use surface::{EarthSurface, StarSurface, SurfaceUniforms};
pub use system::{BodyDescriptor, BodySystem, FramePacket, SceneError, SystemSettings};
pub use tessellation::TessellationSettings;
pub use uniforms::{BodyUniforms, MAX_BODIES, PassKind};
