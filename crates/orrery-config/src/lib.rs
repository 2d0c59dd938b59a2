//! Configuration for the Orrery renderer.
//!
//! Settings persist to disk as RON and carry the scene description (the list
//! of bodies and their orbits) together with window, camera, level-of-detail,
//! shadow and particle emitter parameters. CLI flags override file values.

mod cli;
mod config;
mod error;
mod scene;

pub use cli::CliArgs;
pub use config::{
    CameraConfig, Config, DebugConfig, ParticleConfig, PlanetsConfig, SimulationConfig,
    WindowConfig,
};
pub use error::ConfigError;
pub use scene::{BodyEntry, BodyKindName, default_scene};
