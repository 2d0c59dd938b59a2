//! CPU-simulated, GPU-instanced billboard particles for ship thrusters.

pub mod emitter;
pub mod renderer;
pub mod simulator;

pub use emitter::EmitterParams;
pub use renderer::ParticleRenderer;
pub use simulator::{Particle, ParticleSimulator, billboard_axes, sample_cone_direction};
