use glam::Vec3;

/// How new particles are initialised and how many appear per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterParams {
    /// Inclusive per-channel RGB lower bounds.
    pub color_min: [u8; 3],
    /// Inclusive per-channel RGB upper bounds.
    pub color_max: [u8; 3],
    /// Base lifetime in seconds.
    pub life: f32,
    pub life_deviation: f32,
    /// Remaining life below which alpha fades out linearly.
    pub life_threshold: f32,
    pub size: f32,
    pub size_deviation: f32,
    /// Radius of the disk around each origin particles start from.
    pub spawn_radius: f32,
    /// Half-angle of the emission cone in radians, around local +Z.
    pub cone_angle: f32,
    /// Per-axis velocity jitter range.
    pub velocity_spread: f32,
    /// Emitter-space velocity added to every particle.
    pub base_velocity: Vec3,
    /// Particles per second per origin.
    pub spawn_rate: f32,
    pub max_spawn_per_tick: usize,
}

impl Default for EmitterParams {
    fn default() -> Self {
        Self {
            color_min: [233, 165, 0],
            color_max: [255, 255, 0],
            life: 1.0,
            life_deviation: 0.5,
            life_threshold: 0.5,
            size: 0.06,
            size_deviation: 0.06,
            spawn_radius: 0.2,
            cone_angle: 30f32.to_radians(),
            velocity_spread: 0.2,
            base_velocity: Vec3::ZERO,
            spawn_rate: 1000.0,
            max_spawn_per_tick: 500,
        }
    }
}

impl EmitterParams {
    pub fn with_cone_degrees(mut self, degrees: f32) -> Self {
        self.cone_angle = degrees.to_radians();
        self
    }

    /// Particles to spawn per origin for a tick of `dt` seconds.
    pub fn spawn_count(&self, dt: f32) -> usize {
        ((dt * self.spawn_rate).max(0.0) as usize).min(self.max_spawn_per_tick)
    }
}
