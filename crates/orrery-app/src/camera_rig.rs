//! Demo camera circling the origin above the ecliptic.

use glam::Vec3;
use orrery_config::CameraConfig;
use orrery_render::Camera;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitRig {
    distance: f32,
    height: f32,
    speed: f32,
    angle: f32,
}

impl OrbitRig {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            distance: config.orbit_distance,
            height: config.orbit_height,
            speed: config.orbit_speed,
            angle: 0.0,
        }
    }

    /// Swap in new orbit parameters, keeping the current angle.
    pub fn reconfigure(&mut self, config: &CameraConfig) {
        self.distance = config.orbit_distance;
        self.height = config.orbit_height;
        self.speed = config.orbit_speed;
    }

    pub fn advance(&mut self, dt: f32) {
        self.angle = (self.angle + self.speed * dt).rem_euclid(std::f32::consts::TAU);
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.angle.cos() * self.distance,
            self.height,
            self.angle.sin() * self.distance,
        )
    }

    /// Place `camera` on the rig, looking at the origin.
    pub fn apply(&self, camera: &mut Camera) {
        camera.position = self.position();
        camera.look_at(Vec3::ZERO, Vec3::Y);
    }
}
