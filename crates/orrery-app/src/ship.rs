//! The static ship whose thrusters feed the particle emitter.

use glam::{Mat4, Vec3};
use orrery_config::ParticleConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    transform: Mat4,
    thrusters: Vec<Vec3>,
}

impl Ship {
    /// Ship placed by `ship_offset`, then uniformly scaled by `ship_scale`.
    pub fn from_config(config: &ParticleConfig) -> Self {
        let transform = Mat4::from_scale(Vec3::splat(config.ship_scale))
            * Mat4::from_translation(Vec3::from_array(config.ship_offset));
        Self {
            transform,
            thrusters: config.thrusters.iter().copied().map(Vec3::from_array).collect(),
        }
    }

    /// Ship space to world space.
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// Nozzle positions in ship space.
    pub fn thrusters(&self) -> &[Vec3] {
        &self.thrusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_is_scaled() {
        let ship = Ship::from_config(&ParticleConfig::default());
        let origin = ship.transform().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(7.5, 1.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_thrusters_follow_config() {
        let config = ParticleConfig::default();
        let ship = Ship::from_config(&config);
        assert_eq!(ship.thrusters().len(), config.thrusters.len());
        assert_eq!(ship.thrusters()[1], Vec3::new(0.0, 8.5, -22.0));

        let nozzle = ship.transform().transform_point3(ship.thrusters()[0]);
        assert!((nozzle - Vec3::new(7.5, 0.975, -0.1)).length() < 1e-5);
    }
}
