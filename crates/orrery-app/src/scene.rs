//! Translation of the loaded [`Config`] into simulation inputs.

use glam::Vec3;
use orrery_bodies::{
    BodyDescriptor, BodyKind, BodySystem, EarthSurface, OrbitParams, SceneError, StarSurface,
    SystemSettings, TessellationSettings,
};
use orrery_config::{BodyEntry, BodyKindName, Config, ParticleConfig, PlanetsConfig};
use orrery_particles::EmitterParams;

pub fn body_kind(name: BodyKindName) -> BodyKind {
    match name {
        BodyKindName::Body => BodyKind::Body,
        BodyKindName::Star => BodyKind::Star(StarSurface::default()),
        BodyKindName::Earth => BodyKind::Earth(EarthSurface::default()),
    }
}

/// Descriptor for the `index`th scene entry.
pub fn body_descriptor(index: usize, entry: &BodyEntry) -> Result<BodyDescriptor, SceneError> {
    let parent = entry
        .parent_index()
        .map_err(|parent| SceneError::NegativeParent { index, parent })?;
    Ok(BodyDescriptor {
        kind: body_kind(entry.kind),
        radius: entry.radius,
        parent,
        orbit: OrbitParams {
            direction: Vec3::from_array(entry.orbit_direction),
            small_radius: entry.orbit_small_radius,
            large_radius: entry.orbit_large_radius,
            normal: Vec3::from_array(entry.orbit_normal),
            period: entry.orbit_period,
        },
    })
}

pub fn system_settings(planets: &PlanetsConfig, fov_degrees: f32) -> SystemSettings {
    let max_subdivision = planets.max_subdivision;
    SystemSettings {
        tessellation: TessellationSettings {
            enabled: planets.tessellate,
            target_pixel_size: planets.target_pixel_size,
            base_subdivision: planets.base_subdivision.min(max_subdivision),
            max_subdivision,
        },
        enable_eclipse: planets.enable_eclipse_shadows,
        enable_shadow_maps: planets.enable_shadow_mapping_planets,
        shadow_map_resolution: planets.shadow_map_resolution.max(1),
        fov_y: fov_degrees.to_radians(),
    }
}

/// Build the body arena described by `config`.
pub fn build_system(config: &Config) -> Result<BodySystem, SceneError> {
    let descriptors = config
        .planets
        .bodies
        .iter()
        .enumerate()
        .map(|(index, entry)| body_descriptor(index, entry))
        .collect::<Result<Vec<_>, _>>()?;
    BodySystem::from_descriptors(
        &descriptors,
        system_settings(&config.planets, config.camera.fov_degrees),
    )
}

pub fn emitter_params(particles: &ParticleConfig) -> EmitterParams {
    let [r, g, b] = [particles.color_r, particles.color_g, particles.color_b];
    EmitterParams {
        color_min: [r[0], g[0], b[0]],
        color_max: [r[1], g[1], b[1]],
        life: particles.life,
        life_deviation: particles.life_deviation,
        life_threshold: particles.life_threshold,
        size: particles.size,
        size_deviation: particles.size_deviation,
        spawn_radius: particles.spawn_radius,
        cone_angle: 0.0,
        velocity_spread: particles.velocity_spread,
        base_velocity: Vec3::from_array(particles.base_velocity),
        spawn_rate: particles.spawn_rate,
        max_spawn_per_tick: particles.max_spawn_per_tick as usize,
    }
    .with_cone_degrees(particles.cone_angle_degrees)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_bodies::BodyKindTag;

    #[test]
    fn test_default_config_builds() {
        let config = Config::default();
        let system = build_system(&config).unwrap();
        assert_eq!(system.len(), config.planets.bodies.len());
        assert_eq!(system.sun().map(|id| id.index()), Some(0));
        assert!(system.bodies()[0].orbit().is_none());
        assert!(system.bodies()[1].orbit().is_some());
    }

    #[test]
    fn test_kinds_follow_names() {
        assert_eq!(body_kind(BodyKindName::Star).tag(), BodyKindTag::Star);
        assert_eq!(body_kind(BodyKindName::Earth).tag(), BodyKindTag::Earth);
        assert_eq!(body_kind(BodyKindName::Body).tag(), BodyKindTag::Body);
    }

    #[test]
    fn test_later_parent_is_rejected() {
        let mut config = Config::default();
        config.planets.bodies[1].parent = 3;
        assert_eq!(
            build_system(&config).err(),
            Some(SceneError::InvalidParent {
                index: 1,
                parent: 3
            })
        );
    }

    #[test]
    fn test_parent_below_minus_one_is_rejected() {
        let mut config = Config::default();
        config.planets.bodies[2].parent = -2;
        assert_eq!(
            build_system(&config).err(),
            Some(SceneError::NegativeParent {
                index: 2,
                parent: -2
            })
        );
    }

    #[test]
    fn test_bad_orbit_is_rejected() {
        let mut config = Config::default();
        config.planets.bodies[2].orbit_period = 0.0;
        assert!(matches!(
            build_system(&config),
            Err(SceneError::Orbit { index: 2, .. })
        ));
    }

    #[test]
    fn test_settings_mirror_planets_config() {
        let mut planets = PlanetsConfig::default();
        planets.base_subdivision = 9;
        planets.tessellate = false;
        planets.enable_eclipse_shadows = false;
        let settings = system_settings(&planets, 90.0);
        assert_eq!(settings.tessellation.base_subdivision, planets.max_subdivision);
        assert!(!settings.tessellation.enabled);
        assert!(!settings.enable_eclipse);
        assert!((settings.fov_y - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_emitter_params_from_config() {
        let params = emitter_params(&ParticleConfig::default());
        assert_eq!(params, EmitterParams::default());
    }
}
