//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scene::{BodyEntry, default_scene};

const APP_NAME: &str = "orrery";
const CONFIG_FILE: &str = "config.ron";

/// Top-level renderer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Camera projection and demo orbit.
    pub camera: CameraConfig,
    /// Bodies, level of detail and shadowing.
    pub planets: PlanetsConfig,
    /// Thruster particle emitter.
    pub particles: ParticleConfig,
    /// Simulation clock.
    pub simulation: SimulationConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
    /// Distance of the demo camera from the origin.
    pub orbit_distance: f32,
    /// Height of the demo camera above the ecliptic.
    pub orbit_height: f32,
    /// Angular speed of the demo camera in radians per second.
    pub orbit_speed: f32,
}

/// Body system configuration: scene description, LOD and shadow toggles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlanetsConfig {
    /// Icosphere subdivision used when adaptive tessellation is off.
    pub base_subdivision: u32,
    /// Finest icosphere subdivision kept in the LOD chain.
    pub max_subdivision: u32,
    /// Pick the subdivision per body from its projected size.
    pub tessellate: bool,
    /// Target on-screen triangle edge length in pixels.
    pub target_pixel_size: f32,
    /// Darken surfaces where another body covers the sun.
    pub enable_eclipse_shadows: bool,
    /// Render a depth map per planet from the sun's point of view.
    pub enable_shadow_mapping_planets: bool,
    /// Edge length of each square shadow map in texels.
    pub shadow_map_resolution: u32,
    /// Ordered body list; parents precede their children.
    pub bodies: Vec<BodyEntry>,
}

/// Particle emitter configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParticleConfig {
    /// Pool size.
    pub capacity: usize,
    /// Seed of the spawn RNG.
    pub seed: u64,
    /// Inclusive red channel range.
    pub color_r: [u8; 2],
    /// Inclusive green channel range.
    pub color_g: [u8; 2],
    /// Inclusive blue channel range.
    pub color_b: [u8; 2],
    /// Base lifetime in seconds.
    pub life: f32,
    /// Random extra lifetime, scaled by a uniform sample.
    pub life_deviation: f32,
    /// Remaining life below which particles fade out.
    pub life_threshold: f32,
    /// Base billboard size.
    pub size: f32,
    /// Random extra size, scaled by a uniform sample.
    pub size_deviation: f32,
    /// Radius of the spawn disk around each thruster.
    pub spawn_radius: f32,
    /// Half-angle of the emission cone in degrees.
    pub cone_angle_degrees: f32,
    /// Per-axis velocity jitter.
    pub velocity_spread: f32,
    /// Velocity added to every particle, in emitter space.
    pub base_velocity: [f32; 3],
    /// Particles per second per thruster.
    pub spawn_rate: f32,
    /// Upper bound of particles spawned per thruster per tick.
    pub max_spawn_per_tick: u32,
    /// Thruster nozzle positions in ship space.
    pub thrusters: Vec<[f32; 3]>,
    /// Ship translation, applied before scaling.
    pub ship_offset: [f32; 3],
    /// Uniform ship scale.
    pub ship_scale: f32,
}

/// Simulation clock configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Multiplier applied to the body simulation step (0 pauses orbits).
    pub time_warp: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write a JSON log file next to the console output.
    pub log_to_file: bool,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 80.0,
            near: 0.1,
            far: 1000.0,
            orbit_distance: 45.0,
            orbit_height: 15.0,
            orbit_speed: 0.05,
        }
    }
}

impl Default for PlanetsConfig {
    fn default() -> Self {
        Self {
            base_subdivision: 3,
            max_subdivision: 6,
            tessellate: true,
            target_pixel_size: 5.0,
            enable_eclipse_shadows: true,
            enable_shadow_mapping_planets: true,
            shadow_map_resolution: 2048,
            bodies: default_scene(),
        }
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            capacity: 100_000,
            seed: 0x5EED,
            color_r: [233, 255],
            color_g: [165, 255],
            color_b: [0, 0],
            life: 1.0,
            life_deviation: 0.5,
            life_threshold: 0.5,
            size: 0.06,
            size_deviation: 0.06,
            spawn_radius: 0.2,
            cone_angle_degrees: 30.0,
            velocity_spread: 0.2,
            base_velocity: [0.0, 0.0, 0.0],
            spawn_rate: 1000.0,
            max_spawn_per_tick: 500,
            thrusters: vec![
                [0.0, -0.5, -22.0],
                [0.0, 8.5, -22.0],
                [4.5, 4.0, -22.0],
                [-4.5, 4.0, -22.0],
            ],
            ship_offset: [150.0, 20.0, 20.0],
            ship_scale: 0.05,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { time_warp: 1.0 }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: true,
        }
    }
}

// --- Directories ---

impl Config {
    /// Platform configuration directory for the renderer (`<config>/orrery`).
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join(APP_NAME))
    }

    /// Directory for log files, inside the given config directory.
    pub fn log_dir(config_dir: &Path) -> PathBuf {
        config_dir.join("logs")
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = read_config_file(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(false)
            .enumerate_arrays(false);

        let serialized = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path,
            source,
        })
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = read_config_file(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::BodyKindName;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(4))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("shadow_map_resolution: 2048"));
        assert!(ron_str.contains("kind: star"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), camera: (fov_degrees: 60.0))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.camera.fov_degrees, 60.0);
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.particles, ParticleConfig::default());
        assert_eq!(config.planets.bodies.len(), default_scene().len());
    }

    #[test]
    fn test_explicit_scene_replaces_default_bodies() {
        let ron_str = "(planets: (bodies: [(kind: star, radius: 5.0), \
                       (radius: 1.0, parent: 0, orbit_small_radius: 20.0, \
                       orbit_large_radius: 30.0, orbit_period: 10.0)]))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.planets.bodies.len(), 2);
        assert_eq!(config.planets.bodies[0].kind, BodyKindName::Star);
        assert_eq!(config.planets.bodies[1].parent_index(), Ok(Some(0)));
        assert_eq!(config.planets.bodies[1].orbit_large_radius, 30.0);
        assert!(config.planets.tessellate);
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.planets.target_pixel_size = 12.0;
        config.particles.seed = 7;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.simulation.time_warp = 4.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().simulation.time_warp, 4.0);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(
            result,
            Err(ConfigError::Parse { ref path, .. }) if path.ends_with("config.ron")
        ));
    }

    #[test]
    fn test_log_dir_is_inside_config_dir() {
        let root = Path::new("/tmp/orrery");
        assert_eq!(Config::log_dir(root), root.join("logs"));
    }
}
