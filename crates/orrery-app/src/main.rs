//! The Orrery binary.
//!
//! Configuration is loaded from `config.ron` in the platform config directory
//! (created with defaults on first run) and can be overridden with CLI flags.

use clap::Parser;
use orrery_app::simulation::Simulation;
use orrery_app::window;
use orrery_config::{CliArgs, Config};
use tracing::{error, info};

fn main() {
    let cli = CliArgs::parse();

    let config_dir = match cli.config.clone().map_or_else(Config::default_dir, Ok) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to resolve config directory: {e}");
            std::process::exit(1);
        }
    };

    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_dir.display());
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&cli);

    orrery_log::init_logging(Some(&Config::log_dir(&config_dir)), Some(&config));
    info!(config_dir = %config_dir.display(), "Orrery starting");

    let simulation = match Simulation::from_config(&config) {
        Ok(simulation) => simulation,
        Err(e) => {
            error!("Invalid scene description: {e}");
            std::process::exit(1);
        }
    };
    info!(
        bodies = simulation.system().len(),
        particles = config.particles.capacity,
        "Scene ready"
    );

    if let Err(e) = window::run(config, config_dir, cli, simulation) {
        error!("Event loop failed: {e}");
        std::process::exit(1);
    }
}
