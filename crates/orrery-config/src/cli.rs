//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Command-line flags. Each one given overrides `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Real-time solar system renderer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Config directory to use instead of the platform default.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Body simulation speed multiplier.
    #[arg(long)]
    pub time_warp: Option<f32>,

    /// Seed of the particle RNG.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable per-planet shadow maps.
    #[arg(long)]
    pub no_shadows: bool,

    /// Disable eclipse shadowing.
    #[arg(long)]
    pub no_eclipse: bool,

    /// Directory of WGSL files that replace the built-in shaders.
    #[arg(long)]
    pub shader_dir: Option<PathBuf>,
}

impl Config {
    /// Overwrite loaded settings with every flag given on the command line.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        self.window.width = args.width.unwrap_or(self.window.width);
        self.window.height = args.height.unwrap_or(self.window.height);
        if let Some(level) = &args.log_level {
            self.debug.log_level.clone_from(level);
        }
        self.simulation.time_warp = args.time_warp.unwrap_or(self.simulation.time_warp);
        self.particles.seed = args.seed.unwrap_or(self.particles.seed);
        self.planets.enable_shadow_mapping_planets &= !args.no_shadows;
        self.planets.enable_eclipse_shadows &= !args.no_eclipse;
    }
}
