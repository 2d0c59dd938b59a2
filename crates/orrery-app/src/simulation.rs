//! Everything that advances with the fixed timestep, independent of the GPU.

use orrery_bodies::{BodySystem, FramePacket, SceneError};
use orrery_config::Config;
use orrery_particles::{EmitterParams, ParticleSimulator};
use orrery_render::Camera;
use tracing::info;

use crate::camera_rig::OrbitRig;
use crate::controls::Edit;
use crate::game_loop::TimeWarp;
use crate::scene;
use crate::ship::Ship;

pub struct Simulation {
    system: BodySystem,
    particles: ParticleSimulator,
    emitter: EmitterParams,
    ship: Ship,
    rig: OrbitRig,
    camera: Camera,
    time_warp: TimeWarp,
}

impl Simulation {
    pub fn from_config(config: &Config) -> Result<Self, SceneError> {
        let system = scene::build_system(config)?;

        let mut camera = Camera::with_fov_degrees(
            config.camera.fov_degrees,
            config.camera.near,
            config.camera.far,
        );
        camera.set_aspect_ratio(config.window.width as f32, config.window.height as f32);
        let rig = OrbitRig::from_config(&config.camera);
        rig.apply(&mut camera);

        Ok(Self {
            system,
            particles: ParticleSimulator::new(config.particles.capacity, config.particles.seed),
            emitter: scene::emitter_params(&config.particles),
            ship: Ship::from_config(&config.particles),
            rig,
            camera,
            time_warp: TimeWarp::new(config.simulation.time_warp),
        })
    }

    /// One fixed step: warped orbits, then the camera, then the thrusters.
    pub fn step(&mut self, dt: f64) {
        let dt_f32 = dt as f32;
        self.system.update(self.time_warp.scale(dt));

        self.rig.advance(dt_f32);
        self.rig.apply(&mut self.camera);

        self.particles.emit(
            dt_f32,
            self.ship.transform(),
            self.ship.thrusters(),
            &self.emitter,
        );
        self.particles.update(
            dt_f32,
            self.camera.position,
            self.emitter.life_threshold,
        );
    }

    pub fn frame_packet(&self, screen_height: f32) -> FramePacket {
        self.system.frame_packet(
            self.camera.view_matrix(),
            self.camera.projection_matrix(),
            self.camera.position,
            screen_height,
        )
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect_ratio(width as f32, height as f32);
    }

    pub fn apply(&mut self, edit: Edit) -> Result<(), SceneError> {
        match edit {
            Edit::SelectNext | Edit::SelectPrevious => {
                let id = if edit == Edit::SelectNext {
                    self.system.select_next()
                } else {
                    self.system.select_previous()
                };
                info!(body = id.index(), orbit = ?self.system.selected_orbit(), "selected body");
            }
            Edit::ToggleTessellation => {
                let enabled = !self.system.settings().tessellation.enabled;
                self.system.set_tessellation_enabled(enabled);
                info!(enabled, "adaptive tessellation");
            }
            Edit::ToggleEclipse => {
                let enabled = !self.system.settings().enable_eclipse;
                self.system.set_eclipse_enabled(enabled);
                info!(enabled, "eclipse shadows");
            }
            Edit::SlowerTime | Edit::FasterTime => {
                self.time_warp = if edit == Edit::FasterTime {
                    self.time_warp.faster()
                } else {
                    self.time_warp.slower()
                };
                info!(factor = self.time_warp.factor(), "time warp");
            }
            Edit::TargetPixelSize(delta) => {
                let pixels = self.system.settings().tessellation.target_pixel_size + delta;
                self.system.set_target_pixel_size(pixels);
                info!(
                    pixels = self.system.settings().tessellation.target_pixel_size,
                    "target pixel size"
                );
            }
            Edit::ScalePeriod(factor) => {
                let index = self.system.selected().index();
                let mut params = self
                    .system
                    .selected_orbit()
                    .ok_or(SceneError::NoOrbit(index))?;
                params.period *= factor;
                self.system.edit_selected_orbit(params)?;
                info!(body = index, period = params.period, "orbit updated");
            }
        }
        Ok(())
    }

    pub fn system(&self) -> &BodySystem {
        &self.system
    }

    pub fn particles(&self) -> &ParticleSimulator {
        &self.particles
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn time_warp(&self) -> TimeWarp {
        self.time_warp
    }
}
