//! Window, event handling and per-frame pass scheduling.

use std::path::PathBuf;
use std::sync::Arc;

use orrery_bodies::{BodyRenderError, BodyRenderer};
use orrery_config::{CliArgs, Config};
use orrery_particles::ParticleRenderer;
use orrery_render::{
    DepthBuffer, FrameEncoder, RenderContext, RenderPassBuilder, ShaderError, ShaderLibrary,
    SurfaceError, init_render_context_blocking,
};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{ModifiersState, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::controls::{KeyAction, key_action};
use crate::game_loop::GameLoop;
use crate::simulation::Simulation;

/// Build window attributes from the loaded config.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(&config.window.title)
        .with_inner_size(LogicalSize::new(config.window.width, config.window.height))
}

/// GPU resources that live as long as the window.
struct GpuState {
    context: RenderContext,
    depth: DepthBuffer,
    shaders: ShaderLibrary,
    bodies: BodyRenderer,
    particles: ParticleRenderer,
}

impl GpuState {
    fn new(
        context: RenderContext,
        mut shaders: ShaderLibrary,
        simulation: &Simulation,
    ) -> Result<Self, ShaderError> {
        let (width, height) = context.size();
        let depth = DepthBuffer::new(&context.device, width, height);
        let bodies = BodyRenderer::new(
            &context.device,
            context.surface_format,
            simulation.system(),
            &mut shaders,
        );
        let particles = ParticleRenderer::new(
            &context.device,
            context.surface_format,
            simulation.particles().capacity(),
            &mut shaders,
        )?;
        Ok(Self {
            context,
            depth,
            shaders,
            bodies,
            particles,
        })
    }

    /// Recreate the scene renderers after the simulation was rebuilt.
    fn rebuild(&mut self, simulation: &Simulation) -> Result<(), ShaderError> {
        let device = &self.context.device;
        let format = self.context.surface_format;
        self.particles = ParticleRenderer::new(
            device,
            format,
            simulation.particles().capacity(),
            &mut self.shaders,
        )?;
        self.bodies = BodyRenderer::new(device, format, simulation.system(), &mut self.shaders);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        let (width, height) = self.context.size();
        self.depth.resize(&self.context.device, width, height);
    }

    /// Record and present one frame: every shadow map first, then a single
    /// colour pass holding the bodies and the particles.
    fn render(&mut self, simulation: &Simulation) -> Result<(), BodyRenderError> {
        let (_, height) = self.context.size();
        let frame = simulation.frame_packet(height as f32);
        let camera = simulation.camera();

        self.bodies
            .prepare(&self.context.queue, simulation.system(), &frame);
        self.particles.prepare(
            &self.context.queue,
            simulation.particles(),
            frame.view,
            frame.projection,
        );

        let surface_texture = match self.context.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceError::Timeout) => {
                debug!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => {
                warn!("Surface error: {e}, skipping frame");
                return Ok(());
            }
        };

        let mut frame_encoder = FrameEncoder::new(
            &self.context.device,
            self.context.queue.clone(),
            surface_texture,
        );

        self.bodies
            .render_shadow_passes(frame_encoder.encoder_mut(), simulation.system())?;

        {
            let builder = RenderPassBuilder::reset(&self.depth);
            let mut pass = frame_encoder.begin_render_pass(&builder);
            self.bodies
                .render_color_passes(&mut pass, simulation.system())?;
            self.particles.draw(&mut pass);
        }

        frame_encoder.submit();
        debug!(
            camera = ?camera.position,
            particles = self.particles.instance_count(),
            "frame submitted"
        );
        Ok(())
    }
}

/// Application state driven by the winit event loop.
pub struct AppState {
    config: Config,
    config_dir: PathBuf,
    cli: CliArgs,
    simulation: Simulation,
    game_loop: GameLoop,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    modifiers: ModifiersState,
}

impl AppState {
    pub fn new(config: Config, config_dir: PathBuf, cli: CliArgs, simulation: Simulation) -> Self {
        Self {
            config,
            config_dir,
            cli,
            simulation,
            game_loop: GameLoop::new(),
            window: None,
            gpu: None,
            modifiers: ModifiersState::empty(),
        }
    }

    fn shader_library(&self) -> ShaderLibrary {
        match &self.cli.shader_dir {
            Some(dir) => {
                info!("Loading shaders from {}", dir.display());
                ShaderLibrary::new().with_shader_dir(dir)
            }
            None => ShaderLibrary::new(),
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(action) = key_action(code, self.modifiers.shift_key(), event.repeat) else {
            return;
        };

        match action {
            KeyAction::Edit(edit) => {
                if let Err(e) = self.simulation.apply(edit) {
                    warn!("Ignoring {edit:?}: {e}");
                }
            }
            KeyAction::ReloadConfig => self.reload_config(event_loop),
            KeyAction::Quit => {
                info!("Escape pressed, shutting down");
                event_loop.exit();
            }
        }
    }

    /// Re-read `config.ron` and rebuild the scene from it. A file that fails
    /// to load or describes an invalid scene leaves the running scene alone.
    #[instrument(skip_all)]
    fn reload_config(&mut self, event_loop: &ActiveEventLoop) {
        let mut config = match self.config.reload(&self.config_dir) {
            Ok(Some(config)) => config,
            Ok(None) => {
                info!("Config unchanged");
                return;
            }
            Err(e) => {
                warn!("Config reload failed: {e}");
                return;
            }
        };
        config.apply_cli_overrides(&self.cli);

        let mut simulation = match Simulation::from_config(&config) {
            Ok(simulation) => simulation,
            Err(e) => {
                warn!("Reloaded scene is invalid, keeping the current one: {e}");
                return;
            }
        };

        if let Some(gpu) = &mut self.gpu {
            let (width, height) = gpu.context.size();
            simulation.resize(width, height);
            if let Err(e) = gpu.rebuild(&simulation) {
                error!("Failed to rebuild renderers: {e}");
                event_loop.exit();
                return;
            }
        }

        info!(bodies = simulation.system().len(), "Scene rebuilt from config");
        self.simulation = simulation;
        self.config = config;
        self.game_loop.reset_clock();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let simulation = &mut self.simulation;
        self.game_loop.tick(|dt, _sim_time| simulation.step(dt), |_alpha| {});

        let Some(gpu) = &mut self.gpu else {
            return;
        };
        if let Err(e) = gpu.render(&self.simulation) {
            error!("Rendering failed: {e}");
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = window_attributes_from_config(&self.config);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let context = match init_render_context_blocking(window.clone(), self.config.window.vsync)
        {
            Ok(context) => context,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let (width, height) = context.size();
        self.simulation.resize(width, height);
        match GpuState::new(context, self.shader_library(), &self.simulation) {
            Ok(gpu) => {
                info!("Rendering {width}x{height}");
                self.gpu = Some(gpu);
            }
            Err(e) => {
                error!("Failed to create renderers: {e}");
                event_loop.exit();
                return;
            }
        }

        self.game_loop.reset_clock();
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                    let (width, height) = gpu.context.size();
                    self.simulation.resize(width, height);
                    info!("Window resized to {width}x{height}");
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key(event_loop, &event);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Run the renderer until the window closes.
///
/// Blocks on the event loop.
#[instrument(skip_all)]
pub fn run(
    config: Config,
    config_dir: PathBuf,
    cli: CliArgs,
    simulation: Simulation,
) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config, config_dir, cli, simulation);
    event_loop.run_app(&mut app)
}
