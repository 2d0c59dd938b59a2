//! Body arena: construction, per-tick update and per-frame uniform assembly.

use glam::{Mat4, Vec3, Vec4};
use log::{debug, info};
use thiserror::Error;

use crate::body::{BodyId, BodyKind, OrbitingBody};
use crate::orbit::{Orbit, OrbitError, OrbitParams};
use crate::tessellation::TessellationSettings;
use crate::uniforms::{BodyUniforms, MAX_BODIES, PassKind};

#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("scene has {count} bodies, at most {MAX_BODIES} are supported")]
    TooManyBodies { count: usize },

    #[error("body {index} names parent {parent}, which is not an earlier body")]
    InvalidParent { index: usize, parent: usize },

    #[error("body {index} names parent {parent}, only -1 means no parent")]
    NegativeParent { index: usize, parent: i32 },

    #[error("body {index} has radius {radius}, radii must be positive")]
    InvalidRadius { index: usize, radius: f32 },

    #[error("body {index} has an invalid orbit: {source}")]
    Orbit {
        index: usize,
        #[source]
        source: OrbitError,
    },

    #[error("no body with index {0}")]
    UnknownBody(usize),

    #[error("body {0} has no orbit to edit")]
    NoOrbit(usize),
}

/// Scene description entry for one body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDescriptor {
    pub kind: BodyKind,
    pub radius: f32,
    /// Index of an earlier body, `None` for a fixed root.
    pub parent: Option<usize>,
    pub orbit: OrbitParams,
}

/// Toggles shared by every body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemSettings {
    pub tessellation: TessellationSettings,
    pub enable_eclipse: bool,
    pub enable_shadow_maps: bool,
    pub shadow_map_resolution: u32,
    /// Vertical field of view in radians, uploaded as `fov`.
    pub fov_y: f32,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            tessellation: TessellationSettings::default(),
            enable_eclipse: true,
            enable_shadow_maps: true,
            shadow_map_resolution: orrery_render::DEFAULT_SHADOW_MAP_RESOLUTION,
            fov_y: 80f32.to_radians(),
        }
    }
}

/// Camera state and scene-wide data shared by all bodies in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePacket {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub screen_height: f32,
    /// Sun centre in xyz, radius in w.
    pub sun_pos_rad: Vec4,
    /// Non-star bodies, centre in xyz and radius in w.
    pub body_pos_radii: [[f32; 4]; MAX_BODIES],
    pub num_bodies: u32,
}

/// Every body in the scene plus the rendering toggles.
pub struct BodySystem {
    bodies: Vec<OrbitingBody>,
    settings: SystemSettings,
    elapsed: f32,
    selected: usize,
}

impl BodySystem {
    pub fn new(settings: SystemSettings) -> Self {
        Self {
            bodies: Vec::new(),
            settings,
            elapsed: 0.0,
            selected: 0,
        }
    }

    /// Build the arena from a scene description.
    pub fn from_descriptors(
        descriptors: &[BodyDescriptor],
        settings: SystemSettings,
    ) -> Result<Self, SceneError> {
        if descriptors.len() > MAX_BODIES {
            return Err(SceneError::TooManyBodies {
                count: descriptors.len(),
            });
        }

        let mut system = Self::new(settings);
        for descriptor in descriptors {
            let index = system.bodies.len();
            let mut body = OrbitingBody::new(descriptor.kind, descriptor.radius);
            if let Some(parent) = descriptor.parent {
                let orbit = Orbit::new(BodyId(parent), descriptor.orbit)
                    .map_err(|source| SceneError::Orbit { index, source })?;
                body = body.with_orbit(orbit);
            }
            system.push(body)?;
        }
        // Orbiting bodies start on their orbit, not at the origin.
        system.move_bodies(0.0);

        info!(
            "Built scene with {} bodies ({} shadow maps)",
            system.len(),
            system.shadow_casters().count()
        );
        Ok(system)
    }

    /// Append a body. Its orbit, if any, must name an earlier body.
    pub fn push(&mut self, body: OrbitingBody) -> Result<BodyId, SceneError> {
        let index = self.bodies.len();
        if index >= MAX_BODIES {
            return Err(SceneError::TooManyBodies { count: index + 1 });
        }
        if !(body.radius() > 0.0 && body.radius().is_finite()) {
            return Err(SceneError::InvalidRadius {
                index,
                radius: body.radius(),
            });
        }
        if let Some(orbit) = body.orbit() {
            let parent = orbit.parent().index();
            if parent >= index {
                return Err(SceneError::InvalidParent { index, parent });
            }
        }
        self.bodies.push(body);
        Ok(BodyId(index))
    }

    pub fn bodies(&self) -> &[OrbitingBody] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&OrbitingBody> {
        self.bodies.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn settings(&self) -> &SystemSettings {
        &self.settings
    }

    /// Simulated seconds since construction.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// The light source: first star in the arena, else the first body.
    pub fn sun(&self) -> Option<BodyId> {
        self.bodies
            .iter()
            .position(|body| body.kind().is_star())
            .or((!self.bodies.is_empty()).then_some(0))
            .map(BodyId)
    }

    pub fn sun_position(&self) -> Vec3 {
        self.sun()
            .and_then(|id| self.body(id))
            .map_or(Vec3::ZERO, OrbitingBody::position)
    }

    /// Advance every orbit by `dt` seconds, then re-aim every light frame at
    /// the sun's new position.
    pub fn update(&mut self, dt: f32) {
        self.move_bodies(dt);
        self.elapsed += dt;
    }

    fn move_bodies(&mut self, dt: f32) {
        for index in 0..self.bodies.len() {
            let parent_position = self.bodies[index]
                .orbit()
                .map(|orbit| self.bodies[orbit.parent().index()].position());
            self.bodies[index].advance(dt, parent_position);
        }

        let light = self.sun_position();
        for body in self.bodies.iter_mut().filter(|body| body.orbit().is_some()) {
            body.update_light_frame(light);
        }
    }

    /// Per-frame camera data plus the eclipse occluder list.
    pub fn frame_packet(
        &self,
        view: Mat4,
        projection: Mat4,
        camera_position: Vec3,
        screen_height: f32,
    ) -> FramePacket {
        let mut body_pos_radii = [[0.0; 4]; MAX_BODIES];
        let mut num_bodies = 0;
        for (slot, body) in body_pos_radii
            .iter_mut()
            .zip(self.bodies.iter().filter(|body| !body.kind().is_star()))
        {
            *slot = body.position().extend(body.radius()).to_array();
            num_bodies += 1;
        }

        let sun_pos_rad = self
            .sun()
            .and_then(|id| self.body(id))
            .map_or(Vec4::ZERO, |sun| sun.position().extend(sun.radius()));

        FramePacket {
            view,
            projection,
            camera_position,
            screen_height,
            sun_pos_rad,
            body_pos_radii,
            num_bodies,
        }
    }

    /// Uniform block for body `index` in `pass`. `None` for an unknown index.
    pub fn body_uniforms(
        &self,
        index: usize,
        pass: PassKind,
        frame: &FramePacket,
    ) -> Option<BodyUniforms> {
        let body = self.bodies.get(index)?;
        let light = body.light_frame();
        let use_shadow_map = body.needs_shadow_map(self.settings.enable_shadow_maps);
        let (view, projection, only_depth) = match pass {
            PassKind::ShadowDepth => (light.view, light.projection, true),
            PassKind::Color => (frame.view, frame.projection, false),
        };

        Some(BodyUniforms {
            model: body.model_matrix().to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            light_view: light.view.to_cols_array_2d(),
            light_projection: light.projection.to_cols_array_2d(),
            camera_world_pos: frame.camera_position.to_array(),
            radius: body.radius(),
            planet_center: body.position().to_array(),
            screen_height: frame.screen_height,
            light_position: frame.sun_pos_rad.truncate().to_array(),
            fov: self.settings.fov_y,
            sun_pos_rad: frame.sun_pos_rad.to_array(),
            target_pixel_size: self.settings.tessellation.target_pixel_size,
            tessellate: self.settings.tessellation.enabled as u32,
            num_bodies: frame.num_bodies,
            enable_eclipse: self.settings.enable_eclipse as u32,
            only_depth: only_depth as u32,
            use_shadow_map: (use_shadow_map && pass == PassKind::Color) as u32,
            kind: body.kind().tag().as_u32(),
            time: self.elapsed,
            body_pos_radii: frame.body_pos_radii,
            surface: body.kind().surface_uniforms(body.displacement()),
        })
    }

    /// Icosphere level for body `index` as seen from the frame's camera.
    pub fn subdivision_for(&self, index: usize, frame: &FramePacket) -> u32 {
        let Some(body) = self.bodies.get(index) else {
            return self.settings.tessellation.base_subdivision;
        };
        let distance = body.position().distance(frame.camera_position);
        self.settings.tessellation.subdivision_for(
            body.radius(),
            distance,
            frame.screen_height,
            self.settings.fov_y,
        )
    }

    /// Indices of bodies that render into their own shadow map.
    pub fn shadow_casters(&self) -> impl Iterator<Item = usize> + '_ {
        self.bodies
            .iter()
            .enumerate()
            .filter(|(_, body)| body.needs_shadow_map(self.settings.enable_shadow_maps))
            .map(|(index, _)| index)
    }

    pub fn selected(&self) -> BodyId {
        BodyId(self.selected)
    }

    pub fn select(&mut self, id: BodyId) -> Result<(), SceneError> {
        if id.index() >= self.bodies.len() {
            return Err(SceneError::UnknownBody(id.index()));
        }
        self.selected = id.index();
        Ok(())
    }

    pub fn select_next(&mut self) -> BodyId {
        if !self.bodies.is_empty() {
            self.selected = (self.selected + 1) % self.bodies.len();
        }
        self.selected()
    }

    pub fn select_previous(&mut self) -> BodyId {
        if !self.bodies.is_empty() {
            self.selected = (self.selected + self.bodies.len() - 1) % self.bodies.len();
        }
        self.selected()
    }

    /// Current orbit parameters of the selected body.
    pub fn selected_orbit(&self) -> Option<OrbitParams> {
        self.bodies
            .get(self.selected)
            .and_then(OrbitingBody::orbit)
            .map(Orbit::params)
    }

    /// Re-apply the selected body's orbit with edited parameters, keeping
    /// its parent and current angle.
    pub fn edit_selected_orbit(&mut self, params: OrbitParams) -> Result<(), SceneError> {
        let index = self.selected;
        let body = self
            .bodies
            .get_mut(index)
            .ok_or(SceneError::UnknownBody(index))?;
        let parent = body.orbit().map(Orbit::parent).ok_or(SceneError::NoOrbit(index))?;
        body.set_orbit(parent, params)
            .map_err(|source| SceneError::Orbit { index, source })?;
        debug!("Applied orbit changes to body {index}: {params:?}");
        Ok(())
    }

    pub fn set_eclipse_enabled(&mut self, enabled: bool) {
        self.settings.enable_eclipse = enabled;
    }

    pub fn set_tessellation_enabled(&mut self, enabled: bool) {
        self.settings.tessellation.enabled = enabled;
    }

    pub fn set_target_pixel_size(&mut self, pixels: f32) {
        self.settings.tessellation.target_pixel_size = pixels.max(0.5);
    }
}
