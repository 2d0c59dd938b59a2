//! Celestial bodies: kind tag, orbital state and light-space frame.

use glam::{Mat4, Vec3};

use crate::orbit::{Orbit, OrbitError, OrbitParams};
use crate::surface::{DEFAULT_DISPLACEMENT, EarthSurface, StarSurface, SurfaceUniforms};

/// Index of a body in its [`BodySystem`](crate::BodySystem) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

impl BodyId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a body looks like; orbital behaviour is the same for all kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyKind {
    Body,
    Star(StarSurface),
    Earth(EarthSurface),
}

/// Field-less discriminant of [`BodyKind`], also uploaded as `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKindTag {
    Body = 0,
    Star = 1,
    Earth = 2,
}

impl BodyKindTag {
    pub const ALL: [BodyKindTag; 3] = [BodyKindTag::Body, BodyKindTag::Star, BodyKindTag::Earth];

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn label(self) -> &'static str {
        match self {
            BodyKindTag::Body => "body",
            BodyKindTag::Star => "star",
            BodyKindTag::Earth => "earth",
        }
    }
}

impl BodyKind {
    pub fn tag(&self) -> BodyKindTag {
        match self {
            BodyKind::Body => BodyKindTag::Body,
            BodyKind::Star(_) => BodyKindTag::Star,
            BodyKind::Earth(_) => BodyKindTag::Earth,
        }
    }

    pub fn is_star(&self) -> bool {
        matches!(self, BodyKind::Star(_))
    }

    /// Kind-specific uniform block.
    pub fn surface_uniforms(&self, displacement: f32) -> SurfaceUniforms {
        match self {
            BodyKind::Body => SurfaceUniforms::plain(displacement),
            BodyKind::Star(star) => star.uniforms(displacement),
            BodyKind::Earth(earth) => earth.uniforms(displacement),
        }
    }
}

/// View and projection of the light looking at one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightFrame {
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for LightFrame {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }
}

impl LightFrame {
    /// Orthographic frame from `light` that tightly encloses a sphere of
    /// `radius` at `target`. `None` when light and target coincide.
    pub fn enclosing(light: Vec3, target: Vec3, radius: f32) -> Option<Self> {
        let direction = (target - light).try_normalize()?;
        let up = if direction.dot(Vec3::Y).abs() > 0.999 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(light, target, up);

        let center = view.transform_point3(target);
        let extent = 2.0 * radius;
        let near = (-center.z - extent).max(0.1);
        let far = -center.z + extent;
        let projection = Mat4::orthographic_rh(-extent, extent, -extent, extent, near, far);

        Some(Self { view, projection })
    }
}

/// A body with an optional orbit around an earlier body.
#[derive(Debug, Clone)]
pub struct OrbitingBody {
    kind: BodyKind,
    radius: f32,
    position: Vec3,
    orbit: Option<Orbit>,
    orbit_angle: f32,
    light: LightFrame,
    displacement: f32,
}

impl OrbitingBody {
    pub fn new(kind: BodyKind, radius: f32) -> Self {
        Self {
            kind,
            radius,
            position: Vec3::ZERO,
            orbit: None,
            orbit_angle: 0.0,
            light: LightFrame::default(),
            displacement: DEFAULT_DISPLACEMENT,
        }
    }

    pub fn with_orbit(mut self, orbit: Orbit) -> Self {
        self.orbit = Some(orbit);
        self
    }

    pub fn kind(&self) -> &BodyKind {
        &self.kind
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn orbit(&self) -> Option<&Orbit> {
        self.orbit.as_ref()
    }

    pub fn orbit_angle(&self) -> f32 {
        self.orbit_angle
    }

    pub fn light_frame(&self) -> &LightFrame {
        &self.light
    }

    pub fn displacement(&self) -> f32 {
        self.displacement
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
    }

    /// Validate and install a new orbit around `parent`. The orbit angle is
    /// kept so the body continues from where it was.
    pub fn set_orbit(&mut self, parent: BodyId, params: OrbitParams) -> Result<(), OrbitError> {
        self.orbit = Some(Orbit::new(parent, params)?);
        Ok(())
    }

    /// Step the orbit angle and recompute the position.
    ///
    /// A body without an orbit, or whose parent position is unknown, is
    /// pinned at the origin.
    pub fn advance(&mut self, dt: f32, parent_position: Option<Vec3>) {
        let (Some(orbit), Some(parent)) = (self.orbit, parent_position) else {
            self.position = Vec3::ZERO;
            return;
        };
        self.orbit_angle = orbit.advance_angle(self.orbit_angle, dt);
        self.position = orbit.position_at(parent, self.orbit_angle);
    }

    /// Re-aim the light frame at this body. Unchanged when the light sits
    /// exactly on the body.
    pub fn update_light_frame(&mut self, light_position: Vec3) {
        match LightFrame::enclosing(light_position, self.position, self.radius) {
            Some(frame) => self.light = frame,
            None => log::debug!("light coincides with body at {:?}", self.position),
        }
    }

    /// [`advance`](Self::advance) followed by
    /// [`update_light_frame`](Self::update_light_frame). Root bodies keep
    /// their previous light frame.
    pub fn update(&mut self, dt: f32, parent_position: Option<Vec3>, light_position: Vec3) {
        self.advance(dt, parent_position);
        if self.orbit.is_some() && parent_position.is_some() {
            self.update_light_frame(light_position);
        }
    }

    pub fn needs_shadow_map(&self, shadow_mapping_enabled: bool) -> bool {
        shadow_mapping_enabled && !self.kind.is_star()
    }
}
