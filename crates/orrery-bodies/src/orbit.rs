//! Closed-form elliptical orbits.
//!
//! A body orbits its parent on an ellipse whose focus sits at the parent.
//! The ellipse is described by a major-axis direction, the orbital plane
//! normal and the two semi-axes; position follows from the orbit angle
//! without any numerical integration.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::body::BodyId;

const DEGENERATE_EPSILON: f32 = 1e-6;

/// Rejected orbit parameters.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum OrbitError {
    /// The semi-major axis is shorter than the semi-minor axis.
    #[error("large radius {large} is smaller than small radius {small}")]
    InvertedAxes { small: f32, large: f32 },

    /// A radius is negative or not finite.
    #[error("orbit radii must be finite and non-negative (small {small}, large {large})")]
    InvalidRadius { small: f32, large: f32 },

    /// The period is zero, negative or not finite.
    #[error("orbit period must be positive, got {0}")]
    NonPositivePeriod(f32),

    /// The orbital plane normal has no length.
    #[error("orbit normal must be non-zero")]
    DegenerateNormal,

    /// Nothing of the direction is left after projecting out the normal.
    #[error("orbit direction is parallel to the orbit normal")]
    DirectionAlongNormal,
}

/// Editable orbit parameters, without the parent link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitParams {
    pub direction: Vec3,
    pub small_radius: f32,
    pub large_radius: f32,
    pub normal: Vec3,
    pub period: f32,
}

impl Default for OrbitParams {
    fn default() -> Self {
        Self {
            direction: Vec3::X,
            small_radius: 1.0,
            large_radius: 1.0,
            normal: Vec3::Y,
            period: 1.0,
        }
    }
}

/// A validated orbit around a parent body.
///
/// `direction` is unit length and orthogonal to the unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    parent: BodyId,
    direction: Vec3,
    normal: Vec3,
    small_radius: f32,
    large_radius: f32,
    period: f32,
}

impl Orbit {
    /// Validate `params` and orthogonalise the direction against the normal.
    pub fn new(parent: BodyId, params: OrbitParams) -> Result<Self, OrbitError> {
        let OrbitParams {
            direction,
            small_radius: small,
            large_radius: large,
            normal,
            period,
        } = params;

        if !(small.is_finite() && large.is_finite()) || small < 0.0 || large < 0.0 {
            return Err(OrbitError::InvalidRadius { small, large });
        }
        if large < small {
            return Err(OrbitError::InvertedAxes { small, large });
        }
        if !(period.is_finite() && period > 0.0) {
            return Err(OrbitError::NonPositivePeriod(period));
        }
        let normal = normal.try_normalize().ok_or(OrbitError::DegenerateNormal)?;
        let projected = direction - direction.dot(normal) * normal;
        if projected.length() < DEGENERATE_EPSILON {
            return Err(OrbitError::DirectionAlongNormal);
        }

        Ok(Self {
            parent,
            direction: projected.normalize(),
            normal,
            small_radius: small,
            large_radius: large,
            period,
        })
    }

    pub fn parent(&self) -> BodyId {
        self.parent
    }

    /// Unit major axis, orthogonal to [`normal`](Self::normal).
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn small_radius(&self) -> f32 {
        self.small_radius
    }

    pub fn large_radius(&self) -> f32 {
        self.large_radius
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    /// The parameters this orbit was built from, after normalisation.
    pub fn params(&self) -> OrbitParams {
        OrbitParams {
            direction: self.direction,
            small_radius: self.small_radius,
            large_radius: self.large_radius,
            normal: self.normal,
            period: self.period,
        }
    }

    /// Distance from the ellipse centre to the focus holding the parent.
    pub fn focal_distance(&self) -> f32 {
        (self.large_radius * self.large_radius - self.small_radius * self.small_radius)
            .max(0.0)
            .sqrt()
    }

    /// Unit minor axis: `normal × direction`.
    pub fn minor_axis(&self) -> Vec3 {
        self.normal.cross(self.direction).normalize()
    }

    pub fn center(&self, parent_position: Vec3) -> Vec3 {
        parent_position + self.focal_distance() * self.direction
    }

    /// Position on the ellipse at `angle` radians.
    pub fn position_at(&self, parent_position: Vec3, angle: f32) -> Vec3 {
        self.center(parent_position)
            + self.large_radius * angle.cos() * self.direction
            + self.small_radius * angle.sin() * self.minor_axis()
    }

    /// Radians per second.
    pub fn angular_velocity(&self) -> f32 {
        TAU / self.period
    }

    /// Advance `angle` by `dt` seconds, wrapping once past a full turn.
    pub fn advance_angle(&self, angle: f32, dt: f32) -> f32 {
        let next = angle + self.angular_velocity() * dt;
        if next >= TAU { next - TAU } else { next }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn params(small: f32, large: f32, period: f32) -> OrbitParams {
        OrbitParams {
            small_radius: small,
            large_radius: large,
            period,
            ..OrbitParams::default()
        }
    }

    #[test]
    fn test_direction_is_orthogonalised() {
        let orbit = Orbit::new(
            BodyId(0),
            OrbitParams {
                direction: Vec3::new(1.0, 1.0, 0.0),
                normal: Vec3::new(0.0, 2.0, 0.0),
                ..params(1.0, 2.0, 5.0)
            },
        )
        .unwrap();
        assert!(orbit.direction().dot(orbit.normal()).abs() < 1e-6);
        assert!((orbit.direction() - Vec3::X).length() < 1e-6);
        assert!((orbit.normal().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_orthogonality_for_skewed_inputs() {
        let normals = [
            Vec3::new(0.3, 1.0, -0.2),
            Vec3::new(-1.0, 0.1, 0.4),
            Vec3::new(0.0, 0.0, 5.0),
        ];
        let directions = [
            Vec3::new(1.0, 0.5, 0.5),
            Vec3::new(0.2, -3.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ];
        for normal in normals {
            for direction in directions {
                let orbit = Orbit::new(
                    BodyId(0),
                    OrbitParams {
                        direction,
                        normal,
                        ..params(2.0, 3.0, 4.0)
                    },
                )
                .unwrap();
                assert!(orbit.direction().dot(orbit.normal()).abs() < 1e-5);
                assert!(orbit.minor_axis().dot(orbit.direction()).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_inverted_axes_rejected() {
        let result = Orbit::new(BodyId(0), params(30.0, 20.0, 10.0));
        assert_eq!(
            result,
            Err(OrbitError::InvertedAxes {
                small: 30.0,
                large: 20.0
            })
        );
    }

    #[test]
    fn test_non_positive_period_rejected() {
        assert_eq!(
            Orbit::new(BodyId(0), params(1.0, 1.0, 0.0)),
            Err(OrbitError::NonPositivePeriod(0.0))
        );
        assert!(Orbit::new(BodyId(0), params(1.0, 1.0, -2.0)).is_err());
        assert!(Orbit::new(BodyId(0), params(1.0, 1.0, f32::NAN)).is_err());
    }

    #[test]
    fn test_negative_radius_rejected() {
        assert!(matches!(
            Orbit::new(BodyId(0), params(-1.0, 2.0, 1.0)),
            Err(OrbitError::InvalidRadius { .. })
        ));
    }

    #[test]
    fn test_degenerate_normal_and_direction() {
        let zero_normal = OrbitParams {
            normal: Vec3::ZERO,
            ..OrbitParams::default()
        };
        assert_eq!(
            Orbit::new(BodyId(0), zero_normal),
            Err(OrbitError::DegenerateNormal)
        );

        let along_normal = OrbitParams {
            direction: Vec3::new(0.0, 3.0, 0.0),
            ..OrbitParams::default()
        };
        assert_eq!(
            Orbit::new(BodyId(0), along_normal),
            Err(OrbitError::DirectionAlongNormal)
        );
    }

    #[test]
    fn test_circular_orbit_has_no_focal_offset() {
        let orbit = Orbit::new(BodyId(0), params(5.0, 5.0, 1.0)).unwrap();
        assert_eq!(orbit.focal_distance(), 0.0);
        assert_eq!(orbit.center(Vec3::ONE), Vec3::ONE);
    }

    #[test]
    fn test_parent_sits_at_focus() {
        let orbit = Orbit::new(BodyId(0), params(20.0, 30.0, 10.0)).unwrap();
        let focal = orbit.focal_distance();
        assert!((focal - 500f32.sqrt()).abs() < 1e-4);
        // Periapsis distance is large - focal, apoapsis large + focal.
        let periapsis = orbit.position_at(Vec3::ZERO, PI).length();
        let apoapsis = orbit.position_at(Vec3::ZERO, 0.0).length();
        assert!((periapsis - (30.0 - focal)).abs() < 1e-3);
        assert!((apoapsis - (30.0 + focal)).abs() < 1e-3);
    }

    #[test]
    fn test_angle_wraps_once() {
        let orbit = Orbit::new(BodyId(0), params(1.0, 1.0, 1.0)).unwrap();
        let angle = orbit.advance_angle(6.0, 0.1);
        assert!(angle >= 0.0 && angle < TAU);
        assert!((angle - (6.0 + 0.1 * TAU - TAU)).abs() < 1e-5);
    }

    #[test]
    fn test_params_roundtrip_after_normalisation() {
        let orbit = Orbit::new(
            BodyId(3),
            OrbitParams {
                direction: Vec3::new(0.0, 0.0, 4.0),
                ..params(2.0, 3.0, 7.0)
            },
        )
        .unwrap();
        let rebuilt = Orbit::new(orbit.parent(), orbit.params()).unwrap();
        assert_eq!(orbit, rebuilt);
        assert_eq!(rebuilt.parent(), BodyId(3));
    }
}
