//! Scene description: the ordered list of bodies the renderer builds at startup.

use serde::{Deserialize, Serialize};

/// Shading variant of a body as written in `config.ron`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BodyKindName {
    /// Plain rocky body.
    #[default]
    Body,
    /// Emissive star; the first star is the light source.
    Star,
    /// Planet with procedural continents and animated ocean.
    Earth,
}

/// One body of the scene description.
///
/// `parent` indexes an earlier entry of the same list; `-1` means the body
/// has no parent and stays at the origin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BodyEntry {
    /// Shading variant.
    pub kind: BodyKindName,
    /// Sphere radius in world units.
    pub radius: f32,
    /// Index of the parent body, or `-1`.
    pub parent: i32,
    /// Direction of the ellipse major axis.
    pub orbit_direction: [f32; 3],
    /// Semi-minor axis.
    pub orbit_small_radius: f32,
    /// Semi-major axis.
    pub orbit_large_radius: f32,
    /// Normal of the orbital plane.
    pub orbit_normal: [f32; 3],
    /// Seconds per revolution.
    pub orbit_period: f32,
}

impl Default for BodyEntry {
    fn default() -> Self {
        Self {
            kind: BodyKindName::Body,
            radius: 1.0,
            parent: -1,
            orbit_direction: [1.0, 0.0, 0.0],
            orbit_small_radius: 1.0,
            orbit_large_radius: 1.0,
            orbit_normal: [0.0, 1.0, 0.0],
            orbit_period: 1.0,
        }
    }
}

impl BodyEntry {
    /// Parent index as `usize`. `-1` means no parent; any other negative
    /// value is returned as the error.
    pub fn parent_index(&self) -> Result<Option<usize>, i32> {
        match self.parent {
            -1 => Ok(None),
            parent => usize::try_from(parent).map(Some).map_err(|_| parent),
        }
    }
}

/// A small system: a star, two planets (one earth-like with a moon) and a
/// distant gas giant on an inclined orbit.
pub fn default_scene() -> Vec<BodyEntry> {
    vec![
        BodyEntry {
            kind: BodyKindName::Star,
            radius: 3.0,
            ..BodyEntry::default()
        },
        BodyEntry {
            kind: BodyKindName::Body,
            radius: 0.6,
            parent: 0,
            orbit_direction: [1.0, 0.0, 0.0],
            orbit_small_radius: 8.0,
            orbit_large_radius: 10.0,
            orbit_normal: [0.0, 1.0, 0.0],
            orbit_period: 20.0,
        },
        BodyEntry {
            kind: BodyKindName::Earth,
            radius: 1.2,
            parent: 0,
            orbit_direction: [0.0, 0.0, 1.0],
            orbit_small_radius: 17.0,
            orbit_large_radius: 18.0,
            orbit_normal: [0.0, 1.0, 0.0],
            orbit_period: 45.0,
        },
        BodyEntry {
            kind: BodyKindName::Body,
            radius: 0.35,
            parent: 2,
            orbit_direction: [1.0, 0.0, 0.0],
            orbit_small_radius: 2.5,
            orbit_large_radius: 3.0,
            orbit_normal: [0.2, 1.0, 0.0],
            orbit_period: 6.0,
        },
        BodyEntry {
            kind: BodyKindName::Body,
            radius: 2.2,
            parent: 0,
            orbit_direction: [-1.0, 0.0, 0.0],
            orbit_small_radius: 28.0,
            orbit_large_radius: 32.0,
            orbit_normal: [0.0, 1.0, 0.15],
            orbit_period: 90.0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scene_parents_precede_children() {
        let scene = default_scene();
        for (index, entry) in scene.iter().enumerate() {
            if let Ok(Some(parent)) = entry.parent_index() {
                assert!(parent < index, "entry {index} names later parent {parent}");
            }
        }
    }

    #[test]
    fn test_default_scene_starts_with_star() {
        let scene = default_scene();
        assert_eq!(scene[0].kind, BodyKindName::Star);
        assert_eq!(scene[0].parent, -1);
    }

    #[test]
    fn test_only_minus_one_means_no_parent() {
        let mut entry = BodyEntry::default();
        assert_eq!(entry.parent_index(), Ok(None));
        entry.parent = 2;
        assert_eq!(entry.parent_index(), Ok(Some(2)));
        entry.parent = -2;
        assert_eq!(entry.parent_index(), Err(-2));
    }

    #[test]
    fn test_kind_names_are_lowercase() {
        let entry: BodyEntry = ron::from_str("(kind: earth, radius: 2.0)").unwrap();
        assert_eq!(entry.kind, BodyKindName::Earth);
        assert_eq!(entry.radius, 2.0);
        assert_eq!(entry.orbit_period, 1.0);
    }
}
