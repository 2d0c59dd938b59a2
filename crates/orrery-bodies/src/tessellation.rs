//! Screen-space level-of-detail selection for body meshes.
//!
//! Bodies are drawn from a chain of icospheres of increasing subdivision.
//! Each frame the renderer picks, per body, the coarsest level whose
//! triangle edges project to no more than the target pixel size.

/// Edge length of an icosahedron inscribed in the unit sphere.
pub const ICOSAHEDRON_EDGE: f32 = 1.051_462_2;

const MIN_SURFACE_DISTANCE: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessellationSettings {
    /// Adaptive selection; when off every body uses `base_subdivision`.
    pub enabled: bool,
    /// Desired on-screen edge length in pixels.
    pub target_pixel_size: f32,
    pub base_subdivision: u32,
    pub max_subdivision: u32,
}

impl Default for TessellationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            target_pixel_size: 5.0,
            base_subdivision: 3,
            max_subdivision: 6,
        }
    }
}

/// On-screen length in pixels of a world-space edge seen at `distance`.
pub fn projected_edge_pixels(edge: f32, distance: f32, screen_height: f32, fov_y: f32) -> f32 {
    let distance = distance.max(MIN_SURFACE_DISTANCE);
    edge * screen_height / (2.0 * distance * (fov_y * 0.5).tan())
}

impl TessellationSettings {
    /// Subdivision level for a sphere of `radius` whose centre is
    /// `center_distance` from the camera.
    pub fn subdivision_for(
        &self,
        radius: f32,
        center_distance: f32,
        screen_height: f32,
        fov_y: f32,
    ) -> u32 {
        if !self.enabled {
            return self.base_subdivision.min(self.max_subdivision);
        }
        if self.target_pixel_size <= 0.0 {
            return self.max_subdivision;
        }

        let distance = center_distance - radius;
        let mut edge = radius * ICOSAHEDRON_EDGE;
        for level in 0..=self.max_subdivision {
            if projected_edge_pixels(edge, distance, screen_height, fov_y)
                <= self.target_pixel_size
            {
                return level;
            }
            edge *= 0.5;
        }
        self.max_subdivision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOV: f32 = std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_disabled_uses_base_level() {
        let settings = TessellationSettings {
            enabled: false,
            ..TessellationSettings::default()
        };
        assert_eq!(settings.subdivision_for(1.0, 2.0, 1080.0, FOV), 3);
        assert_eq!(settings.subdivision_for(1.0, 5000.0, 1080.0, FOV), 3);
    }

    #[test]
    fn test_level_decreases_with_distance() {
        let settings = TessellationSettings::default();
        let mut previous = u32::MAX;
        for distance in [1.5, 3.0, 10.0, 40.0, 200.0, 2000.0] {
            let level = settings.subdivision_for(1.0, distance, 1080.0, FOV);
            assert!(level <= previous, "level rose at distance {distance}");
            previous = level;
        }
        assert_eq!(settings.subdivision_for(1.0, 1.01, 1080.0, FOV), 6);
        assert_eq!(settings.subdivision_for(1.0, 1.0e5, 1080.0, FOV), 0);
    }

    #[test]
    fn test_smaller_target_refines() {
        let coarse = TessellationSettings {
            target_pixel_size: 40.0,
            ..TessellationSettings::default()
        };
        let fine = TessellationSettings {
            target_pixel_size: 2.0,
            ..TessellationSettings::default()
        };
        let coarse_level = coarse.subdivision_for(2.0, 30.0, 720.0, FOV);
        let fine_level = fine.subdivision_for(2.0, 30.0, 720.0, FOV);
        assert!(fine_level > coarse_level);
    }

    #[test]
    fn test_projected_edge_pixels() {
        // At 90° fov, a distance-1 plane spans 2 world units over the screen.
        let px = projected_edge_pixels(1.0, 1.0, 1000.0, FOV);
        assert!((px - 500.0).abs() < 0.5);
    }
}
