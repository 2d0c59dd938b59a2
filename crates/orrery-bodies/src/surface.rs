//! Procedural surface parameters for the special body kinds.

use bytemuck::{Pod, Zeroable};

/// Vertex displacement amplitude shared by every kind.
pub const DEFAULT_DISPLACEMENT: f32 = 0.1;

/// Animated plasma surface of a star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarSurface {
    pub octaves: u32,
    pub lacunarity: f32,
    pub persistence: f32,
    /// Frequency of the domain-warp noise.
    pub warp_noise_scale: f32,
    pub noise_scale: f32,
    pub animation_speed: f32,
}

impl Default for StarSurface {
    fn default() -> Self {
        Self {
            octaves: 5,
            lacunarity: 2.0,
            persistence: 0.3,
            warp_noise_scale: 1.5,
            noise_scale: 20.0,
            animation_speed: 0.3,
        }
    }
}

/// Terrain and ocean parameters of an Earth-like planet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarthSurface {
    /// Normalised terrain height below which the surface is water.
    pub ocean_level: f32,

    pub shape_octaves: u32,
    pub shape_lacunarity: f32,
    pub shape_persistence: f32,
    pub shape_base_frequency: f32,
    /// Offset into noise space, picks a different continent layout.
    pub shape_pseudo_seed: f32,
    /// Terrain height relative to the radius.
    pub shape_scale: f32,

    pub water_octaves: u32,
    pub water_lacunarity: f32,
    pub water_persistence: f32,
    pub ocean_scale: f32,
    pub ocean_speed: f32,

    // Phong terms for the water
    pub water_ka: f32,
    pub water_kd: f32,
    pub water_ks: f32,
    pub water_shininess: f32,
}

impl Default for EarthSurface {
    fn default() -> Self {
        Self {
            ocean_level: 0.0,
            shape_octaves: 5,
            shape_lacunarity: 2.0,
            shape_persistence: 0.45,
            shape_base_frequency: 5.0,
            shape_pseudo_seed: 100.0,
            shape_scale: 0.1,
            water_octaves: 5,
            water_lacunarity: 2.0,
            water_persistence: 0.45,
            ocean_scale: 10.0,
            ocean_speed: 0.3,
            water_ka: 0.2,
            water_kd: 0.8,
            water_ks: 0.9,
            water_shininess: 128.0,
        }
    }
}

/// Kind-specific block at the end of the body uniform buffer.
///
/// Matches `SurfaceUniforms` in `common.wgsl`; fields a kind does not use
/// stay zero.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SurfaceUniforms {
    pub displacement: f32,
    pub octaves: u32,
    pub lacunarity: f32,
    pub persistence: f32,

    pub warp_noise_scale: f32,
    pub noise_scale: f32,
    pub animation_speed: f32,
    pub ocean_level: f32,

    pub shape_octaves: u32,
    pub shape_lacunarity: f32,
    pub shape_persistence: f32,
    pub shape_base_frequency: f32,

    pub shape_pseudo_seed: f32,
    pub shape_scale: f32,
    pub water_octaves: u32,
    pub water_lacunarity: f32,

    pub water_persistence: f32,
    pub ocean_scale: f32,
    pub ocean_speed: f32,
    pub water_ka: f32,

    pub water_kd: f32,
    pub water_ks: f32,
    pub water_shininess: f32,
    pub _padding: f32,
}

impl SurfaceUniforms {
    pub fn plain(displacement: f32) -> Self {
        Self {
            displacement,
            ..Self::default()
        }
    }
}

impl StarSurface {
    pub fn uniforms(&self, displacement: f32) -> SurfaceUniforms {
        SurfaceUniforms {
            displacement,
            octaves: self.octaves,
            lacunarity: self.lacunarity,
            persistence: self.persistence,
            warp_noise_scale: self.warp_noise_scale,
            noise_scale: self.noise_scale,
            animation_speed: self.animation_speed,
            ..SurfaceUniforms::default()
        }
    }
}

impl EarthSurface {
    pub fn uniforms(&self, displacement: f32) -> SurfaceUniforms {
        SurfaceUniforms {
            displacement,
            ocean_level: self.ocean_level,
            shape_octaves: self.shape_octaves,
            shape_lacunarity: self.shape_lacunarity,
            shape_persistence: self.shape_persistence,
            shape_base_frequency: self.shape_base_frequency,
            shape_pseudo_seed: self.shape_pseudo_seed,
            shape_scale: self.shape_scale,
            water_octaves: self.water_octaves,
            water_lacunarity: self.water_lacunarity,
            water_persistence: self.water_persistence,
            ocean_scale: self.ocean_scale,
            ocean_speed: self.ocean_speed,
            water_ka: self.water_ka,
            water_kd: self.water_kd,
            water_ks: self.water_ks,
            water_shininess: self.water_shininess,
            ..SurfaceUniforms::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_block_is_16_byte_multiple() {
        assert_eq!(std::mem::size_of::<SurfaceUniforms>(), 96);
        assert_eq!(std::mem::size_of::<SurfaceUniforms>() % 16, 0);
    }

    #[test]
    fn test_star_fields_do_not_leak_into_earth_block() {
        let star = StarSurface::default().uniforms(DEFAULT_DISPLACEMENT);
        assert_eq!(star.octaves, 5);
        assert_eq!(star.noise_scale, 20.0);
        assert_eq!(star.shape_octaves, 0);
        assert_eq!(star.water_shininess, 0.0);
    }

    #[test]
    fn test_earth_defaults_reach_uniforms() {
        let earth = EarthSurface::default().uniforms(DEFAULT_DISPLACEMENT);
        assert_eq!(earth.displacement, 0.1);
        assert_eq!(earth.shape_pseudo_seed, 100.0);
        assert_eq!(earth.water_shininess, 128.0);
        assert_eq!(earth.warp_noise_scale, 0.0);
    }
}
