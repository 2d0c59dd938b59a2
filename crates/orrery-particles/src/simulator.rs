//! Fixed-capacity particle pool with back-to-front packing.

use std::f32::consts::TAU;

use glam::{Mat3, Mat4, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::emitter::EmitterParams;

/// One pool slot. A slot is free when `life <= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: [u8; 4],
    pub size: f32,
    pub life: f32,
    /// Distance to the camera at the last update, -1 when dead.
    pub camera_distance: f32,
}

impl Particle {
    const DEAD: Particle = Particle {
        position: Vec3::ZERO,
        velocity: Vec3::ZERO,
        color: [0; 4],
        size: 0.0,
        life: -1.0,
        camera_distance: -1.0,
    };

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Unit direction within `cone_angle` radians of +Z, uniform over the cap.
pub fn sample_cone_direction(rng: &mut impl Rng, cone_angle: f32) -> Vec3 {
    let cos_theta = 1.0 - rng.random::<f32>() * (1.0 - cone_angle.cos());
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = rng.random::<f32>() * TAU;
    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

/// World-space right and up vectors of the camera, for billboarding.
pub fn billboard_axes(view: Mat4) -> (Vec3, Vec3) {
    (view.row(0).truncate(), view.row(1).truncate())
}

/// Owns every particle, spawns into free slots and keeps the alive ones
/// sorted far-to-near in contiguous upload buffers.
pub struct ParticleSimulator {
    particles: Vec<Particle>,
    last_used: usize,
    rng: ChaCha8Rng,
    position_size: Vec<[f32; 4]>,
    colors: Vec<[u8; 4]>,
    alive_count: usize,
}

impl ParticleSimulator {
    pub fn new(capacity: usize, seed: u64) -> Self {
        Self {
            particles: vec![Particle::DEAD; capacity],
            last_used: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            position_size: vec![[0.0; 4]; capacity],
            colors: vec![[0; 4]; capacity],
            alive_count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Particles packed by the last [`update`](Self::update).
    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Centre in xyz and size in w of each alive particle, farthest first.
    pub fn position_size_data(&self) -> &[[f32; 4]] {
        &self.position_size[..self.alive_count]
    }

    /// RGBA of each alive particle, same order as the positions.
    pub fn color_data(&self) -> &[[u8; 4]] {
        &self.colors[..self.alive_count]
    }

    /// Index of a free slot, searching onwards from the last one handed
    /// out. A full pool recycles slot 0.
    pub fn find_unused_slot(&mut self) -> usize {
        let capacity = self.particles.len();
        let start = self.last_used.min(capacity);
        let found = (start..capacity)
            .chain(0..start)
            .find(|&index| !self.particles[index].is_alive());
        match found {
            Some(index) => {
                self.last_used = index;
                index
            }
            None => 0,
        }
    }

    /// Initialise one particle at `origin` (emitter space) under `transform`.
    pub fn spawn(&mut self, origin: Vec3, transform: Mat4, params: &EmitterParams) {
        if self.particles.is_empty() {
            return;
        }
        let slot = self.find_unused_slot();
        let rng = &mut self.rng;

        let life = params.life + rng.random::<f32>() * params.life_deviation;

        let disk_radius = params.spawn_radius * rng.random::<f32>().sqrt();
        let disk_angle = rng.random::<f32>() * TAU;
        let offset = Vec3::new(
            disk_radius * disk_angle.cos(),
            disk_radius * disk_angle.sin(),
            0.0,
        );
        let position = transform.transform_point3(origin + offset);

        // Upper 3x3, scale included.
        let linear = Mat3::from_mat4(transform);
        let direction = linear * sample_cone_direction(rng, params.cone_angle);
        let mut jitter = || (rng.random::<f32>() - 0.5) * params.velocity_spread;
        let jitter = Vec3::new(jitter(), jitter(), jitter());
        let velocity = direction + linear * params.base_velocity + jitter;

        let mut channel = |i: usize| {
            let (lo, hi) = (params.color_min[i], params.color_max[i]);
            rng.random_range(lo.min(hi)..=hi.max(lo))
        };
        let color = [channel(0), channel(1), channel(2), 255];

        let size = params.size + rng.random::<f32>() * params.size_deviation;

        self.particles[slot] = Particle {
            position,
            velocity,
            color,
            size,
            life,
            camera_distance: -1.0,
        };
    }

    /// Spawn this tick's share of particles at every origin.
    pub fn emit(&mut self, dt: f32, transform: Mat4, origins: &[Vec3], params: &EmitterParams) {
        let count = params.spawn_count(dt);
        for &origin in origins {
            for _ in 0..count {
                self.spawn(origin, transform, params);
            }
        }
    }

    /// Age, move and fade every particle, then pack the alive ones
    /// farthest-first for alpha blending.
    pub fn update(&mut self, dt: f32, camera_position: Vec3, life_threshold: f32) {
        for particle in &mut self.particles {
            particle.life -= dt;
            if particle.is_alive() {
                particle.velocity += particle.velocity * dt * 0.5;
                particle.position += particle.velocity * dt;
                particle.camera_distance = particle.position.distance(camera_position);
                if life_threshold > 0.0 && particle.life < life_threshold {
                    let fade = (particle.life / life_threshold).clamp(0.0, 1.0);
                    particle.color[3] = (fade * 255.0) as u8;
                }
            } else {
                particle.camera_distance = -1.0;
            }
        }

        self.particles
            .sort_unstable_by(|a, b| b.camera_distance.total_cmp(&a.camera_distance));

        self.alive_count = 0;
        for particle in self.particles.iter().take_while(|p| p.is_alive()) {
            self.position_size[self.alive_count] =
                particle.position.extend(particle.size).to_array();
            self.colors[self.alive_count] = particle.color;
            self.alive_count += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still_params() -> EmitterParams {
        EmitterParams {
            spawn_radius: 0.0,
            velocity_spread: 0.0,
            life_deviation: 0.0,
            size_deviation: 0.0,
            ..EmitterParams::default()
        }
    }

    #[test]
    fn test_new_pool_is_dead() {
        let sim = ParticleSimulator::new(8, 1);
        assert!(sim.particles().iter().all(|p| p.life < 0.0 && p.camera_distance == -1.0));
        assert_eq!(sim.alive_count(), 0);
    }

    #[test]
    fn test_lifecycle() {
        let mut sim = ParticleSimulator::new(4, 7);
        let params = EmitterParams {
            life: 1.0,
            ..still_params()
        };
        sim.spawn(Vec3::ZERO, Mat4::IDENTITY, &params);
        sim.update(0.5, Vec3::new(0.0, 0.0, -10.0), 0.1);
        assert_eq!(sim.alive_count(), 1);
        assert!(sim.particles()[0].camera_distance > 0.0);

        sim.update(0.6, Vec3::ZERO, 0.1);
        assert_eq!(sim.alive_count(), 0);
        assert!(sim.particles().iter().all(|p| p.camera_distance == -1.0));

        // The expired slot is handed out again.
        let mut full = ParticleSimulator::new(2, 7);
        full.spawn(Vec3::ZERO, Mat4::IDENTITY, &params);
        full.spawn(Vec3::ZERO, Mat4::IDENTITY, &EmitterParams { life: 5.0, ..params });
        full.update(1.1, Vec3::ZERO, 0.1);
        assert_eq!(full.alive_count(), 1);
        let free = full.find_unused_slot();
        assert!(!full.particles()[free].is_alive());
        assert_eq!(free, 1);
    }

    #[test]
    fn test_slots_past_alive_count_are_dead() {
        let mut sim = ParticleSimulator::new(64, 9);
        let params = EmitterParams {
            life: 0.5,
            life_deviation: 1.0,
            ..EmitterParams::default()
        };
        for i in 0..48 {
            sim.spawn(Vec3::new(0.0, i as f32, 0.0), Mat4::IDENTITY, &params);
        }
        sim.update(0.9, Vec3::new(4.0, 0.0, 0.0), 0.5);

        let alive = sim.alive_count();
        assert!(alive > 0 && alive < 48);
        let (front, tail) = sim.particles().split_at(alive);
        assert!(front.iter().all(|p| p.is_alive() && p.camera_distance >= 0.0));
        assert!(tail.iter().all(|p| !p.is_alive() && p.camera_distance == -1.0));
    }

    #[test]
    fn test_packed_buffers_are_sorted_far_to_near() {
        let mut sim = ParticleSimulator::new(64, 3);
        let params = EmitterParams {
            spawn_radius: 5.0,
            ..EmitterParams::default()
        };
        for i in 0..40 {
            sim.spawn(Vec3::new(i as f32, 0.0, 0.0), Mat4::IDENTITY, &params);
        }
        let camera = Vec3::new(-3.0, 2.0, 1.0);
        sim.update(0.01, camera, 0.5);

        assert_eq!(sim.alive_count(), 40);
        let distances: Vec<f32> = sim
            .position_size_data()
            .iter()
            .map(|p| Vec3::new(p[0], p[1], p[2]).distance(camera))
            .collect();
        assert!(distances.windows(2).all(|pair| pair[0] >= pair[1] - 1e-4));
        assert_eq!(sim.color_data().len(), 40);
    }

    #[test]
    fn test_zero_cone_emits_along_axis() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..100 {
            assert_eq!(sample_cone_direction(&mut rng, 0.0), Vec3::Z);
        }

        let mut sim = ParticleSimulator::new(1, 5);
        let params = still_params().with_cone_degrees(0.0);
        sim.spawn(Vec3::ZERO, Mat4::IDENTITY, &params);
        assert!((sim.particles()[0].velocity - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_half_turn_cone_reaches_every_direction() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let samples: Vec<Vec3> = (0..20_000)
            .map(|_| sample_cone_direction(&mut rng, std::f32::consts::PI))
            .collect();
        assert!(samples.iter().all(|d| (d.length() - 1.0).abs() < 1e-4));
        for axis in [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z] {
            assert!(
                samples.iter().any(|d| d.dot(axis) > 0.99),
                "no sample near {axis:?}"
            );
        }
    }

    #[test]
    fn test_cone_respects_half_angle() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let cone = 30f32.to_radians();
        for _ in 0..1000 {
            let direction = sample_cone_direction(&mut rng, cone);
            assert!(direction.z >= cone.cos() - 1e-5);
        }
    }

    #[test]
    fn test_fade_and_death() {
        let mut sim = ParticleSimulator::new(2, 0);
        let params = EmitterParams {
            life: 2.0,
            ..still_params()
        };
        sim.spawn(Vec3::ZERO, Mat4::IDENTITY, &params);

        sim.update(1.5, Vec3::ZERO, 1.0);
        assert_eq!(sim.alive_count(), 1);
        assert_eq!(sim.color_data()[0][3], 127);

        sim.update(0.6, Vec3::ZERO, 1.0);
        assert_eq!(sim.alive_count(), 0);
    }

    #[test]
    fn test_velocity_feedback() {
        let mut sim = ParticleSimulator::new(1, 0);
        sim.spawn(Vec3::ZERO, Mat4::IDENTITY, &still_params().with_cone_degrees(0.0));
        sim.update(0.1, Vec3::ZERO, 0.0);
        let particle = sim.particles()[0];
        assert!((particle.velocity.z - 1.05).abs() < 1e-5);
        assert!((particle.position.z - 0.105).abs() < 1e-5);
    }

    #[test]
    fn test_full_pool_recycles_slot_zero() {
        let mut sim = ParticleSimulator::new(3, 0);
        let params = still_params();
        for _ in 0..3 {
            sim.spawn(Vec3::ZERO, Mat4::IDENTITY, &params);
        }
        assert!(sim.particles().iter().all(Particle::is_alive));
        assert_eq!(sim.find_unused_slot(), 0);

        let marked = EmitterParams {
            size: 9.0,
            ..still_params()
        };
        sim.spawn(Vec3::ZERO, Mat4::IDENTITY, &marked);
        assert_eq!(sim.particles()[0].size, 9.0);
    }

    #[test]
    fn test_slot_search_wraps() {
        let mut sim = ParticleSimulator::new(4, 0);
        let params = still_params();
        for _ in 0..4 {
            sim.spawn(Vec3::ZERO, Mat4::IDENTITY, &params);
        }
        sim.particles[1].life = -1.0;
        assert_eq!(sim.find_unused_slot(), 1);
    }

    #[test]
    fn test_spawn_follows_transform() {
        let mut sim = ParticleSimulator::new(1, 0);
        let transform = Mat4::from_scale(glam::Vec3::splat(0.05))
            * Mat4::from_translation(Vec3::new(150.0, 20.0, 20.0))
            * Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let params = still_params().with_cone_degrees(0.0);
        sim.spawn(Vec3::ZERO, transform, &params);

        let particle = sim.particles()[0];
        assert!((particle.position - Vec3::new(7.5, 1.0, 1.0)).length() < 1e-4);
        // +Z turned a quarter about Y points along +X, shrunk with the emitter.
        assert!((particle.velocity - Vec3::new(0.05, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_base_velocity_is_scaled_with_emitter() {
        let mut sim = ParticleSimulator::new(1, 0);
        let transform = Mat4::from_scale(Vec3::splat(0.05))
            * Mat4::from_translation(Vec3::new(150.0, 20.0, 20.0));
        let params = EmitterParams {
            base_velocity: Vec3::new(0.0, 2.0, 0.0),
            ..still_params().with_cone_degrees(0.0)
        };
        sim.spawn(Vec3::ZERO, transform, &params);
        assert!((sim.particles()[0].velocity - Vec3::new(0.0, 0.1, 0.05)).length() < 1e-5);
    }

    #[test]
    fn test_colors_within_ranges() {
        let mut sim = ParticleSimulator::new(200, 21);
        let params = EmitterParams::default();
        for _ in 0..200 {
            sim.spawn(Vec3::ZERO, Mat4::IDENTITY, &params);
        }
        for p in sim.particles() {
            assert!((233..=255).contains(&p.color[0]));
            assert!((165..=255).contains(&p.color[1]));
            assert_eq!(p.color[2], 0);
            assert_eq!(p.color[3], 255);
        }
    }

    #[test]
    fn test_emit_spawns_per_origin() {
        let mut sim = ParticleSimulator::new(1000, 2);
        let origins = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
        // 1/80 s at 1000 particles per second is 12 per origin.
        sim.emit(0.0125, Mat4::IDENTITY, &origins, &EmitterParams::default());
        sim.update(0.0, Vec3::ZERO, 0.5);
        assert_eq!(sim.alive_count(), 48);
    }

    #[test]
    fn test_same_seed_same_particles() {
        let run = || {
            let mut sim = ParticleSimulator::new(32, 1234);
            sim.emit(0.02, Mat4::IDENTITY, &[Vec3::ZERO], &EmitterParams::default());
            sim.particles().to_vec()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_billboard_axes_from_view() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let (right, up) = billboard_axes(view);
        assert!((right - Vec3::X).length() < 1e-6);
        assert!((up - Vec3::Y).length() < 1e-6);
    }
}
