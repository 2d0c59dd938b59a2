//! Fixed-timestep game loop.
//!
//! Simulation runs at a fixed 60 Hz while rendering runs at whatever rate the
//! surface presents. Orbits and particles are integrated with the fixed step,
//! scaled by the [`TimeWarp`] for bodies only.

use std::time::Instant;
use tracing::warn;

/// Fixed simulation timestep: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Frames longer than this are clamped rather than caught up step by step.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Fixed-timestep accumulator.
///
/// Call [`tick`](Self::tick) once per frame to measure wall-clock time, or
/// [`advance`](Self::advance) with an explicit frame duration.
pub struct GameLoop {
    previous_time: Instant,
    accumulator: f64,
    total_sim_time: f64,
    frame_count: u64,
    update_count: u64,
}

impl GameLoop {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            accumulator: 0.0,
            total_sim_time: 0.0,
            frame_count: 0,
            update_count: 0,
        }
    }

    /// Run one frame measured against the previous call.
    ///
    /// - `update_fn(fixed_dt, total_sim_time)` runs zero or more times.
    /// - `render_fn(alpha)` runs exactly once with alpha in `[0.0, 1.0)`.
    pub fn tick(&mut self, update_fn: impl FnMut(f64, f64), render_fn: impl FnMut(f64)) {
        let current_time = Instant::now();
        let frame_time = current_time
            .duration_since(self.previous_time)
            .as_secs_f64();
        self.previous_time = current_time;
        self.advance(frame_time, update_fn, render_fn);
    }

    /// Run one frame of `frame_time` seconds.
    pub fn advance(
        &mut self,
        mut frame_time: f64,
        mut update_fn: impl FnMut(f64, f64),
        mut render_fn: impl FnMut(f64),
    ) {
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }

        self.accumulator += frame_time.max(0.0);

        while self.accumulator >= FIXED_DT {
            update_fn(FIXED_DT, self.total_sim_time);
            self.total_sim_time += FIXED_DT;
            self.accumulator -= FIXED_DT;
            self.update_count += 1;
        }

        render_fn(self.alpha());
        self.frame_count += 1;
    }

    /// Interpolation alpha left over from the last frame.
    pub fn alpha(&self) -> f64 {
        if self.accumulator > 0.0 {
            self.accumulator / FIXED_DT
        } else {
            0.0
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Total simulated seconds, unaffected by time warp.
    pub fn total_sim_time(&self) -> f64 {
        self.total_sim_time
    }

    /// Forget the time spent outside the loop, e.g. while a reload blocked.
    pub fn reset_clock(&mut self) {
        self.previous_time = Instant::now();
        self.accumulator = 0.0;
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

/// Multiplier applied to the body simulation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWarp(f32);

impl TimeWarp {
    pub const MIN: f32 = 0.0;
    pub const MAX: f32 = 10.0;
    /// Change applied by one key press.
    pub const STEP: f32 = 0.25;

    pub fn new(factor: f32) -> Self {
        let factor = if factor.is_finite() { factor } else { 1.0 };
        Self(factor.clamp(Self::MIN, Self::MAX))
    }

    pub fn factor(self) -> f32 {
        self.0
    }

    pub fn faster(self) -> Self {
        Self::new(self.0 + Self::STEP)
    }

    pub fn slower(self) -> Self {
        Self::new(self.0 - Self::STEP)
    }

    /// Body step for one fixed tick.
    pub fn scale(self, dt: f64) -> f32 {
        dt as f32 * self.0
    }
}

impl Default for TimeWarp {
    fn default() -> Self {
        Self(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_one_step() {
        let mut game_loop = GameLoop::new();
        let mut updates = 0;
        game_loop.advance(FIXED_DT, |_, _| updates += 1, |_| {});
        assert_eq!(updates, 1);
        assert_eq!(game_loop.frame_count(), 1);
    }

    #[test]
    fn test_short_frame_accumulates() {
        let mut game_loop = GameLoop::new();
        let mut updates = 0;
        let mut last_alpha = 0.0;
        game_loop.advance(FIXED_DT * 0.5, |_, _| updates += 1, |a| last_alpha = a);
        assert_eq!(updates, 0);
        assert!((last_alpha - 0.5).abs() < 1e-9);

        game_loop.advance(FIXED_DT * 0.6, |_, _| updates += 1, |_| {});
        assert_eq!(updates, 1);
        assert!((game_loop.alpha() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_long_frame_runs_multiple_steps() {
        let mut game_loop = GameLoop::new();
        let mut sim_times = Vec::new();
        game_loop.advance(FIXED_DT * 3.5, |_, t| sim_times.push(t), |_| {});
        assert_eq!(sim_times.len(), 3);
        assert!((sim_times[2] - 2.0 * FIXED_DT).abs() < 1e-12);
        assert_eq!(game_loop.update_count(), 3);
    }

    #[test]
    fn test_frame_time_is_clamped() {
        let mut game_loop = GameLoop::new();
        let mut updates = 0;
        game_loop.advance(5.0, |_, _| updates += 1, |_| {});
        // 15 steps fit in the clamp, minus one if rounding leaves a sliver short.
        assert!((14..=15).contains(&updates));
        assert!(game_loop.total_sim_time() <= MAX_FRAME_TIME + 1e-9);
    }

    #[test]
    fn test_render_called_once_per_frame() {
        let mut game_loop = GameLoop::new();
        let mut renders = 0;
        for _ in 0..10 {
            game_loop.advance(0.001, |_, _| {}, |_| renders += 1);
        }
        assert_eq!(renders, 10);
        assert_eq!(game_loop.frame_count(), 10);
    }

    #[test]
    fn test_reset_clock_drops_accumulator() {
        let mut game_loop = GameLoop::new();
        game_loop.advance(FIXED_DT * 0.9, |_, _| {}, |_| {});
        game_loop.reset_clock();
        assert_eq!(game_loop.alpha(), 0.0);
    }

    #[test]
    fn test_time_warp_range() {
        assert_eq!(TimeWarp::new(25.0).factor(), TimeWarp::MAX);
        assert_eq!(TimeWarp::new(-1.0).factor(), TimeWarp::MIN);
        assert_eq!(TimeWarp::new(f32::NAN).factor(), 1.0);
        assert_eq!(TimeWarp::default().slower().factor(), 0.75);
        assert_eq!(TimeWarp::new(10.0).faster().factor(), 10.0);
    }

    #[test]
    fn test_time_warp_scales_body_step() {
        let warp = TimeWarp::new(2.0);
        assert!((warp.scale(FIXED_DT) - 2.0 / 60.0).abs() < 1e-7);
        assert_eq!(TimeWarp::new(0.0).scale(FIXED_DT), 0.0);
    }
}
