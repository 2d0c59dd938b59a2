//! Orrery application: window, fixed-timestep loop and the demo scene.

pub mod camera_rig;
pub mod controls;
pub mod game_loop;
pub mod scene;
pub mod ship;
pub mod simulation;
pub mod window;
