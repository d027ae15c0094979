/// Simulation: session state, scheduling and the per-frame game loop.

pub mod event;
pub mod game;
pub mod scoring;
pub mod session;
pub mod surface;
pub mod timer;
