/// Terminal front end: rendering, overlays, input and sound.

pub mod gamepad;
pub mod input;
pub mod overlay;
pub mod renderer;
pub mod sound;
