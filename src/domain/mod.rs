/// Pure game rules: geometry, the actor, obstacles and the input map.
/// Nothing here knows about time, terminals or sound.

pub mod actor;
pub mod controls;
pub mod geometry;
pub mod obstacle;
