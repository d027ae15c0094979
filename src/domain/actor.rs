/// The player character: vertical-only motion with acceleration, a speed
/// clamp and drag.
///
/// Per tick:
///   1. up held → velocity -= accel; down held → velocity += accel (both may apply)
///   2. clamp velocity to ±max_speed
///   3. y += velocity
///   4. no vertical key held → velocity *= drag
///   5. clamp y to the board
///
/// Drag is skipped whenever a vertical key is held, even if up and down
/// cancelled out. Velocity survives respawns; only the position resets.

use super::controls::Controls;
use super::geometry::{Rect, BOARD_HEIGHT, BOARD_WIDTH};

pub const ACTOR_WIDTH: f32 = 54.0;
pub const ACTOR_HEIGHT: f32 = 54.0;
pub const ACTOR_X: f32 = BOARD_WIDTH / 8.0;
pub const ACTOR_START_Y: f32 = BOARD_HEIGHT / 2.0;

pub const ACCELERATION: f32 = 0.3;
pub const MAX_SPEED: f32 = 5.0;
pub const DRAG: f32 = 0.9;

/// Instantaneous displacement applied by one pointer/touch event.
pub const POINTER_NUDGE: f32 = 30.0;

/// Selectable character skins.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Character {
    #[default]
    Sunny,
    Ember,
}

impl Character {
    pub fn name(self) -> &'static str {
        match self {
            Character::Sunny => "Sunny",
            Character::Ember => "Ember",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Actor {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub velocity: f32,
    spawn_y: f32,
}

impl Actor {
    pub fn new() -> Self {
        Actor {
            x: ACTOR_X,
            y: ACTOR_START_Y,
            width: ACTOR_WIDTH,
            height: ACTOR_HEIGHT,
            velocity: 0.0,
            spawn_y: ACTOR_START_Y,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Lowest y the actor's top edge may take.
    #[inline]
    fn floor(&self, board_height: f32) -> f32 {
        (board_height - self.height).max(0.0)
    }

    /// Advance one tick.
    pub fn update(&mut self, controls: &Controls, board_height: f32) {
        let up = controls.up();
        let down = controls.down();

        if up { self.velocity -= ACCELERATION; }
        if down { self.velocity += ACCELERATION; }
        self.velocity = self.velocity.clamp(-MAX_SPEED, MAX_SPEED);

        self.y += self.velocity;

        if !controls.any_vertical() {
            self.velocity *= DRAG;
        }

        self.y = self.y.clamp(0.0, self.floor(board_height));
    }

    /// Pointer/touch nudge: above mid-board moves up, otherwise down.
    pub fn nudge(&mut self, pointer_y: f32, board_height: f32) {
        let dy = if pointer_y < board_height / 2.0 { -POINTER_NUDGE } else { POINTER_NUDGE };
        self.y = (self.y + dy).clamp(0.0, self.floor(board_height));
    }

    /// Back to the starting height. Velocity is left untouched.
    pub fn respawn(&mut self) {
        self.y = self.spawn_y;
    }
}
