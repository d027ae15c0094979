/// Logical input state read by the actor each tick.
///
/// The front end (keyboard, gamepad) writes into this map; the simulation
/// only ever reads it. Keys are logical identifiers, not terminal key codes.

use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    KeyW,
    KeyS,
}

const UP_KEYS: [Key; 2] = [Key::ArrowUp, Key::KeyW];
const DOWN_KEYS: [Key; 2] = [Key::ArrowDown, Key::KeyS];

#[derive(Clone, Debug, Default)]
pub struct Controls {
    keys: HashMap<Key, bool>,
}

impl Controls {
    pub fn new() -> Self {
        Controls { keys: HashMap::with_capacity(4) }
    }

    pub fn set(&mut self, key: Key, pressed: bool) {
        self.keys.insert(key, pressed);
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.keys.get(&key).copied().unwrap_or(false)
    }

    /// Any "up" key held (ArrowUp or W).
    pub fn up(&self) -> bool {
        UP_KEYS.iter().any(|k| self.is_pressed(*k))
    }

    /// Any "down" key held (ArrowDown or S).
    pub fn down(&self) -> bool {
        DOWN_KEYS.iter().any(|k| self.is_pressed(*k))
    }

    pub fn any_vertical(&self) -> bool {
        self.up() || self.down()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_empty(&self) -> bool {
        !self.keys.values().any(|pressed| *pressed)
    }
}
