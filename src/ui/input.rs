/// Terminal input tracker.
///
/// Tracks which keys are currently held down so the actor keeps
/// accelerating while a key is held, plus edge-triggered presses for
/// commands and mouse clicks for the pointer nudge.
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

use crate::domain::controls::{Controls, Key};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the last drain.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for Ctrl+C handling.
    pub raw_events: Vec<KeyEvent>,

    /// Terminal rows of left-button presses, oldest first.
    pub clicks: Vec<u16>,

    /// The terminal was resized since the last drain.
    pub resized: bool,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

/// Logical movement key for a terminal key code.
pub fn key_for(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Up => Some(Key::ArrowUp),
        KeyCode::Down => Some(Key::ArrowDown),
        KeyCode::Char('w') | KeyCode::Char('W') => Some(Key::KeyW),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Key::KeyS),
        _ => None,
    }
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            clicks: Vec::new(),
            resized: false,
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per loop iteration, before advancing the game.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.clicks.clear();
        self.resized = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.record_key(key, Instant::now()),
                Ok(Event::Mouse(m)) => {
                    if let MouseEventKind::Down(MouseButton::Left) = m.kind {
                        self.clicks.push(m.row);
                    }
                }
                Ok(Event::Resize(..)) => self.resized = true,
                Ok(_) => {}
                Err(e) => {
                    log::warn!("terminal event read failed: {e}");
                    break;
                }
            }
        }

        // Expire keys that have timed out (fallback for terminals without Release)
        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn record_key(&mut self, key: KeyEvent, at: Instant) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            // Without enhancement, releases are unreliable; the timeout handles them.
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, at);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    /// Was this key freshly pressed during the last drain?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    /// Write the held state of every movement key into `controls`.
    pub fn sync_controls(&self, controls: &mut Controls) {
        for key in [Key::ArrowUp, Key::ArrowDown, Key::KeyW, Key::KeyS] {
            controls.set(key, false);
        }
        for code in self.last_active.keys() {
            if let Some(key) = key_for(*code) {
                if self.is_held(*code) {
                    controls.set(key, true);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn release(code: KeyCode) -> KeyEvent {
        let mut k = KeyEvent::new(code, KeyModifiers::NONE);
        k.kind = KeyEventKind::Release;
        k
    }

    #[test]
    fn movement_keys_map_to_logical_keys() {
        assert_eq!(key_for(KeyCode::Up), Some(Key::ArrowUp));
        assert_eq!(key_for(KeyCode::Char('S')), Some(Key::KeyS));
        assert_eq!(key_for(KeyCode::Char('p')), None);
    }

    #[test]
    fn first_press_is_fresh_repeat_is_not() {
        let mut input = InputState::new();
        input.record_key(press(KeyCode::Up), Instant::now());
        assert!(input.was_pressed(KeyCode::Up));
        input.fresh_presses.clear();
        input.record_key(press(KeyCode::Up), Instant::now());
        assert!(!input.was_pressed(KeyCode::Up));
        assert!(input.is_held(KeyCode::Up));
    }

    #[test]
    fn release_honored_only_with_enhancement() {
        let mut input = InputState::new();
        input.record_key(press(KeyCode::Down), Instant::now());
        input.record_key(release(KeyCode::Down), Instant::now());
        assert!(input.is_held(KeyCode::Down));

        input.honor_release = true;
        input.record_key(release(KeyCode::Down), Instant::now());
        assert!(!input.is_held(KeyCode::Down));
    }

    #[test]
    fn held_keys_flow_into_controls() {
        let mut input = InputState::new();
        let mut controls = Controls::new();
        controls.set(Key::KeyS, true);
        input.record_key(press(KeyCode::Char('w')), Instant::now());
        input.sync_controls(&mut controls);
        assert!(controls.is_pressed(Key::KeyW));
        assert!(!controls.is_pressed(Key::KeyS));
        assert!(controls.up() && !controls.down());
    }

    #[test]
    fn ctrl_c_detected() {
        let mut input = InputState::new();
        input.record_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), Instant::now());
        assert!(input.ctrl_c_pressed());
    }
}
