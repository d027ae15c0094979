/// Gamepad input tracker using gilrs.
///
/// Fixed mapping:
///   D-pad Up/Down / Left Stick Y  →  move (held)
///   Start                         →  play / pause / replay
///   West (X)                      →  select Sunny
///   North (Y)                     →  select Ember
///   East (B)                      →  change character
///
/// Without the "gamepad" feature every query returns false.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

const STICK_DEADZONE: f32 = 0.25;

/// Buttons the game listens to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Btn {
    Start,
    West,
    North,
    East,
    DPadUp,
    DPadDown,
}

impl Btn {
    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::Start => Some(Btn::Start),
            Button::West => Some(Btn::West),
            Button::North => Some(Btn::North),
            Button::East => Some(Btn::East),
            Button::DPadUp => Some(Btn::DPadUp),
            Button::DPadDown => Some(Btn::DPadDown),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; 6],
    stick_y: f32,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                if has_pad {
                    log::info!("gamepad detected");
                }
                (Some(g), has_pad)
            }
            Err(e) => {
                log::warn!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            buttons: [BtnState::default(); 6],
            stick_y: 0.0,
            connected,
        }
    }

    /// Poll pending gamepad events. Call once per loop iteration.
    pub fn update(&mut self) {
        for b in &mut self.buttons {
            b.just_pressed = false;
        }

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = &mut self.gilrs else { return };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    if let Some(b) = Btn::from_gilrs(btn) {
                        self.press(b);
                    }
                }
                EventType::ButtonReleased(btn, _) => {
                    if let Some(b) = Btn::from_gilrs(btn) {
                        self.release(b);
                    }
                }
                EventType::AxisChanged(Axis::LeftStickY, value, _) => {
                    self.connected = true;
                    self.stick_y = value;
                }
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    fn press(&mut self, btn: Btn) {
        let s = &mut self.buttons[btn.index()];
        if !s.held {
            s.just_pressed = true;
        }
        s.held = true;
    }

    fn release(&mut self, btn: Btn) {
        self.buttons[btn.index()].held = false;
    }

    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); 6];
        self.stick_y = 0.0;
    }

    pub fn just_pressed(&self, btn: Btn) -> bool {
        self.buttons[btn.index()].just_pressed
    }

    // Movement (continuous, held). Stick up is positive in gilrs.
    pub fn up_held(&self) -> bool {
        self.buttons[Btn::DPadUp.index()].held || self.stick_y > STICK_DEADZONE
    }

    pub fn down_held(&self) -> bool {
        self.buttons[Btn::DPadDown.index()].held || self.stick_y < -STICK_DEADZONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad() -> GamepadState {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            buttons: [BtnState::default(); 6],
            stick_y: 0.0,
            connected: true,
        }
    }

    #[test]
    fn press_is_edge_triggered() {
        let mut p = pad();
        p.press(Btn::Start);
        assert!(p.just_pressed(Btn::Start));
        p.update();
        assert!(!p.just_pressed(Btn::Start));
        p.press(Btn::Start);
        assert!(!p.just_pressed(Btn::Start), "still held, no new edge");
        p.release(Btn::Start);
        p.press(Btn::Start);
        assert!(p.just_pressed(Btn::Start));
    }

    #[test]
    fn stick_respects_deadzone() {
        let mut p = pad();
        p.stick_y = 0.2;
        assert!(!p.up_held() && !p.down_held());
        p.stick_y = 0.8;
        assert!(p.up_held());
        p.stick_y = -0.8;
        assert!(p.down_held());
    }

    #[test]
    fn disconnect_releases_everything() {
        let mut p = pad();
        p.press(Btn::DPadDown);
        p.stick_y = 1.0;
        p.release_all();
        assert!(!p.up_held() && !p.down_held());
    }
}
