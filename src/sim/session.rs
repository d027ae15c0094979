/// Session: all mutable run state that is not an entity.
///
/// The game-over / frozen / paused flags are views of a single `Phase`, so
/// at most one of them can hold at a time.

use crate::config::RulesConfig;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Character selection; nothing scheduled.
    NotStarted,
    Running,
    /// User pause.
    Paused,
    /// Level-complete popup; frozen until the resume timer fires.
    Interstitial,
    GameOver,
}

/// How long the "LEVEL n" banner stays on screen after a level change.
pub const LEVEL_BANNER_FRAMES: u32 = 90;

#[derive(Clone, Debug)]
pub struct LevelBanner {
    pub text: String,
    pub frames_left: u32,
}

#[derive(Clone, Debug)]
pub struct Session {
    pub phase: Phase,
    pub score: u32,
    pub level: u32,
    /// Board units per frame; negative moves obstacles left.
    pub scroll_speed: f32,
    base_scroll_speed: f32,
    pub background: usize,
    pub muted: bool,
    pub banner: Option<LevelBanner>,
}

impl Session {
    pub fn new(rules: &RulesConfig, muted: bool) -> Self {
        Session {
            phase: Phase::NotStarted,
            score: 0,
            level: 1,
            scroll_speed: rules.scroll_speed,
            base_scroll_speed: rules.scroll_speed,
            background: 0,
            muted,
            banner: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn is_frozen(&self) -> bool {
        self.phase == Phase::Interstitial
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn is_started(&self) -> bool {
        self.phase != Phase::NotStarted
    }

    /// Back to a fresh level-1 session. Mute survives; it belongs to the player.
    pub fn reset(&mut self) {
        self.phase = Phase::NotStarted;
        self.score = 0;
        self.level = 1;
        self.scroll_speed = self.base_scroll_speed;
        self.background = 0;
        self.banner = None;
    }

    pub fn show_banner(&mut self, text: String) {
        self.banner = Some(LevelBanner { text, frames_left: LEVEL_BANNER_FRAMES });
    }

    /// Count the banner down by one frame, returning its text if still shown.
    pub fn tick_banner(&mut self) -> Option<&str> {
        let expired = match &mut self.banner {
            Some(b) if b.frames_left > 0 => {
                b.frames_left -= 1;
                false
            }
            Some(_) => true,
            None => return None,
        };
        if expired {
            self.banner = None;
            return None;
        }
        self.banner.as_ref().map(|b| b.text.as_str())
    }
}
