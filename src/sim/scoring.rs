/// Scoring and level progression rules.
///
/// Every `points_per_level` points the run advances a level. Below the
/// level cap (or always, outside endless mode) the advance goes through a
/// frozen interstitial; in endless mode past the cap it is immediate.

use crate::config::RulesConfig;
use super::session::Session;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Advance {
    Stay,
    Interstitial,
    Immediate,
}

#[derive(Clone, Debug)]
pub struct LevelRules {
    pub points_per_level: u32,
    pub level_cap: u32,
    pub endless_mode: bool,
    pub speed_increment: f32,
}

impl LevelRules {
    pub fn from_config(rules: &RulesConfig) -> Self {
        LevelRules {
            points_per_level: rules.points_per_level.max(1),
            level_cap: rules.level_cap,
            endless_mode: rules.endless_mode,
            speed_increment: rules.speed_increment,
        }
    }

    /// What a score of `score` at `level` asks for.
    pub fn advance_for(&self, score: u32, level: u32) -> Advance {
        if score == 0 || score % self.points_per_level != 0 {
            Advance::Stay
        } else if level < self.level_cap || !self.endless_mode {
            Advance::Interstitial
        } else {
            Advance::Immediate
        }
    }

    /// Credit one passed obstacle pair.
    pub fn record_pass(&self, session: &mut Session) -> Advance {
        session.score = session.score.saturating_add(1);
        self.advance_for(session.score, session.level)
    }

    /// Level bump and difficulty increase. Background choice and entity
    /// resets are the caller's job.
    pub fn apply_level_up(&self, session: &mut Session) {
        session.level += 1;
        session.scroll_speed -= self.speed_increment;
    }
}
