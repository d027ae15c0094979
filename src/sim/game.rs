/// The game loop and session state machine.
///
/// Phases:
///   NotStarted ─start→ Running ⇄ Paused
///   Running ─level threshold→ Interstitial ─resume timer→ Running
///   Running ─collision→ GameOver
///   any ─reset→ NotStarted        (replay = reset + start)
///
/// Three scheduled tasks drive everything (see `timer`):
///   - Frame: one tick, re-requested at the end of each running tick
///   - SpawnObstacles: repeating, independent of the frame chain
///   - FinishInterstitial: one-shot resume after a level-complete popup
///
/// Each handle is kept in an `Option` and cancelled by whichever transition
/// ends its validity. Every callback re-checks the phase on entry, so a task
/// that slips through is a no-op.
///
/// Running tick order:
///   1. background
///   2. level banner (while it lasts)
///   3. actor update + draw
///   4. obstacle sweep: advance, draw, pass → score, collision
///   5. recycle off-screen obstacles
///   6. score label, request next frame

use std::ops::ControlFlow;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::{GameConfig, TimingConfig};
use crate::domain::actor::{Actor, Character};
use crate::domain::controls::Controls;
use crate::domain::geometry::{Rect, BOARD_HEIGHT, BOARD_WIDTH};
use crate::domain::obstacle::{Category, ObstacleField, Sweep};
use super::event::{GameEvent, Label, Overlay, UiIntent};
use super::scoring::{Advance, LevelRules};
use super::session::{Phase, Session};
use super::surface::{Sprite, Surface, BACKGROUND_COUNT};
use super::timer::{Scheduler, Task, TaskHandle};

/// Longest stretch of wall time the loop will replay after a stall.
const MAX_CATCH_UP: Duration = Duration::from_millis(250);

pub const PAUSE_LABEL: &str = "||";
pub const RESUME_LABEL: &str = "|>";
pub const SOUND_ON_LABEL: &str = "SND";
pub const SOUND_OFF_LABEL: &str = "MUTE";

pub struct Game {
    pub session: Session,
    pub actor: Actor,
    pub obstacles: ObstacleField,
    pub controls: Controls,
    pub character: Option<Character>,

    rules: LevelRules,
    timing: TimingConfig,
    level_complete_message: String,
    game_over_message: String,

    sched: Scheduler,
    frame_task: Option<TaskHandle>,
    spawn_task: Option<TaskHandle>,
    resume_task: Option<TaskHandle>,

    rng: Pcg32,
    clear_pending: bool,
    events: Vec<GameEvent>,
    intents: Vec<UiIntent>,
}

// ── Construction ──

impl Game {
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        let mut game = Game {
            session: Session::new(&config.rules, config.muted),
            actor: Actor::new(),
            obstacles: ObstacleField::new(),
            controls: Controls::new(),
            character: None,
            rules: LevelRules::from_config(&config.rules),
            timing: config.timing.clone(),
            level_complete_message: config.rules.level_complete_message.clone(),
            game_over_message: config.rules.game_over_message.clone(),
            sched: Scheduler::new(),
            frame_task: None,
            spawn_task: None,
            resume_task: None,
            rng: Pcg32::seed_from_u64(seed),
            clear_pending: false,
            events: Vec::new(),
            intents: Vec::new(),
        };
        game.intents.extend([
            UiIntent::Show(Overlay::CharacterSelection),
            UiIntent::Hide(Overlay::PlayButton),
            UiIntent::SetLabel(Label::PauseButton, PAUSE_LABEL.into()),
            UiIntent::SetLabel(Label::MuteButton, mute_label(config.muted).into()),
        ]);
        game
    }

    /// Current virtual time.
    #[cfg(test)]
    pub fn now(&self) -> Duration {
        self.sched.now()
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn take_intents(&mut self) -> Vec<UiIntent> {
        std::mem::take(&mut self.intents)
    }

    #[cfg(test)]
    pub fn is_frame_pending(&self) -> bool {
        self.frame_task.is_some()
    }

    #[cfg(test)]
    pub fn is_spawner_running(&self) -> bool {
        self.spawn_task.is_some()
    }

    #[cfg(test)]
    pub fn is_resume_pending(&self) -> bool {
        self.resume_task.is_some()
    }
}

// ── Clock / dispatch ──

impl Game {
    /// Run every task due up to `now`, in order.
    pub fn run_until(&mut self, now: Duration, surface: &mut dyn Surface) {
        if std::mem::take(&mut self.clear_pending) {
            surface.clear();
        }

        while let Some((handle, task)) = self.sched.pop_due(now) {
            match task {
                Task::Frame => {
                    if self.frame_task == Some(handle) {
                        self.frame_task = None;
                        self.tick(surface);
                    }
                }
                Task::SpawnObstacles => {
                    if self.spawn_task == Some(handle) {
                        self.spawn_obstacles();
                    }
                }
                Task::FinishInterstitial => {
                    if self.resume_task == Some(handle) {
                        self.resume_task = None;
                        self.finish_interstitial();
                    }
                }
            }
        }
        self.sched.settle(now);
    }

    /// Drop wall time beyond `MAX_CATCH_UP` so a stalled terminal does not
    /// replay seconds of frames at once. Returns the span skipped.
    pub fn limit_lag(&mut self, now: Duration) -> Duration {
        let behind = now.saturating_sub(self.sched.now());
        if behind <= MAX_CATCH_UP {
            return Duration::ZERO;
        }
        let skipped = behind - MAX_CATCH_UP;
        self.sched.shift(skipped);
        skipped
    }

    fn request_frame(&mut self) {
        self.cancel_frame();
        self.frame_task = Some(self.sched.after(self.timing.frame_period(), Task::Frame));
    }

    fn cancel_frame(&mut self) {
        if let Some(h) = self.frame_task.take() {
            self.sched.cancel(h);
        }
    }

    fn start_spawner(&mut self) {
        self.stop_spawner();
        self.spawn_task = Some(self.sched.every(self.timing.spawn_interval(), Task::SpawnObstacles));
    }

    fn stop_spawner(&mut self) {
        if let Some(h) = self.spawn_task.take() {
            self.sched.cancel(h);
        }
    }

    fn cancel_resume(&mut self) {
        if let Some(h) = self.resume_task.take() {
            self.sched.cancel(h);
        }
    }
}

// ── Frame ──

impl Game {
    /// One display refresh. No-op unless running.
    pub fn tick(&mut self, surface: &mut dyn Surface) {
        if !self.session.is_running() { return; }

        surface.draw_image(Sprite::Background(self.session.background), Rect::board());
        if let Some(text) = self.session.tick_banner() {
            surface.draw_text_centered(text, BOARD_WIDTH / 2.0, BOARD_HEIGHT / 2.0);
        }

        self.actor.update(&self.controls, BOARD_HEIGHT);
        surface.draw_image(Sprite::Character(self.character.unwrap_or_default()), self.actor.rect());

        let actor = self.actor.rect();
        let dx = self.session.scroll_speed;
        let rules = &self.rules;
        let session = &mut self.session;
        let events = &mut self.events;
        let mut advance = Advance::Stay;

        let sweep = self.obstacles.sweep(
            dx,
            &actor,
            |ob| surface.draw_image(sprite_for(ob.category), ob.rect()),
            || {
                advance = rules.record_pass(session);
                events.push(GameEvent::PointScored { score: session.score });
                if advance == Advance::Stay {
                    ControlFlow::Continue(())
                } else {
                    ControlFlow::Break(())
                }
            },
        );

        self.intents.push(UiIntent::SetLabel(Label::Score, self.session.score.to_string()));

        match sweep {
            Sweep::Interrupted => {
                match advance {
                    Advance::Interstitial => self.begin_interstitial(),
                    Advance::Immediate => self.next_level(),
                    Advance::Stay => {}
                }
                return;
            }
            Sweep::Collided(i) => {
                log::debug!("collision with obstacle #{i} at score {}", self.session.score);
                self.events.push(GameEvent::Collision);
                self.end_run();
                return;
            }
            Sweep::Completed => {}
        }

        self.obstacles.recycle();
        self.request_frame();
    }

    /// Redraw the current scene without advancing it.
    pub fn repaint(&self, surface: &mut dyn Surface) {
        if !self.session.is_started() { return; }
        surface.draw_image(Sprite::Background(self.session.background), Rect::board());
        surface.draw_image(Sprite::Character(self.character.unwrap_or_default()), self.actor.rect());
        for ob in self.obstacles.iter() {
            surface.draw_image(sprite_for(ob.category), ob.rect());
        }
    }

    /// Spawner callback: one obstacle pair at the right edge.
    pub fn spawn_obstacles(&mut self) -> bool {
        if !self.session.is_running() {
            log::trace!("spawn skipped in {:?}", self.session.phase);
            return false;
        }
        let r: f32 = self.rng.random();
        self.obstacles.spawn(r, self.session.score);
        true
    }
}

// ── Level flow ──

impl Game {
    fn begin_interstitial(&mut self) {
        if self.session.is_frozen() { return; }

        self.session.phase = Phase::Interstitial;
        self.cancel_frame();
        self.intents.push(UiIntent::Show(Overlay::Popup));
        self.intents.push(UiIntent::SetLabel(Label::PopupMessage, self.level_complete_message.clone()));

        self.cancel_resume();
        self.resume_task = Some(self.sched.after(self.timing.level_up_delay(), Task::FinishInterstitial));
        log::info!("level {} complete at score {}", self.session.level, self.session.score);
    }

    fn finish_interstitial(&mut self) {
        if !self.session.is_frozen() { return; }
        self.intents.push(UiIntent::Hide(Overlay::Popup));
        self.next_level();
    }

    fn next_level(&mut self) {
        self.intents.push(UiIntent::Show(Overlay::ScoreLabel));

        self.rules.apply_level_up(&mut self.session);
        self.session.background = self.rng.random_range(0..BACKGROUND_COUNT);
        self.obstacles.clear();
        self.actor.respawn();
        self.session.phase = Phase::Running;
        self.session.show_banner(format!("LEVEL {}", self.session.level));

        if self.spawn_task.is_none() {
            self.start_spawner();
        }
        self.request_frame();

        self.events.push(GameEvent::LevelStarted { level: self.session.level });
        log::info!(
            "level {} started, scroll speed {:.1}, background {}",
            self.session.level, self.session.scroll_speed, self.session.background,
        );
    }

    fn end_run(&mut self) {
        if !self.session.is_running() { return; }

        self.cancel_frame();
        self.stop_spawner();
        self.session.phase = Phase::GameOver;

        self.intents.extend([
            UiIntent::Show(Overlay::GameOver),
            UiIntent::SetLabel(Label::GameOverMessage, self.game_over_message.clone()),
            UiIntent::Show(Overlay::ReplayButton),
            UiIntent::Show(Overlay::ChangeCharacterButton),
        ]);
        log::info!("run over: level {}, score {}", self.session.level, self.session.score);
    }
}

// ── Commands ──

impl Game {
    pub fn select_character(&mut self, character: Character) -> bool {
        if self.session.is_started() {
            log::debug!("character change ignored while {:?}", self.session.phase);
            return false;
        }
        self.character = Some(character);
        self.intents.push(UiIntent::Show(Overlay::PlayButton));
        true
    }

    pub fn start(&mut self) -> bool {
        if self.session.is_started() {
            log::debug!("start ignored while {:?}", self.session.phase);
            return false;
        }
        let Some(character) = self.character else {
            log::debug!("start ignored: no character selected");
            return false;
        };

        self.intents.extend([
            UiIntent::Hide(Overlay::CharacterSelection),
            UiIntent::Hide(Overlay::PlayButton),
            UiIntent::Show(Overlay::ScoreLabel),
            UiIntent::SetLabel(Label::Score, self.session.score.to_string()),
            UiIntent::SetLabel(Label::PauseButton, PAUSE_LABEL.into()),
        ]);
        self.session.phase = Phase::Running;
        self.request_frame();
        self.start_spawner();
        log::info!("run started with {}", character.name());
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.session.phase {
            Phase::Running => {
                self.session.phase = Phase::Paused;
                self.cancel_frame();
                self.intents.push(UiIntent::SetLabel(Label::PauseButton, RESUME_LABEL.into()));
                true
            }
            Phase::Paused => {
                self.session.phase = Phase::Running;
                self.request_frame();
                self.intents.push(UiIntent::SetLabel(Label::PauseButton, PAUSE_LABEL.into()));
                true
            }
            other => {
                log::debug!("pause toggle ignored while {:?}", other);
                false
            }
        }
    }

    /// Tear down the run: all tasks cancelled, level 1, empty field,
    /// input cleared. Leaves the game NotStarted.
    pub fn reset(&mut self) {
        self.cancel_frame();
        self.stop_spawner();
        self.cancel_resume();

        let dropped = self.obstacles.len();
        self.session.reset();
        self.obstacles.clear();
        self.actor.respawn();
        self.controls.clear();
        self.clear_pending = true;

        self.intents.extend([
            UiIntent::Hide(Overlay::Popup),
            UiIntent::Hide(Overlay::GameOver),
            UiIntent::Hide(Overlay::ReplayButton),
            UiIntent::Hide(Overlay::ChangeCharacterButton),
            UiIntent::SetLabel(Label::Score, "0".into()),
            UiIntent::SetLabel(Label::PauseButton, PAUSE_LABEL.into()),
        ]);
        log::debug!("session reset, {dropped} obstacles dropped");
    }

    /// Start over with the same character.
    pub fn replay(&mut self) -> bool {
        if !self.session.is_started() || self.character.is_none() {
            return false;
        }
        self.reset();
        self.start()
    }

    /// Back to character selection.
    pub fn change_character(&mut self) -> bool {
        if !self.session.is_started() {
            return false;
        }
        self.reset();
        self.character = None;
        self.intents.push(UiIntent::Show(Overlay::CharacterSelection));
        self.intents.push(UiIntent::Hide(Overlay::PlayButton));
        true
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.session.muted = !self.session.muted;
        self.intents.push(UiIntent::SetLabel(Label::MuteButton, mute_label(self.session.muted).into()));
        self.session.muted
    }

    /// Pointer/touch at board y: one-off nudge up or down.
    pub fn pointer(&mut self, board_y: f32) -> bool {
        if !self.session.is_running() { return false; }
        self.actor.nudge(board_y, BOARD_HEIGHT);
        true
    }
}

fn sprite_for(category: Category) -> Sprite {
    match category {
        Category::Top => Sprite::TopObstacle,
        Category::Bottom => Sprite::BottomObstacle,
    }
}

fn mute_label(muted: bool) -> &'static str {
    if muted { SOUND_OFF_LABEL } else { SOUND_ON_LABEL }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
