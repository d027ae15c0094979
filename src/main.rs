/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::actor::Character;
use domain::controls::Key;
use sim::game::Game;
use ui::gamepad::{Btn, GamepadState};
use ui::input::InputState;
use ui::overlay::Overlays;
use ui::renderer::Renderer;
use ui::sound::{self, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    let logging = init_logging(&config);
    for w in &config.warnings {
        log::warn!("{w}");
    }

    let seed = config.seed.unwrap_or_else(clock_seed);
    log::info!("gapwing starting, seed {seed}");

    let mut game = Game::new(&config, seed);
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut game, &mut renderer, sound.as_ref());

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop failed: {e}");
        eprintln!("Game error: {e}");
    }

    if !logging {
        for w in &config.warnings {
            eprintln!("config: {w}");
        }
    }

    println!();
    println!("Thanks for playing Gapwing!");
    println!("Final Score: {}  (level {})", game.session.score, game.session.level);
}

/// Route log output to the configured file. The terminal belongs to the
/// renderer, so without a file nothing is logged.
fn init_logging(config: &GameConfig) -> bool {
    let Some(path) = &config.log_file else { return false };
    match File::create(path) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
            true
        }
        Err(e) => {
            eprintln!("could not open log file {}: {e}", path.display());
            false
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5eed)
}

fn game_loop(
    game: &mut Game,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.keyboard_enhanced;
    let mut gp = GamepadState::new();
    let mut overlays = Overlays::new();
    let start = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_commands(game, &kb, &gp) {
            break;
        }

        if game.session.is_started() {
            kb.sync_controls(&mut game.controls);
            if gp.up_held() { game.controls.set(Key::ArrowUp, true); }
            if gp.down_held() { game.controls.set(Key::ArrowDown, true); }
        }

        for &row in &kb.clicks {
            if let Some(y) = renderer.board_y_for_row(row) {
                game.pointer(y);
            }
        }

        if renderer.sync_size()? {
            game.repaint(renderer.surface());
        }

        let now = start.elapsed();
        let skipped = game.limit_lag(now);
        if !skipped.is_zero() {
            log::debug!("fell behind, skipped {skipped:?}");
        }
        game.run_until(now, renderer.surface());

        sound::play_events(sound, &game.take_events(), game.session.muted);
        overlays.apply(game.take_intents());

        renderer.render(game, &overlays, gp.connected)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Apply this iteration's command keys. Returns true to quit.
fn handle_commands(game: &mut Game, kb: &InputState, gp: &GamepadState) -> bool {
    let s = &game.session;
    let in_menu = !s.is_started() || s.is_game_over() || s.is_paused();
    if in_menu && kb.any_pressed(&[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc]) {
        return true;
    }

    if kb.was_pressed(KeyCode::Char('1')) || gp.just_pressed(Btn::West) {
        game.select_character(Character::Sunny);
    }
    if kb.was_pressed(KeyCode::Char('2')) || gp.just_pressed(Btn::North) {
        game.select_character(Character::Ember);
    }

    let enter = kb.was_pressed(KeyCode::Enter);
    let start_btn = gp.just_pressed(Btn::Start);
    if enter || start_btn {
        if !game.session.is_started() {
            game.start();
        } else if game.session.is_game_over() {
            game.replay();
        } else if start_btn {
            game.toggle_pause();
        }
    }

    if kb.any_pressed(&[KeyCode::Char('p'), KeyCode::Char('P')]) {
        game.toggle_pause();
    }
    if kb.any_pressed(&[KeyCode::Char('m'), KeyCode::Char('M')]) {
        game.toggle_mute();
    }
    if (kb.any_pressed(&[KeyCode::Char('c'), KeyCode::Char('C')]) || gp.just_pressed(Btn::East))
        && game.session.is_game_over()
    {
        game.change_character();
    }

    false
}
