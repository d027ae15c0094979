/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to defaults if the file is missing or incomplete, and clamps
/// values that would break the game loop. Problems are collected in
/// `warnings` so they can be logged once logging is up.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub rules: RulesConfig,
    pub muted: bool,
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub frame_rate_hz: u32,
    pub spawn_interval_ms: u64,
    pub level_up_delay_ms: u64,
}

#[derive(Clone, Debug)]
pub struct RulesConfig {
    pub scroll_speed: f32,       // board units per frame, negative = leftward
    pub speed_increment: f32,    // added to the scroll magnitude per level
    pub points_per_level: u32,
    pub level_cap: u32,
    pub endless_mode: bool,
    pub level_complete_message: String,
    pub game_over_message: String,
}

impl TimingConfig {
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate_hz.max(1) as f64)
    }

    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    pub fn level_up_delay(&self) -> Duration {
        Duration::from_millis(self.level_up_delay_ms)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    audio: TomlAudio,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_frame_rate")]
    frame_rate_hz: u32,
    #[serde(default = "default_spawn_interval")]
    spawn_interval_ms: u64,
    #[serde(default = "default_level_up_delay")]
    level_up_delay_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_scroll_speed")]
    scroll_speed: f32,
    #[serde(default = "default_speed_increment")]
    speed_increment: f32,
    #[serde(default = "default_points_per_level")]
    points_per_level: u32,
    #[serde(default = "default_level_cap")]
    level_cap: u32,
    #[serde(default)]
    endless_mode: bool,
    #[serde(default = "default_level_complete_message")]
    level_complete_message: String,
    #[serde(default = "default_game_over_message")]
    game_over_message: String,
}

#[derive(Deserialize, Debug, Default)]
struct TomlAudio {
    #[serde(default)]
    muted: bool,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    log_file: Option<String>,
}

// ── Defaults ──

fn default_frame_rate() -> u32 { 60 }
fn default_spawn_interval() -> u64 { 1500 }
fn default_level_up_delay() -> u64 { 2000 }
fn default_scroll_speed() -> f32 { -2.0 }
fn default_speed_increment() -> f32 { 0.5 }
fn default_points_per_level() -> u32 { 20 }
fn default_level_cap() -> u32 { 5 }
fn default_level_complete_message() -> String { "LEVEL COMPLETE".into() }
fn default_game_over_message() -> String { "GAME OVER".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            frame_rate_hz: default_frame_rate(),
            spawn_interval_ms: default_spawn_interval(),
            level_up_delay_ms: default_level_up_delay(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            scroll_speed: default_scroll_speed(),
            speed_increment: default_speed_increment(),
            points_per_level: default_points_per_level(),
            level_cap: default_level_cap(),
            endless_mode: false,
            level_complete_message: default_level_complete_message(),
            game_over_message: default_game_over_message(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) ~/.local/share/gapwing. Missing file or keys fall back to defaults.
    pub fn load() -> Self {
        let mut warnings = vec![];
        let toml_cfg = load_toml(&candidate_dirs(), &mut warnings);
        let mut cfg = GameConfig::from_toml(toml_cfg);
        warnings.append(&mut cfg.warnings);
        cfg.warnings = warnings;

        if let Ok(path) = std::env::var("GAPWING_LOG") {
            if !path.is_empty() {
                cfg.log_file = Some(PathBuf::from(path));
            }
        }
        cfg
    }

    /// Parse config text directly. Parse errors fall back to defaults.
    pub fn parse(text: &str) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(t) => GameConfig::from_toml(t),
            Err(e) => {
                let mut cfg = GameConfig::default();
                cfg.warnings.push(format!("config.toml parse error: {e}; using defaults"));
                cfg
            }
        }
    }

    fn from_toml(t: TomlConfig) -> Self {
        let mut warnings = vec![];
        let mut clamp_warn = |key: &str, from: String, to: String| {
            warnings.push(format!("{key} = {from} is out of range, using {to}"));
        };

        let mut timing = TimingConfig {
            frame_rate_hz: t.timing.frame_rate_hz,
            spawn_interval_ms: t.timing.spawn_interval_ms,
            level_up_delay_ms: t.timing.level_up_delay_ms,
        };
        if timing.frame_rate_hz == 0 || timing.frame_rate_hz > 240 {
            let fixed = timing.frame_rate_hz.clamp(1, 240);
            clamp_warn("timing.frame_rate_hz", timing.frame_rate_hz.to_string(), fixed.to_string());
            timing.frame_rate_hz = fixed;
        }
        if timing.spawn_interval_ms == 0 {
            clamp_warn("timing.spawn_interval_ms", "0".into(), default_spawn_interval().to_string());
            timing.spawn_interval_ms = default_spawn_interval();
        }

        let mut rules = RulesConfig {
            scroll_speed: t.rules.scroll_speed,
            speed_increment: t.rules.speed_increment,
            points_per_level: t.rules.points_per_level,
            level_cap: t.rules.level_cap,
            endless_mode: t.rules.endless_mode,
            level_complete_message: t.rules.level_complete_message,
            game_over_message: t.rules.game_over_message,
        };
        if !(rules.scroll_speed < 0.0) {
            let fixed = if rules.scroll_speed > 0.0 { -rules.scroll_speed } else { default_scroll_speed() };
            clamp_warn("rules.scroll_speed", rules.scroll_speed.to_string(), fixed.to_string());
            rules.scroll_speed = fixed;
        }
        if !(rules.speed_increment >= 0.0) {
            clamp_warn("rules.speed_increment", rules.speed_increment.to_string(), "0".into());
            rules.speed_increment = 0.0;
        }
        if rules.points_per_level == 0 {
            clamp_warn("rules.points_per_level", "0".into(), "1".into());
            rules.points_per_level = 1;
        }
        if rules.level_cap == 0 {
            clamp_warn("rules.level_cap", "0".into(), "1".into());
            rules.level_cap = 1;
        }

        GameConfig {
            timing,
            rules,
            muted: t.audio.muted,
            seed: t.general.seed,
            log_file: t.general.log_file.filter(|s| !s.is_empty()).map(PathBuf::from),
            warnings,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/gapwing");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warnings.push(format!("{}: parse error: {e}; using defaults", path.display()));
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warnings.push(format!("could not read {}: {e}", path.display()));
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = GameConfig::parse("");
        assert_eq!(cfg.timing.frame_rate_hz, 60);
        assert_eq!(cfg.timing.spawn_interval_ms, 1500);
        assert_eq!(cfg.timing.level_up_delay_ms, 2000);
        assert_eq!(cfg.rules.scroll_speed, -2.0);
        assert_eq!(cfg.rules.speed_increment, 0.5);
        assert_eq!(cfg.rules.points_per_level, 20);
        assert_eq!(cfg.rules.level_cap, 5);
        assert!(!cfg.rules.endless_mode);
        assert!(!cfg.muted);
        assert!(cfg.seed.is_none());
        assert!(cfg.warnings.is_empty());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::parse(
            "[rules]\nendless_mode = true\n\n[general]\nseed = 7\n",
        );
        assert!(cfg.rules.endless_mode);
        assert_eq!(cfg.rules.level_cap, 5);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.timing.frame_rate_hz, 60);
    }

    #[test]
    fn bad_values_are_clamped_with_warnings() {
        let cfg = GameConfig::parse(
            "[timing]\nframe_rate_hz = 0\nspawn_interval_ms = 0\n[rules]\nscroll_speed = 3.0\npoints_per_level = 0\n",
        );
        assert_eq!(cfg.timing.frame_rate_hz, 1);
        assert_eq!(cfg.timing.spawn_interval_ms, 1500);
        assert_eq!(cfg.rules.scroll_speed, -3.0);
        assert_eq!(cfg.rules.points_per_level, 1);
        assert_eq!(cfg.warnings.len(), 4);
    }

    #[test]
    fn malformed_toml_falls_back() {
        let cfg = GameConfig::parse("[timing\nframe_rate_hz = ");
        assert_eq!(cfg.timing.frame_rate_hz, 60);
        assert_eq!(cfg.warnings.len(), 1);
    }

    #[test]
    fn frame_period_matches_rate() {
        let cfg = GameConfig::default();
        let p = cfg.timing.frame_period();
        assert!(p > Duration::from_millis(16) && p < Duration::from_millis(17));
    }
}
