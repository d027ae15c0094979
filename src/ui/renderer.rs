/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. The game draws into a persistent `Canvas` (board units scaled to cells)
///   2. Each render composes HUD + canvas + overlays into the `front` buffer
///   3. Compare each cell with `back` buffer (previous frame)
///   4. Only emit terminal commands for cells that changed, batched with `queue!`
///   5. Swap front/back
///
/// The canvas is only touched by the game, so a paused or frozen game keeps
/// showing its last frame while overlays come and go on top of it.

use std::io::{self, BufWriter, Write};
use std::ops::Range;

use crossterm::{
    cursor::{self, MoveTo},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::actor::Character;
use crate::domain::geometry::{Rect, BOARD_HEIGHT, BOARD_WIDTH};
use crate::sim::event::{Label, Overlay};
use crate::sim::game::Game;
use crate::sim::surface::{Sprite, Surface, BACKGROUND_COUNT};
use super::overlay::Overlays;

// ── Colors ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Rgb(u8, u8, u8);

impl Rgb {
    /// Linear blend, `t` in [0, 1].
    fn lerp(a: Rgb, b: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
        Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
    }

    fn color(self) -> Color {
        Color::Rgb { r: self.0, g: self.1, b: self.2 }
    }
}

/// Sky gradients, top to bottom, one per background index.
const BACKGROUNDS: [(Rgb, Rgb); BACKGROUND_COUNT] = [
    (Rgb(70, 180, 200), Rgb(190, 232, 245)),  // day
    (Rgb(250, 140, 80), Rgb(255, 220, 150)),  // sunset
    (Rgb(20, 24, 60), Rgb(70, 60, 120)),      // night
    (Rgb(120, 200, 160), Rgb(220, 245, 210)), // meadow
    (Rgb(60, 60, 70), Rgb(150, 150, 160)),    // storm
    (Rgb(200, 120, 200), Rgb(250, 210, 240)), // dusk
    (Rgb(10, 80, 120), Rgb(40, 160, 190)),    // sea
    (Rgb(210, 170, 90), Rgb(245, 225, 170)),  // desert
    (Rgb(30, 10, 40), Rgb(120, 30, 60)),      // ember
    (Rgb(200, 225, 255), Rgb(245, 250, 255)), // snow
];

const PIPE_DARK: Rgb = Rgb(74, 122, 26);
const PIPE_MID: Rgb = Rgb(100, 170, 40);
const PIPE_LIGHT: Rgb = Rgb(145, 215, 62);
const PIPE_CAP: Rgb = Rgb(60, 100, 20);

const SUNNY_BODY: Rgb = Rgb(245, 200, 66);
const EMBER_BODY: Rgb = Rgb(225, 75, 35);
const BEAK: Rgb = Rgb(240, 110, 50);

// ── Cell: the unit of every buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, used for
    /// both `Clear(ClearType::All)` and blank cells so the gap color between
    /// rows matches.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }

    fn solid(bg: Rgb) -> Self {
        Cell { ch: ' ', fg: Color::White, bg: bg.color() }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies one column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    #[cfg(test)]
    fn row_text(&self, y: usize) -> String {
        (0..self.width).map(|x| self.get(x, y).ch).collect()
    }
}

// ── Canvas: the board, scaled to terminal cells ──

/// Persistent drawing target for the game. Board coordinates map linearly
/// onto `cols × rows` cells; whatever is drawn stays until drawn over.
pub struct Canvas {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl Canvas {
    fn new(cols: usize, rows: usize) -> Self {
        Canvas { cols, rows, cells: vec![Cell::BLANK; cols * rows] }
    }

    fn resize(&mut self, cols: usize, rows: usize) {
        if self.cols != cols || self.rows != rows {
            *self = Canvas::new(cols, rows);
        }
    }

    fn get(&self, col: usize, row: usize) -> Cell {
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col]
        } else {
            Cell::BLANK
        }
    }

    fn set(&mut self, col: usize, row: usize, cell: Cell) {
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] = cell;
        }
    }

    /// Cells covered by `[start, start + len)` board units on an axis of
    /// `extent` units drawn over `cells` cells. Partially covered cells count.
    fn span(start: f32, len: f32, extent: f32, cells: usize) -> Range<usize> {
        let scale = cells as f32 / extent;
        let lo = (start * scale).floor().max(0.0) as usize;
        let hi = ((start + len) * scale).ceil().max(0.0) as usize;
        lo.min(cells)..hi.min(cells)
    }

    fn cols_of(&self, rect: &Rect) -> Range<usize> {
        Self::span(rect.x, rect.width, BOARD_WIDTH, self.cols)
    }

    fn rows_of(&self, rect: &Rect) -> Range<usize> {
        Self::span(rect.y, rect.height, BOARD_HEIGHT, self.rows)
    }

    /// Board y at the middle of canvas row `row`.
    pub fn board_y(&self, row: usize) -> f32 {
        (row as f32 + 0.5) * BOARD_HEIGHT / self.rows.max(1) as f32
    }

    fn draw_background(&mut self, index: usize, rect: &Rect) {
        let (top, bottom) = BACKGROUNDS[index % BACKGROUND_COUNT];
        let last = self.rows.saturating_sub(1).max(1) as f32;
        for row in self.rows_of(rect) {
            let cell = Cell::solid(Rgb::lerp(top, bottom, row as f32 / last));
            for col in self.cols_of(rect) {
                self.set(col, row, cell);
            }
        }
    }

    fn draw_character(&mut self, character: Character, rect: &Rect) {
        let body = match character {
            Character::Sunny => SUNNY_BODY,
            Character::Ember => EMBER_BODY,
        };
        let cols = self.cols_of(rect);
        let rows = self.rows_of(rect);
        if cols.is_empty() || rows.is_empty() { return; }

        for row in rows.clone() {
            for col in cols.clone() {
                self.set(col, row, Cell::solid(body));
            }
        }
        let eye_col = cols.end.saturating_sub(2).max(cols.start);
        self.set(eye_col, rows.start, Cell::new('●', Color::Black, body.color()));
        let beak_row = rows.start + rows.len() / 2;
        self.set(cols.end - 1, beak_row, Cell::new('▶', BEAK.color(), body.color()));
    }

    /// Pipe body shaded left to right, with a cap on the end facing the gap.
    fn draw_obstacle(&mut self, rect: &Rect, cap_at_bottom: bool) {
        let cols = self.cols_of(rect);
        let rows = self.rows_of(rect);
        if cols.is_empty() || rows.is_empty() { return; }

        let cap_row = if cap_at_bottom { rows.end - 1 } else { rows.start };
        let last_col = cols.end - 1;
        for row in rows {
            for col in cols.clone() {
                let shade = if row == cap_row {
                    PIPE_CAP
                } else if col == cols.start {
                    PIPE_DARK
                } else if col == last_col {
                    PIPE_LIGHT
                } else {
                    PIPE_MID
                };
                self.set(col, row, Cell::solid(shade));
            }
        }
    }
}

impl Surface for Canvas {
    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn draw_image(&mut self, sprite: Sprite, rect: Rect) {
        match sprite {
            Sprite::Background(i) => self.draw_background(i, &rect),
            Sprite::Character(c) => self.draw_character(c, &rect),
            Sprite::TopObstacle => self.draw_obstacle(&rect, true),
            Sprite::BottomObstacle => self.draw_obstacle(&rect, false),
        }
    }

    fn draw_text_centered(&mut self, text: &str, x: f32, y: f32) {
        if self.rows == 0 { return; }
        let row = ((y / BOARD_HEIGHT) * self.rows as f32) as usize;
        let center = ((x / BOARD_WIDTH) * self.cols as f32) as usize;
        let len = text.chars().count();
        let start = center.saturating_sub(len / 2);
        for (i, ch) in text.chars().enumerate() {
            let col = start + i;
            let bg = self.get(col, row).bg;
            self.set(col, row, Cell::new(ch, Color::White, bg));
        }
    }
}

// ── Renderer ──

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 1;
/// HUD on top, help line at the bottom.
const RESERVED_ROWS: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    canvas: Canvas,
    canvas_x: usize,
    term_w: usize,
    term_h: usize,
    /// Key release events are reported by the terminal.
    pub keyboard_enhanced: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            canvas: Canvas::new(0, 0),
            canvas_x: 0,
            term_w: 0,
            term_h: 0,
            keyboard_enhanced: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.keyboard_enhanced = true;
        }
        log::debug!("keyboard enhancement: {}", self.keyboard_enhanced);

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize_to(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// The drawing target handed to the game.
    pub fn surface(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Pick up a terminal resize. Returns true when the canvas was rebuilt
    /// and needs a repaint.
    pub fn sync_size(&mut self) -> io::Result<bool> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize == self.term_w && th as usize == self.term_h {
            return Ok(false);
        }
        self.resize_to(tw as usize, th as usize);
        queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        log::debug!("terminal resized to {tw}x{th}");
        Ok(true)
    }

    fn resize_to(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        let (cols, rows) = canvas_size(w, h);
        self.canvas.resize(cols, rows);
        self.canvas_x = w.saturating_sub(cols) / 2;
    }

    /// Board y under terminal row `row`, if the row is on the canvas.
    pub fn board_y_for_row(&self, row: u16) -> Option<f32> {
        let row = (row as usize).checked_sub(MAP_ROW)?;
        (row < self.canvas.rows).then(|| self.canvas.board_y(row))
    }

    pub fn render(&mut self, game: &Game, overlays: &Overlays, gamepad: bool) -> io::Result<()> {
        self.compose(game, overlays, gamepad);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;

        // Explicit base colors; ResetColor would fall back to the terminal default.
        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }
                if need_move {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
            }
            need_move = true;
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, game: &Game, overlays: &Overlays, gamepad: bool) {
        self.front.clear();

        for row in 0..self.canvas.rows {
            for col in 0..self.canvas.cols {
                self.front.set(self.canvas_x + col, MAP_ROW + row, self.canvas.get(col, row));
            }
        }

        self.compose_hud(game, overlays);

        if overlays.is_shown(Overlay::CharacterSelection) {
            self.compose_character_select(game, overlays);
        }
        if overlays.is_shown(Overlay::Popup) {
            let msg = overlays.label(Label::PopupMessage).to_string();
            self.compose_box(&[msg.as_str(), "", "get ready..."], Color::Rgb { r: 255, g: 220, b: 50 });
        }
        if overlays.is_shown(Overlay::GameOver) {
            self.compose_game_over(game, overlays);
        }
        if game.session.is_paused() {
            self.compose_box(&["PAUSED", "", "P  resume"], Color::Rgb { r: 100, g: 200, b: 255 });
        }

        self.compose_help(game, gamepad);
    }

    fn compose_hud(&mut self, game: &Game, overlays: &Overlays) {
        let bg = Color::Rgb { r: 30, g: 30, b: 50 };
        self.front.fill_row(HUD_ROW, bg);

        if overlays.is_shown(Overlay::ScoreLabel) {
            let hud = format!(
                " Score {:<5} Level {:<3}",
                overlays.label(Label::Score),
                game.session.level,
            );
            self.front.put_str(0, HUD_ROW, &hud, Color::Rgb { r: 255, g: 220, b: 50 }, bg);
        }

        let buttons = format!(
            "[{}] P  [{}] M ",
            overlays.label(Label::PauseButton),
            overlays.label(Label::MuteButton),
        );
        let x = self.front.width.saturating_sub(buttons.chars().count());
        self.front.put_str(x, HUD_ROW, &buttons, Color::White, bg);
    }

    fn compose_character_select(&mut self, game: &Game, overlays: &Overlays) {
        let mark = |c: Character| if game.character == Some(c) { ">" } else { " " };
        let sunny = format!("{} 1  {}", mark(Character::Sunny), Character::Sunny.name());
        let ember = format!("{} 2  {}", mark(Character::Ember), Character::Ember.name());
        let play = if overlays.is_shown(Overlay::PlayButton) { "ENTER  Play" } else { "" };
        self.compose_box(
            &["CHOOSE YOUR CHARACTER", "", sunny.as_str(), ember.as_str(), "", play],
            Color::Rgb { r: 80, g: 255, b: 80 },
        );
    }

    fn compose_game_over(&mut self, game: &Game, overlays: &Overlays) {
        let msg = overlays.label(Label::GameOverMessage).to_string();
        let score = format!("Score {}   Level {}", game.session.score, game.session.level);
        let replay = if overlays.is_shown(Overlay::ReplayButton) { "ENTER  Replay" } else { "" };
        let change = if overlays.is_shown(Overlay::ChangeCharacterButton) { "C  Change character" } else { "" };
        self.compose_box(
            &[msg.as_str(), "", score.as_str(), "", replay, change],
            Color::Rgb { r: 255, g: 60, b: 60 },
        );
    }

    /// Centered framed box over the canvas.
    fn compose_box(&mut self, lines: &[&str], accent: Color) {
        let dim = Color::Rgb { r: 40, g: 40, b: 40 };
        let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
        let box_w = (inner + 2).min(self.front.width);
        let box_h = lines.len() + 2;
        let x0 = self.front.width.saturating_sub(box_w) / 2;
        let y0 = MAP_ROW + self.canvas.rows.saturating_sub(box_h) / 2;

        let horiz: String = "─".repeat(box_w.saturating_sub(2));
        self.front.put_str(x0, y0, &format!("┌{horiz}┐"), accent, dim);
        for (i, line) in lines.iter().enumerate() {
            let y = y0 + 1 + i;
            self.front.put_str(x0, y, &format!("│{:width$}│", "", width = box_w.saturating_sub(2)), accent, dim);
            let len = line.chars().count();
            let x = x0 + box_w.saturating_sub(len) / 2;
            self.front.put_str(x, y, line, Color::White, dim);
        }
        self.front.put_str(x0, y0 + box_h - 1, &format!("└{horiz}┘"), accent, dim);
    }

    fn compose_help(&mut self, game: &Game, gamepad: bool) {
        let row = self.front.height.saturating_sub(1);
        if row <= HUD_ROW { return; }
        let help = if !game.session.is_started() {
            " 1/2 Character  ENTER Play  M Mute  Q Quit"
        } else if game.session.is_game_over() {
            " ENTER Replay  C Change character  M Mute  Q Quit"
        } else {
            " ↑↓/W S Move  Click Nudge  P Pause  M Mute"
        };
        self.front.put_str(0, row, help, Color::DarkGrey, Cell::BASE_BG);
        if gamepad {
            let tag = "[pad] ";
            let x = self.front.width.saturating_sub(tag.len());
            self.front.put_str(x, row, tag, Color::DarkGrey, Cell::BASE_BG);
        }
    }
}

/// Canvas size for a terminal: as tall as fits, keeping the board's aspect
/// ratio with cells twice as tall as wide.
fn canvas_size(term_w: usize, term_h: usize) -> (usize, usize) {
    let aspect = 2.0 * BOARD_WIDTH / BOARD_HEIGHT;
    let mut rows = term_h.saturating_sub(RESERVED_ROWS).max(1);
    let mut cols = (rows as f32 * aspect).round() as usize;
    if cols > term_w {
        cols = term_w;
        rows = ((cols as f32 / aspect).floor() as usize).max(1);
    }
    (cols.max(1), rows)
}
