/// The drawing surface the game loop renders into.
///
/// Coordinates are board units (see `domain::geometry`). The surface keeps
/// whatever was drawn until it is cleared or drawn over, like a canvas, so
/// a paused game keeps showing its last frame.

use crate::domain::actor::Character;
use crate::domain::geometry::Rect;

/// Number of selectable backgrounds.
pub const BACKGROUND_COUNT: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sprite {
    Background(usize),
    Character(Character),
    TopObstacle,
    BottomObstacle,
}

pub trait Surface {
    fn clear(&mut self);
    fn draw_image(&mut self, sprite: Sprite, rect: Rect);
    /// Draw `text` horizontally centred on `x`, vertically on `y`.
    fn draw_text_centered(&mut self, text: &str, x: f32, y: f32);
}

/// Test double that records every call.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub images: Vec<(Sprite, Rect)>,
    pub texts: Vec<String>,
    pub clears: usize,
}

#[cfg(test)]
impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.images.clear();
        self.texts.clear();
    }

    pub fn count(&self, sprite: Sprite) -> usize {
        self.images.iter().filter(|(s, _)| *s == sprite).count()
    }
}

#[cfg(test)]
impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.clears += 1;
    }

    fn draw_image(&mut self, sprite: Sprite, rect: Rect) {
        self.images.push((sprite, rect));
    }

    fn draw_text_centered(&mut self, text: &str, _x: f32, _y: f32) {
        self.texts.push(text.to_string());
    }
}
