/// Board geometry: logical board size and axis-aligned rectangles.
///
/// Board coordinates are logical units, origin top-left, y grows downward.
/// The renderer maps them onto terminal cells; nothing in the simulation
/// knows about cells.

pub const BOARD_WIDTH: f32 = 360.0;
pub const BOARD_HEIGHT: f32 = 700.0;

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect { x, y, width, height }
    }

    /// The whole board.
    pub const fn board() -> Self {
        Rect::new(0.0, 0.0, BOARD_WIDTH, BOARD_HEIGHT)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Strict overlap on both axes. Rectangles that only share an edge do not
/// intersect.
#[inline]
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn overlapping_rects_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(intersects(&a, &b));
    }

    #[test]
    fn contained_rect_intersects() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 5.0, 5.0);
        assert!(intersects(&outer, &inner));
        assert!(intersects(&inner, &outer));
    }

    #[test]
    fn shared_vertical_edge_is_not_a_hit() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!intersects(&a, &b));
    }

    #[test]
    fn shared_horizontal_edge_is_not_a_hit() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(3.0, 10.0, 10.0, 10.0);
        assert!(!intersects(&a, &b));
    }

    #[test]
    fn overlap_on_one_axis_only_is_not_a_hit() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 50.0, 10.0, 10.0);
        assert!(!intersects(&a, &b));
    }

    fn rect() -> impl Strategy<Value = Rect> {
        (-500.0f32..500.0, -500.0f32..500.0, 0.0f32..300.0, 0.0f32..300.0)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn intersection_is_symmetric(a in rect(), b in rect()) {
            prop_assert_eq!(intersects(&a, &b), intersects(&b, &a));
        }

        #[test]
        fn touching_neighbours_never_intersect(a in rect(), w in 0.0f32..300.0, dy in -200.0f32..200.0) {
            let right = Rect::new(a.right(), a.y + dy, w, a.height);
            let below = Rect::new(a.x + dy, a.bottom(), a.width, w);
            prop_assert!(!intersects(&a, &right));
            prop_assert!(!intersects(&a, &below));
        }
    }
}
