/// Obstacles: top/bottom pairs that scroll left across the board.
///
/// The field is a FIFO: pairs are pushed at the right edge and, since every
/// obstacle scrolls at the same speed, the front of the queue is always the
/// leftmost. Recycling therefore only ever pops from the front.
///
/// Only the bottom member of a pair carries the scoring flag; one pair is
/// worth exactly one point.

use std::collections::VecDeque;
use std::ops::ControlFlow;

use super::geometry::{intersects, Rect, BOARD_HEIGHT, BOARD_WIDTH};

pub const OBSTACLE_WIDTH: f32 = 64.0;
pub const OBSTACLE_HEIGHT: f32 = 512.0;

/// Y of the board's top edge; top obstacles hang upward from above it.
const BASE_Y: f32 = 0.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Category {
    Top,
    Bottom,
}

#[derive(Clone, Debug)]
pub struct Obstacle {
    pub category: Category,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub passed: bool,
}

impl Obstacle {
    fn new(category: Category, x: f32, y: f32) -> Self {
        Obstacle {
            category,
            x,
            y,
            width: OBSTACLE_WIDTH,
            height: OBSTACLE_HEIGHT,
            passed: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Vertical gap between a pair. Grows by one unit per ten points and never
/// shrinks.
pub fn opening_space(score: u32) -> f32 {
    BOARD_HEIGHT / 4.0 + score as f32 / 10.0
}

/// Top obstacle y for a random sample `r` in [0, 1).
pub fn top_y_for(r: f32) -> f32 {
    BASE_Y - OBSTACLE_HEIGHT / 4.0 - r * (OBSTACLE_HEIGHT / 2.0)
}

/// How a sweep over the field ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sweep {
    /// Every obstacle advanced and no collision.
    Completed,
    /// The pass handler asked to stop (level threshold reached).
    Interrupted,
    /// The actor hit obstacle at this index; later obstacles were not advanced.
    Collided(usize),
}

#[derive(Clone, Debug, Default)]
pub struct ObstacleField {
    items: VecDeque<Obstacle>,
}

impl ObstacleField {
    pub fn new() -> Self {
        ObstacleField { items: VecDeque::with_capacity(16) }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Push a pair entering at `x`. Returns the bottom obstacle's y.
    pub fn push_pair(&mut self, x: f32, top_y: f32, opening: f32) -> f32 {
        let bottom_y = top_y + OBSTACLE_HEIGHT + opening;
        self.items.push_back(Obstacle::new(Category::Top, x, top_y));
        self.items.push_back(Obstacle::new(Category::Bottom, x, bottom_y));
        bottom_y
    }

    /// Spawn a pair at the right edge. `r` is a uniform sample in [0, 1).
    pub fn spawn(&mut self, r: f32, score: u32) {
        self.push_pair(BOARD_WIDTH, top_y_for(r), opening_space(score));
    }

    /// Advance obstacles front to back by `dx`, in order:
    ///   1. move, then hand the obstacle to `draw`
    ///   2. pass check (bottom, not yet passed, actor left edge beyond its right edge)
    ///   3. collision check
    ///
    /// `on_pass` runs once per newly passed obstacle; returning `Break` stops
    /// the sweep right there.
    pub fn sweep<D, P>(&mut self, dx: f32, actor: &Rect, mut draw: D, mut on_pass: P) -> Sweep
    where
        D: FnMut(&Obstacle),
        P: FnMut() -> ControlFlow<()>,
    {
        for (i, ob) in self.items.iter_mut().enumerate() {
            ob.x += dx;
            draw(ob);

            if !ob.passed && ob.category == Category::Bottom && actor.x > ob.right() {
                ob.passed = true;
                if on_pass().is_break() {
                    return Sweep::Interrupted;
                }
            }

            if intersects(actor, &ob.rect()) {
                return Sweep::Collided(i);
            }
        }
        Sweep::Completed
    }

    /// Drop obstacles from the front whose right edge is left of the board.
    /// Returns how many were removed.
    pub fn recycle(&mut self) -> usize {
        let mut removed = 0;
        while self.items.front().map_or(false, |ob| ob.right() < 0.0) {
            self.items.pop_front();
            removed += 1;
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // An actor far above any bottom obstacle, so only pass logic matters.
    fn actor_at(x: f32) -> Rect {
        Rect::new(x, 300.0, 54.0, 54.0)
    }

    fn sweep_quiet(field: &mut ObstacleField, dx: f32, actor: &Rect) -> (Sweep, u32) {
        let mut points = 0;
        let result = field.sweep(dx, actor, |_| {}, || {
            points += 1;
            ControlFlow::Continue(())
        });
        (result, points)
    }

    #[test]
    fn pair_keeps_gap_invariant() {
        let mut f = ObstacleField::new();
        f.spawn(0.5, 40);
        let v: Vec<_> = f.iter().collect();
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].category, Category::Top);
        assert_eq!(v[1].category, Category::Bottom);
        assert_eq!(v[1].y, v[0].y + OBSTACLE_HEIGHT + opening_space(40));
        assert_eq!(v[0].x, BOARD_WIDTH);
    }

    #[test]
    fn top_y_range() {
        assert_eq!(top_y_for(0.0), -128.0);
        assert_eq!(top_y_for(0.5), -256.0);
        assert!(top_y_for(0.999) > -384.0);
    }

    #[test]
    fn opening_grows_with_score() {
        assert_eq!(opening_space(0), 175.0);
        assert_eq!(opening_space(20), 177.0);
        assert!(opening_space(21) > opening_space(20));
    }

    #[test]
    fn bottom_scores_once() {
        let mut f = ObstacleField::new();
        // top far above, bottom far below the actor band
        f.push_pair(-30.0, -600.0, 1000.0);
        let actor = actor_at(45.0);

        let (r, pts) = sweep_quiet(&mut f, -2.0, &actor);
        assert_eq!(r, Sweep::Completed);
        assert_eq!(pts, 1);

        let (_, pts) = sweep_quiet(&mut f, -2.0, &actor);
        assert_eq!(pts, 0, "passed flag must be idempotent");
    }

    #[test]
    fn top_member_never_scores() {
        let mut f = ObstacleField::new();
        f.push_pair(-30.0, -600.0, 1000.0);
        let _ = sweep_quiet(&mut f, -2.0, &actor_at(45.0));
        let top = f.iter().next().unwrap();
        assert_eq!(top.category, Category::Top);
        assert!(!top.passed);
    }

    #[test]
    fn exact_edge_is_not_passed() {
        let mut f = ObstacleField::new();
        // bottom right edge lands exactly on the actor's x after the move
        f.push_pair(45.0 - OBSTACLE_WIDTH + 2.0, -600.0, 1000.0);
        let (_, pts) = sweep_quiet(&mut f, -2.0, &actor_at(45.0));
        assert_eq!(pts, 0);
    }

    #[test]
    fn break_stops_the_sweep() {
        let mut f = ObstacleField::new();
        f.push_pair(-30.0, -600.0, 1000.0);
        f.push_pair(200.0, -600.0, 1000.0);
        let mut drawn = 0;
        let r = f.sweep(-2.0, &actor_at(45.0), |_| drawn += 1, || ControlFlow::Break(()));
        assert_eq!(r, Sweep::Interrupted);
        assert_eq!(drawn, 2, "top and bottom of the first pair only");
        let xs: Vec<f32> = f.iter().map(|o| o.x).collect();
        assert_eq!(xs, vec![-32.0, -32.0, 200.0, 200.0]);
    }

    #[test]
    fn collision_reports_index() {
        let mut f = ObstacleField::new();
        // gap nowhere near the actor: bottom pipe covers y=300
        f.push_pair(60.0, -600.0, 300.0);
        let r = sweep_quiet(&mut f, -2.0, &actor_at(45.0)).0;
        assert_eq!(r, Sweep::Collided(1));
    }

    #[test]
    fn pass_counts_before_collision_check() {
        let mut f = ObstacleField::new();
        f.push_pair(-30.0, -600.0, 1000.0);
        f.push_pair(60.0, -600.0, 300.0);
        let (r, pts) = sweep_quiet(&mut f, -2.0, &actor_at(45.0));
        assert_eq!(pts, 1);
        assert_eq!(r, Sweep::Collided(3));
    }

    #[test]
    fn recycle_drains_only_offscreen_front() {
        let mut f = ObstacleField::new();
        f.push_pair(-OBSTACLE_WIDTH - 1.0, -200.0, 175.0);
        f.push_pair(-OBSTACLE_WIDTH, -200.0, 175.0);
        assert_eq!(f.recycle(), 2);
        assert_eq!(f.len(), 2);
        // right edge exactly at 0 stays
        assert_eq!(f.iter().next().unwrap().right(), 0.0);
    }

    proptest! {
        #[test]
        fn field_stays_ordered_and_recycles_exactly(
            samples in proptest::collection::vec(0.0f32..1.0, 1..12),
            gap_frames in 1usize..120,
            speed in 0.5f32..6.0,
        ) {
            let mut f = ObstacleField::new();
            let actor = Rect::new(-10_000.0, 0.0, 1.0, 1.0);
            for r in samples {
                f.spawn(r, 0);
                for _ in 0..gap_frames {
                    let _ = f.sweep(-speed, &actor, |_| {}, || ControlFlow::Continue(()));
                    let offscreen = f.iter().filter(|o| o.right() < 0.0).count();
                    let removed = f.recycle();
                    prop_assert_eq!(removed, offscreen);
                    let xs: Vec<f32> = f.iter().map(|o| o.x).collect();
                    prop_assert!(xs.windows(2).all(|w| w[0] <= w[1]));
                    prop_assert!(f.iter().all(|o| o.right() >= 0.0));
                }
            }
        }
    }
}
