//! Axis-aligned rectangles and overlap testing
//!
//! Canvas coordinates: top-left origin, y grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Top-left corner
    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Bottom-right corner
    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.right(), self.bottom())
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True if the boxes overlap on both axes.
    ///
    /// All four comparisons are strict: boxes that only share an edge or a
    /// corner do not collide.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Free-function form of [`Rect::intersects`]
#[inline]
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.intersects(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlapping_boxes_collide() {
        let a = Rect::new(0.0, 0.0, 60.0, 60.0);
        let b = Rect::new(30.0, 30.0, 40.0, 40.0);
        assert!(intersects(&a, &b));
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        let a = Rect::new(0.0, 0.0, 60.0, 60.0);
        // Shares the right edge
        let right = Rect::new(60.0, 10.0, 40.0, 40.0);
        // Shares the bottom edge
        let below = Rect::new(10.0, 60.0, 40.0, 40.0);
        // Shares only a corner
        let corner = Rect::new(60.0, 60.0, 10.0, 10.0);
        assert!(!a.intersects(&right));
        assert!(!a.intersects(&below));
        assert!(!a.intersects(&corner));
    }

    #[test]
    fn test_separated_on_one_axis() {
        let a = Rect::new(0.0, 0.0, 60.0, 60.0);
        // Overlaps horizontally, far below
        let b = Rect::new(10.0, 200.0, 40.0, 40.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_contained_box_collides() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 10.0, 10.0);
        assert!(outer.intersects(&inner));
        assert!(inner.intersects(&outer));
    }

    #[test]
    fn test_corners_and_center() {
        let r = Rect::new(10.0, 20.0, 40.0, 60.0);
        assert_eq!(r.min(), Vec2::new(10.0, 20.0));
        assert_eq!(r.max(), Vec2::new(50.0, 80.0));
        assert_eq!(r.center(), Vec2::new(30.0, 50.0));
    }

    fn rect_strategy() -> impl Strategy<Value = Rect> {
        (
            -1000.0f32..1000.0,
            -1000.0f32..1000.0,
            0.0f32..300.0,
            0.0f32..300.0,
        )
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_intersects_is_symmetric(a in rect_strategy(), b in rect_strategy()) {
            prop_assert_eq!(intersects(&a, &b), intersects(&b, &a));
        }

        #[test]
        fn prop_positive_rect_intersects_itself(
            x in -1000.0f32..1000.0,
            y in -1000.0f32..1000.0,
            w in 1.0f32..300.0,
            h in 1.0f32..300.0,
        ) {
            let r = Rect::new(x, y, w, h);
            prop_assert!(r.intersects(&r));
        }
    }
}
