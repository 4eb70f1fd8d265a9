/// Screen-space rectangle in window-local pixels.
///
/// Width and height are never negative; constructors clamp them to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect {
            x,
            y,
            width: if width < 0 { 0 } else { width },
            height: if height < 0 { 0 } else { height },
        }
    }

    /// Half-open membership test: the right and bottom edges are outside.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Right edge, saturating at `i32::MAX`.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x.saturating_add(dx), self.y.saturating_add(dy), self.width, self.height)
    }

    /// Overlapping region of two rectangles, or `None` when they are disjoint.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 <= x1 || y2 <= y1 {
            None
        } else {
            Some(Rect::new(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1)))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    pub const fn new(x: f64, y: f64) -> Self {
        PointF { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let r = Rect::new(10, 10, 20, 5);
        assert!(r.contains(10, 10));
        assert!(r.contains(29, 14));
        assert!(!r.contains(30, 10));
        assert!(!r.contains(10, 15));
        assert!(!r.contains(9, 12));
    }

    #[test]
    fn test_negative_size_is_clamped() {
        let r = Rect::new(0, 0, -5, -1);
        assert_eq!(r.width, 0);
        assert_eq!(r.height, 0);
        assert!(r.is_empty());
    }

    #[test]
    fn test_intersect() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(90, -10, 50, 30);
        assert_eq!(a.intersect(&b), Some(Rect::new(90, 0, 10, 20)));
        assert_eq!(a.intersect(&Rect::new(200, 200, 5, 5)), None);
    }

    #[test]
    fn test_edges_saturate_near_i32_limits() {
        let r = Rect::new(i32::MAX - 5, i32::MAX - 2, 100, 10);
        assert_eq!(r.right(), i32::MAX);
        assert_eq!(r.bottom(), i32::MAX);
        assert!(r.contains(i32::MAX - 1, i32::MAX - 1));
        assert_eq!(r.intersect(&Rect::new(0, 0, 200, 100)), None);

        let wide = Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(wide.right(), -1);
        assert_eq!(wide.intersect(&Rect::new(-10, -10, 5, 5)), Some(Rect::new(-10, -10, 5, 5)));
        assert_eq!(wide.intersect(&Rect::new(0, 0, 5, 5)), None);
        assert_eq!(Rect::new(i32::MIN, 0, i32::MAX, 10).offset(-1, 0).x, i32::MIN);
    }
}
