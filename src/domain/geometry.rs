// Arena bounds and axis-aligned boxes shared by every entity.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Entity sizes scale off the shorter side so squares stay square.
    pub fn shorter_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// Axis-aligned bounding box in arena pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    // Strict inequalities: touching edges do not count as overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

pub trait Bounded {
    fn bounds(&self) -> Rect;

    fn overlaps<B: Bounded>(&self, other: &B) -> bool {
        self.bounds().overlaps(&other.bounds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_boxes_share_area_then_they_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn when_boxes_only_touch_edges_then_they_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
    }

    #[test]
    fn when_arena_is_wide_then_shorter_side_is_height() {
        assert_eq!(Arena::new(1600.0, 900.0).shorter_side(), 900.0);
    }
}
