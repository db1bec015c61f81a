use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Pixel dimensions of a frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    /// Size with width and height exchanged.
    pub fn transposed(&self) -> Self {
        Self::new(self.height, self.width)
    }
}

/// Axis-aligned integer rectangle.
///
/// `width` and `height` count pixels, so a rectangle covering a single pixel
/// has extent 1x1 and `br()` is exclusive.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BoundingRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rectangle containing every point. `None` for an empty slice.
    pub fn from_points(points: &[Point2<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    #[inline]
    pub fn tl(&self) -> Point2<i32> {
        Point2::new(self.x, self.y)
    }

    #[inline]
    pub fn br(&self) -> Point2<i32> {
        Point2::new(self.x + self.width, self.y + self.height)
    }

    /// Width times height, as a real number.
    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    /// Width over height. Infinite for a zero-height rectangle.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}
