//! Geometric primitives for page segmentation.
//!
//! Boxes are expressed in page pixel coordinates with the origin at the
//! top-left corner. The right and bottom edges are exclusive, so a box's
//! width is `x2 - x1`.

use serde::{Deserialize, Serialize};

/// A 2D point in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use question_extractor::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned pixel rectangle `[x1, x2) x [y1, y2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x1: u32,
    /// Top edge
    pub y1: u32,
    /// Right edge (exclusive)
    pub x2: u32,
    /// Bottom edge (exclusive)
    pub y2: u32,
}

impl Rect {
    /// Create a rectangle from its corner coordinates.
    ///
    /// # Examples
    ///
    /// ```
    /// use question_extractor::geometry::Rect;
    ///
    /// let rect = Rect::new(10, 20, 110, 70);
    /// assert_eq!(rect.width(), 100);
    /// assert_eq!(rect.height(), 50);
    /// ```
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a rectangle from a top-left corner and dimensions.
    pub fn from_xywh(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    /// Centroid of the rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use question_extractor::geometry::Rect;
    ///
    /// let center = Rect::new(0, 0, 100, 50).center();
    /// assert_eq!(center.x, 50.0);
    /// assert_eq!(center.y, 25.0);
    /// ```
    pub fn center(&self) -> Point {
        Point {
            x: (self.x1 as f32 + self.x2 as f32) / 2.0,
            y: (self.y1 as f32 + self.y2 as f32) / 2.0,
        }
    }

    /// Smallest rectangle containing both rectangles.
    ///
    /// # Examples
    ///
    /// ```
    /// use question_extractor::geometry::Rect;
    ///
    /// let union = Rect::new(0, 0, 50, 50).union(&Rect::new(25, 25, 75, 75));
    /// assert_eq!(union, Rect::new(0, 0, 75, 75));
    /// ```
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        self.x1 <= other.x1 && self.y1 <= other.y1 && self.x2 >= other.x2 && self.y2 >= other.y2
    }

    /// Separating-axis proximity test.
    ///
    /// Two rectangles are near when the horizontal gap between them is at
    /// most `h_gap` and the vertical gap is at most `v_gap`. Overlapping
    /// rectangles are always near.
    ///
    /// # Examples
    ///
    /// ```
    /// use question_extractor::geometry::Rect;
    ///
    /// let a = Rect::new(50, 50, 200, 100);
    /// let b = Rect::new(210, 55, 360, 105);
    /// assert!(a.is_near(&b, 150, 45));
    /// assert!(!a.is_near(&b, 5, 45));
    /// ```
    pub fn is_near(&self, other: &Rect, h_gap: u32, v_gap: u32) -> bool {
        let (h, v) = (i64::from(h_gap), i64::from(v_gap));
        i64::from(self.x2) + h >= i64::from(other.x1)
            && i64::from(self.x1) - h <= i64::from(other.x2)
            && i64::from(self.y2) + v >= i64::from(other.y1)
            && i64::from(self.y1) - v <= i64::from(other.y2)
    }

    /// Grow the rectangle by `margin` on every side, clamped to
    /// `[0, width] x [0, height]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use question_extractor::geometry::Rect;
    ///
    /// let padded = Rect::new(5, 40, 90, 95).expand_clamped(10, 100, 100);
    /// assert_eq!(padded, Rect::new(0, 30, 100, 100));
    /// ```
    pub fn expand_clamped(&self, margin: u32, width: u32, height: u32) -> Rect {
        Rect {
            x1: self.x1.saturating_sub(margin).min(width),
            y1: self.y1.saturating_sub(margin).min(height),
            x2: self.x2.saturating_add(margin).min(width),
            y2: self.y2.saturating_add(margin).min(height),
        }
    }

    /// Corner coordinates as `[x1, y1, x2, y2]`.
    pub fn to_array(&self) -> [u32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}
