//! Rectangle
//!
//! The clip-rectangle collaborator described in the top-level spec: an axis-aligned
//! region carrying `top, left, bottom, right`, with an `intersect` operation that may
//! yield an empty rect.

/// A rectangular area, in output-space coordinates.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Rect {
    /// The x coordinate of the top left corner of this rect.
    pub x: u16,
    /// The y coordinate of the top left corner of this rect.
    pub y: u16,
    /// The width of this rect.
    pub width: u16,
    /// The height of this rect.
    pub height: u16,
}

impl Rect {
    /// A zero-sized rect at position (0, 0).
    pub const ZERO: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    /// Create a new rect, with width and height limited to keep the area under max `u16`.
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        let max_area = u16::MAX;
        let (clipped_width, clipped_height) =
            if u32::from(width) * u32::from(height) > u32::from(max_area) {
                let aspect_ratio = f64::from(width) / f64::from(height);
                let max_area_f = f64::from(max_area);
                let height_f = (max_area_f / aspect_ratio).sqrt();
                let width_f = height_f * aspect_ratio;
                (width_f as u16, height_f as u16)
            } else {
                (width, height)
            };

        Self {
            x,
            y,
            width: clipped_width,
            height: clipped_height,
        }
    }

    /// The area of this rect.
    pub const fn area(self) -> u16 {
        self.width.saturating_mul(self.height)
    }

    /// Whether this rect has no area.
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Get the left coordinate of this rect.
    pub const fn left(self) -> u16 {
        self.x
    }

    /// Get the right coordinate of this rect. This is the first column outside the rect's area.
    pub const fn right(self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Get the top coordinate of this rect.
    pub const fn top(self) -> u16 {
        self.y
    }

    /// Get the bottom coordinate of this rect. This is the first row outside the rect's area.
    pub const fn bottom(self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Move this rect without modifying its size.
    ///
    /// Positive `dx`/`dy` moves right/down, negative left/up. Coordinates are clamped to
    /// `0..=u16::MAX` rather than wrapping.
    #[must_use = "method returns the modified value"]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: i32::from(self.x)
                .saturating_add(dx)
                .clamp(0, i32::from(u16::MAX - self.width)) as u16,
            y: i32::from(self.y)
                .saturating_add(dy)
                .clamp(0, i32::from(u16::MAX - self.height)) as u16,
            ..self
        }
    }

    /// Get a new rect that is the intersection of the current one and the given one.
    ///
    /// If the two rects do not intersect, the returned rect will have no area.
    #[must_use = "method returns the modified value"]
    pub fn intersection(self, other: Self) -> Self {
        let x1 = std::cmp::max(self.x, other.x);
        let y1 = std::cmp::max(self.y, other.y);
        let x2 = std::cmp::min(self.right(), other.right());
        let y2 = std::cmp::min(self.bottom(), other.bottom());
        Self {
            x: x1,
            y: y1,
            width: x2.saturating_sub(x1),
            height: y2.saturating_sub(y1),
        }
    }

    /// Alias for [`Rect::intersection`], matching the spec's naming for the clip collaborator.
    #[must_use = "method returns the modified value"]
    pub fn intersect(self, other: Self) -> Self {
        self.intersection(other)
    }

    /// Whether the given position is inside this rect.
    pub const fn contains(self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}
