//! Percentage coordinate space for text regions.
//!
//! Element geometry is stored as percentages of the owning slide's bounds.
//! [`to_absolute`] is the only percentage-to-absolute conversion in the
//! workspace: the edit overlay, the compositor and the deck writer all go
//! through it so an exported slide lands exactly where it was edited.

use serde::{Deserialize, Serialize};

/// Smallest width or height, in percent, a resize may produce.
pub const MIN_EXTENT: f64 = 3.0;

/// Upper bound of the percentage space.
pub const FULL_EXTENT: f64 = 100.0;

/// Convert a percentage of `dimension` into absolute units.
///
/// `dimension` is pixels for raster output and EMU for deck output.
#[inline]
pub fn to_absolute(percent: f64, dimension: f64) -> f64 {
    percent / 100.0 * dimension
}

/// Convert an absolute distance within `dimension` back into a percentage.
///
/// Used for pointer deltas measured on the overlay. Returns 0 for a
/// degenerate dimension.
#[inline]
pub fn to_percent(absolute: f64, dimension: f64) -> f64 {
    if dimension <= 0.0 || !dimension.is_finite() {
        return 0.0;
    }
    absolute / dimension * 100.0
}

/// Clamp a value into [0, 100]. NaN becomes 0.
#[inline]
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, FULL_EXTENT)
    }
}

/// Position and size of an element, each in percent of the slide.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// A rectangle in absolute units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One of the four resize handles of a selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corner {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::Nw, Corner::Ne, Corner::Sw, Corner::Se];

    /// Whether dragging this handle moves the left edge.
    fn moves_left(self) -> bool {
        matches!(self, Corner::Nw | Corner::Sw)
    }

    /// Whether dragging this handle moves the top edge.
    fn moves_top(self) -> bool {
        matches!(self, Corner::Nw | Corner::Ne)
    }
}

impl Geometry {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Every field clamped into [0, 100].
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_percent(self.x),
            y: clamp_percent(self.y),
            w: clamp_percent(self.w),
            h: clamp_percent(self.h),
        }
    }

    /// Whether clamping would change any field.
    pub fn is_out_of_range(&self) -> bool {
        self.clamped() != *self
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Absolute rectangle inside a `width` x `height` target.
    pub fn to_absolute(&self, width: f64, height: f64) -> AbsoluteRect {
        AbsoluteRect {
            x: to_absolute(self.x, width),
            y: to_absolute(self.y, height),
            width: to_absolute(self.w, width),
            height: to_absolute(self.h, height),
        }
    }

    /// Whether a point, in percent, falls inside the element.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// Position of a corner handle, in percent.
    pub fn corner(&self, corner: Corner) -> (f64, f64) {
        let x = if corner.moves_left() { self.x } else { self.right() };
        let y = if corner.moves_top() { self.y } else { self.bottom() };
        (x, y)
    }

    /// Result of dragging this geometry by a pointer delta in percent.
    ///
    /// Only the origin is clamped; the far edges may leave the slide.
    pub fn dragged(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: clamp_percent(self.x + dx),
            y: clamp_percent(self.y + dy),
            w: self.w,
            h: self.h,
        }
    }

    /// Result of dragging `corner` by a pointer delta in percent.
    ///
    /// Width and height never drop below [`MIN_EXTENT`]. When the handle
    /// moves the left or top edge, the opposite edge keeps its position.
    pub fn resized(&self, corner: Corner, dx: f64, dy: f64) -> Self {
        let (x, w) = if corner.moves_left() {
            anchored_far_edge(self.x, self.w, -dx)
        } else {
            (self.x, clamp_extent(self.w + dx))
        };
        let (y, h) = if corner.moves_top() {
            anchored_far_edge(self.y, self.h, -dy)
        } else {
            (self.y, clamp_extent(self.h + dy))
        };
        Self { x, y, w, h }
    }
}

/// Clamp a width or height into [`MIN_EXTENT`, `FULL_EXTENT`]. NaN becomes
/// the minimum.
pub fn clamp_extent(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_EXTENT;
    }
    value.clamp(MIN_EXTENT, FULL_EXTENT)
}

/// Grow an extent by `grow` while keeping `start + size` fixed.
fn anchored_far_edge(start: f64, size: f64, grow: f64) -> (f64, f64) {
    let far = start + size;
    let size = clamp_extent(size + grow).min(far.max(MIN_EXTENT));
    (clamp_percent(far - size), size)
}
