//! Inverse mapping from cursor pixels to data coordinates.
//!
//! Axis ranges are stored the way the chart stores them: the image y-axis is
//! `[rows, 0]`, so pixel 0 at the top of the plot area maps to row 0.

use serde::Serialize;

/// An axis range as `[start, end]`, possibly reversed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    /// Value at the low end of the axis (left, or bottom).
    pub start: f64,
    /// Value at the high end of the axis (right, or top).
    pub end: f64,
}

impl AxisRange {
    /// Builds a range.
    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Signed extent `end - start`.
    #[must_use]
    pub fn span(self) -> f64 {
        self.end - self.start
    }

    /// Midpoint of the range.
    #[must_use]
    pub fn centre(self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// Grows or shrinks the range around its centre to `span` magnitude,
    /// preserving direction.
    #[must_use]
    pub fn with_span(self, span: f64) -> Self {
        let half = span.abs() / 2.0 * self.span().signum();
        let centre = self.centre();
        Self::new(centre - half, centre + half)
    }

    /// Shifts both ends by `delta`.
    #[must_use]
    pub fn shifted(self, delta: f64) -> Self {
        Self::new(self.start + delta, self.end + delta)
    }
}

/// Linear interpolation `a + (p / length) * (b - a)`.
#[must_use]
pub fn invert(a: f64, b: f64, pixel: f64, length: f64) -> f64 {
    a + (pixel / length) * (b - a)
}

/// Forward map of a data value to a pixel offset along `a -> b`.
#[must_use]
pub fn project(a: f64, b: f64, value: f64, length: f64) -> f64 {
    (value - a) / (b - a) * length
}

/// Margins around the plot area in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Margins {
    /// Left margin.
    pub left: f64,
    /// Right margin.
    pub right: f64,
    /// Top margin.
    pub top: f64,
    /// Bottom margin.
    pub bottom: f64,
}

impl Margins {
    /// Uniform margins.
    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self {
            left: value,
            right: value,
            top: value,
            bottom: value,
        }
    }

    /// Margins given as top, left, right, bottom.
    #[must_use]
    pub const fn tlrb(top: f64, left: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }
}

/// Resolved geometry of a 2-D plot: margins, plot-area size and the current
/// (possibly panned or zoomed) axis ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    /// Margins around the plot area.
    pub margins: Margins,
    /// Plot-area width in pixels.
    pub area_width: f64,
    /// Plot-area height in pixels.
    pub area_height: f64,
    /// Horizontal axis range, left to right.
    pub x_range: AxisRange,
    /// Vertical axis range, bottom to top.
    pub y_range: AxisRange,
}

impl ViewState {
    /// Data coordinate under a cursor given relative to the surface origin.
    ///
    /// Returns `None` when the cursor lies in the margins.
    #[must_use]
    pub fn data_at(&self, cursor_x: f64, cursor_y: f64) -> Option<(f64, f64)> {
        let x_pixel = cursor_x - self.margins.left;
        let y_pixel = cursor_y - self.margins.top;
        if !(0.0..=self.area_width).contains(&x_pixel) || !(0.0..=self.area_height).contains(&y_pixel)
        {
            return None;
        }
        let x = invert(self.x_range.start, self.x_range.end, x_pixel, self.area_width);
        // Pixel rows grow downwards, so the top of the area is `end`.
        let y = invert(self.y_range.end, self.y_range.start, y_pixel, self.area_height);
        Some((x, y))
    }

    /// Surface position of a data coordinate.
    #[must_use]
    pub fn pixel_of(&self, x: f64, y: f64) -> (f64, f64) {
        let px = project(self.x_range.start, self.x_range.end, x, self.area_width);
        let py = project(self.y_range.end, self.y_range.start, y, self.area_height);
        (px + self.margins.left, py + self.margins.top)
    }

    /// Integer `(row, col)` cell under the cursor for a `rows x cols` grid.
    #[must_use]
    pub fn cell_at(&self, cursor_x: f64, cursor_y: f64, rows: usize, cols: usize) -> Option<(usize, usize)> {
        let (x, y) = self.data_at(cursor_x, cursor_y)?;
        let col = floor_index(x, cols)?;
        let row = floor_index(y, rows)?;
        Some((row, col))
    }
}

/// Floors `value` and returns it when it indexes into `0..len`.
#[must_use]
pub fn floor_index(value: f64, len: usize) -> Option<usize> {
    let floored = value.floor();
    if !floored.is_finite() || floored < 0.0 {
        return None;
    }
    let index = floored as usize;
    (index < len).then_some(index)
}
