//! Fixed-position value overlay shown next to the cursor.

use serde::Serialize;

/// Distance in pixels between the cursor and the tooltip's top-left corner.
pub const TOOLTIP_OFFSET: f64 = 15.0;

/// Overlay state. Created once per render session and reused.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tooltip {
    visible: bool,
    text: String,
    left: f64,
    top: f64,
}

impl Tooltip {
    /// Shows `text` offset from the cursor so it never covers the pointer.
    pub fn show_at(&mut self, cursor_x: f64, cursor_y: f64, text: String) {
        self.visible = true;
        self.text = text;
        self.left = cursor_x + TOOLTIP_OFFSET;
        self.top = cursor_y + TOOLTIP_OFFSET;
    }

    /// Hides the overlay. The last text is kept for inspection.
    pub const fn hide(&mut self) {
        self.visible = false;
    }

    /// Whether the overlay is displayed.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Text of the overlay when visible.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.visible.then_some(self.text.as_str())
    }

    /// Top-left corner as `(left, top)`.
    #[must_use]
    pub const fn position(&self) -> (f64, f64) {
        (self.left, self.top)
    }
}
