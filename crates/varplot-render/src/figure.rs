//! Declarative figure description handed to a [`crate::ChartSurface`].
//!
//! The model covers what the type renderers need: scatter and line traces in
//! two or three dimensions, histograms, a raster background layer and a small
//! layout vocabulary. It serialises to the JSON snapshot written by the CLI.

use image::RgbaImage;
use serde::Serialize;

use crate::mapper::{AxisRange, Margins};

/// How a scatter trace is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScatterMode {
    /// Markers only.
    Markers,
    /// Connected polyline; non-finite coordinates break the line.
    Lines,
}

/// Marker or line colour.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Colour {
    /// One colour for every element.
    Solid(String),
    /// Colour scale keyed to per-element values.
    Scale {
        /// Values mapped through the scale.
        values: Vec<f64>,
        /// Scale name.
        scale: String,
    },
}

/// Marker styling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// Marker diameter in pixels.
    pub size: f64,
    /// Fill colour.
    pub colour: Colour,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

/// A scatter or line trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter {
    /// Horizontal coordinates.
    pub x: Vec<f64>,
    /// Vertical coordinates.
    pub y: Vec<f64>,
    /// Depth coordinates; `None` for planar traces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<Vec<f64>>,
    /// Drawing mode.
    pub mode: ScatterMode,
    /// Use the high-throughput (GPU) code path.
    pub high_throughput: bool,
    /// Marker styling (also the line colour for line traces).
    pub marker: Marker,
    /// Whether hovering shows the default hover label.
    pub hover: bool,
}

impl Scatter {
    /// Number of coordinates in the trace.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the trace has no coordinates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// One histogram bin `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    /// Inclusive lower edge.
    pub start: f64,
    /// Exclusive upper edge (inclusive for the last bin).
    pub end: f64,
    /// Number of values in the bin.
    pub count: usize,
}

impl Bin {
    /// Centre of the bin.
    #[must_use]
    pub fn centre(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// A drawable trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trace {
    /// Markers or polylines.
    Scatter(Scatter),
    /// Frequency histogram.
    Histogram {
        /// Bins in ascending order.
        bins: Vec<Bin>,
        /// Bar colour.
        colour: String,
    },
}

/// A raster shown beneath the traces, stretched over a data rectangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterLayer {
    /// Pixels, `cols x rows`.
    #[serde(skip)]
    pub pixels: RgbaImage,
    /// Data x of the left edge.
    pub x: f64,
    /// Data y of the top edge.
    pub y: f64,
    /// Data width covered.
    pub size_x: f64,
    /// Data height covered.
    pub size_y: f64,
}

/// One axis of a 2-D plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    /// Fixed range; `None` autoranges from the data.
    pub range: Option<AxisRange>,
    /// Whether ticks and tick labels are drawn.
    pub show_ticks: bool,
    /// Whether grid lines are drawn.
    pub show_grid: bool,
    /// Whether the axis is drawn at all.
    pub visible: bool,
}

impl Default for Axis {
    fn default() -> Self {
        Self {
            range: None,
            show_ticks: true,
            show_grid: true,
            visible: true,
        }
    }
}

impl Axis {
    /// A hidden axis with a fixed range.
    #[must_use]
    pub fn hidden(range: AxisRange) -> Self {
        Self {
            range: Some(range),
            show_ticks: false,
            show_grid: false,
            visible: false,
        }
    }

    /// A visible axis without ticks or grid lines.
    #[must_use]
    pub fn bare() -> Self {
        Self {
            show_ticks: false,
            show_grid: false,
            ..Self::default()
        }
    }
}

/// Aspect handling of a 3-D scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectMode {
    /// Axis lengths proportional to the data extents.
    Data,
    /// Cube regardless of data.
    Cube,
}

/// 3-D scene settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    /// Camera eye position.
    pub camera_eye: [f64; 3],
    /// Aspect handling.
    pub aspect_mode: AspectMode,
    /// Whether tick labels are drawn on the three axes.
    pub show_ticks: bool,
    /// Whether grid lines are drawn on the three axes.
    pub show_grid: bool,
}

/// Pointer interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragMode {
    /// Dragging pans the view.
    Pan,
    /// Dragging zooms into a box.
    Zoom,
    /// Dragging orbits a 3-D camera.
    Orbit,
}

/// Figure layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    /// Figure title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Margins around the plot area.
    pub margins: Margins,
    /// Horizontal axis (2-D only).
    pub x_axis: Axis,
    /// Vertical axis (2-D only).
    pub y_axis: Axis,
    /// Lock one x unit to one y unit on screen.
    pub scale_anchor: bool,
    /// 3-D scene; present for spatial figures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<Scene>,
    /// Raster background layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<RasterLayer>,
    /// Pointer drag behaviour.
    pub drag_mode: DragMode,
    /// Whether the built-in hover label is enabled.
    pub hover: bool,
    /// Whether a legend is drawn.
    pub show_legend: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            title: None,
            margins: Margins::default(),
            x_axis: Axis::default(),
            y_axis: Axis::default(),
            scale_anchor: false,
            scene: None,
            background: None,
            drag_mode: DragMode::Pan,
            hover: true,
            show_legend: false,
        }
    }
}

/// Traces plus layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Figure {
    /// Traces in drawing order.
    pub traces: Vec<Trace>,
    /// Layout.
    pub layout: Layout,
}

impl Figure {
    /// Whether the figure is a 3-D scene.
    #[must_use]
    pub const fn is_spatial(&self) -> bool {
        self.layout.scene.is_some()
    }
}
