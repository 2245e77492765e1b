//! The charting capability and its in-memory implementation.

use image::{Rgba, RgbaImage};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::errors::RenderError;
use crate::figure::{Figure, Trace};
use crate::mapper::{AxisRange, ViewState, invert};

const SURFACE_TARGET: &str = "varplot_render::surface";

/// Fraction of the data extent added on each side when autoranging.
const AUTORANGE_PADDING: f64 = 0.05;

/// Paper colour of the dark theme.
const BACKGROUND: Rgba<u8> = Rgba([0x1e, 0x1e, 0x1e, 0xff]);

/// A pan or zoom request applied to the current view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Relayout {
    /// Move the viewport by a pixel offset.
    Pan {
        /// Horizontal offset; positive moves right.
        dx: f64,
        /// Vertical offset; positive moves down.
        dy: f64,
    },
    /// Scale around a surface position; `factor > 1` zooms in.
    Zoom {
        /// Zoom factor.
        factor: f64,
        /// Anchor x relative to the surface origin.
        at_x: f64,
        /// Anchor y relative to the surface origin.
        at_y: f64,
    },
    /// Set explicit axis ranges.
    Ranges {
        /// New horizontal range.
        x: AxisRange,
        /// New vertical range.
        y: AxisRange,
    },
    /// Restore the view computed at draw time.
    Reset,
}

/// What a chart engine must offer the renderers.
pub trait ChartSurface: Send {
    /// Replaces the surface content with `figure`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] when the figure cannot be laid out.
    fn draw(&mut self, figure: Figure) -> Result<(), RenderError>;

    /// Discards chart state and shows `text` as preformatted content.
    fn show_text(&mut self, text: &str);

    /// Discards all chart state.
    fn purge(&mut self);

    /// Current 2-D geometry, after any pan or zoom. `None` when nothing 2-D
    /// is drawn.
    fn view(&self) -> Option<ViewState>;

    /// Applies a pan or zoom. Resets nearest-neighbour magnification, as a
    /// redraw does in a real chart engine.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] when there is nothing to relayout.
    fn relayout(&mut self, change: Relayout) -> Result<(), RenderError>;

    /// Selects nearest-neighbour (`true`) or smoothed raster magnification.
    fn set_pixelated(&mut self, pixelated: bool);

    /// Whether raster magnification is currently nearest-neighbour.
    fn is_pixelated(&self) -> bool;
}

#[derive(Debug, Clone, Default)]
enum Content {
    #[default]
    Empty,
    Chart {
        figure: Box<Figure>,
        initial: Option<ViewState>,
        current: Option<ViewState>,
    },
    Text(String),
}

/// In-memory [`ChartSurface`] that resolves layout the way an interactive
/// chart would and can rasterise the visible part of an image layer.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    content: Content,
    pixelated: bool,
}

impl HeadlessSurface {
    /// Creates an empty surface of `width x height` pixels.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            content: Content::Empty,
            pixelated: false,
        }
    }

    /// Surface size as `(width, height)`.
    #[must_use]
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The figure currently drawn, if any.
    #[must_use]
    pub fn figure(&self) -> Option<&Figure> {
        match &self.content {
            Content::Chart { figure, .. } => Some(figure),
            Content::Empty | Content::Text(_) => None,
        }
    }

    /// The preformatted text currently shown, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) => Some(text),
            Content::Empty | Content::Chart { .. } => None,
        }
    }

    /// Whether the surface shows nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.content, Content::Empty)
    }

    /// JSON description of what the surface shows.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        #[derive(Serialize)]
        struct Snapshot<'a> {
            width: u32,
            height: u32,
            pixelated: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            view: Option<ViewState>,
            #[serde(skip_serializing_if = "Option::is_none")]
            figure: Option<&'a Figure>,
            #[serde(skip_serializing_if = "Option::is_none")]
            text: Option<&'a str>,
        }

        let snapshot = Snapshot {
            width: self.width,
            height: self.height,
            pixelated: self.pixelated,
            view: self.view(),
            figure: self.figure(),
            text: self.text(),
        };
        serde_json::to_value(snapshot).unwrap_or_else(|error| json!({ "error": error.to_string() }))
    }

    /// Rasterises the visible part of the background image layer at plot-area
    /// resolution, honouring the current magnification mode.
    ///
    /// Returns `None` when no image layer is drawn.
    #[must_use]
    pub fn render_viewport(&self) -> Option<RgbaImage> {
        let figure = self.figure()?;
        let layer = figure.layout.background.as_ref()?;
        let view = self.view()?;
        let (cols, rows) = layer.pixels.dimensions();
        if cols == 0 || rows == 0 {
            return None;
        }

        let out_width = to_pixels(view.area_width);
        let out_height = to_pixels(view.area_height);
        let mut out = RgbaImage::from_pixel(out_width, out_height, BACKGROUND);
        for (px, py, pixel) in out.enumerate_pixels_mut() {
            let x = invert(
                view.x_range.start,
                view.x_range.end,
                f64::from(px) + 0.5,
                view.area_width,
            );
            let y = invert(
                view.y_range.end,
                view.y_range.start,
                f64::from(py) + 0.5,
                view.area_height,
            );
            let u = (x - layer.x) / layer.size_x * f64::from(cols);
            let v = (y - layer.y) / layer.size_y * f64::from(rows);
            let sample = if self.pixelated {
                sample_nearest(&layer.pixels, u, v)
            } else {
                sample_bilinear(&layer.pixels, u, v)
            };
            if let Some(sample) = sample {
                *pixel = sample;
            }
        }
        Some(out)
    }

    fn resolve_view(&self, figure: &Figure) -> Option<ViewState> {
        if figure.is_spatial() {
            return None;
        }
        let margins = figure.layout.margins;
        let area_width = (f64::from(self.width) - margins.left - margins.right).max(1.0);
        let area_height = (f64::from(self.height) - margins.top - margins.bottom).max(1.0);

        let x_range = figure
            .layout
            .x_axis
            .range
            .unwrap_or_else(|| autorange(horizontal_extent(figure)));
        let y_range = figure
            .layout
            .y_axis
            .range
            .unwrap_or_else(|| autorange(vertical_extent(figure)));

        let mut view = ViewState {
            margins,
            area_width,
            area_height,
            x_range,
            y_range,
        };
        if figure.layout.scale_anchor {
            anchor_scales(&mut view);
        }
        Some(view)
    }
}

fn to_pixels(length: f64) -> u32 {
    let rounded = length.round();
    if rounded < 1.0 {
        1
    } else if rounded > f64::from(u32::MAX) {
        u32::MAX
    } else {
        rounded as u32
    }
}

fn sample_nearest(pixels: &RgbaImage, u: f64, v: f64) -> Option<Rgba<u8>> {
    let col = crate::mapper::floor_index(u, pixels.width() as usize)?;
    let row = crate::mapper::floor_index(v, pixels.height() as usize)?;
    pixels
        .get_pixel_checked(u32::try_from(col).ok()?, u32::try_from(row).ok()?)
        .copied()
}

fn sample_bilinear(pixels: &RgbaImage, u: f64, v: f64) -> Option<Rgba<u8>> {
    let (width, height) = (f64::from(pixels.width()), f64::from(pixels.height()));
    if !(0.0..width).contains(&u) || !(0.0..height).contains(&v) {
        return None;
    }
    let fu = (u - 0.5).clamp(0.0, width - 1.0);
    let fv = (v - 0.5).clamp(0.0, height - 1.0);
    let (c0, r0) = (fu.floor(), fv.floor());
    let (c1, r1) = ((c0 + 1.0).min(width - 1.0), (r0 + 1.0).min(height - 1.0));
    let (tu, tv) = (fu - c0, fv - r0);
    let at = |c: f64, r: f64| pixels.get_pixel(c as u32, r as u32).0;
    let (p00, p10, p01, p11) = (at(c0, r0), at(c1, r0), at(c0, r1), at(c1, r1));
    let mut blended = [0u8; 4];
    for (channel, value) in blended.iter_mut().enumerate() {
        let top = f64::from(p00[channel]) * (1.0 - tu) + f64::from(p10[channel]) * tu;
        let bottom = f64::from(p01[channel]) * (1.0 - tu) + f64::from(p11[channel]) * tu;
        *value = (top * (1.0 - tv) + bottom * tv).round().clamp(0.0, 255.0) as u8;
    }
    Some(Rgba(blended))
}

fn extend(extent: &mut Option<(f64, f64)>, value: f64) {
    if !value.is_finite() {
        return;
    }
    *extent = Some(extent.map_or((value, value), |(low, high)| {
        (low.min(value), high.max(value))
    }));
}

fn horizontal_extent(figure: &Figure) -> Option<(f64, f64)> {
    let mut extent = None;
    for trace in &figure.traces {
        match trace {
            Trace::Scatter(scatter) => scatter.x.iter().for_each(|x| extend(&mut extent, *x)),
            Trace::Histogram { bins, .. } => {
                for bin in bins {
                    extend(&mut extent, bin.start);
                    extend(&mut extent, bin.end);
                }
            }
        }
    }
    if let Some(layer) = &figure.layout.background {
        extend(&mut extent, layer.x);
        extend(&mut extent, layer.x + layer.size_x);
    }
    extent
}

fn vertical_extent(figure: &Figure) -> Option<(f64, f64)> {
    let mut extent = None;
    for trace in &figure.traces {
        match trace {
            Trace::Scatter(scatter) => scatter.y.iter().for_each(|y| extend(&mut extent, *y)),
            Trace::Histogram { bins, .. } => {
                extend(&mut extent, 0.0);
                for bin in bins {
                    extend(&mut extent, bin.count as f64);
                }
            }
        }
    }
    if let Some(layer) = &figure.layout.background {
        extend(&mut extent, layer.y);
        extend(&mut extent, layer.y + layer.size_y);
    }
    extent
}

fn autorange(extent: Option<(f64, f64)>) -> AxisRange {
    match extent {
        None => AxisRange::new(-1.0, 1.0),
        Some((low, high)) if (high - low).abs() < f64::EPSILON => {
            AxisRange::new(low - 1.0, high + 1.0)
        }
        Some((low, high)) => {
            let pad = (high - low) * AUTORANGE_PADDING;
            AxisRange::new(low - pad, high + pad)
        }
    }
}

/// Widens whichever axis has fewer data units per pixel so both match.
fn anchor_scales(view: &mut ViewState) {
    let x_units = view.x_range.span().abs() / view.area_width;
    let y_units = view.y_range.span().abs() / view.area_height;
    if x_units < y_units {
        view.x_range = view.x_range.with_span(y_units * view.area_width);
    } else if y_units < x_units {
        view.y_range = view.y_range.with_span(x_units * view.area_height);
    }
}

impl ChartSurface for HeadlessSurface {
    fn draw(&mut self, figure: Figure) -> Result<(), RenderError> {
        let view = self.resolve_view(&figure);
        debug!(
            target: SURFACE_TARGET,
            traces = figure.traces.len(),
            spatial = figure.is_spatial(),
            "drawing figure"
        );
        self.content = Content::Chart {
            figure: Box::new(figure),
            initial: view,
            current: view,
        };
        Ok(())
    }

    fn show_text(&mut self, text: &str) {
        self.purge();
        self.content = Content::Text(text.to_owned());
    }

    fn purge(&mut self) {
        self.content = Content::Empty;
        self.pixelated = false;
    }

    fn view(&self) -> Option<ViewState> {
        match &self.content {
            Content::Chart { current, .. } => *current,
            Content::Empty | Content::Text(_) => None,
        }
    }

    fn relayout(&mut self, change: Relayout) -> Result<(), RenderError> {
        let Content::Chart {
            initial,
            current: Some(view),
            ..
        } = &mut self.content
        else {
            return Err(RenderError::Surface {
                message: String::from("no 2-D plot to relayout"),
            });
        };

        match change {
            Relayout::Pan { dx, dy } => {
                let x_step = view.x_range.span() / view.area_width;
                let y_step = (view.y_range.start - view.y_range.end) / view.area_height;
                view.x_range = view.x_range.shifted(dx * x_step);
                view.y_range = view.y_range.shifted(dy * y_step);
            }
            Relayout::Zoom { factor, at_x, at_y } if factor > 0.0 && factor.is_finite() => {
                let (anchor_x, anchor_y) = view.data_at(at_x, at_y).unwrap_or((
                    view.x_range.centre(),
                    view.y_range.centre(),
                ));
                let scale = |value: f64, anchor: f64| anchor + (value - anchor) / factor;
                view.x_range = AxisRange::new(
                    scale(view.x_range.start, anchor_x),
                    scale(view.x_range.end, anchor_x),
                );
                view.y_range = AxisRange::new(
                    scale(view.y_range.start, anchor_y),
                    scale(view.y_range.end, anchor_y),
                );
            }
            Relayout::Zoom { factor, .. } => {
                return Err(RenderError::Surface {
                    message: format!("invalid zoom factor {factor}"),
                });
            }
            Relayout::Ranges { x, y } => {
                view.x_range = x;
                view.y_range = y;
            }
            Relayout::Reset => {
                if let Some(initial) = initial {
                    *view = *initial;
                }
            }
        }
        self.pixelated = false;
        Ok(())
    }

    fn set_pixelated(&mut self, pixelated: bool) {
        self.pixelated = pixelated;
    }

    fn is_pixelated(&self) -> bool {
        self.pixelated
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::figure::{Axis, Colour, Layout, Marker, RasterLayer, Scatter, ScatterMode};
    use crate::mapper::Margins;

    fn points(x: Vec<f64>, y: Vec<f64>) -> Figure {
        Figure {
            traces: vec![Trace::Scatter(Scatter {
                x,
                y,
                z: None,
                mode: ScatterMode::Markers,
                high_throughput: false,
                marker: Marker {
                    size: 5.0,
                    colour: Colour::Solid(String::from("#1f77b4")),
                    opacity: 0.8,
                },
                hover: true,
            })],
            layout: Layout {
                margins: Margins::tlrb(30.0, 40.0, 20.0, 30.0),
                ..Layout::default()
            },
        }
    }

    fn checker(cols: u32, rows: u32) -> Figure {
        let pixels = RgbaImage::from_fn(cols, rows, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        Figure {
            traces: Vec::new(),
            layout: Layout {
                x_axis: Axis::hidden(AxisRange::new(0.0, f64::from(cols))),
                y_axis: Axis::hidden(AxisRange::new(f64::from(rows), 0.0)),
                scale_anchor: true,
                background: Some(RasterLayer {
                    pixels,
                    x: 0.0,
                    y: 0.0,
                    size_x: f64::from(cols),
                    size_y: f64::from(rows),
                }),
                hover: false,
                ..Layout::default()
            },
        }
    }

    #[rstest]
    fn autorange_pads_data_extent() {
        let mut surface = HeadlessSurface::new(800, 600);
        surface
            .draw(points(vec![0.0, 10.0], vec![0.0, 20.0]))
            .expect("draw");

        let view = surface.view().expect("view");
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        assert!(close(view.x_range.start, -0.5) && close(view.x_range.end, 10.5));
        assert!(close(view.y_range.start, -1.0) && close(view.y_range.end, 21.0));
        assert!(close(view.area_width, 740.0) && close(view.area_height, 540.0));
    }

    #[rstest]
    fn scale_anchor_makes_pixels_square() {
        let mut surface = HeadlessSurface::new(800, 600);
        surface.draw(checker(2, 2)).expect("draw");

        let view = surface.view().expect("view");
        let x_units = view.x_range.span().abs() / view.area_width;
        let y_units = view.y_range.span().abs() / view.area_height;
        assert!((x_units - y_units).abs() < 1e-12);
        assert_eq!(view.y_range, AxisRange::new(2.0, 0.0));
        assert!(view.x_range.start < 0.0 && view.x_range.end > 2.0);
    }

    #[rstest]
    fn zoom_keeps_anchor_fixed() {
        let mut surface = HeadlessSurface::new(400, 400);
        surface.draw(checker(4, 4)).expect("draw");
        let before = surface.view().expect("view");
        let anchor = before.data_at(100.0, 300.0).expect("inside");

        surface
            .relayout(Relayout::Zoom {
                factor: 2.0,
                at_x: 100.0,
                at_y: 300.0,
            })
            .expect("zoom");

        let after = surface.view().expect("view");
        let moved = after.data_at(100.0, 300.0).expect("inside");
        assert!((moved.0 - anchor.0).abs() < 1e-9);
        assert!((moved.1 - anchor.1).abs() < 1e-9);
        assert!((after.x_range.span() - before.x_range.span() / 2.0).abs() < 1e-9);
    }

    #[rstest]
    fn relayout_resets_magnification_and_reset_restores_view() {
        let mut surface = HeadlessSurface::new(400, 400);
        surface.draw(checker(4, 4)).expect("draw");
        let initial = surface.view();
        surface.set_pixelated(true);

        surface
            .relayout(Relayout::Pan { dx: 50.0, dy: -20.0 })
            .expect("pan");
        assert!(!surface.is_pixelated());
        assert_ne!(surface.view(), initial);

        surface.relayout(Relayout::Reset).expect("reset");
        assert_eq!(surface.view(), initial);
    }

    #[rstest]
    fn pixelated_viewport_has_hard_edges() {
        let mut surface = HeadlessSurface::new(400, 400);
        surface.draw(checker(4, 4)).expect("draw");
        surface.set_pixelated(true);

        let viewport = surface.render_viewport().expect("viewport");

        assert_eq!(viewport.dimensions(), (400, 400));
        let colours: std::collections::BTreeSet<[u8; 4]> =
            viewport.pixels().map(|pixel| pixel.0).collect();
        assert_eq!(colours.len(), 2);
        assert_eq!(viewport.get_pixel(10, 10).0, [255, 255, 255, 255]);
        assert_eq!(viewport.get_pixel(110, 10).0, [0, 0, 0, 255]);
    }

    #[rstest]
    fn smoothed_viewport_blends_neighbours() {
        let mut surface = HeadlessSurface::new(400, 400);
        surface.draw(checker(4, 4)).expect("draw");

        let viewport = surface.render_viewport().expect("viewport");

        let colours: std::collections::BTreeSet<[u8; 4]> =
            viewport.pixels().map(|pixel| pixel.0).collect();
        assert!(colours.len() > 2);
    }

    #[rstest]
    fn text_replaces_chart_and_has_no_view() {
        let mut surface = HeadlessSurface::new(400, 400);
        surface.draw(checker(2, 2)).expect("draw");

        surface.show_text("array([1, 2, 3])");

        assert!(surface.figure().is_none());
        assert_eq!(surface.text(), Some("array([1, 2, 3])"));
        assert_eq!(surface.view(), None);
        assert!(surface.relayout(Relayout::Reset).is_err());
        assert_eq!(surface.snapshot()["text"], "array([1, 2, 3])");
    }
}
