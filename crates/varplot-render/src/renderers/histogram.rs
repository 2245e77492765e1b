//! Frequency histogram of a one-dimensional array.

use varplot_protocol::ArrayPayload;

use super::{Canvas, PRIMARY_COLOUR};
use crate::errors::RenderError;
use crate::figure::{DragMode, Figure, Layout, Trace};
use crate::histogram::bin_values;
use crate::mapper::Margins;

pub(crate) fn render_array(payload: &ArrayPayload, canvas: &mut Canvas<'_>) -> Result<String, RenderError> {
    canvas.surface.draw(Figure {
        traces: vec![Trace::Histogram {
            bins: bin_values(&payload.data),
            colour: String::from(PRIMARY_COLOUR),
        }],
        layout: Layout {
            margins: Margins::tlrb(40.0, 40.0, 20.0, 30.0),
            drag_mode: DragMode::Zoom,
            ..Layout::default()
        },
    })?;
    Ok(format!("Number of values: {}", payload.data.len()))
}
