//! Planar and spatial point clouds.

use varplot_protocol::{Points2dPayload, Points3dPayload};

use super::{Canvas, PRIMARY_COLOUR, marker_trace};
use crate::errors::RenderError;
use crate::figure::{AspectMode, Colour, DragMode, Figure, Layout, Marker, Scene, Trace};
use crate::mapper::Margins;

const COLOUR_SCALE: &str = "Viridis";
const CAMERA_EYE: [f64; 3] = [1.5, 1.5, 1.5];

pub(crate) fn render_points_2d(
    payload: &Points2dPayload,
    canvas: &mut Canvas<'_>,
) -> Result<String, RenderError> {
    let (x, y): (Vec<f64>, Vec<f64>) = payload.data.iter().map(|[x, y]| (*x, *y)).unzip();
    let count = x.len();
    let mut trace = marker_trace(
        x,
        y,
        None,
        Marker {
            size: 5.0,
            colour: Colour::Solid(String::from(PRIMARY_COLOUR)),
            opacity: 0.8,
        },
    );
    trace.high_throughput = count >= canvas.options.gl_threshold;

    canvas.surface.draw(Figure {
        traces: vec![Trace::Scatter(trace)],
        layout: Layout {
            margins: Margins::tlrb(30.0, 40.0, 20.0, 30.0),
            scale_anchor: true,
            drag_mode: DragMode::Pan,
            ..Layout::default()
        },
    })?;
    Ok(format!("Number of points: {count}"))
}

pub(crate) fn render_points_3d(
    payload: &Points3dPayload,
    canvas: &mut Canvas<'_>,
) -> Result<String, RenderError> {
    let count = payload.data.len();
    let mut x = Vec::with_capacity(count);
    let mut y = Vec::with_capacity(count);
    let mut z = Vec::with_capacity(count);
    for [px, py, pz] in &payload.data {
        x.push(*px);
        y.push(*py);
        z.push(*pz);
    }
    let colour = Colour::Scale {
        values: z.clone(),
        scale: String::from(COLOUR_SCALE),
    };
    let mut trace = marker_trace(
        x,
        y,
        Some(z),
        Marker {
            size: 3.0,
            colour,
            opacity: 0.8,
        },
    );
    trace.high_throughput = count >= canvas.options.gl_threshold;

    canvas.surface.draw(Figure {
        traces: vec![Trace::Scatter(trace)],
        layout: Layout {
            margins: Margins::tlrb(30.0, 0.0, 0.0, 0.0),
            scene: Some(Scene {
                camera_eye: CAMERA_EYE,
                aspect_mode: AspectMode::Data,
                show_ticks: true,
                show_grid: true,
            }),
            drag_mode: DragMode::Orbit,
            ..Layout::default()
        },
    })?;
    Ok(format!("Number of points: {count}"))
}
