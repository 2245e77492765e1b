//! Node-link diagrams in two or three dimensions.

use varplot_protocol::GraphPayload;
use varplot_protocol::edges::split_polylines;

use super::{Canvas, PRIMARY_COLOUR, marker_trace};
use crate::errors::RenderError;
use crate::figure::{
    AspectMode, Axis, Colour, DragMode, Figure, Layout, Marker, Scatter, ScatterMode, Scene, Trace,
};
use crate::mapper::Margins;

const EDGE_COLOUR: &str = "#586e75b5";
const CAMERA_EYE: [f64; 3] = [1.5, 1.5, 1.5];

pub(crate) fn render_graph(
    payload: &GraphPayload,
    spatial: bool,
    canvas: &mut Canvas<'_>,
) -> Result<String, RenderError> {
    let node_z = spatial.then_some(payload.node_z.as_slice());
    check_nodes(payload, node_z)?;
    let edge_z: &[f64] = if spatial { &payload.edge_z } else { &[] };
    split_polylines(&payload.edge_x, &payload.edge_y, edge_z)?;

    let edges = Scatter {
        x: payload.edge_x.clone(),
        y: payload.edge_y.clone(),
        z: spatial.then(|| payload.edge_z.clone()),
        mode: ScatterMode::Lines,
        high_throughput: false,
        marker: Marker {
            size: 1.0,
            colour: Colour::Solid(String::from(EDGE_COLOUR)),
            opacity: 1.0,
        },
        hover: false,
    };
    let nodes = marker_trace(
        payload.node_x.clone(),
        payload.node_y.clone(),
        node_z.map(<[f64]>::to_vec),
        Marker {
            size: if spatial { 4.0 } else { 6.0 },
            colour: Colour::Solid(String::from(PRIMARY_COLOUR)),
            opacity: 1.0,
        },
    );

    let base = Layout {
        margins: Margins::tlrb(40.0, 20.0, 20.0, 20.0),
        show_legend: false,
        ..Layout::default()
    };
    let layout = if spatial {
        Layout {
            scene: Some(Scene {
                camera_eye: CAMERA_EYE,
                aspect_mode: AspectMode::Data,
                show_ticks: false,
                show_grid: false,
            }),
            drag_mode: DragMode::Orbit,
            ..base
        }
    } else {
        Layout {
            x_axis: Axis::bare(),
            y_axis: Axis::bare(),
            scale_anchor: true,
            drag_mode: DragMode::Pan,
            ..base
        }
    };

    canvas.surface.draw(Figure {
        traces: vec![Trace::Scatter(edges), Trace::Scatter(nodes)],
        layout,
    })?;
    Ok(format!(
        "Graph: {} nodes, {} edges",
        payload.num_nodes, payload.num_edges
    ))
}

fn check_nodes(payload: &GraphPayload, node_z: Option<&[f64]>) -> Result<(), RenderError> {
    let expected = payload.node_x.len();
    let mismatch = |what: &'static str, actual: usize| {
        (actual != expected).then_some(RenderError::LengthMismatch {
            what,
            expected,
            actual,
        })
    };
    let failure = mismatch("nodeY", payload.node_y.len())
        .or_else(|| node_z.and_then(|z| mismatch("nodeZ", z.len())));
    failure.map_or(Ok(()), Err)
}
