//! Raster image with a per-pixel value tooltip.

use varplot_protocol::ImagePayload;

use super::Canvas;
use crate::errors::RenderError;
use crate::figure::{Axis, DragMode, Figure, Layout, RasterLayer};
use crate::format::compact;
use crate::mapper::{AxisRange, Margins};
use crate::raster::DecodedImage;
use crate::subscription::{EventKind, SurfaceEvent};
use crate::surface::ChartSurface;
use crate::tooltip::Tooltip;

pub(crate) fn render_image(payload: &ImagePayload, canvas: &mut Canvas<'_>) -> Result<String, RenderError> {
    let decoded = DecodedImage::decode(payload)?;
    let shape = decoded.shape();
    let (rows, cols) = (shape.rows(), shape.cols());
    let (width, height) = (cols as f64, rows as f64);

    let figure = Figure {
        traces: Vec::new(),
        layout: Layout {
            margins: Margins::uniform(0.0),
            x_axis: Axis::hidden(AxisRange::new(0.0, width)),
            y_axis: Axis::hidden(AxisRange::new(height, 0.0)),
            scale_anchor: true,
            background: Some(RasterLayer {
                pixels: decoded.to_rgba(),
                x: 0.0,
                y: 0.0,
                size_x: width,
                size_y: height,
            }),
            drag_mode: DragMode::Pan,
            hover: false,
            ..Layout::default()
        },
    };
    canvas.surface.draw(figure)?;
    canvas.surface.set_pixelated(true);

    canvas.subscriptions.subscribe(
        EventKind::PointerMove,
        move |event: &SurfaceEvent, surface: &mut dyn ChartSurface, tooltip: &mut Tooltip| {
            let SurfaceEvent::PointerMove { x, y } = *event else {
                return;
            };
            let text = surface
                .view()
                .and_then(|view| view.cell_at(x, y, rows, cols))
                .and_then(|(row, col)| decoded.tooltip_text(row, col));
            match text {
                Some(text) => tooltip.show_at(x, y, text),
                None => tooltip.hide(),
            }
        },
    );
    canvas.subscriptions.subscribe(
        EventKind::PointerLeave,
        |_: &SurfaceEvent, _: &mut dyn ChartSurface, tooltip: &mut Tooltip| tooltip.hide(),
    );
    // Redraws reset magnification to smoothed.
    canvas.subscriptions.subscribe(
        EventKind::Relayout,
        |_: &SurfaceEvent, surface: &mut dyn ChartSurface, _: &mut Tooltip| {
            surface.set_pixelated(true);
        },
    );

    Ok(format!(
        "Image: {} [{}x{}x{}], min: {}, max: {}",
        payload.dtype,
        cols,
        rows,
        shape.channels(),
        compact(payload.orig_min),
        compact(payload.orig_max),
    ))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use varplot_protocol::codec::encode_bytes;
    use varplot_protocol::{ImageShape, Payload};

    use super::*;
    use crate::renderers::RenderOptions;
    use crate::router::RenderRouter;
    use crate::session::RenderSession;
    use crate::surface::{HeadlessSurface, Relayout};

    fn rendered_image() -> RenderRouter<HeadlessSurface> {
        let mut router = RenderRouter::new(
            RenderSession::new(|| HeadlessSurface::new(300, 300)),
            RenderOptions::default(),
        );
        router.route(Payload::Image(ImagePayload {
            shape: ImageShape::grayscale(3, 3),
            dtype: String::from("uint8"),
            visual_bytes: encode_bytes(&[0, 10, 20, 30, 40, 50, 60, 70, 80]),
            real_bytes: None,
            orig_min: 0.0,
            orig_max: 255.0,
        }));
        router.on_paint_tick();
        router
    }

    #[rstest]
    fn nearest_neighbour_survives_pan_and_zoom() {
        let mut router = rendered_image();
        assert!(router.session().surface().is_pixelated());

        router
            .session_mut()
            .relayout(Relayout::Pan { dx: 30.0, dy: 0.0 })
            .expect("pan");
        assert!(router.session().surface().is_pixelated());

        router
            .session_mut()
            .relayout(Relayout::Zoom {
                factor: 2.0,
                at_x: 150.0,
                at_y: 150.0,
            })
            .expect("zoom");
        assert!(router.session().surface().is_pixelated());
    }

    #[rstest]
    fn tooltip_hides_in_margins_and_off_image() {
        let mut router = rendered_image();

        router.session_mut().pointer_move(250.0, 250.0);
        let tooltip = router.session().tooltip().expect("tooltip");
        assert_eq!(tooltip.text(), Some("x: 2 y: 2\nVal: 80.000"));
        assert_eq!(tooltip.position(), (265.0, 265.0));

        router.session_mut().pointer_move(-5.0, 10.0);
        assert!(!router.session().tooltip().expect("tooltip").is_visible());
    }

    #[rstest]
    fn rerender_disposes_previous_handlers() {
        let mut router = rendered_image();
        assert_eq!(router.session().subscription_count(), 3);

        router.route(Payload::error("ignored"));
        assert_eq!(router.session().subscription_count(), 3);

        router.route(Payload::Object(varplot_protocol::ObjectPayload {
            data: String::from("x"),
        }));
        assert_eq!(router.session().subscription_count(), 0);
    }
}
