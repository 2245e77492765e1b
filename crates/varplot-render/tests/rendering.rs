//! Behaviour tests for routing payloads through the renderers.

use std::cell::RefCell;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use varplot_protocol::{
    ArrayPayload, DEFAULT_ORIG_MAX, DEFAULT_ORIG_MIN, ImagePayload, ImageShape, Payload,
    Points2dPayload,
};
use varplot_render::figure::Trace;
use varplot_render::{ChartSurface, HeadlessSurface, RenderOptions, RenderRouter, RenderSession};

struct RenderWorld {
    router: RenderRouter<HeadlessSurface>,
    payload: Option<Payload>,
}

impl RenderWorld {
    fn new() -> Self {
        Self {
            router: RenderRouter::new(
                RenderSession::new(|| HeadlessSurface::new(400, 300)),
                RenderOptions::default(),
            ),
            payload: None,
        }
    }

    fn surface(&self) -> &HeadlessSurface {
        self.router.session().surface()
    }
}

#[fixture]
fn world() -> RefCell<RenderWorld> {
    RefCell::new(RenderWorld::new())
}

fn parse_list(text: &str) -> Vec<f64> {
    text.split(',')
        .map(|item| match item.trim().parse::<f64>() {
            Ok(value) => value,
            Err(error) => panic!("invalid number '{item}': {error}"),
        })
        .collect()
}

fn parse_points(text: &str) -> Vec<[f64; 2]> {
    text.split(';')
        .map(|pair| {
            let coords: Vec<f64> = pair
                .split_whitespace()
                .map(|item| match item.parse::<f64>() {
                    Ok(value) => value,
                    Err(error) => panic!("invalid coordinate '{item}': {error}"),
                })
                .collect();
            match coords.as_slice() {
                [x, y] => [*x, *y],
                _ => panic!("expected two coordinates in '{pair}'"),
            }
        })
        .collect()
}

#[given("a \"{dtype}\" image payload of {rows} rows and {cols} columns with bytes \"{bytes}\"")]
fn given_image(world: &RefCell<RenderWorld>, dtype: String, rows: usize, cols: usize, bytes: String) {
    let samples: Vec<u8> = bytes
        .split(',')
        .map(|item| match item.trim().parse::<u8>() {
            Ok(value) => value,
            Err(error) => panic!("invalid byte '{item}': {error}"),
        })
        .collect();
    world.borrow_mut().payload = Some(Payload::Image(ImagePayload {
        shape: ImageShape::grayscale(rows, cols),
        dtype,
        visual_bytes: STANDARD.encode(samples),
        real_bytes: None,
        orig_min: DEFAULT_ORIG_MIN,
        orig_max: DEFAULT_ORIG_MAX,
    }));
}

#[given("a points2d payload with points \"{points}\"")]
fn given_points(world: &RefCell<RenderWorld>, points: String) {
    world.borrow_mut().payload = Some(Payload::Points2d(Points2dPayload {
        data: parse_points(&points),
    }));
}

#[given("an array1d payload with values \"{values}\"")]
fn given_array(world: &RefCell<RenderWorld>, values: String) {
    world.borrow_mut().payload = Some(Payload::Array1d(ArrayPayload {
        data: parse_list(&values),
    }));
}

#[given("an error payload \"{message}\"")]
fn given_error(world: &RefCell<RenderWorld>, message: String) {
    world.borrow_mut().payload = Some(Payload::error(message));
}

#[when("the payload is rendered")]
fn when_rendered(world: &RefCell<RenderWorld>) {
    let mut state = world.borrow_mut();
    let Some(payload) = state.payload.take() else {
        panic!("no payload prepared");
    };
    state.router.route(payload);
    state.router.on_paint_tick();
}

#[when("the pointer hovers row {row} column {col}")]
fn when_pointer_hovers(world: &RefCell<RenderWorld>, row: u32, col: u32) {
    let mut state = world.borrow_mut();
    let Some(view) = state.surface().view() else {
        panic!("no 2-D view to hover over");
    };
    let (x, y) = view.pixel_of(f64::from(col) + 0.5, f64::from(row) + 0.5);
    state.router.session_mut().pointer_move(x, y);
}

#[when("the pointer leaves the plot")]
fn when_pointer_leaves(world: &RefCell<RenderWorld>) {
    world.borrow_mut().router.session_mut().pointer_leave();
}

#[then("the tooltip reports \"{value}\"")]
fn then_tooltip_reports(world: &RefCell<RenderWorld>, value: String) {
    let state = world.borrow();
    let text = state
        .router
        .session()
        .tooltip()
        .and_then(|tooltip| tooltip.text())
        .map(str::to_owned);
    let Some(text) = text else {
        panic!("tooltip is hidden");
    };
    assert!(
        text.ends_with(&format!("Val: {value}")),
        "unexpected tooltip text {text:?}"
    );
}

#[then("no tooltip is shown")]
fn then_no_tooltip(world: &RefCell<RenderWorld>) {
    let state = world.borrow();
    let visible = state
        .router
        .session()
        .tooltip()
        .is_some_and(varplot_render::Tooltip::is_visible);
    assert!(!visible);
}

#[then("the status reads \"{status}\"")]
fn then_status_reads(world: &RefCell<RenderWorld>, status: String) {
    assert_eq!(world.borrow().router.session().status(), status);
}

#[then("markers are plotted at \"{points}\"")]
fn then_markers_plotted(world: &RefCell<RenderWorld>, points: String) {
    let state = world.borrow();
    let Some(figure) = state.surface().figure() else {
        panic!("nothing drawn");
    };
    let Some(Trace::Scatter(trace)) = figure.traces.first() else {
        panic!("expected a scatter trace");
    };
    let plotted: Vec<[f64; 2]> = trace
        .x
        .iter()
        .zip(&trace.y)
        .map(|(x, y)| [*x, *y])
        .collect();
    assert_eq!(plotted, parse_points(&points));
}

#[then("the histogram has a bin at {value} with height {count}")]
fn then_histogram_bin(world: &RefCell<RenderWorld>, value: f64, count: usize) {
    let state = world.borrow();
    let Some(figure) = state.surface().figure() else {
        panic!("nothing drawn");
    };
    let Some(Trace::Histogram { bins, .. }) = figure.traces.first() else {
        panic!("expected a histogram trace");
    };
    let Some(bin) = bins
        .iter()
        .find(|bin| value >= bin.start && value < bin.end)
    else {
        panic!("no bin contains {value}");
    };
    assert_eq!(bin.count, count);
}

#[then("no plot is drawn")]
fn then_no_plot(world: &RefCell<RenderWorld>) {
    let state = world.borrow();
    assert!(state.surface().figure().is_none());
    assert!(state.surface().is_empty());
}

#[scenario(path = "tests/features/rendering.feature")]
fn rendering_payloads(#[from(world)] world: RefCell<RenderWorld>) {
    drop(world);
}
