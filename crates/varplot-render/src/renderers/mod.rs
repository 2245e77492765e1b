//! One renderer per payload kind.
//!
//! Each renderer draws onto a freshly created target, registers whatever
//! interaction handlers it needs and returns the status line to show.

mod graph;
mod histogram;
mod image_plot;
mod object;
mod points;

pub(crate) use graph::render_graph;
pub(crate) use histogram::render_array;
pub(crate) use image_plot::render_image;
pub(crate) use object::render_object;
pub(crate) use points::{render_points_2d, render_points_3d};
use varplot_config::{Config, DEFAULT_POINT_GL_THRESHOLD};

use crate::figure::{Marker, Scatter};
use crate::subscription::SubscriptionRegistry;
use crate::surface::ChartSurface;

/// Colour shared by markers and histogram bars.
pub(crate) const PRIMARY_COLOUR: &str = "#1f77b4";

/// Tunables for the type renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Point count at which scatter traces switch to the high-throughput path.
    pub gl_threshold: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            gl_threshold: DEFAULT_POINT_GL_THRESHOLD,
        }
    }
}

impl RenderOptions {
    /// Reads renderer tunables from the loaded configuration.
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self {
            gl_threshold: config.point_gl_threshold,
        }
    }
}

/// What a renderer draws onto: the fresh surface and its subscriptions.
pub(crate) struct Canvas<'a> {
    pub(crate) surface: &'a mut dyn ChartSurface,
    pub(crate) subscriptions: &'a mut SubscriptionRegistry,
    pub(crate) options: RenderOptions,
}

/// Marker trace over parallel coordinate buffers.
pub(crate) fn marker_trace(x: Vec<f64>, y: Vec<f64>, z: Option<Vec<f64>>, marker: Marker) -> Scatter {
    Scatter {
        x,
        y,
        z,
        mode: crate::figure::ScatterMode::Markers,
        high_throughput: false,
        marker,
        hover: true,
    }
}
