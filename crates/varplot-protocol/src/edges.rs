//! Sentinel-break encoding for graph edges.
//!
//! All edges of a graph are drawn as one polyline series. Consecutive edges
//! are separated by a non-finite sentinel in every coordinate sequence, so a
//! graph with `N` edges yields `3 * N` entries per axis: start, end, break.

use thiserror::Error;

/// Value written between consecutive edges.
pub const EDGE_BREAK: f64 = f64::NAN;

/// Whether a coordinate is a sentinel break.
#[must_use]
pub const fn is_break(value: f64) -> bool {
    !value.is_finite()
}

/// A point in two or three dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// Depth coordinate for spatial graphs.
    pub z: Option<f64>,
}

impl Vertex {
    /// Builds a planar vertex.
    #[must_use]
    pub const fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// Builds a spatial vertex.
    #[must_use]
    pub const fn spatial(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }
}

/// Errors raised when flattened edge sequences are inconsistent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EdgeError {
    /// The per-axis sequences have different lengths.
    #[error("edge coordinate sequences differ in length: x={x}, y={y}, z={z:?}")]
    LengthMismatch {
        /// Length of the x sequence.
        x: usize,
        /// Length of the y sequence.
        y: usize,
        /// Length of the z sequence, when present.
        z: Option<usize>,
    },

    /// Breaks do not line up across axes at the given index.
    #[error("sentinel break at index {index} is not present on every axis")]
    MisalignedBreak {
        /// Index of the offending entry.
        index: usize,
    },
}

/// Flattened per-axis edge sequences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeSeries {
    /// X coordinates with breaks.
    pub x: Vec<f64>,
    /// Y coordinates with breaks.
    pub y: Vec<f64>,
    /// Z coordinates with breaks; empty for planar graphs.
    pub z: Vec<f64>,
}

impl EdgeSeries {
    /// Appends one straight edge followed by a break.
    pub fn push_edge(&mut self, from: Vertex, to: Vertex) {
        self.x.extend([from.x, to.x, EDGE_BREAK]);
        self.y.extend([from.y, to.y, EDGE_BREAK]);
        if let (Some(z0), Some(z1)) = (from.z, to.z) {
            self.z.extend([z0, z1, EDGE_BREAK]);
        }
    }

    /// Number of sentinel breaks in the x sequence.
    #[must_use]
    pub fn break_count(&self) -> usize {
        count_breaks(&self.x)
    }
}

/// Counts sentinel breaks in one coordinate sequence.
#[must_use]
pub fn count_breaks(values: &[f64]) -> usize {
    values.iter().filter(|value| is_break(**value)).count()
}

/// Splits flattened sequences back into polylines, one per edge.
///
/// Pass an empty `z` slice for planar graphs. Empty runs between adjacent
/// breaks are skipped; a trailing run without a closing break still forms a
/// polyline.
///
/// # Errors
///
/// Returns [`EdgeError`] when axis lengths differ or a break appears on some
/// axes but not others.
pub fn split_polylines(x: &[f64], y: &[f64], z: &[f64]) -> Result<Vec<Vec<Vertex>>, EdgeError> {
    let spatial = !z.is_empty();
    if x.len() != y.len() || (spatial && z.len() != x.len()) {
        return Err(EdgeError::LengthMismatch {
            x: x.len(),
            y: y.len(),
            z: spatial.then_some(z.len()),
        });
    }

    let mut polylines = Vec::new();
    let mut current = Vec::new();
    for (index, (&px, &py)) in x.iter().zip(y).enumerate() {
        let pz = z.get(index).copied();
        let breaks = [Some(px), Some(py), pz]
            .into_iter()
            .flatten()
            .filter(|value| is_break(*value))
            .count();
        let axes = if spatial { 3 } else { 2 };
        match breaks {
            0 => current.push(Vertex { x: px, y: py, z: pz }),
            count if count == axes => {
                if !current.is_empty() {
                    polylines.push(std::mem::take(&mut current));
                }
            }
            _ => return Err(EdgeError::MisalignedBreak { index }),
        }
    }
    if !current.is_empty() {
        polylines.push(current);
    }
    Ok(polylines)
}
