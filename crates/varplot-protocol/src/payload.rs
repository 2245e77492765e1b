//! The self-describing payload delivered to the renderer.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::PayloadError;

/// Lower bound assumed when an image omits `origMin`.
pub const DEFAULT_ORIG_MIN: f64 = 0.0;

/// Upper bound assumed when an image omits `origMax`.
pub const DEFAULT_ORIG_MAX: f64 = 255.0;

/// Discriminant of a [`Payload`], used for logging and dispatch tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// Raster image.
    Image,
    /// Two-dimensional point cloud.
    Points2d,
    /// Three-dimensional point cloud.
    Points3d,
    /// Planar graph.
    Graph2d,
    /// Spatial graph.
    Graph3d,
    /// Flat numeric sequence.
    Array1d,
    /// Opaque text representation.
    Object,
    /// Extraction failure.
    Error,
}

impl PayloadKind {
    /// Returns the wire spelling of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Points2d => "points2d",
            Self::Points3d => "points3d",
            Self::Graph2d => "graph2d",
            Self::Graph3d => "graph3d",
            Self::Array1d => "array1d",
            Self::Object => "object",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Image dimensions in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct ImageShape {
    rows: usize,
    cols: usize,
    channels: Option<usize>,
}

impl ImageShape {
    /// Builds a single-channel shape without an explicit channel axis.
    #[must_use]
    pub const fn grayscale(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            channels: None,
        }
    }

    /// Builds a shape with an explicit channel axis.
    #[must_use]
    pub const fn with_channels(rows: usize, cols: usize, channels: usize) -> Self {
        Self {
            rows,
            cols,
            channels: Some(channels),
        }
    }

    /// Number of rows (image height).
    #[must_use]
    pub const fn rows(self) -> usize {
        self.rows
    }

    /// Number of columns (image width).
    #[must_use]
    pub const fn cols(self) -> usize {
        self.cols
    }

    /// Channels per pixel; one when the shape has no channel axis.
    #[must_use]
    pub const fn channels(self) -> usize {
        match self.channels {
            Some(channels) => channels,
            None => 1,
        }
    }

    /// Number of pixels.
    #[must_use]
    pub const fn pixel_count(self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    /// Number of per-channel samples, which is also the visual byte count.
    #[must_use]
    pub const fn sample_count(self) -> usize {
        self.pixel_count().saturating_mul(self.channels())
    }
}

impl TryFrom<Vec<usize>> for ImageShape {
    type Error = PayloadError;

    fn try_from(dims: Vec<usize>) -> Result<Self, Self::Error> {
        match dims.as_slice() {
            [rows, cols] => Ok(Self::grayscale(*rows, *cols)),
            [_, _, 0] => Err(PayloadError::ZeroChannels),
            [rows, cols, channels] => Ok(Self::with_channels(*rows, *cols, *channels)),
            other => Err(PayloadError::InvalidShape {
                dimensions: other.len(),
            }),
        }
    }
}

impl From<ImageShape> for Vec<usize> {
    fn from(shape: ImageShape) -> Self {
        match shape.channels {
            Some(channels) => vec![shape.rows, shape.cols, channels],
            None => vec![shape.rows, shape.cols],
        }
    }
}

/// Image payload: display bytes plus optional exact values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// Image dimensions.
    pub shape: ImageShape,
    /// Source numeric type name, e.g. `uint8` or `float32`.
    pub dtype: String,
    /// Base64 of one display-normalised byte per channel per pixel.
    pub visual_bytes: String,
    /// Base64 of one little-endian `f32` per channel per pixel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_bytes: Option<String>,
    /// Value mapped to display byte 0.
    #[serde(default = "default_orig_min")]
    pub orig_min: f64,
    /// Value mapped to display byte 255.
    #[serde(default = "default_orig_max")]
    pub orig_max: f64,
}

const fn default_orig_min() -> f64 {
    DEFAULT_ORIG_MIN
}

const fn default_orig_max() -> f64 {
    DEFAULT_ORIG_MAX
}

/// Planar point cloud in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Points2dPayload {
    /// `(x, y)` tuples.
    pub data: Vec<[f64; 2]>,
}

/// Spatial point cloud in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Points3dPayload {
    /// `(x, y, z)` tuples.
    pub data: Vec<[f64; 3]>,
}

/// Graph layout with node positions and flattened edge polylines.
///
/// Edge sequences hold a `NaN` sentinel after every edge; on the wire the
/// sentinel is JSON `null`. The `z` sequences are empty for planar graphs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPayload {
    /// Number of nodes in the source graph.
    pub num_nodes: usize,
    /// Number of edges in the source graph.
    pub num_edges: usize,
    /// Node x coordinates.
    #[serde(with = "sentinel")]
    pub node_x: Vec<f64>,
    /// Node y coordinates.
    #[serde(with = "sentinel")]
    pub node_y: Vec<f64>,
    /// Node z coordinates (spatial graphs only).
    #[serde(default, with = "sentinel", skip_serializing_if = "Vec::is_empty")]
    pub node_z: Vec<f64>,
    /// Flattened edge x coordinates with sentinel breaks.
    #[serde(with = "sentinel")]
    pub edge_x: Vec<f64>,
    /// Flattened edge y coordinates with sentinel breaks.
    #[serde(with = "sentinel")]
    pub edge_y: Vec<f64>,
    /// Flattened edge z coordinates with sentinel breaks (spatial graphs only).
    #[serde(default, with = "sentinel", skip_serializing_if = "Vec::is_empty")]
    pub edge_z: Vec<f64>,
}

/// Flat numeric sequence rendered as a histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayPayload {
    /// Raw values in source order.
    pub data: Vec<f64>,
}

/// Pre-formatted text representation of an arbitrary value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPayload {
    /// Text block shown verbatim.
    pub data: String,
}

/// Unit of data transported to the renderer.
///
/// Every variant except [`Payload::Error`] serialises with a `kind` tag; the
/// error variant serialises as `{"error": message}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Raster image.
    Image(ImagePayload),
    /// Planar point cloud.
    Points2d(Points2dPayload),
    /// Spatial point cloud.
    Points3d(Points3dPayload),
    /// Planar graph.
    Graph2d(GraphPayload),
    /// Spatial graph.
    Graph3d(GraphPayload),
    /// Histogram input.
    Array1d(ArrayPayload),
    /// Opaque text block.
    Object(ObjectPayload),
    /// Extraction or transport failure shown in place of a plot.
    Error {
        /// Human-readable description.
        message: String,
    },
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum TaggedRef<'a> {
    Image(&'a ImagePayload),
    Points2d(&'a Points2dPayload),
    Points3d(&'a Points3dPayload),
    Graph2d(&'a GraphPayload),
    Graph3d(&'a GraphPayload),
    Array1d(&'a ArrayPayload),
    Object(&'a ObjectPayload),
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Tagged {
    Image(ImagePayload),
    Points2d(Points2dPayload),
    Points3d(Points3dPayload),
    Graph2d(GraphPayload),
    Graph3d(GraphPayload),
    Array1d(ArrayPayload),
    Object(ObjectPayload),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// Field spellings emitted by older extractors, mapped to current names.
const LEGACY_FIELDS: &[(&str, &str)] = &[
    ("real_data", "realBytes"),
    ("orig_min", "origMin"),
    ("orig_max", "origMax"),
    ("num_nodes", "numNodes"),
    ("num_edges", "numEdges"),
    ("node_x", "nodeX"),
    ("node_y", "nodeY"),
    ("node_z", "nodeZ"),
    ("edge_x", "edgeX"),
    ("edge_y", "edgeY"),
    ("edge_z", "edgeZ"),
];

/// Older extractors tagged planar points and graphs without a dimension.
const LEGACY_KINDS: &[(&str, &str)] = &[("points", "points2d"), ("graph", "graph2d")];

impl Payload {
    /// Builds an error payload.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Returns the payload discriminant.
    #[must_use]
    pub const fn kind(&self) -> PayloadKind {
        match self {
            Self::Image(_) => PayloadKind::Image,
            Self::Points2d(_) => PayloadKind::Points2d,
            Self::Points3d(_) => PayloadKind::Points3d,
            Self::Graph2d(_) => PayloadKind::Graph2d,
            Self::Graph3d(_) => PayloadKind::Graph3d,
            Self::Array1d(_) => PayloadKind::Array1d,
            Self::Object(_) => PayloadKind::Object,
            Self::Error { .. } => PayloadKind::Error,
        }
    }

    /// Whether the payload carries an error instead of data.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Parses a payload from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] when the text is not JSON or does not describe
    /// a known payload.
    pub fn from_json_str(text: &str) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Interprets a JSON value as a payload, accepting legacy field names.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] when the value is not an object or does not
    /// describe a known payload.
    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        let Value::Object(mut object) = value else {
            return Err(PayloadError::NotAnObject);
        };

        if let Some(error) = object.remove("error") {
            let message = match error {
                Value::String(text) => text,
                other => other.to_string(),
            };
            return Ok(Self::Error { message });
        }

        normalise_legacy(&mut object);
        let tagged: Tagged = serde_json::from_value(Value::Object(object))?;
        Ok(match tagged {
            Tagged::Image(image) => Self::Image(image),
            Tagged::Points2d(points) => Self::Points2d(points),
            Tagged::Points3d(points) => Self::Points3d(points),
            Tagged::Graph2d(graph) => Self::Graph2d(graph),
            Tagged::Graph3d(graph) => Self::Graph3d(graph),
            Tagged::Array1d(array) => Self::Array1d(array),
            Tagged::Object(object_payload) => Self::Object(object_payload),
        })
    }

    /// Serialises the payload to JSON text.
    ///
    /// # Errors
    ///
    /// Returns the serde error if serialisation fails.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn normalise_legacy(object: &mut Map<String, Value>) {
    if !object.contains_key("kind")
        && let Some(kind) = object.remove("type")
    {
        let current = kind
            .as_str()
            .and_then(|tag| LEGACY_KINDS.iter().find(|(legacy, _)| *legacy == tag))
            .map(|(_, current)| *current);
        object.insert(String::from("kind"), current.map_or(kind, Value::from));
    }

    let is_image = object.get("kind").and_then(Value::as_str) == Some("image");
    if is_image && !object.contains_key("visualBytes")
        && let Some(data) = object.remove("data")
    {
        object.insert(String::from("visualBytes"), data);
    }

    for (legacy, current) in LEGACY_FIELDS {
        if object.contains_key(*current) {
            continue;
        }
        if let Some(value) = object.remove(*legacy) {
            object.insert((*current).to_owned(), value);
        }
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Image(image) => TaggedRef::Image(image).serialize(serializer),
            Self::Points2d(points) => TaggedRef::Points2d(points).serialize(serializer),
            Self::Points3d(points) => TaggedRef::Points3d(points).serialize(serializer),
            Self::Graph2d(graph) => TaggedRef::Graph2d(graph).serialize(serializer),
            Self::Graph3d(graph) => TaggedRef::Graph3d(graph).serialize(serializer),
            Self::Array1d(array) => TaggedRef::Array1d(array).serialize(serializer),
            Self::Object(object) => TaggedRef::Object(object).serialize(serializer),
            Self::Error { message } => ErrorBody { error: message }.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}

/// Maps JSON `null` entries to `NaN` sentinels and back.
mod sentinel {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|value| value.is_finite().then_some(*value)))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<f64>, D::Error> {
        let raw: Option<Vec<Option<f64>>> = Option::deserialize(deserializer)?;
        Ok(raw
            .unwrap_or_default()
            .into_iter()
            .map(|value| value.unwrap_or(f64::NAN))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn parses_error_payload_without_kind() {
        let payload = Payload::from_value(json!({"error": "Variable not found"}))
            .expect("error payload should parse");

        assert_eq!(payload, Payload::error("Variable not found"));
    }

    #[rstest]
    fn serialises_error_payload_as_bare_error_field() {
        let text = Payload::error("boom").to_json_string().expect("serialise");

        assert_eq!(text, r#"{"error":"boom"}"#);
    }

    #[rstest]
    fn parses_image_with_defaults() {
        let payload = Payload::from_value(json!({
            "kind": "image",
            "shape": [2, 2, 1],
            "dtype": "uint8",
            "visualBytes": "AID/QA==",
        }))
        .expect("image payload should parse");

        let Payload::Image(image) = payload else {
            panic!("expected image payload, got {payload:?}");
        };
        assert_eq!(image.shape, ImageShape::with_channels(2, 2, 1));
        assert_eq!(image.orig_min, DEFAULT_ORIG_MIN);
        assert_eq!(image.orig_max, DEFAULT_ORIG_MAX);
        assert!(image.real_bytes.is_none());
    }

    #[rstest]
    fn accepts_legacy_image_spelling() {
        let payload = Payload::from_value(json!({
            "type": "image",
            "shape": [4, 5],
            "dtype": "float32",
            "data": "AAAA",
            "real_data": "AAAAAA==",
            "orig_min": -1.0,
            "orig_max": 1.0,
        }))
        .expect("legacy image should parse");

        let Payload::Image(image) = payload else {
            panic!("expected image payload, got {payload:?}");
        };
        assert_eq!(image.visual_bytes, "AAAA");
        assert_eq!(image.real_bytes.as_deref(), Some("AAAAAA=="));
        assert_eq!(image.orig_min, -1.0);
        assert_eq!(image.shape.channels(), 1);
    }

    #[rstest]
    fn legacy_graph_null_sentinels_become_nan() {
        let payload = Payload::from_value(json!({
            "type": "graph2d",
            "node_x": [0.0, 1.0],
            "node_y": [0.0, 1.0],
            "node_z": null,
            "edge_x": [0.0, 1.0, null],
            "edge_y": [0.0, 1.0, null],
            "edge_z": null,
            "num_nodes": 2,
            "num_edges": 1,
        }))
        .expect("legacy graph should parse");

        let Payload::Graph2d(graph) = payload else {
            panic!("expected graph payload, got {payload:?}");
        };
        assert_eq!(graph.edge_x.len(), 3);
        assert!(graph.edge_x.last().is_some_and(|value| value.is_nan()));
        assert!(graph.node_z.is_empty());
    }

    #[rstest]
    fn undimensioned_legacy_tags_mean_planar() {
        let points = Payload::from_value(json!({
            "type": "points",
            "data": [[0.0, 1.0], [2.0, 3.0]],
            "shape": [2, 2],
        }))
        .expect("legacy points should parse");
        let graph = Payload::from_value(json!({
            "type": "graph",
            "node_x": [0.0, 1.0],
            "node_y": [0.0, 1.0],
            "edge_x": [0.0, 1.0, null],
            "edge_y": [0.0, 1.0, null],
            "num_nodes": 2,
            "num_edges": 1,
        }))
        .expect("legacy graph should parse");

        assert_eq!(points.kind(), PayloadKind::Points2d);
        assert_eq!(graph.kind(), PayloadKind::Graph2d);
    }

    #[rstest]
    fn graph_sentinels_serialise_as_null() {
        let graph = GraphPayload {
            num_nodes: 2,
            num_edges: 1,
            node_x: vec![0.0, 1.0],
            node_y: vec![0.0, 1.0],
            node_z: Vec::new(),
            edge_x: vec![0.0, 1.0, f64::NAN],
            edge_y: vec![0.0, 1.0, f64::NAN],
            edge_z: Vec::new(),
        };

        let value = serde_json::to_value(Payload::Graph2d(graph)).expect("serialise");

        assert_eq!(value["kind"], "graph2d");
        assert_eq!(value["edgeX"], json!([0.0, 1.0, null]));
        assert!(value.get("edgeZ").is_none());
    }

    #[rstest]
    #[case(json!([3]), 1)]
    #[case(json!([1, 2, 3, 4]), 4)]
    fn rejects_bad_shapes(#[case] shape: Value, #[case] dimensions: usize) {
        let result = Payload::from_value(json!({
            "kind": "image",
            "shape": shape,
            "dtype": "uint8",
            "visualBytes": "",
        }));

        let error = result.expect_err("shape should be rejected");
        assert!(
            error.to_string().contains(&dimensions.to_string()),
            "unexpected error: {error}"
        );
    }

    #[rstest]
    fn rejects_unknown_kind() {
        let result = Payload::from_value(json!({"kind": "hologram"}));

        assert!(matches!(result, Err(PayloadError::Malformed { .. })));
    }

    #[rstest]
    fn rejects_non_object_payloads() {
        assert!(matches!(
            Payload::from_value(json!([1, 2, 3])),
            Err(PayloadError::NotAnObject)
        ));
    }

    #[rstest]
    fn points_keep_order_and_duplicates() {
        let payload = Payload::from_json_str(
            r#"{"kind":"points2d","data":[[0,0],[1,1],[1,1],[2,4]]}"#,
        )
        .expect("points should parse");

        let Payload::Points2d(points) = payload else {
            panic!("expected points payload, got {payload:?}");
        };
        assert_eq!(points.data, vec![[0.0, 0.0], [1.0, 1.0], [1.0, 1.0], [2.0, 4.0]]);
    }
}
