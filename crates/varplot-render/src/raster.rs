//! Decoded image payloads: display raster plus per-pixel value lookup.

use image::{Rgba, RgbaImage};
use varplot_protocol::codec::{ImageBuffer, decode_image, decode_real_values, real_pixel};
use varplot_protocol::{ImagePayload, ImageShape};

use crate::errors::RenderError;
use crate::format::fixed3;

/// An image payload with its buffers decoded and validated.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    visual: ImageBuffer,
    real: Option<Vec<f32>>,
    orig_min: f64,
    orig_max: f64,
}

impl DecodedImage {
    /// Decodes `visualBytes` and, when present, `realBytes`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::EmptyImage`] for a zero-sized shape,
    /// [`RenderError::ImageTooLarge`] when a side does not fit a raster, and
    /// [`RenderError::Codec`] when either buffer disagrees with the shape.
    pub fn decode(payload: &ImagePayload) -> Result<Self, RenderError> {
        let shape = payload.shape;
        if shape.pixel_count() == 0 {
            return Err(RenderError::EmptyImage {
                rows: shape.rows(),
                cols: shape.cols(),
            });
        }
        if u32::try_from(shape.rows()).is_err() || u32::try_from(shape.cols()).is_err() {
            return Err(RenderError::ImageTooLarge {
                rows: shape.rows(),
                cols: shape.cols(),
            });
        }
        let visual = decode_image(shape, &payload.visual_bytes)?;
        let real = payload
            .real_bytes
            .as_deref()
            .map(|text| decode_real_values(shape, text))
            .transpose()?;
        Ok(Self {
            visual,
            real,
            orig_min: payload.orig_min,
            orig_max: payload.orig_max,
        })
    }

    /// Declared shape.
    #[must_use]
    pub const fn shape(&self) -> ImageShape {
        self.visual.shape()
    }

    /// Builds the `cols x rows` display raster.
    ///
    /// One channel is replicated to grey, two channels show the first as grey,
    /// three or more use the first three as RGB. Alpha is always opaque.
    #[must_use]
    pub fn to_rgba(&self) -> RgbaImage {
        let shape = self.shape();
        let cols = u32::try_from(shape.cols()).unwrap_or(u32::MAX);
        let rows = u32::try_from(shape.rows()).unwrap_or(u32::MAX);
        RgbaImage::from_fn(cols, rows, |x, y| {
            self.visual
                .pixel(y as usize, x as usize)
                .map_or(Rgba([0, 0, 0, u8::MAX]), display_colour)
        })
    }

    /// Channel values at `(row, col)`: exact values when shipped, otherwise
    /// display bytes mapped back to the original range.
    #[must_use]
    pub fn value_at(&self, row: usize, col: usize) -> Option<Vec<f64>> {
        if let Some(real) = &self.real {
            let values = real_pixel(real, self.shape(), row, col)?;
            return Some(values.iter().map(|value| f64::from(*value)).collect());
        }
        let bytes = self.visual.pixel(row, col)?;
        let span = self.orig_max - self.orig_min;
        Some(
            bytes
                .iter()
                .map(|byte| f64::from(*byte) / 255.0 * span + self.orig_min)
                .collect(),
        )
    }

    /// Tooltip text for `(row, col)`.
    #[must_use]
    pub fn tooltip_text(&self, row: usize, col: usize) -> Option<String> {
        let values = self.value_at(row, col)?;
        let rendered = match values.as_slice() {
            [single] => fixed3(*single),
            many => format!(
                "({})",
                many.iter().map(|value| fixed3(*value)).collect::<Vec<_>>().join(", ")
            ),
        };
        Some(format!("x: {col} y: {row}\nVal: {rendered}"))
    }
}

fn display_colour(samples: &[u8]) -> Rgba<u8> {
    match samples {
        [red, green, blue, ..] => Rgba([*red, *green, *blue, u8::MAX]),
        [grey, ..] => Rgba([*grey, *grey, *grey, u8::MAX]),
        [] => Rgba([0, 0, 0, u8::MAX]),
    }
}
