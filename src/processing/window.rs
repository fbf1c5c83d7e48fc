// src/processing/window.rs
use std::fmt;

use crate::error::{CogError, Result};

/// Fractional pixel coordinates closer than this to an integer are treated as that integer.
const PIXEL_SNAP_TOLERANCE: f64 = 1e-6;

/// Geographic box in the source raster's coordinate reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        if ![min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite()) {
            return Err(CogError::InvalidBoundingBox(
                "coordinates must be finite".to_string(),
            ));
        }
        if min_x > max_x || min_y > max_y {
            return Err(CogError::InvalidBoundingBox(format!(
                "min must not exceed max, got ({min_x}, {min_y}, {max_x}, {max_y})"
            )));
        }
        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// Build from the four `--bbox` values `[minX, minY, maxX, maxY]`.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match values {
            [min_x, min_y, max_x, max_y] => Self::new(*min_x, *min_y, *max_x, *max_y),
            _ => Err(CogError::InvalidBoundingBox(format!(
                "expected 4 values, got {}",
                values.len()
            ))),
        }
    }

    fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.min_x, self.min_y),
            (self.min_x, self.max_y),
            (self.max_x, self.min_y),
            (self.max_x, self.max_y),
        ]
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Integer pixel region of a raster. Width and height are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub col_off: usize,
    pub row_off: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelWindow {
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            col_off: 0,
            row_off: 0,
            width,
            height,
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

/// Map `bbox` onto the pixel grid described by `geo_transform` and clip it to the raster.
///
/// Offsets are floored and far edges ceiled, so the window always covers the
/// whole requested area. Values within [`PIXEL_SNAP_TOLERANCE`] of a pixel edge are
/// snapped to it first, which keeps boxes drawn on exact pixel edges from
/// gaining an extra row or column.
pub fn compute_window(
    bbox: &BoundingBox,
    geo_transform: &[f64; 6],
    raster_width: usize,
    raster_height: usize,
) -> Result<PixelWindow> {
    let inverse = invert_geo_transform(geo_transform)?;

    let mut min_col = f64::INFINITY;
    let mut max_col = f64::NEG_INFINITY;
    let mut min_row = f64::INFINITY;
    let mut max_row = f64::NEG_INFINITY;
    for (x, y) in bbox.corners() {
        let (col, row) = apply(&inverse, x, y);
        min_col = min_col.min(col);
        max_col = max_col.max(col);
        min_row = min_row.min(row);
        max_row = max_row.max(row);
    }

    let col_start = (snap(min_col).floor() as i64).max(0);
    let row_start = (snap(min_row).floor() as i64).max(0);
    let col_end = (snap(max_col).ceil() as i64).min(raster_width as i64);
    let row_end = (snap(max_row).ceil() as i64).min(raster_height as i64);

    if col_end <= col_start || row_end <= row_start {
        return Err(CogError::EmptyWindow {
            bbox: bbox.to_string(),
            width: raster_width,
            height: raster_height,
        });
    }

    Ok(PixelWindow {
        col_off: col_start as usize,
        row_off: row_start as usize,
        width: (col_end - col_start) as usize,
        height: (row_end - row_start) as usize,
    })
}

/// Geotransform of `window` read out of a raster with `geo_transform`.
///
/// Reads are never resampled, so only the origin moves.
pub fn window_transform(geo_transform: &[f64; 6], window: &PixelWindow) -> [f64; 6] {
    let (x, y) = apply(geo_transform, window.col_off as f64, window.row_off as f64);
    [
        x,
        geo_transform[1],
        geo_transform[2],
        y,
        geo_transform[4],
        geo_transform[5],
    ]
}

/// Inverse of a GDAL-ordered affine transform (geo to pixel).
pub fn invert_geo_transform(gt: &[f64; 6]) -> Result<[f64; 6]> {
    let det = gt[1] * gt[5] - gt[2] * gt[4];
    if det == 0.0 || !det.is_finite() {
        return Err(CogError::DegenerateTransform(*gt));
    }
    let inv_det = 1.0 / det;
    let a = gt[5] * inv_det;
    let b = -gt[2] * inv_det;
    let d = -gt[4] * inv_det;
    let e = gt[1] * inv_det;
    Ok([
        -(a * gt[0] + b * gt[3]),
        a,
        b,
        -(d * gt[0] + e * gt[3]),
        d,
        e,
    ])
}

fn apply(gt: &[f64; 6], u: f64, v: f64) -> (f64, f64) {
    (gt[0] + u * gt[1] + v * gt[2], gt[3] + u * gt[4] + v * gt[5])
}

fn snap(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() < PIXEL_SNAP_TOLERANCE {
        nearest
    } else {
        value
    }
}
