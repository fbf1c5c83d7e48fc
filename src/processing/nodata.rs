// src/processing/nodata.rs
//! NaN clean-up for floating point rasters.
//!
//! Every NaN sample becomes `0.0`. This is lossy: a genuine no-data sentinel is not
//! preserved, and a sanitized sample cannot be told apart from a real zero afterwards.
//! Integer rasters are never touched.

use crate::utils::TypedBuffer;

/// Fill value written over NaN samples.
pub const NAN_FILL_VALUE: f64 = 0.0;

/// Replace NaN samples in every floating point band. Returns the number of samples replaced.
pub fn sanitize(bands: &mut [TypedBuffer]) -> usize {
    bands.iter_mut().map(sanitize_band).sum()
}

/// Replace NaN samples in a single band. No-op for integer element types.
pub fn sanitize_band(band: &mut TypedBuffer) -> usize {
    if !band.is_floating() {
        return 0;
    }
    match band {
        TypedBuffer::F32(buf) => replace_nan_f32(buf.data_mut()),
        TypedBuffer::F64(buf) => replace_nan_f64(buf.data_mut()),
        _ => 0,
    }
}

fn replace_nan_f32(data: &mut [f32]) -> usize {
    let mut replaced = 0;
    for value in data.iter_mut().filter(|v| v.is_nan()) {
        *value = NAN_FILL_VALUE as f32;
        replaced += 1;
    }
    replaced
}

fn replace_nan_f64(data: &mut [f64]) -> usize {
    let mut replaced = 0;
    for value in data.iter_mut().filter(|v| v.is_nan()) {
        *value = NAN_FILL_VALUE;
        replaced += 1;
    }
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdal::raster::Buffer;

    #[test]
    fn test_nan_replaced_with_zero() {
        let mut bands = vec![TypedBuffer::F32(Buffer::new(
            (2, 2),
            vec![f32::NAN, 1.5, -2.0, f32::NAN],
        ))];
        assert_eq!(sanitize(&mut bands), 2);
        assert_eq!(bands[0].as_f32().unwrap().data(), &[0.0, 1.5, -2.0, 0.0]);
    }

    #[test]
    fn test_f64_band() {
        let mut band = TypedBuffer::F64(Buffer::new((3, 1), vec![1.0, f64::NAN, f64::INFINITY]));
        assert_eq!(sanitize_band(&mut band), 1);
        assert_eq!(band.as_f64().unwrap().data(), &[1.0, 0.0, f64::INFINITY]);
    }

    #[test]
    fn test_clean_float_band_is_untouched() {
        let original = vec![0.25f32, -0.0, f32::MAX, f32::MIN_POSITIVE];
        let mut bands = vec![TypedBuffer::F32(Buffer::new((4, 1), original.clone()))];
        assert_eq!(sanitize(&mut bands), 0);
        let after = bands[0].as_f32().unwrap().data();
        let bits: Vec<u32> = after.iter().map(|v| v.to_bits()).collect();
        let expected: Vec<u32> = original.iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits, expected);
    }

    #[test]
    fn test_integer_band_is_untouched() {
        let mut bands = vec![TypedBuffer::I16(Buffer::new((2, 1), vec![-9999, 7]))];
        assert_eq!(sanitize(&mut bands), 0);
        match &bands[0] {
            TypedBuffer::I16(buf) => assert_eq!(buf.data(), &[-9999, 7]),
            other => panic!("unexpected buffer {other:?}"),
        }
    }

    #[test]
    fn test_only_floating_bands_are_sanitized() {
        let mut bands = vec![
            TypedBuffer::U8(Buffer::new((2, 1), vec![0, 255])),
            TypedBuffer::U32(Buffer::new((1, 1), vec![u32::MAX])),
            TypedBuffer::F64(Buffer::new((1, 1), vec![f64::NAN])),
        ];
        let floating: Vec<bool> = bands.iter().map(TypedBuffer::is_floating).collect();
        assert_eq!(floating, vec![false, false, true]);

        assert_eq!(sanitize(&mut bands), 1);
        match &bands[0] {
            TypedBuffer::U8(buf) => assert_eq!(buf.data(), &[0, 255]),
            other => panic!("unexpected buffer {other:?}"),
        }
        assert_eq!(bands[2].as_f64().unwrap().data(), &[0.0]);
    }

    #[test]
    fn test_multiple_bands_are_counted() {
        let mut bands = vec![
            TypedBuffer::F32(Buffer::new((1, 1), vec![f32::NAN])),
            TypedBuffer::F32(Buffer::new((1, 1), vec![f32::NAN])),
        ];
        assert_eq!(sanitize(&mut bands), 2);
    }
}
