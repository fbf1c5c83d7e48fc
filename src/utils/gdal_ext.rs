// src/utils/gdal_ext.rs
use gdal::raster::{Buffer, GdalDataType, GdalType, RasterBand};

use crate::error::{CogError, Result};

/// A band of pixels in whichever element type the source raster uses.
#[derive(Debug, Clone)]
pub enum TypedBuffer {
    U8(Buffer<u8>),
    U16(Buffer<u16>),
    I16(Buffer<i16>),
    U32(Buffer<u32>),
    I32(Buffer<i32>),
    F32(Buffer<f32>),
    F64(Buffer<f64>),
}

impl TypedBuffer {
    /// Read a `(width, height)` block at `offset` from `band`, keeping its native type.
    pub fn read(band: &RasterBand, offset: (usize, usize), size: (usize, usize)) -> Result<Self> {
        let buffer = match band.band_type() {
            GdalDataType::UInt8 => TypedBuffer::U8(read_as(band, offset, size)?),
            GdalDataType::UInt16 => TypedBuffer::U16(read_as(band, offset, size)?),
            GdalDataType::Int16 => TypedBuffer::I16(read_as(band, offset, size)?),
            GdalDataType::UInt32 => TypedBuffer::U32(read_as(band, offset, size)?),
            GdalDataType::Int32 => TypedBuffer::I32(read_as(band, offset, size)?),
            GdalDataType::Float32 => TypedBuffer::F32(read_as(band, offset, size)?),
            GdalDataType::Float64 => TypedBuffer::F64(read_as(band, offset, size)?),
            other => return Err(CogError::UnsupportedDataType(format!("{other:?}"))),
        };
        Ok(buffer)
    }

    /// Write the whole buffer into `band` starting at the top-left pixel.
    pub fn write(&mut self, band: &mut RasterBand) -> Result<()> {
        let shape = self.shape();
        match self {
            TypedBuffer::U8(buf) => band.write((0, 0), shape, buf)?,
            TypedBuffer::U16(buf) => band.write((0, 0), shape, buf)?,
            TypedBuffer::I16(buf) => band.write((0, 0), shape, buf)?,
            TypedBuffer::U32(buf) => band.write((0, 0), shape, buf)?,
            TypedBuffer::I32(buf) => band.write((0, 0), shape, buf)?,
            TypedBuffer::F32(buf) => band.write((0, 0), shape, buf)?,
            TypedBuffer::F64(buf) => band.write((0, 0), shape, buf)?,
        }
        Ok(())
    }

    pub fn shape(&self) -> (usize, usize) {
        match self {
            TypedBuffer::U8(buf) => buf.shape(),
            TypedBuffer::U16(buf) => buf.shape(),
            TypedBuffer::I16(buf) => buf.shape(),
            TypedBuffer::U32(buf) => buf.shape(),
            TypedBuffer::I32(buf) => buf.shape(),
            TypedBuffer::F32(buf) => buf.shape(),
            TypedBuffer::F64(buf) => buf.shape(),
        }
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, TypedBuffer::F32(_) | TypedBuffer::F64(_))
    }

    pub fn as_f32(&self) -> Option<&Buffer<f32>> {
        match self {
            TypedBuffer::F32(buf) => Some(buf),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&Buffer<f64>> {
        match self {
            TypedBuffer::F64(buf) => Some(buf),
            _ => None,
        }
    }
}

fn read_as<T: GdalType + Copy>(
    band: &RasterBand,
    offset: (usize, usize),
    size: (usize, usize),
) -> Result<Buffer<T>> {
    Ok(band.read_as::<T>((offset.0 as isize, offset.1 as isize), size, size, None)?)
}
