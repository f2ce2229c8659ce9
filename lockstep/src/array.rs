//! Typed scalar arrays moved across the buffer boundary.
//!
//! [`ElementArray`] is the one container the crate uses for series storage,
//! append input, and read output: a tagged enum with one owned vector per
//! supported [`ElementType`]. All copies between arrays are bounds-checked
//! slice copies parameterized by scalar count — no byte-level aliasing and
//! no reinterpretation across types.
//!
//! [`FieldArray`] pairs an `ElementArray` with its logical shape and is what
//! read operations hand back: row-major data shaped `[rows, element shape...]`.

use serde::{Deserialize, Serialize};

use crate::field::ElementType;

/// Owned, contiguous scalar data of a single element type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementArray {
    /// 32-bit float data.
    F32(Vec<f32>),
    /// 64-bit float data.
    F64(Vec<f64>),
    /// 32-bit signed integer data.
    I32(Vec<i32>),
    /// 64-bit signed integer data.
    I64(Vec<i64>),
    /// 8-bit unsigned integer data.
    U8(Vec<u8>),
}

impl ElementArray {
    /// Allocates a zero-filled array of `scalar_len` scalars.
    pub fn zeros(element_type: ElementType, scalar_len: usize) -> Self {
        match element_type {
            ElementType::F32 => Self::F32(vec![0.0; scalar_len]),
            ElementType::F64 => Self::F64(vec![0.0; scalar_len]),
            ElementType::I32 => Self::I32(vec![0; scalar_len]),
            ElementType::I64 => Self::I64(vec![0; scalar_len]),
            ElementType::U8 => Self::U8(vec![0; scalar_len]),
        }
    }

    /// Returns the element type tag of this array.
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::F32(_) => ElementType::F32,
            Self::F64(_) => ElementType::F64,
            Self::I32(_) => ElementType::I32,
            Self::I64(_) => ElementType::I64,
            Self::U8(_) => ElementType::U8,
        }
    }

    /// Returns the number of scalars held.
    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::U8(v) => v.len(),
        }
    }

    /// Returns `true` if the array holds no scalars.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the data as an `f32` slice, if that is the element type.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            Self::F32(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the data as an `f64` slice, if that is the element type.
    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            Self::F64(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the data as an `i32` slice, if that is the element type.
    pub fn as_i32(&self) -> Option<&[i32]> {
        match self {
            Self::I32(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the data as an `i64` slice, if that is the element type.
    pub fn as_i64(&self) -> Option<&[i64]> {
        match self {
            Self::I64(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the data as a `u8` slice, if that is the element type.
    pub fn as_u8(&self) -> Option<&[u8]> {
        match self {
            Self::U8(v) => Some(v),
            _ => None,
        }
    }

    /// Copies `count` scalars from `src` starting at `src_start` into this
    /// array starting at `dst_start`.
    ///
    /// Both arrays must share the same element type and both ranges must be
    /// in bounds; every caller in this crate validates both before copying,
    /// so violations are contract bugs and panic.
    pub(crate) fn copy_scalars(
        &mut self,
        dst_start: usize,
        src: &ElementArray,
        src_start: usize,
        count: usize,
    ) {
        match (self, src) {
            (Self::F32(dst), Self::F32(s)) => {
                dst[dst_start..dst_start + count].copy_from_slice(&s[src_start..src_start + count]);
            }
            (Self::F64(dst), Self::F64(s)) => {
                dst[dst_start..dst_start + count].copy_from_slice(&s[src_start..src_start + count]);
            }
            (Self::I32(dst), Self::I32(s)) => {
                dst[dst_start..dst_start + count].copy_from_slice(&s[src_start..src_start + count]);
            }
            (Self::I64(dst), Self::I64(s)) => {
                dst[dst_start..dst_start + count].copy_from_slice(&s[src_start..src_start + count]);
            }
            (Self::U8(dst), Self::U8(s)) => {
                dst[dst_start..dst_start + count].copy_from_slice(&s[src_start..src_start + count]);
            }
            // Callers allocate destinations from the field's own type tag.
            _ => unreachable!("copy between arrays of different element types"),
        }
    }
}

impl From<Vec<f32>> for ElementArray {
    fn from(data: Vec<f32>) -> Self {
        Self::F32(data)
    }
}

impl From<Vec<f64>> for ElementArray {
    fn from(data: Vec<f64>) -> Self {
        Self::F64(data)
    }
}

impl From<Vec<i32>> for ElementArray {
    fn from(data: Vec<i32>) -> Self {
        Self::I32(data)
    }
}

impl From<Vec<i64>> for ElementArray {
    fn from(data: Vec<i64>) -> Self {
        Self::I64(data)
    }
}

impl From<Vec<u8>> for ElementArray {
    fn from(data: Vec<u8>) -> Self {
        Self::U8(data)
    }
}

/// One read-result column: row-major data shaped `[rows, element shape...]`.
///
/// Row `i` holds the element copied for draw (or slot) `i`; within a row the
/// element's scalars are contiguous in declaration order of its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldArray {
    shape: Vec<usize>,
    data: ElementArray,
}

impl FieldArray {
    pub(crate) fn new(shape: Vec<usize>, data: ElementArray) -> Self {
        Self { shape, data }
    }

    /// Returns the full shape, leading dimension first.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the number of rows (the leading dimension).
    pub fn rows(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    /// Returns the underlying scalar data.
    pub fn data(&self) -> &ElementArray {
        &self.data
    }

    /// Consumes the column and returns the underlying scalar data.
    pub fn into_data(self) -> ElementArray {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_len_and_type() {
        let a = ElementArray::zeros(ElementType::I64, 6);
        assert_eq!(a.len(), 6);
        assert_eq!(a.element_type(), ElementType::I64);
        assert_eq!(a.as_i64(), Some(&[0i64; 6][..]));
        assert_eq!(a.as_f32(), None);
    }

    #[test]
    fn test_copy_scalars() {
        let src = ElementArray::from(vec![1.0f32, 2.0, 3.0, 4.0]);
        let mut dst = ElementArray::zeros(ElementType::F32, 4);
        dst.copy_scalars(1, &src, 2, 2);
        assert_eq!(dst.as_f32(), Some(&[0.0, 3.0, 4.0, 0.0][..]));
    }

    #[test]
    fn test_from_vec() {
        let a: ElementArray = vec![1u8, 2, 3].into();
        assert_eq!(a.element_type(), ElementType::U8);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_field_array_rows() {
        let col = FieldArray::new(vec![5, 3], ElementArray::zeros(ElementType::F32, 15));
        assert_eq!(col.rows(), 5);
        assert_eq!(col.shape(), &[5, 3]);
        assert_eq!(col.data().len(), 15);
    }
}
