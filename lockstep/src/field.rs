//! Field declarations for the lockstep ring buffer.
//!
//! A field is one named data series stored in lockstep with its siblings:
//! slot `i` of the buffer holds one element of every declared field. The
//! field's element type is drawn from a closed set of scalar types and its
//! per-element shape is fixed at declaration time, so all storage sizing
//! reduces to element counts — individual scalars inside a multi-dimensional
//! element are never addressed on their own.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, Result};

/// Scalar element types a field can store.
///
/// This is a closed set: storage, append input, and read output are all
/// dispatched over this tag, so there is no runtime type reflection anywhere
/// in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    /// 32-bit IEEE 754 float.
    F32,
    /// 64-bit IEEE 754 float.
    F64,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 8-bit unsigned integer.
    U8,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
        };
        f.write_str(name)
    }
}

/// Immutable declaration of one field: name, element type, element shape.
///
/// The shape describes a single element; the storage for a field is shaped
/// `[capacity, shape...]` row-major. `unit_size` (the product of the shape)
/// is precomputed at construction and is the unit of all copy operations.
///
/// # Example
///
/// ```rust
/// use lockstep::{ElementType, FieldSpec};
///
/// # fn main() -> lockstep::Result<()> {
/// let obs = FieldSpec::new("observation", ElementType::F32, vec![4, 84])?;
/// assert_eq!(obs.unit_size(), 4 * 84);
///
/// let reward = FieldSpec::scalar("reward", ElementType::F32);
/// assert_eq!(reward.unit_size(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Unique field name within one buffer.
    name: String,
    /// Scalar type of every value in this field.
    element_type: ElementType,
    /// Dimensions of a single element. Empty means scalar.
    shape: Vec<usize>,
    /// Scalars per element, `product(shape)`.
    unit_size: usize,
}

impl FieldSpec {
    /// Declares a field with the given element shape.
    ///
    /// An empty shape declares a scalar field (one value per slot).
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidDimension`] if any dimension is zero.
    pub fn new(
        name: impl Into<String>,
        element_type: ElementType,
        shape: Vec<usize>,
    ) -> Result<Self> {
        let name = name.into();
        for (axis, &size) in shape.iter().enumerate() {
            if size == 0 {
                return Err(FieldError::InvalidDimension {
                    field: name,
                    axis,
                    size,
                }
                .into());
            }
        }
        let unit_size = shape.iter().product::<usize>().max(1);
        Ok(Self {
            name,
            element_type,
            shape,
            unit_size,
        })
    }

    /// Declares a scalar field, shape `[1]`.
    pub fn scalar(name: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            name: name.into(),
            element_type,
            shape: vec![1],
            unit_size: 1,
        }
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the scalar element type.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Returns the dimensions of a single element.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the number of scalars in a single element.
    pub fn unit_size(&self) -> usize {
        self.unit_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_size_is_shape_product() {
        let spec = FieldSpec::new("obs", ElementType::F32, vec![3, 4, 2]).unwrap();
        assert_eq!(spec.unit_size(), 24);
        assert_eq!(spec.shape(), &[3, 4, 2]);
        assert_eq!(spec.element_type(), ElementType::F32);
    }

    #[test]
    fn test_empty_shape_is_scalar() {
        let spec = FieldSpec::new("done", ElementType::U8, vec![]).unwrap();
        assert_eq!(spec.unit_size(), 1);
        assert!(spec.shape().is_empty());
    }

    #[test]
    fn test_scalar_constructor() {
        let spec = FieldSpec::scalar("reward", ElementType::F64);
        assert_eq!(spec.unit_size(), 1);
        assert_eq!(spec.shape(), &[1]);
        assert_eq!(spec.name(), "reward");
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let err = FieldSpec::new("obs", ElementType::F32, vec![4, 0, 2]).unwrap_err();
        assert!(err.to_string().contains("axis 1"));
    }

    #[test]
    fn test_element_type_display() {
        assert_eq!(ElementType::F32.to_string(), "f32");
        assert_eq!(ElementType::U8.to_string(), "u8");
    }
}
