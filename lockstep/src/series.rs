//! Typed per-field storage for the lockstep ring buffer.
//!
//! A [`TypedSeries`] owns one contiguous, growable store of fixed-shape
//! elements for a single field. It knows its own capacity and element shape
//! and nothing about sibling fields: alignment across fields is the ring
//! buffer's job, and the series only exposes slot-range copy primitives for
//! it to drive.
//!
//! A series never shrinks. Growth reallocates and copies the existing
//! contents into the low slots of the new store; once `grow` returns, no
//! reference to the old allocation survives.

use serde::{Deserialize, Serialize};

use crate::array::ElementArray;
use crate::error::{Result, SeriesError};
use crate::field::FieldSpec;

/// Growable storage for one field, shaped `[capacity, element shape...]`.
///
/// `capacity` counts allocated slots, not occupied ones — occupancy is
/// tracked by the owning buffer, shared across all its series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedSeries {
    /// The field this series stores.
    spec: FieldSpec,
    /// Number of allocated slots.
    capacity: usize,
    /// Backing scalar storage, `capacity * unit_size` scalars.
    data: ElementArray,
}

impl TypedSeries {
    /// Allocates a series with `initial_capacity` zero-filled slots.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::ZeroCapacity`] if `initial_capacity < 1`.
    pub fn new(spec: FieldSpec, initial_capacity: usize) -> Result<Self> {
        if initial_capacity < 1 {
            return Err(SeriesError::ZeroCapacity.into());
        }
        let data = ElementArray::zeros(spec.element_type(), initial_capacity * spec.unit_size());
        Ok(Self {
            spec,
            capacity: initial_capacity,
            data,
        })
    }

    /// Grows the series by `additional_slots`, preserving existing contents.
    ///
    /// This is the only resize primitive and it never truncates: the old
    /// contents land in the low slots of the new store.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::ZeroGrowth`] if `additional_slots < 1`.
    pub fn grow(&mut self, additional_slots: usize) -> Result<()> {
        if additional_slots < 1 {
            return Err(SeriesError::ZeroGrowth.into());
        }
        let new_capacity = self.capacity + additional_slots;
        let mut new_data =
            ElementArray::zeros(self.spec.element_type(), new_capacity * self.spec.unit_size());
        new_data.copy_scalars(0, &self.data, 0, self.data.len());
        self.data = new_data;
        self.capacity = new_capacity;
        Ok(())
    }

    /// Returns the number of allocated slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the field declaration this series stores.
    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    /// Copies `slots` elements from `src` (starting at its slot `src_slot`)
    /// into storage starting at slot `dst_slot`.
    ///
    /// The caller supplies slot ranges already validated against capacity
    /// and an array of the series' own element type.
    pub(crate) fn copy_in(
        &mut self,
        dst_slot: usize,
        src: &ElementArray,
        src_slot: usize,
        slots: usize,
    ) {
        let unit = self.spec.unit_size();
        self.data
            .copy_scalars(dst_slot * unit, src, src_slot * unit, slots * unit);
    }

    /// Copies `slots` elements from storage (starting at slot `src_slot`)
    /// into `dst` starting at its slot `dst_slot`.
    pub(crate) fn copy_out(
        &self,
        src_slot: usize,
        dst: &mut ElementArray,
        dst_slot: usize,
        slots: usize,
    ) {
        let unit = self.spec.unit_size();
        dst.copy_scalars(dst_slot * unit, &self.data, src_slot * unit, slots * unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ElementType;

    fn vec_spec() -> FieldSpec {
        FieldSpec::new("obs", ElementType::F32, vec![2]).unwrap()
    }

    #[test]
    fn test_new_allocates_slots() {
        let series = TypedSeries::new(vec_spec(), 4).unwrap();
        assert_eq!(series.capacity(), 4);
        assert_eq!(series.spec().unit_size(), 2);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(TypedSeries::new(vec_spec(), 0).is_err());
    }

    #[test]
    fn test_grow_preserves_low_slots() {
        let mut series = TypedSeries::new(vec_spec(), 2).unwrap();
        let input = ElementArray::from(vec![1.0f32, 2.0, 3.0, 4.0]);
        series.copy_in(0, &input, 0, 2);

        series.grow(3).unwrap();
        assert_eq!(series.capacity(), 5);

        let mut out = ElementArray::zeros(ElementType::F32, 4);
        series.copy_out(0, &mut out, 0, 2);
        assert_eq!(out.as_f32(), Some(&[1.0, 2.0, 3.0, 4.0][..]));
    }

    #[test]
    fn test_zero_growth_rejected() {
        let mut series = TypedSeries::new(vec_spec(), 2).unwrap();
        assert!(series.grow(0).is_err());
        assert_eq!(series.capacity(), 2);
    }

    #[test]
    fn test_copy_in_at_offset() {
        let mut series = TypedSeries::new(vec_spec(), 3).unwrap();
        let input = ElementArray::from(vec![5.0f32, 6.0]);
        series.copy_in(2, &input, 0, 1);

        let mut out = ElementArray::zeros(ElementType::F32, 2);
        series.copy_out(2, &mut out, 0, 1);
        assert_eq!(out.as_f32(), Some(&[5.0, 6.0][..]));
    }
}
