//! Aligned multi-field ring buffer.
//!
//! This module provides the buffer that keeps every declared field in
//! lockstep: slot `i` holds one element of every field simultaneously, so a
//! trajectory timestep's observation, action, and reward always travel
//! together. The buffer owns one [`TypedSeries`] per field plus the single
//! set of cursor state shared by all of them; it is the only component that
//! understands slot alignment, wraparound, and growth.
//!
//! # Modes
//!
//! - **Bounded** (`max_count > 0`): every series is allocated at `max_count`
//!   slots up front and never grows. Once full, appends wrap around and
//!   overwrite the oldest slots.
//! - **Unbounded** (`max_count == 0`): series start at a small capacity and
//!   grow in lockstep with amortized doubling. Nothing is ever overwritten.
//!
//! # Reads
//!
//! All reads address *logical* indices `0..len()`, oldest to newest, and
//! accept a per-field temporal offset resolved by modular arithmetic over
//! the occupied range. The same base index drives every requested field of
//! one draw, so cross-field alignment survives wraparound and growth.
//!
//! # Thread Safety
//!
//! The buffer is not internally synchronized. It assumes a single logical
//! owner performs all mutation; concurrent reads during an append must be
//! prevented by the caller.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::array::{ElementArray, FieldArray};
use crate::error::{AppendError, FetchError, FieldError, Result};
use crate::field::FieldSpec;
use crate::series::TypedSeries;

/// Initial slot capacity for unbounded buffers.
const DEFAULT_INITIAL_CAPACITY: usize = 8;

/// One column of a read call: which field to fetch, at what temporal offset,
/// and under which output name to return it.
///
/// The offset is added to the logical base index of each draw and wrapped
/// over the occupied range, so `offset = 1` fetches "the next slot" (the
/// next state of a transition) and negative offsets look backwards.
///
/// # Example
///
/// ```rust
/// use lockstep::ReadRequest;
///
/// let state = ReadRequest::new("obs");
/// let next_state = ReadRequest::new("obs").with_offset(1).with_output("obs_next");
/// assert_eq!(next_state.output(), "obs_next");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    field: String,
    offset: i64,
    output: String,
}

impl ReadRequest {
    /// Requests `field` at offset 0, returned under its own name.
    pub fn new(field: impl Into<String>) -> Self {
        let field = field.into();
        let output = field.clone();
        Self {
            field,
            offset: 0,
            output,
        }
    }

    /// Sets the temporal offset added to each base index.
    #[must_use]
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the name the column is returned under.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Returns the requested field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the temporal offset.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Returns the output name.
    pub fn output(&self) -> &str {
        &self.output
    }
}

/// A request resolved against the buffer's field table.
struct Resolved {
    series: usize,
    offset: i64,
}

/// Named, independently-typed data series stored in lockstep under one set
/// of cursor state.
///
/// The field set is fixed at construction: fields can never be added or
/// removed afterwards, and every series always has the same slot capacity
/// (they are grown and wrapped together). All data enters by copy-in via
/// [`append`](RingBuffer::append) and leaves by copy-out via the read
/// operations; internal storage is never aliased to the caller.
///
/// # Example
///
/// ```rust
/// use lockstep::{ElementType, FieldSpec, ReadRequest, RingBuffer};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// # fn main() -> lockstep::Result<()> {
/// let mut buffer = RingBuffer::new(0, vec![
///     FieldSpec::new("obs", ElementType::F32, vec![2])?,
///     FieldSpec::scalar("reward", ElementType::F32),
/// ])?;
///
/// buffer.append(&[
///     ("obs", vec![0.1f32, 0.2, 0.3, 0.4].into()),
///     ("reward", vec![1.0f32, -1.0].into()),
/// ])?;
/// assert_eq!(buffer.len(), 2);
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let sample = buffer.random_sample(&mut rng, 2, &[
///     ReadRequest::new("obs"),
///     ReadRequest::new("reward"),
/// ])?;
/// assert_eq!(sample["obs"].shape(), &[2, 2]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingBuffer {
    /// One typed series per declared field, in declaration order.
    series: Vec<TypedSeries>,
    /// Field name to series index, assigned once at construction.
    index: HashMap<String, usize>,
    /// Maximum occupied slots; 0 means unbounded.
    max_count: usize,
    /// Next physical slot to write. Bounded mode keeps it in
    /// `[0, capacity)`; in unbounded mode it equals `occupied` and may
    /// momentarily equal `capacity` until the next append grows the series.
    write_cursor: usize,
    /// Number of logically valid slots.
    occupied: usize,
}

impl RingBuffer {
    /// Creates a buffer for the declared fields.
    ///
    /// With `max_count > 0` every series is allocated at `max_count` slots
    /// and the buffer overwrites its oldest slots once full. With
    /// `max_count == 0` the buffer grows as needed and never discards data.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::DuplicateName`] if two fields share a name.
    pub fn new(max_count: usize, fields: Vec<FieldSpec>) -> Result<Self> {
        let initial_capacity = if max_count > 0 {
            max_count
        } else {
            DEFAULT_INITIAL_CAPACITY
        };

        let mut index = HashMap::with_capacity(fields.len());
        let mut series = Vec::with_capacity(fields.len());
        for spec in fields {
            if index.contains_key(spec.name()) {
                return Err(FieldError::DuplicateName {
                    name: spec.name().to_string(),
                }
                .into());
            }
            index.insert(spec.name().to_string(), series.len());
            series.push(TypedSeries::new(spec, initial_capacity)?);
        }

        Ok(Self {
            series,
            index,
            max_count,
            write_cursor: 0,
            occupied: 0,
        })
    }

    /// Returns the number of logically valid slots.
    pub fn len(&self) -> usize {
        self.occupied
    }

    /// Returns `true` if no slots are occupied.
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Returns the number of allocated slots, identical across all fields.
    pub fn capacity(&self) -> usize {
        self.series.first().map_or(0, TypedSeries::capacity)
    }

    /// Returns the configured maximum occupied count; 0 means unbounded.
    pub fn max_count(&self) -> usize {
        self.max_count
    }

    /// Returns `true` if the buffer overwrites its oldest data once full.
    pub fn is_bounded(&self) -> bool {
        self.max_count > 0
    }

    /// Returns the next physical slot index to be written.
    pub fn write_cursor(&self) -> usize {
        self.write_cursor
    }

    /// Returns the declaration for `field`, if it exists.
    pub fn field_spec(&self, field: &str) -> Option<&FieldSpec> {
        self.index.get(field).map(|&i| self.series[i].spec())
    }

    /// Returns the field declarations in declaration order.
    pub fn field_specs(&self) -> impl Iterator<Item = &FieldSpec> {
        self.series.iter().map(TypedSeries::spec)
    }

    /// Appends a batch of `n` slots across every declared field.
    ///
    /// This is the single mutating entry point. Each batch entry is a field
    /// name and a row-major array shaped `[n, field shape...]`; all entries
    /// must agree on `n`. The whole batch is validated before any copy, so a
    /// failed append leaves the buffer untouched. `n == 0` is a no-op.
    ///
    /// In bounded mode a batch may wrap: the copy is split at the end of the
    /// allocation and the remainder overwrites the oldest slots. A single
    /// batch larger than `max_count` retains exactly its most recent
    /// `max_count` elements, as if the elements had been appended one by
    /// one. In unbounded mode every field is grown in lockstep first, so the
    /// copy never splits.
    ///
    /// # Errors
    ///
    /// - [`AppendError::UnknownField`] — an entry names an undeclared field
    /// - [`AppendError::DuplicateField`] — a field appears twice
    /// - [`AppendError::TypeMismatch`] — an entry's element type differs
    ///   from the declaration
    /// - [`AppendError::RaggedLength`] — an entry's scalar count is not a
    ///   whole number of elements
    /// - [`AppendError::SizeMismatch`] — entries disagree on `n`
    /// - [`AppendError::MissingField`] — a declared field has no entry
    pub fn append(&mut self, batch: &[(&str, ElementArray)]) -> Result<()> {
        let mut entries: Vec<(usize, &ElementArray)> = Vec::with_capacity(batch.len());
        let mut seen = vec![false; self.series.len()];
        let mut expected: Option<usize> = None;

        for (name, array) in batch {
            let Some(&idx) = self.index.get(*name) else {
                return Err(AppendError::UnknownField {
                    field: (*name).to_string(),
                }
                .into());
            };
            if seen[idx] {
                return Err(AppendError::DuplicateField {
                    field: (*name).to_string(),
                }
                .into());
            }
            seen[idx] = true;

            let spec = self.series[idx].spec();
            if array.element_type() != spec.element_type() {
                return Err(AppendError::TypeMismatch {
                    field: (*name).to_string(),
                    expected: spec.element_type(),
                    actual: array.element_type(),
                }
                .into());
            }
            if array.len() % spec.unit_size() != 0 {
                return Err(AppendError::RaggedLength {
                    field: (*name).to_string(),
                    scalars: array.len(),
                    unit_size: spec.unit_size(),
                }
                .into());
            }
            let slots = array.len() / spec.unit_size();
            match expected {
                None => expected = Some(slots),
                Some(n) if n != slots => {
                    return Err(AppendError::SizeMismatch {
                        field: (*name).to_string(),
                        expected: n,
                        actual: slots,
                    }
                    .into());
                }
                Some(_) => {}
            }
            entries.push((idx, array));
        }

        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(AppendError::MissingField {
                field: self.series[missing].spec().name().to_string(),
            }
            .into());
        }

        let n = expected.unwrap_or(0);
        if n == 0 {
            return Ok(());
        }

        if self.max_count > 0 {
            self.append_bounded(&entries, n);
        } else {
            self.append_unbounded(&entries, n)?;
        }
        Ok(())
    }

    /// Appends the occupied slots of `other`, oldest first.
    ///
    /// Both buffers must declare exactly the same fields (name, element
    /// type, and shape). The source is read through the same logical
    /// addressing as any other read, so its wraparound state is invisible
    /// here.
    ///
    /// # Errors
    ///
    /// Returns [`AppendError::LayoutMismatch`] if the field sets differ,
    /// plus any error `append` itself can produce.
    pub fn append_buffer(&mut self, other: &RingBuffer) -> Result<()> {
        if self.series.len() != other.series.len() {
            return Err(AppendError::LayoutMismatch {
                reason: format!(
                    "{} fields vs {} fields",
                    self.series.len(),
                    other.series.len()
                ),
            }
            .into());
        }
        for series in &self.series {
            let spec = series.spec();
            match other.field_spec(spec.name()) {
                Some(other_spec) if other_spec == spec => {}
                _ => {
                    return Err(AppendError::LayoutMismatch {
                        reason: format!("field '{}' differs or is absent", spec.name()),
                    }
                    .into());
                }
            }
        }

        let n = other.occupied;
        let mut batch: Vec<(&str, ElementArray)> = Vec::with_capacity(other.series.len());
        for other_series in &other.series {
            let spec = other_series.spec();
            let mut column = ElementArray::zeros(spec.element_type(), n * spec.unit_size());
            for j in 0..n {
                other_series.copy_out(other.physical(j, 0), &mut column, j, 1);
            }
            batch.push((spec.name(), column));
        }
        self.append(&batch)
    }

    /// Resets the cursor and occupied count, retaining allocated capacity.
    ///
    /// After `clear` the buffer behaves identically to a freshly constructed
    /// one of the same capacity; no storage is deallocated.
    pub fn clear(&mut self) {
        self.write_cursor = 0;
        self.occupied = 0;
    }

    /// Draws `count` slots uniformly at random, with replacement.
    ///
    /// Each draw picks one logical base index that drives every requested
    /// field, preserving cross-field alignment; per-request offsets are then
    /// applied modulo the occupied range. Returns one column per request,
    /// shaped `[count, field shape...]`, keyed by output name.
    ///
    /// The random source is supplied by the caller: seed it for
    /// reproducible sampling, or pass [`rand::rng()`] otherwise.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InsufficientData`] — `count` exceeds [`len`](Self::len)
    /// - [`FetchError::UnknownField`] / [`FetchError::DuplicateOutput`] —
    ///   malformed requests
    pub fn random_sample(
        &self,
        rng: &mut impl Rng,
        count: usize,
        requests: &[ReadRequest],
    ) -> Result<HashMap<String, FieldArray>> {
        if count > self.occupied {
            return Err(FetchError::InsufficientData {
                requested: count,
                available: self.occupied,
            }
            .into());
        }
        let bases: Vec<usize> = (0..count)
            .map(|_| rng.random_range(0..self.occupied))
            .collect();
        self.gather(requests, &bases)
    }

    /// Fetches the slot at logical `index`, shaped `[1, field shape...]`.
    ///
    /// Offsets wrap over the occupied range: with 4 occupied slots,
    /// `index = 3` at offset 1 resolves to logical index 0.
    ///
    /// # Errors
    ///
    /// - [`FetchError::OutOfRange`] — `index >= len()`
    /// - [`FetchError::UnknownField`] / [`FetchError::DuplicateOutput`] —
    ///   malformed requests
    pub fn fetch_at(
        &self,
        index: usize,
        requests: &[ReadRequest],
    ) -> Result<HashMap<String, FieldArray>> {
        if index >= self.occupied {
            return Err(FetchError::OutOfRange {
                index,
                length: 1,
                occupied: self.occupied,
            }
            .into());
        }
        self.gather(requests, &[index])
    }

    /// Fetches `length` consecutive logical slots starting at `index`.
    ///
    /// `length == 0` is explicitly a valid call and yields columns with zero
    /// rows, not an error, as long as `index` itself does not exceed the
    /// occupied count.
    ///
    /// # Errors
    ///
    /// - [`FetchError::OutOfRange`] — `index + length > len()`
    /// - [`FetchError::UnknownField`] / [`FetchError::DuplicateOutput`] —
    ///   malformed requests
    pub fn fetch_range(
        &self,
        index: usize,
        length: usize,
        requests: &[ReadRequest],
    ) -> Result<HashMap<String, FieldArray>> {
        if length > self.occupied || index > self.occupied - length {
            return Err(FetchError::OutOfRange {
                index,
                length,
                occupied: self.occupied,
            }
            .into());
        }
        let bases: Vec<usize> = (index..index + length).collect();
        self.gather(requests, &bases)
    }

    /// Produces an epoch-shuffled, no-replacement view of the buffer.
    ///
    /// Builds a uniform random permutation of the `usable =
    /// ⌊len() / batch_size⌋ × batch_size` oldest logical indices, truncates
    /// it to `max_batches × batch_size` rows when `max_batches > 0`, and
    /// returns one row per permuted index. Every retained index appears
    /// exactly once and batch boundaries fall on multiples of `batch_size`
    /// in the output; callers slice the result into batches themselves.
    ///
    /// # Errors
    ///
    /// - [`FetchError::ZeroBatchSize`] — `batch_size < 1`
    /// - [`FetchError::UnknownField`] / [`FetchError::DuplicateOutput`] —
    ///   malformed requests
    pub fn sample_batches_reordered(
        &self,
        rng: &mut impl Rng,
        batch_size: usize,
        max_batches: usize,
        requests: &[ReadRequest],
    ) -> Result<HashMap<String, FieldArray>> {
        if batch_size < 1 {
            return Err(FetchError::ZeroBatchSize.into());
        }
        let usable = (self.occupied / batch_size) * batch_size;
        let mut indices: Vec<usize> = (0..usable).collect();
        indices.shuffle(rng);
        if max_batches > 0 {
            indices.truncate(max_batches * batch_size);
        }
        self.gather(requests, &indices)
    }

    /// Maps a logical index plus offset to a physical slot.
    ///
    /// Valid logical slots are `0..occupied`, oldest to newest. Before any
    /// wraparound `write_cursor == occupied`, so this reduces to
    /// `(index + offset) mod occupied`; once a bounded buffer has wrapped,
    /// the cursor term rotates logical index 0 onto the oldest surviving
    /// slot. Must not be called while the buffer is empty.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)] // rem_euclid of a positive modulus
    fn physical(&self, index: usize, offset: i64) -> usize {
        debug_assert!(self.occupied > 0);
        let occupied = self.occupied as i64;
        let base = self.write_cursor as i64 - occupied + index as i64 + offset;
        base.rem_euclid(occupied) as usize
    }

    /// Validates requests and copies one element per (request, base) pair.
    fn gather(
        &self,
        requests: &[ReadRequest],
        bases: &[usize],
    ) -> Result<HashMap<String, FieldArray>> {
        let resolved = self.resolve(requests)?;
        let rows = bases.len();

        let mut result = HashMap::with_capacity(requests.len());
        for (request, target) in requests.iter().zip(&resolved) {
            let series = &self.series[target.series];
            let spec = series.spec();
            let mut column = ElementArray::zeros(spec.element_type(), rows * spec.unit_size());
            for (row, &base) in bases.iter().enumerate() {
                series.copy_out(self.physical(base, target.offset), &mut column, row, 1);
            }

            let mut shape = Vec::with_capacity(spec.shape().len() + 1);
            shape.push(rows);
            shape.extend_from_slice(spec.shape());
            result.insert(request.output.clone(), FieldArray::new(shape, column));
        }
        Ok(result)
    }

    /// Resolves request field names and rejects duplicate output names.
    fn resolve(&self, requests: &[ReadRequest]) -> Result<Vec<Resolved>> {
        let mut outputs: HashSet<&str> = HashSet::with_capacity(requests.len());
        let mut resolved = Vec::with_capacity(requests.len());
        for request in requests {
            let Some(&series) = self.index.get(request.field.as_str()) else {
                return Err(FetchError::UnknownField {
                    field: request.field.clone(),
                }
                .into());
            };
            if !outputs.insert(request.output.as_str()) {
                return Err(FetchError::DuplicateOutput {
                    output: request.output.clone(),
                }
                .into());
            }
            resolved.push(Resolved {
                series,
                offset: request.offset,
            });
        }
        Ok(resolved)
    }

    /// Bounded-mode copy: split at the end of the allocation and wrap.
    ///
    /// A batch of `n >= max_count` elements keeps only its most recent
    /// `max_count`; the skipped prefix would be overwritten within this same
    /// call anyway.
    fn append_bounded(&mut self, entries: &[(usize, &ElementArray)], n: usize) {
        let capacity = self.max_count;
        let (skip, take) = if n >= capacity {
            (n - capacity, capacity)
        } else {
            (0, n)
        };

        let start = (self.write_cursor + skip) % capacity;
        let head = take.min(capacity - start);
        let tail = take - head;
        for &(idx, array) in entries {
            let series = &mut self.series[idx];
            series.copy_in(start, array, skip, head);
            if tail > 0 {
                series.copy_in(0, array, skip + head, tail);
            }
        }

        self.write_cursor = (start + take) % capacity;
        self.occupied = (self.occupied + n).min(capacity);
    }

    /// Unbounded-mode copy: grow every field in lockstep, then append.
    ///
    /// Doubles the allocation unless the batch needs more than double, in
    /// which case it jumps straight to the needed size. The cursor equals
    /// the occupied count in this mode, so the copy never splits.
    fn append_unbounded(&mut self, entries: &[(usize, &ElementArray)], n: usize) -> Result<()> {
        let needed = self.occupied + n;
        let capacity = self.capacity();
        if needed > capacity {
            let additional = if needed > capacity * 2 {
                needed - capacity
            } else {
                capacity
            };
            for series in &mut self.series {
                series.grow(additional)?;
            }
        }

        let start = self.write_cursor;
        for &(idx, array) in entries {
            self.series[idx].copy_in(start, array, 0, n);
        }
        self.write_cursor += n;
        self.occupied += n;
        Ok(())
    }
}
