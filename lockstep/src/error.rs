//! Error types for the lockstep ring buffer.

use thiserror::Error;

use crate::field::ElementType;

/// The main error type for all lockstep operations.
///
/// Every failure is a precondition violation reported synchronously to the
/// caller: an operation either fully succeeds or fails before committing any
/// mutation. There are no transient conditions and nothing to retry.
#[derive(Error, Debug)]
pub enum LockstepError {
    /// Error validating a field specification at construction.
    #[error("field error: {0}")]
    Field(#[from] FieldError),

    /// Error sizing or resizing a typed series.
    #[error("series error: {0}")]
    Series(#[from] SeriesError),

    /// Error during an append operation (write path).
    #[error("append error: {0}")]
    Append(#[from] AppendError),

    /// Error during a sample or fetch operation (read path).
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
}

/// Errors that can occur when declaring fields.
#[derive(Error, Debug)]
pub enum FieldError {
    /// A shape dimension is zero.
    #[error("field '{field}' has invalid dimension {size} at axis {axis} (must be >= 1)")]
    InvalidDimension {
        /// The field being declared.
        field: String,
        /// The axis with the bad dimension.
        axis: usize,
        /// The offending dimension size.
        size: usize,
    },

    /// Two fields were declared with the same name.
    #[error("duplicate field name '{name}'")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },
}

/// Errors that can occur when allocating or growing series storage.
#[derive(Error, Debug)]
pub enum SeriesError {
    /// A series was created with zero capacity.
    #[error("initial capacity must be >= 1")]
    ZeroCapacity,

    /// A series was asked to grow by zero slots.
    #[error("additional slots must be >= 1")]
    ZeroGrowth,
}

/// Errors that can occur during append operations (write path).
#[derive(Error, Debug)]
pub enum AppendError {
    /// The batch omits a declared field.
    #[error("batch is missing declared field '{field}'")]
    MissingField {
        /// The declared field absent from the batch.
        field: String,
    },

    /// The batch names a field that was never declared.
    #[error("batch names undeclared field '{field}'")]
    UnknownField {
        /// The undeclared name.
        field: String,
    },

    /// The batch provides the same field twice.
    #[error("batch provides field '{field}' more than once")]
    DuplicateField {
        /// The repeated name.
        field: String,
    },

    /// The batch array's element type does not match the declared field.
    #[error("field '{field}' expects {expected} elements, batch provides {actual}")]
    TypeMismatch {
        /// The field being appended.
        field: String,
        /// The element type declared for the field.
        expected: ElementType,
        /// The element type found in the batch.
        actual: ElementType,
    },

    /// The batch array's scalar count is not a whole number of elements.
    #[error(
        "field '{field}' batch holds {scalars} scalars, not a multiple of element size {unit_size}"
    )]
    RaggedLength {
        /// The field being appended.
        field: String,
        /// The scalar count supplied.
        scalars: usize,
        /// Scalars per element for this field.
        unit_size: usize,
    },

    /// Batch fields disagree on the number of elements.
    #[error("field '{field}' provides {actual} elements, batch started with {expected}")]
    SizeMismatch {
        /// The field with the diverging count.
        field: String,
        /// The element count of the first batch entry.
        expected: usize,
        /// The element count of this entry.
        actual: usize,
    },

    /// The appended buffer's field layout does not match this buffer.
    #[error("buffer layouts differ: {reason}")]
    LayoutMismatch {
        /// What differs between the two layouts.
        reason: String,
    },
}

/// Errors that can occur during sample and fetch operations (read path).
#[derive(Error, Debug)]
pub enum FetchError {
    /// A read request names a field that was never declared.
    #[error("request names undeclared field '{field}'")]
    UnknownField {
        /// The undeclared name.
        field: String,
    },

    /// Two read requests in one call target the same output name.
    #[error("duplicate output name '{output}'")]
    DuplicateOutput {
        /// The repeated output name.
        output: String,
    },

    /// A random sample asked for more draws than there are occupied slots.
    #[error("cannot sample {requested} slots, only {available} occupied")]
    InsufficientData {
        /// The requested draw count.
        requested: usize,
        /// The current occupied slot count.
        available: usize,
    },

    /// A fetch addressed slots beyond the occupied range.
    #[error("fetch of {length} slot(s) at index {index} exceeds occupied count {occupied}")]
    OutOfRange {
        /// The requested start index.
        index: usize,
        /// The requested slot count.
        length: usize,
        /// The current occupied slot count.
        occupied: usize,
    },

    /// A reordered batch sample was requested with a zero batch size.
    #[error("batch size must be >= 1")]
    ZeroBatchSize,
}

/// Type alias for `Result<T, LockstepError>`.
pub type Result<T> = std::result::Result<T, LockstepError>;
