//! # lockstep
//!
//! In-memory multi-field ring buffer for lockstep trajectory storage.
//!
//! lockstep stores several named, independently-typed, multi-dimensional
//! data series in lockstep: slot `i` holds one element of every declared
//! field simultaneously — observation, action, and reward of timestep `i`
//! always travel together. It is built for reinforcement-learning replay
//! and rollout storage but carries no RL-specific logic of its own.
//!
//! ## Key Properties
//!
//! - Amortized O(1) append with automatic lockstep capacity growth
//! - Optional bounded mode: oldest slots overwritten once `max_count` is
//!   reached
//! - Three read patterns over one addressing scheme: random sampling with
//!   per-field temporal offsets, direct indexed fetches, and epoch-shuffled
//!   no-replacement batching
//! - Closed scalar type set dispatched by tag — no runtime type reflection
//! - Copy-in/copy-out only: internal storage is never aliased to callers
//!
//! ## Quick Start
//!
//! ```rust
//! use lockstep::{ElementType, FieldSpec, ReadRequest, RingBuffer};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! # fn main() -> lockstep::Result<()> {
//! // Keep the most recent 10_000 transitions.
//! let mut buffer = RingBuffer::new(10_000, vec![
//!     FieldSpec::new("obs", ElementType::F32, vec![4])?,
//!     FieldSpec::scalar("action", ElementType::I32),
//!     FieldSpec::scalar("reward", ElementType::F32),
//! ])?;
//!
//! // Append a batch of 2 slots across every field.
//! buffer.append(&[
//!     ("obs", vec![0.1f32, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8].into()),
//!     ("action", vec![0i32, 3].into()),
//!     ("reward", vec![1.0f32, -0.5].into()),
//! ])?;
//!
//! // Sample transitions; offset 1 fetches the next state of each draw.
//! let mut rng = StdRng::seed_from_u64(42);
//! let batch = buffer.random_sample(&mut rng, 2, &[
//!     ReadRequest::new("obs"),
//!     ReadRequest::new("obs").with_offset(1).with_output("obs_next"),
//!     ReadRequest::new("reward"),
//! ])?;
//! assert_eq!(batch["obs"].shape(), &[2, 4]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`RingBuffer`] — owns all series and the shared cursor state; the only
//!   component that understands alignment, wraparound, and growth
//! - [`TypedSeries`] — contiguous growable storage for a single field
//! - [`FieldSpec`] / [`ElementType`] — field declarations over a closed
//!   scalar type set
//! - [`ElementArray`] / [`FieldArray`] — typed arrays crossing the API
//!   boundary
//!
//! ## Modules
//!
//! For lower-level access, the individual modules are also public:
//!
//! - [`ring`] — the aligned ring buffer and read requests
//! - [`series`] — typed per-field storage
//! - [`field`] — field and element type declarations
//! - [`array`] — typed scalar arrays
//! - [`error`] — error types

pub mod array;
pub mod error;
pub mod field;
pub mod ring;
pub mod series;

// Re-export primary API types at crate root for convenience.
pub use array::{ElementArray, FieldArray};
pub use error::{LockstepError, Result};
pub use field::{ElementType, FieldSpec};
pub use ring::{ReadRequest, RingBuffer};
pub use series::TypedSeries;
