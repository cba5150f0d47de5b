//! Error types for schema construction and typed field access.
//!
//! This module declares focused, composable error types used across the
//! container engine. Each error carries enough context to make failures
//! actionable while remaining small and cheap to pass around or convert
//! into the aggregate [`SchemaError`].
//!
//! ## Goals
//! * **Specificity:** Each error type models a single failure mode (a
//!   duplicated field type, an unknown field type, layout arithmetic
//!   overflow).
//! * **Ergonomics:** All errors implement [`std::error::Error`] and
//!   [`fmt::Display`], and provide `From<T>` conversions into the
//!   aggregate enum.
//! * **Actionability:** Structured fields (offending type names, requested
//!   row counts) make failure messages useful without a debugger.
//!
//! ## Typical flow
//! Fallible construction paths ([`Soa::try_new`], capacity pre-checks)
//! return these errors through [`SoaResult`] with `?`. The infallible
//! convenience paths ([`Soa::new`], the panicking accessors) format the
//! same error values into their panic messages, so both surfaces report
//! identically.
//!
//! ## Display vs. Debug
//! * [`fmt::Display`] is optimized for operator-facing messages (short,
//!   imperative phrasing).
//! * [`fmt::Debug`] (derived) retains full structure for diagnostics.
//!
//! [`Soa::try_new`]: crate::engine::soa::Soa::try_new
//! [`Soa::new`]: crate::engine::soa::Soa::new

use std::fmt;

/// Convenient alias for results produced by fallible container operations.
pub type SoaResult<T> = Result<T, SchemaError>;

/// Returned when a schema declares the same field type more than once.
///
/// Field types double as column names: a duplicate would make typed access
/// ambiguous, so schema construction rejects it outright.
///
/// ### Fields
/// * `type_name` — The field type that appeared twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateFieldError {
    /// Name of the field type that appears more than once.
    pub type_name: &'static str,
}

impl fmt::Display for DuplicateFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field type {} appears more than once in schema", self.type_name)
    }
}

impl std::error::Error for DuplicateFieldError {}

/// Returned when typed access names a field type absent from the schema.
///
/// Raised by field-subset resolution (accessors, iterators, `for_each`,
/// sort-key lookup). In the infallible access paths this is reported as a
/// panic carrying the same message.
///
/// ### Fields
/// * `type_name` — The requested field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownFieldError {
    /// Name of the requested field type.
    pub type_name: &'static str,
}

impl fmt::Display for UnknownFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field type {} does not appear in schema", self.type_name)
    }
}

impl std::error::Error for UnknownFieldError {}

/// Returned when the byte layout for a requested capacity cannot be
/// represented.
///
/// The storage block is one allocation of `capacity x row_bytes` (plus
/// per-column alignment padding); this error reports the capacity whose
/// layout arithmetic overflowed `usize` or exceeded the allocator's limit.
///
/// ### Fields
/// * `capacity` — The requested number of row slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityOverflowError {
    /// Requested row capacity whose layout could not be computed.
    pub capacity: usize,
}

impl fmt::Display for CapacityOverflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "storage layout overflow for capacity {}", self.capacity)
    }
}

impl std::error::Error for CapacityOverflowError {}

/// Aggregate error for schema construction and layout failures.
///
/// Lower layers return the dedicated error types above; `?` bubbles them
/// into this enum at the public API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaError {
    /// A field type appears more than once in the schema.
    Duplicate(DuplicateFieldError),
    /// A requested field type is absent from the schema.
    Unknown(UnknownFieldError),
    /// Layout arithmetic overflowed for a requested capacity.
    CapacityOverflow(CapacityOverflowError),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Duplicate(e) => e.fmt(f),
            SchemaError::Unknown(e) => e.fmt(f),
            SchemaError::CapacityOverflow(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchemaError::Duplicate(e) => Some(e),
            SchemaError::Unknown(e) => Some(e),
            SchemaError::CapacityOverflow(e) => Some(e),
        }
    }
}

impl From<DuplicateFieldError> for SchemaError {
    fn from(e: DuplicateFieldError) -> Self {
        SchemaError::Duplicate(e)
    }
}

impl From<UnknownFieldError> for SchemaError {
    fn from(e: UnknownFieldError) -> Self {
        SchemaError::Unknown(e)
    }
}

impl From<CapacityOverflowError> for SchemaError {
    fn from(e: CapacityOverflowError) -> Self {
        SchemaError::CapacityOverflow(e)
    }
}
