//! # SoA Engine
//!
//! A generic structure-of-arrays (SoA) container: a fixed, ordered set of
//! distinct field types, one row per logical entity, every field stored
//! contiguously in its own column inside a single allocation.
//!
//! ## Design Goals
//! - Cache-friendly bulk access to individual fields
//! - An index-addressable, row-oriented API over column-major storage
//! - Exact, caller-controlled capacity (no hidden geometric growth)
//! - Type-safe field-subset selection that preserves row correspondence
//!
//! ## Quick start
//! ```rust
//! use soa_engine::prelude::*;
//!
//! #[derive(Clone, Copy, Debug, PartialEq)]
//! struct Id(u64);
//! #[derive(Clone, Copy, Debug, PartialEq)]
//! struct Score(f32);
//!
//! let mut v: Soa<(Id, Score)> = Soa::new();
//! v.push_back((Id(1), Score(10.0)));
//! v.push_back((Id(2), Score(5.0)));
//! v.push_back((Id(3), Score(8.0)));
//!
//! v.sort_by(|a: &Score, b: &Score| a.0 < b.0);
//! assert_eq!(v.get_single::<Id>(0), &Id(2));
//!
//! v.for_each::<(Score,), _>(|score| score.0 *= 2.0);
//! assert_eq!(v.get_single::<Score>(2), &Score(20.0));
//! ```
//!
//! ## Concurrency
//! The container is single-threaded by design: no internal locking, no
//! atomics. Concurrent read-only access is safe only while no thread
//! mutates. Any operation that may reallocate invalidates all previously
//! obtained references, pointers, and iterators.

#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![deny(dead_code)]

pub mod engine;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

// Core container types

pub use engine::soa::Soa;

pub use engine::schema::{
    FieldList,
    Schema,
};

pub use engine::select::{
    Select,
    SelectClone,
};

pub use engine::iter::{
    Iter,
    IterMut,
    CursorMut,
};

pub use engine::error::{
    SoaResult,
    SchemaError,
    DuplicateFieldError,
    UnknownFieldError,
    CapacityOverflowError,
};

pub use engine::types::{
    FieldInfo,
    RelocationStrategy,
    RowIndex,
    FieldIndex,
    FIELD_CAP,
};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude (Optional but recommended)
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used container types.
///
/// Import with:
/// ```rust
/// use soa_engine::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Soa,
        FieldList,
        Select,
        SelectClone,
        Schema,
    };
}
