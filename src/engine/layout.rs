//! Column layout math for the single-allocation storage block.
//!
//! The block holds one contiguous run per column: column `i` occupies
//! `capacity * size_i` bytes starting at the cumulative size of the
//! preceding columns, each base rounded up to the field's alignment. The
//! offsets are a **pure function of the current capacity** — they are
//! recomputed on demand whenever they are needed and never stored per
//! column, so a capacity change implicitly relocates every column base.
//!
//! All arithmetic is overflow-checked; a capacity whose layout cannot be
//! represented surfaces as [`CapacityOverflowError`].

use std::alloc::Layout;

use smallvec::SmallVec;

use crate::engine::error::CapacityOverflowError;
use crate::engine::schema::Schema;
use crate::engine::types::FIELD_CAP;

/// Inline buffer of per-column byte offsets, one entry per schema field.
pub type ColumnOffsets = SmallVec<[usize; FIELD_CAP]>;

/// The computed layout of a storage block at one specific capacity.
#[derive(Debug)]
pub struct BlockLayout {
    /// Byte offset of each column's base within the block, schema order.
    pub offsets: ColumnOffsets,
    /// Allocation layout of the whole block. `size` may be zero (empty
    /// capacity or all-zero-sized schema); callers skip the allocator in
    /// that case.
    pub layout: Layout,
}

/// Computes the block layout for `schema` at `capacity` row slots.
///
/// # Errors
/// Returns [`CapacityOverflowError`] if any intermediate byte count
/// overflows `usize` or exceeds the allocator's size limit.
pub fn block_layout(schema: &Schema, capacity: usize) -> Result<BlockLayout, CapacityOverflowError> {
    let overflow = CapacityOverflowError { capacity };
    let mut offsets = ColumnOffsets::with_capacity(schema.field_count());
    let mut cursor = 0usize;
    for field in schema.fields() {
        let base = align_up(cursor, field.align()).ok_or(overflow)?;
        offsets.push(base);
        let column_bytes = field.size().checked_mul(capacity).ok_or(overflow)?;
        cursor = base.checked_add(column_bytes).ok_or(overflow)?;
    }
    let layout = Layout::from_size_align(cursor, schema.max_align()).map_err(|_| overflow)?;
    Ok(BlockLayout { offsets, layout })
}

/// Rounds `value` up to the next multiple of `align` (a power of two).
#[inline]
fn align_up(value: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    let mask = align - 1;
    Some(value.checked_add(mask)? & !mask)
}
