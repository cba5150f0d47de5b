//! Raw storage block and growth management.
//!
//! This module owns the container's single allocation. A [`RawBlock`] is a
//! type-erased byte buffer holding every column of a schema back to back,
//! each column's base computed from the **current capacity** by
//! [`layout::block_layout`]. The block knows nothing about which rows are
//! live — the container above it tracks length and tells the block how
//! many rows to carry across a reallocation.
//!
//! # Growth model
//!
//! Growth is **exact**: [`RawBlock::grow_to`] reallocates to precisely the
//! requested capacity, relocates each column's live prefix from its old
//! offset (computed against the old capacity) to its new offset (computed
//! against the new capacity), and frees the old allocation. There is no
//! geometric over-allocation; the capacity a caller requests is the
//! capacity it observes.
//!
//! # Relocation strategies
//!
//! Columns move under one of two named strategies, selected per field by
//! its [`RelocationStrategy`]:
//!
//! - **`Bulk`** — the whole live run is one raw byte copy
//!   (`copy_nonoverlapping` across blocks, `copy` within a block).
//! - **`PerElement`** — elements move one at a time as individual bitwise
//!   moves; within a block the walk direction is chosen so that no source
//!   slot is overwritten before it is read.
//!
//! # Safety and invariants
//!
//! Soundness relies on maintaining these invariants:
//!
//! - `layout` always describes the current allocation; a zero-sized layout
//!   means no allocation exists and `data` is an aligned sentinel that is
//!   never read or written through for sized data.
//! - Column base pointers derived from the block are properly aligned for
//!   their field type (guaranteed by [`layout::block_layout`]).
//! - The first `live_rows` elements of every column are initialized when
//!   `grow_to` runs; nothing else in the block is ever treated as
//!   initialized.
//!
//! No method exposes references; the container layer is responsible for
//! turning column pointers into borrows with correct lifetimes.

use std::alloc::{alloc, dealloc, handle_alloc_error};
use std::ptr;

use smallvec::SmallVec;

use crate::engine::layout::{self, ColumnOffsets};
use crate::engine::schema::Schema;
use crate::engine::types::{FieldIndex, FieldInfo, RelocationStrategy, RowIndex, FIELD_CAP};

/// Inline buffer of column base pointers, one entry per schema field.
pub(crate) type ColumnPtrs = SmallVec<[*mut u8; FIELD_CAP]>;

/// The container's single allocation: every column, back to back.
pub(crate) struct RawBlock {
    data: *mut u8,
    capacity: usize,
    layout: std::alloc::Layout,
}

impl RawBlock {
    /// Creates an empty block: capacity 0, no allocation.
    pub fn new(schema: &Schema) -> Self {
        let empty = match layout::block_layout(schema, 0) {
            Ok(block) => block.layout,
            // Zero columns of zero rows cannot overflow.
            Err(_) => unreachable!("zero-capacity layout cannot overflow"),
        };
        Self {
            data: empty_sentinel(schema),
            capacity: 0,
            layout: empty,
        }
    }

    /// Allocated row slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Byte offsets of every column base at the current capacity.
    ///
    /// Offsets are recomputed on every call; they are a pure function of
    /// capacity and are never cached per column.
    #[inline]
    pub fn offsets(&self, schema: &Schema) -> ColumnOffsets {
        match layout::block_layout(schema, self.capacity) {
            Ok(block) => block.offsets,
            // The same computation succeeded when this capacity was
            // allocated, so it cannot fail here.
            Err(_) => unreachable!("layout re-computation failed for an allocated capacity"),
        }
    }

    /// Base pointer of column `field`, valid for `capacity` element slots.
    #[inline]
    pub fn column_ptr(&self, schema: &Schema, field: FieldIndex) -> *mut u8 {
        let offsets = self.offsets(schema);
        // Pointer math on the sentinel is fine: offsets are all zero when
        // nothing is allocated.
        self.data.wrapping_add(offsets[field])
    }

    /// Base pointers of every column, schema order.
    #[inline]
    pub fn column_ptrs(&self, schema: &Schema) -> ColumnPtrs {
        self.offsets(schema)
            .iter()
            .map(|&offset| self.data.wrapping_add(offset))
            .collect()
    }

    /// Reallocates to exactly `new_capacity` row slots, carrying the first
    /// `live_rows` rows of every column across.
    ///
    /// A request for the current capacity is a no-op.
    ///
    /// # Panics
    /// Panics if the layout for `new_capacity` cannot be represented.
    /// Allocation failure is reported through
    /// [`std::alloc::handle_alloc_error`].
    ///
    /// # Safety
    /// The first `live_rows` elements of every column must be initialized,
    /// and `live_rows <= new_capacity`. After the call those rows live at
    /// the new offsets; all other slots are uninitialized.
    pub unsafe fn grow_to(&mut self, schema: &Schema, live_rows: usize, new_capacity: usize) {
        debug_assert!(live_rows <= new_capacity);
        if new_capacity == self.capacity {
            return;
        }

        let new_block = match layout::block_layout(schema, new_capacity) {
            Ok(block) => block,
            Err(e) => panic!("{e}"),
        };
        let new_data = if new_block.layout.size() == 0 {
            empty_sentinel(schema)
        } else {
            // SAFETY: layout has non-zero size.
            let raw = unsafe { alloc(new_block.layout) };
            if raw.is_null() {
                handle_alloc_error(new_block.layout);
            }
            raw
        };

        if live_rows > 0 {
            let old_offsets = self.offsets(schema);
            for (index, field) in schema.fields().iter().enumerate() {
                // SAFETY: both pointers address `live_rows` properly
                // aligned element slots of `field`'s type, in disjoint
                // allocations; the source elements are initialized per the
                // caller contract.
                unsafe {
                    relocate_disjoint(
                        field,
                        self.data.add(old_offsets[index]),
                        new_data.add(new_block.offsets[index]),
                        live_rows,
                    );
                }
            }
        }

        if self.layout.size() > 0 {
            // SAFETY: `data`/`layout` describe the live allocation.
            unsafe { dealloc(self.data, self.layout) };
        }
        self.data = new_data;
        self.capacity = new_capacity;
        self.layout = new_block.layout;
    }

    /// Relocates `count` rows from `src_row` to `dest_row` in every
    /// column, in place. Regions may overlap; each column is processed
    /// with its field's strategy in an overlap-safe direction.
    ///
    /// # Safety
    /// `src_row + count` and `dest_row + count` must not exceed the
    /// capacity, rows `src_row..src_row + count` must be initialized in
    /// every column, and the destination slots must be dead (moved out or
    /// destroyed). After the call the source slots are dead except where
    /// they overlap the destination.
    pub unsafe fn shift_rows(
        &mut self,
        schema: &Schema,
        dest_row: RowIndex,
        src_row: RowIndex,
        count: usize,
    ) {
        debug_assert!(src_row.max(dest_row) + count <= self.capacity);
        if count == 0 || dest_row == src_row {
            return;
        }
        let offsets = self.offsets(schema);
        for (index, field) in schema.fields().iter().enumerate() {
            let column = self.data.wrapping_add(offsets[index]);
            // SAFETY: per the method contract; both runs stay inside this
            // column's `capacity * size` region.
            unsafe {
                relocate_within(
                    field,
                    column.add(src_row * field.size()),
                    column.add(dest_row * field.size()),
                    count,
                );
            }
        }
    }
}

impl Drop for RawBlock {
    fn drop(&mut self) {
        if self.layout.size() > 0 {
            // SAFETY: `data`/`layout` describe the live allocation. Live
            // elements were destroyed by the owning container before the
            // block is dropped.
            unsafe { dealloc(self.data, self.layout) };
        }
    }
}

/// Aligned non-null placeholder used while no allocation exists.
///
/// Never dereferenced for sized data: with capacity 0 every bounds check
/// fails first, and zero-sized fields may be read through any aligned
/// non-null pointer.
#[inline]
fn empty_sentinel(schema: &Schema) -> *mut u8 {
    schema.max_align() as *mut u8
}

/// Moves `count` elements between disjoint allocations.
///
/// # Safety
/// `src` and `dst` must be properly aligned for the field type, address
/// `count` element slots each, and not overlap. Source elements must be
/// initialized; they are dead after the call.
unsafe fn relocate_disjoint(field: &FieldInfo, src: *const u8, dst: *mut u8, count: usize) {
    let bytes = count * field.size();
    match field.relocation() {
        RelocationStrategy::Bulk => {
            // SAFETY: disjoint per the contract.
            unsafe { ptr::copy_nonoverlapping(src, dst, bytes) };
        }
        RelocationStrategy::PerElement => {
            let size = field.size();
            for element in 0..count {
                // SAFETY: element slots are disjoint between the two
                // allocations; each move is a plain bitwise relocation.
                unsafe {
                    ptr::copy_nonoverlapping(src.add(element * size), dst.add(element * size), size);
                }
            }
        }
    }
}

/// Moves `count` elements within one allocation; regions may overlap.
///
/// The per-element walk direction is chosen so no source slot is
/// overwritten before it has been read: moving toward higher addresses
/// walks back to front, moving toward lower addresses walks front to
/// back.
///
/// # Safety
/// Same as [`relocate_disjoint`] except overlap is permitted. `src` and
/// `dst` must be offset by a whole number of elements so individual
/// element slots never partially overlap.
unsafe fn relocate_within(field: &FieldInfo, src: *const u8, dst: *mut u8, count: usize) {
    let size = field.size();
    match field.relocation() {
        RelocationStrategy::Bulk => {
            // SAFETY: `ptr::copy` has memmove semantics.
            unsafe { ptr::copy(src, dst, count * size) };
        }
        RelocationStrategy::PerElement => {
            if (dst as usize) < (src as usize) {
                for element in 0..count {
                    // SAFETY: destination slots trail the read cursor.
                    unsafe {
                        ptr::copy_nonoverlapping(
                            src.add(element * size),
                            dst.add(element * size),
                            size,
                        );
                    }
                }
            } else {
                for element in (0..count).rev() {
                    // SAFETY: destination slots lead the read cursor.
                    unsafe {
                        ptr::copy_nonoverlapping(
                            src.add(element * size),
                            dst.add(element * size),
                            size,
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_column<T: Copy>(block: &RawBlock, schema: &Schema, field: FieldIndex, len: usize) -> Vec<T> {
        let ptr = block.column_ptr(schema, field).cast::<T>();
        (0..len).map(|i| unsafe { ptr.add(i).read() }).collect()
    }

    #[test]
    fn grow_relocates_live_rows_to_new_offsets() {
        let schema = Schema::new::<(u8, u64)>().unwrap();
        let mut block = RawBlock::new(&schema);
        unsafe { block.grow_to(&schema, 0, 3) };
        assert_eq!(block.capacity(), 3);

        unsafe {
            let bytes = block.column_ptr(&schema, 0);
            let words = block.column_ptr(&schema, 1).cast::<u64>();
            for i in 0..3 {
                bytes.add(i).write(i as u8 + 1);
                words.add(i).write((i as u64 + 1) * 100);
            }
            block.grow_to(&schema, 3, 7);
        }

        assert_eq!(block.capacity(), 7);
        assert_eq!(read_column::<u8>(&block, &schema, 0, 3), vec![1, 2, 3]);
        assert_eq!(read_column::<u64>(&block, &schema, 1, 3), vec![100, 200, 300]);
    }

    #[test]
    fn shift_rows_handles_overlap_in_both_directions() {
        let schema = Schema::new::<(u32,)>().unwrap();
        let mut block = RawBlock::new(&schema);
        unsafe { block.grow_to(&schema, 0, 8) };
        let ptr = block.column_ptr(&schema, 0).cast::<u32>();
        unsafe {
            for i in 0..6 {
                ptr.add(i).write(i as u32);
            }
            // Right shift [1, 5) by one: overlapping, toward higher rows.
            block.shift_rows(&schema, 2, 1, 4);
        }
        assert_eq!(read_column::<u32>(&block, &schema, 0, 6), vec![0, 1, 1, 2, 3, 4]);

        unsafe {
            // Left shift [2, 6) by two: overlapping, toward lower rows.
            block.shift_rows(&schema, 0, 2, 4);
        }
        assert_eq!(read_column::<u32>(&block, &schema, 0, 4), vec![1, 2, 3, 4]);
    }

    #[test]
    fn growing_to_zero_frees_the_allocation() {
        let schema = Schema::new::<(u64,)>().unwrap();
        let mut block = RawBlock::new(&schema);
        unsafe {
            block.grow_to(&schema, 0, 16);
            block.grow_to(&schema, 0, 0);
        }
        assert_eq!(block.capacity(), 0);
    }
}
