//! The structure-of-arrays container.
//!
//! [`Soa<S>`] stores one row per logical entity over the fixed field
//! schema `S`, but lays every field out contiguously in its own column
//! inside a single allocation. Callers see an index-addressable,
//! row-oriented API; computations that touch only a few fields iterate
//! those columns without dragging the rest of the row through the cache.
//!
//! # Capacity model
//!
//! `len` counts live rows, `capacity` counts allocated row slots, and
//! `0 <= len <= capacity` always holds. Growth is **exact**: a mutation
//! that needs room grows to precisely the minimum capacity it requires,
//! never more, so `capacity()` is an observable, caller-controlled
//! quantity. Repeated over-capacity appends therefore cost a relocation
//! each; callers that append in bulk should [`reserve`](Soa::reserve)
//! first.
//!
//! # Reference invalidation
//!
//! **Any operation that may reallocate the block — growth, shrinking,
//! `empty`, `reset` with a larger size, removals with `shrink_after` —
//! invalidates every reference, raw pointer, and iterator previously
//! obtained from the container.** The borrow checker enforces this for
//! references and iterators; raw pointers from
//! [`get_ptr`](Soa::get_ptr) are the caller's responsibility.
//!
//! # Concurrency
//!
//! The container performs no internal synchronization. Concurrent shared
//! reads are safe exactly while no thread mutates; anything else needs an
//! external wrapper.

use std::marker::PhantomData;

use smallvec::SmallVec;

use crate::engine::error::SoaResult;
use crate::engine::schema::{FieldList, Schema};
use crate::engine::select::{Select, SelectClone};
use crate::engine::storage::RawBlock;
use crate::engine::types::{RowIndex, FIELD_CAP};

/// Column base pointers resolved for a selection, in request order.
pub(crate) type ResolvedPtrs = SmallVec<[*mut u8; FIELD_CAP]>;

/// A structure-of-arrays container over the field schema `S`.
///
/// `S` is a tuple of distinct field types — `(Id, Score)`,
/// `(Position, Velocity, Health)` — fixed for the container's lifetime.
/// Rows have no identity beyond their current position: reordering
/// operations ([`remove_at_swap`](Soa::remove_at_swap),
/// [`sort_by`](Soa::sort_by)) freely rearrange which row occupies which
/// index.
///
/// ## Example
/// ```
/// use soa_engine::Soa;
///
/// let mut agents: Soa<(u64, f32)> = Soa::new();
/// agents.push_back((1, 10.0));
/// agents.push_back((2, 5.0));
///
/// assert_eq!(*agents.get_single::<f32>(1), 5.0);
/// agents.swap_remove(0);
/// assert_eq!(agents.len(), 1);
/// ```
pub struct Soa<S: FieldList> {
    block: RawBlock,
    schema: Schema,
    len: usize,
    marker: PhantomData<S>,
}

// The container owns its elements by value; it is Send/Sync exactly when
// a row of values is.
unsafe impl<S: FieldList + Send> Send for Soa<S> {}
unsafe impl<S: FieldList + Sync> Sync for Soa<S> {}

impl<S: FieldList> Soa<S> {
    /// Creates an empty container: no rows, no allocation.
    ///
    /// # Panics
    /// Panics if `S` declares the same field type twice. Use
    /// [`try_new`](Soa::try_new) to handle that case as an error.
    pub fn new() -> Self {
        match Self::try_new() {
            Ok(soa) => soa,
            Err(e) => panic!("{e}"),
        }
    }

    /// Creates an empty container, validating the schema.
    ///
    /// # Errors
    /// Returns [`SchemaError::Duplicate`](crate::engine::error::SchemaError)
    /// if `S` declares the same field type twice.
    pub fn try_new() -> SoaResult<Self> {
        let schema = Schema::new::<S>()?;
        let block = RawBlock::new(&schema);
        Ok(Self {
            block,
            schema,
            len: 0,
            marker: PhantomData,
        })
    }

    /// Creates an empty container with room for `capacity` rows.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut soa = Self::new();
        soa.reserve(capacity);
        soa
    }

    /// Number of live rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the container holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated row slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.block.capacity()
    }

    /// Returns `true` if `index` addresses a live row.
    #[inline]
    pub fn is_valid_index(&self, index: RowIndex) -> bool {
        index < self.len
    }

    /// The container's runtime field registry.
    #[inline]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    // ── Growth ──────────────────────────────────────────────────────────

    /// Ensures capacity for at least `capacity` rows. No-op if the block
    /// is already large enough.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.block.capacity() {
            self.grow_exact(capacity);
        }
    }

    /// Reallocates so that `capacity() == len()`.
    pub fn shrink(&mut self) {
        self.grow_exact(self.len);
    }

    #[inline]
    fn grow_exact(&mut self, new_capacity: usize) {
        // SAFETY: the first `len` rows of every column are initialized,
        // and every caller guarantees `len <= new_capacity`.
        unsafe { self.block.grow_to(&self.schema, self.len, new_capacity) };
    }

    // ── Mutation ────────────────────────────────────────────────────────

    /// Appends a row, growing to exactly `len + 1` slots if the block is
    /// full. Returns the new row's index.
    pub fn push_back(&mut self, row: S) -> RowIndex {
        let index = self.len;
        if index + 1 > self.block.capacity() {
            self.grow_exact(index + 1);
        }
        // SAFETY: slot `index` is within capacity and uninitialized.
        unsafe { row.write_row(&self.block.column_ptrs(&self.schema), index) };
        self.len += 1;
        index
    }

    /// Inserts a row at `index`, shifting rows `[index, len)` one slot to
    /// the right in every column. Returns `index`.
    ///
    /// # Panics
    /// Panics if `index` is not a live row. Appending is
    /// [`push_back`](Soa::push_back).
    pub fn insert(&mut self, index: RowIndex, row: S) -> RowIndex {
        assert!(
            index < self.len,
            "row index {index} out of bounds (len {})",
            self.len
        );
        let new_len = self.len + 1;
        if new_len > self.block.capacity() {
            self.grow_exact(new_len);
        }
        // SAFETY: rows `[index, len)` are initialized and slot `len` is
        // free; after the shift, slot `index` is dead and is immediately
        // re-initialized by the write.
        unsafe {
            self.block
                .shift_rows(&self.schema, index + 1, index, self.len - index);
            row.write_row(&self.block.column_ptrs(&self.schema), index);
        }
        self.len = new_len;
        index
    }

    /// Removes `count` rows starting at `index`, preserving the relative
    /// order of the survivors: the tail `[index + count, len)` shifts
    /// left by `count` in every column.
    ///
    /// With `shrink_after` the block reallocates to exactly the new
    /// length afterwards.
    ///
    /// # Panics
    /// Panics if `[index, index + count)` is not a live row range.
    pub fn remove_at(&mut self, index: RowIndex, count: usize, shrink_after: bool) {
        if count == 0 {
            return;
        }
        assert!(
            index < self.len && count <= self.len - index,
            "row range {index}..{} out of bounds (len {})",
            index + count,
            self.len
        );
        // SAFETY: the range is live; after destruction the hole is dead
        // and the tail shift re-populates it with initialized rows.
        unsafe {
            self.destroy_rows(index, count);
            let tail = self.len - index - count;
            if tail > 0 {
                self.block
                    .shift_rows(&self.schema, index, index + count, tail);
            }
        }
        self.len -= count;
        if shrink_after {
            self.grow_exact(self.len);
        }
    }

    /// Removes the row at `index`, preserving order, keeping capacity.
    pub fn remove(&mut self, index: RowIndex) {
        self.remove_at(index, 1, false);
    }

    /// Removes `count` rows starting at `index` by relocating up to
    /// `count` rows from the tail of the live range into the hole. Does
    /// **not** preserve order.
    ///
    /// With `shrink_after` the block reallocates to exactly the new
    /// length afterwards — the conventional default for this operation,
    /// unlike [`remove_at`](Soa::remove_at).
    ///
    /// # Panics
    /// Panics if `[index, index + count)` is not a live row range.
    pub fn remove_at_swap(&mut self, index: RowIndex, count: usize, shrink_after: bool) {
        if count == 0 {
            return;
        }
        assert!(
            index < self.len && count <= self.len - index,
            "row range {index}..{} out of bounds (len {})",
            index + count,
            self.len
        );
        // SAFETY: the hole is destroyed before tail rows move into it;
        // the moved-from tail slots become dead and fall outside the new
        // length.
        unsafe {
            self.destroy_rows(index, count);
            let after_hole = self.len - index - count;
            let into_hole = count.min(after_hole);
            if into_hole > 0 {
                self.block
                    .shift_rows(&self.schema, index, self.len - into_hole, into_hole);
            }
        }
        self.len -= count;
        if shrink_after {
            self.grow_exact(self.len);
        }
    }

    /// Removes the row at `index` by swapping the last row into its slot,
    /// then shrinks the block to the new length.
    pub fn swap_remove(&mut self, index: RowIndex) {
        self.remove_at_swap(index, 1, true);
    }

    /// Destroys all live rows and reallocates to exactly `new_capacity`
    /// slots (freeing the block entirely for `0`).
    pub fn empty(&mut self, new_capacity: usize) {
        // SAFETY: all live rows are initialized.
        unsafe { self.destroy_rows(0, self.len) };
        self.len = 0;
        self.grow_exact(new_capacity);
    }

    /// Destroys all live rows without reallocating when `new_size` fits
    /// the current block; otherwise behaves like
    /// [`empty(new_size)`](Soa::empty).
    pub fn reset(&mut self, new_size: usize) {
        if new_size <= self.block.capacity() {
            // SAFETY: all live rows are initialized.
            unsafe { self.destroy_rows(0, self.len) };
            self.len = 0;
        } else {
            self.empty(new_size);
        }
    }

    /// Drops all rows; the block is reallocated to the dropped row count
    /// (`empty(len())`).
    pub fn clear(&mut self) {
        self.empty(self.len);
    }

    /// Grows or truncates to exactly `new_size` rows; appended rows are
    /// clones of `row`. Truncation behaves like
    /// [`remove_at`](Soa::remove_at) on the tail with `shrink_after`.
    pub fn resize_with(&mut self, row: S, new_size: usize, shrink_after: bool)
    where
        S: Clone,
    {
        if new_size > self.len {
            if new_size > self.block.capacity() {
                self.grow_exact(new_size);
            }
            let columns = self.block.column_ptrs(&self.schema);
            for index in self.len..new_size {
                // SAFETY: slots `[len, new_size)` are within capacity and
                // uninitialized.
                unsafe { row.write_row_cloned(&columns, index) };
            }
            self.len = new_size;
        } else if new_size < self.len {
            self.remove_at(new_size, self.len - new_size, shrink_after);
        }
    }

    /// Grows or truncates to exactly `new_size` rows; appended rows take
    /// the schema's default values.
    pub fn resize(&mut self, new_size: usize, shrink_after: bool)
    where
        S: Clone + Default,
    {
        self.resize_with(S::default(), new_size, shrink_after);
    }

    /// Reinitializes the container to exactly `count` clones of `row`,
    /// reallocating to `count` slots.
    pub fn init(&mut self, row: S, count: usize)
    where
        S: Clone,
    {
        self.empty(count);
        let columns = self.block.column_ptrs(&self.schema);
        for index in 0..count {
            // SAFETY: slots `[0, count)` are within capacity and dead
            // after `empty`.
            unsafe { row.write_row_cloned(&columns, index) };
        }
        self.len = count;
    }

    /// Exchanges the rows at `first` and `second`, field by field, in
    /// place. No-op when the indices are equal.
    ///
    /// # Panics
    /// Panics if either index is not a live row.
    pub fn swap(&mut self, first: RowIndex, second: RowIndex) {
        assert!(
            first < self.len && second < self.len,
            "row indices {first}, {second} out of bounds (len {})",
            self.len
        );
        if first == second {
            return;
        }
        let columns = self.block.column_ptrs(&self.schema);
        for (field, column) in self.schema.fields().iter().zip(columns.iter()) {
            // SAFETY: both rows are live and distinct.
            unsafe { field.swap_rows(*column, first, second) };
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    /// Shared reference to field `T` of the row at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds or `T` is not a schema field.
    pub fn get_single<T: 'static>(&self, index: RowIndex) -> &T {
        assert!(
            index < self.len,
            "row index {index} out of bounds (len {})",
            self.len
        );
        // SAFETY: the row is live and the borrow is tied to `&self`.
        unsafe { &*self.single_ptr::<T>().add(index) }
    }

    /// Exclusive reference to field `T` of the row at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds or `T` is not a schema field.
    pub fn get_single_mut<T: 'static>(&mut self, index: RowIndex) -> &mut T {
        assert!(
            index < self.len,
            "row index {index} out of bounds (len {})",
            self.len
        );
        // SAFETY: the row is live and the borrow is tied to `&mut self`.
        unsafe { &mut *self.single_ptr::<T>().add(index) }
    }

    /// Unchecked variant of [`get_single`](Soa::get_single).
    ///
    /// # Safety
    /// `index` must address a live row. Bounds are verified only by a
    /// `debug_assert!`.
    ///
    /// # Panics
    /// Panics if `T` is not a schema field.
    pub unsafe fn get_single_unchecked<T: 'static>(&self, index: RowIndex) -> &T {
        debug_assert!(index < self.len);
        unsafe { &*self.single_ptr::<T>().add(index) }
    }

    /// Unchecked variant of [`get_single_mut`](Soa::get_single_mut).
    ///
    /// # Safety
    /// As [`get_single_unchecked`](Soa::get_single_unchecked).
    pub unsafe fn get_single_unchecked_mut<T: 'static>(&mut self, index: RowIndex) -> &mut T {
        debug_assert!(index < self.len);
        unsafe { &mut *self.single_ptr::<T>().add(index) }
    }

    /// Shared projection of the row at `index` onto the selection `Q`: a
    /// bare reference for one requested field, a tuple of references in
    /// request order for several.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds or `Q` is not a valid selection
    /// of the schema.
    pub fn get<Q: Select<S>>(&self, index: RowIndex) -> Q::Ref<'_> {
        assert!(
            index < self.len,
            "row index {index} out of bounds (len {})",
            self.len
        );
        let columns = self.resolved_ptrs_const::<Q>();
        // SAFETY: the row is live; `locate` guarantees distinct columns.
        unsafe { Q::get_ref(&columns, index) }
    }

    /// Exclusive projection of the row at `index` onto the selection `Q`.
    ///
    /// # Panics
    /// As [`get`](Soa::get).
    pub fn get_mut<Q: Select<S>>(&mut self, index: RowIndex) -> Q::Mut<'_> {
        assert!(
            index < self.len,
            "row index {index} out of bounds (len {})",
            self.len
        );
        let columns = self.resolved_ptrs::<Q>();
        // SAFETY: the row is live, the borrow is exclusive, and `locate`
        // guarantees the requested columns are distinct.
        unsafe { Q::get_mut(&columns, index) }
    }

    /// The full row at `index` as a tuple of shared references, schema
    /// order.
    pub fn row(&self, index: RowIndex) -> <S as Select<S>>::Ref<'_>
    where
        S: Select<S>,
    {
        self.get::<S>(index)
    }

    /// The full row at `index` as a tuple of exclusive references, schema
    /// order.
    pub fn row_mut(&mut self, index: RowIndex) -> <S as Select<S>>::Mut<'_>
    where
        S: Select<S>,
    {
        self.get_mut::<S>(index)
    }

    /// Raw base pointer(s) of the selected column(s), valid for the
    /// current capacity until the next structural mutation.
    ///
    /// # Panics
    /// Panics if `Q` is not a valid selection of the schema.
    pub fn get_ptr<Q: Select<S>>(&self) -> Q::Ptr {
        let columns = self.resolved_ptrs_const::<Q>();
        Q::ptrs(&columns)
    }

    /// Mutable variant of [`get_ptr`](Soa::get_ptr).
    pub fn get_ptr_mut<Q: Select<S>>(&mut self) -> Q::PtrMut {
        let columns = self.resolved_ptrs::<Q>();
        Q::ptrs_mut(&columns)
    }

    /// Owned copy of the live portion `[0, len)` of the selected
    /// column(s): one `Vec` per requested field.
    pub fn get_vector_copy<Q: SelectClone<S>>(&self) -> Q::Vecs {
        let columns = self.resolved_ptrs_const::<Q>();
        // SAFETY: rows `[0, len)` are live in every column.
        unsafe { Q::clone_columns(&columns, self.len) }
    }

    /// Owned row-major copy of the selection: one projected row tuple per
    /// live row, assembled by walking all rows in order. This is the one
    /// accessor that materializes an array-of-structures view from the
    /// column-major storage.
    pub fn get_vector_aos_copy<Q: SelectClone<S>>(&self) -> Vec<Q::Owned> {
        let columns = self.resolved_ptrs_const::<Q>();
        (0..self.len)
            // SAFETY: every visited row is live.
            .map(|index| unsafe { Q::clone_row(&columns, index) })
            .collect()
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Base pointer of the column holding field `T`.
    ///
    /// # Panics
    /// Panics if `T` is not a schema field.
    #[inline]
    fn single_ptr<T: 'static>(&self) -> *mut T {
        let field = match self.schema.field_index_of::<T>() {
            Ok(field) => field,
            Err(e) => panic!("{e}"),
        };
        self.block.column_ptr(&self.schema, field).cast::<T>()
    }

    /// Column base pointers for the selection `Q`, request order.
    #[inline]
    pub(crate) fn resolved_ptrs<Q: Select<S>>(&self) -> ResolvedPtrs {
        let indices = Q::locate(&self.schema);
        let columns = self.block.column_ptrs(&self.schema);
        indices.iter().map(|&field| columns[field]).collect()
    }

    /// Const-pointer view of [`resolved_ptrs`](Soa::resolved_ptrs).
    #[inline]
    pub(crate) fn resolved_ptrs_const<Q: Select<S>>(&self) -> SmallVec<[*const u8; FIELD_CAP]> {
        self.resolved_ptrs::<Q>()
            .iter()
            .map(|&ptr| ptr as *const u8)
            .collect()
    }

    /// Drops the rows `[index, index + count)` in every column.
    ///
    /// # Safety
    /// The range must hold initialized rows; they are dead afterwards.
    /// The caller adjusts `len`.
    unsafe fn destroy_rows(&mut self, index: RowIndex, count: usize) {
        if count == 0 {
            return;
        }
        debug_assert!(index + count <= self.block.capacity());
        let columns = self.block.column_ptrs(&self.schema);
        for (field, column) in self.schema.fields().iter().zip(columns.iter()) {
            // SAFETY: per the method contract; the offset stays inside
            // the column's region.
            unsafe {
                field.drop_in_place(column.add(index * field.size()), count);
            }
        }
    }
}

impl<S: FieldList> std::fmt::Debug for Soa<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Soa")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl<S: FieldList> Default for Soa<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FieldList> Drop for Soa<S> {
    fn drop(&mut self) {
        // SAFETY: exactly the live rows are initialized. The block frees
        // its bytes afterwards in its own drop.
        unsafe { self.destroy_rows(0, self.len) };
        self.len = 0;
    }
}
