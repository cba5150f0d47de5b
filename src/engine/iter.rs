//! Field-subset iteration over the container.
//!
//! Iteration is random access over the integer row position `[0, len)`,
//! parameterized by a [`Select`] subset `Q`. Dereferencing yields a bare
//! reference (one requested field) or a tuple of references in request
//! order (several), always borrowing the container — never an owned copy.
//!
//! The single iterator of the underlying design splits into three
//! borrow-correct forms here:
//!
//! * [`Iter`] — shared access, any number alive at once.
//! * [`IterMut`] — exclusive access; sound because every row position is
//!   yielded at most once, so no two returned projections alias.
//! * [`CursorMut`] — owns `&mut Soa` and is the only form that may
//!   structurally mutate: [`CursorMut::remove_current`] removes the row
//!   under the cursor (order-preserving) and steps back one position, so
//!   the following [`advance`](CursorMut::advance) revisits the slot into
//!   which the tail slid. This is the supported pattern for filtering
//!   during a forward scan.
//!
//! Both `Iter` and `IterMut` implement `Iterator`,
//! `DoubleEndedIterator`, and `ExactSizeIterator`; positions and
//! distances are exposed through [`Iter::index`] / [`IterMut::index`] and
//! `len`. All views are invalidated by any capacity change of the
//! container, like every other borrow.

use std::marker::PhantomData;

use smallvec::SmallVec;

use crate::engine::schema::FieldList;
use crate::engine::select::Select;
use crate::engine::soa::Soa;
use crate::engine::types::{RowIndex, FIELD_CAP};

/// Shared, random-access iterator over a field subset `Q`.
pub struct Iter<'a, S: FieldList, Q: Select<S>> {
    columns: SmallVec<[*const u8; FIELD_CAP]>,
    front: RowIndex,
    back: RowIndex,
    marker: PhantomData<(&'a Soa<S>, fn() -> Q)>,
}

/// Exclusive, random-access iterator over a field subset `Q`.
///
/// Yields every row position at most once, which is what makes handing
/// out `&mut` projections sound.
pub struct IterMut<'a, S: FieldList, Q: Select<S>> {
    columns: SmallVec<[*mut u8; FIELD_CAP]>,
    front: RowIndex,
    back: RowIndex,
    marker: PhantomData<(&'a mut Soa<S>, fn() -> Q)>,
}

impl<'a, S: FieldList, Q: Select<S>> Iter<'a, S, Q> {
    pub(crate) fn new(soa: &'a Soa<S>) -> Self {
        Self {
            columns: soa.resolved_ptrs_const::<Q>(),
            front: 0,
            back: soa.len(),
            marker: PhantomData,
        }
    }

    /// Position the next call to `next` will dereference.
    #[inline]
    pub fn index(&self) -> RowIndex {
        self.front
    }
}

impl<'a, S: FieldList, Q: Select<S>> Iterator for Iter<'a, S, Q> {
    type Item = Q::Ref<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        // SAFETY: `front` addresses a live row; shared projections may
        // coexist freely.
        let item = unsafe { Q::get_ref(&self.columns, self.front) };
        self.front += 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<S: FieldList, Q: Select<S>> DoubleEndedIterator for Iter<'_, S, Q> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: `back` addresses a live row.
        Some(unsafe { Q::get_ref(&self.columns, self.back) })
    }
}

impl<S: FieldList, Q: Select<S>> ExactSizeIterator for Iter<'_, S, Q> {}

impl<'a, S: FieldList, Q: Select<S>> IterMut<'a, S, Q> {
    pub(crate) fn new(soa: &'a mut Soa<S>) -> Self {
        Self {
            back: soa.len(),
            columns: soa.resolved_ptrs::<Q>(),
            front: 0,
            marker: PhantomData,
        }
    }

    /// Position the next call to `next` will dereference.
    #[inline]
    pub fn index(&self) -> RowIndex {
        self.front
    }
}

impl<'a, S: FieldList, Q: Select<S>> Iterator for IterMut<'a, S, Q> {
    type Item = Q::Mut<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        // SAFETY: `front` addresses a live row, is yielded exactly once,
        // and `locate` guaranteed distinct columns — the returned
        // projections never alias.
        let item = unsafe { Q::get_mut(&self.columns, self.front) };
        self.front += 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<S: FieldList, Q: Select<S>> DoubleEndedIterator for IterMut<'_, S, Q> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: as in `next`.
        Some(unsafe { Q::get_mut(&self.columns, self.back) })
    }
}

impl<S: FieldList, Q: Select<S>> ExactSizeIterator for IterMut<'_, S, Q> {}

/// Mutable, order-preserving cursor supporting structural removal.
///
/// The cursor addresses a signed position so that removing the row at
/// position 0 may step back to `-1`; the next [`advance`](CursorMut::advance)
/// then lands on the row that slid into slot 0.
pub struct CursorMut<'a, S: FieldList, Q: Select<S>> {
    soa: &'a mut Soa<S>,
    position: isize,
    marker: PhantomData<fn() -> Q>,
}

impl<'a, S: FieldList, Q: Select<S>> CursorMut<'a, S, Q> {
    pub(crate) fn new(soa: &'a mut Soa<S>) -> Self {
        Self {
            soa,
            position: 0,
            marker: PhantomData,
        }
    }

    /// Current signed position; negative after removing row 0.
    #[inline]
    pub fn position(&self) -> isize {
        self.position
    }

    /// Returns `true` while the cursor addresses a live row.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.position >= 0 && (self.position as usize) < self.soa.len()
    }

    /// Steps one row forward.
    #[inline]
    pub fn advance(&mut self) {
        self.position += 1;
    }

    /// Steps one row backward.
    #[inline]
    pub fn retreat(&mut self) {
        self.position -= 1;
    }

    /// Moves the cursor by a signed offset.
    #[inline]
    pub fn seek(&mut self, offset: isize) {
        self.position += offset;
    }

    /// Rewinds to row 0.
    #[inline]
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Parks the cursor one past the last row.
    #[inline]
    pub fn set_to_end(&mut self) {
        self.position = self.soa.len() as isize;
    }

    /// Exclusive projection of the row under the cursor.
    ///
    /// # Panics
    /// Panics if the cursor is not on a live row.
    pub fn current(&mut self) -> Q::Mut<'_> {
        assert!(
            self.is_valid(),
            "cursor position {} out of bounds (len {})",
            self.position,
            self.soa.len()
        );
        self.soa.get_mut::<Q>(self.position as usize)
    }

    /// Removes the row under the cursor (order-preserving, capacity
    /// kept) and steps the cursor back one position, so the next
    /// [`advance`](CursorMut::advance) revisits the slot that the tail
    /// slid into.
    ///
    /// # Panics
    /// Panics if the cursor is not on a live row.
    pub fn remove_current(&mut self) {
        assert!(
            self.is_valid(),
            "cursor position {} out of bounds (len {})",
            self.position,
            self.soa.len()
        );
        self.soa.remove_at(self.position as usize, 1, false);
        self.position -= 1;
    }
}

impl<S: FieldList> Soa<S> {
    /// Shared iterator over the field subset `Q`.
    ///
    /// # Panics
    /// Panics if `Q` is not a valid selection of the schema.
    pub fn iter<Q: Select<S>>(&self) -> Iter<'_, S, Q> {
        Iter::new(self)
    }

    /// Exclusive iterator over the field subset `Q`.
    ///
    /// # Panics
    /// Panics if `Q` is not a valid selection of the schema.
    pub fn iter_mut<Q: Select<S>>(&mut self) -> IterMut<'_, S, Q> {
        IterMut::new(self)
    }

    /// Shared iterator over full rows, schema order.
    pub fn rows_iter(&self) -> Iter<'_, S, S>
    where
        S: Select<S>,
    {
        self.iter::<S>()
    }

    /// Exclusive iterator over full rows, schema order.
    pub fn rows_iter_mut(&mut self) -> IterMut<'_, S, S>
    where
        S: Select<S>,
    {
        self.iter_mut::<S>()
    }

    /// Mutable cursor over the field subset `Q`, starting at row 0.
    ///
    /// The cursor is the only iteration form that may remove rows; see
    /// [`CursorMut::remove_current`].
    pub fn cursor_mut<Q: Select<S>>(&mut self) -> CursorMut<'_, S, Q> {
        CursorMut::new(self)
    }
}
