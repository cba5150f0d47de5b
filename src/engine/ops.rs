//! Bulk per-row application and in-place sorting.
//!
//! Both operations are typed adapters over the container: the caller
//! declares the field subset (or sort key field) as a type parameter, and
//! the engine resolves it against the schema once before touching any
//! row.
//!
//! ## `for_each`
//!
//! One synchronous, full pass over rows `0..len` in strictly increasing
//! order — no reordering, no skipping, no concurrency. The requested
//! fields arrive in the declared order, not schema order.
//!
//! ## `sort_by`
//!
//! The comparator sees only the **key field** `K`; the signature forces
//! both of its parameters to the same type, and resolution fails before
//! sorting if `K` is not a schema field. Key order is first established
//! over row indices, then realized in place by cycle-walking whole-row
//! swaps, so permuting rows by key can never desynchronize a row's other
//! fields from each other.

use std::cmp::Ordering;

use crate::engine::schema::FieldList;
use crate::engine::select::Select;
use crate::engine::soa::Soa;
use crate::engine::types::RowIndex;

impl<S: FieldList> Soa<S> {
    /// Invokes `body` once per row, rows `0..len` in increasing order,
    /// with exclusive references to the fields selected by `Q`, in the
    /// declared order.
    ///
    /// ```
    /// use soa_engine::Soa;
    ///
    /// let mut v: Soa<(f32, i32)> = Soa::new();
    /// v.push_back((1.5, 10));
    /// v.push_back((2.5, 20));
    /// v.for_each::<(f32, i32), _>(|(score, id)| *score += *id as f32);
    /// assert_eq!(*v.get_single::<f32>(1), 22.5);
    /// ```
    ///
    /// # Panics
    /// Panics if `Q` is not a valid selection of the schema.
    pub fn for_each<'s, Q: Select<S>, F>(&'s mut self, body: F)
    where
        F: FnMut(Q::Mut<'s>),
    {
        self.iter_mut::<Q>().for_each(body);
    }

    /// Shared-access variant of [`for_each`](Soa::for_each).
    ///
    /// # Panics
    /// Panics if `Q` is not a valid selection of the schema.
    pub fn for_each_read<'s, Q: Select<S>, F>(&'s self, body: F)
    where
        F: FnMut(Q::Ref<'s>),
    {
        self.iter::<Q>().for_each(body);
    }

    /// Sorts all rows by the key field `K` under a strict-weak "less
    /// than" predicate, exchanging whole rows so that every field stays
    /// associated with its original row.
    ///
    /// ```
    /// use soa_engine::Soa;
    ///
    /// let mut v: Soa<(u64, f32)> = Soa::new();
    /// v.push_back((1, 10.0));
    /// v.push_back((2, 5.0));
    /// v.push_back((3, 8.0));
    /// v.sort_by(|a: &f32, b: &f32| a < b);
    /// assert_eq!(v.get_vector_copy::<(u64,)>(), vec![2, 3, 1]);
    /// ```
    ///
    /// # Panics
    /// Panics if `K` is not a schema field.
    pub fn sort_by<K: 'static, F>(&mut self, mut less: F)
    where
        F: FnMut(&K, &K) -> bool,
    {
        self.sort_by_ordering::<K, _>(move |a, b| {
            if less(a, b) {
                Ordering::Less
            } else if less(b, a) {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        });
    }

    /// [`sort_by`](Soa::sort_by) with a total-order comparator.
    ///
    /// The sort is unstable with respect to equal keys, matching the
    /// row-identity model: rows are addressed purely by position.
    ///
    /// # Panics
    /// Panics if `K` is not a schema field.
    pub fn sort_by_ordering<K: 'static, F>(&mut self, mut compare: F)
    where
        F: FnMut(&K, &K) -> Ordering,
    {
        let len = self.len();
        if len < 2 {
            return;
        }
        let keys = self.resolved_ptrs::<(K,)>()[0] as *const K;

        // Establish key order over row indices without touching rows:
        // order[new_position] = current row index.
        let mut order: Vec<RowIndex> = (0..len).collect();
        // SAFETY: `keys` addresses the live key column; the index sort
        // performs no structural mutation.
        order.sort_unstable_by(|&a, &b| unsafe { compare(&*keys.add(a), &*keys.add(b)) });

        // destination[row] = the position the row must move to.
        let mut destination = vec![0 as RowIndex; len];
        for (position, &row) in order.iter().enumerate() {
            destination[row] = position;
        }

        // Realize the permutation with whole-row swaps, one cycle at a
        // time. Every exchange goes through `swap`, which moves all
        // columns together.
        for row in 0..len {
            while destination[row] != row {
                let target = destination[row];
                self.swap(row, target);
                destination.swap(row, target);
            }
        }
    }
}
