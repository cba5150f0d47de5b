//! Typed field-subset selection.
//!
//! Every typed view of the container — accessors, iterators, `for_each` —
//! is parameterized by a *selection*: a tuple of requested field types,
//! implementing [`Select`]. The selection fixes three things at the type
//! level:
//!
//! * **which** fields are exposed,
//! * **in which order** (the request order, never silently reordered to
//!   schema order),
//! * **what shape** the projection has: a single-field selection
//!   dereferences to a bare reference, a multi-field selection to a tuple
//!   of references in request order.
//!
//! Resolution against a concrete schema happens at runtime through a
//! checked `TypeId` lookup ([`Select::locate`]): requesting a type absent
//! from the schema, or the same type twice, is rejected before any row is
//! touched. Lookup results are plain column indices; the caller resolves
//! them to base pointers once and then projects rows with the `unsafe`
//! accessors below.
//!
//! ## Safety
//!
//! The `unsafe` projection methods trust the caller on exactly one point:
//! the `columns` slice holds one base pointer per requested field, **in
//! request order**, each properly aligned for the field's type and valid
//! for the dereferenced row range. Everything else (distinctness of the
//! requested fields, hence no aliasing between the returned references)
//! is enforced by `locate`.

use smallvec::SmallVec;

use crate::engine::error::{DuplicateFieldError, SchemaError, UnknownFieldError};
use crate::engine::schema::{FieldList, Schema};
use crate::engine::types::{FieldIndex, RowIndex, FIELD_CAP};

/// Schema column indices of a selection's fields, in request order.
pub type FieldIndices = SmallVec<[FieldIndex; FIELD_CAP]>;

/// A tuple of requested field types, projected out of a schema `S`.
///
/// Implemented for tuples of arity 1 through [`FIELD_CAP`]. A schema tuple
/// selects itself, so the full-schema views are the `Q = S` instance of
/// the same machinery.
///
/// # Safety
/// Implementations must project `columns[k]` as the `k`-th requested
/// field type and nothing else, and `try_locate` must reject selections
/// that would alias (duplicate requested types) or miss (types absent
/// from the schema).
pub unsafe trait Select<S: FieldList>: 'static {
    /// Number of requested fields.
    const LEN: usize;

    /// Shared projection: `&T` for one field, `(&A, &B, ...)` for more.
    type Ref<'a>;
    /// Exclusive projection: `&mut T` or `(&mut A, &mut B, ...)`.
    type Mut<'a>;
    /// Raw column base pointer(s): `*const T` or a tuple thereof.
    type Ptr;
    /// Mutable raw column base pointer(s).
    type PtrMut;
    /// Owned row projection: `T` for one field, `(A, B, ...)` for more.
    type Owned;
    /// Owned column copies: `Vec<T>` or a tuple of `Vec`s.
    type Vecs;

    /// Resolves each requested field to its schema column index, in
    /// request order.
    ///
    /// # Errors
    /// [`SchemaError::Unknown`] if a requested type is not a schema
    /// field; [`SchemaError::Duplicate`] if the selection requests the
    /// same type twice.
    fn try_locate(schema: &Schema) -> Result<FieldIndices, SchemaError>;

    /// Like [`try_locate`](Select::try_locate) but panics with the error
    /// message. Selection mistakes are schema misuse, reported at the
    /// request site.
    fn locate(schema: &Schema) -> FieldIndices {
        match Self::try_locate(schema) {
            Ok(indices) => indices,
            Err(e) => panic!("{e}"),
        }
    }

    /// Projects row `index` as shared references.
    ///
    /// # Safety
    /// `columns` per the trait contract; row `index` initialized in every
    /// requested column; no exclusive borrow of those slots is live.
    unsafe fn get_ref<'a>(columns: &[*const u8], index: RowIndex) -> Self::Ref<'a>;

    /// Projects row `index` as exclusive references.
    ///
    /// # Safety
    /// As [`get_ref`](Select::get_ref), and no other borrow of the slots
    /// may be live for `'a`.
    unsafe fn get_mut<'a>(columns: &[*mut u8], index: RowIndex) -> Self::Mut<'a>;

    /// Reinterprets the resolved base pointers as typed column pointers.
    fn ptrs(columns: &[*const u8]) -> Self::Ptr;

    /// Mutable variant of [`ptrs`](Select::ptrs).
    fn ptrs_mut(columns: &[*mut u8]) -> Self::PtrMut;
}

/// Cloning projections for selections whose fields are all `Clone`.
///
/// Split from [`Select`] so that non-`Clone` fields still select for
/// reference access; only the owned-copy accessors require this trait.
///
/// # Safety
/// Same contract as [`Select`]; the cloning methods must not move out of
/// the source slots.
pub unsafe trait SelectClone<S: FieldList>: Select<S> {
    /// Clones row `index` into an owned projection.
    ///
    /// # Safety
    /// As [`Select::get_ref`].
    unsafe fn clone_row(columns: &[*const u8], index: RowIndex) -> Self::Owned;

    /// Clones the live prefix (`len` rows) of every requested column.
    ///
    /// # Safety
    /// As [`Select::get_ref`], for every row below `len`.
    unsafe fn clone_columns(columns: &[*const u8], len: usize) -> Self::Vecs;
}

fn locate_one<T: 'static>(
    schema: &Schema,
    taken: &FieldIndices,
) -> Result<FieldIndex, SchemaError> {
    let index = schema
        .field_index(std::any::TypeId::of::<T>())
        .ok_or(UnknownFieldError {
            type_name: std::any::type_name::<T>(),
        })?;
    if taken.contains(&index) {
        return Err(DuplicateFieldError {
            type_name: std::any::type_name::<T>(),
        }
        .into());
    }
    Ok(index)
}

// A one-field selection projects to a bare reference rather than a
// one-tuple, mirroring the single/multi split of the row accessors.
unsafe impl<S: FieldList, A: 'static> Select<S> for (A,) {
    const LEN: usize = 1;

    type Ref<'a> = &'a A;
    type Mut<'a> = &'a mut A;
    type Ptr = *const A;
    type PtrMut = *mut A;
    type Owned = A;
    type Vecs = Vec<A>;

    fn try_locate(schema: &Schema) -> Result<FieldIndices, SchemaError> {
        let mut indices = FieldIndices::new();
        indices.push(locate_one::<A>(schema, &indices)?);
        Ok(indices)
    }

    unsafe fn get_ref<'a>(columns: &[*const u8], index: RowIndex) -> Self::Ref<'a> {
        debug_assert_eq!(columns.len(), 1);
        unsafe { &*columns[0].cast::<A>().add(index) }
    }

    unsafe fn get_mut<'a>(columns: &[*mut u8], index: RowIndex) -> Self::Mut<'a> {
        debug_assert_eq!(columns.len(), 1);
        unsafe { &mut *columns[0].cast::<A>().add(index) }
    }

    fn ptrs(columns: &[*const u8]) -> Self::Ptr {
        columns[0].cast()
    }

    fn ptrs_mut(columns: &[*mut u8]) -> Self::PtrMut {
        columns[0].cast()
    }
}

unsafe impl<S: FieldList, A: Clone + 'static> SelectClone<S> for (A,) {
    unsafe fn clone_row(columns: &[*const u8], index: RowIndex) -> Self::Owned {
        unsafe { (*columns[0].cast::<A>().add(index)).clone() }
    }

    unsafe fn clone_columns(columns: &[*const u8], len: usize) -> Self::Vecs {
        unsafe { std::slice::from_raw_parts(columns[0].cast::<A>(), len).to_vec() }
    }
}

macro_rules! impl_select {
    ($len:expr; $($T:ident . $idx:tt),+) => {
        unsafe impl<S: FieldList, $($T: 'static),+> Select<S> for ($($T,)+) {
            const LEN: usize = $len;

            type Ref<'a> = ($(&'a $T,)+);
            type Mut<'a> = ($(&'a mut $T,)+);
            type Ptr = ($(*const $T,)+);
            type PtrMut = ($(*mut $T,)+);
            type Owned = ($($T,)+);
            type Vecs = ($(Vec<$T>,)+);

            fn try_locate(schema: &Schema) -> Result<FieldIndices, SchemaError> {
                let mut indices = FieldIndices::new();
                $(
                    indices.push(locate_one::<$T>(schema, &indices)?);
                )+
                Ok(indices)
            }

            unsafe fn get_ref<'a>(columns: &[*const u8], index: RowIndex) -> Self::Ref<'a> {
                debug_assert_eq!(columns.len(), <Self as Select<S>>::LEN);
                ($(
                    unsafe { &*columns[$idx].cast::<$T>().add(index) },
                )+)
            }

            unsafe fn get_mut<'a>(columns: &[*mut u8], index: RowIndex) -> Self::Mut<'a> {
                debug_assert_eq!(columns.len(), <Self as Select<S>>::LEN);
                ($(
                    unsafe { &mut *columns[$idx].cast::<$T>().add(index) },
                )+)
            }

            fn ptrs(columns: &[*const u8]) -> Self::Ptr {
                ($(columns[$idx].cast::<$T>(),)+)
            }

            fn ptrs_mut(columns: &[*mut u8]) -> Self::PtrMut {
                ($(columns[$idx].cast::<$T>(),)+)
            }
        }

        unsafe impl<S: FieldList, $($T: Clone + 'static),+> SelectClone<S> for ($($T,)+) {
            unsafe fn clone_row(columns: &[*const u8], index: RowIndex) -> Self::Owned {
                ($(
                    unsafe { (*columns[$idx].cast::<$T>().add(index)).clone() },
                )+)
            }

            unsafe fn clone_columns(columns: &[*const u8], len: usize) -> Self::Vecs {
                ($(
                    unsafe { std::slice::from_raw_parts(columns[$idx].cast::<$T>(), len).to_vec() },
                )+)
            }
        }
    };
}

impl_select!(2; A.0, B.1);
impl_select!(3; A.0, B.1, C.2);
impl_select!(4; A.0, B.1, C.2, D.3);
impl_select!(5; A.0, B.1, C.2, D.3, E.4);
impl_select!(6; A.0, B.1, C.2, D.3, E.4, F.5);
impl_select!(7; A.0, B.1, C.2, D.3, E.4, F.5, G.6);
impl_select!(8; A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7);

#[cfg(test)]
mod tests {
    use super::*;

    type S = (u32, f64, u8);

    #[test]
    fn locate_returns_request_order_not_schema_order() {
        let schema = Schema::new::<S>().unwrap();
        let indices = <(u8, u32) as Select<S>>::try_locate(&schema).unwrap();
        assert_eq!(indices.as_slice(), &[2, 0]);
    }

    #[test]
    fn locate_rejects_unknown_fields() {
        let schema = Schema::new::<S>().unwrap();
        let err = <(u32, i64) as Select<S>>::try_locate(&schema).unwrap_err();
        assert!(matches!(err, SchemaError::Unknown(_)));
    }

    #[test]
    fn locate_rejects_duplicate_requests() {
        let schema = Schema::new::<S>().unwrap();
        let err = <(u32, u32) as Select<S>>::try_locate(&schema).unwrap_err();
        assert!(matches!(err, SchemaError::Duplicate(_)));
    }
}
