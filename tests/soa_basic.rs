use soa_engine::{SchemaError, Soa};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Id(u64);

#[derive(Clone, Copy, Debug, PartialEq)]
struct Score(f32);

fn sample() -> Soa<(Id, Score)> {
    let mut v = Soa::new();
    v.push_back((Id(1), Score(10.0)));
    v.push_back((Id(2), Score(5.0)));
    v.push_back((Id(3), Score(8.0)));
    v
}

fn ids(v: &Soa<(Id, Score)>) -> Vec<u64> {
    v.get_vector_copy::<(Id,)>().iter().map(|id| id.0).collect()
}

#[test]
fn push_back_grows_by_one_and_reads_back() {
    let mut v: Soa<(Id, Score)> = Soa::new();
    assert_eq!(v.len(), 0);
    assert!(v.is_empty());
    assert_eq!(v.capacity(), 0);

    for i in 0..10u64 {
        let index = v.push_back((Id(i), Score(i as f32 / 2.0)));
        assert_eq!(index as u64, i);
        assert_eq!(v.len() as u64, i + 1);
        assert_eq!(v.get_single::<Id>(index), &Id(i));
        assert_eq!(v.get_single::<Score>(index), &Score(i as f32 / 2.0));
    }
}

#[test]
fn growth_is_exact_not_geometric() {
    let mut v: Soa<(Id, Score)> = Soa::new();
    for i in 0..5 {
        v.push_back((Id(i), Score(0.0)));
        // Each over-capacity push grows to exactly the new minimum.
        assert_eq!(v.capacity(), i as usize + 1);
    }

    v.reserve(32);
    assert_eq!(v.capacity(), 32);
    assert_eq!(v.len(), 5);

    // Reserving less than capacity is a no-op.
    v.reserve(8);
    assert_eq!(v.capacity(), 32);

    v.shrink();
    assert_eq!(v.capacity(), v.len());
}

#[test]
fn insert_then_remove_restores_the_sequence() {
    let mut v = sample();
    let before = v.get_vector_aos_copy::<(Id, Score)>();

    v.insert(1, (Id(99), Score(-1.0)));
    assert_eq!(ids(&v), vec![1, 99, 2, 3]);
    assert_eq!(v.get_single::<Score>(1), &Score(-1.0));

    v.remove_at(1, 1, false);
    assert_eq!(v.get_vector_aos_copy::<(Id, Score)>(), before);
}

#[test]
fn remove_at_preserves_survivor_order() {
    let mut v: Soa<(Id, Score)> = Soa::new();
    for i in 0..8u64 {
        v.push_back((Id(i), Score(i as f32)));
    }
    v.remove_at(2, 3, false);
    assert_eq!(ids(&v), vec![0, 1, 5, 6, 7]);
    assert_eq!(v.len(), 5);
    // Capacity untouched without shrink_after.
    assert_eq!(v.capacity(), 8);

    v.remove_at(0, 2, true);
    assert_eq!(ids(&v), vec![5, 6, 7]);
    assert_eq!(v.capacity(), 3);
}

#[test]
fn remove_at_swap_preserves_the_multiset() {
    let mut v: Soa<(Id, Score)> = Soa::new();
    for i in 0..6u64 {
        v.push_back((Id(i), Score(i as f32)));
    }

    v.remove_at_swap(1, 2, false);
    assert_eq!(v.len(), 4);

    let mut survivors = ids(&v);
    survivors.sort_unstable();
    assert_eq!(survivors, vec![0, 3, 4, 5]);

    // Rows keep their fields paired after the tail moved into the hole.
    for i in 0..v.len() {
        let (id, score) = v.get::<(Id, Score)>(i);
        assert_eq!(id.0 as f32, score.0);
    }
}

#[test]
fn swap_remove_shrinks_by_default() {
    let mut v = sample();
    v.swap_remove(0);
    assert_eq!(v.len(), 2);
    assert_eq!(v.capacity(), 2);
}

#[test]
fn empty_reset_clear_capacity_contract() {
    let mut v = sample();
    v.reserve(10);

    // reset keeps the buffer when the requested size fits.
    v.reset(4);
    assert_eq!(v.len(), 0);
    assert_eq!(v.capacity(), 10);

    for i in 0..3u64 {
        v.push_back((Id(i), Score(0.0)));
    }

    // clear reallocates to the dropped row count.
    v.clear();
    assert_eq!(v.len(), 0);
    assert_eq!(v.capacity(), 3);

    // empty reallocates to exactly the requested capacity.
    v.empty(7);
    assert_eq!(v.len(), 0);
    assert_eq!(v.capacity(), 7);

    // reset beyond capacity behaves like empty.
    v.reset(20);
    assert_eq!(v.capacity(), 20);

    v.empty(0);
    assert_eq!(v.capacity(), 0);
}

#[test]
fn resize_appends_default_rows() {
    let mut v: Soa<(u32, f64)> = Soa::new();
    v.push_back((7, 1.5));
    v.resize(4, false);
    assert_eq!(v.len(), 4);
    for i in 1..4 {
        assert_eq!(v.get::<(u32, f64)>(i), (&0, &0.0));
    }

    v.resize(2, true);
    assert_eq!(v.len(), 2);
    assert_eq!(v.capacity(), 2);
    assert_eq!(v.get_single::<u32>(0), &7);
}

#[test]
fn resize_with_appends_clones_of_the_given_row() {
    let mut v: Soa<(Id, Score)> = Soa::new();
    v.resize_with((Id(42), Score(1.0)), 3, false);
    assert_eq!(v.len(), 3);
    for i in 0..3 {
        assert_eq!(v.get::<(Id, Score)>(i), (&Id(42), &Score(1.0)));
    }
}

#[test]
fn init_reinitializes_to_count_copies() {
    let mut v = sample();
    v.init((Id(9), Score(9.0)), 5);
    assert_eq!(v.len(), 5);
    assert_eq!(v.capacity(), 5);
    for i in 0..5 {
        assert_eq!(v.get_single::<Id>(i), &Id(9));
    }
}

#[test]
fn swap_exchanges_full_rows() {
    let mut v = sample();
    v.swap(0, 2);
    assert_eq!(v.get::<(Id, Score)>(0), (&Id(3), &Score(8.0)));
    assert_eq!(v.get::<(Id, Score)>(2), (&Id(1), &Score(10.0)));

    // Self-swap is a no-op.
    v.swap(1, 1);
    assert_eq!(v.get::<(Id, Score)>(1), (&Id(2), &Score(5.0)));
}

#[test]
fn tuple_accessors_follow_request_order() {
    let v = sample();
    let (score, id) = v.get::<(Score, Id)>(2);
    assert_eq!(score, &Score(8.0));
    assert_eq!(id, &Id(3));
}

#[test]
fn single_field_mutation_is_visible_through_rows() {
    let mut v = sample();
    v.get_single_mut::<Score>(1).0 = 50.0;
    let (id, score) = v.row(1);
    assert_eq!(id, &Id(2));
    assert_eq!(score, &Score(50.0));

    let (id, score) = v.row_mut(0);
    id.0 += 10;
    score.0 *= 2.0;
    assert_eq!(v.get::<(Id, Score)>(0), (&Id(11), &Score(20.0)));
}

#[test]
fn vector_copies_cover_the_live_range_only() {
    let mut v = sample();
    v.reserve(100);

    assert_eq!(v.get_vector_copy::<(Id,)>(), vec![Id(1), Id(2), Id(3)]);

    let (ids, scores) = v.get_vector_copy::<(Id, Score)>();
    assert_eq!(ids.len(), 3);
    assert_eq!(scores, vec![Score(10.0), Score(5.0), Score(8.0)]);

    let rows = v.get_vector_aos_copy::<(Score, Id)>();
    assert_eq!(rows, vec![
        (Score(10.0), Id(1)),
        (Score(5.0), Id(2)),
        (Score(8.0), Id(3)),
    ]);
}

#[test]
fn duplicate_schema_is_rejected_at_construction() {
    let err = Soa::<(u32, f64, u32)>::try_new().unwrap_err();
    assert!(matches!(err, SchemaError::Duplicate(_)));
}

#[test]
#[should_panic(expected = "does not appear in schema")]
fn unknown_field_access_panics_with_the_type_name() {
    let v = sample();
    let _ = v.get_single::<i64>(0);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn out_of_range_access_panics() {
    let v = sample();
    let _ = v.get_single::<Id>(3);
}

#[test]
fn spec_scenario_id_score() {
    // schema (Id: integer, Score: float); three pushes, sort by score,
    // swap-remove the head.
    let mut v = sample();
    assert_eq!(v.len(), 3);

    v.sort_by(|a: &Score, b: &Score| a.0 < b.0);
    assert_eq!(v.get_vector_aos_copy::<(Id, Score)>(), vec![
        (Id(2), Score(5.0)),
        (Id(3), Score(8.0)),
        (Id(1), Score(10.0)),
    ]);

    v.swap_remove(0);
    let mut rows = v.get_vector_aos_copy::<(Id, Score)>();
    rows.sort_by_key(|(id, _)| id.0);
    assert_eq!(rows, vec![(Id(1), Score(10.0)), (Id(3), Score(8.0))]);
    assert_eq!(v.len(), 2);
    assert_eq!(v.capacity(), 2);
}
