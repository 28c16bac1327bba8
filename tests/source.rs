use ironstream::*;
use ordered_float::OrderedFloat;
use std::sync::Arc;

#[test]
fn vec_source_reads_in_order() {
    let v = vec!["a".to_string(), "b".to_string()];
    assert_eq!(IndexedSource::len(&v), 2);
    assert_eq!(IndexedSource::get(&v, 1), "b");
    assert_eq!(IndexedSource::to_vec(&v), v);
}

#[test]
fn vec_source_is_writable() -> anyhow::Result<()> {
    let mut v = vec![1, 2, 3];
    v.set(1, 20)?;
    assert_eq!(v, vec![1, 20, 3]);
    assert!(IndexedSource::as_mut_slice(&mut v).is_some());
    Ok(())
}

#[test]
fn boxed_slice_source_supports_subrange() {
    let b: Box<[u8]> = vec![1, 2, 3, 4].into_boxed_slice();
    let view = b.subrange(1, 3).expect("boxed slices copy sub-views");
    assert_eq!(view.to_vec(), vec![2, 3]);
}

#[test]
fn shared_slice_views_share_storage() {
    let all = SharedSlice::from((0..100).collect::<Vec<i32>>());
    let view = all.subrange(10, 20).expect("shared slices support views");
    assert_eq!(view.len(), 10);
    assert_eq!(view.get(0), 10);
    assert_eq!(all.share_count(), 2);

    let nested = view.subrange(5, 10).expect("nested view");
    assert_eq!(nested.to_vec(), vec![15, 16, 17, 18, 19]);
    assert_eq!(all.share_count(), 3);
}

#[test]
fn shared_slice_is_read_only() {
    let mut s = SharedSlice::new(Arc::from(vec![1, 2, 3]));
    let err = s.set(0, 9).unwrap_err();
    assert_eq!(
        err.downcast_ref::<StreamError>(),
        Some(&StreamError::Unsupported { capability: "set" })
    );
    assert_eq!(s.get(0), 1);
}

#[test]
fn integer_ranges_are_sources() {
    let r = 5i64..10;
    assert_eq!(IndexedSource::len(&r), 5);
    assert_eq!(IndexedSource::get(&r, 0), 5);
    assert_eq!(IndexedSource::get(&r, 4), 9);
    let view = IndexedSource::subrange(&r, 1, 3).expect("ranges narrow");
    assert_eq!(view.to_vec(), vec![6, 7]);

    let empty = 3u32..3;
    assert!(IndexedSource::is_empty(&empty));
}

#[test]
fn floats_expose_ordered_values() -> anyhow::Result<()> {
    let mut f = Floats::from(vec![1.5, -0.5, 2.0]);
    assert_eq!(f.get(0), OrderedFloat(1.5));
    f.set(1, OrderedFloat(3.0))?;
    assert_eq!(f.0, vec![1.5, 3.0, 2.0]);
    Ok(())
}

#[test]
fn floats_stream_through_distinct_and_sorted() -> anyhow::Result<()> {
    let out = Stream::new(Floats::from(vec![2.5, 1.0, 2.5, 0.5]))
        .distinct()
        .sorted()
        .collect()?;
    assert_eq!(out, vec![OrderedFloat(0.5), OrderedFloat(1.0), OrderedFloat(2.5)]);
    Ok(())
}

#[test]
fn custom_source_only_needs_get_and_len() -> anyhow::Result<()> {
    struct Squares(usize);

    impl IndexedSource<u64> for Squares {
        fn get(&self, index: usize) -> u64 {
            (index as u64) * (index as u64)
        }

        fn len(&self) -> usize {
            self.0
        }
    }

    let out = Stream::new(Squares(5)).limit(3).collect()?;
    assert_eq!(out, vec![0, 1, 4]);

    // Read-only and view-less: sorting falls back to a copy.
    let sorted = Stream::new(Squares(4)).sorted_by(|a, b| b.cmp(a)).collect()?;
    assert_eq!(sorted, vec![9, 4, 1, 0]);
    Ok(())
}

#[test]
fn subrange_rejects_inverted_or_out_of_bounds_views() {
    let shared = SharedSlice::from(vec![1, 2, 3, 4]);
    assert!(shared.subrange(3, 1).is_none());
    assert!(shared.subrange(2, 5).is_none());
    assert!(shared.subrange(4, 4).is_some_and(|v| v.is_empty()));

    let view = shared.subrange(1, 3).expect("in bounds");
    assert!(view.subrange(0, 3).is_none());

    let range = 10i64..14;
    assert!(IndexedSource::subrange(&range, 3, 1).is_none());
    assert!(IndexedSource::subrange(&range, 0, 5).is_none());

    let v = vec![1, 2, 3];
    assert!(IndexedSource::subrange(&v, 2, 1).is_none());
    assert!(IndexedSource::subrange(&v, 0, 4).is_none());

    let b: Box<[u8]> = vec![1, 2].into_boxed_slice();
    assert!(b.subrange(1, 3).is_none());

    let f = Floats::from(vec![1.0]);
    assert!(f.subrange(1, 0).is_none());
}
