use ironstream::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn for_each_visits_in_order() -> anyhow::Result<()> {
    let mut seen = Vec::new();
    Stream::new(vec![1, 2, 3]).map(|x: &i32| x * 2).for_each(|x| seen.push(x))?;
    assert_eq!(seen, vec![2, 4, 6]);
    Ok(())
}

#[test]
fn reduce_keeps_the_best() -> anyhow::Result<()> {
    let max = Stream::new(vec![4, 9, 2, 9, 1]).reduce(|c, w| c > w)?;
    assert_eq!(max, Some(9));

    let empty = Stream::new(Vec::<i32>::new()).reduce(|c, w| c > w)?;
    assert_eq!(empty, None);
    Ok(())
}

#[test]
fn reduce_ties_keep_the_earlier_element() -> anyhow::Result<()> {
    let best = Stream::new(vec![(1, 'a'), (3, 'b'), (3, 'c')]).reduce(|c, w| c.0 > w.0)?;
    assert_eq!(best, Some((3, 'b')));
    Ok(())
}

#[test]
fn counting_terminals() -> anyhow::Result<()> {
    assert_eq!(Stream::new(0i64..10).count()?, 10);
    assert_eq!(Stream::new(0i64..10).filter_count(|x| x % 3 == 0)?, 4);
    assert!(Stream::new(Vec::<u8>::new()).is_empty()?);
    assert!(!Stream::new(vec![0u8]).is_empty()?);
    assert!(Stream::new(vec![1, 2]).filter(|x: &i32| *x > 5).is_empty()?);
    Ok(())
}

#[test]
fn sum_maps_to_f64() -> anyhow::Result<()> {
    let total = Stream::new(vec![1.5f32, 2.5]).sum(|x| f64::from(*x))?;
    assert!((total - 4.0).abs() < f64::EPSILON);
    assert_eq!(Stream::new(Vec::<i32>::new()).sum(|x| f64::from(*x))?, 0.0);
    Ok(())
}

#[test]
fn match_terminals() -> anyhow::Result<()> {
    assert!(Stream::new(vec![1, 2, 3]).any_match(|x| *x == 2)?);
    assert!(!Stream::new(vec![1, 2, 3]).any_match(|x| *x == 7)?);
    assert!(Stream::new(vec![2, 4]).all_match(|x| x % 2 == 0)?);
    assert!(!Stream::new(vec![2, 5]).all_match(|x| x % 2 == 0)?);
    assert!(Stream::new(vec![1, 3]).none_match(|x| x % 2 == 0)?);
    assert!(!Stream::new(vec![1, 4]).none_match(|x| x % 2 == 0)?);
    Ok(())
}

#[test]
fn match_terminals_on_empty_streams() -> anyhow::Result<()> {
    assert!(!Stream::new(Vec::<i32>::new()).any_match(|_| true)?);
    assert!(Stream::new(Vec::<i32>::new()).all_match(|_| false)?);
    assert!(Stream::new(Vec::<i32>::new()).none_match(|_| true)?);
    Ok(())
}

#[test]
fn positional_terminals() -> anyhow::Result<()> {
    assert_eq!(Stream::new(vec![7, 8, 9]).find_first()?, Some(7));
    assert_eq!(Stream::new(Vec::<i32>::new()).find_first()?, None);
    assert_eq!(Stream::new(vec![7, 8, 9]).element(2)?, Some(9));
    assert_eq!(Stream::new(vec![7, 8, 9]).element(3)?, None);
    assert_eq!(Stream::new(vec![7, 8, 9]).skip(1).element(0)?, Some(8));
    Ok(())
}

#[test]
fn short_circuiting_terminals_stop_upstream() -> anyhow::Result<()> {
    let produced = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&produced);

    let found = Stream::with_options(0i64..i64::MAX, StreamOptions::new().with_buffer_size(4))
        .peek(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        })
        .map(|x: &i64| x * 2)
        .any_match(|x| *x == 20)?;

    assert!(found);
    assert!(produced.load(Ordering::Relaxed) < 1_000);
    Ok(())
}

#[test]
fn find_first_on_an_unbounded_source_returns() -> anyhow::Result<()> {
    let first = Stream::new(0u64..u64::MAX).filter(|x| *x > 100).find_first()?;
    assert_eq!(first, Some(101));
    Ok(())
}
