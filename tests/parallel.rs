use ironstream::testing::*;
use ironstream::*;
use ordered_float::OrderedFloat;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

fn par<T: Element>(data: Vec<T>, workers: usize) -> anyhow::Result<ParallelStream<T>> {
    ParallelStream::with_options(data, ParallelOptions::new().with_workers(workers))
}

#[test]
fn ranges_tile_the_source() -> anyhow::Result<()> {
    for workers in 1..=8 {
        let p = par((0..37).collect::<Vec<i32>>(), workers)?;
        assert_eq!(p.workers(), workers);
        assert_eq!(p.ranges().len(), workers);
        assert_partition_covers(p.ranges(), 37);
    }
    Ok(())
}

#[test]
fn parallel_map_matches_sequential_map() -> anyhow::Result<()> {
    let data: Vec<i64> = (0..1_003).collect();
    let expected = Stream::new(data.clone()).map(|x: &i64| x * x - 7).collect()?;
    for workers in [1, 2, 3, 4, 7, 16] {
        let got = par(data.clone(), workers)?.map(|x| x * x - 7).collect();
        assert_collections_equal(&got, &expected);
    }
    Ok(())
}

#[test]
fn parallel_filter_and_flat_map_preserve_order() -> anyhow::Result<()> {
    let data: Vec<u32> = (0..500).collect();
    let p = par(data.clone(), 6)?;

    let evens = p.filter(|x| x % 2 == 0).collect();
    let seq_evens: Vec<u32> = data.iter().copied().filter(|x| x % 2 == 0).collect();
    assert_collections_equal(&evens, &seq_evens);

    let doubled = p.flat_map(|x| vec![*x, *x]).collect();
    assert_eq!(doubled.len(), 1_000);
    assert_eq!(&doubled[..4], &[0, 0, 1, 1]);
    Ok(())
}

#[test]
fn derived_streams_keep_the_worker_count() -> anyhow::Result<()> {
    let p = par((0..100).collect::<Vec<i32>>(), 4)?.filter(|x| *x < 10);
    assert_eq!(p.count(), 10);
    assert_eq!(p.workers(), 4);
    assert_partition_covers(p.ranges(), 10);
    Ok(())
}

#[test]
fn for_each_touches_every_element() -> anyhow::Result<()> {
    let total = AtomicI64::new(0);
    par((1..=100).collect::<Vec<i64>>(), 5)?.for_each(|x| {
        total.fetch_add(x, Ordering::Relaxed);
    });
    assert_eq!(total.load(Ordering::Relaxed), 5_050);
    Ok(())
}

#[test]
fn for_each_runs_on_the_worker_pool() -> anyhow::Result<()> {
    let names = Mutex::new(Vec::new());
    par((0..8).collect::<Vec<i32>>(), 4)?.for_each(|_| {
        let name = std::thread::current().name().unwrap_or_default().to_string();
        names.lock().unwrap().push(name);
    });
    let names = names.into_inner().unwrap();
    assert_eq!(names.len(), 8);
    assert!(names.iter().all(|n| n.starts_with("ironstream-worker-")));
    Ok(())
}

#[test]
fn for_each_ordered_follows_the_index() -> anyhow::Result<()> {
    let mut seen = Vec::new();
    par(vec!['x', 'y', 'z'], 3)?.for_each_ordered(|c| seen.push(c));
    assert_eq!(seen, vec!['x', 'y', 'z']);
    Ok(())
}

#[test]
fn map_same_updates_contiguous_storage_in_place() -> anyhow::Result<()> {
    let mut p = par((0..10).collect::<Vec<i32>>(), 3)?;
    p.map_same(|x| x + 100)?;
    assert_eq!(p.collect(), (100..110).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn map_same_writes_back_through_set() -> anyhow::Result<()> {
    let mut p = ParallelStream::with_options(
        Floats::from(vec![1.0, 2.0, 3.0]),
        ParallelOptions::new().with_workers(2),
    )?;
    p.map_same(|x| OrderedFloat(x.0 * 0.5))?;
    assert_eq!(
        p.collect(),
        vec![OrderedFloat(0.5), OrderedFloat(1.0), OrderedFloat(1.5)]
    );
    Ok(())
}

#[test]
fn reduce_and_sum() -> anyhow::Result<()> {
    let p = par(vec![4, 9, 2, 9, 1, 7], 4)?;
    assert_eq!(p.reduce(|c, w| c > w), Some(9));
    assert!((p.sum(|x| f64::from(*x)) - 32.0).abs() < f64::EPSILON);
    Ok(())
}

#[test]
fn reduce_ties_match_the_sequential_engine() -> anyhow::Result<()> {
    let data = vec![(2, 'a'), (5, 'b'), (1, 'c'), (5, 'd'), (5, 'e')];
    let seq = Stream::new(data.clone()).reduce(|c, w| c.0 > w.0)?;
    for workers in 1..=5 {
        assert_eq!(par(data.clone(), workers)?.reduce(|c, w| c.0 > w.0), seq);
    }
    assert_eq!(seq, Some((5, 'b')));
    Ok(())
}

#[test]
fn empty_sources_have_empty_results() -> anyhow::Result<()> {
    let p = par(Vec::<i32>::new(), 4)?;
    assert!(p.ranges().is_empty());
    assert!(p.is_empty());
    assert_eq!(p.count(), 0);
    assert_eq!(p.reduce(|c, w| c > w), None);
    assert_eq!(p.sum(|x| f64::from(*x)), 0.0);
    assert!(p.map(|x| x + 1).collect().is_empty());
    assert!(p.top(3).collect().is_empty());
    assert_eq!(p.find_first(), None);
    Ok(())
}

#[test]
fn copy_is_independent() -> anyhow::Result<()> {
    let original = par(vec![1, 2, 3], 2)?;
    let mut copy = original.copy();
    copy.map_same(|x| -x)?;
    assert_eq!(copy.collect(), vec![-1, -2, -3]);
    assert_eq!(original.collect(), vec![1, 2, 3]);
    Ok(())
}

#[test]
fn sorting_recomputes_ranges() -> anyhow::Result<()> {
    let mut p = par(vec![5, 3, 9, 1, 7], 2)?;
    p.sorted();
    assert_eq!(p.collect(), vec![1, 3, 5, 7, 9]);
    assert_partition_covers(p.ranges(), 5);

    p.sorted_by(|a, b| b.cmp(a));
    assert_eq!(p.find_first(), Some(9));
    assert_eq!(p.element(4), Some(1));
    assert_eq!(p.element(5), None);
    Ok(())
}

#[test]
fn distinct_matches_sequential_distinct() -> anyhow::Result<()> {
    let data = vec![3, 1, 3, 2, 1, 4, 2, 5, 3];
    let seq = Stream::new(data.clone()).distinct().collect()?;
    for workers in 1..=6 {
        assert_eq!(par(data.clone(), workers)?.distinct().collect(), seq);
    }
    assert_eq!(seq, vec![3, 1, 2, 4, 5]);
    Ok(())
}

#[test]
fn top_matches_sequential_top() -> anyhow::Result<()> {
    let data = words("to be or not to be that is the question to be");
    let seq = Stream::new(data.clone()).top(4).collect()?;
    for workers in 1..=6 {
        let got = par(data.clone(), workers)?.top(4).collect();
        assert_eq!(got, seq, "workers = {workers}");
    }
    assert_eq!(seq[0], CountVal::new(3, "to".to_string()));
    assert_eq!(seq[1], CountVal::new(3, "be".to_string()));
    assert_counts_descending(&seq);
    Ok(())
}

#[test]
fn zero_workers_falls_back_to_one() -> anyhow::Result<()> {
    let p = par(vec![1, 2, 3], 0)?;
    assert_eq!(p.workers(), 1);
    assert_eq!(p.ranges(), &[PartitionRange::new(0, 3)]);
    Ok(())
}

#[test]
fn default_worker_count_follows_the_cpus() -> anyhow::Result<()> {
    let p = ParallelStream::new(vec![0u8; 4])?;
    assert_eq!(p.workers(), num_cpus::get().max(1));
    Ok(())
}

#[test]
fn switching_engines_both_ways() -> anyhow::Result<()> {
    let p = Stream::new((0..20).collect::<Vec<i32>>())
        .filter(|x: &i32| x % 4 == 0)
        .parallel_with(ParallelOptions::new().with_workers(3))?;
    assert_eq!(p.collect(), vec![0, 4, 8, 12, 16]);

    let back = p.map(|x| x / 4).into_stream().limit(3).collect()?;
    assert_eq!(back, vec![0, 1, 2]);
    Ok(())
}

#[test]
fn into_stream_keeps_the_stream_options() -> anyhow::Result<()> {
    let opts = StreamOptions::new().with_timeout(std::time::Duration::from_millis(1));
    let p = Stream::with_options(vec![1, 2, 3], opts).parallel_with(ParallelOptions::new().with_workers(2))?;
    std::thread::sleep(std::time::Duration::from_millis(20));
    let s = p.into_stream().map(|x: &i32| *x);
    let flag = s.correctness();
    assert!(s.collect()?.is_empty());
    assert!(!flag.is_correct());
    Ok(())
}

#[test]
fn closures_can_share_state_across_workers() -> anyhow::Result<()> {
    let hits = Arc::new(Mutex::new(0usize));
    let p = par((0..64).collect::<Vec<i32>>(), 8)?;
    let kept = p.filter(|x| {
        *hits.lock().unwrap() += 1;
        x % 8 == 0
    });
    assert_eq!(kept.count(), 8);
    assert_eq!(*hits.lock().unwrap(), 64);
    Ok(())
}
