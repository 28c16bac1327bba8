use ironstream::split::{PartitionRange, split};
use ironstream::testing::assert_partition_covers;

#[test]
fn splits_evenly_with_remainder_first() {
    assert_eq!(
        split(10, 3),
        vec![
            PartitionRange::new(0, 4),
            PartitionRange::new(4, 7),
            PartitionRange::new(7, 10),
        ]
    );
}

#[test]
fn empty_index_space_has_no_ranges() {
    assert!(split(0, 4).is_empty());
    assert!(split(0, 0).is_empty());
}

#[test]
fn more_workers_than_elements() {
    let ranges = split(3, 8);
    assert_eq!(ranges.len(), 3);
    assert!(ranges.iter().all(|r| r.len() == 1));
}

#[test]
fn zero_workers_means_one_range() {
    assert_eq!(split(5, 0), vec![PartitionRange::new(0, 5)]);
}

#[test]
fn ranges_always_tile_the_index_space() {
    for size in 0..60 {
        for workers in 0..12 {
            let ranges = split(size, workers);
            assert_partition_covers(&ranges, size);
            if size > 0 {
                assert_eq!(ranges.len(), workers.clamp(1, size));
            }
        }
    }
}

#[test]
fn range_helpers() {
    let r = PartitionRange::new(3, 7);
    assert_eq!(r.len(), 4);
    assert!(!r.is_empty());
    assert_eq!(r.indices().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
    assert!(PartitionRange::new(2, 2).is_empty());
}
