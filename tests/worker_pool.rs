//! Tests for the bounded worker pool against the serial baseline.
//!
//! The pool maps a pure function over independent grid slices; the result
//! must be element-for-element identical to applying the function serially,
//! for every pool size from 1 up to the number of slices.

#![cfg(feature = "rayon")]

use cohort::pool::{WorkerPool, split_rows};
use std::ops::Range;

/// A pure per-slice function over a grid: cell (i, j) -> sin(i) * cos(j).
/// Row-major output for the rows in `rows`.
fn grid_slice(rows: Range<usize>, ncols: usize) -> Vec<f64> {
    rows.flat_map(|i| (0..ncols).map(move |j| (i as f64).sin() * (j as f64).cos()))
        .collect()
}

/// Pool map over K slices equals the serial map, for every pool size P in
/// 1..=K, on a grid whose row count is not divisible by K.
#[test]
fn pooled_map_equals_serial_for_every_pool_size() {
    let nrows = 37;
    let ncols = 19;
    let nslices = 5;

    let serial = grid_slice(0..nrows, ncols);
    for threads in 1..=nslices {
        let pool = WorkerPool::new(threads).unwrap();
        let parts = pool.map(split_rows(nrows, nslices), |rows| grid_slice(rows, ncols));
        let pooled: Vec<f64> = parts.concat();
        assert_eq!(pooled, serial, "pool size {}", threads);
    }
}

/// More slices than workers: the bounded pool drains the whole task list.
#[test]
fn more_slices_than_workers() {
    let pool = WorkerPool::new(2).unwrap();
    let parts = pool.map(split_rows(100, 10), |rows| grid_slice(rows, 8));
    assert_eq!(parts.len(), 10);
    assert_eq!(parts.concat(), grid_slice(0..100, 8));
}

/// Slice ranges tile the grid in order with near-equal sizes.
#[test]
fn split_rows_covers_grid_in_order() {
    let ranges = split_rows(23, 4);
    assert_eq!(ranges.first().unwrap().start, 0);
    assert_eq!(ranges.last().unwrap().end, 23);
    for pair in ranges.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
    let sizes: Vec<usize> = ranges.iter().map(|r| r.len()).collect();
    assert_eq!(sizes, vec![6, 6, 6, 5]);
}
