//! Bounded worker pool for embarrassingly parallel slice maps.
//!
//! The local-machine counterpart of the scatter/compute/gather cycle: a
//! grid is split into independent row slices, a pure function is mapped over
//! the slices by a bounded rayon pool, and the results come back in task
//! order so concatenating them reproduces the serial result exactly.

use rayon::prelude::*;

use crate::error::CommError;
use crate::utils::partition::part_range;
use std::ops::Range;

/// A bounded rayon thread pool mapping pure functions over independent tasks.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    threads: usize,
}

impl WorkerPool {
    /// Builds a pool of `threads` workers; `0` means one per available CPU.
    pub fn new(threads: usize) -> Result<Self, CommError> {
        let threads = if threads == 0 { num_cpus::get() } else { threads };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| CommError::Pool(e.to_string()))?;
        Ok(WorkerPool { pool, threads })
    }

    /// Number of workers in the pool.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Maps `f` over `tasks` on the pool, preserving task order.
    ///
    /// `f` must be pure: tasks share no mutable state, so the result is
    /// element-for-element identical to the serial map for any pool size.
    pub fn map<T, U, F>(&self, tasks: Vec<T>, f: F) -> Vec<U>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> U + Send + Sync,
    {
        self.pool.install(|| tasks.into_par_iter().map(f).collect())
    }
}

/// Splits `nrows` grid rows into `nslices` contiguous, near-equal,
/// rank-ordered ranges (same rule as a scatter partition).
/// `nslices` must be >= 1.
pub fn split_rows(nrows: usize, nslices: usize) -> Vec<Range<usize>> {
    debug_assert!(nslices >= 1, "cannot split across an empty group");
    (0..nslices).map(|i| part_range(nrows, nslices, i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_preserves_task_order() {
        let pool = WorkerPool::new(3).unwrap();
        let tasks: Vec<u64> = (0..64).collect();
        let out = pool.map(tasks.clone(), |x| x * x);
        let serial: Vec<u64> = tasks.iter().map(|x| x * x).collect();
        assert_eq!(out, serial);
    }

    #[test]
    fn zero_threads_means_all_cpus() {
        let pool = WorkerPool::new(0).unwrap();
        assert_eq!(pool.threads(), num_cpus::get());
    }

    #[test]
    fn split_rows_tiles_the_grid() {
        let ranges = split_rows(10, 4);
        assert_eq!(ranges, vec![0..3, 3..6, 6..8, 8..10]);
    }
}
