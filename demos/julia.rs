//! Julia-set escape counts over a worker pool.
//!
//! The grid of the square [-extent, extent]^2 is split into horizontal row
//! slices; each slice is an independent, side-effect-free task, so a bounded
//! pool maps the per-slice function and concatenating the results in task
//! order reproduces the serial grid exactly.
//!
//! Run with: cargo run --example julia

use cohort::pool::{WorkerPool, split_rows};
use std::ops::Range;

const EXTENT: f64 = 2.0;
const CELLS: usize = 400;
const ITERS: u32 = 80;
const C: (f64, f64) = (-0.83, -0.22);

/// Escape counts for the grid rows in `rows`, row-major.
///
/// Iterates z := z^2 + c from each grid point and counts the steps for which
/// |z| stays finite; once an orbit overflows to infinity it simply stops
/// counting, there is nothing to report.
fn julia_slice(rows: Range<usize>) -> Vec<u32> {
    let step = 2.0 * EXTENT / CELLS as f64;
    let mut counts = Vec::with_capacity(rows.len() * CELLS);
    for i in rows {
        let im0 = -EXTENT + i as f64 * step;
        for j in 0..CELLS {
            let re0 = -EXTENT + j as f64 * step;
            let (mut re, mut im) = (re0, im0);
            let mut count = 0;
            for _ in 0..ITERS {
                let (re2, im2) = (re * re - im * im + C.0, 2.0 * re * im + C.1);
                re = re2;
                im = im2;
                if (re * re + im * im).is_finite() {
                    count += 1;
                }
            }
            counts.push(count);
        }
    }
    counts
}

fn main() {
    env_logger::init();

    let nslices = 8;
    let pool = WorkerPool::new(4).unwrap();
    println!(
        "computing a {}x{} Julia grid in {} slices on {} workers",
        CELLS,
        CELLS,
        nslices,
        pool.threads()
    );

    let parts = pool.map(split_rows(CELLS, nslices), julia_slice);
    let fractal: Vec<u32> = parts.concat();

    assert_eq!(fractal.len(), CELLS * CELLS);
    let interior = fractal.iter().filter(|&&c| c == ITERS).count();
    let total: u64 = fractal.iter().map(|&c| u64::from(c)).sum();
    println!(
        "done: {} of {} cells never escaped, mean escape count {:.2}",
        interior,
        fractal.len(),
        total as f64 / fractal.len() as f64
    );
}
