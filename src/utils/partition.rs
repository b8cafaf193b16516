//! Deterministic splitting rule for scatter-style partitions.
//!
//! A sequence of length `len` is split across `n` ranks into contiguous,
//! near-equal slices: sizes differ by at most one element, and the lower
//! ranks take the larger slices. Concatenating the slices in rank order
//! reproduces the original sequence.

use std::ops::Range;

/// Number of elements rank `rank` receives when `len` elements are split `n` ways.
///
/// The first `len % n` ranks receive `len / n + 1` elements, the rest `len / n`.
/// `n` must be >= 1.
pub fn part_len(len: usize, n: usize, rank: usize) -> usize {
    debug_assert!(n >= 1, "cannot split across an empty group");
    len / n + usize::from(rank < len % n)
}

/// Index range of rank `rank`'s slice when `len` elements are split `n` ways.
/// `n` must be >= 1.
pub fn part_range(len: usize, n: usize, rank: usize) -> Range<usize> {
    debug_assert!(n >= 1, "cannot split across an empty group");
    let base = len / n;
    let rem = len % n;
    let start = rank * base + rank.min(rem);
    start..start + part_len(len, n, rank)
}

/// Splits `seq` into `n` rank-ordered slices under the same rule.
/// `n` must be >= 1.
pub fn split<T>(seq: &[T], n: usize) -> Vec<&[T]> {
    debug_assert!(n >= 1, "cannot split across an empty group");
    (0..n).map(|rank| &seq[part_range(seq.len(), n, rank)]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_differ_by_at_most_one() {
        for len in 0..40 {
            for n in 1..9 {
                let lens: Vec<usize> = (0..n).map(|r| part_len(len, n, r)).collect();
                let min = *lens.iter().min().unwrap();
                let max = *lens.iter().max().unwrap();
                assert!(max - min <= 1, "len={} n={} lens={:?}", len, n, lens);
                assert_eq!(lens.iter().sum::<usize>(), len);
            }
        }
    }

    #[test]
    fn lower_ranks_take_the_larger_slices() {
        // 10 elements over 4 ranks: 3,3,2,2
        let lens: Vec<usize> = (0..4).map(|r| part_len(10, 4, r)).collect();
        assert_eq!(lens, vec![3, 3, 2, 2]);
    }

    #[test]
    fn ranges_tile_the_sequence() {
        for len in 0..30 {
            for n in 1..7 {
                let mut next = 0;
                for rank in 0..n {
                    let range = part_range(len, n, rank);
                    assert_eq!(range.start, next);
                    next = range.end;
                }
                assert_eq!(next, len);
            }
        }
    }

    #[test]
    #[should_panic(expected = "cannot split across an empty group")]
    fn splitting_across_zero_ranks_is_rejected() {
        part_len(10, 0, 0);
    }

    #[test]
    fn split_concatenates_to_identity() {
        let seq: Vec<i32> = (0..23).collect();
        let parts = split(&seq, 5);
        assert_eq!(parts.len(), 5);
        let rejoined: Vec<i32> = parts.iter().flat_map(|p| p.iter().copied()).collect();
        assert_eq!(rejoined, seq);
    }
}
