//! Group communication: the `Comm` trait and its backends.
//!
//! A `Comm` value is one participant's endpoint into a fixed-size group: it
//! answers the topology queries (own rank, group size) and carries the four
//! canonical collectives. Every collective must be invoked by all
//! participants of the group in the same relative order; each one is a group
//! synchronization point, and a participant whose counterparts never make the
//! call blocks indefinitely rather than observing an error.

use num_traits::{Bounded, One, Zero};

use crate::error::CommError;

/// Element type accepted by [`Comm::reduce`]: the numeric bounds needed for
/// the operator identities (`Zero` for Sum, `One` for Prod, `Bounded` for
/// Min/Max).
pub trait Reducible: Copy + Send + PartialOrd + Zero + One + Bounded + 'static {}

impl<T: Copy + Send + PartialOrd + Zero + One + Bounded + 'static> Reducible for T {}

/// Associative, commutative reduction operator.
///
/// Associativity and commutativity are what make the partition-local fold
/// followed by a cross-rank combine equal to the fold over the whole
/// sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReduceOp {
    Sum,
    Prod,
    Min,
    Max,
}

impl ReduceOp {
    /// The operator's identity element.
    pub fn identity<T: Reducible>(self) -> T {
        match self {
            ReduceOp::Sum => T::zero(),
            ReduceOp::Prod => T::one(),
            ReduceOp::Min => T::max_value(),
            ReduceOp::Max => T::min_value(),
        }
    }

    /// Combines two partial results.
    pub fn combine<T: Reducible>(self, a: T, b: T) -> T {
        match self {
            ReduceOp::Sum => a + b,
            ReduceOp::Prod => a * b,
            ReduceOp::Min => {
                if b < a { b } else { a }
            }
            ReduceOp::Max => {
                if b > a { b } else { a }
            }
        }
    }

    /// Folds a local slice down to one partial result. Empty slices yield the
    /// identity.
    pub fn fold<T: Reducible>(self, xs: &[T]) -> T {
        xs.iter().copied().fold(self.identity(), |acc, x| self.combine(acc, x))
    }
}

pub trait Comm {
    /// This participant's rank within the group.
    fn rank(&self) -> usize;

    /// Number of participants in the group.
    fn size(&self) -> usize;

    /// Blocks until every participant has reached the barrier.
    fn barrier(&self);

    /// One-to-all: the root's value is delivered to every participant.
    ///
    /// Only the root passes `Some`; every rank (root included) returns the
    /// same value.
    fn broadcast<T: Clone + Send + 'static>(
        &self,
        value: Option<T>,
        root: usize,
    ) -> Result<T, CommError>;

    /// Partition-to-all: the root's sequence is split into rank-ordered,
    /// near-equal slices and slice `i` is delivered to rank `i`.
    ///
    /// Only the root passes `Some`; the sequence must hold at least one
    /// element per rank. Slice sizes differ by at most one, lower ranks
    /// taking the larger slices.
    fn scatter<T: Clone + Send + 'static>(
        &self,
        global: Option<&[T]>,
        root: usize,
    ) -> Result<Vec<T>, CommError>;

    /// All-to-one: the inverse of scatter. The root returns `Some` holding
    /// every rank's slice concatenated in rank order; other ranks return
    /// `None`.
    fn gather<T: Clone + Send + 'static>(
        &self,
        local: &[T],
        root: usize,
    ) -> Result<Option<Vec<T>>, CommError>;

    /// All-to-one combine: folds each rank's slice locally, combines the
    /// partial results across ranks, and delivers the single result to the
    /// root (`Some` at root, `None` elsewhere).
    fn reduce<T: Reducible>(
        &self,
        local: &[T],
        op: ReduceOp,
        root: usize,
    ) -> Result<Option<T>, CommError>;

    /// Reduce delivered to every rank: reduce at rank 0, then broadcast.
    fn all_reduce<T: Reducible>(&self, local: &[T], op: ReduceOp) -> Result<T, CommError> {
        let combined = self.reduce(local, op, 0)?;
        self.broadcast(combined, 0)
    }
}

pub mod serial_comm;
pub mod thread_comm;

pub use serial_comm::SerialComm;
pub use thread_comm::ThreadComm;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_matches_serial_fold() {
        let xs = [3_i64, 1, 4, 1, 5, 9, 2, 6];
        assert_eq!(ReduceOp::Sum.fold(&xs), xs.iter().sum::<i64>());
        assert_eq!(ReduceOp::Prod.fold(&xs), xs.iter().product::<i64>());
        assert_eq!(ReduceOp::Min.fold(&xs), 1);
        assert_eq!(ReduceOp::Max.fold(&xs), 9);
    }

    #[test]
    fn fold_of_empty_slice_is_identity() {
        let none: [i32; 0] = [];
        assert_eq!(ReduceOp::Sum.fold(&none), 0);
        assert_eq!(ReduceOp::Prod.fold(&none), 1);
        assert_eq!(ReduceOp::Min.fold(&none), i32::MAX);
        assert_eq!(ReduceOp::Max.fold(&none), i32::MIN);
    }

    #[test]
    fn combine_is_commutative() {
        for op in [ReduceOp::Sum, ReduceOp::Prod, ReduceOp::Min, ReduceOp::Max] {
            assert_eq!(op.combine(4_i32, 9), op.combine(9, 4));
        }
    }
}
