//! Trivial single-participant backend.
//!
//! A group of one: rank 0, size 1, every collective an identity. Useful as a
//! drop-in `Comm` for code paths that should also run without a parallel
//! launch.

use super::{Comm, ReduceOp, Reducible};
use crate::error::CommError;

pub struct SerialComm;

impl SerialComm {
    pub fn new() -> Self {
        SerialComm
    }

    fn check_root(&self, root: usize) -> Result<(), CommError> {
        if root == 0 { Ok(()) } else { Err(CommError::InvalidRank { rank: root, size: 1 }) }
    }
}

impl Default for SerialComm {
    fn default() -> Self {
        Self::new()
    }
}

impl Comm for SerialComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn barrier(&self) {}

    fn broadcast<T: Clone + Send + 'static>(
        &self,
        value: Option<T>,
        root: usize,
    ) -> Result<T, CommError> {
        self.check_root(root)?;
        value.ok_or(CommError::RootMissingValue { root })
    }

    fn scatter<T: Clone + Send + 'static>(
        &self,
        global: Option<&[T]>,
        root: usize,
    ) -> Result<Vec<T>, CommError> {
        self.check_root(root)?;
        let global = global.ok_or(CommError::RootMissingValue { root })?;
        if global.is_empty() {
            return Err(CommError::ShortScatter { len: 0, size: 1 });
        }
        Ok(global.to_vec())
    }

    fn gather<T: Clone + Send + 'static>(
        &self,
        local: &[T],
        root: usize,
    ) -> Result<Option<Vec<T>>, CommError> {
        self.check_root(root)?;
        Ok(Some(local.to_vec()))
    }

    fn reduce<T: Reducible>(
        &self,
        local: &[T],
        op: ReduceOp,
        root: usize,
    ) -> Result<Option<T>, CommError> {
        self.check_root(root)?;
        Ok(Some(op.fold(local)))
    }
}
