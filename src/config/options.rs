//! Launch options for a participant group.
//!
//! This module provides the `LaunchOptions` struct, which is used to specify
//! how `ThreadComm::launch_with` starts a group: the group size (the number
//! of participant threads, i.e. the `N` of an `mpirun -n N` style launch) and
//! optional per-participant thread parameters.

/// Group launch parameters.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Number of participants in the group (must be >= 1)
    pub size: usize,

    /// Stack size in bytes for each participant thread (None = platform default)
    pub stack_size: Option<usize>,
}

impl LaunchOptions {
    /// Options for a group of `size` participants with default thread parameters.
    pub fn new(size: usize) -> Self {
        LaunchOptions { size, stack_size: None }
    }

    /// Sets the per-participant thread stack size in bytes.
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }
}
