use thiserror::Error;

// Unified error type for cohort

#[derive(Error, Debug)]
pub enum CommError {
    #[error("group size must be at least 1")]
    EmptyGroup,
    #[error("rank {rank} is outside the group of size {size}")]
    InvalidRank { rank: usize, size: usize },
    #[error("root rank {root} supplied no value to a rooted collective")]
    RootMissingValue { root: usize },
    #[error("rank {rank} supplied a value to a collective rooted at {root}")]
    NonRootValue { rank: usize, root: usize },
    #[error("scatter sequence of length {len} is shorter than the group size {size}")]
    ShortScatter { len: usize, size: usize },
    #[error("message from rank {source} with tag {tag} holds a different payload type than requested")]
    PayloadType { r#source: usize, tag: u64 },
    #[error("participant channel disconnected")]
    Disconnected,
    #[error("failed to spawn participant thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[cfg(feature = "rayon")]
    #[error("worker pool construction failed: {0}")]
    Pool(String),
}
