//! cohort: rank-addressed group communication, simulated in-process
//!
//! This crate implements the classic distributed data-parallel pattern: a fixed-size
//! group of participants identified by rank, the four canonical collective operations
//! (broadcast, scatter, gather, reduce), tag-addressed point-to-point channels in
//! blocking and non-blocking variants, and a bounded worker pool for embarrassingly
//! parallel slice maps. The group runs as one OS thread per participant inside a
//! single process, so everything is exercisable by ordinary unit tests without a
//! multi-process launch.

pub mod comm;

pub mod channel;
pub mod config;
pub mod error;
pub mod utils;

#[cfg(feature = "rayon")]
pub mod pool;

// Re-exports for convenience
pub use channel::*;
pub use comm::*;
pub use config::*;
pub use error::*;
pub use utils::*;

#[cfg(feature = "rayon")]
pub use pool::*;
