//! Thread-backed participant group.
//!
//! This backend realizes the "launch N identical processes" contract of an
//! `mpirun`-style launcher inside a single process: [`ThreadComm::launch`]
//! spawns one OS thread per participant, hands each its own `ThreadComm`
//! endpoint, and joins the group when the driving closure returns on every
//! rank. Because the whole group lives in-process, every collective and
//! point-to-point exchange is exercisable by ordinary unit tests.
//!
//! Internally each participant owns two mailbox planes over crossbeam
//! channels: one for user point-to-point traffic (exact source/tag matching,
//! see [`crate::channel`]) and one reserved for collectives, keyed by a
//! per-participant collective sequence number. The sequence numbers line up
//! across ranks precisely because collectives must be invoked group-wide in
//! the same relative order; a group that violates that invariant hangs, it
//! does not error.

use std::any::Any;
use std::cell::Cell;
use std::sync::{Arc, Barrier};
use std::thread;

use crossbeam::channel::{Receiver, Sender, unbounded};
use log::debug;

use super::{Comm, ReduceOp, Reducible};
use crate::channel::{Envelope, Mailbox, Tag};
use crate::config::LaunchOptions;
use crate::error::CommError;
use crate::utils::partition::part_range;

/// One participant's endpoint into a thread-backed group.
///
/// Endpoints are created only by [`ThreadComm::launch`]; each participant
/// thread owns exactly one and the identity (rank, size) is fixed for the
/// lifetime of the run.
pub struct ThreadComm {
    rank: usize,
    size: usize,
    /// Point-to-point plane: senders into every rank's user mailbox.
    pub(crate) peers: Vec<Sender<Envelope>>,
    /// Point-to-point plane: this rank's user mailbox.
    pub(crate) mailbox: Mailbox,
    /// Collective plane, kept apart so collectives never collide with user tags.
    coll_peers: Vec<Sender<Envelope>>,
    coll_mailbox: Mailbox,
    /// Collective sequence number; advances identically on every rank.
    coll_seq: Cell<Tag>,
    fence: Arc<Barrier>,
}

fn plane(size: usize) -> (Vec<Sender<Envelope>>, Vec<Receiver<Envelope>>) {
    let mut txs = Vec::with_capacity(size);
    let mut rxs = Vec::with_capacity(size);
    for _ in 0..size {
        let (tx, rx) = unbounded();
        txs.push(tx);
        rxs.push(rx);
    }
    (txs, rxs)
}

impl ThreadComm {
    /// Runs `f` on every rank of a fresh group of `size` participants, one
    /// thread per rank, and returns the per-rank results in rank order.
    ///
    /// A panic on any rank is propagated to the caller once the group joins.
    pub fn launch<T, F>(size: usize, f: F) -> Result<Vec<T>, CommError>
    where
        F: Fn(ThreadComm) -> T + Send + Sync,
        T: Send,
    {
        Self::launch_with(&LaunchOptions::new(size), f)
    }

    /// [`ThreadComm::launch`] with explicit thread parameters.
    pub fn launch_with<T, F>(opts: &LaunchOptions, f: F) -> Result<Vec<T>, CommError>
    where
        F: Fn(ThreadComm) -> T + Send + Sync,
        T: Send,
    {
        let size = opts.size;
        if size == 0 {
            return Err(CommError::EmptyGroup);
        }
        let (peer_txs, peer_rxs) = plane(size);
        let (coll_txs, coll_rxs) = plane(size);
        let fence = Arc::new(Barrier::new(size));

        let mut endpoints = Vec::with_capacity(size);
        for (rank, (peer_rx, coll_rx)) in peer_rxs.into_iter().zip(coll_rxs).enumerate() {
            endpoints.push(ThreadComm {
                rank,
                size,
                peers: peer_txs.clone(),
                mailbox: Mailbox::new(peer_rx),
                coll_peers: coll_txs.clone(),
                coll_mailbox: Mailbox::new(coll_rx),
                coll_seq: Cell::new(0),
                fence: Arc::clone(&fence),
            });
        }

        debug!("launching group of {size} participants");
        let f = &f;
        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(size);
            for comm in endpoints {
                let mut builder = thread::Builder::new().name(format!("cohort-{}", comm.rank));
                if let Some(bytes) = opts.stack_size {
                    builder = builder.stack_size(bytes);
                }
                handles.push(builder.spawn_scoped(scope, move || f(comm))?);
            }
            let mut results = Vec::with_capacity(size);
            for handle in handles {
                match handle.join() {
                    Ok(value) => results.push(value),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            Ok(results)
        })
    }

    pub(crate) fn check_rank(&self, rank: usize) -> Result<(), CommError> {
        if rank < self.size {
            Ok(())
        } else {
            Err(CommError::InvalidRank { rank, size: self.size })
        }
    }

    fn next_seq(&self) -> Tag {
        let seq = self.coll_seq.get();
        self.coll_seq.set(seq + 1);
        seq
    }

    fn coll_send(
        &self,
        dest: usize,
        seq: Tag,
        payload: Box<dyn Any + Send>,
    ) -> Result<(), CommError> {
        self.coll_peers[dest]
            .send(Envelope { src: self.rank, tag: seq, payload })
            .map_err(|_| CommError::Disconnected)
    }

    fn coll_recv<T: Send + 'static>(&self, source: usize, seq: Tag) -> Result<T, CommError> {
        let env = self.coll_mailbox.match_next(source, seq)?;
        env.payload
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| CommError::PayloadType { source, tag: seq })
    }

    /// Rejects a `Some` argument on a non-root rank, or a `None` on the root.
    fn rooted_input<V: ?Sized>(&self, value: Option<&V>, root: usize) -> Result<(), CommError> {
        if self.rank != root && value.is_some() {
            return Err(CommError::NonRootValue { rank: self.rank, root });
        }
        if self.rank == root && value.is_none() {
            return Err(CommError::RootMissingValue { root });
        }
        Ok(())
    }
}

impl Comm for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn barrier(&self) {
        self.fence.wait();
    }

    fn broadcast<T: Clone + Send + 'static>(
        &self,
        value: Option<T>,
        root: usize,
    ) -> Result<T, CommError> {
        // Synchronize and consume the sequence number before validating, so a
        // rank that errors out leaves the group's collective ordering intact.
        self.barrier();
        let seq = self.next_seq();
        self.check_rank(root)?;
        self.rooted_input(value.as_ref(), root)?;
        if self.rank == root {
            let value = value.ok_or(CommError::RootMissingValue { root })?;
            for dest in 0..self.size {
                if dest != self.rank {
                    self.coll_send(dest, seq, Box::new(value.clone()))?;
                }
            }
            Ok(value)
        } else {
            self.coll_recv(root, seq)
        }
    }

    fn scatter<T: Clone + Send + 'static>(
        &self,
        global: Option<&[T]>,
        root: usize,
    ) -> Result<Vec<T>, CommError> {
        self.barrier();
        let seq = self.next_seq();
        self.check_rank(root)?;
        self.rooted_input(global, root)?;
        if self.rank == root {
            let global = global.ok_or(CommError::RootMissingValue { root })?;
            if global.len() < self.size {
                return Err(CommError::ShortScatter { len: global.len(), size: self.size });
            }
            let mut own = Vec::new();
            for dest in 0..self.size {
                let slice = global[part_range(global.len(), self.size, dest)].to_vec();
                if dest == self.rank {
                    own = slice;
                } else {
                    self.coll_send(dest, seq, Box::new(slice))?;
                }
            }
            Ok(own)
        } else {
            self.coll_recv(root, seq)
        }
    }

    fn gather<T: Clone + Send + 'static>(
        &self,
        local: &[T],
        root: usize,
    ) -> Result<Option<Vec<T>>, CommError> {
        self.barrier();
        let seq = self.next_seq();
        self.check_rank(root)?;
        if self.rank == root {
            let mut out = Vec::with_capacity(local.len() * self.size);
            for src in 0..self.size {
                if src == self.rank {
                    out.extend_from_slice(local);
                } else {
                    out.extend(self.coll_recv::<Vec<T>>(src, seq)?);
                }
            }
            Ok(Some(out))
        } else {
            self.coll_send(root, seq, Box::new(local.to_vec()))?;
            Ok(None)
        }
    }

    fn reduce<T: Reducible>(
        &self,
        local: &[T],
        op: ReduceOp,
        root: usize,
    ) -> Result<Option<T>, CommError> {
        self.barrier();
        let seq = self.next_seq();
        self.check_rank(root)?;
        let partial = op.fold(local);
        if self.rank == root {
            let mut acc = op.identity();
            for src in 0..self.size {
                let value = if src == self.rank { partial } else { self.coll_recv(src, seq)? };
                acc = op.combine(acc, value);
            }
            Ok(Some(acc))
        } else {
            self.coll_send(root, seq, Box::new(partial))?;
            Ok(None)
        }
    }
}
