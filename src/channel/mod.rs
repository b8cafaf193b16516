//! Tag-addressed point-to-point channels between participants.
//!
//! Each participant owns a mailbox of incoming envelopes. A receive names an
//! exact (source rank, tag) pair; envelopes that arrive for other pairs are
//! stashed and handed to later matching receives, so delivery for any single
//! (source, tag) pair is FIFO while unrelated exchanges interleave freely.
//!
//! Blocking `send` completes once the payload has been moved into the
//! destination mailbox, which is the only ordering a sender may rely on: the
//! receiver has not necessarily taken delivery. The non-blocking variants
//! return first-class pending handles ([`SendRequest`], [`RecvRequest`]) whose
//! `wait` yields the same result as the blocking calls. A receive with no
//! matching counterpart send blocks indefinitely; that mismatch is not
//! detected or reported.

use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::marker::PhantomData;

use crossbeam::channel::Receiver;
use log::trace;

use crate::comm::{Comm, ThreadComm};
use crate::error::CommError;

/// Message tag disambiguating concurrent exchanges between the same pair of ranks.
pub type Tag = u64;

/// One in-flight message: source rank, tag, opaque payload.
pub(crate) struct Envelope {
    pub(crate) src: usize,
    pub(crate) tag: Tag,
    pub(crate) payload: Box<dyn Any + Send>,
}

/// Incoming endpoint of one participant: the channel receiver plus a stash of
/// envelopes that arrived for (source, tag) pairs nobody has asked for yet.
pub(crate) struct Mailbox {
    incoming: Receiver<Envelope>,
    stash: RefCell<VecDeque<Envelope>>,
}

impl Mailbox {
    pub(crate) fn new(incoming: Receiver<Envelope>) -> Self {
        Mailbox { incoming, stash: RefCell::new(VecDeque::new()) }
    }

    /// Blocks until an envelope matching (source, tag) is available, stashing
    /// every non-matching envelope pulled off the channel along the way.
    pub(crate) fn match_next(&self, source: usize, tag: Tag) -> Result<Envelope, CommError> {
        let mut stash = self.stash.borrow_mut();
        if let Some(pos) = stash.iter().position(|e| e.src == source && e.tag == tag) {
            // remove preserves FIFO order within the (source, tag) pair
            return Ok(stash.remove(pos).unwrap());
        }
        loop {
            let env = self.incoming.recv().map_err(|_| CommError::Disconnected)?;
            if env.src == source && env.tag == tag {
                return Ok(env);
            }
            stash.push_back(env);
        }
    }
}

/// Pending non-blocking send.
///
/// The payload is already buffered when the handle is issued, so `wait`
/// returns immediately; the handle exists so callers mark the completion
/// point explicitly.
#[must_use = "a pending send should be waited on"]
pub struct SendRequest {
    _private: (),
}

impl SendRequest {
    pub(crate) fn issued() -> Self {
        SendRequest { _private: () }
    }

    /// Completes the send. Never blocks.
    pub fn wait(self) -> Result<(), CommError> {
        Ok(())
    }
}

/// Pending non-blocking receive of a `T` from (source, tag).
///
/// The received value exists only after `wait` returns; the issuing
/// participant may do unrelated work in between. Issued -> Completed on
/// `wait`; there is no cancellation.
#[must_use = "a pending receive yields its value only through wait()"]
pub struct RecvRequest<'a, T> {
    comm: &'a ThreadComm,
    source: usize,
    tag: Tag,
    _payload: PhantomData<fn() -> T>,
}

impl<'a, T: Send + 'static> RecvRequest<'a, T> {
    /// The rank this receive is matched against.
    pub fn source(&self) -> usize {
        self.source
    }

    /// The tag this receive is matched against.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Blocks until the matching send has been delivered, then yields the value.
    /// Returns without blocking if the message has already arrived.
    pub fn wait(self) -> Result<T, CommError> {
        self.comm.recv(self.source, self.tag)
    }
}

impl ThreadComm {
    /// Blocking send of `value` to `dest` under `tag`.
    ///
    /// Completes once the payload is buffered at the destination; this says
    /// nothing about whether the receiver has executed its matching receive.
    pub fn send<T: Send + 'static>(&self, value: T, dest: usize, tag: Tag) -> Result<(), CommError> {
        self.check_rank(dest)?;
        trace!("rank {} -> rank {} tag {}", self.rank(), dest, tag);
        self.peers[dest]
            .send(Envelope { src: self.rank(), tag, payload: Box::new(value) })
            .map_err(|_| CommError::Disconnected)
    }

    /// Blocking receive of a `T` from `source` under `tag`.
    ///
    /// Blocks until the exact (source, tag) counterpart send has been
    /// delivered. Fails with [`CommError::PayloadType`] if the matched
    /// message holds a value of a different type.
    pub fn recv<T: Send + 'static>(&self, source: usize, tag: Tag) -> Result<T, CommError> {
        self.check_rank(source)?;
        let env = self.mailbox.match_next(source, tag)?;
        trace!("rank {} <- rank {} tag {}", self.rank(), source, tag);
        env.payload
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| CommError::PayloadType { source, tag })
    }

    /// Non-blocking send: buffers the payload and returns a pending handle.
    ///
    /// The send buffer is moved into the envelope at issue time, so it is
    /// already safe to "reuse"; `wait` on the handle never blocks.
    pub fn isend<T: Send + 'static>(
        &self,
        value: T,
        dest: usize,
        tag: Tag,
    ) -> Result<SendRequest, CommError> {
        self.send(value, dest, tag)?;
        Ok(SendRequest::issued())
    }

    /// Non-blocking receive: returns a pending handle for a `T` from (source, tag).
    pub fn irecv<T: Send + 'static>(
        &self,
        source: usize,
        tag: Tag,
    ) -> Result<RecvRequest<'_, T>, CommError> {
        self.check_rank(source)?;
        Ok(RecvRequest { comm: self, source, tag, _payload: PhantomData })
    }
}
