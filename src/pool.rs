//! Fixed-size pool of writable resources.
//!
//! Each write checks one resource out of a FIFO queue, writes to it and puts
//! it back, so at most `capacity` writes are in flight and no two threads
//! ever hold the same resource. [`ResourcePool::close`] stops new checkouts,
//! waits for every outstanding resource to come back and then closes them
//! all.
//!
//! Bytes written by concurrent callers land in whichever resource they were
//! handed; callers needing a single ordered stream should use
//! [`RotationController`](crate::RotationController) instead.

use std::{
    collections::VecDeque,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
    time::{Duration, Instant},
};

use log::{debug, warn};
use parking_lot::{Condvar, Mutex};

use crate::{
    error::{BuildError, CloseError, WriteError},
    resource::WritableResource,
};

struct PoolState<R> {
    available: VecDeque<R>,
    blocked_for_shutdown: bool,
    closed: bool,
    finished: bool,
}

/// Bounded pool handing out one resource per write.
pub struct ResourcePool<R: WritableResource> {
    state: Mutex<PoolState<R>>,
    /// Signalled when a resource is returned or the pool closes.
    ready: Condvar,
    /// Signalled when a resource is returned during shutdown.
    drained: Condvar,
    capacity: usize,
    closed: AtomicBool,
    written: AtomicU64,
}

/// A checked-out resource that returns itself to the pool when dropped.
struct Checkout<'a, R: WritableResource> {
    pool: &'a ResourcePool<R>,
    resource: Option<R>,
}

impl<R: WritableResource> Checkout<'_, R> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.resource.as_mut() {
            Some(resource) => resource.write(buf),
            None => Err(std::io::Error::other("resource already returned")),
        }
    }
}

impl<R: WritableResource> Drop for Checkout<'_, R> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            self.pool.put(resource);
        }
    }
}

impl<R: WritableResource> ResourcePool<R> {
    /// Build a pool owning `resources`.
    ///
    /// The pool capacity is `resources.len()` and never changes. An empty set
    /// is rejected because every write would block forever.
    pub fn new(resources: Vec<R>) -> Result<Self, BuildError> {
        if resources.is_empty() {
            return Err(BuildError::InvalidConfig(
                "pool requires at least one resource".into(),
            ));
        }
        let capacity = resources.len();
        Ok(Self {
            state: Mutex::new(PoolState {
                available: resources.into(),
                blocked_for_shutdown: false,
                closed: false,
                finished: false,
            }),
            ready: Condvar::new(),
            drained: Condvar::new(),
            capacity,
            closed: AtomicBool::new(false),
            written: AtomicU64::new(0),
        })
    }

    /// Write `buf` to the next available resource, blocking until one is
    /// free.
    ///
    /// A failed write still returns the resource to the pool.
    pub fn write(&self, buf: &[u8]) -> Result<usize, WriteError> {
        self.write_inner(buf, None)
    }

    /// Like [`write`](Self::write) but gives up after `timeout` if every
    /// resource stays checked out.
    pub fn write_timeout(&self, buf: &[u8], timeout: Duration) -> Result<usize, WriteError> {
        self.write_inner(buf, Some(timeout))
    }

    fn write_inner(&self, buf: &[u8], timeout: Option<Duration>) -> Result<usize, WriteError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(WriteError::PoolClosed);
        }
        let mut checkout = self.take(timeout)?;
        let written = checkout.write(buf).map_err(|err| {
            warn!("ResourcePool: resource write error: {err}");
            WriteError::Resource(err)
        })?;
        self.written.fetch_add(written as u64, Ordering::Relaxed);
        Ok(written)
    }

    /// Total bytes accepted by successful writes.
    pub fn written_bytes(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// Number of resources owned by the pool.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resources currently waiting in the queue.
    pub fn available(&self) -> usize {
        self.state.lock().available.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Reject new writes, wait for every checked-out resource to be returned
    /// and close all resources.
    ///
    /// Every resource is closed even when an earlier one fails; the first
    /// failure is returned. Calling `close` again after it completed is a
    /// no-op.
    pub fn close(&self) -> Result<(), CloseError> {
        self.close_inner(None)
    }

    /// Like [`close`](Self::close) but stops waiting for outstanding
    /// resources after `timeout`.
    ///
    /// The pool stays closed to writers after a timeout and a later call may
    /// finish the shutdown.
    pub fn close_timeout(&self, timeout: Duration) -> Result<(), CloseError> {
        self.close_inner(Some(timeout))
    }

    fn close_inner(&self, timeout: Option<Duration>) -> Result<(), CloseError> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.state.lock();
        if state.finished {
            return Ok(());
        }
        state.blocked_for_shutdown = true;
        state.closed = true;
        self.closed.store(true, Ordering::Release);
        self.ready.notify_all();

        while state.available.len() < self.capacity {
            match (deadline, timeout) {
                (Some(deadline), Some(timeout)) => {
                    if self.drained.wait_until(&mut state, deadline).timed_out()
                        && state.available.len() < self.capacity
                    {
                        return Err(CloseError::Timeout(timeout));
                    }
                }
                _ => self.drained.wait(&mut state),
            }
        }
        if state.finished {
            return Ok(());
        }

        let mut first_error = None;
        for (index, resource) in state.available.iter_mut().enumerate() {
            if let Err(source) = resource.close() {
                if first_error.is_none() {
                    first_error = Some(CloseError::Resource { index, source });
                } else {
                    warn!("ResourcePool: unable to close resource {index}: {source}");
                }
            }
        }
        state.blocked_for_shutdown = false;
        state.finished = true;
        debug!(
            "ResourcePool: closed {} resources after {} bytes",
            self.capacity,
            self.written_bytes()
        );
        first_error.map_or(Ok(()), Err)
    }

    fn take(&self, timeout: Option<Duration>) -> Result<Checkout<'_, R>, WriteError> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.state.lock();
        let mut timed_out = false;
        loop {
            if state.closed {
                return Err(WriteError::PoolClosed);
            }
            if !state.blocked_for_shutdown
                && let Some(resource) = state.available.pop_front()
            {
                return Ok(Checkout {
                    pool: self,
                    resource: Some(resource),
                });
            }
            if let (true, Some(timeout)) = (timed_out, timeout) {
                return Err(WriteError::Timeout(timeout));
            }
            match deadline {
                Some(deadline) => {
                    timed_out = self.ready.wait_until(&mut state, deadline).timed_out();
                }
                None => self.ready.wait(&mut state),
            }
        }
    }

    fn put(&self, resource: R) {
        let mut state = self.state.lock();
        state.available.push_back(resource);
        let draining = state.blocked_for_shutdown;
        drop(state);
        self.ready.notify_one();
        if draining {
            self.drained.notify_all();
        }
    }
}
