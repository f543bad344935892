//! In-memory resources and factories for exercising pools and controllers.
//!
//! Enabled for unit tests and, for integration tests, through the
//! `test-util` feature. Faults are switched on through shared flags so a
//! test can break a resource after handing it over.

use std::{
    io,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use parking_lot::Mutex;

use crate::resource::{ResourceFactory, WritableResource};

/// Observations shared between a [`MemoryResource`] and the test.
#[derive(Debug, Default)]
pub struct Probe {
    data: Mutex<Vec<u8>>,
    closes: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl Probe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Everything written through resources sharing this probe.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.data.lock()).into_owned()
    }

    /// Number of `close` calls, failed ones included.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Highest number of writes observed running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

/// Switches that make resources fail on demand.
#[derive(Debug, Default)]
pub struct Faults {
    pub fail_writes: AtomicBool,
    pub fail_close: AtomicBool,
}

impl Faults {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_close(&self, fail: bool) {
        self.fail_close.store(fail, Ordering::SeqCst);
    }
}

/// Resource buffering writes in memory.
pub struct MemoryResource {
    probe: Arc<Probe>,
    faults: Arc<Faults>,
    write_delay: Option<Duration>,
    written: u64,
    closed: bool,
}

impl MemoryResource {
    pub fn new(probe: Arc<Probe>, faults: Arc<Faults>) -> Self {
        Self {
            probe,
            faults,
            write_delay: None,
            written: 0,
            closed: false,
        }
    }

    /// Hold every write for `delay` so overlapping writes become visible.
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }
}

impl WritableResource for MemoryResource {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed {
            return Err(io::Error::other("resource closed"));
        }
        if self.faults.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::other("I am broken"));
        }
        let running = self.probe.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.write_delay {
            thread::sleep(delay);
        }
        self.probe.data.lock().extend_from_slice(buf);
        self.probe.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.written += buf.len() as u64;
        Ok(buf.len())
    }

    fn written_bytes(&self) -> u64 {
        self.written
    }

    fn close(&mut self) -> io::Result<()> {
        self.probe.closes.fetch_add(1, Ordering::SeqCst);
        if self.faults.fail_close.load(Ordering::SeqCst) {
            return Err(io::Error::other("I am broken"));
        }
        self.closed = true;
        Ok(())
    }
}

/// A resource handed out by a [`RecordingFactory`].
#[derive(Clone, Debug)]
pub struct Created {
    pub path: PathBuf,
    pub probe: Arc<Probe>,
}

#[derive(Default)]
struct FactoryState {
    created: Mutex<Vec<Created>>,
    fail_creates: AtomicBool,
    faults: Arc<Faults>,
}

/// Factory producing [`MemoryResource`]s and recording every path it was
/// asked for.
///
/// Clones share state, so a test keeps one clone and hands the other to the
/// controller.
#[derive(Clone, Default)]
pub struct RecordingFactory {
    state: Arc<FactoryState>,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `create` call fail.
    pub fn set_fail_creates(&self, fail: bool) {
        self.state.fail_creates.store(fail, Ordering::SeqCst);
    }

    /// Faults shared by every resource this factory produced or will produce.
    pub fn faults(&self) -> &Faults {
        &self.state.faults
    }

    pub fn created(&self) -> Vec<Created> {
        self.state.created.lock().clone()
    }

    pub fn created_paths(&self) -> Vec<PathBuf> {
        self.state
            .created
            .lock()
            .iter()
            .map(|c| c.path.clone())
            .collect()
    }

    pub fn create_count(&self) -> usize {
        self.state.created.lock().len()
    }
}

impl ResourceFactory for RecordingFactory {
    type Resource = MemoryResource;

    fn create(&self, path: &Path) -> io::Result<MemoryResource> {
        if self.state.fail_creates.load(Ordering::SeqCst) {
            return Err(io::Error::other("I am broken"));
        }
        let probe = Probe::new();
        self.state.created.lock().push(Created {
            path: path.to_path_buf(),
            probe: Arc::clone(&probe),
        });
        Ok(MemoryResource::new(probe, Arc::clone(&self.state.faults)))
    }
}

/// Build `count` resources sharing one probe and one set of faults.
pub fn shared_resources(count: usize) -> (Vec<MemoryResource>, Arc<Probe>, Arc<Faults>) {
    let probe = Probe::new();
    let faults = Faults::new();
    let resources = (0..count)
        .map(|_| MemoryResource::new(Arc::clone(&probe), Arc::clone(&faults)))
        .collect();
    (resources, probe, faults)
}
