//! Core rotating controller logic.
//!
//! The controller owns exactly one active resource behind a mutex shared by
//! writer threads and the periodic rotation thread. Size-triggered rotation
//! runs inside `write`; time-triggered rotation runs on the periodic thread.
//! Both go through [`Shared::rotate`] with the lock held, so a rotation
//! always falls strictly between two writes.

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Instant,
};

use log::{debug, warn};
use parking_lot::Mutex;

use super::{
    config::{RotationConfig, RotationFailurePolicy},
    timer::PeriodicTask,
};
use crate::{
    error::{BuildError, CloseError, RotationError, WriteError},
    naming::unique_file_name,
    resource::{FileResourceFactory, PathedResource, ResourceFactory, WritableResource},
};

/// Callback receiving the path of every finalised file.
///
/// Runs synchronously with the controller lock held: it must return promptly
/// and must not call back into the same controller.
pub type RotationObserver = Box<dyn Fn(&Path) + Send + Sync>;

enum Lifecycle {
    Running,
    Poisoned(String),
    Stopped,
}

struct ControllerState<R> {
    active: Option<PathedResource<R>>,
    lifecycle: Lifecycle,
    next_deadline: Instant,
    observer: Option<RotationObserver>,
    rotations: u64,
}

/// State shared between the controller handle and its periodic thread.
pub(super) struct Shared<F: ResourceFactory> {
    state: Mutex<ControllerState<F::Resource>>,
    factory: F,
    directory: PathBuf,
    prefix: String,
    config: RotationConfig,
    stopped: AtomicBool,
    written: AtomicU64,
}

impl<F: ResourceFactory> Shared<F> {
    pub(super) fn next_deadline(&self) -> Instant {
        self.state.lock().next_deadline
    }

    /// Rotate a non-empty active file once its deadline has passed.
    ///
    /// A deadline pushed back by a size-triggered rotation while the
    /// periodic thread slept is honoured; idle files only get a fresh
    /// deadline.
    pub(super) fn rotate_if_due(&self) {
        let mut state = self.state.lock();
        let now = Instant::now();
        if now < state.next_deadline {
            return;
        }
        state.next_deadline = now + self.config.interval;
        if !matches!(state.lifecycle, Lifecycle::Running) {
            return;
        }
        let has_data = state
            .active
            .as_ref()
            .is_some_and(|active| active.written_bytes() > 0);
        if has_data && let Err(err) = self.rotate(&mut state) {
            log::error!("RotationController: time-triggered rotation failed: {err}");
        }
    }

    fn rotate(&self, state: &mut ControllerState<F::Resource>) -> Result<(), RotationError> {
        let result = self.swap_active(state);
        if let Err(err) = &result {
            state.lifecycle = Lifecycle::Poisoned(err.to_string());
            if self.config.failure_policy == RotationFailurePolicy::Panic {
                panic!("RotationController: rotation failed: {err}");
            }
        }
        result
    }

    fn swap_active(&self, state: &mut ControllerState<F::Resource>) -> Result<(), RotationError> {
        let Some(mut retired) = state.active.take() else {
            return Ok(());
        };
        if let Err(source) = retired.close() {
            return Err(RotationError::Close {
                path: retired.path().to_path_buf(),
                source,
            });
        }
        notify(state, retired.path());

        let next = open_resource(&self.factory, &self.directory, &self.prefix)?;
        debug!(
            "RotationController: rotated {} ({} bytes) to {}",
            retired.path().display(),
            retired.written_bytes(),
            next.path().display()
        );
        state.active = Some(next);
        state.rotations += 1;
        state.next_deadline = Instant::now() + self.config.interval;
        Ok(())
    }
}

fn notify<R>(state: &ControllerState<R>, path: &Path) {
    if let Some(observer) = &state.observer {
        observer(path);
    }
}

fn open_resource<F: ResourceFactory>(
    factory: &F,
    directory: &Path,
    prefix: &str,
) -> Result<PathedResource<F::Resource>, RotationError> {
    let path = unique_file_name(directory, prefix);
    match factory.create(&path) {
        Ok(resource) => Ok(PathedResource::new(resource, path)),
        Err(source) => Err(RotationError::Create { path, source }),
    }
}

/// Append-only writer that swaps its output file on a size or time
/// threshold.
///
/// Every write goes to the single active file. Once that file has received
/// `max_bytes` the write rotates it before returning; independently, a
/// background thread rotates a non-empty file after `interval` without a
/// rotation. Retired files are reported to the observer set with
/// [`with_observer`](Self::with_observer).
pub struct RotationController<F: ResourceFactory = FileResourceFactory> {
    shared: Arc<Shared<F>>,
    timer: Mutex<Option<PeriodicTask>>,
}

impl RotationController {
    /// Write files named `{prefix}{timestamp}_{suffix}` into `directory`.
    pub fn new<P: Into<PathBuf>>(
        directory: P,
        prefix: impl Into<String>,
        config: RotationConfig,
    ) -> Result<Self, BuildError> {
        Self::with_factory(directory, prefix, config, FileResourceFactory)
    }
}

impl<F: ResourceFactory> RotationController<F> {
    /// Build a controller creating its resources through `factory`.
    ///
    /// The first resource is created immediately; a factory failure here is
    /// an ordinary error.
    pub fn with_factory<P: Into<PathBuf>>(
        directory: P,
        prefix: impl Into<String>,
        config: RotationConfig,
        factory: F,
    ) -> Result<Self, BuildError> {
        config.validate()?;
        let directory = directory.into();
        let prefix = prefix.into();
        let active = open_resource(&factory, &directory, &prefix).map_err(|err| match err {
            RotationError::Create { path, source } | RotationError::Close { path, source } => {
                BuildError::InitialResource { path, source }
            }
        })?;
        debug!(
            "RotationController: started with {}",
            active.path().display()
        );
        let shared = Arc::new(Shared {
            state: Mutex::new(ControllerState {
                active: Some(active),
                lifecycle: Lifecycle::Running,
                next_deadline: Instant::now() + config.interval,
                observer: None,
                rotations: 0,
            }),
            factory,
            directory,
            prefix,
            config,
            stopped: AtomicBool::new(false),
            written: AtomicU64::new(0),
        });
        let timer = PeriodicTask::spawn(Arc::clone(&shared)).map_err(BuildError::Spawn)?;
        Ok(Self {
            shared,
            timer: Mutex::new(Some(timer)),
        })
    }

    /// Install the callback notified with the path of every finalised file.
    ///
    /// Requires exclusive access, so it has to run before the controller is
    /// shared with writer threads.
    pub fn with_observer<O>(&mut self, observer: O) -> &mut Self
    where
        O: Fn(&Path) + Send + Sync + 'static,
    {
        self.shared.state.lock().observer = Some(Box::new(observer));
        self
    }

    /// Write `buf` to the active file, rotating it if the size threshold is
    /// reached.
    ///
    /// # Errors
    ///
    /// [`WriteError::ControllerStopped`] after [`close`](Self::close),
    /// [`WriteError::Resource`] when the active file rejects the write, and
    /// [`WriteError::Rotation`] or [`WriteError::Poisoned`] when a rotation
    /// failed under [`RotationFailurePolicy::Propagate`].
    ///
    /// # Panics
    ///
    /// Under [`RotationFailurePolicy::Panic`], when the rotation triggered by
    /// this write fails.
    pub fn write(&self, buf: &[u8]) -> Result<usize, WriteError> {
        if self.shared.stopped.load(Ordering::Acquire) {
            return Err(WriteError::ControllerStopped);
        }
        let mut state = self.shared.state.lock();
        match &state.lifecycle {
            Lifecycle::Running => {}
            Lifecycle::Poisoned(reason) => return Err(WriteError::Poisoned(reason.clone())),
            Lifecycle::Stopped => return Err(WriteError::ControllerStopped),
        }
        let Some(active) = state.active.as_mut() else {
            return Err(WriteError::Poisoned("no active resource".into()));
        };
        let written = active.write(buf).map_err(WriteError::Resource)?;
        self.shared
            .written
            .fetch_add(written as u64, Ordering::Relaxed);
        if active.written_bytes() >= self.shared.config.max_bytes {
            self.shared.rotate(&mut state)?;
        }
        Ok(written)
    }

    /// Bytes written over the controller's lifetime, across rotations.
    pub fn written_bytes(&self) -> u64 {
        self.shared.written.load(Ordering::Relaxed)
    }

    /// Number of completed rotations.
    pub fn rotations(&self) -> u64 {
        self.shared.state.lock().rotations
    }

    /// Path of the file currently receiving writes.
    pub fn active_path(&self) -> Option<PathBuf> {
        self.shared
            .state
            .lock()
            .active
            .as_ref()
            .map(|active| active.path().to_path_buf())
    }

    pub fn config(&self) -> &RotationConfig {
        &self.shared.config
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::Acquire)
    }

    /// Stop the periodic thread, close the active file and notify the
    /// observer with its path.
    ///
    /// Waits for the periodic thread to acknowledge cancellation, so no
    /// rotation can run once this returns. A close failure is reported, not
    /// escalated, and the observer is not told about a file that failed to
    /// close. Concurrent callers wait for the first one to finish; repeated
    /// calls are no-ops.
    pub fn close(&self) -> Result<(), CloseError> {
        let mut timer = self.timer.lock();
        let Some(mut task) = timer.take() else {
            return Ok(());
        };
        task.stop();
        self.shared.stopped.store(true, Ordering::Release);

        let mut state = self.shared.state.lock();
        state.lifecycle = Lifecycle::Stopped;
        let Some(mut active) = state.active.take() else {
            debug!("RotationController: closed without an active resource");
            return Ok(());
        };
        active.close().map_err(|source| CloseError::Active {
            path: active.path().to_path_buf(),
            source,
        })?;
        notify(&state, active.path());
        debug!(
            "RotationController: closed {} after {} rotations and {} bytes",
            active.path().display(),
            state.rotations,
            self.written_bytes()
        );
        Ok(())
    }
}

impl<F: ResourceFactory> Drop for RotationController<F> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!("RotationController: close on drop failed: {err}");
        }
    }
}
