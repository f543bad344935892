//! Unit tests for the rotating controller.
//!
//! `behaviour` covers the size and time triggers and the observer,
//! `failure` the rotation failure policies, and `concurrency` writers racing
//! each other and the periodic thread.

use super::*;
use crate::testing::RecordingFactory;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

mod failure;

const LONG_INTERVAL: Duration = Duration::from_secs(100);

fn memory_controller(
    max_bytes: u64,
    interval: Duration,
    policy: RotationFailurePolicy,
) -> (RotationController<RecordingFactory>, RecordingFactory) {
    let factory = RecordingFactory::new();
    let config = RotationConfig::new(max_bytes, interval).with_failure_policy(policy);
    let controller = RotationController::with_factory("/logs", "events_", config, factory.clone())
        .expect("controller should start");
    (controller, factory)
}

fn observed_paths(
    controller: &mut RotationController<RecordingFactory>,
) -> Arc<parking_lot::Mutex<Vec<PathBuf>>> {
    let observed = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);
    controller.with_observer(move |path| sink.lock().push(path.to_path_buf()));
    observed
}

/// Poll `condition` until it holds or `timeout` elapses.
fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let started = Instant::now();
    while started.elapsed() < timeout {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}
