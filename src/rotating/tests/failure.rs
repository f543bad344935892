//! Rotation failure handling under both failure policies.

use super::*;
use crate::error::{RotationError, WriteError};
use logtest::Logger;
use serial_test::serial;

#[test]
#[should_panic(expected = "rotation failed")]
fn broken_close_during_rotation_panics() {
    let (controller, factory) =
        memory_controller(5, LONG_INTERVAL, RotationFailurePolicy::Panic);
    factory.faults().set_fail_close(true);

    let _ = controller.write(b"hello");
}

#[test]
#[should_panic(expected = "resource factory failed")]
fn broken_factory_during_rotation_panics() {
    let (controller, factory) =
        memory_controller(5, LONG_INTERVAL, RotationFailurePolicy::Panic);
    factory.set_fail_creates(true);

    let _ = controller.write(b"hello");
}

#[test]
fn propagated_close_failure_poisons_controller() {
    let (mut controller, factory) =
        memory_controller(5, LONG_INTERVAL, RotationFailurePolicy::Propagate);
    let observed = observed_paths(&mut controller);
    factory.faults().set_fail_close(true);

    let err = controller.write(b"hello").expect_err("rotation must fail");
    assert!(matches!(err, WriteError::Rotation(RotationError::Close { .. })));
    assert!(err.is_unrecoverable());
    assert_eq!(controller.written_bytes(), 5);
    assert!(observed.lock().is_empty());

    let err = controller.write(b"again").expect_err("poisoned controller");
    assert!(matches!(err, WriteError::Poisoned(ref reason) if reason.contains("I am broken")));
    assert_eq!(controller.active_path(), None);

    controller.close().expect("closing a poisoned controller succeeds");
    assert!(matches!(
        controller.write(b"late"),
        Err(WriteError::ControllerStopped)
    ));
}

#[test]
fn propagated_factory_failure_notifies_retired_file() {
    let (mut controller, factory) =
        memory_controller(5, LONG_INTERVAL, RotationFailurePolicy::Propagate);
    let observed = observed_paths(&mut controller);
    let first = controller.active_path().expect("active path");
    factory.set_fail_creates(true);

    let err = controller.write(b"hello").expect_err("rotation must fail");

    assert!(matches!(err, WriteError::Rotation(RotationError::Create { .. })));
    assert_eq!(*observed.lock(), vec![first]);
    assert_eq!(factory.created()[0].probe.close_count(), 1);
}

#[test]
#[serial]
fn time_triggered_failure_is_logged_and_poisons() {
    let mut logger = Logger::start();
    let (controller, factory) =
        memory_controller(1_000_000, Duration::from_millis(5), RotationFailurePolicy::Propagate);
    factory.set_fail_creates(true);
    controller.write(b"hello").expect("write before rotation");

    assert!(wait_until(Duration::from_secs(2), || matches!(
        controller.write(b"x"),
        Err(WriteError::Poisoned(_))
    )));

    let mut logged = false;
    while let Some(record) = logger.pop() {
        if record.level() == log::Level::Error
            && record.args().contains("time-triggered rotation failed")
        {
            logged = true;
        }
    }
    assert!(logged, "expected the periodic thread to log the failure");
}
