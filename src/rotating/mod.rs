//! Rotating controller module wiring.
//!
//! Controller state and the rotation itself live in `core`, the periodic
//! time trigger in `timer`, and thresholds in `config`.

mod config;
mod core;
mod timer;

pub use config::{MAX_ROTATION_INTERVAL, RotationConfig, RotationFailurePolicy};
pub use self::core::{RotationController, RotationObserver};

#[cfg(test)]
mod tests;
