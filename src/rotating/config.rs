//! Rotation thresholds and failure handling for [`RotationController`].
//!
//! [`RotationController`]: super::RotationController

use std::time::Duration;

use crate::error::BuildError;

/// Longest accepted rotation interval. Deadlines are computed as
/// `Instant::now() + interval`, which must not overflow.
pub const MAX_ROTATION_INTERVAL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// What a controller does when retiring or replacing its active file fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RotationFailurePolicy {
    /// Panic on the thread performing the rotation.
    #[default]
    Panic,
    /// Poison the controller and report the failure as an error.
    Propagate,
}

impl RotationFailurePolicy {
    pub(crate) fn parse(value: &str) -> Result<Self, BuildError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "panic" => Ok(Self::Panic),
            "propagate" => Ok(Self::Propagate),
            other => Err(BuildError::InvalidConfig(format!(
                "invalid rotation failure policy '{other}'. Valid options are: panic, propagate"
            ))),
        }
    }
}

/// Size and time thresholds controlling when the active file rolls over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RotationConfig {
    /// Rotate once the active file has received at least this many bytes.
    pub max_bytes: u64,
    /// Rotate a non-empty active file after this much time without a
    /// rotation.
    pub interval: Duration,
    pub failure_policy: RotationFailurePolicy,
}

impl RotationConfig {
    /// Create a configuration with the default failure policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use rotafile::RotationConfig;
    ///
    /// let config = RotationConfig::new(1024, Duration::from_secs(60));
    /// assert_eq!(config.max_bytes, 1024);
    /// ```
    pub const fn new(max_bytes: u64, interval: Duration) -> Self {
        Self {
            max_bytes,
            interval,
            failure_policy: RotationFailurePolicy::Panic,
        }
    }

    pub const fn with_failure_policy(mut self, policy: RotationFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), BuildError> {
        if self.max_bytes == 0 {
            return Err(BuildError::InvalidConfig(
                "max_bytes must be greater than zero".into(),
            ));
        }
        if self.interval.is_zero() {
            return Err(BuildError::InvalidConfig(
                "interval must be greater than zero".into(),
            ));
        }
        if self.interval > MAX_ROTATION_INTERVAL {
            return Err(BuildError::InvalidConfig(format!(
                "interval must not exceed {} seconds",
                MAX_ROTATION_INTERVAL.as_secs()
            )));
        }
        Ok(())
    }
}
