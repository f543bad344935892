//! Error types shared by the pool and the rotating controller.
//!
//! Ordinary failures (a closed pool, a stopped controller, a failed write)
//! are recoverable and carry no side effects. Failures while swapping the
//! active file of a [`RotationController`](crate::RotationController) are
//! reported through [`RotationError`], which is kept apart from the other
//! variants so callers can tell the two classes apart.

use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

/// Errors returned by `write` on a pool or a rotating controller.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The pool was closed before the write could check out a resource.
    #[error("pool closed")]
    PoolClosed,
    /// The controller has been closed.
    #[error("rotating controller stopped")]
    ControllerStopped,
    /// An earlier rotation failed and the controller has no active file.
    #[error("rotating controller poisoned by failed rotation: {0}")]
    Poisoned(String),
    /// No pooled resource became available within the given duration.
    #[error("timed out after {0:?} waiting for a pooled resource")]
    Timeout(Duration),
    /// The underlying resource rejected the write.
    #[error("resource write error: {0}")]
    Resource(#[source] io::Error),
    /// The write succeeded but the rotation it triggered did not.
    #[error(transparent)]
    Rotation(#[from] RotationError),
}

impl WriteError {
    /// Return `true` when the controller can no longer accept writes because
    /// a rotation failed.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, Self::Rotation(_) | Self::Poisoned(_))
    }
}

/// Failure while retiring the active resource or creating its successor.
///
/// The retired file may be partially flushed and the controller has nothing
/// left to write into, so these errors are never retried.
#[derive(Debug, Error)]
pub enum RotationError {
    #[error("unable to close rotated resource {}: {source}", path.display())]
    Close {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("resource factory failed for {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors returned when shutting down a pool or a controller.
#[derive(Debug, Error)]
pub enum CloseError {
    /// A pooled resource failed to flush or close.
    #[error("unable to close pooled resource {index}: {source}")]
    Resource {
        index: usize,
        #[source]
        source: io::Error,
    },
    /// The controller's final active resource failed to flush or close.
    #[error("unable to close active resource {}: {source}", path.display())]
    Active {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Checked-out resources were not returned in time.
    #[error("timed out after {0:?} waiting for checked-out resources")]
    Timeout(Duration),
}

/// Errors that may occur while building a pool or a controller.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Invalid user supplied configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Underlying I/O error whilst opening the initial resources.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The factory could not produce the controller's first resource.
    #[error("unable to create initial resource {}: {source}", path.display())]
    InitialResource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The background rotation thread could not be started.
    #[error("unable to spawn rotation thread: {0}")]
    Spawn(#[source] io::Error),
    /// The INI source could not be read or parsed.
    #[error("unable to load INI configuration: {0}")]
    Ini(#[from] ini::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_errors_are_unrecoverable() {
        let err = WriteError::from(RotationError::Create {
            path: PathBuf::from("/tmp/events_1"),
            source: io::Error::other("boom"),
        });
        assert!(err.is_unrecoverable());
        assert!(WriteError::Poisoned("boom".into()).is_unrecoverable());
    }

    #[test]
    fn ordinary_errors_are_recoverable() {
        assert!(!WriteError::PoolClosed.is_unrecoverable());
        assert!(!WriteError::ControllerStopped.is_unrecoverable());
        assert!(!WriteError::Resource(io::Error::other("disk full")).is_unrecoverable());
    }

    #[test]
    fn messages_carry_context() {
        assert_eq!(WriteError::PoolClosed.to_string(), "pool closed");
        let err = RotationError::Close {
            path: PathBuf::from("/var/log/app_1"),
            source: io::Error::other("I am broken"),
        };
        assert_eq!(
            err.to_string(),
            "unable to close rotated resource /var/log/app_1: I am broken"
        );
    }
}
