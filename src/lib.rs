//! Thread-safe writers for append-only file output.
//!
//! Two independent primitives are provided:
//!
//! - [`ResourcePool`] spreads concurrent writes over a fixed set of
//!   resources, handing each one to a single writer at a time.
//! - [`RotationController`] funnels writes into one active file and swaps it
//!   for a freshly named file once a size or time threshold is reached,
//!   reporting each finished file to an observer.
//!
//! Resources implement [`WritableResource`]; [`FileResource`] is the
//! buffered file implementation used by default.

pub mod config;
pub mod error;
pub mod naming;
mod pool;
mod resource;
mod rotating;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use config::{
    IniConfig, ResourcePoolBuilder, RotationControllerBuilder, from_ini_file, from_ini_str,
};
pub use error::{BuildError, CloseError, RotationError, WriteError};
pub use pool::ResourcePool;
pub use resource::{FileResource, FileResourceFactory, ResourceFactory, WritableResource};
pub use rotating::{
    MAX_ROTATION_INTERVAL, RotationConfig, RotationController, RotationFailurePolicy,
    RotationObserver,
};
