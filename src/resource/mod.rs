//! Writable resources consumed by the pool and the rotating controller.
//!
//! A [`WritableResource`] is an exclusively owned sink with a running byte
//! count. [`FileResource`] is the production implementation; tests and
//! integrators can substitute their own through [`ResourceFactory`].
mod factory;
mod file;

use std::{
    io,
    path::{Path, PathBuf},
};

use delegate::delegate;

pub use factory::{FileResourceFactory, ResourceFactory};
pub use file::FileResource;

/// Capability set required from every resource handed to a pool or a
/// controller.
pub trait WritableResource: Send {
    /// Append `buf`, returning the number of bytes accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Bytes written to this instance since it was created.
    fn written_bytes(&self) -> u64;

    /// Flush and release the underlying handle.
    ///
    /// Implementations should tolerate repeated calls.
    fn close(&mut self) -> io::Result<()>;
}

impl<R: WritableResource + ?Sized> WritableResource for Box<R> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn written_bytes(&self) -> u64 {
        (**self).written_bytes()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// A resource paired with the path it was created for.
pub(crate) struct PathedResource<R> {
    resource: R,
    path: PathBuf,
}

impl<R: WritableResource> PathedResource<R> {
    pub(crate) fn new(resource: R, path: PathBuf) -> Self {
        Self { resource, path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl<R: WritableResource> WritableResource for PathedResource<R> {
    delegate! {
        to self.resource {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
            fn written_bytes(&self) -> u64;
            fn close(&mut self) -> io::Result<()>;
        }
    }
}
