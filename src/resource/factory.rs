//! Factories producing replacement resources on rotation.

use std::{io, path::Path};

use super::{FileResource, WritableResource};

/// Creates a fresh resource for a generated path.
///
/// Any `Fn(&Path) -> io::Result<R>` closure is a factory, which keeps test
/// doubles to a single line.
pub trait ResourceFactory: Send + Sync + 'static {
    type Resource: WritableResource + 'static;

    fn create(&self, path: &Path) -> io::Result<Self::Resource>;
}

impl<F, R> ResourceFactory for F
where
    F: Fn(&Path) -> io::Result<R> + Send + Sync + 'static,
    R: WritableResource + 'static,
{
    type Resource = R;

    fn create(&self, path: &Path) -> io::Result<R> {
        self(path)
    }
}

/// Default factory opening a [`FileResource`] at the requested path.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileResourceFactory;

impl ResourceFactory for FileResourceFactory {
    type Resource = FileResource;

    fn create(&self, path: &Path) -> io::Result<FileResource> {
        FileResource::create(path)
    }
}
