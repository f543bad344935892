//! Send/Sync guarantees for core types.

use rotafile::{
    FileResource, FileResourceFactory, ResourcePool, ResourcePoolBuilder, RotationController,
    RotationControllerBuilder, WriteError,
    testing::{MemoryResource, RecordingFactory},
};
use rstest::rstest;
use static_assertions::assert_impl_all;

#[rstest]
fn builders_are_send_sync() {
    assert_impl_all!(RotationControllerBuilder: Send, Sync);
    assert_impl_all!(ResourcePoolBuilder: Send, Sync);
}

#[rstest]
fn writers_are_send_sync() {
    assert_impl_all!(ResourcePool<FileResource>: Send, Sync);
    assert_impl_all!(ResourcePool<MemoryResource>: Send, Sync);
    assert_impl_all!(RotationController<FileResourceFactory>: Send, Sync);
    assert_impl_all!(RotationController<RecordingFactory>: Send, Sync);
}

#[rstest]
fn errors_cross_threads() {
    assert_impl_all!(WriteError: Send, Sync);
}
