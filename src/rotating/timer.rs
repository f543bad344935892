//! Periodic rotation thread.
//!
//! The thread sleeps until the controller's next deadline, racing a
//! cancellation channel. After leaving its loop it acknowledges on a done
//! channel exactly once, which lets `close` wait until no further rotation
//! can happen.

use std::{
    io,
    sync::Arc,
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender, at, bounded, select};
use log::{debug, warn};

use super::core::Shared;
use crate::resource::ResourceFactory;

pub(super) struct PeriodicTask {
    cancel_tx: Option<Sender<()>>,
    done_rx: Receiver<()>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    pub(super) fn spawn<F: ResourceFactory>(shared: Arc<Shared<F>>) -> io::Result<Self> {
        let (cancel_tx, cancel_rx) = bounded::<()>(1);
        let (done_tx, done_rx) = bounded(1);
        let handle = thread::Builder::new()
            .name("rotafile-rotation".into())
            .spawn(move || {
                run(&shared, &cancel_rx);
                let _ = done_tx.send(());
            })?;
        Ok(Self {
            cancel_tx: Some(cancel_tx),
            done_rx,
            handle: Some(handle),
        })
    }

    /// Cancel the thread and block until it has acknowledged.
    pub(super) fn stop(&mut self) {
        // Disconnecting the channel wakes the select.
        self.cancel_tx.take();
        if self.done_rx.recv().is_err() {
            warn!("RotationController: rotation thread exited without acknowledging");
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("RotationController: rotation thread panicked");
        }
    }
}

fn run<F: ResourceFactory>(shared: &Shared<F>, cancel_rx: &Receiver<()>) {
    loop {
        let deadline = shared.next_deadline();
        select! {
            recv(cancel_rx) -> _ => break,
            recv(at(deadline)) -> _ => shared.rotate_if_due(),
        }
    }
    debug!("RotationController: rotation thread stopped");
}
