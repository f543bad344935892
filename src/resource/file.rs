//! Buffered file resource.
//!
//! Writes go through a [`BufWriter`] so the bytes only reach the file on
//! close or when the buffer fills. The resource is not thread-safe; share it
//! through a pool or a controller.

use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use super::WritableResource;

/// A write-only file with a byte counter and flush-on-close semantics.
pub struct FileResource {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    written: u64,
}

impl FileResource {
    /// Create (or truncate) the file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display())))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
            written: 0,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return `true` once [`close`](WritableResource::close) has released
    /// the file handle.
    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }
}

impl WritableResource for FileResource {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(io::Error::other("resource closed"));
        };
        writer.write_all(buf)?;
        self.written += buf.len() as u64;
        Ok(buf.len())
    }

    fn written_bytes(&self) -> u64 {
        self.written
    }

    fn close(&mut self) -> io::Result<()> {
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };
        // The handle is released even when the flush fails.
        let file = writer.into_inner().map_err(|err| {
            io::Error::new(
                err.error().kind(),
                format!("unable to flush {}: {}", self.path.display(), err.error()),
            )
        })?;
        file.sync_all()
    }
}

impl Drop for FileResource {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("FileResource: close on drop failed: {err}");
        }
    }
}
