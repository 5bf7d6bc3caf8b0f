//! The public file handle and its dispatch layer.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{Error, ErrorKind, Result};
use crate::flags::OpenMode;
use crate::reader::FileBackend;

/// RAII increment of a shared live-handle counter.
///
/// Readers and the write directory count their outstanding handles through
/// these; removal and teardown refuse while a count is non-zero.
pub(crate) struct LiveGuard {
    counter: Arc<AtomicUsize>,
}

impl LiveGuard {
    pub(crate) fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self {
            counter: counter.clone(),
        }
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// An open file in the virtual filesystem.
///
/// The handle owns its backend exclusively; it is `Send` but deliberately not
/// `Sync` to share — all I/O takes `&mut self`. Dropping the handle closes it
/// best-effort; [`File::close`] reports flush failures and hands the handle
/// back so buffered data is not silently lost.
pub struct File {
    backend: Box<dyn FileBackend>,
    mode: OpenMode,
    _live: LiveGuard,
    _write: Option<LiveGuard>,
}

impl File {
    pub(crate) fn new(
        backend: Box<dyn FileBackend>,
        mode: OpenMode,
        live: LiveGuard,
        write: Option<LiveGuard>,
    ) -> Self {
        Self {
            backend,
            mode,
            _live: live,
            _write: write,
        }
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Read up to `buf.len()` bytes, returning the count. Zero at end of
    /// file.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.mode != OpenMode::Read {
            return Err(Error::new(ErrorKind::NotSupported, "handle.read"));
        }
        self.backend.read(buf)
    }

    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if !self.mode.is_writing() {
            return Err(Error::new(ErrorKind::NotSupported, "handle.write"));
        }
        self.backend.write(buf)
    }

    /// Seek to an absolute position. Backends may refuse positions past the
    /// end of file with `PastEof`.
    pub fn seek(&mut self, pos: u64) -> Result<()> {
        self.backend.seek(pos)
    }

    pub fn tell(&mut self) -> Result<u64> {
        self.backend.tell()
    }

    pub fn length(&mut self) -> Result<u64> {
        self.backend.length()
    }

    pub fn eof(&mut self) -> Result<bool> {
        Ok(self.backend.tell()? >= self.backend.length()?)
    }

    /// Flush and close the handle.
    ///
    /// On failure the handle is returned inside the error, still open, so the
    /// caller can retry or salvage; this mirrors the contract that a failed
    /// close leaves the handle live.
    pub fn close(mut self) -> std::result::Result<(), CloseError> {
        match self.backend.flush() {
            Ok(()) => Ok(()),
            Err(error) => Err(CloseError { file: self, error }),
        }
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File").field("mode", &self.mode).finish()
    }
}

impl io::Read for File {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        File::read(self, buf).map_err(io::Error::other)
    }
}

impl io::Write for File {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        File::write(self, buf).map_err(io::Error::other)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.backend.flush().map_err(io::Error::other)
    }
}

impl io::Seek for File {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let target = match pos {
            io::SeekFrom::Start(offset) => offset,
            io::SeekFrom::Current(delta) => {
                let current = self.tell().map_err(io::Error::other)?;
                offset_by(current, delta)?
            }
            io::SeekFrom::End(delta) => {
                let end = self.length().map_err(io::Error::other)?;
                offset_by(end, delta)?
            }
        };
        File::seek(self, target).map_err(io::Error::other)?;
        Ok(target)
    }
}

fn offset_by(base: u64, delta: i64) -> io::Result<u64> {
    let target = if delta >= 0 {
        base.checked_add(delta as u64)
    } else {
        base.checked_sub(delta.unsigned_abs())
    };
    target.ok_or_else(|| io::Error::other("seek offset out of range"))
}

/// A failed [`File::close`]: the error, plus the still-open handle.
pub struct CloseError {
    pub file: File,
    pub error: Error,
}

impl fmt::Debug for CloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseError")
            .field("error", &self.error)
            .finish()
    }
}

impl fmt::Display for CloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "close failed: {}", self.error)
    }
}

impl std::error::Error for CloseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
