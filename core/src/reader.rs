//! Root and file capability traits.
//!
//! A [`DirReader`] is an opened root: a native directory or an archive.
//! Backends implement the read surface; the write surface defaults to
//! `NotSupported` so read-only backends (archives) implement nothing extra.
//! A [`FileBackend`] is one open file within a root; the public handle type
//! in `handle.rs` dispatches through it.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, ErrorKind, Result};
use crate::flags::OpenFlags;
use crate::path::LogicalPath;

/// Static description of a registered archive backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArchiveInfo {
    pub extension: &'static str,
    pub description: &'static str,
    pub author: &'static str,
    pub url: &'static str,
}

/// Shared symbolic-link gate.
///
/// One per context, handed to every backend at open time. While the gate is
/// closed, any entry that is a symbolic link is treated as nonexistent during
/// resolution and enumeration. Links are forbidden by default.
#[derive(Clone, Debug, Default)]
pub struct LinkPolicy {
    allow: Arc<AtomicBool>,
}

impl LinkPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allows_links(&self) -> bool {
        self.allow.load(Ordering::Relaxed)
    }

    pub fn permit(&self, allow: bool) {
        self.allow.store(allow, Ordering::Relaxed);
    }
}

/// An opened root in the search path (or the write directory).
///
/// All paths are normalized logical paths relative to this root. Closing is
/// `Drop`.
pub trait DirReader: Send + Sync {
    /// Names of the children of `path`, in backend order.
    fn enumerate(&self, path: &LogicalPath) -> Result<Vec<String>>;

    fn exists(&self, path: &LogicalPath) -> bool;

    fn is_directory(&self, path: &LogicalPath) -> bool;

    fn is_symlink(&self, path: &LogicalPath) -> bool;

    fn open_read(&self, path: &LogicalPath) -> Result<Box<dyn FileBackend>>;

    fn open_write(&self, _path: &LogicalPath, _flags: OpenFlags) -> Result<Box<dyn FileBackend>> {
        Err(Error::new(ErrorKind::NotSupported, "reader.open_write"))
    }

    fn remove(&self, _path: &LogicalPath) -> Result<()> {
        Err(Error::new(ErrorKind::NotSupported, "reader.remove"))
    }

    /// Create `path` and any missing intermediate directories.
    fn mkdir(&self, _path: &LogicalPath) -> Result<()> {
        Err(Error::new(ErrorKind::NotSupported, "reader.mkdir"))
    }
}

/// One open file within a root.
///
/// Handles are exclusively owned; every operation takes `&mut self`. A
/// backend that cannot write simply keeps the `write`/`flush` defaults, and
/// the absence surfaces to callers as `NotSupported` without being called
/// through.
pub trait FileBackend: Send {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    fn write(&mut self, _buf: &[u8]) -> Result<usize> {
        Err(Error::new(ErrorKind::NotSupported, "file.write"))
    }

    /// Seek to an absolute position. Backends may refuse positions past the
    /// end of file with `PastEof`.
    fn seek(&mut self, pos: u64) -> Result<()>;

    fn tell(&mut self) -> Result<u64>;

    fn length(&mut self) -> Result<u64>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A registered archive backend: a cheap probe plus a constructor.
pub trait ArchiveProvider: Send + Sync {
    fn info(&self) -> &'static ArchiveInfo;

    /// Whether this backend recognizes the file at `path`. Probes must not
    /// fail; unreadable or foreign files answer `false`.
    fn probe(&self, path: &Path) -> bool;

    fn open(&self, path: &Path, links: LinkPolicy) -> Result<Arc<dyn DirReader>>;
}

/// Constructor for the default directory backend, used for roots (and the
/// write directory) that no archive backend claims.
pub trait DirProvider: Send + Sync {
    fn open(&self, path: &Path, links: LinkPolicy) -> Result<Arc<dyn DirReader>>;
}
