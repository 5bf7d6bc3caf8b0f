//! Process-global surface of the `packfs` virtual filesystem.
//!
//! One filesystem per process: [`init`] wires the archive backends in their
//! fixed probe order (ZIP, then the native directory fallback) and computes
//! the base dir from the program's argv\[0\]; every other function operates
//! on that instance. Reads resolve against the ordered search path, writes
//! go under the single write directory, and every failing call latches a
//! short message retrievable (once) with [`last_error`].
//!
//! Configuration mutators take the instance's write lock; lookups and opens
//! share its read lock, so reads from multiple threads proceed concurrently.
//! [`File`] handles do their I/O without touching the instance at all.

mod sane;

pub use packfs_core::{
    last_error, ArchiveInfo, CloseError, Error, ErrorKind, File, LogicalPath, OpenMode, PackFs,
    Result,
};
pub use packfs_host::{cd_rom_dirs, dir_separator};
pub use sane::set_sane_config;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use packfs_core::{latch, ArchiveRegistry};
use packfs_host::HostProvider;
use packfs_zip::ZipProvider;

static STATE: RwLock<Option<PackFs>> = RwLock::new(None);

/// Library version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

pub fn version() -> Version {
    let mut parts = env!("CARGO_PKG_VERSION")
        .split('.')
        .map(|part| part.parse().unwrap_or(0));
    Version {
        major: parts.next().unwrap_or(0),
        minor: parts.next().unwrap_or(0),
        patch: parts.next().unwrap_or(0),
    }
}

/// Initialize the process-global filesystem.
///
/// `argv0` is the program's own path; its directory becomes the base dir.
pub fn init(argv0: &str) -> Result<()> {
    latch(do_init(argv0))
}

fn do_init(argv0: &str) -> Result<()> {
    if argv0.is_empty() {
        return Err(Error::new(ErrorKind::InvalidArgument, "api.init"));
    }
    let mut state = STATE.write();
    if state.is_some() {
        return Err(Error::new(ErrorKind::IsInitialized, "api.init"));
    }
    let mut registry = ArchiveRegistry::new(Arc::new(HostProvider));
    registry.register(Arc::new(ZipProvider));
    let base_dir = packfs_host::base_dir(argv0);
    debug!(base_dir = %base_dir, "initialized");
    *state = Some(PackFs::new(base_dir, packfs_host::user_dir(), registry));
    Ok(())
}

/// Tear down the process-global filesystem.
///
/// Refused with `FilesStillOpen` while any file handle is open: the library
/// cannot close handles the caller still owns, so they must be dropped (or
/// closed) first. The write dir, search path, and the calling thread's
/// latched error are all cleared.
pub fn deinit() -> Result<()> {
    latch(do_deinit())
}

fn do_deinit() -> Result<()> {
    let mut state = STATE.write();
    let fs = state
        .as_ref()
        .ok_or_else(|| Error::new(ErrorKind::NotInitialized, "api.deinit"))?;
    if fs.live_handles() > 0 {
        return Err(Error::new(ErrorKind::FilesStillOpen, "api.deinit"));
    }
    *state = None;
    let _ = packfs_core::last_error();
    debug!("deinitialized");
    Ok(())
}

pub fn is_initialized() -> bool {
    STATE.read().is_some()
}

fn with_read<T>(context: &'static str, op: impl FnOnce(&PackFs) -> Result<T>) -> Result<T> {
    latch(read_inner(context, op))
}

fn read_inner<T>(context: &'static str, op: impl FnOnce(&PackFs) -> Result<T>) -> Result<T> {
    let state = STATE.read();
    let fs = state
        .as_ref()
        .ok_or_else(|| Error::new(ErrorKind::NotInitialized, context))?;
    op(fs)
}

fn with_write<T>(context: &'static str, op: impl FnOnce(&mut PackFs) -> Result<T>) -> Result<T> {
    latch(write_inner(context, op))
}

fn write_inner<T>(context: &'static str, op: impl FnOnce(&mut PackFs) -> Result<T>) -> Result<T> {
    let mut state = STATE.write();
    let fs = state
        .as_mut()
        .ok_or_else(|| Error::new(ErrorKind::NotInitialized, context))?;
    op(fs)
}

/// Descriptions of the archive backends, in probe order.
pub fn supported_archive_types() -> Result<Vec<ArchiveInfo>> {
    with_read("api.supported_archive_types", |fs| Ok(fs.archive_infos()))
}

pub fn base_dir() -> Result<String> {
    with_read("api.base_dir", |fs| Ok(fs.base_dir().to_owned()))
}

pub fn user_dir() -> Result<String> {
    with_read("api.user_dir", |fs| Ok(fs.user_dir().to_owned()))
}

pub fn write_dir() -> Result<Option<String>> {
    with_read("api.write_dir", |fs| {
        Ok(fs.write_dir().map(str::to_owned))
    })
}

/// Point writes at `new_dir` (created if missing), or clear the write dir
/// with `None`. Refused while any write handle is open.
pub fn set_write_dir(new_dir: Option<&str>) -> Result<()> {
    with_write("api.set_write_dir", |fs| fs.set_write_dir(new_dir))
}

/// Open `root` (directory or archive) and add it to the search path:
/// appended to the tail when `append`, prepended otherwise.
pub fn add_to_search_path(root: &str, append: bool) -> Result<()> {
    with_write("api.add_to_search_path", |fs| {
        fs.add_to_search_path(root, append)
    })
}

/// Remove the first search-path root whose original string matches
/// byte-for-byte. Refused while files are open through it.
pub fn remove_from_search_path(root: &str) -> Result<()> {
    with_write("api.remove_from_search_path", |fs| {
        fs.remove_from_search_path(root)
    })
}

/// The current search path, in lookup order.
pub fn search_path() -> Result<Vec<String>> {
    with_read("api.search_path", |fs| Ok(fs.search_path()))
}

pub fn permit_symbolic_links(allow: bool) -> Result<()> {
    with_write("api.permit_symbolic_links", |fs| {
        fs.permit_symbolic_links(allow);
        Ok(())
    })
}

pub fn symbolic_links_permitted() -> Result<bool> {
    with_read("api.symbolic_links_permitted", |fs| {
        Ok(fs.symbolic_links_permitted())
    })
}

/// Create a directory (and missing parents) under the write dir.
pub fn mkdir(path: &str) -> Result<()> {
    with_read("api.mkdir", |fs| fs.mkdir(path))
}

/// Remove a file or empty directory under the write dir.
pub fn delete(path: &str) -> Result<()> {
    with_read("api.delete", |fs| fs.delete(path))
}

/// The original root string of the search-path entry that resolves `path`.
pub fn real_dir(path: &str) -> Result<String> {
    with_read("api.real_dir", |fs| fs.real_dir(path))
}

/// Union of `path`'s children across all roots, earlier roots first,
/// duplicates reported once.
pub fn enumerate_files(path: &str) -> Result<Vec<String>> {
    with_read("api.enumerate_files", |fs| fs.enumerate_files(path))
}

pub fn exists(path: &str) -> Result<bool> {
    with_read("api.exists", |fs| fs.exists(path))
}

pub fn is_directory(path: &str) -> Result<bool> {
    with_read("api.is_directory", |fs| fs.is_directory(path))
}

pub fn is_symbolic_link(path: &str) -> Result<bool> {
    with_read("api.is_symbolic_link", |fs| fs.is_symbolic_link(path))
}

/// Open `path` for reading from the first search-path root that has it.
pub fn open_read(path: &str) -> Result<File> {
    with_read("api.open_read", |fs| fs.open_read(path))
}

/// Open `path` under the write dir, truncating any existing file.
pub fn open_write(path: &str) -> Result<File> {
    with_read("api.open_write", |fs| fs.open_write(path))
}

/// Open `path` under the write dir, positioned at the end.
pub fn open_append(path: &str) -> Result<File> {
    with_read("api.open_append", |fs| fs.open_append(path))
}
