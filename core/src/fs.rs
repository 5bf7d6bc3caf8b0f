//! The `PackFs` context: search path, write directory, and lookup semantics.
//!
//! Mutators take `&mut self`, read-side operations take `&self`; that is the
//! whole concurrency contract. A process-global wrapper lives in the surface
//! crate.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::{debug, trace};

use crate::error::{Error, ErrorKind, Result};
use crate::flags::OpenMode;
use crate::handle::{File, LiveGuard};
use crate::path::LogicalPath;
use crate::reader::{ArchiveInfo, DirReader, LinkPolicy};
use crate::registry::ArchiveRegistry;
use crate::search::{SearchPath, SearchPathEntry};

struct WriteDir {
    path: String,
    reader: Arc<dyn DirReader>,
    live: Arc<AtomicUsize>,
}

/// A virtual filesystem: an ordered search path for reads and a single
/// rooted directory for writes.
pub struct PackFs {
    base_dir: String,
    user_dir_hint: Option<String>,
    user_dir: OnceLock<String>,
    write_dir: Option<WriteDir>,
    search: SearchPath,
    links: LinkPolicy,
    open_writes: Arc<AtomicUsize>,
    registry: ArchiveRegistry,
}

impl PackFs {
    /// `base_dir` is the application's own directory; `user_dir_hint` is the
    /// platform's answer for the current user's directory, if it has one.
    pub fn new(base_dir: String, user_dir_hint: Option<String>, registry: ArchiveRegistry) -> Self {
        Self {
            base_dir,
            user_dir_hint,
            user_dir: OnceLock::new(),
            write_dir: None,
            search: SearchPath::default(),
            links: LinkPolicy::new(),
            open_writes: Arc::new(AtomicUsize::new(0)),
            registry,
        }
    }

    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }

    /// The current user's directory, computed on first use.
    ///
    /// Falls back to `<base>/users/<name>` when the platform has no user
    /// directory, and to the user name `"default"` when even that is unknown.
    pub fn user_dir(&self) -> &str {
        self.user_dir.get_or_init(|| {
            if let Some(dir) = &self.user_dir_hint {
                return dir.clone();
            }
            let sep = std::path::MAIN_SEPARATOR;
            let name = std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_else(|_| "default".to_owned());
            format!("{}{sep}users{sep}{name}", self.base_dir)
        })
    }

    pub fn write_dir(&self) -> Option<&str> {
        self.write_dir.as_ref().map(|wd| wd.path.as_str())
    }

    pub fn symbolic_links_permitted(&self) -> bool {
        self.links.allows_links()
    }

    pub fn permit_symbolic_links(&mut self, allow: bool) {
        debug!(allow, "symbolic link policy changed");
        self.links.permit(allow);
    }

    pub fn archive_infos(&self) -> Vec<ArchiveInfo> {
        self.registry.archive_infos()
    }

    /// Total file handles still open through any root or the write dir.
    pub fn live_handles(&self) -> usize {
        let write = self
            .write_dir
            .as_ref()
            .map(|wd| wd.live.load(Ordering::SeqCst))
            .unwrap_or(0);
        self.search.live_handles() + write
    }

    pub fn open_write_handles(&self) -> usize {
        self.open_writes.load(Ordering::SeqCst)
    }

    /// Open `root` (directory or archive) and add it to the search path:
    /// appended to the tail when `append`, prepended otherwise.
    pub fn add_to_search_path(&mut self, root: &str, append: bool) -> Result<()> {
        if root.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "fs.add_to_search_path",
            ));
        }
        let reader = self.registry.open_root(Path::new(root), self.links.clone())?;
        self.search
            .add(SearchPathEntry::new(root.to_owned(), reader), append);
        debug!(root, append, "added to search path");
        Ok(())
    }

    /// Remove the first root whose original string matches byte-for-byte.
    pub fn remove_from_search_path(&mut self, root: &str) -> Result<()> {
        self.search.remove(root)?;
        debug!(root, "removed from search path");
        Ok(())
    }

    pub fn search_path(&self) -> Vec<String> {
        self.search.roots()
    }

    /// Point writes at `new_dir` (created if missing), or clear the write
    /// dir with `None`. Refused while any write handle is open.
    pub fn set_write_dir(&mut self, new_dir: Option<&str>) -> Result<()> {
        if self.open_writes.load(Ordering::SeqCst) > 0 {
            return Err(Error::new(ErrorKind::FilesOpenWrite, "fs.set_write_dir"));
        }
        self.write_dir = None;
        if let Some(dir) = new_dir {
            std::fs::create_dir_all(dir)
                .map_err(|err| Error::with_source(ErrorKind::NoDirCreate, "fs.set_write_dir", err))?;
            let reader = self
                .registry
                .open_directory(Path::new(dir), self.links.clone())?;
            self.write_dir = Some(WriteDir {
                path: dir.to_owned(),
                reader,
                live: Arc::new(AtomicUsize::new(0)),
            });
        }
        debug!(write_dir = ?new_dir, "write dir set");
        Ok(())
    }

    /// Open `path` for reading from the first root that has it.
    pub fn open_read(&self, path: &str) -> Result<File> {
        let path = LogicalPath::parse(path)?;
        for entry in self.search.iter() {
            let reader = entry.reader();
            if self.hidden_by_link_gate(reader.as_ref(), &path) {
                continue;
            }
            match reader.open_read(&path) {
                Ok(backend) => {
                    return Ok(File::new(
                        backend,
                        OpenMode::Read,
                        LiveGuard::new(entry.live()),
                        None,
                    ));
                }
                Err(err) if resolution_miss(&err) => {
                    trace!(root = entry.root(), path = %path, "open_read miss");
                }
                Err(err) => return Err(err),
            }
        }
        Err(Error::new(ErrorKind::NoSuchFile, "fs.open_read"))
    }

    /// The original root string of the search-path entry that resolves
    /// `path`, first match wins.
    pub fn real_dir(&self, path: &str) -> Result<String> {
        let path = LogicalPath::parse(path)?;
        for entry in self.search.iter() {
            let reader = entry.reader();
            if self.hidden_by_link_gate(reader.as_ref(), &path) {
                continue;
            }
            if reader.exists(&path) {
                return Ok(entry.root().to_owned());
            }
        }
        Err(Error::new(ErrorKind::NoSuchPath, "fs.real_dir"))
    }

    pub fn exists(&self, path: &str) -> Result<bool> {
        let path = LogicalPath::parse(path)?;
        Ok(self.search.iter().any(|entry| {
            let reader = entry.reader();
            !self.hidden_by_link_gate(reader.as_ref(), &path) && reader.exists(&path)
        }))
    }

    /// Whether the first root containing `path` has it as a directory.
    pub fn is_directory(&self, path: &str) -> Result<bool> {
        let path = LogicalPath::parse(path)?;
        for entry in self.search.iter() {
            let reader = entry.reader();
            if self.hidden_by_link_gate(reader.as_ref(), &path) {
                continue;
            }
            if reader.exists(&path) {
                return Ok(reader.is_directory(&path));
            }
        }
        Ok(false)
    }

    /// Whether the first root containing `path` has it as a symbolic link.
    /// Always false while links are forbidden (they are invisible).
    pub fn is_symbolic_link(&self, path: &str) -> Result<bool> {
        let path = LogicalPath::parse(path)?;
        if !self.links.allows_links() {
            return Ok(false);
        }
        for entry in self.search.iter() {
            if entry.reader().exists(&path) {
                return Ok(entry.reader().is_symlink(&path));
            }
        }
        Ok(false)
    }

    /// Union of `path`'s children across all roots that have it as a
    /// directory. Names from earlier roots precede names first seen in later
    /// roots; duplicates are reported once; per-root order is the backend's.
    pub fn enumerate_files(&self, path: &str) -> Result<Vec<String>> {
        let path = LogicalPath::parse(path)?;
        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for entry in self.search.iter() {
            let reader = entry.reader();
            if self.hidden_by_link_gate(reader.as_ref(), &path) {
                continue;
            }
            if !reader.is_directory(&path) {
                continue;
            }
            let names = match reader.enumerate(&path) {
                Ok(names) => names,
                Err(err) => {
                    trace!(root = entry.root(), path = %path, error = %err, "enumerate skipped");
                    continue;
                }
            };
            for name in names {
                if seen.insert(name.clone()) {
                    merged.push(name);
                }
            }
        }
        Ok(merged)
    }

    /// Create `path` (and missing parents) under the write dir.
    pub fn mkdir(&self, path: &str) -> Result<()> {
        let path = LogicalPath::parse(path)?;
        let write_dir = self.require_write_dir("fs.mkdir")?;
        write_dir.reader.mkdir(&path)
    }

    /// Remove `path` under the write dir.
    pub fn delete(&self, path: &str) -> Result<()> {
        let path = LogicalPath::parse(path)?;
        let write_dir = self.require_write_dir("fs.delete")?;
        write_dir.reader.remove(&path)
    }

    /// Open `path` under the write dir, truncating.
    pub fn open_write(&self, path: &str) -> Result<File> {
        self.open_for_writing(path, OpenMode::Write)
    }

    /// Open `path` under the write dir, positioned at the end.
    pub fn open_append(&self, path: &str) -> Result<File> {
        self.open_for_writing(path, OpenMode::Append)
    }

    fn open_for_writing(&self, path: &str, mode: OpenMode) -> Result<File> {
        let path = LogicalPath::parse(path)?;
        let write_dir = self.require_write_dir("fs.open_for_writing")?;
        let backend = write_dir.reader.open_write(&path, mode.flags())?;
        Ok(File::new(
            backend,
            mode,
            LiveGuard::new(&write_dir.live),
            Some(LiveGuard::new(&self.open_writes)),
        ))
    }

    fn require_write_dir(&self, context: &'static str) -> Result<&WriteDir> {
        self.write_dir
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::NoWriteDir, context))
    }

    fn hidden_by_link_gate(&self, reader: &dyn DirReader, path: &LogicalPath) -> bool {
        !self.links.allows_links() && reader.is_symlink(path)
    }

    #[cfg(test)]
    pub(crate) fn insert_root(&mut self, root: &str, reader: Arc<dyn DirReader>, append: bool) {
        self.search
            .add(SearchPathEntry::new(root.to_owned(), reader), append);
    }
}

fn resolution_miss(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::NoSuchFile
            | ErrorKind::NoSuchPath
            | ErrorKind::NotAFile
            | ErrorKind::SymlinkForbidden
    )
}
