//! The ordered search path.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{Error, ErrorKind, Result};
use crate::reader::DirReader;

/// One root in the search path: the original root string (byte-exact, used
/// for removal and `get_real_dir`), the opened reader, and the count of file
/// handles still open through it.
pub(crate) struct SearchPathEntry {
    root: String,
    reader: Arc<dyn DirReader>,
    live: Arc<AtomicUsize>,
}

impl SearchPathEntry {
    pub(crate) fn new(root: String, reader: Arc<dyn DirReader>) -> Self {
        Self {
            root,
            reader,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn root(&self) -> &str {
        &self.root
    }

    pub(crate) fn reader(&self) -> &Arc<dyn DirReader> {
        &self.reader
    }

    pub(crate) fn live(&self) -> &Arc<AtomicUsize> {
        &self.live
    }

    pub(crate) fn live_handles(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub(crate) struct SearchPath {
    entries: Vec<SearchPathEntry>,
}

impl SearchPath {
    /// Append to the tail or prepend to the head.
    pub(crate) fn add(&mut self, entry: SearchPathEntry, append: bool) {
        if append {
            self.entries.push(entry);
        } else {
            self.entries.insert(0, entry);
        }
    }

    /// Remove the first entry whose root string matches byte-for-byte,
    /// closing its reader. Refused while any handle opened through it lives.
    pub(crate) fn remove(&mut self, root: &str) -> Result<()> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.root == root)
            .ok_or_else(|| Error::new(ErrorKind::NotInSearchPath, "search.remove"))?;
        if self.entries[index].live_handles() > 0 {
            return Err(Error::new(ErrorKind::FilesStillOpen, "search.remove"));
        }
        self.entries.remove(index);
        Ok(())
    }

    pub(crate) fn roots(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.root.clone()).collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &SearchPathEntry> {
        self.entries.iter()
    }

    pub(crate) fn live_handles(&self) -> usize {
        self.entries.iter().map(SearchPathEntry::live_handles).sum()
    }
}
