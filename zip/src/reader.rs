//! Central-directory index and the read surface.

use std::collections::BTreeMap;
use std::io::{BufReader, Read};
use std::path::Path;

use parking_lot::Mutex;
use zip::ZipArchive;

use packfs_core::{DirReader, Error, ErrorKind, FileBackend, LogicalPath, Result};

use crate::handle::ZipHandle;
use crate::map_zip_error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Entry {
    Dir,
    File { index: usize },
}

/// An opened ZIP archive.
///
/// The central directory is walked once at open into a name index; many
/// archives carry no explicit directory entries, so every ancestor of every
/// entry becomes an implicit directory. Enumeration order is the index's
/// (sorted by name).
pub struct ZipReader {
    archive: Mutex<ZipArchive<BufReader<std::fs::File>>>,
    index: BTreeMap<String, Entry>,
}

impl ZipReader {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|err| Error::with_source(ErrorKind::Io, "zip.open", err))?;
        let mut archive = ZipArchive::new(BufReader::new(file))
            .map_err(|err| map_zip_error("zip.open", err))?;

        let mut index = BTreeMap::new();
        for i in 0..archive.len() {
            let entry = archive
                .by_index(i)
                .map_err(|err| map_zip_error("zip.open", err))?;
            let name = entry.name().trim_matches('/');
            if name.is_empty() {
                continue;
            }
            if entry.is_dir() {
                index.insert(name.to_owned(), Entry::Dir);
            } else {
                index.insert(name.to_owned(), Entry::File { index: i });
            }
            let mut parent = name;
            while let Some(pos) = parent.rfind('/') {
                parent = &parent[..pos];
                index.entry(parent.to_owned()).or_insert(Entry::Dir);
            }
        }

        Ok(Self {
            archive: Mutex::new(archive),
            index,
        })
    }

    fn lookup(&self, path: &LogicalPath) -> Option<Entry> {
        if path.is_root() {
            return Some(Entry::Dir);
        }
        self.index.get(path.as_str()).copied()
    }
}

impl DirReader for ZipReader {
    fn enumerate(&self, path: &LogicalPath) -> Result<Vec<String>> {
        match self.lookup(path) {
            Some(Entry::Dir) => {}
            Some(Entry::File { .. }) => {
                return Err(Error::new(ErrorKind::NotADirectory, "zip.enumerate"));
            }
            None => return Err(Error::new(ErrorKind::NoSuchPath, "zip.enumerate")),
        }
        let prefix = if path.is_root() {
            String::new()
        } else {
            format!("{}/", path.as_str())
        };
        let mut names = Vec::new();
        for key in self.index.keys() {
            if let Some(rest) = key.strip_prefix(&prefix) {
                if !rest.is_empty() && !rest.contains('/') {
                    names.push(rest.to_owned());
                }
            }
        }
        Ok(names)
    }

    fn exists(&self, path: &LogicalPath) -> bool {
        self.lookup(path).is_some()
    }

    fn is_directory(&self, path: &LogicalPath) -> bool {
        matches!(self.lookup(path), Some(Entry::Dir))
    }

    fn is_symlink(&self, _path: &LogicalPath) -> bool {
        false
    }

    fn open_read(&self, path: &LogicalPath) -> Result<Box<dyn FileBackend>> {
        match self.lookup(path) {
            Some(Entry::File { index }) => {
                let mut archive = self.archive.lock();
                let mut entry = archive
                    .by_index(index)
                    .map_err(|err| map_zip_error("zip.open_read", err))?;
                let mut data = Vec::with_capacity(entry.size() as usize);
                entry
                    .read_to_end(&mut data)
                    .map_err(|err| Error::with_source(ErrorKind::Corrupt, "zip.open_read", err))?;
                Ok(Box::new(ZipHandle::new(data)))
            }
            Some(Entry::Dir) => Err(Error::new(ErrorKind::NotAFile, "zip.open_read")),
            None => Err(Error::new(ErrorKind::NoSuchFile, "zip.open_read")),
        }
    }
}
