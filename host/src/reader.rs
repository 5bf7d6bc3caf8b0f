//! The native directory backend.
//!
//! Logical names match directory entries byte-for-byte, even on hosts whose
//! filesystems compare names case-insensitively: each component is located by
//! enumerating its parent and comparing raw bytes. Platforms that cannot
//! enumerate a directory cannot host a root.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use packfs_core::{
    DirProvider, DirReader, Error, ErrorKind, FileBackend, LinkPolicy, LogicalPath, OpenFlags,
    Result,
};

use crate::handle::HostHandle;
use crate::io_result;

/// Opens native directories as search-path roots (and as the write dir).
pub struct HostProvider;

impl DirProvider for HostProvider {
    fn open(&self, path: &Path, links: LinkPolicy) -> Result<Arc<dyn DirReader>> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_dir() => {
                tracing::debug!(path = %path.display(), "opened directory root");
                Ok(Arc::new(HostReader {
                    root: path.to_path_buf(),
                    links,
                }))
            }
            Ok(_) => Err(Error::new(ErrorKind::NotADirectory, "host.open")),
            Err(err) => Err(Error::with_source(ErrorKind::NoSuchPath, "host.open", err)),
        }
    }
}

/// A native directory opened as a root.
pub struct HostReader {
    root: PathBuf,
    links: LinkPolicy,
}

impl HostReader {
    /// Resolve a logical path to a native path with byte-exact component
    /// matching. `None` means some component does not exist under that exact
    /// name, or is a symlink while links are forbidden.
    fn resolve(&self, path: &LogicalPath) -> Option<PathBuf> {
        let mut native = self.root.clone();
        for component in path.components() {
            if !directory_has_entry(&native, component) {
                return None;
            }
            native.push(component);
            if !self.links.allows_links() && is_native_symlink(&native) {
                return None;
            }
        }
        Some(native)
    }
}

impl DirReader for HostReader {
    fn enumerate(&self, path: &LogicalPath) -> Result<Vec<String>> {
        let Some(native) = self.resolve(path) else {
            return Err(Error::new(ErrorKind::NoSuchPath, "host.enumerate"));
        };
        let meta = io_result("host.enumerate", std::fs::metadata(&native))?;
        if !meta.is_dir() {
            return Err(Error::new(ErrorKind::NotADirectory, "host.enumerate"));
        }
        let mut names = Vec::new();
        for entry in io_result("host.enumerate", std::fs::read_dir(&native))? {
            let entry = io_result("host.enumerate", entry)?;
            if !self.links.allows_links() && is_native_symlink(&entry.path()) {
                continue;
            }
            // Names that are not valid UTF-8 cannot be addressed by a
            // logical path, so they are not reported either.
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn exists(&self, path: &LogicalPath) -> bool {
        self.resolve(path).is_some()
    }

    fn is_directory(&self, path: &LogicalPath) -> bool {
        self.resolve(path)
            .and_then(|native| std::fs::metadata(native).ok())
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    fn is_symlink(&self, path: &LogicalPath) -> bool {
        self.resolve(path)
            .map(|native| is_native_symlink(&native))
            .unwrap_or(false)
    }

    fn open_read(&self, path: &LogicalPath) -> Result<Box<dyn FileBackend>> {
        let Some(native) = self.resolve(path) else {
            return Err(Error::new(ErrorKind::NoSuchFile, "host.open_read"));
        };
        let meta = io_result("host.open_read", std::fs::metadata(&native))?;
        if meta.is_dir() {
            return Err(Error::new(ErrorKind::NotAFile, "host.open_read"));
        }
        let file = io_result("host.open_read", std::fs::File::open(&native))?;
        Ok(Box::new(HostHandle::new(file)))
    }

    fn open_write(&self, path: &LogicalPath, flags: OpenFlags) -> Result<Box<dyn FileBackend>> {
        let native = path.to_native(&self.root);
        if let Some(parent) = native.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                Error::with_source(ErrorKind::NoDirCreate, "host.open_write", err)
            })?;
        }
        let mut options = std::fs::OpenOptions::new();
        options
            .write(flags.contains(OpenFlags::WRITE))
            .create(flags.contains(OpenFlags::CREATE))
            .truncate(flags.contains(OpenFlags::TRUNC))
            .append(flags.contains(OpenFlags::APPEND));
        let file = io_result("host.open_write", options.open(&native))?;
        Ok(Box::new(HostHandle::new(file)))
    }

    fn remove(&self, path: &LogicalPath) -> Result<()> {
        let native = path.to_native(&self.root);
        let meta = io_result("host.remove", std::fs::symlink_metadata(&native))?;
        let result = if meta.is_dir() {
            std::fs::remove_dir(&native)
        } else {
            std::fs::remove_file(&native)
        };
        io_result("host.remove", result)
    }

    fn mkdir(&self, path: &LogicalPath) -> Result<()> {
        let native = path.to_native(&self.root);
        std::fs::create_dir_all(&native)
            .map_err(|err| Error::with_source(ErrorKind::NoDirCreate, "host.mkdir", err))
    }
}

fn directory_has_entry(dir: &Path, name: &str) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    entries
        .flatten()
        .any(|entry| entry.file_name().as_encoded_bytes() == name.as_bytes())
}

fn is_native_symlink(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn open_root(dir: &Path, links: LinkPolicy) -> Arc<dyn DirReader> {
        HostProvider.open(dir, links).expect("open root")
    }

    fn write_native(dir: &Path, name: &str, data: &[u8]) {
        let mut file = std::fs::File::create(dir.join(name)).expect("create fixture");
        file.write_all(data).expect("write fixture");
    }

    fn logical(raw: &str) -> LogicalPath {
        LogicalPath::parse(raw).expect("valid path")
    }

    fn read_backend(backend: &mut dyn FileBackend) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 64];
        loop {
            let n = backend.read(&mut buf).expect("read");
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    #[test]
    fn lookup_is_byte_exact() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        write_native(tmp.path(), "Readme.TXT", b"hello");
        let root = open_root(tmp.path(), LinkPolicy::new());

        assert!(root.exists(&logical("Readme.TXT")));
        assert!(!root.exists(&logical("readme.txt")));
        let err = match root.open_read(&logical("README.txt")) {
            Err(e) => e,
            Ok(_) => panic!("wrong case"),
        };
        assert_eq!(err.kind(), ErrorKind::NoSuchFile);
    }

    #[test]
    fn read_back_what_was_opened() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        write_native(tmp.path(), "data.bin", b"\x01\x02\x03");
        let root = open_root(tmp.path(), LinkPolicy::new());

        let mut backend = root.open_read(&logical("data.bin")).expect("open");
        assert_eq!(read_backend(backend.as_mut()), b"\x01\x02\x03");
        assert_eq!(backend.length().expect("length"), 3);
    }

    #[test]
    fn opening_a_directory_for_reading_fails() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        std::fs::create_dir(tmp.path().join("sub")).expect("mkdir");
        let root = open_root(tmp.path(), LinkPolicy::new());
        let err = match root.open_read(&logical("sub")) {
            Err(e) => e,
            Ok(_) => panic!("directory"),
        };
        assert_eq!(err.kind(), ErrorKind::NotAFile);
    }

    #[test]
    fn enumerate_returns_sorted_names() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        write_native(tmp.path(), "b", b"");
        write_native(tmp.path(), "a", b"");
        std::fs::create_dir(tmp.path().join("c")).expect("mkdir");
        let root = open_root(tmp.path(), LinkPolicy::new());

        assert_eq!(root.enumerate(&LogicalPath::root()).expect("enumerate"), ["a", "b", "c"]);
        let err = root.enumerate(&logical("a")).expect_err("not a dir");
        assert_eq!(err.kind(), ErrorKind::NotADirectory);
        let err = root.enumerate(&logical("missing")).expect_err("missing");
        assert_eq!(err.kind(), ErrorKind::NoSuchPath);
    }

    #[test]
    fn open_write_creates_missing_parents() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let root = open_root(tmp.path(), LinkPolicy::new());

        let path = logical("saves/slot1/game.sav");
        let mut backend = root
            .open_write(&path, packfs_core::OpenMode::Write.flags())
            .expect("open write");
        backend.write(b"state").expect("write");
        backend.flush().expect("flush");
        drop(backend);

        let mut backend = root.open_read(&path).expect("reopen");
        assert_eq!(read_backend(backend.as_mut()), b"state");
    }

    #[test]
    fn append_positions_at_the_end() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        write_native(tmp.path(), "log.txt", b"one");
        let root = open_root(tmp.path(), LinkPolicy::new());

        let mut backend = root
            .open_write(&logical("log.txt"), packfs_core::OpenMode::Append.flags())
            .expect("open append");
        backend.write(b"two").expect("write");
        backend.flush().expect("flush");
        drop(backend);

        let mut backend = root.open_read(&logical("log.txt")).expect("reopen");
        assert_eq!(read_backend(backend.as_mut()), b"onetwo");
    }

    #[test]
    fn remove_handles_files_and_directories() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        write_native(tmp.path(), "junk", b"");
        let root = open_root(tmp.path(), LinkPolicy::new());

        root.mkdir(&logical("nested/dir")).expect("mkdir");
        assert!(root.is_directory(&logical("nested/dir")));

        root.remove(&logical("junk")).expect("remove file");
        root.remove(&logical("nested/dir")).expect("remove dir");
        assert!(!root.exists(&logical("junk")));
        assert!(!root.exists(&logical("nested/dir")));

        let err = root.remove(&logical("junk")).expect_err("already gone");
        assert_eq!(err.kind(), ErrorKind::NoSuchFile);
    }

    #[cfg(unix)]
    #[test]
    fn link_gate_hides_symlinks_until_permitted() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        write_native(tmp.path(), "real", b"payload");
        std::os::unix::fs::symlink(tmp.path().join("real"), tmp.path().join("link"))
            .expect("symlink");

        let links = LinkPolicy::new();
        let root = open_root(tmp.path(), links.clone());

        assert!(!root.exists(&logical("link")));
        assert!(!root.is_symlink(&logical("link")));
        assert_eq!(
            root.enumerate(&LogicalPath::root()).expect("enumerate"),
            ["real"]
        );

        links.permit(true);
        assert!(root.exists(&logical("link")));
        assert!(root.is_symlink(&logical("link")));
        assert!(!root.is_symlink(&logical("real")));
        let mut backend = root.open_read(&logical("link")).expect("open via link");
        assert_eq!(read_backend(backend.as_mut()), b"payload");
    }

    #[cfg(unix)]
    #[test]
    fn forbidden_link_hides_everything_beneath_it() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        std::fs::create_dir(tmp.path().join("realdir")).expect("mkdir");
        write_native(&tmp.path().join("realdir"), "inner", b"x");
        std::os::unix::fs::symlink(tmp.path().join("realdir"), tmp.path().join("linkdir"))
            .expect("symlink");

        let links = LinkPolicy::new();
        let root = open_root(tmp.path(), links.clone());

        assert!(!root.exists(&logical("linkdir/inner")));
        links.permit(true);
        assert!(root.exists(&logical("linkdir/inner")));
    }
}
