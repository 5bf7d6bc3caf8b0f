//! Shared fixtures for the integration tests.
//!
//! The library state is process-global, so every test that touches it holds
//! a [`Session`]: a lock over the global plus init-on-entry / deinit-on-drop.

use std::io::Write as _;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

static LOCK: Mutex<()> = Mutex::new(());

pub fn lock() -> MutexGuard<'static, ()> {
    LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Session {
    _guard: MutexGuard<'static, ()>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_argv0("/opt/app/bin/app")
    }

    pub fn with_argv0(argv0: &str) -> Self {
        let guard = lock();
        let _ = packfs::last_error();
        packfs::init(argv0).expect("init");
        Session { _guard: guard }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = packfs::deinit();
    }
}

pub fn write_native(dir: &Path, name: &str, data: &[u8]) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parents");
    }
    std::fs::write(&path, data).expect("write fixture");
}

pub fn make_archive(path: &Path, entries: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).expect("create archive");
    let mut writer = zip::ZipWriter::new(file);
    for (name, data) in entries {
        writer
            .start_file(*name, zip::write::FileOptions::default())
            .expect("start entry");
        writer.write_all(data).expect("write entry");
    }
    writer.finish().expect("finish archive");
}

pub fn utf8(path: &Path) -> &str {
    path.to_str().expect("utf8 path")
}
