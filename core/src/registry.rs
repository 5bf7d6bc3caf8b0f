//! Archive backend registry and the root-opening probe chain.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, ErrorKind, Result};
use crate::reader::{ArchiveInfo, ArchiveProvider, DirProvider, DirReader, LinkPolicy};

/// Ordered set of archive backends plus the directory fallback.
///
/// Backends are tried in registration order; registration order is fixed at
/// wiring time, so the probe order is stable for the process lifetime.
pub struct ArchiveRegistry {
    providers: Vec<Arc<dyn ArchiveProvider>>,
    dirs: Arc<dyn DirProvider>,
}

impl ArchiveRegistry {
    pub fn new(dirs: Arc<dyn DirProvider>) -> Self {
        Self {
            providers: Vec::new(),
            dirs,
        }
    }

    pub fn register(&mut self, provider: Arc<dyn ArchiveProvider>) {
        self.providers.push(provider);
    }

    /// Descriptions of every registered archive backend, in probe order.
    pub fn archive_infos(&self) -> Vec<ArchiveInfo> {
        self.providers.iter().map(|p| *p.info()).collect()
    }

    /// Open a root for the native path `path`.
    ///
    /// The first backend whose probe accepts the path opens it. Unclaimed
    /// paths that name an existing directory get the directory backend;
    /// unclaimed files fail `UnsupportedArchive`; missing paths fail
    /// `NoSuchPath`.
    pub fn open_root(&self, path: &Path, links: LinkPolicy) -> Result<Arc<dyn DirReader>> {
        for provider in &self.providers {
            if provider.probe(path) {
                debug!(path = %path.display(), backend = provider.info().extension, "opening root");
                return provider.open(path, links);
            }
        }

        match std::fs::metadata(path) {
            Ok(meta) if meta.is_dir() => self.open_directory(path, links),
            Ok(_) => Err(Error::new(
                ErrorKind::UnsupportedArchive,
                "registry.open_root",
            )),
            Err(err) => Err(Error::with_source(
                ErrorKind::NoSuchPath,
                "registry.open_root",
                err,
            )),
        }
    }

    /// Open `path` with the directory backend directly, bypassing the archive
    /// probes. Used for the write directory.
    pub fn open_directory(&self, path: &Path, links: LinkPolicy) -> Result<Arc<dyn DirReader>> {
        self.dirs.open(path, links)
    }
}
