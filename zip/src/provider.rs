use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use packfs_core::{ArchiveInfo, ArchiveProvider, DirReader, LinkPolicy, Result};

use crate::reader::ZipReader;

pub static ZIP_ARCHIVE_INFO: ArchiveInfo = ArchiveInfo {
    extension: "ZIP",
    description: "PkZip/WinZip/Info-Zip compatible",
    author: "packfs contributors",
    url: "https://docs.rs/zip",
};

pub struct ZipProvider;

impl ArchiveProvider for ZipProvider {
    fn info(&self) -> &'static ArchiveInfo {
        &ZIP_ARCHIVE_INFO
    }

    fn probe(&self, path: &Path) -> bool {
        // Local-file-header or end-of-central-directory magic; an empty
        // archive starts with the latter.
        let Ok(mut file) = std::fs::File::open(path) else {
            return false;
        };
        let mut magic = [0u8; 4];
        if file.read_exact(&mut magic).is_err() {
            return false;
        }
        matches!(&magic, b"PK\x03\x04" | b"PK\x05\x06")
    }

    fn open(&self, path: &Path, _links: LinkPolicy) -> Result<Arc<dyn DirReader>> {
        debug!(path = %path.display(), "opening zip archive");
        Ok(Arc::new(ZipReader::open(path)?))
    }
}
