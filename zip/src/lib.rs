//! ZIP archive backend.
//!
//! Archives are read-only roots: the central directory is indexed once at
//! open, entries are decompressed on demand into seekable in-memory handles.

mod handle;
mod provider;
mod reader;

pub use provider::{ZipProvider, ZIP_ARCHIVE_INFO};

use packfs_core::{Error, ErrorKind};

pub(crate) fn map_zip_error(context: &'static str, err: zip::result::ZipError) -> Error {
    match err {
        zip::result::ZipError::Io(err) => Error::with_source(ErrorKind::Io, context, err),
        zip::result::ZipError::FileNotFound => Error::new(ErrorKind::NoSuchFile, context),
        zip::result::ZipError::InvalidArchive(_) => Error::new(ErrorKind::Corrupt, context),
        zip::result::ZipError::UnsupportedArchive(_) => {
            Error::new(ErrorKind::UnsupportedArchive, context)
        }
    }
}
