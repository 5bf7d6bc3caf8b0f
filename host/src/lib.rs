//! Native directory backend and platform adapter.

mod handle;
mod platform;
mod reader;

pub use platform::{base_dir, cd_rom_dirs, dir_separator, user_dir};
pub use reader::{HostProvider, HostReader};

use packfs_core::{Error, ErrorKind, Result};

pub(crate) fn map_io_error(context: &'static str, err: std::io::Error) -> Error {
    let kind = io_error_kind(&err);
    Error::with_source(kind, context, err)
}

pub(crate) fn io_result<T>(context: &'static str, result: std::io::Result<T>) -> Result<T> {
    result.map_err(|err| map_io_error(context, err))
}

fn io_error_kind(err: &std::io::Error) -> ErrorKind {
    match err.kind() {
        std::io::ErrorKind::NotFound => ErrorKind::NoSuchFile,
        std::io::ErrorKind::Unsupported => ErrorKind::NotSupported,
        _ => ErrorKind::Io,
    }
}
