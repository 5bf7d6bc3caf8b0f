//! Core of the `packfs` virtual filesystem.
//!
//! Applications read game-style assets through an ordered *search path* of
//! roots (native directories or archives) and write user state under a
//! single *write directory*, addressing everything with one
//! platform-independent path syntax. This crate defines the capability
//! traits backends implement ([`DirReader`], [`FileBackend`],
//! [`ArchiveProvider`]), the [`PackFs`] context that owns the search path
//! and write directory, the public [`File`] handle, and the per-thread
//! error channel. Concrete backends live in their own crates.

mod error;
mod flags;
mod fs;
mod handle;
mod last_error;
mod path;
mod reader;
mod registry;
mod search;

pub use error::{Error, ErrorKind, Result};
pub use flags::{OpenFlags, OpenMode};
pub use fs::PackFs;
pub use handle::{CloseError, File};
pub use last_error::{last_error, latch, set_last_error};
pub use path::LogicalPath;
pub use reader::{ArchiveInfo, ArchiveProvider, DirProvider, DirReader, FileBackend, LinkPolicy};
pub use registry::ArchiveRegistry;
