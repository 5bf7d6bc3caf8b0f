use std::fmt;

/// Semantic failure modes of the virtual filesystem.
///
/// This is intentionally flat: every kind maps to one canonical short message
/// (the text latched into the per-thread error channel), so the public surface
/// can report failures without string-formatting on the hot path.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    #[error("already initialized")]
    IsInitialized,
    #[error("not initialized")]
    NotInitialized,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("invalid path")]
    InvalidPath,
    #[error("files still open")]
    FilesStillOpen,
    #[error("files open for writing")]
    FilesOpenWrite,
    #[error("no write directory set")]
    NoWriteDir,
    #[error("could not create directory")]
    NoDirCreate,
    #[error("no such path")]
    NoSuchPath,
    #[error("no such file")]
    NoSuchFile,
    #[error("not a directory")]
    NotADirectory,
    #[error("not a file")]
    NotAFile,
    #[error("not an archive")]
    NotAnArchive,
    #[error("unsupported archive type")]
    UnsupportedArchive,
    #[error("not in search path")]
    NotInSearchPath,
    #[error("operation not supported")]
    NotSupported,
    #[error("seek past end of file")]
    PastEof,
    #[error("corrupt archive")]
    Corrupt,
    #[error("symbolic link forbidden")]
    SymlinkForbidden,
    #[error("i/o error")]
    Io,
}

/// A VFS failure: a semantic kind plus the operation that detected it.
///
/// `context` names the failing operation (`"search.open_read"`,
/// `"host.enumerate"`); it is for diagnostics and logging, never for matching.
/// Callers branch on [`Error::kind`].
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    context: &'static str,
    source: Option<std::io::Error>,
}

impl Error {
    pub fn new(kind: ErrorKind, context: &'static str) -> Self {
        Self {
            kind,
            context,
            source: None,
        }
    }

    pub fn with_source(kind: ErrorKind, context: &'static str, source: std::io::Error) -> Self {
        Self {
            kind,
            context,
            source: Some(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn context(&self) -> &'static str {
        self.context
    }

    /// The short message latched into the per-thread error channel.
    ///
    /// Platform I/O failures report the underlying OS error text; everything
    /// else reports the kind's canonical message.
    pub fn channel_message(&self) -> String {
        match (&self.kind, &self.source) {
            (ErrorKind::Io, Some(source)) => source.to_string(),
            _ => self.kind.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}: {}", self.context, self.kind, source),
            None => write!(f, "{}: {}", self.context, self.kind),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
