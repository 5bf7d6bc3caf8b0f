use bitflags::bitflags;

bitflags! {
    /// Open semantics handed from the dispatch layer to a backend.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct OpenFlags: u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const APPEND = 1 << 2;
        const TRUNC = 1 << 3;
        const CREATE = 1 << 4;
    }
}

/// The three caller-visible open modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenMode {
    Read,
    Write,
    Append,
}

impl OpenMode {
    pub fn flags(self) -> OpenFlags {
        match self {
            OpenMode::Read => OpenFlags::READ,
            OpenMode::Write => OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNC,
            OpenMode::Append => OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::APPEND,
        }
    }

    pub fn is_writing(self) -> bool {
        !matches!(self, OpenMode::Read)
    }
}
