use std::io::{Read, Seek, SeekFrom, Write};

use packfs_core::{FileBackend, Result};

use crate::io_result;

pub(crate) struct HostHandle {
    file: std::fs::File,
}

impl HostHandle {
    pub(crate) fn new(file: std::fs::File) -> Self {
        Self { file }
    }
}

impl FileBackend for HostHandle {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        io_result("host.file.read", self.file.read(buf))
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        io_result("host.file.write", self.file.write(buf))
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        io_result("host.file.seek", self.file.seek(SeekFrom::Start(pos))).map(|_| ())
    }

    fn tell(&mut self) -> Result<u64> {
        io_result("host.file.tell", self.file.stream_position())
    }

    fn length(&mut self) -> Result<u64> {
        io_result("host.file.length", self.file.metadata()).map(|meta| meta.len())
    }

    fn flush(&mut self) -> Result<()> {
        io_result("host.file.flush", self.file.flush())
    }
}
