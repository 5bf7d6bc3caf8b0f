use std::io::Read;

use packfs_core::{Error, ErrorKind, FileBackend, Result};

/// A fully decompressed archive entry with a seekable cursor.
pub(crate) struct ZipHandle {
    data: Vec<u8>,
    pos: u64,
}

impl ZipHandle {
    pub(crate) fn new(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }
}

impl FileBackend for ZipHandle {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let start = (self.pos as usize).min(self.data.len());
        let n = (&self.data[start..]).read(buf).unwrap_or(0);
        self.pos += n as u64;
        Ok(n)
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        if pos > self.data.len() as u64 {
            return Err(Error::new(ErrorKind::PastEof, "zip.file.seek"));
        }
        self.pos = pos;
        Ok(())
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.pos)
    }

    fn length(&mut self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }
}
