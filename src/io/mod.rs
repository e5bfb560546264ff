//! Positional read access to archive bytes.
//!
//! Every structure in a `.big` archive is addressed by an absolute offset, so
//! the engine never keeps a shared cursor: all reads go through [`ReadAt`].
//! That keeps record extraction free of ordering constraints, which the
//! `parallel` feature relies on.

mod local;

pub use local::LocalFile;

use std::io;

/// Random-access byte source.
pub trait ReadAt: Send + Sync {
    /// Read into `buf` starting at `offset`.  May return fewer bytes than
    /// requested; `Ok(0)` means end of data.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Total size of the source in bytes.
    fn size(&self) -> u64;

    /// Fill as much of `buf` as the source can supply, stopping only at the
    /// end of data.  Returns the number of bytes filled.
    fn read_up_to(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0usize;
        while filled < buf.len() {
            match self.read_at(offset + filled as u64, &mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    /// Read up to `len` bytes at `offset` into a fresh buffer.
    ///
    /// The allocation is clamped to what the source actually holds past
    /// `offset`, so a corrupt length field cannot trigger a huge allocation.
    fn read_vec(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let available = self.size().saturating_sub(offset);
        let len = (len as u64).min(available) as usize;
        let mut buf = vec![0u8; len];
        let n = self.read_up_to(offset, &mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }
}

/// In-memory archives (tests, benchmarks, pre-loaded files).
impl ReadAt for Vec<u8> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let start = match usize::try_from(offset) {
            Ok(s) if s < self.len() => s,
            _ => return Ok(0),
        };
        let n = buf.len().min(self.len() - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.len() as u64
    }
}
