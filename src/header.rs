//! Fixed on-disk structures: 32-byte header, TOC entries, 8-byte TOC footer.
//!
//! All fields are little-endian.
//!
//! ```text
//! 0x00  magic      [4]  "FGIB"
//! 0x04  version    u16
//! 0x06  flags      u16
//! 0x08  t1_offset  u32
//! 0x0C  t1_count   u32
//! 0x10  toc_offset u32
//! 0x14  toc_count  u32
//! 0x18  data_off   u32
//! 0x1C  data_size  u32
//! ```
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

pub const MAGIC: &[u8; 4] = b"FGIB";
pub const HEADER_SIZE: usize = 32;
pub const TOC_ENTRY_SIZE: usize = 8;
pub const FOOTER_SIZE: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub magic: [u8; 4],
    pub version: u16,
    pub flags: u16,
    pub table1_offset: u32,
    pub table1_count: u32,
    pub toc_offset: u32,
    pub toc_count: u32,
    pub data_offset: u32,
    pub data_size: u32,
}

impl ArchiveHeader {
    pub fn read<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        Ok(Self {
            magic,
            version: reader.read_u16::<LittleEndian>()?,
            flags: reader.read_u16::<LittleEndian>()?,
            table1_offset: reader.read_u32::<LittleEndian>()?,
            table1_count: reader.read_u32::<LittleEndian>()?,
            toc_offset: reader.read_u32::<LittleEndian>()?,
            toc_count: reader.read_u32::<LittleEndian>()?,
            data_offset: reader.read_u32::<LittleEndian>()?,
            data_size: reader.read_u32::<LittleEndian>()?,
        })
    }

    pub fn has_valid_magic(&self) -> bool {
        &self.magic == MAGIC
    }

    /// The footer sits directly after the last TOC slot.
    pub fn footer_offset(&self) -> u64 {
        self.toc_offset as u64 + self.toc_count as u64 * TOC_ENTRY_SIZE as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveFooter {
    /// First word; not interpreted.
    pub reserved: u32,
    pub total_file_size: u32,
}

impl ArchiveFooter {
    pub fn read<R: Read>(mut reader: R) -> io::Result<Self> {
        Ok(Self {
            reserved: reader.read_u32::<LittleEndian>()?,
            total_file_size: reader.read_u32::<LittleEndian>()?,
        })
    }
}

/// One slot of the main index (Table2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TocEntry {
    /// Identifies the resource group the record belongs to.
    pub name_hash: u32,
    /// Absolute offset of the record sub-header.
    pub offset: u32,
}

impl TocEntry {
    pub fn read<R: Read>(mut reader: R) -> io::Result<Self> {
        Ok(Self {
            name_hash: reader.read_u32::<LittleEndian>()?,
            offset: reader.read_u32::<LittleEndian>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_fields_are_little_endian() {
        let mut raw = Vec::new();
        raw.extend_from_slice(b"FGIB");
        raw.extend_from_slice(&1u16.to_le_bytes());
        raw.extend_from_slice(&0x0102u16.to_le_bytes());
        for v in [32u32, 0, 32, 2, 56, 0x1234] {
            raw.extend_from_slice(&v.to_le_bytes());
        }
        assert_eq!(raw.len(), HEADER_SIZE);

        let h = ArchiveHeader::read(&raw[..]).unwrap();
        assert!(h.has_valid_magic());
        assert_eq!(h.version, 1);
        assert_eq!(h.flags, 0x0102);
        assert_eq!(h.toc_offset, 32);
        assert_eq!(h.toc_count, 2);
        assert_eq!(h.data_offset, 56);
        assert_eq!(h.data_size, 0x1234);
        assert_eq!(h.footer_offset(), 48);
    }

    #[test]
    fn footer_offset_does_not_overflow() {
        let h = ArchiveHeader {
            magic: *MAGIC,
            version: 0,
            flags: 0,
            table1_offset: 0,
            table1_count: 0,
            toc_offset: u32::MAX,
            toc_count: u32::MAX,
            data_offset: 0,
            data_size: 0,
        };
        assert_eq!(h.footer_offset(), u32::MAX as u64 * 9);
    }

    #[test]
    fn toc_entry_layout() {
        let raw = [0xDC, 0xAA, 0x86, 0xF6, 0x40, 0x00, 0x00, 0x00];
        let e = TocEntry::read(&raw[..]).unwrap();
        assert_eq!(e.name_hash, 0xF686AADC);
        assert_eq!(e.offset, 0x40);
    }

    #[test]
    fn short_header_is_an_error() {
        assert!(ArchiveHeader::read(&b"FGIB\x01\x00"[..]).is_err());
    }
}
