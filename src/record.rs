//! Per-record decoding: sub-header, optional compressed header, payload.
//!
//! ```text
//! +0  sub-header  [4]   byte[2] & 0x80 => compressed
//! +4  original    u32   } only when compressed
//! +8  compressed  u32   }
//! +12 payload     ...   zlib stream of `compressed` bytes
//! ```
//! Uncompressed records have no length field; their payload is the rest of
//! the inferred block (`block_size - 4`).
use byteorder::{ByteOrder, LittleEndian};
use log::{error, warn};
use std::io;
use thiserror::Error;

use crate::codec::Codec;
use crate::io::ReadAt;

pub const SUB_HEADER_SIZE: usize = 4;
pub const EXTRA_HEADER_SIZE: usize = 8;
pub const COMPRESSED_FLAG: u8 = 0x80;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Truncated record at {offset:#x}: expected {expected} bytes, got {actual}")]
    Truncated { offset: u64, expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSubHeader(pub [u8; SUB_HEADER_SIZE]);

impl RecordSubHeader {
    pub fn is_compressed(&self) -> bool {
        self.0[2] & COMPRESSED_FLAG != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressedHeader {
    pub original_size:   u32,
    pub compressed_size: u32,
}

impl CompressedHeader {
    pub fn parse(raw: &[u8; EXTRA_HEADER_SIZE]) -> Self {
        Self {
            original_size:   LittleEndian::read_u32(&raw[0..4]),
            compressed_size: LittleEndian::read_u32(&raw[4..8]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBody {
    /// Uncompressed payload.
    Stored(Vec<u8>),
    /// Successfully inflated payload.
    Inflated(Vec<u8>),
    /// Zero original size: the 8 extra-header bytes stand in for the payload.
    Reference([u8; EXTRA_HEADER_SIZE]),
    /// Inflate failed; the raw compressed bytes are kept.
    Corrupt(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    pub offset:          u64,
    pub compressed:      bool,
    pub original_size:   u64,
    pub compressed_size: u64,
    pub body:            RecordBody,
}

impl DecodedRecord {
    /// Bytes to write to disk.
    pub fn payload(&self) -> &[u8] {
        match &self.body {
            RecordBody::Stored(d) | RecordBody::Inflated(d) | RecordBody::Corrupt(d) => d,
            RecordBody::Reference(raw) => raw,
        }
    }
}

/// Decode the record at `offset`.
///
/// Returns `Ok(None)` when fewer than four bytes are left for the
/// sub-header; such slots are trailing padding and produce no output.
/// A failed inflate is not an error: it yields [`RecordBody::Corrupt`].
pub fn read_record<S: ReadAt + ?Sized>(
    source:     &S,
    codec:      &dyn Codec,
    offset:     u64,
    block_size: u64,
) -> Result<Option<DecodedRecord>, RecordError> {
    let mut sub = [0u8; SUB_HEADER_SIZE];
    if source.read_up_to(offset, &mut sub)? < SUB_HEADER_SIZE {
        return Ok(None);
    }
    let sub = RecordSubHeader(sub);
    let body_offset = offset + SUB_HEADER_SIZE as u64;

    if !sub.is_compressed() {
        let len = block_size.saturating_sub(SUB_HEADER_SIZE as u64);
        let data = source.read_vec(body_offset, usize::try_from(len).unwrap_or(usize::MAX))?;
        return Ok(Some(DecodedRecord {
            offset,
            compressed: false,
            original_size: data.len() as u64,
            compressed_size: 0,
            body: RecordBody::Stored(data),
        }));
    }

    let mut extra = [0u8; EXTRA_HEADER_SIZE];
    let got = source.read_up_to(body_offset, &mut extra)?;
    if got < EXTRA_HEADER_SIZE {
        return Err(RecordError::Truncated { offset, expected: EXTRA_HEADER_SIZE, actual: got });
    }
    let ch = CompressedHeader::parse(&extra);

    let body = if ch.original_size == 0 {
        RecordBody::Reference(extra)
    } else {
        let packed = source.read_vec(
            body_offset + EXTRA_HEADER_SIZE as u64,
            ch.compressed_size as usize,
        )?;
        match codec.decompress(&packed, ch.original_size as usize) {
            Ok(data) => {
                if data.len() as u64 != ch.original_size as u64 {
                    warn!(
                        "  Inflated size {} at {offset:#x} differs from declared {}",
                        data.len(),
                        ch.original_size
                    );
                }
                RecordBody::Inflated(data)
            }
            Err(e) => {
                error!("  [ERROR] {} decompression failed at {offset:#x}: {e}", codec.name());
                RecordBody::Corrupt(packed)
            }
        }
    };

    Ok(Some(DecodedRecord {
        offset,
        compressed: true,
        original_size: ch.original_size as u64,
        compressed_size: ch.compressed_size as u64,
        body,
    }))
}
