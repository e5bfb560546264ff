//! Record decompression.
//!
//! Compressed records carry a zlib stream (2-byte header, deflate body,
//! Adler-32 trailer).  The extractor talks to the [`Codec`] trait so tests and
//! tools can swap the implementation.

use flate2::{Decompress, FlushDecompress, Status};
use thiserror::Error;

/// Upper bound on the up-front reservation taken from a record's declared
/// original size.  The vector still grows past it if the stream is larger.
const MAX_PREALLOC: usize = 64 * 1024 * 1024;

/// Output growth step once the declared size has been exceeded.
const GROW_STEP: usize = 32 * 1024;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Decompression error: {0}")]
    Decompression(String),
    #[error("Truncated stream: input ended after {consumed} of {available} bytes without a stream end")]
    Truncated { consumed: u64, available: usize },
}

pub trait Codec: Send + Sync {
    fn name(&self) -> &'static str;
    /// Inflate `data`.  `size_hint` is the size the record header declares;
    /// it only sizes the output buffer.
    ///
    /// Succeeds only for a complete stream; bytes after the stream end are
    /// ignored.
    fn decompress(&self, data: &[u8], size_hint: usize) -> Result<Vec<u8>, CodecError>;
}

pub struct ZlibCodec;

impl Codec for ZlibCodec {
    fn name(&self) -> &'static str { "zlib" }

    fn decompress(&self, data: &[u8], size_hint: usize) -> Result<Vec<u8>, CodecError> {
        let mut z = Decompress::new(true);
        let mut out = Vec::with_capacity(size_hint.clamp(1, MAX_PREALLOC));
        loop {
            if out.len() == out.capacity() {
                out.reserve(GROW_STEP);
            }
            let (in_before, out_before) = (z.total_in(), z.total_out());
            let input = data.get(in_before as usize..).unwrap_or_default();
            let status = z
                .decompress_vec(input, &mut out, FlushDecompress::None)
                .map_err(|e| CodecError::Decompression(e.to_string()))?;
            if status == Status::StreamEnd {
                return Ok(out);
            }
            // Output had room, so no progress means the input ran out.
            if z.total_in() == in_before && z.total_out() == out_before {
                return Err(CodecError::Truncated { consumed: z.total_in(), available: data.len() });
            }
        }
    }
}
