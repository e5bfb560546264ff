//! [`BigArchive`] — one `.big` container: header, footer and main TOC.
//!
//! ```no_run
//! use bigextract::archive::BigArchive;
//!
//! let mut ar = BigArchive::open("pack1.big")?;
//! ar.parse()?;
//! for i in 0..ar.toc().len() {
//!     let (offset, size) = ar.entry_block_info(i).unwrap();
//!     println!("{i:04} {offset:#x} {size}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Record lengths are not stored anywhere in the format.  They are inferred
//! from the distance between neighbouring records once the TOC is sorted by
//! offset; the last record runs to the footer's declared file size.

use std::io;
use std::path::Path;

use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::header::{ArchiveFooter, ArchiveHeader, TocEntry, FOOTER_SIZE, HEADER_SIZE, TOC_ENTRY_SIZE};
use crate::io::{LocalFile, ReadAt};

/// Failures that make a whole archive unusable.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("File is too small to contain a valid BIG header ({size} bytes)")]
    HeaderTooSmall { size: u64 },
    #[error("File is too small to contain TOC footer (needs {needed} bytes, has {size})")]
    FooterTooSmall { needed: u64, size: u64 },
    #[error("Archive has not been parsed")]
    NotParsed,
}

// ── BigArchive ───────────────────────────────────────────────────────────────

pub struct BigArchive<S: ReadAt = LocalFile> {
    name:   String,
    stem:   String,
    source: S,
    header: Option<ArchiveHeader>,
    footer: Option<ArchiveFooter>,
    toc:    Vec<TocEntry>,
    parsed: bool,
}

impl BigArchive<LocalFile> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        let source = LocalFile::open(path).map_err(|e| {
            log::error!("Failed to open archive {}: {e}", path.display());
            ArchiveError::Io(e)
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_source(name, source))
    }
}

impl<S: ReadAt> BigArchive<S> {
    /// Wrap an already-open source.  `name` is the archive's file name; its
    /// stem prefixes every extracted file.
    pub fn from_source(name: impl Into<String>, source: S) -> Self {
        let name = name.into();
        let stem = Path::new(&name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone());
        Self {
            name,
            stem,
            source,
            header: None,
            footer: None,
            toc: Vec::new(),
            parsed: false,
        }
    }

    // ── Parsing ──────────────────────────────────────────────────────────────

    /// Read header, footer and TOC.  Repeat calls after a success are no-ops.
    pub fn parse(&mut self) -> Result<(), ArchiveError> {
        if self.parsed {
            return Ok(());
        }
        info!("Parsing archive structure: {}...", self.name);

        let header = self.load_header()?;
        let footer = self.load_footer(&header)?;
        let toc = self.load_toc(&header)?;

        debug!("  [Header Info] Version: {}, Flags: {:#x}", header.version, header.flags);
        debug!("  [Table1] Offset: {:#x}, Entries: {}", header.table1_offset, header.table1_count);
        debug!("  [TOC] Offset: {:#x}, Entries: {}", header.toc_offset, header.toc_count);
        debug!(
            "  [Data Section] Start Offset: {:#x}, Declared Size: {} bytes",
            header.data_offset, header.data_size
        );

        self.header = Some(header);
        self.footer = Some(footer);
        self.toc = toc;
        self.parsed = true;
        Ok(())
    }

    fn load_header(&self) -> Result<ArchiveHeader, ArchiveError> {
        let size = self.source.size();
        if size < HEADER_SIZE as u64 {
            return Err(ArchiveError::HeaderTooSmall { size });
        }
        let mut buf = [0u8; HEADER_SIZE];
        let n = self.source.read_up_to(0, &mut buf)?;
        if n < HEADER_SIZE {
            return Err(ArchiveError::HeaderTooSmall { size: n as u64 });
        }
        let header = ArchiveHeader::read(&buf[..])?;
        if !header.has_valid_magic() {
            warn!(
                "Invalid magic number: {} ({:?}). Expected \"FGIB\". Continuing anyway...",
                hex::encode(header.magic),
                String::from_utf8_lossy(&header.magic)
            );
        }
        Ok(header)
    }

    fn load_footer(&self, header: &ArchiveHeader) -> Result<ArchiveFooter, ArchiveError> {
        let footer_offset = header.footer_offset();
        let footer_end = footer_offset + FOOTER_SIZE as u64;

        if footer_end != header.data_offset as u64 {
            warn!(
                "Notice: Footer end ({footer_end:#x}) does not match Data start ({:#x}). There might be gaps.",
                header.data_offset
            );
        }

        let size = self.source.size();
        if size < footer_end {
            return Err(ArchiveError::FooterTooSmall { needed: footer_end, size });
        }

        let mut buf = [0u8; FOOTER_SIZE];
        let n = self.source.read_up_to(footer_offset, &mut buf)?;
        if n < FOOTER_SIZE {
            return Err(ArchiveError::FooterTooSmall { needed: footer_end, size: footer_offset + n as u64 });
        }
        let footer = ArchiveFooter::read(&buf[..])?;
        if footer.total_file_size as u64 != size {
            warn!(
                "  [Footer] Size mismatch detected! Declared={}, Actual={size}",
                footer.total_file_size
            );
        }
        Ok(footer)
    }

    fn load_toc(&self, header: &ArchiveHeader) -> Result<Vec<TocEntry>, ArchiveError> {
        let declared = header.toc_count as usize;
        let raw = self
            .source
            .read_vec(header.toc_offset as u64, declared.saturating_mul(TOC_ENTRY_SIZE))?;

        let mut toc = raw
            .chunks_exact(TOC_ENTRY_SIZE)
            .map(TocEntry::read)
            .collect::<io::Result<Vec<_>>>()?;
        if toc.len() < declared {
            debug!("  [TOC] Short read: {} of {declared} entries available", toc.len());
        }

        // Stable: equal offsets keep their on-disk order.
        toc.sort_by_key(|e| e.offset);
        Ok(toc)
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// `(offset, block_size)` of the record at sorted position `index`.
    pub fn entry_block_info(&self, index: usize) -> Option<(u64, u64)> {
        let entry = self.toc.get(index)?;
        let offset = entry.offset as u64;
        let end = match self.toc.get(index + 1) {
            Some(next) => next.offset as u64,
            None => self.total_file_size(),
        };
        Some((offset, end.saturating_sub(offset)))
    }

    /// Physical end of the record data: the footer's declared size when it
    /// is non-zero, otherwise the size on disk.
    pub fn total_file_size(&self) -> u64 {
        match self.footer {
            Some(f) if f.total_file_size != 0 => f.total_file_size as u64,
            _ => self.source.size(),
        }
    }

    pub fn is_parsed(&self) -> bool { self.parsed }
    pub fn header(&self) -> Option<&ArchiveHeader> { self.header.as_ref() }
    pub fn footer(&self) -> Option<&ArchiveFooter> { self.footer.as_ref() }
    /// TOC sorted by ascending offset.  Empty until [`parse`](Self::parse).
    pub fn toc(&self) -> &[TocEntry] { &self.toc }
    pub fn name(&self) -> &str { &self.name }
    pub fn stem(&self) -> &str { &self.stem }
    pub fn file_size(&self) -> u64 { self.source.size() }
    pub fn source(&self) -> &S { &self.source }

    pub fn summary(&self) -> Result<ArchiveSummary, ArchiveError> {
        let (header, footer) = match (&self.header, &self.footer) {
            (Some(h), Some(f)) => (h, f),
            _ => return Err(ArchiveError::NotParsed),
        };
        let entries = (0..self.toc.len())
            .filter_map(|i| {
                let (offset, block_size) = self.entry_block_info(i)?;
                Some(EntrySummary {
                    index: i,
                    group_hash: format!("{:#x}", self.toc[i].name_hash),
                    offset: format!("{offset:#x}"),
                    block_size,
                })
            })
            .collect();
        Ok(ArchiveSummary {
            name:                 self.name.clone(),
            magic:                String::from_utf8_lossy(&header.magic).into_owned(),
            magic_valid:          header.has_valid_magic(),
            version:              header.version,
            flags:                header.flags,
            table1_offset:        header.table1_offset,
            table1_count:         header.table1_count,
            toc_offset:           header.toc_offset,
            toc_count:            header.toc_count,
            data_offset:          header.data_offset,
            data_size:            header.data_size,
            declared_file_size:   footer.total_file_size,
            actual_file_size:     self.source.size(),
            entries,
        })
    }
}

// ── ArchiveSummary ───────────────────────────────────────────────────────────

/// Structural overview of a parsed archive, as printed by `bigextract info`.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveSummary {
    pub name:               String,
    pub magic:              String,
    pub magic_valid:        bool,
    pub version:            u16,
    pub flags:              u16,
    pub table1_offset:      u32,
    pub table1_count:       u32,
    pub toc_offset:         u32,
    pub toc_count:          u32,
    pub data_offset:        u32,
    pub data_size:          u32,
    pub declared_file_size: u32,
    pub actual_file_size:   u64,
    pub entries:            Vec<EntrySummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary {
    pub index:      usize,
    pub group_hash: String,
    pub offset:     String,
    pub block_size: u64,
}
