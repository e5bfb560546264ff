//! [`ResourceExtractor`] — unpacks every TOC record of one archive.
//!
//! Failure handling is two-level.  Anything that prevents reading the
//! header, footer or TOC aborts the archive with an [`ArchiveError`].  Once
//! the TOC is known, each record is isolated: a [`RecordError`] is logged and
//! turned into an `ERROR` manifest row, and the loop moves on.
//!
//! Output layout:
//! ```text
//! <output>/<stem>/<0xhash>/<stem>_<index:04>_<0xoffset><ext>
//! <output>/<stem>/<stem>_resources.csv
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info};

use crate::archive::{ArchiveError, BigArchive};
use crate::classify::{classify, FileType, TypeLabel};
use crate::codec::{Codec, ZlibCodec};
use crate::header::TocEntry;
use crate::io::{LocalFile, ReadAt};
use crate::manifest::{self, ManifestRow};
use crate::record::{read_record, RecordBody, RecordError};

/// Extension given to records whose payload failed to inflate.
pub const CORRUPT_EXTENSION: &str = ".corrupt";

// ── Statistics ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeStat {
    pub count: usize,
    pub bytes: u64,
}

/// Files written and bytes written, per output extension.
#[derive(Debug, Clone, Default)]
pub struct ExtractStats {
    by_extension: BTreeMap<&'static str, TypeStat>,
}

impl ExtractStats {
    pub fn record(&mut self, extension: &'static str, bytes: u64) {
        let stat = self.by_extension.entry(extension).or_default();
        stat.count += 1;
        stat.bytes += bytes;
    }

    pub fn get(&self, extension: &str) -> Option<TypeStat> {
        self.by_extension.get(extension).copied()
    }

    pub fn total_count(&self) -> usize {
        self.by_extension.values().map(|s| s.count).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.by_extension.values().map(|s| s.bytes).sum()
    }

    /// Most frequent extension first; ties by extension name.
    pub fn by_count(&self) -> Vec<(&'static str, TypeStat)> {
        let mut v: Vec<_> = self.by_extension.iter().map(|(k, s)| (*k, *s)).collect();
        v.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(b.0)));
        v
    }
}

// ── Report ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ExtractReport {
    /// One row per record, in sorted TOC order.
    pub rows:     Vec<ManifestRow>,
    pub stats:    ExtractStats,
    /// Records dropped because their sub-header lay past the end of data.
    pub skipped:  usize,
    /// Manifest path, if one was written.
    pub manifest: Option<PathBuf>,
}

impl ExtractReport {
    pub fn failed(&self) -> usize {
        self.rows.iter().filter(|r| r.is_error()).count()
    }
}

/// A record written to disk.
#[derive(Debug)]
pub struct Extracted {
    pub row:       ManifestRow,
    pub path:      PathBuf,
    pub extension: &'static str,
    pub written:   u64,
}

enum Outcome {
    Skipped,
    Done(Extracted),
    Failed(ManifestRow),
}

// ── ResourceExtractor ────────────────────────────────────────────────────────

pub struct ResourceExtractor<S: ReadAt = LocalFile> {
    archive:        BigArchive<S>,
    output_dir:     PathBuf,
    codec:          Box<dyn Codec>,
    write_manifest: bool,
}

impl<S: ReadAt> ResourceExtractor<S> {
    /// Records will land in `output_base/<archive stem>/`.
    pub fn new(archive: BigArchive<S>, output_base: impl AsRef<Path>) -> Self {
        let output_dir = output_base.as_ref().join(archive.stem());
        Self {
            archive,
            output_dir,
            codec: Box::new(ZlibCodec),
            write_manifest: true,
        }
    }

    pub fn with_codec(mut self, codec: Box<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_manifest(mut self, enabled: bool) -> Self {
        self.write_manifest = enabled;
        self
    }

    pub fn archive(&self) -> &BigArchive<S> { &self.archive }
    pub fn output_dir(&self) -> &Path { &self.output_dir }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}_resources.csv", self.archive.stem()))
    }

    /// Parse the archive (if needed) and extract every record.
    pub fn extract_all(&mut self) -> Result<ExtractReport, ArchiveError> {
        if let Err(e) = self.archive.parse() {
            error!("Cannot extract '{}': archive parse failed: {e}", self.archive.name());
            return Err(e);
        }

        info!("{}", "=".repeat(40));
        info!("Start extracting files: {}", self.archive.name());
        info!("{}", "=".repeat(40));

        fs::create_dir_all(&self.output_dir)?;

        let mut report = ExtractReport::default();
        for outcome in self.run_entries() {
            match outcome {
                Outcome::Skipped => report.skipped += 1,
                Outcome::Failed(row) => report.rows.push(row),
                Outcome::Done(done) => {
                    report.stats.record(done.extension, done.written);
                    report.rows.push(done.row);
                }
            }
        }

        self.log_summary(&report.stats);
        if self.write_manifest {
            report.manifest = manifest::export(&report.rows, &self.manifest_path());
        }
        Ok(report)
    }

    /// Outcomes in TOC order.  The parallel build relies on rayon's indexed
    /// `collect`, which keeps input order.
    fn run_entries(&self) -> Vec<Outcome> {
        let count = self.archive.toc().len();

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..count).into_par_iter().map(|i| self.process_entry(i)).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            (0..count).map(|i| self.process_entry(i)).collect()
        }
    }

    fn process_entry(&self, index: usize) -> Outcome {
        let entry = self.archive.toc()[index];
        match self.extract_one(index, &entry) {
            Ok(Some(done)) => Outcome::Done(done),
            Ok(None) => {
                debug!("Skipping entry {index} at {:#x}: no room for a sub-header", entry.offset);
                Outcome::Skipped
            }
            Err(e) => {
                error!("Failed to process entry at {:#x}: {e}", entry.offset);
                Outcome::Failed(ManifestRow::error(index, entry.name_hash, entry.offset as u64))
            }
        }
    }

    /// Decode, classify and write one record.
    ///
    /// `Ok(None)` means the record was silently skipped (short sub-header, or
    /// `index` outside the parsed TOC).
    pub fn extract_one(&self, index: usize, entry: &TocEntry) -> Result<Option<Extracted>, RecordError> {
        let Some((offset, block_size)) = self.archive.entry_block_info(index) else {
            return Ok(None);
        };
        let record = match read_record(self.archive.source(), self.codec.as_ref(), offset, block_size)? {
            Some(r) => r,
            None => return Ok(None),
        };

        let hash = entry.name_hash;
        let (extension, type_label, note) = match &record.body {
            RecordBody::Reference(_) => (
                FileType::Binary.extension(),
                TypeLabel::Reference.or_known(hash),
                "(Placeholder/Reference)".to_owned(),
            ),
            RecordBody::Corrupt(_) => (
                CORRUPT_EXTENSION,
                TypeLabel::Corrupt.or_known(hash),
                "(Corrupt: kept compressed bytes)".to_owned(),
            ),
            RecordBody::Inflated(data) => {
                let ft = classify(data, hash);
                (
                    ft.extension(),
                    TypeLabel::resolve(hash, ft),
                    format!("(Compressed: {} -> {})", record.compressed_size, record.original_size),
                )
            }
            RecordBody::Stored(data) => {
                let ft = classify(data, hash);
                (
                    ft.extension(),
                    TypeLabel::resolve(hash, ft),
                    format!("(Uncompressed: {} bytes)", data.len()),
                )
            }
        };

        let group = format!("{hash:#x}");
        let group_dir = self.output_dir.join(&group);
        fs::create_dir_all(&group_dir)?;
        let file_name = output_file_name(self.archive.stem(), index, offset, extension);
        let path = group_dir.join(&file_name);
        let payload = record.payload();
        fs::write(&path, payload)?;
        debug!("Extracted: {group}/{file_name} {note}");

        Ok(Some(Extracted {
            row: ManifestRow {
                id: index,
                group_hash: hash,
                type_label,
                offset,
                compressed: Some(record.compressed),
                compressed_size: record.compressed_size,
                original_size: record.original_size,
            },
            path,
            extension,
            written: payload.len() as u64,
        }))
    }

    fn log_summary(&self, stats: &ExtractStats) {
        info!("{}", "-".repeat(40));
        info!("Extract Summary: {}", self.archive.name());
        info!(
            "Total file: {}, Total size: {:.2} MB",
            stats.total_count(),
            stats.total_bytes() as f64 / 1024.0 / 1024.0
        );
        for (ext, stat) in stats.by_count() {
            info!(
                "  {ext:<8} | num: {:<5} | size: {:>8.2} KB",
                stat.count,
                stat.bytes as f64 / 1024.0
            );
        }
        info!("{}", "-".repeat(40));
    }
}

/// `<stem>_<index:04>_<0xoffset><extension>`
pub fn output_file_name(stem: &str, index: usize, offset: u64, extension: &str) -> String {
    format!("{stem}_{index:04}_{offset:#x}{extension}")
}
