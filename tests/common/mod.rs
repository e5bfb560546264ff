//! Synthetic `.big` archives for tests.
#![allow(dead_code)]

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

pub const HEADER_SIZE: usize = 32;

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

pub fn png_bytes(len: usize) -> Vec<u8> {
    let mut v = b"\x89PNG\r\n\x1a\n".to_vec();
    v.extend((0..len).map(|i| (i * 7) as u8));
    v
}

pub fn wav_bytes(len: usize) -> Vec<u8> {
    let mut v = b"RIFF".to_vec();
    v.extend_from_slice(&(len as u32 + 4).to_le_bytes());
    v.extend_from_slice(b"WAVE");
    v.extend((0..len).map(|i| (i * 3) as u8));
    v
}

/// Lays out: header | TOC | footer | records, with the TOC in record order
/// unless [`reverse_toc`](Self::reverse_toc) is set.
pub struct ArchiveBuilder {
    magic:         [u8; 4],
    records:       Vec<(u32, Vec<u8>)>,
    reverse_toc:   bool,
    declared_size: Option<u32>,
    tail_entries:  Vec<u32>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            magic: *b"FGIB",
            records: Vec::new(),
            reverse_toc: false,
            declared_size: None,
            tail_entries: Vec::new(),
        }
    }

    pub fn magic(mut self, magic: &[u8; 4]) -> Self {
        self.magic = *magic;
        self
    }

    /// Any record bytes, sub-header included.
    pub fn raw(mut self, hash: u32, bytes: Vec<u8>) -> Self {
        self.records.push((hash, bytes));
        self
    }

    pub fn stored(self, hash: u32, payload: &[u8]) -> Self {
        let mut v = vec![0x01, 0x00, 0x00, 0x00];
        v.extend_from_slice(payload);
        self.raw(hash, v)
    }

    pub fn compressed(self, hash: u32, payload: &[u8]) -> Self {
        let packed = zlib(payload);
        self.raw_compressed(hash, payload.len() as u32, &packed)
    }

    pub fn raw_compressed(self, hash: u32, original_size: u32, packed: &[u8]) -> Self {
        let mut v = vec![0x01, 0x00, 0x80, 0x00];
        v.extend_from_slice(&original_size.to_le_bytes());
        v.extend_from_slice(&(packed.len() as u32).to_le_bytes());
        v.extend_from_slice(packed);
        self.raw(hash, v)
    }

    pub fn reference(self, hash: u32, tag: u32) -> Self {
        let mut v = vec![0x01, 0x00, 0x80, 0x00];
        v.extend_from_slice(&0u32.to_le_bytes());
        v.extend_from_slice(&tag.to_le_bytes());
        self.raw(hash, v)
    }

    pub fn reverse_toc(mut self) -> Self {
        self.reverse_toc = true;
        self
    }

    pub fn declared_size(mut self, size: u32) -> Self {
        self.declared_size = Some(size);
        self
    }

    /// A TOC entry pointing two bytes before the end of the file, so its
    /// sub-header cannot be read.
    pub fn tail_entry(mut self, hash: u32) -> Self {
        self.tail_entries.push(hash);
        self
    }

    pub fn toc_count(&self) -> usize {
        self.records.len() + self.tail_entries.len()
    }

    pub fn build(&self) -> Vec<u8> {
        let count = self.toc_count();
        let toc_offset = HEADER_SIZE;
        let footer_offset = toc_offset + count * 8;
        let data_offset = footer_offset + 8;

        let mut entries = Vec::new();
        let mut data = Vec::new();
        for (hash, bytes) in &self.records {
            entries.push((*hash, (data_offset + data.len()) as u32));
            data.extend_from_slice(bytes);
        }
        let padding_at = (data_offset + data.len()) as u32;
        for hash in &self.tail_entries {
            entries.push((*hash, padding_at));
        }
        if !self.tail_entries.is_empty() {
            data.extend_from_slice(&[0, 0]);
        }
        if self.reverse_toc {
            entries.reverse();
        }

        let total = data_offset + data.len();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&self.magic);
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        for v in [toc_offset, 0, toc_offset, count, data_offset, data.len()] {
            out.extend_from_slice(&(v as u32).to_le_bytes());
        }
        for (hash, offset) in &entries {
            out.extend_from_slice(&hash.to_le_bytes());
            out.extend_from_slice(&offset.to_le_bytes());
        }
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&self.declared_size.unwrap_or(total as u32).to_le_bytes());
        out.extend_from_slice(&data);
        out
    }

    pub fn write_to(&self, path: &std::path::Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}

/// Parse `<stem>_resources.csv` (BOM stripped) into rows of fields.
pub fn read_manifest(path: &std::path::Path) -> Vec<Vec<String>> {
    let bytes = std::fs::read(path).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let text = text.trim_start_matches('\u{feff}');
    text.split("\r\n")
        .filter(|l| !l.is_empty())
        .map(|l| l.split(',').map(str::to_owned).collect())
        .collect()
}

/// Every file under `root`, keyed by relative path.
pub fn snapshot(root: &std::path::Path) -> std::collections::BTreeMap<std::path::PathBuf, Vec<u8>> {
    fn walk(
        root: &std::path::Path,
        dir: &std::path::Path,
        out: &mut std::collections::BTreeMap<std::path::PathBuf, Vec<u8>>,
    ) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_path_buf();
                out.insert(rel, std::fs::read(&path).unwrap());
            }
        }
    }
    let mut out = std::collections::BTreeMap::new();
    walk(root, root, &mut out);
    out
}
