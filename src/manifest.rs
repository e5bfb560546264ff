//! Per-archive resource manifest (`<stem>_resources.csv`).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::classify::TypeLabel;

pub const MANIFEST_HEADERS: [&str; 8] = [
    "id", "section", "sub_group", "type", "Offset",
    "compressed?", "compressed size", "original size",
];

/// UTF-8 byte order mark; spreadsheet tools use it to detect the encoding.
const BOM: &[u8] = b"\xEF\xBB\xBF";

/// One manifest line.  Every record that got past its sub-header read has
/// exactly one row, failed records included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRow {
    pub id:              usize,
    pub group_hash:      u32,
    pub type_label:      TypeLabel,
    pub offset:          u64,
    /// `None` when the record could not be read far enough to know.
    pub compressed:      Option<bool>,
    pub compressed_size: u64,
    pub original_size:   u64,
}

impl ManifestRow {
    pub fn error(id: usize, group_hash: u32, offset: u64) -> Self {
        Self {
            id,
            group_hash,
            type_label:      TypeLabel::Error,
            offset,
            compressed:      None,
            compressed_size: 0,
            original_size:   0,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_label.label()
    }

    pub fn is_error(&self) -> bool {
        self.type_label == TypeLabel::Error
    }

    fn fields(&self) -> [String; 8] {
        let flag = match self.compressed {
            Some(true)  => "T",
            Some(false) => "F",
            None        => "N/A",
        };
        [
            self.id.to_string(),
            String::new(),
            format!("{:#x}", self.group_hash),
            self.type_name().to_string(),
            format!("{:#x}", self.offset),
            flag.to_string(),
            self.compressed_size.to_string(),
            self.original_size.to_string(),
        ]
    }
}

/// Write the CSV body (no BOM) to any sink.
pub fn write_csv<W: Write>(rows: &[ManifestRow], mut out: W) -> io::Result<()> {
    write_line(&mut out, MANIFEST_HEADERS.iter().copied())?;
    for row in rows {
        let fields = row.fields();
        write_line(&mut out, fields.iter().map(String::as_str))?;
    }
    out.flush()
}

fn write_line<'a, W: Write>(out: &mut W, fields: impl Iterator<Item = &'a str>) -> io::Result<()> {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.write_all(b",")?;
        }
        if field.contains([',', '"', '\n', '\r']) {
            write!(out, "\"{}\"", field.replace('"', "\"\""))?;
        } else {
            out.write_all(field.as_bytes())?;
        }
    }
    out.write_all(b"\r\n")
}

/// Write `rows` to `path`, replacing any previous manifest.
///
/// Returns the path on success.  An empty row set writes nothing; a write
/// failure is logged and swallowed so the extraction still counts as done.
pub fn export(rows: &[ManifestRow], path: &Path) -> Option<PathBuf> {
    if rows.is_empty() {
        info!("No resource data to export to CSV.");
        return None;
    }
    info!("Exporting resource manifest to {}...", path.display());

    let result = File::create(path).and_then(|f| {
        let mut w = BufWriter::new(f);
        w.write_all(BOM)?;
        write_csv(rows, &mut w)
    });
    match result {
        Ok(()) => {
            info!("Successfully exported {} rows to {}", rows.len(), path.display());
            Some(path.to_owned())
        }
        Err(e) => {
            error!("Failed to write CSV manifest: {e}");
            None
        }
    }
}
