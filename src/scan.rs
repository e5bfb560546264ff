//! Batch driver: find every archive in a directory and extract them in
//! natural order (`pack2` before `pack10`).  A failing archive is logged and
//! counted; the batch carries on.

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use thiserror::Error;

use crate::archive::{ArchiveError, BigArchive};
use crate::config::ExtractConfig;
use crate::extract::{ExtractReport, ResourceExtractor};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot read input directory {path}: {source}")]
    InputDir { path: PathBuf, source: io::Error },
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub found:     usize,
    pub processed: usize,
    pub failed:    Vec<(PathBuf, String)>,
    pub rows:      usize,
}

// ── Natural ordering ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Chunk {
    Text(String),
    Number(u128),
}

impl Ord for Chunk {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Chunk::Number(a), Chunk::Number(b)) => a.cmp(b),
            (Chunk::Text(a), Chunk::Text(b)) => a.cmp(b),
            (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Chunk {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Split a name into lower-cased text runs and numeric digit runs.
fn natural_key(name: &str) -> Vec<Chunk> {
    let mut key = Vec::new();
    let mut chars = name.chars().peekable();
    while let Some(&c) = chars.peek() {
        let digits = c.is_ascii_digit();
        let mut run = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() != digits {
                break;
            }
            run.push(c);
            chars.next();
        }
        key.push(match run.parse::<u128>() {
            Ok(n) if digits => Chunk::Number(n),
            _ => Chunk::Text(run.to_lowercase()),
        });
    }
    key
}

pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b)).then_with(|| a.cmp(b))
}

// ── Discovery ────────────────────────────────────────────────────────────────

/// Archives directly inside `dir` whose extension matches `extension`
/// (case-insensitive), naturally ordered by file name.
pub fn find_archives(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, ScanError> {
    let to_err = |source: io::Error| ScanError::InputDir { path: dir.to_owned(), source };
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(to_err)? {
        let path = entry.map_err(to_err)?.path();
        let matches = path
            .extension()
            .map(|e| e.to_string_lossy().eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if matches && path.is_file() {
            found.push(path);
        }
    }
    found.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
    Ok(found)
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

// ── Batch ────────────────────────────────────────────────────────────────────

pub fn extract_archive(path: &Path, config: &ExtractConfig) -> Result<ExtractReport, ArchiveError> {
    let archive = BigArchive::open(path)?;
    let target = config.output_dir.join(archive.stem());
    if config.clean && target.exists() {
        match fs::remove_dir_all(&target) {
            Ok(()) => warn!("Directory cleared and rebuilt: '{}'", target.display()),
            Err(e) => error!("Could not clear '{}': {e}", target.display()),
        }
    }
    ResourceExtractor::new(archive, &config.output_dir)
        .with_manifest(config.write_manifest)
        .extract_all()
}

pub fn run_batch(config: &ExtractConfig) -> Result<BatchReport, ScanError> {
    info!("Scanning the directory: {}", config.input_dir.display());
    let archives = find_archives(&config.input_dir, &config.extension)?;

    let mut report = BatchReport { found: archives.len(), ..Default::default() };
    if archives.is_empty() {
        warn!("No .{} files found in '{}'.", config.extension, config.input_dir.display());
        return Ok(report);
    }
    info!(
        "Found {} .{} files. Starting processing in natural order...",
        archives.len(),
        config.extension
    );

    for path in archives {
        info!("Processing: {}", file_name(&path));
        match extract_archive(&path, config) {
            Ok(r) => {
                report.processed += 1;
                report.rows += r.rows.len();
            }
            Err(e) => {
                error!("Critical error processing file '{}': {e}", file_name(&path));
                report.failed.push((path, e.to_string()));
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_order() {
        let mut names = vec!["pack10.big", "pack2.big", "Pack1.big", "pack2a.big", "intro.big"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["intro.big", "Pack1.big", "pack2.big", "pack2a.big", "pack10.big"]);
    }

    #[test]
    fn leading_zeros_compare_numerically() {
        assert_eq!(natural_cmp("a007", "a7"), Ordering::Less);
        assert_eq!(natural_cmp("a008", "a7"), Ordering::Greater);
    }

    #[test]
    fn finds_only_matching_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b10.big", "b9.BIG", "notes.txt", "b1.big"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("sub.big")).unwrap();

        let found = find_archives(dir.path(), "big").unwrap();
        let names: Vec<String> = found.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["b1.big", "b9.BIG", "b10.big"]);
    }

    #[test]
    fn missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_archives(&dir.path().join("nope"), "big").unwrap_err();
        assert!(matches!(err, ScanError::InputDir { .. }));
    }
}
