//! Run configuration, built once by the CLI and passed down explicitly.

use std::path::PathBuf;

pub const DEFAULT_INPUT_DIR:  &str = "DATAS";
pub const DEFAULT_OUTPUT_DIR: &str = "OUTPUT";
pub const DEFAULT_EXTENSION:  &str = "big";
pub const LOG_FILE_NAME:      &str = "extractor.log";

#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Directory scanned (non-recursively) for archives.
    pub input_dir:      PathBuf,
    /// Each archive is extracted to `output_dir/<stem>/`.
    pub output_dir:     PathBuf,
    /// Archive file extension, without the dot; matched case-insensitively.
    pub extension:      String,
    /// Remove `output_dir/<stem>/` before extracting that archive.
    pub clean:          bool,
    pub write_manifest: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            input_dir:      PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir:     PathBuf::from(DEFAULT_OUTPUT_DIR),
            extension:      DEFAULT_EXTENSION.to_owned(),
            clean:          false,
            write_manifest: true,
        }
    }
}

impl ExtractConfig {
    pub fn log_file(&self) -> PathBuf {
        self.output_dir.join(LOG_FILE_NAME)
    }
}
