pub mod header;
pub mod io;
pub mod archive;
pub mod record;
pub mod codec;
pub mod classify;
pub mod manifest;
pub mod extract;
pub mod scan;
pub mod config;
pub mod hash;
pub mod logging;

pub use header::{ArchiveHeader, ArchiveFooter, TocEntry};
pub use archive::{BigArchive, ArchiveError};
pub use record::{read_record, DecodedRecord, RecordBody, RecordError};
pub use classify::{classify, known_type, FileType, TypeLabel};
pub use manifest::ManifestRow;
pub use extract::{ExtractReport, ExtractStats, ResourceExtractor};
pub use scan::{find_archives, run_batch, BatchReport};
pub use config::ExtractConfig;
pub use hash::name_hash;
