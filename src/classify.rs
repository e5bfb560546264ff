//! Resource type resolution.
//!
//! Two sources of truth, in order of authority:
//! 1. The well-known group-hash table ([`known_type`]).  When a record's group
//!    is listed, its label wins over anything the content says.
//! 2. Content sniffing ([`classify`]), which also picks the file extension.

pub const MANIFEST_GROUP: u32 = 0xF686_AADC;

const PNG_MAGIC: &[u8] = b"\x89PNG";

/// Group hashes whose resource type is fixed.
pub const KNOWN_TYPES: &[(u32, &str)] = &[
    (0x69E4_C505, "string pack"),
    (0x69E5_D35C, "meta data"),
    (0xB717_8678, "png"),
    (0xF4E0_2223, ".bin"),
    (MANIFEST_GROUP, "manifest"),
    (0xFD8A_7754, "wav"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileType {
    Text,
    Png,
    Wav,
    Binary,
}

impl FileType {
    pub fn extension(self) -> &'static str {
        match self {
            FileType::Text   => ".txt",
            FileType::Png    => ".png",
            FileType::Wav    => ".wav",
            FileType::Binary => ".bin",
        }
    }

    /// Extension without the leading dot, as written to the manifest.
    pub fn name(self) -> &'static str {
        &self.extension()[1..]
    }
}

/// Guess the payload type.  Never fails.
pub fn classify(data: &[u8], group_hash: u32) -> FileType {
    if group_hash == MANIFEST_GROUP {
        return FileType::Text;
    }
    if data.is_empty() {
        return FileType::Binary;
    }
    if data.starts_with(PNG_MAGIC) {
        return FileType::Png;
    }
    if data.starts_with(b"RIFF") && data.get(8..12) == Some(b"WAVE".as_slice()) {
        return FileType::Wav;
    }
    FileType::Binary
}

pub fn known_type(group_hash: u32) -> Option<&'static str> {
    KNOWN_TYPES
        .iter()
        .find(|(hash, _)| *hash == group_hash)
        .map(|(_, label)| *label)
}

// ── TypeLabel ────────────────────────────────────────────────────────────────

/// How a record's manifest `type` was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeLabel {
    HashTable(&'static str),
    Sniffed(FileType),
    DefaultBinary,
    /// Compressed record with a zero original size.
    Reference,
    /// Compressed record that failed to inflate.
    Corrupt,
    /// The record could not be read at all.
    Error,
}

impl TypeLabel {
    /// Label for a decoded record: the hash table first, then the sniffed
    /// type.
    pub fn resolve(group_hash: u32, sniffed: FileType) -> Self {
        match known_type(group_hash) {
            Some(label) => TypeLabel::HashTable(label),
            None if sniffed == FileType::Binary => TypeLabel::DefaultBinary,
            None => TypeLabel::Sniffed(sniffed),
        }
    }

    /// Apply the hash-table override to an outcome that did not come from
    /// sniffing (references and corrupt records).
    pub fn or_known(self, group_hash: u32) -> Self {
        match known_type(group_hash) {
            Some(label) if self != TypeLabel::Error => TypeLabel::HashTable(label),
            _ => self,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TypeLabel::HashTable(label) => label,
            TypeLabel::Sniffed(ft)      => ft.name(),
            TypeLabel::DefaultBinary    => FileType::Binary.name(),
            TypeLabel::Reference        => "ref",
            TypeLabel::Corrupt          => "corrupt",
            TypeLabel::Error            => "ERROR",
        }
    }
}
