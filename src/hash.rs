//! Legacy resource-name hash.
//!
//! Used only to cross-reference human-readable names against the group hashes
//! found in TOC entries; parsing never depends on it.

/// `h = len; for each byte c: h = c ^ rotl(h, 4)`.
///
/// Bytes are sign-extended (so `0x80` contributes `0xFFFF_FF80`), and when
/// `case_insensitive` is set only ASCII `A-Z` are folded to lower case.
pub fn name_hash(name: &[u8], case_insensitive: bool) -> u32 {
    name.iter().fold(name.len() as u32, |h, &b| {
        let b = if case_insensitive { b.to_ascii_lowercase() } else { b };
        let c = b as i8 as i32 as u32;
        c ^ h.rotate_left(4)
    })
}
