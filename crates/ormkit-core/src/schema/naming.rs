//! Deterministic constraint and index names.
//!
//! Generated names never exceed [`MAX_IDENTIFIER_LEN`] characters: name parts
//! are truncated and a short content hash keeps them distinct.

use sha2::{Digest, Sha256};

/// Longest identifier any generated name may have.
pub const MAX_IDENTIFIER_LEN: usize = 30;

/// Hex prefix of the SHA-256 digest of `parts` joined by `;`.
pub fn make_hash(parts: &[&str], length: usize) -> String {
    let digest = Sha256::digest(parts.join(";").as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(length);
    hex
}

fn prefix(text: &str, chars: usize) -> String {
    text.chars().take(chars).collect()
}

/// Index name: `{prefix}_{table[:11]}_{first_field[:7]}_{hash6}`.
pub fn index_name(prefix_tag: &str, table: &str, fields: &[&str]) -> String {
    let mut parts = Vec::with_capacity(fields.len() + 1);
    parts.push(table);
    parts.extend_from_slice(fields);
    format!(
        "{}_{}_{}_{}",
        prefix_tag,
        prefix(table, 11),
        prefix(fields.first().copied().unwrap_or_default(), 7),
        make_hash(&parts, 6)
    )
}

/// Foreign-key constraint name: `fk_{from[:8]}_{to[:8]}_{hash8}`.
pub fn fk_name(from_table: &str, from_field: &str, to_table: &str, to_field: &str) -> String {
    format!(
        "fk_{}_{}_{}",
        prefix(from_table, 8),
        prefix(to_table, 8),
        make_hash(&[from_table, from_field, to_table, to_field], 8)
    )
}
