//! Payload fingerprints for log lines
//!
//! Inbound payloads carry patient data, so they are never logged whole: log
//! lines get a SHA-256 digest (to correlate with quarantined files) and a
//! short printable preview.

use sha2::{Digest, Sha256};

/// Maximum number of characters in a [`preview`]
pub const PREVIEW_CHARS: usize = 48;

/// Hex SHA-256 of the payload
pub fn digest(raw: &[u8]) -> String {
    hex::encode(Sha256::digest(raw))
}

/// First [`PREVIEW_CHARS`] characters, control bytes rendered as `.`
pub fn preview(raw: &[u8]) -> String {
    let mut out: String = raw
        .iter()
        .take(PREVIEW_CHARS)
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        })
        .collect();
    if raw.len() > PREVIEW_CHARS {
        out.push('…');
    }
    out
}
