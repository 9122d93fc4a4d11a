//! Text layer abstraction.
//!
//! The outline stage only needs pages of positioned lines. This trait isolates it
//! from the concrete PDF library (lopdf), so tests and other front ends can feed
//! lines from anywhere.

use std::path::Path;

use crate::error::Result;
use crate::model::PageText;

/// Source of positioned text lines for a document.
pub trait TextLayer: Send + Sync {
    /// Open a document and return its pages in ascending page order.
    fn open(&self, path: &Path) -> Result<Vec<PageText>>;
}

/// Simple text decoding fallback when no font encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let utf16: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
