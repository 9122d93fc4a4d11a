//! PDF header sniffing.
//!
//! Files are checked for a `%PDF-x.y` header before the object parser sees them,
//! so a batch can tell "not a PDF" apart from "a broken PDF".

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const PDF_MAGIC: &[u8] = b"%PDF-";
const HEADER_LEN: usize = PDF_MAGIC.len() + 3; // "%PDF-1.7"

/// Read the header of a file and return its PDF version (e.g. `"1.7"`).
pub fn pdf_version_from_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    File::open(path)?
        .take(HEADER_LEN as u64)
        .read_to_end(&mut header)?;
    pdf_version_from_bytes(&header)
}

/// Return the PDF version declared by the first bytes of a document.
pub fn pdf_version_from_bytes(data: &[u8]) -> Result<String> {
    if data.len() < HEADER_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version = String::from_utf8_lossy(&data[PDF_MAGIC.len()..HEADER_LEN]).to_string();
    match version.as_bytes() {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => Ok(version),
        _ => Err(Error::UnsupportedVersion(version)),
    }
}

/// Whether the path has a `.pdf` extension (case-insensitive).
pub fn has_pdf_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
