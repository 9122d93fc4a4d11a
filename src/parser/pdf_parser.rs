//! PDF text layer backed by lopdf.

use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId, Stream};

use crate::detect::{pdf_version_from_bytes, pdf_version_from_path};
use crate::error::{Error, Result};
use crate::model::PageText;

use super::backend::TextLayer;
use super::layout::{extract_spans, group_spans_into_lines};
use super::options::{ErrorMode, ParseOptions};

/// Reads positioned lines out of PDF files with lopdf.
#[derive(Debug, Clone, Default)]
pub struct LopdfTextLayer {
    options: ParseOptions,
}

impl LopdfTextLayer {
    /// Create a text layer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a text layer with custom options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Read every page of an in-memory document.
    pub fn pages_from_bytes(&self, data: &[u8]) -> Result<Vec<PageText>> {
        let version = pdf_version_from_bytes(data)?;
        log::debug!("in-memory document: PDF {}", version);

        let doc = LopdfDocument::load_mem(data)?;
        self.read_pages(&doc)
    }

    fn read_pages(&self, doc: &LopdfDocument) -> Result<Vec<PageText>> {
        if doc.is_encrypted() {
            log::debug!("document is encrypted; reading with the default password");
        }

        let page_ids = doc.get_pages();
        let mut pages = Vec::with_capacity(page_ids.len());
        for (&number, &page_id) in &page_ids {
            match read_page(doc, number, page_id) {
                Ok(page) => {
                    log::debug!("page {}: {} lines", number, page.lines.len());
                    pages.push(page);
                }
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Failed to extract text from page {}: {}", number, e);
                    pages.push(PageText::new(number));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(pages)
    }
}

impl TextLayer for LopdfTextLayer {
    fn open(&self, path: &Path) -> Result<Vec<PageText>> {
        let version = pdf_version_from_path(path)?;
        log::debug!("{}: PDF {}", path.display(), version);

        let doc = LopdfDocument::load(path)?;
        self.read_pages(&doc)
    }
}

fn read_page(doc: &LopdfDocument, number: u32, page_id: ObjectId) -> Result<PageText> {
    let fonts = doc
        .get_page_fonts(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;
    let content = page_content(doc, page_id)?;
    let spans = extract_spans(doc, &content, &fonts)?;

    Ok(PageText {
        number,
        lines: group_spans_into_lines(spans, number),
    })
}

/// Concatenated, decompressed content streams of a page.
fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc.get_dictionary(page_id)?;

    // A page without /Contents is blank.
    let contents = match page_dict.get(b"Contents") {
        Ok(contents) => contents,
        Err(_) => return Ok(Vec::new()),
    };

    let stream_data = |id: ObjectId| -> Result<Vec<u8>> {
        match doc.get_object(id)? {
            Object::Stream(s) => Ok(stream_bytes(s)),
            _ => Err(Error::Corrupted(format!(
                "content {} {} R is not a stream",
                id.0, id.1
            ))),
        }
    };

    match contents {
        Object::Reference(id) => stream_data(*id),
        Object::Array(parts) => {
            let mut content = Vec::new();
            for part in parts {
                if let Object::Reference(id) = part {
                    content.extend_from_slice(&stream_data(*id)?);
                    content.push(b' ');
                }
            }
            Ok(content)
        }
        Object::Stream(s) => Ok(stream_bytes(s)),
        _ => Err(Error::Corrupted("invalid /Contents entry".to_string())),
    }
}

/// Stream data, decompressed when a filter is present.
fn stream_bytes(stream: &Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}
