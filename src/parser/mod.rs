//! PDF text layer: content streams to positioned lines.

mod backend;
mod layout;
mod options;
mod pdf_parser;

pub use backend::{decode_text_simple, TextLayer};
pub use layout::{extract_spans, group_spans_into_lines, TextSpan};
pub use options::{ErrorMode, ParseOptions};
pub use pdf_parser::LopdfTextLayer;
