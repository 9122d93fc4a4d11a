//! Report records and JSON output.

mod json;
mod report;

pub use json::{to_json, write_json, JsonFormat};
pub use report::{
    round_seconds, ExtractedSection, FailedDocument, OutlineEntry, OutlineReport, Report,
    ReportMetadata, SubSectionAnalysis,
};
