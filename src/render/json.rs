//! JSON rendering for reports.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a report to JSON.
pub fn to_json<T: Serialize>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Serialize a report and write it to `path`, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T, format: JsonFormat) -> Result<()> {
    let json = to_json(value, format)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, json)?;
    Ok(())
}
