//! Loading the analysis request (`persona.json`).

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::AnalysisRequest;

/// File name of the request inside an input directory.
pub const PERSONA_FILE: &str = "persona.json";

impl AnalysisRequest {
    /// Parse a request. Missing fields become empty; malformed JSON is an error.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("invalid persona JSON: {}", e)))
    }

    /// Read a request file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), strip_prefix(e))))
    }

    /// Read `persona.json` from `dir`, or fall back to the built-in request.
    pub fn load_or_default(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(PERSONA_FILE);
        if path.is_file() {
            log::info!("Using persona from {}", path.display());
            Self::load(&path)
        } else {
            log::info!("No {} found; using the default persona", PERSONA_FILE);
            Ok(Self::default())
        }
    }
}

fn strip_prefix(error: Error) -> String {
    match error {
        Error::Config(message) => message,
        other => other.to_string(),
    }
}
