//! Per-unit candidate results (JSON):
//! `[{ "id", "name", "candidates": [{ "firstName", "lastName", "party", "votes" }] }]`.

use std::path::Path;

use mm_core::SourceUnit;
use tracing::debug;

use crate::loader::read_text;
use crate::IoError;

pub fn read_candidates_json(path: &Path) -> Result<Vec<SourceUnit>, IoError> {
    let text = read_text(path)?;
    let units: Vec<SourceUnit> = serde_json::from_str(&text).map_err(|e| IoError::Json {
        pointer: "/".into(),
        msg: format!("{}: {e}", path.display()),
    })?;
    debug!(file = %path.display(), units = units.len(), "read candidate results");
    Ok(units)
}
