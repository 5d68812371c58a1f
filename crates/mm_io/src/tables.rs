//! CSV tables: the constituency mapping table and the flat results file.

use std::path::Path;

use mm_core::VoteRecord;
use tracing::debug;

use crate::loader::read_text;
use crate::IoError;

/// Results layout: source id, source name, party, votes.
const COL_SOURCE_ID: usize = 0;
const COL_SOURCE_NAME: usize = 2;
const COL_PARTY: usize = 6;
const COL_VOTES: usize = 7;

/// One constituency-table row, cells as written (untrimmed), with its 1-based line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRow {
    pub line: u64,
    pub cells: Vec<String>,
}

fn csv_err(path: &Path, e: csv::Error) -> IoError {
    IoError::Csv {
        file: path.display().to_string(),
        msg: e.to_string(),
    }
}

/// Read the headerless constituency table. Rows whose cells are all blank are skipped.
pub fn read_constituency_table(path: &Path) -> Result<Vec<TableRow>, IoError> {
    let text = read_text(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(|e| csv_err(path, e))?;
        if rec.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let line = rec.position().map(|p| p.line()).unwrap_or(0);
        rows.push(TableRow {
            line,
            cells: rec.iter().map(str::to_string).collect(),
        });
    }
    debug!(file = %path.display(), rows = rows.len(), "read constituency table");
    Ok(rows)
}

/// Read the flat results file into one `VoteRecord` per row.
pub fn read_results_csv(path: &Path, has_header: bool) -> Result<Vec<VoteRecord>, IoError> {
    let text = read_text(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec.map_err(|e| csv_err(path, e))?;
        let line = rec.position().map(|p| p.line()).unwrap_or(0);
        let cell = |idx: usize| {
            rec.get(idx).ok_or_else(|| {
                IoError::Invalid(format!(
                    "{}:{line}: missing column {idx} (row has {})",
                    path.display(),
                    rec.len()
                ))
            })
        };

        let raw_votes = cell(COL_VOTES)?.trim();
        let votes = raw_votes.parse::<u64>().map_err(|_| {
            IoError::Invalid(format!(
                "{}:{line}: vote count {raw_votes:?} is not a non-negative integer",
                path.display()
            ))
        })?;

        out.push(VoteRecord {
            source_id: cell(COL_SOURCE_ID)?.to_string(),
            source_name: cell(COL_SOURCE_NAME)?.to_string(),
            party: cell(COL_PARTY)?.to_string(),
            votes,
        });
    }
    debug!(file = %path.display(), records = out.len(), "read results");
    Ok(out)
}
