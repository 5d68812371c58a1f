//! crates/mm_pipeline/src/load.rs
//! Build target constituencies from constituency-table rows.
//!
//! Row layout: `name, electorate, seats[, topupSeats], legacy...`
//! (the top-up column is present only in the top-up variant).

use mm_core::variables::Variant;
use mm_core::TargetConstituency;
use mm_io::tables::TableRow;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("line {line}: expected at least {expected} columns, found {found}")]
    MissingColumns { line: u64, expected: usize, found: usize },

    #[error("line {line}: constituency name is blank")]
    BlankName { line: u64 },

    #[error("line {line}: {column} {value:?} is not a non-negative integer")]
    BadCount { line: u64, column: &'static str, value: String },

    #[error("line {line}: constituency {name:?} is formed from no legacy units")]
    EmptyFormedFrom { line: u64, name: String },
}

/// One `TargetConstituency` per row, in table order.
///
/// A later row reusing a name replaces the earlier constituency in the earlier
/// one's position. Blank legacy cells are dropped.
pub fn build_constituencies(rows: &[TableRow], variant: Variant) -> Result<Vec<TargetConstituency>, LoadError> {
    let fixed = match variant {
        Variant::Plain => 3,
        Variant::TopUp => 4,
    };

    let mut out: Vec<TargetConstituency> = Vec::with_capacity(rows.len());
    for row in rows {
        let line = row.line;
        if row.cells.len() < fixed {
            return Err(LoadError::MissingColumns {
                line,
                expected: fixed,
                found: row.cells.len(),
            });
        }

        let name = row.cells[0].as_str();
        if name.trim().is_empty() {
            return Err(LoadError::BlankName { line });
        }
        let electorate = row.cells[1].trim();
        let seats = parse_count(line, "seats", &row.cells[2])?;
        let topup_seats = match variant {
            Variant::Plain => None,
            Variant::TopUp => Some(parse_count(line, "topupSeats", &row.cells[3])?),
        };

        let formed_from: Vec<String> = row.cells[fixed..]
            .iter()
            .filter(|c| !c.trim().is_empty())
            .cloned()
            .collect();
        if formed_from.is_empty() {
            return Err(LoadError::EmptyFormedFrom {
                line,
                name: name.to_string(),
            });
        }

        let tc = TargetConstituency::new(name, electorate, seats, topup_seats, formed_from);
        match out.iter().position(|c| c.name == tc.name) {
            Some(i) => {
                warn!(name = %tc.name, line, "constituency defined twice; later row replaces earlier");
                out[i] = tc;
            }
            None => out.push(tc),
        }
    }

    info!(constituencies = out.len(), %variant, "loaded constituency table");
    Ok(out)
}

fn parse_count(line: u64, column: &'static str, raw: &str) -> Result<u32, LoadError> {
    raw.trim().parse::<u32>().map_err(|_| LoadError::BadCount {
        line,
        column,
        value: raw.to_string(),
    })
}
