//! crates/mm_pipeline/src/validate.rs
//! Consistency gate between aggregation and computation.
//!
//! Checks run globally so every offending constituency is reported (and
//! logged) together before the run aborts:
//! 1. each constituency matched exactly as many source ids as it lists legacy units;
//! 2. each matched id has a boundary.

use std::fmt;

use mm_algo::GeometryIndex;
use mm_core::TargetConstituency;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountMismatch {
    pub constituency: String,
    pub expected: usize,
    pub matched: usize,
}

impl fmt::Display for CountMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: {} legacy unit(s), {} matched id(s)",
            self.constituency, self.expected, self.matched
        )
    }
}

/// `(constituency, source id)` with no boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingBoundary {
    pub constituency: String,
    pub source_id: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidateError {
    #[error("{} constituency(ies) with mismatched legacy-unit counts: {}", .0.len(), join(.0))]
    CountMismatch(Vec<CountMismatch>),

    #[error("{} matched source id(s) without a boundary: {}", .0.len(), join_missing(.0))]
    MissingGeometry(Vec<MissingBoundary>),
}

fn join(xs: &[CountMismatch]) -> String {
    xs.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

fn join_missing(xs: &[MissingBoundary]) -> String {
    xs.iter()
        .map(|m| format!("{:?} in {:?}", m.source_id, m.constituency))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Count check only; used before boundaries are consulted.
pub fn check_counts(constituencies: &[TargetConstituency]) -> Result<(), ValidateError> {
    let mismatches: Vec<CountMismatch> = constituencies
        .iter()
        .filter(|c| !c.is_fully_matched())
        .map(|c| CountMismatch {
            constituency: c.name.clone(),
            expected: c.formed_from.len(),
            matched: c.formed_from_ids.len(),
        })
        .collect();

    if mismatches.is_empty() {
        return Ok(());
    }
    for m in &mismatches {
        error!(
            constituency = %m.constituency,
            expected = m.expected,
            matched = m.matched,
            "legacy-unit count mismatch"
        );
    }
    Err(ValidateError::CountMismatch(mismatches))
}

/// Every matched id of every constituency must have a boundary.
pub fn check_boundaries(constituencies: &[TargetConstituency], geometries: &GeometryIndex) -> Result<(), ValidateError> {
    let missing: Vec<MissingBoundary> = constituencies
        .iter()
        .flat_map(|c| {
            c.formed_from_ids
                .iter()
                .filter(|id| !geometries.contains(id))
                .map(move |id| MissingBoundary {
                    constituency: c.name.clone(),
                    source_id: id.clone(),
                })
        })
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    for m in &missing {
        error!(constituency = %m.constituency, source_id = %m.source_id, "no boundary for matched source id");
    }
    Err(ValidateError::MissingGeometry(missing))
}

/// Both checks, counts first.
pub fn validate(constituencies: &[TargetConstituency], geometries: &GeometryIndex) -> Result<(), ValidateError> {
    check_counts(constituencies)?;
    check_boundaries(constituencies, geometries)?;
    info!(constituencies = constituencies.len(), "consistency checks passed");
    Ok(())
}
