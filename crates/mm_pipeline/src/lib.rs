//! mm_pipeline: load → aggregate → validate → unify → allocate → build result.
//!
//! File reading and writing go through `mm_io`; algorithms live in `mm_algo`.
//! The whole run is in memory and nothing is written until every stage has
//! succeeded, so a failed run leaves no partial output.

#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use mm_algo::{matcher_for, GeometryIndex};
use mm_core::{Params, SourceUnit, TargetConstituency, VoteRecord};
use mm_io::tables::TableRow;
use mm_io::staging::StagingDir;
use mm_io::IoError;
use thiserror::Error;
use tracing::info;

pub mod aggregate;
pub mod allocate;
pub mod build_result;
pub mod load;
pub mod unify;
pub mod validate;

pub use aggregate::{aggregate_units, aggregate_votes, AggregateError, AggregateSummary};
pub use allocate::{allocate_seats, AllocateError};
pub use build_result::{boundary_features, build_result, BoundaryFeature, ConstituencyDoc, ResultDoc};
pub use load::{build_constituencies, LoadError};
pub use unify::unify_boundaries;
pub use validate::{validate, CountMismatch, MissingBoundary, ValidateError};

/// Single error surface for the pipeline orchestration.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error("configuration: {0}")]
    Config(String),

    #[error("load: {0}")]
    Load(#[from] LoadError),

    #[error("aggregate: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("validate: {0}")]
    Validate(#[from] ValidateError),

    #[error("allocate: {0}")]
    Allocate(#[from] AllocateError),
}

// ---------------------------- Inputs ----------------------------

/// Where the votes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteSource {
    /// Flat results CSV (one row per party per source unit).
    ResultsCsv(PathBuf),
    /// Per-unit candidate JSON.
    CandidatesJson(PathBuf),
}

/// One boundary collection; `id_property` falls back to
/// `Params::geometry_id_properties` by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundarySource {
    pub path: PathBuf,
    pub id_property: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub constituencies: PathBuf,
    pub votes: VoteSource,
    pub boundaries: Vec<BoundarySource>,
}

/// Votes as read, in the shape of their source.
#[derive(Debug, Clone)]
pub enum LoadedVotes {
    /// One row per party per source unit.
    Records(Vec<VoteRecord>),
    /// One entry per source unit, possibly with no candidates.
    Units(Vec<SourceUnit>),
}

impl LoadedVotes {
    /// Party-level entries (rows or candidates).
    pub fn entries(&self) -> usize {
        match self {
            LoadedVotes::Records(r) => r.len(),
            LoadedVotes::Units(u) => u.iter().map(|unit| unit.candidates.len()).sum(),
        }
    }
}

/// Everything the run needs, read from disk.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub rows: Vec<TableRow>,
    pub votes: LoadedVotes,
    pub geometries: GeometryIndex,
}

/// Top-level outputs.
#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    pub result: ResultDoc,
    pub boundaries: Vec<BoundaryFeature>,
}

/// Read all inputs named by `paths`.
pub fn load_inputs(paths: &InputPaths, params: &Params) -> Result<PipelineInputs, PipelineError> {
    let rows = mm_io::tables::read_constituency_table(&paths.constituencies)?;

    let votes = match &paths.votes {
        VoteSource::ResultsCsv(p) => LoadedVotes::Records(mm_io::tables::read_results_csv(p, params.results_has_header)?),
        VoteSource::CandidatesJson(p) => LoadedVotes::Units(mm_io::candidates::read_candidates_json(p)?),
    };

    let mut geometries = GeometryIndex::new();
    for (i, src) in paths.boundaries.iter().enumerate() {
        let property = match (&src.id_property, params.geometry_id_properties.get(i)) {
            (Some(p), _) | (None, Some(p)) => p.as_str(),
            (None, None) => {
                return Err(PipelineError::Config(format!(
                    "no id property for boundary file {} (give PATH:PROPERTY)",
                    src.path.display()
                )))
            }
        };
        geometries.insert_collection(mm_io::geo::read_keyed_collection(&src.path, property)?);
    }

    info!(
        rows = rows.len(),
        votes = votes.entries(),
        boundaries = geometries.len(),
        "loaded inputs"
    );
    Ok(PipelineInputs {
        rows,
        votes,
        geometries,
    })
}

// ---------------------------- Stages ----------------------------

/// Load, aggregate and validate. Stops at the consistency gate.
pub fn prepare(inputs: &PipelineInputs, params: &Params) -> Result<Vec<TargetConstituency>, PipelineError> {
    let mut constituencies = build_constituencies(&inputs.rows, params.variant)?;
    let matcher = matcher_for(params);
    match &inputs.votes {
        LoadedVotes::Records(records) => {
            aggregate_votes(&mut constituencies, records, matcher.as_ref(), params.ambiguity)?
        }
        LoadedVotes::Units(units) => aggregate_units(
            &mut constituencies,
            units,
            &params.independent_labels,
            matcher.as_ref(),
            params.ambiguity,
        )?,
    };
    validate(&constituencies, &inputs.geometries)?;
    Ok(constituencies)
}

/// Full run: `prepare`, then unify, allocate and assemble.
pub fn run(inputs: &PipelineInputs, params: &Params) -> Result<PipelineOutputs, PipelineError> {
    let mut constituencies = prepare(inputs, params)?;
    unify_boundaries(&mut constituencies, &inputs.geometries)?;
    let topup = allocate_seats(&mut constituencies, params)?;

    let result = build_result(&constituencies, topup.as_ref());
    let boundaries = boundary_features(&constituencies);
    info!(
        constituencies = constituencies.len(),
        seats = result.parliament.values().sum::<u32>(),
        "run complete"
    );
    Ok(PipelineOutputs { result, boundaries })
}

/// Write `data.json` and `geometries/<name>.geojson` under `out_dir`.
///
/// Everything is written to a staging directory first and moved into
/// `out_dir` only once every file has been written.
pub fn write_outputs(out_dir: &Path, outputs: &PipelineOutputs) -> Result<(), PipelineError> {
    // Validate every file name before the first write.
    for f in &outputs.boundaries {
        mm_io::geo::boundary_path(Path::new("geometries"), &f.name)?;
    }

    let stage = StagingDir::create(out_dir)?;
    let geometry_dir = stage.path().join("geometries");

    mm_io::canonical_json::write_canonical_file(&stage.path().join("data.json"), &outputs.result)?;
    for f in &outputs.boundaries {
        mm_io::geo::write_boundary_feature(&geometry_dir, &f.name, &f.geometry)?;
    }
    let files = stage.commit(out_dir)?;
    info!(out = %out_dir.display(), files, "wrote outputs");
    Ok(())
}
