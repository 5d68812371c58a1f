//! crates/mm_pipeline/src/aggregate.rs
//! Many-to-one aggregation: route every source unit to the constituency whose
//! legacy-unit list names it, and accumulate its votes there.
//!
//! Every source unit must land somewhere, including one that reports no
//! votes: an unmatched source unit is fatal. A source unit naming legacy units
//! of several constituencies is resolved by `AmbiguityPolicy` (reject by default).

use std::collections::BTreeMap;

use mm_algo::NameMatcher;
use mm_core::variables::AmbiguityPolicy;
use mm_core::{CoreError, SourceUnit, TargetConstituency, VoteRecord};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("source unit {name:?} does not appear to have been merged in anywhere")]
    UnmatchedSource { name: String },

    #[error("source unit {name:?} matches more than one constituency: {candidates:?}")]
    AmbiguousSource { name: String, candidates: Vec<String> },

    #[error("constituency {constituency:?}: {source}")]
    Tally {
        constituency: String,
        #[source]
        source: CoreError,
    },
}

/// Counts reported after a successful aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateSummary {
    pub records: usize,
    pub source_names: usize,
}

/// Resolves source names to constituency indexes, once per name.
struct Resolver<'m> {
    matcher: &'m dyn NameMatcher,
    policy: AmbiguityPolicy,
    resolved: BTreeMap<String, usize>,
}

impl<'m> Resolver<'m> {
    fn new(matcher: &'m dyn NameMatcher, policy: AmbiguityPolicy) -> Self {
        Self {
            matcher,
            policy,
            resolved: BTreeMap::new(),
        }
    }

    fn index(&mut self, constituencies: &[TargetConstituency], source_name: &str) -> Result<usize, AggregateError> {
        if let Some(i) = self.resolved.get(source_name) {
            return Ok(*i);
        }
        let i = resolve(constituencies, source_name, self.matcher, self.policy)?;
        debug!(source = %source_name, constituency = %constituencies[i].name, "matched source unit");
        self.resolved.insert(source_name.to_string(), i);
        Ok(i)
    }

    fn summary(&self, records: usize) -> AggregateSummary {
        let summary = AggregateSummary {
            records,
            source_names: self.resolved.len(),
        };
        info!(
            records = summary.records,
            source_names = summary.source_names,
            matcher = self.matcher.name(),
            "aggregated votes"
        );
        summary
    }
}

fn tally_error(c: &TargetConstituency, source: CoreError) -> AggregateError {
    error!(constituency = %c.name, %source, "vote tally overflow");
    AggregateError::Tally {
        constituency: c.name.clone(),
        source,
    }
}

/// Fold flat `records` into `constituencies` (declaration order is the scan order).
pub fn aggregate_votes(
    constituencies: &mut [TargetConstituency],
    records: &[VoteRecord],
    matcher: &dyn NameMatcher,
    policy: AmbiguityPolicy,
) -> Result<AggregateSummary, AggregateError> {
    // Results repeat a source name once per party; the resolver caches it.
    let mut resolver = Resolver::new(matcher, policy);
    for rec in records {
        let idx = resolver.index(constituencies, &rec.source_name)?;
        let c = &mut constituencies[idx];
        c.absorb(rec).map_err(|e| tally_error(c, e))?;
    }
    Ok(resolver.summary(records.len()))
}

/// Fold per-unit candidate results into `constituencies`. Each unit is matched
/// by name even when it lists no candidates.
pub fn aggregate_units(
    constituencies: &mut [TargetConstituency],
    units: &[SourceUnit],
    independent_labels: &[String],
    matcher: &dyn NameMatcher,
    policy: AmbiguityPolicy,
) -> Result<AggregateSummary, AggregateError> {
    let mut resolver = Resolver::new(matcher, policy);
    let mut records = 0;
    for unit in units {
        let idx = resolver.index(constituencies, &unit.name)?;
        let c = &mut constituencies[idx];
        if unit.candidates.is_empty() {
            warn!(source = %unit.name, id = %unit.id, constituency = %c.name, "source unit reports no candidates");
        }
        c.absorb_unit(unit, independent_labels).map_err(|e| tally_error(c, e))?;
        records += unit.candidates.len();
    }
    Ok(resolver.summary(records))
}

fn resolve(
    constituencies: &[TargetConstituency],
    source_name: &str,
    matcher: &dyn NameMatcher,
    policy: AmbiguityPolicy,
) -> Result<usize, AggregateError> {
    let hits: Vec<usize> = constituencies
        .iter()
        .enumerate()
        .filter(|(_, c)| c.formed_from.iter().any(|legacy| matcher.matches(source_name, legacy)))
        .map(|(i, _)| i)
        .collect();

    match (hits.as_slice(), policy) {
        ([], _) => {
            error!(source = %source_name, "source unit does not appear to have been merged in anywhere");
            Err(AggregateError::UnmatchedSource {
                name: source_name.to_string(),
            })
        }
        ([only], _) => Ok(*only),
        ([first, ..], AmbiguityPolicy::FirstMatch) => Ok(*first),
        (many, AmbiguityPolicy::Reject) => {
            let candidates: Vec<String> = many.iter().map(|i| constituencies[*i].name.clone()).collect();
            error!(source = %source_name, ?candidates, "source unit matches more than one constituency");
            Err(AggregateError::AmbiguousSource {
                name: source_name.to_string(),
                candidates,
            })
        }
    }
}
