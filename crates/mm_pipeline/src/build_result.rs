//! crates/mm_pipeline/src/build_result.rs
//! Assemble the result document and the per-constituency boundary features.
//!
//! National totals fold per-constituency allocations and never carry explicit
//! zero entries. The top-up fields appear only in the top-up variant.

use std::collections::BTreeMap;

use geo_types::MultiPolygon;
use mm_algo::{fold_seats, TopUpOutcome};
use mm_core::{PartyVotes, SeatAllocation, TargetConstituency};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultDoc {
    /// Constituency-level seats, summed nationally.
    pub parliament: SeatAllocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parliament_with_top_up: Option<SeatAllocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_up: Option<SeatAllocation>,
    pub constituencies: BTreeMap<String, ConstituencyDoc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstituencyDoc {
    pub electorate: String,
    pub seats: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topup_seats: Option<u32>,
    pub formed_from: Vec<String>,
    pub votes: PartyVotes,
    pub seat_allocations: SeatAllocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topup_seat_allocations: Option<SeatAllocation>,
}

/// A merged constituency boundary, named.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

pub fn build_result(constituencies: &[TargetConstituency], national_topup: Option<&TopUpOutcome>) -> ResultDoc {
    let mut parliament = SeatAllocation::new();
    let mut docs = BTreeMap::new();

    for c in constituencies {
        fold_seats(&mut parliament, &c.seat_allocations);
        docs.insert(
            c.name.clone(),
            ConstituencyDoc {
                electorate: c.electorate.clone(),
                seats: c.seats,
                topup_seats: c.topup_seats,
                formed_from: c.formed_from.clone(),
                votes: c.votes.clone(),
                seat_allocations: without_zeros(&c.seat_allocations),
                topup_seat_allocations: c.topup_seat_allocations.as_ref().map(without_zeros),
            },
        );
    }

    ResultDoc {
        parliament,
        parliament_with_top_up: national_topup.map(|t| without_zeros(&t.with_topup)),
        top_up: national_topup.map(|t| without_zeros(&t.national)),
        constituencies: docs,
    }
}

fn without_zeros(alloc: &SeatAllocation) -> SeatAllocation {
    let mut out = SeatAllocation::new();
    fold_seats(&mut out, alloc);
    out
}

/// One feature per constituency that has a unified boundary, in declaration order.
pub fn boundary_features(constituencies: &[TargetConstituency]) -> Vec<BoundaryFeature> {
    constituencies
        .iter()
        .filter_map(|c| {
            c.geometry.as_ref().map(|g| BoundaryFeature {
                name: c.name.clone(),
                geometry: g.clone(),
            })
        })
        .collect()
}
