//! crates/mm_pipeline/src/allocate.rs
//! Seat allocation at both scales.
//!
//! - Per constituency: D'Hondt over its own votes with `seats`, and in the
//!   top-up variant again with `topup_seats`.
//! - Top-up variant only: D'Hondt once more over votes pooled nationally
//!   (constituencies in declaration order) with `national_topup_seats`.

use mm_algo::{allocate_dhondt, apply_national_topup, pool_votes, AllocError, TopUpOutcome};
use mm_core::{CoreError, Params, TargetConstituency};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocateError {
    #[error("constituency {name:?}: {source}")]
    Constituency {
        name: String,
        #[source]
        source: AllocError,
    },

    #[error("constituency {name:?} has no top-up seat count")]
    MissingTopupSeats { name: String },

    #[error("national top-up: {0}")]
    National(#[source] AllocError),

    #[error("national vote pool: {0}")]
    Pool(#[source] CoreError),
}

/// Fill `seat_allocations` (and `topup_seat_allocations` in the top-up variant).
/// Returns the national top-up outcome in the top-up variant.
pub fn allocate_seats(
    constituencies: &mut [TargetConstituency],
    params: &Params,
) -> Result<Option<TopUpOutcome>, AllocateError> {
    for c in constituencies.iter_mut() {
        c.seat_allocations = allocate_dhondt(c.seats, &c.votes).map_err(|source| AllocateError::Constituency {
            name: c.name.clone(),
            source,
        })?;

        if params.is_top_up() {
            let topup_seats = c
                .topup_seats
                .ok_or_else(|| AllocateError::MissingTopupSeats { name: c.name.clone() })?;
            let alloc = allocate_dhondt(topup_seats, &c.votes).map_err(|source| AllocateError::Constituency {
                name: c.name.clone(),
                source,
            })?;
            c.topup_seat_allocations = Some(alloc);
        }
        debug!(constituency = %c.name, seats = c.seats, "allocated");
    }

    if !params.is_top_up() {
        info!(constituencies = constituencies.len(), "allocated constituency seats");
        return Ok(None);
    }

    let pooled = pool_votes(constituencies.iter().map(|c| &c.votes)).map_err(AllocateError::Pool)?;
    let local = constituencies.iter().filter_map(|c| c.topup_seat_allocations.as_ref());
    let outcome =
        apply_national_topup(local, &pooled, params.national_topup_seats).map_err(AllocateError::National)?;

    info!(
        constituencies = constituencies.len(),
        national_topup_seats = params.national_topup_seats,
        parties = pooled.len(),
        "allocated constituency and national top-up seats"
    );
    Ok(Some(outcome))
}
