// crates/mm_algo/src/topup.rs
//
// National top-up tier:
// - pool constituency votes into one national pool,
// - allocate a fixed number of top-up seats over that pool with D'Hondt,
// - fold the top-up seats onto the constituency-level seats.
//
// Determinism: the pool's party order is national first appearance
// (constituencies in declaration order, each constituency's own party order),
// and that order is the tie-break for the national allocation.

use mm_core::{CoreError, PartyVotes, SeatAllocation};

use crate::allocation::{allocate_dhondt, AllocError};

/// Result of the top-up step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopUpOutcome {
    /// Seats allocated over the national pool.
    pub national: SeatAllocation,
    /// Constituency top-up-variant seats plus `national`.
    pub with_topup: SeatAllocation,
}

/// Sum vote pools in iteration order.
pub fn pool_votes<'a, I>(pools: I) -> Result<PartyVotes, CoreError>
where
    I: IntoIterator<Item = &'a PartyVotes>,
{
    let mut national = PartyVotes::new();
    for pool in pools {
        national.merge(pool)?;
    }
    Ok(national)
}

/// Add `alloc` into `into`, skipping zero entries so none ever appear.
pub fn fold_seats(into: &mut SeatAllocation, alloc: &SeatAllocation) {
    for (party, seats) in alloc {
        if *seats == 0 {
            continue;
        }
        *into.entry(party.clone()).or_insert(0) += *seats;
    }
}

/// Allocate `seats` nationally over `pooled`.
#[inline]
pub fn allocate_national_topup(seats: u32, pooled: &PartyVotes) -> Result<SeatAllocation, AllocError> {
    allocate_dhondt(seats, pooled)
}

/// Allocate the national top-up and fold it onto the constituency-level
/// allocations of the top-up variant.
pub fn apply_national_topup<'a, I>(
    local: I,
    pooled: &PartyVotes,
    seats: u32,
) -> Result<TopUpOutcome, AllocError>
where
    I: IntoIterator<Item = &'a SeatAllocation>,
{
    let national = allocate_national_topup(seats, pooled)?;
    let mut with_topup = SeatAllocation::new();
    for alloc in local {
        fold_seats(&mut with_topup, alloc);
    }
    fold_seats(&mut with_topup, &national);
    Ok(TopUpOutcome { national, with_topup })
}
