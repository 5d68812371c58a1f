//! D'Hondt (highest averages) allocation.
//!
//! Contract:
//! - Allocate `seats` sequentially, each to the party with the largest v/(s+1).
//! - Pure integers; no division in comparisons (cross-multiply in u128).
//! - Ties go to the party seen first in the pool (`PartyVotes::parties()` order).
//!   The scan runs in that order and only a strictly greater quotient displaces
//!   the current best, so the rule holds without a separate tie step.
//! - Seats are only ever added, so the allocation for `n` seats is a prefix of
//!   the allocation for `n + 1`.

use std::cmp::Ordering;

use mm_core::{PartyVotes, SeatAllocation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// Seats were requested from an empty vote pool.
    NoParties { seats: u32 },
}

impl std::fmt::Display for AllocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocError::NoParties { seats } => {
                write!(f, "cannot allocate {seats} seat(s): no parties in vote pool")
            }
        }
    }
}

impl std::error::Error for AllocError {}

/// Allocate `seats` using D'Hondt.
///
/// *Notes*:
/// - If `seats == 0`, returns an empty map without scanning.
/// - The result holds winners only; the values sum to `seats` exactly.
pub fn allocate_dhondt(seats: u32, votes: &PartyVotes) -> Result<SeatAllocation, AllocError> {
    if seats == 0 {
        return Ok(SeatAllocation::new());
    }
    if votes.is_empty() {
        return Err(AllocError::NoParties { seats });
    }

    let order = votes.parties();
    let mut won: Vec<u32> = vec![0; order.len()];

    for _round in 0..seats {
        let winner = next_award(order, &won, votes);
        won[winner] += 1;
    }

    Ok(order
        .iter()
        .zip(won)
        .filter(|(_, s)| *s > 0)
        .map(|(p, s)| (p.clone(), s))
        .collect())
}

/// Index (into `order`) of the argmax of v/(s+1); first in `order` on ties.
fn next_award(order: &[String], won: &[u32], votes: &PartyVotes) -> usize {
    let mut best = 0usize;
    for i in 1..order.len() {
        let ord = cmp_quotients(votes.get(&order[i]), won[i], votes.get(&order[best]), won[best]);
        if ord == Ordering::Greater {
            best = i;
        }
    }
    best
}

/// Compare D'Hondt quotients v_a/(s_a+1) vs v_b/(s_b+1) without floats.
/// Returns Ordering::Greater if a's quotient is larger.
fn cmp_quotients(v_a: u64, s_a: u32, v_b: u64, s_b: u32) -> Ordering {
    let da = (s_a as u128) + 1;
    let db = (s_b as u128) + 1;
    let lhs = (v_a as u128) * db;
    let rhs = (v_b as u128) * da;
    lhs.cmp(&rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pool(xs: &[(&str, u64)]) -> PartyVotes {
        PartyVotes::try_from_pairs(xs.iter().copied()).unwrap()
    }

    fn alloc(xs: &[(&str, u32)]) -> SeatAllocation {
        xs.iter().map(|(p, s)| (p.to_string(), *s)).collect()
    }

    #[test]
    fn three_seats_worked_example() {
        // Quotients: A 100,50,33 / B 80,40 / C 30 → A, B, A.
        let v = pool(&[("A", 100), ("B", 80), ("C", 30)]);
        assert_eq!(allocate_dhondt(3, &v).unwrap(), alloc(&[("A", 2), ("B", 1)]));
    }

    #[test]
    fn zero_seats_is_empty_even_without_parties() {
        assert!(allocate_dhondt(0, &PartyVotes::new()).unwrap().is_empty());
        assert!(allocate_dhondt(0, &pool(&[("A", 5)])).unwrap().is_empty());
    }

    #[test]
    fn seats_from_empty_pool_is_an_error() {
        assert_eq!(
            allocate_dhondt(2, &PartyVotes::new()),
            Err(AllocError::NoParties { seats: 2 })
        );
    }

    #[test]
    fn ties_go_to_first_seen_party() {
        let v = pool(&[("Y", 50), ("X", 50)]);
        assert_eq!(allocate_dhondt(1, &v).unwrap(), alloc(&[("Y", 1)]));
        let v = pool(&[("X", 50), ("Y", 50)]);
        assert_eq!(allocate_dhondt(1, &v).unwrap(), alloc(&[("X", 1)]));
        // 60/2 == 30/1 on the second seat; A was seen first.
        let v = pool(&[("A", 60), ("B", 30)]);
        assert_eq!(allocate_dhondt(2, &v).unwrap(), alloc(&[("A", 2)]));
    }

    #[test]
    fn zero_vote_party_never_wins_while_others_have_votes() {
        let v = pool(&[("Z", 0), ("A", 1)]);
        assert_eq!(allocate_dhondt(5, &v).unwrap(), alloc(&[("A", 5)]));
    }

    #[test]
    fn large_counts_do_not_overflow() {
        let v = pool(&[("A", u64::MAX), ("B", u64::MAX - 1)]);
        assert_eq!(allocate_dhondt(2, &v).unwrap(), alloc(&[("A", 1), ("B", 1)]));
    }

    fn arb_pool() -> impl Strategy<Value = Vec<u64>> {
        prop::collection::vec(0u64..1_000_000, 1..8)
    }

    fn named(vs: &[u64]) -> PartyVotes {
        PartyVotes::try_from_pairs(vs.iter().enumerate().map(|(i, v)| (format!("P{i}"), *v))).unwrap()
    }

    proptest! {
        #[test]
        fn allocation_sums_to_seats(vs in arb_pool(), seats in 0u32..40) {
            let a = allocate_dhondt(seats, &named(&vs)).unwrap();
            prop_assert_eq!(a.values().sum::<u32>(), seats);
            prop_assert!(a.values().all(|s| *s > 0));
        }

        #[test]
        fn allocation_is_deterministic(vs in arb_pool(), seats in 0u32..40) {
            let pv = named(&vs);
            prop_assert_eq!(allocate_dhondt(seats, &pv).unwrap(), allocate_dhondt(seats, &pv).unwrap());
        }

        #[test]
        fn one_more_seat_never_takes_one_away(vs in arb_pool(), seats in 0u32..40) {
            let pv = named(&vs);
            let before = allocate_dhondt(seats, &pv).unwrap();
            let after = allocate_dhondt(seats + 1, &pv).unwrap();
            for (party, s) in &before {
                prop_assert!(after.get(party).copied().unwrap_or(0) >= *s);
            }
        }
    }
}
