// crates/mm_algo/src/lib.rs
#![forbid(unsafe_code)]

// ----------------------------- Allocation (public surface) ---------------------------

pub mod allocation {
    pub mod dhondt;

    pub use dhondt::{allocate_dhondt, AllocError};
}

// ----------------------------- Top-up, matching, geometry ----------------------------

pub mod geometry;
pub mod names;
pub mod topup;

pub use allocation::{allocate_dhondt, AllocError};
pub use geometry::{union_boundaries, GeometryIndex};
pub use names::{matcher_for, ExactMatcher, NameMatcher, TokenSetMatcher};
pub use topup::{allocate_national_topup, apply_national_topup, fold_seats, pool_votes, TopUpOutcome};
