//! mm_core: Core types shared across the multi-member constituency engine.
//!
//! This crate is **I/O-free**. It defines the stable types used by
//! `mm_algo`, `mm_io`, `mm_pipeline` and `mm_cli`:
//!
//! - `TargetConstituency`: a merged constituency and its per-run state
//! - `PartyVotes`: per-party vote totals with first-appearance order
//! - `SeatAllocation`: party → seats won (zero entries never stored)
//! - `VoteRecord` / `SourceUnit` / `Candidate`: the two observed vote shapes
//! - `Params`: run configuration with safe defaults

#![forbid(unsafe_code)]

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidToken(String),
        DomainOutOfRange(&'static str),
        /// A party's vote total does not fit in `u64`.
        VoteOverflow(String),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidToken(t) => write!(f, "invalid token: {t}"),
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
                CoreError::VoteOverflow(p) => write!(f, "vote total for {p:?} overflows u64"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod entities;
pub mod variables;
pub mod votes;

pub use entities::{Candidate, SourceUnit, TargetConstituency, VoteRecord};
pub use errors::CoreError;
pub use variables::Params;
pub use votes::{PartyKey, PartyVotes, SeatAllocation};
