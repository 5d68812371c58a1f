//! Per-party vote totals and seat allocations.
//!
//! `PartyVotes` keeps two views of the same data:
//! - a key-ordered map for lookups and canonical serialization,
//! - the order in which each party was first seen, which is the documented
//!   tie-break order for highest-averages allocation.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::errors::CoreError;

/// Party identity. For unaffiliated candidates this is the candidate's full name.
pub type PartyKey = String;

/// Party → seats won. Parties that won nothing are absent, never `0`.
pub type SeatAllocation = BTreeMap<PartyKey, u32>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartyVotes {
    totals: BTreeMap<PartyKey, u64>,
    order: Vec<PartyKey>,
}

impl PartyVotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from `(party, votes)` pairs in order.
    pub fn try_from_pairs<K, I>(pairs: I) -> Result<Self, CoreError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, u64)>,
    {
        let mut pv = PartyVotes::new();
        for (party, votes) in pairs {
            pv.add(party.as_ref(), votes)?;
        }
        Ok(pv)
    }

    /// Add `votes` to `party`, registering the party on first sight.
    /// A party total past `u64::MAX` is an error; the pool is left unchanged.
    pub fn add(&mut self, party: &str, votes: u64) -> Result<(), CoreError> {
        match self.totals.get_mut(party) {
            Some(total) => {
                *total = total
                    .checked_add(votes)
                    .ok_or_else(|| CoreError::VoteOverflow(party.to_string()))?;
            }
            None => {
                self.order.push(party.to_string());
                self.totals.insert(party.to_string(), votes);
            }
        }
        Ok(())
    }

    /// Fold another pool into this one, preserving this pool's existing order
    /// and appending parties it has not seen yet in `other`'s order.
    pub fn merge(&mut self, other: &PartyVotes) -> Result<(), CoreError> {
        for (party, votes) in other.iter() {
            self.add(party, votes)?;
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, party: &str) -> u64 {
        self.totals.get(party).copied().unwrap_or(0)
    }

    /// Parties in first-appearance order.
    #[inline]
    pub fn parties(&self) -> &[PartyKey] {
        &self.order
    }

    /// `(party, votes)` in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.order
            .iter()
            .map(move |p| (p.as_str(), self.totals.get(p).copied().unwrap_or(0)))
    }

    #[inline]
    pub fn as_map(&self) -> &BTreeMap<PartyKey, u64> {
        &self.totals
    }

    /// Sum over all parties, widened to `u128`.
    pub fn total(&self) -> u128 {
        self.totals.values().map(|v| u128::from(*v)).sum()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// Serialized as a plain party → votes object; order is a runtime concern only.
impl Serialize for PartyVotes {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.totals.serialize(s)
    }
}
