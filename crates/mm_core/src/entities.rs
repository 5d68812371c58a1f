//! Domain entities: merged constituencies and the two observed vote shapes.

use std::collections::BTreeSet;

use geo_types::MultiPolygon;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::votes::{PartyKey, PartyVotes, SeatAllocation};

/// A merged, multi-member constituency.
///
/// Created once by the loader; `formed_from_ids`, `votes` and `geometry` are
/// filled by aggregation/unification, the allocations by the allocator.
#[derive(Clone, Debug)]
pub struct TargetConstituency {
    pub name: String,
    /// Kept verbatim (trimmed); never parsed.
    pub electorate: String,
    pub seats: u32,
    /// Present only in the top-up variant.
    pub topup_seats: Option<u32>,
    /// Legacy-unit names, in table order.
    pub formed_from: Vec<String>,

    pub formed_from_ids: BTreeSet<String>,
    pub votes: PartyVotes,
    pub geometry: Option<MultiPolygon<f64>>,
    pub seat_allocations: SeatAllocation,
    pub topup_seat_allocations: Option<SeatAllocation>,
}

impl TargetConstituency {
    pub fn new(
        name: impl Into<String>,
        electorate: impl Into<String>,
        seats: u32,
        topup_seats: Option<u32>,
        formed_from: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            electorate: electorate.into(),
            seats,
            topup_seats,
            formed_from,
            formed_from_ids: BTreeSet::new(),
            votes: PartyVotes::new(),
            geometry: None,
            seat_allocations: SeatAllocation::new(),
            topup_seat_allocations: None,
        }
    }

    /// Record `source_id` as one of the legacy units merged into this constituency.
    #[inline]
    pub fn claim_source(&mut self, source_id: &str) {
        if !self.formed_from_ids.contains(source_id) {
            self.formed_from_ids.insert(source_id.to_string());
        }
    }

    /// Record a matched source unit and its votes for one party.
    pub fn absorb(&mut self, record: &VoteRecord) -> Result<(), CoreError> {
        self.claim_source(&record.source_id);
        self.votes.add(&record.party, record.votes)
    }

    /// Record a matched source unit and every candidate's votes.
    /// A unit without candidates still counts as merged in.
    pub fn absorb_unit(&mut self, unit: &SourceUnit, independent_labels: &[String]) -> Result<(), CoreError> {
        self.claim_source(&unit.id);
        for c in &unit.candidates {
            self.votes.add(&c.party_key(independent_labels), c.votes)?;
        }
        Ok(())
    }

    /// True once every legacy unit has exactly one matched identifier.
    #[inline]
    pub fn is_fully_matched(&self) -> bool {
        self.formed_from_ids.len() == self.formed_from.len()
    }
}

/// One party's votes in one source unit (flat results format).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub source_id: String,
    pub source_name: String,
    pub party: PartyKey,
    pub votes: u64,
}

/// A candidate row in the richer per-unit results format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub party: Option<String>,
    pub votes: u64,
}

impl Candidate {
    /// Party key: the label, or `"<first> <last>"` for unaffiliated candidates
    /// (blank label, or a label listed in `independent_labels`, case-insensitive).
    pub fn party_key(&self, independent_labels: &[String]) -> PartyKey {
        let label = self.party.as_deref().map(str::trim).unwrap_or("");
        let unaffiliated = label.is_empty()
            || independent_labels
                .iter()
                .any(|l| l.trim().eq_ignore_ascii_case(label));
        if unaffiliated {
            format!("{} {}", self.first_name.trim(), self.last_name.trim())
        } else {
            label.to_string()
        }
    }
}

/// A legacy electoral division as reported by the richer results source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    pub id: String,
    pub name: String,
    pub candidates: Vec<Candidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(first: &str, last: &str, party: Option<&str>, votes: u64) -> Candidate {
        Candidate {
            first_name: first.into(),
            last_name: last.into(),
            party: party.map(str::to_string),
            votes,
        }
    }

    #[test]
    fn independents_are_keyed_by_full_name() {
        let labels = vec!["Independent".to_string()];
        assert_eq!(cand("Jo", "Bloggs", Some("independent"), 1).party_key(&labels), "Jo Bloggs");
        assert_eq!(cand("Jo", "Bloggs", None, 1).party_key(&labels), "Jo Bloggs");
        assert_eq!(cand("Jo", "Bloggs", Some("  "), 1).party_key(&labels), "Jo Bloggs");
        assert_eq!(cand("Jo", "Bloggs", Some("Green"), 1).party_key(&labels), "Green");
    }

    #[test]
    fn absorb_unit_adds_candidates_under_party_keys() {
        let mut c = TargetConstituency::new("FooBar", "100", 2, None, vec!["Foo".into(), "Bar".into()]);
        let foo = SourceUnit {
            id: "E1".into(),
            name: "Foo".into(),
            candidates: vec![cand("A", "One", Some("Lab"), 10), cand("B", "Two", None, 3)],
        };
        let bar = SourceUnit {
            id: "E2".into(),
            name: "Bar".into(),
            candidates: vec![],
        };
        c.absorb_unit(&foo, &[]).unwrap();
        c.absorb_unit(&bar, &[]).unwrap();
        assert_eq!(c.votes.get("Lab"), 10);
        assert_eq!(c.votes.get("B Two"), 3);
        assert!(c.is_fully_matched());
    }

    #[test]
    fn absorb_tracks_ids_as_a_set() {
        let mut c = TargetConstituency::new("FooBar", "100", 2, None, vec!["Foo".into()]);
        let rec = |party: &str, votes| VoteRecord {
            source_id: "E1".into(),
            source_name: "Foo".into(),
            party: party.into(),
            votes,
        };
        c.absorb(&rec("A", 60)).unwrap();
        c.absorb(&rec("B", 40)).unwrap();
        assert_eq!(c.formed_from_ids.len(), 1);
        assert!(c.is_fully_matched());
        assert_eq!(c.votes.total(), 100);
    }
}
