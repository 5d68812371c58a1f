//! Name-matching strategies between a source unit's display name and a
//! constituency's legacy-unit names.
//!
//! Two strategies are observed across data sources:
//! - `ExactMatcher`: byte-for-byte equality.
//! - `TokenSetMatcher`: equality of normalized lowercase token sets.
//!
//! Both sit behind `NameMatcher` so the aggregation loop never changes when a
//! new source needs a new rule.

use std::collections::{BTreeMap, BTreeSet};

use mm_core::variables::{MatchStrategy, Params};

pub trait NameMatcher {
    /// Stable token used in logs.
    fn name(&self) -> &'static str;

    /// True if `source` (as reported by the results) names `legacy`
    /// (as written in the constituency table).
    fn matches(&self, source: &str, legacy: &str) -> bool;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ExactMatcher;

impl NameMatcher for ExactMatcher {
    fn name(&self) -> &'static str {
        "exact"
    }

    #[inline]
    fn matches(&self, source: &str, legacy: &str) -> bool {
        source == legacy
    }
}

/// Token-set equality after normalization:
/// lowercase, `&` → `and`, commas dropped, trailing digits/whitespace trimmed,
/// whitespace split, then renamed localities expanded.
#[derive(Clone, Debug, Default)]
pub struct TokenSetMatcher {
    /// Lowercase single token → replacement phrase.
    renames: BTreeMap<String, String>,
}

impl TokenSetMatcher {
    pub fn new(renames: BTreeMap<String, String>) -> Self {
        Self { renames }
    }

    /// Normalized token set of `name`.
    pub fn tokens(&self, name: &str) -> BTreeSet<String> {
        let lowered = name.to_lowercase().replace('&', " and ").replace(',', "");
        let trimmed = lowered.trim_end_matches(|c: char| c.is_ascii_digit() || c.is_whitespace());

        let mut out = BTreeSet::new();
        for tok in trimmed.split_whitespace() {
            match self.renames.get(tok) {
                Some(phrase) => out.extend(phrase.to_lowercase().split_whitespace().map(str::to_string)),
                None => {
                    out.insert(tok.to_string());
                }
            }
        }
        out
    }
}

impl NameMatcher for TokenSetMatcher {
    fn name(&self) -> &'static str {
        "token_set"
    }

    fn matches(&self, source: &str, legacy: &str) -> bool {
        self.tokens(source) == self.tokens(legacy)
    }
}

/// Build the matcher selected by `params`.
pub fn matcher_for(params: &Params) -> Box<dyn NameMatcher> {
    match params.matcher {
        MatchStrategy::Exact => Box::new(ExactMatcher),
        MatchStrategy::TokenSet => Box::new(TokenSetMatcher::new(params.locality_renames.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hull() -> TokenSetMatcher {
        TokenSetMatcher::new(BTreeMap::from([(
            "hull".to_string(),
            "kingston upon hull".to_string(),
        )]))
    }

    #[test]
    fn exact_is_case_and_punctuation_sensitive() {
        let m = ExactMatcher;
        assert!(m.matches("Foo", "Foo"));
        assert!(!m.matches("foo", "Foo"));
        assert!(!m.matches("Foo, Bar", "Foo Bar"));
    }

    #[test]
    fn token_set_ignores_case_order_commas_and_trailing_noise() {
        let m = hull();
        assert!(m.matches("Birmingham, Selly Oak", "birmingham selly oak"));
        assert!(m.matches("Dorset Mid and Poole North", "Mid Dorset and North Poole"));
        assert!(m.matches("Foo Bar 2", "Foo Bar"));
        assert!(m.matches("Foo Bar  ", "foo bar"));
        assert!(!m.matches("Foo Bar East", "Foo Bar"));
    }

    #[test]
    fn ampersand_reads_as_and() {
        let m = hull();
        assert!(m.matches("Brighton Kemptown & Peacehaven", "Brighton Kemptown and Peacehaven"));
        assert!(m.matches("A&B", "a and b"));
    }

    #[test]
    fn renamed_locality_matches_current_name() {
        let m = hull();
        assert!(m.matches("Hull East", "Kingston upon Hull East"));
        assert!(m.matches("Kingston upon Hull East", "Kingston upon Hull East"));
        assert!(!m.matches("Hull East", "Kingston upon Hull West"));
    }

    #[test]
    fn matcher_for_follows_params() {
        let mut p = Params::default();
        assert_eq!(matcher_for(&p).name(), "exact");
        p.matcher = MatchStrategy::TokenSet;
        let m = matcher_for(&p);
        assert_eq!(m.name(), "token_set");
        assert!(m.matches("Hull North", "Kingston upon Hull North"));
    }
}
