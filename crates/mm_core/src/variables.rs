//! variables.rs: run parameters with safe defaults.
//!
//! Every field is optional on the wire (`#[serde(default)]`), so a params file
//! only needs to name what it overrides.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Define a serde'd enum with explicit wire tokens, plus `FromStr`/`Display`
/// over the same tokens (used by the CLI).
macro_rules! serde_enum {
    ($name:ident => { $($variant:ident = $token:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_token(self) -> &'static str {
                match self {
                    $( $name::$variant => $token, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_token())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let norm = s.trim().replace('-', "_");
                match norm.as_str() {
                    $( $token => Ok($name::$variant), )+
                    _ => Err(CoreError::InvalidToken(s.to_string())),
                }
            }
        }
    };
}

serde_enum!(Variant => {
    Plain = "plain",
    TopUp = "top_up"
});

serde_enum!(MatchStrategy => {
    Exact    = "exact",
    TokenSet = "token_set"
});

serde_enum!(AmbiguityPolicy => {
    Reject     = "reject",
    FirstMatch = "first_match"
});

pub const DEFAULT_NATIONAL_TOPUP_SEATS: u32 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Plain multi-member, or multi-member plus national top-up.
    pub variant: Variant,
    pub matcher: MatchStrategy,
    pub ambiguity: AmbiguityPolicy,
    /// Seats allocated nationally over pooled votes (top-up variant only).
    pub national_topup_seats: u32,
    /// Feature property holding the unit id, one per boundary collection.
    pub geometry_id_properties: Vec<String>,
    /// Party labels treated as "no party" (case-insensitive).
    pub independent_labels: Vec<String>,
    /// Lowercase single-token locality → current name (token-set matcher only).
    pub locality_renames: BTreeMap<String, String>,
    pub results_has_header: bool,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            variant: Variant::Plain,
            matcher: MatchStrategy::Exact,
            ambiguity: AmbiguityPolicy::Reject,
            national_topup_seats: DEFAULT_NATIONAL_TOPUP_SEATS,
            geometry_id_properties: vec!["CODE".to_string(), "PC_ID".to_string()],
            independent_labels: vec![
                "Independent".to_string(),
                "Ind".to_string(),
                "No label".to_string(),
            ],
            locality_renames: BTreeMap::from([(
                "hull".to_string(),
                "kingston upon hull".to_string(),
            )]),
            results_has_header: false,
        }
    }
}

impl Params {
    #[inline]
    pub fn is_top_up(&self) -> bool {
        self.variant == Variant::TopUp
    }
}

/// Domain checks that serde alone cannot express.
pub fn validate_domains(p: &Params) -> Result<(), CoreError> {
    if p.geometry_id_properties.iter().any(|k| k.trim().is_empty()) {
        return Err(CoreError::DomainOutOfRange("geometry_id_properties"));
    }
    for (from, to) in &p.locality_renames {
        let single_lower_token = !from.is_empty()
            && !from.chars().any(char::is_whitespace)
            && from.to_lowercase() == *from;
        if !single_lower_token || to.trim().is_empty() {
            return Err(CoreError::DomainOutOfRange("locality_renames"));
        }
    }
    Ok(())
}
