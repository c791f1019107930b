//! Identity matching policy

use serde::{Deserialize, Serialize};
use tally_domain::field::collapse_whitespace;

/// How a looked-up identity value is compared with stored identity values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMatch {
    /// Byte-for-byte equality
    Exact,
    /// Equality after trimming, collapsing whitespace runs and case folding
    #[default]
    Normalized,
}

impl IdentityMatch {
    /// Comparison key for an identity value under this policy
    pub fn key(&self, value: &str) -> String {
        match self {
            IdentityMatch::Exact => value.to_string(),
            IdentityMatch::Normalized => collapse_whitespace(value).to_lowercase(),
        }
    }

    /// Whether a stored identity value matches the one being looked up
    pub fn matches(&self, stored: &str, wanted: &str) -> bool {
        match self {
            IdentityMatch::Exact => stored == wanted,
            IdentityMatch::Normalized => self.key(stored) == self.key(wanted),
        }
    }
}
