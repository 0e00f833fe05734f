//! RFC 2119 requirement levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normative strength of an assertion.
///
/// Variants are declared from weakest to strongest so the derived ordering
/// can be used to compare severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RequirementLevel {
    #[serde(rename = "MAY")]
    May,
    #[serde(rename = "OPTIONAL")]
    Optional,
    #[serde(rename = "SHOULD")]
    Should,
    #[serde(rename = "SHOULD NOT")]
    ShouldNot,
    #[serde(rename = "RECOMMENDED")]
    Recommended,
    #[serde(rename = "NOT RECOMMENDED")]
    NotRecommended,
    #[serde(rename = "MUST")]
    Must,
    #[serde(rename = "MUST NOT")]
    MustNot,
    #[serde(rename = "SHALL")]
    Shall,
    #[serde(rename = "SHALL NOT")]
    ShallNot,
    #[serde(rename = "REQUIRED")]
    Required,
}

impl RequirementLevel {
    /// All levels, weakest first.
    pub const ALL: [RequirementLevel; 11] = [
        Self::May,
        Self::Optional,
        Self::Should,
        Self::ShouldNot,
        Self::Recommended,
        Self::NotRecommended,
        Self::Must,
        Self::MustNot,
        Self::Shall,
        Self::ShallNot,
        Self::Required,
    ];

    /// The RFC 2119 keyword for this level.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::May => "MAY",
            Self::Optional => "OPTIONAL",
            Self::Should => "SHOULD",
            Self::ShouldNot => "SHOULD NOT",
            Self::Recommended => "RECOMMENDED",
            Self::NotRecommended => "NOT RECOMMENDED",
            Self::Must => "MUST",
            Self::MustNot => "MUST NOT",
            Self::Shall => "SHALL",
            Self::ShallNot => "SHALL NOT",
            Self::Required => "REQUIRED",
        }
    }

    /// Whether a violation makes an implementation non-compliant.
    pub fn is_mandatory(&self) -> bool {
        *self >= Self::Must
    }
}

impl fmt::Display for RequirementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Error returned when parsing an unknown keyword.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown requirement level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for RequirementLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_ascii_uppercase()
            .replace(['-', '_'], " ");

        Self::ALL
            .iter()
            .copied()
            .find(|level| level.keyword() == normalized)
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_keyword() {
        assert_eq!(RequirementLevel::MustNot.to_string(), "MUST NOT");
        assert_eq!(RequirementLevel::Required.to_string(), "REQUIRED");
    }

    #[test]
    fn test_parse_spellings() {
        assert_eq!("must".parse::<RequirementLevel>().unwrap(), RequirementLevel::Must);
        assert_eq!(
            "must-not".parse::<RequirementLevel>().unwrap(),
            RequirementLevel::MustNot
        );
        assert_eq!(
            "SHOULD_NOT".parse::<RequirementLevel>().unwrap(),
            RequirementLevel::ShouldNot
        );
        assert_eq!(
            " not recommended ".parse::<RequirementLevel>().unwrap(),
            RequirementLevel::NotRecommended
        );
        assert!("often".parse::<RequirementLevel>().is_err());
    }

    #[test]
    fn test_ordering_by_strength() {
        assert!(RequirementLevel::May < RequirementLevel::Should);
        assert!(RequirementLevel::Should < RequirementLevel::Must);
        assert!(RequirementLevel::Must < RequirementLevel::Required);
    }

    #[test]
    fn test_mandatory_levels() {
        assert!(RequirementLevel::Must.is_mandatory());
        assert!(RequirementLevel::MustNot.is_mandatory());
        assert!(RequirementLevel::Required.is_mandatory());
        assert!(!RequirementLevel::Should.is_mandatory());
        assert!(!RequirementLevel::Optional.is_mandatory());
    }

    #[test]
    fn test_every_keyword_round_trips() {
        for level in RequirementLevel::ALL {
            assert_eq!(level.keyword().parse::<RequirementLevel>().unwrap(), level);
        }
    }
}
