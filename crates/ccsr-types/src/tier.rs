//! Confidence tiers for resolved codes.

use std::fmt;

/// Confidence tier assigned to every queried code.
///
/// # Examples
///
/// ```
/// use ccsr_types::Tier;
///
/// assert_eq!(Tier::Semiautomatic.as_str(), "semiautomatic");
/// assert_eq!(Tier::from_name("failed"), Some(Tier::Failed));
/// assert!(Tier::Automatic.is_mapped());
/// assert!(!Tier::Failed.is_mapped());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Tier {
    /// The code exists verbatim in the reference table.
    Direct,
    /// A prefix match agrees on exactly one category.
    Automatic,
    /// A prefix match yields several candidate categories; needs review.
    Semiautomatic,
    /// No exact or prefix match above the length floor.
    Failed,
}

impl Tier {
    /// All tiers in output order.
    pub const ALL: [Tier; 4] = [
        Tier::Direct,
        Tier::Automatic,
        Tier::Semiautomatic,
        Tier::Failed,
    ];

    /// Returns the lowercase tag used in output tables.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Automatic => "automatic",
            Self::Semiautomatic => "semiautomatic",
            Self::Failed => "failed",
        }
    }

    /// Parses a tier from its lowercase tag.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "direct" => Some(Self::Direct),
            "automatic" => Some(Self::Automatic),
            "semiautomatic" => Some(Self::Semiautomatic),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns true if the tier carries at least one category.
    pub fn is_mapped(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip() {
        for tier in Tier::ALL {
            assert_eq!(Tier::from_name(tier.as_str()), Some(tier));
            assert_eq!(tier.to_string(), tier.as_str());
        }
        assert_eq!(Tier::from_name("Direct"), None);
    }
}
