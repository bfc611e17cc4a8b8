//! Buyer Categories

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// The closed set of buyer segments a seller can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyerCategory {
    /// Wholesale mandi (market yard) owners.
    MandiOwner,

    /// Retail shopkeepers.
    Shopkeeper,

    /// Community groups buying in bulk.
    Community,
}

impl BuyerCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 3] = [Self::MandiOwner, Self::Shopkeeper, Self::Community];

    /// Wire tag, e.g. `mandi_owner`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MandiOwner => "mandi_owner",
            Self::Shopkeeper => "shopkeeper",
            Self::Community => "community",
        }
    }

    /// Human-readable label, e.g. `Mandi Owner`.
    pub const fn label(self) -> &'static str {
        match self {
            Self::MandiOwner => "Mandi Owner",
            Self::Shopkeeper => "Shopkeeper",
            Self::Community => "Community",
        }
    }
}

impl Display for BuyerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuyerCategory {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| ValidationError::UnknownBuyerCategory(value.to_string()))
    }
}

/// Who is looking at a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    /// Staff and administrators see everything.
    Staff,

    /// A buyer with a known category.
    Buyer(BuyerCategory),

    /// A caller without a buyer category: unauthenticated callers and sellers.
    Anonymous,
}

impl Viewer {
    /// The viewer's buyer category, if any.
    pub const fn category(self) -> Option<BuyerCategory> {
        match self {
            Self::Buyer(category) => Some(category),
            Self::Staff | Self::Anonymous => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_every_wire_tag() -> TestResult {
        for category in BuyerCategory::ALL {
            assert_eq!(category.as_str().parse::<BuyerCategory>()?, category);
        }

        Ok(())
    }

    #[test]
    fn unknown_tag_is_a_validation_error() {
        let result = "wholesaler".parse::<BuyerCategory>();

        assert_eq!(
            result,
            Err(ValidationError::UnknownBuyerCategory("wholesaler".to_string()))
        );
    }

    #[test]
    fn tags_are_case_sensitive() {
        assert!(
            "Shopkeeper".parse::<BuyerCategory>().is_err(),
            "categories are a closed lowercase contract"
        );
    }

    #[test]
    fn serde_uses_snake_case_tags() -> TestResult {
        let json = serde_json::to_string(&BuyerCategory::MandiOwner)?;

        assert_eq!(json, r#""mandi_owner""#);

        Ok(())
    }
}
