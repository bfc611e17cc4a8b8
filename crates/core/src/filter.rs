//! Filter Pipeline
//!
//! Narrows a set of listings to those a viewer may see and that match the caller's criteria.
//! Criteria arrive as raw strings from a query string. Numeric bounds that fail to parse are
//! ignored; enumerated values that fail to parse are rejected.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    buyers::{BuyerCategory, Viewer},
    errors::ValidationError,
    listings::{Listing, PriceType, QuantityUnit},
    visibility::{is_visible, is_visible_to_category},
};

/// Raw filter input, one optional string per query parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Free text matched against title, description, crop and variety.
    pub search: Option<String>,

    /// Category, matched case-insensitively.
    pub category: Option<String>,

    /// Crop, matched case-insensitively.
    pub crop: Option<String>,

    /// Price type tag.
    pub price_type: Option<String>,

    /// Quantity unit tag.
    pub unit: Option<String>,

    /// Inclusive lower price bound.
    pub min_price: Option<String>,

    /// Inclusive upper price bound.
    pub max_price: Option<String>,

    /// Inclusive lower bound on available quantity.
    pub min_quantity: Option<String>,

    /// Buyer category the results must be visible to.
    pub buyer_category: Option<String>,
}

/// Parsed filter criteria. Every criterion is optional and they combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListingFilter {
    /// Lowercased free text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// Lowercased category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Lowercased crop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<String>,

    /// Price Type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_type: Option<PriceType>,

    /// Unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<QuantityUnit>,

    /// Min Price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,

    /// Max Price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,

    /// Min Quantity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_quantity: Option<Decimal>,

    /// Buyer Category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_category: Option<BuyerCategory>,
}

impl ListingFilter {
    /// Parse raw parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an unknown price type, unit or buyer category.
    pub fn parse(params: &FilterParams) -> Result<Self, ValidationError> {
        Ok(Self {
            search: present(params.search.as_deref()).map(fold),
            category: present(params.category.as_deref()).map(fold),
            crop: present(params.crop.as_deref()).map(fold),
            price_type: present(params.price_type.as_deref())
                .map(str::parse)
                .transpose()?,
            unit: present(params.unit.as_deref()).map(str::parse).transpose()?,
            min_price: lenient_decimal(params.min_price.as_deref()),
            max_price: lenient_decimal(params.max_price.as_deref()),
            min_quantity: lenient_decimal(params.min_quantity.as_deref()),
            buyer_category: present(params.buyer_category.as_deref())
                .map(str::parse)
                .transpose()?,
        })
    }

    /// Whether `listing` satisfies every criterion.
    pub fn matches(&self, listing: &Listing) -> bool {
        self.search
            .as_deref()
            .is_none_or(|needle| matches_text(listing, needle))
            && self
                .category
                .as_deref()
                .is_none_or(|category| fold(&listing.category) == *category)
            && self
                .crop
                .as_deref()
                .is_none_or(|crop| fold(&listing.crop) == *crop)
            && self
                .price_type
                .is_none_or(|price_type| listing.price_type == price_type)
            && self.unit.is_none_or(|unit| listing.quantity_unit == unit)
            && self
                .min_price
                .is_none_or(|min| listing.price_per_unit >= min)
            && self
                .max_price
                .is_none_or(|max| listing.price_per_unit <= max)
            && self
                .min_quantity
                .is_none_or(|min| listing.available_quantity >= min)
            && self
                .buyer_category
                .is_none_or(|category| is_visible_to_category(listing, category))
    }
}

impl TryFrom<&FilterParams> for ListingFilter {
    type Error = ValidationError;

    fn try_from(params: &FilterParams) -> Result<Self, Self::Error> {
        Self::parse(params)
    }
}

/// Whether `listing` is on offer to buyers at all: published, active and in stock.
pub fn is_browsable(listing: &Listing) -> bool {
    listing.is_eligible() && listing.available_quantity > Decimal::ZERO
}

/// Keep the listings that are on offer, visible to `viewer` and match `filter`, in input
/// order.
///
/// A viewer without a buyer category browses as the filter's `buyer_category` when one is
/// given. Restricted listings are hidden only when neither supplies a category.
pub fn filter_listings<I>(listings: I, filter: &ListingFilter, viewer: Viewer) -> Vec<Listing>
where
    I: IntoIterator<Item = Listing>,
{
    let viewer = effective_viewer(viewer, filter.buyer_category);

    listings
        .into_iter()
        .filter(|listing| {
            is_browsable(listing) && is_visible(listing, viewer) && filter.matches(listing)
        })
        .collect()
}

fn effective_viewer(viewer: Viewer, requested: Option<BuyerCategory>) -> Viewer {
    match (viewer, requested) {
        (Viewer::Anonymous, Some(category)) => Viewer::Buyer(category),
        (viewer, _) => viewer,
    }
}

fn matches_text(listing: &Listing, needle: &str) -> bool {
    [
        Some(listing.title.as_str()),
        Some(listing.description.as_str()),
        Some(listing.crop.as_str()),
        listing.variety.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|haystack| fold(haystack).contains(needle))
}

/// Unicode lowercase, shared by every text criterion.
fn fold(value: &str) -> String {
    value.to_lowercase()
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn lenient_decimal(value: Option<&str>) -> Option<Decimal> {
    present(value).and_then(|value| Decimal::from_str(value).ok())
}
