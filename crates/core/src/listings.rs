//! Listings
//!
//! The sellable unit of the marketplace: a quantity of produce offered at a price, with an
//! optional location and an optional restriction on which buyer categories may see it.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;

use crate::{
    buyers::BuyerCategory,
    errors::ValidationError,
    geo::Coordinates,
    uuids::TypedUuid,
};

/// Currency used when a listing does not name one.
pub const DEFAULT_CURRENCY: &str = "INR";

/// A seller, buyer or staff member known to the identity provider.
#[derive(Debug, Clone, Copy)]
pub struct User;

/// User Uuid
pub type UserUuid = TypedUuid<User>;

/// Listing Uuid
pub type ListingUuid = TypedUuid<Listing>;

/// Listing Image Uuid
pub type ListingImageUuid = TypedUuid<ListingImage>;

/// Buyer categories a listing is restricted to. Empty means visible to everyone.
pub type Visibility = SmallVec<[BuyerCategory; 3]>;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $error:ident {
            $($(#[$variant_meta:meta])* $variant:ident => $tag:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$variant_meta])* $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &[Self] = &[$(Self::$variant),+];

            /// Wire tag.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $tag),+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($tag => Ok(Self::$variant),)+
                    other => Err(ValidationError::$error(other.to_string())),
                }
            }
        }
    };
}

wire_enum! {
    /// Unit the available quantity and price are expressed in.
    QuantityUnit, UnknownQuantityUnit {
        /// Kilogram.
        Kg => "kg",
        /// Quintal (100 kg).
        Quintal => "quintal",
        /// Metric tonne.
        Tonne => "tonne",
        /// Individual piece.
        Piece => "piece",
        /// Box.
        Box => "box",
    }
}

wire_enum! {
    /// How the price per unit was set.
    PriceType, UnknownPriceType {
        /// Seller's fixed price.
        Fixed => "fixed",
        /// Open to negotiation.
        Negotiable => "negotiable",
        /// Tracks a mandi price source.
        MarketLinked => "market_linked",
    }
}

wire_enum! {
    /// Listing lifecycle state.
    ListingStatus, UnknownStatus {
        /// Offered for sale.
        Active => "active",
        /// Temporarily withdrawn by the seller.
        Inactive => "inactive",
        /// Soft deleted.
        Deleted => "deleted",
        /// Waiting for staff review.
        PendingModeration => "pending_moderation",
    }
}

/// A mandi price observation captured from the upstream price service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketPriceSnapshot {
    /// Commodity name as published upstream.
    pub commodity: String,

    /// State the market is in.
    pub state: String,

    /// District the market is in.
    pub district: String,

    /// Market (mandi) name.
    pub market: String,

    /// Commodity variety.
    pub variety: Option<String>,

    /// Commodity grade.
    pub grade: Option<String>,

    /// Arrival date as published upstream.
    pub arrival_date: String,

    /// Minimum price per quintal.
    pub min_price: Decimal,

    /// Maximum price per quintal.
    pub max_price: Decimal,

    /// Modal (most common) price per quintal.
    pub modal_price: Decimal,

    /// When the observation was fetched.
    pub fetched_at: Timestamp,
}

/// A reference to an image stored in an external blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingImage {
    /// Image id.
    pub uuid: ListingImageUuid,

    /// URL or storage key.
    pub reference: String,

    /// Optional caption.
    pub caption: Option<String>,
}

/// Listing
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    /// Listing id.
    pub uuid: ListingUuid,

    /// Owning seller.
    pub seller: UserUuid,

    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Produce category, e.g. `vegetables`.
    pub category: String,

    /// Crop, e.g. `onion`.
    pub crop: String,

    /// Variety
    pub variety: Option<String>,

    /// Grade
    pub grade: Option<String>,

    /// Quantity on offer.
    pub available_quantity: Decimal,

    /// Unit of [`Self::available_quantity`] and [`Self::price_per_unit`].
    pub quantity_unit: QuantityUnit,

    /// Price per unit.
    pub price_per_unit: Decimal,

    /// ISO 4217 currency code.
    pub currency: String,

    /// Price Type
    pub price_type: PriceType,

    /// Market the price tracks when [`PriceType::MarketLinked`].
    pub market_price_source: Option<String>,

    /// Last known mandi price for [`Self::market_price_source`].
    pub market_price: Option<MarketPriceSnapshot>,

    /// Where the produce is.
    pub location: Option<Coordinates>,

    /// Address
    pub address: Option<String>,

    /// Pincode
    pub pincode: Option<String>,

    /// Buyer categories allowed to see the listing.
    pub visibility: Visibility,

    /// Whether the seller has published the listing.
    pub published: bool,

    /// Status
    pub status: ListingStatus,

    /// Opaque seller metadata.
    pub metadata: Map<String, Value>,

    /// Images, in display order.
    pub images: Vec<ListingImage>,

    /// Created At
    pub created_at: Timestamp,

    /// Updated At
    pub updated_at: Timestamp,
}

impl Listing {
    /// Check the listing invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("title", &self.title),
            ("category", &self.category),
            ("crop", &self.crop),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::Blank(field));
            }
        }

        if self.price_per_unit < Decimal::ZERO {
            return Err(ValidationError::NegativePrice);
        }

        if self.available_quantity < Decimal::ZERO {
            return Err(ValidationError::NegativeQuantity);
        }

        if self.price_type == PriceType::MarketLinked
            && self
                .market_price_source
                .as_deref()
                .is_none_or(|source| source.trim().is_empty())
        {
            return Err(ValidationError::MissingMarketPriceSource);
        }

        validate_currency(&self.currency)?;

        Ok(())
    }

    /// Published and active, so offered to buyers.
    pub fn is_eligible(&self) -> bool {
        self.published && self.status == ListingStatus::Active
    }

    /// Whether every buyer category can see the listing.
    pub fn is_visible_to_all(&self) -> bool {
        self.visibility.is_empty()
            || BuyerCategory::ALL
                .iter()
                .all(|category| self.visibility.contains(category))
    }

    /// Price multiplied by available quantity.
    pub fn total_value(&self) -> Decimal {
        self.price_per_unit.saturating_mul(self.available_quantity)
    }

    /// `All Buyers`, or the labels of the allowed categories.
    pub fn target_buyers_display(&self) -> String {
        if self.visibility.is_empty() {
            return "All Buyers".to_string();
        }

        self.visibility
            .iter()
            .map(|category| category.label())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Advance `updated_at` to `now`, never moving it backwards.
    pub fn touch(&mut self, now: Timestamp) {
        self.updated_at = self.updated_at.max(now);
    }

    /// Soft delete: the record is kept but withdrawn from sale.
    #[must_use]
    pub fn soft_delete(mut self, now: Timestamp) -> Self {
        self.status = ListingStatus::Deleted;
        self.published = false;
        self.touch(now);

        self
    }
}

/// Check `code` is a known ISO 4217 currency.
///
/// # Errors
///
/// Returns [`ValidationError::UnknownCurrency`] for unknown codes.
pub fn validate_currency(code: &str) -> Result<(), ValidationError> {
    rusty_money::iso::find(code)
        .map(|_currency| ())
        .ok_or_else(|| ValidationError::UnknownCurrency(code.to_string()))
}

/// Parse buyer category tags, dropping duplicates but keeping first-seen order.
///
/// # Errors
///
/// Returns [`ValidationError::UnknownBuyerCategory`] for the first unknown tag.
pub fn parse_visibility<I, S>(tags: I) -> Result<Visibility, ValidationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut visibility = Visibility::new();

    for tag in tags {
        let category = tag.as_ref().parse::<BuyerCategory>()?;

        if !visibility.contains(&category) {
            visibility.push(category);
        }
    }

    Ok(visibility)
}

/// Combine optional latitude and longitude into [`Coordinates`].
///
/// # Errors
///
/// Returns an error when only one component is present or either is out of range.
pub fn coordinates_from_parts(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<Coordinates>, ValidationError> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Ok(Some(Coordinates::new(latitude, longitude)?)),
        (None, None) => Ok(None),
        _ => Err(ValidationError::IncompleteCoordinates),
    }
}


#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use testresult::TestResult;

    use super::{fixtures::listing, *};

    #[test]
    fn valid_listing_passes() -> TestResult {
        listing("Onions", 20).validate()?;

        Ok(())
    }

    #[test]
    fn rejects_negative_price() {
        let mut onions = listing("Onions", 20);
        onions.price_per_unit = Decimal::new(-1, 0);

        assert_eq!(onions.validate(), Err(ValidationError::NegativePrice));
    }

    #[test]
    fn rejects_negative_quantity() {
        let mut onions = listing("Onions", 20);
        onions.available_quantity = Decimal::new(-5, 1);

        assert_eq!(onions.validate(), Err(ValidationError::NegativeQuantity));
    }

    #[test]
    fn zero_price_and_quantity_are_allowed() -> TestResult {
        let mut onions = listing("Onions", 0);
        onions.available_quantity = Decimal::ZERO;

        onions.validate()?;

        Ok(())
    }

    #[test]
    fn market_linked_requires_a_source() {
        let mut onions = listing("Onions", 20);
        onions.price_type = PriceType::MarketLinked;

        assert_eq!(
            onions.validate(),
            Err(ValidationError::MissingMarketPriceSource)
        );

        onions.market_price_source = Some("Lasalgaon".to_string());

        assert!(onions.validate().is_ok(), "source satisfies the invariant");
    }

    #[test]
    fn rejects_unknown_currency() {
        let mut onions = listing("Onions", 20);
        onions.currency = "XYZ".to_string();

        assert_eq!(
            onions.validate(),
            Err(ValidationError::UnknownCurrency("XYZ".to_string()))
        );
    }

    #[test]
    fn rejects_blank_title() {
        let onions = listing("  ", 20);

        assert_eq!(onions.validate(), Err(ValidationError::Blank("title")));
    }

    #[test]
    fn soft_delete_unpublishes_and_keeps_the_record() -> TestResult {
        let onions = listing("Onions", 20);
        let uuid = onions.uuid;
        let now = Timestamp::UNIX_EPOCH.checked_add(1.hour())?;

        let deleted = onions.soft_delete(now);

        assert_eq!(deleted.uuid, uuid);
        assert_eq!(deleted.status, ListingStatus::Deleted);
        assert!(!deleted.published, "deleted listings are unpublished");
        assert_eq!(deleted.updated_at, now);

        Ok(())
    }

    #[test]
    fn touch_never_moves_updated_at_backwards() -> TestResult {
        let mut onions = listing("Onions", 20);
        let later = Timestamp::UNIX_EPOCH.checked_add(2.hours())?;
        onions.updated_at = later;

        onions.touch(Timestamp::UNIX_EPOCH);

        assert_eq!(onions.updated_at, later);

        Ok(())
    }

    #[test]
    fn total_value_multiplies_price_and_quantity() {
        let mut onions = listing("Onions", 25);
        onions.available_quantity = Decimal::new(125, 1);

        assert_eq!(onions.total_value(), Decimal::new(3125, 1));
    }

    #[test]
    fn target_buyers_display_lists_labels() -> TestResult {
        let mut onions = listing("Onions", 20);

        assert_eq!(onions.target_buyers_display(), "All Buyers");

        onions.visibility = parse_visibility(["mandi_owner", "community"])?;

        assert_eq!(onions.target_buyers_display(), "Mandi Owner, Community");

        Ok(())
    }

    #[test]
    fn parse_visibility_dedups_in_first_seen_order() -> TestResult {
        let visibility = parse_visibility(["shopkeeper", "community", "shopkeeper"])?;

        assert_eq!(
            visibility.as_slice(),
            &[BuyerCategory::Shopkeeper, BuyerCategory::Community]
        );

        Ok(())
    }

    #[test]
    fn parse_visibility_rejects_unknown_tags() {
        assert_eq!(
            parse_visibility(["shopkeeper", "farmer"]),
            Err(ValidationError::UnknownBuyerCategory("farmer".to_string()))
        );
    }

    #[test]
    fn coordinates_need_both_parts() {
        assert_eq!(
            coordinates_from_parts(Some(19.0), None),
            Err(ValidationError::IncompleteCoordinates)
        );
        assert_eq!(coordinates_from_parts(None, None), Ok(None));
    }

    #[test]
    fn wire_enums_parse_their_tags() -> TestResult {
        assert_eq!("quintal".parse::<QuantityUnit>()?, QuantityUnit::Quintal);
        assert_eq!(
            "market_linked".parse::<PriceType>()?,
            PriceType::MarketLinked
        );
        assert_eq!(
            "pending_moderation".parse::<ListingStatus>()?,
            ListingStatus::PendingModeration
        );
        assert_eq!(
            "litre".parse::<QuantityUnit>(),
            Err(ValidationError::UnknownQuantityUnit("litre".to_string()))
        );

        Ok(())
    }

    #[test]
    fn visible_to_all_when_every_category_is_listed() -> TestResult {
        let mut onions = listing("Onions", 20);
        onions.visibility = parse_visibility(["community", "shopkeeper", "mandi_owner"])?;

        assert!(onions.is_visible_to_all(), "all three tags equal no restriction");

        onions.visibility = parse_visibility(["community"])?;

        assert!(!onions.is_visible_to_all(), "a single tag is a restriction");

        Ok(())
    }
}
