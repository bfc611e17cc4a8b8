//! Listing Projection
//!
//! The public, camelCase shape of a listing handed to API clients.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    buyers::BuyerCategory,
    listings::{
        Listing, ListingImageUuid, ListingStatus, ListingUuid, MarketPriceSnapshot, PriceType,
        QuantityUnit, UserUuid,
    },
    ranking::Ranked,
};

/// Public listing representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    /// Listing id.
    pub id: ListingUuid,

    /// Owning seller.
    pub seller_id: UserUuid,

    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Category
    pub category: String,

    /// Crop
    pub crop: String,

    /// Variety
    pub variety: Option<String>,

    /// Grade
    pub grade: Option<String>,

    /// Available Quantity
    pub available_quantity: Decimal,

    /// Quantity Unit
    pub quantity_unit: QuantityUnit,

    /// Price Per Unit
    pub price_per_unit: Decimal,

    /// Currency
    pub currency: String,

    /// Price Type
    pub price_type: PriceType,

    /// Market Price Source
    pub market_price_source: Option<String>,

    /// Cached mandi price.
    pub market_price: Option<MarketPriceView>,

    /// Location, `null` when the listing has no coordinates.
    pub location: Option<LocationView>,

    /// Buyer categories allowed to see the listing.
    pub buyer_category_visibility: Vec<BuyerCategory>,

    /// `All Buyers` or the allowed category labels.
    pub target_buyers_display: String,

    /// Price multiplied by quantity.
    pub total_value: Decimal,

    /// Published
    pub is_published: bool,

    /// Status
    pub status: ListingStatus,

    /// Metadata
    pub metadata: Map<String, Value>,

    /// Images in display order.
    pub images: Vec<ImageView>,

    /// Created At
    pub created_at: Timestamp,

    /// Updated At
    pub updated_at: Timestamp,

    /// Meters from the search origin, present only when one was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<u64>,
}

/// Location block of a [`ListingView`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationView {
    /// Latitude
    pub latitude: f64,

    /// Longitude
    pub longitude: f64,

    /// Address
    pub address: Option<String>,

    /// Pincode
    pub pincode: Option<String>,
}

/// Image entry of a [`ListingView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageView {
    /// Image id.
    pub id: ListingImageUuid,

    /// URL or storage key.
    pub reference: String,

    /// Caption
    pub caption: Option<String>,
}

/// Cached mandi price of a [`ListingView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPriceView {
    /// Commodity
    pub commodity: String,

    /// Market
    pub market: String,

    /// District
    pub district: String,

    /// State
    pub state: String,

    /// Arrival Date
    pub arrival_date: String,

    /// Min Price
    pub min_price: Decimal,

    /// Max Price
    pub max_price: Decimal,

    /// Modal Price
    pub modal_price: Decimal,

    /// Fetched At
    pub fetched_at: Timestamp,
}

impl From<MarketPriceSnapshot> for MarketPriceView {
    fn from(snapshot: MarketPriceSnapshot) -> Self {
        Self {
            commodity: snapshot.commodity,
            market: snapshot.market,
            district: snapshot.district,
            state: snapshot.state,
            arrival_date: snapshot.arrival_date,
            min_price: snapshot.min_price,
            max_price: snapshot.max_price,
            modal_price: snapshot.modal_price,
            fetched_at: snapshot.fetched_at,
        }
    }
}

/// Project a listing, attaching `distance_meters` when it was computed.
pub fn project(listing: Listing, distance_meters: Option<u64>) -> ListingView {
    let target_buyers_display = listing.target_buyers_display();
    let total_value = listing.total_value();

    let location = listing.location.map(|coordinates| LocationView {
        latitude: coordinates.latitude(),
        longitude: coordinates.longitude(),
        address: listing.address.clone(),
        pincode: listing.pincode.clone(),
    });

    ListingView {
        id: listing.uuid,
        seller_id: listing.seller,
        title: listing.title,
        description: listing.description,
        category: listing.category,
        crop: listing.crop,
        variety: listing.variety,
        grade: listing.grade,
        available_quantity: listing.available_quantity,
        quantity_unit: listing.quantity_unit,
        price_per_unit: listing.price_per_unit,
        currency: listing.currency,
        price_type: listing.price_type,
        market_price_source: listing.market_price_source,
        market_price: listing.market_price.map(MarketPriceView::from),
        location,
        buyer_category_visibility: listing.visibility.into_vec(),
        target_buyers_display,
        total_value,
        is_published: listing.published,
        status: listing.status,
        metadata: listing.metadata,
        images: listing
            .images
            .into_iter()
            .map(|image| ImageView {
                id: image.uuid,
                reference: image.reference,
                caption: image.caption,
            })
            .collect(),
        created_at: listing.created_at,
        updated_at: listing.updated_at,
        distance_meters,
    }
}

impl From<Listing> for ListingView {
    fn from(listing: Listing) -> Self {
        project(listing, None)
    }
}

impl From<Ranked> for ListingView {
    fn from(ranked: Ranked) -> Self {
        project(ranked.listing, ranked.distance_meters)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;
    use crate::{
        geo::Coordinates,
        listings::{ListingImage, fixtures::listing, parse_visibility},
    };

    #[test]
    fn location_is_null_without_coordinates() -> TestResult {
        let mut onions = listing("Onions", 20);
        onions.address = Some("APMC Yard".to_string());

        let json = serde_json::to_value(project(onions, None))?;

        assert_eq!(json.get("location"), Some(&Value::Null));
        assert!(
            json.get("distanceMeters").is_none(),
            "distance is omitted when not computed"
        );

        Ok(())
    }

    #[test]
    fn location_carries_address_and_pincode() -> TestResult {
        let mut onions = listing("Onions", 20);
        onions.location = Some(Coordinates::new(20.0, 74.0)?);
        onions.address = Some("APMC Yard".to_string());
        onions.pincode = Some("422001".to_string());

        let json = serde_json::to_value(project(onions, Some(42)))?;

        assert_eq!(
            json.get("location"),
            Some(&json!({
                "latitude": 20.0,
                "longitude": 74.0,
                "address": "APMC Yard",
                "pincode": "422001",
            }))
        );
        assert_eq!(json.get("distanceMeters"), Some(&json!(42)));

        Ok(())
    }

    #[test]
    fn uses_camel_case_and_derived_fields() -> TestResult {
        let mut onions = listing("Onions", 20);
        onions.visibility = parse_visibility(["shopkeeper"])?;

        let json = serde_json::to_value(ListingView::from(onions))?;

        assert_eq!(json.get("targetBuyersDisplay"), Some(&json!("Shopkeeper")));
        assert_eq!(json.get("totalValue"), Some(&json!("2000")));
        assert_eq!(json.get("pricePerUnit"), Some(&json!("20")));
        assert_eq!(json.get("quantityUnit"), Some(&json!("kg")));
        assert_eq!(json.get("priceType"), Some(&json!("fixed")));
        assert_eq!(
            json.get("buyerCategoryVisibility"),
            Some(&json!(["shopkeeper"]))
        );
        assert_eq!(json.get("isPublished"), Some(&json!(true)));

        Ok(())
    }

    #[test]
    fn images_keep_their_order() {
        let mut onions = listing("Onions", 20);
        onions.images = ["front.jpg", "back.jpg"]
            .into_iter()
            .map(|reference| ListingImage {
                uuid: ListingImageUuid::new(),
                reference: reference.to_string(),
                caption: None,
            })
            .collect();

        let view = project(onions, None);

        assert_eq!(
            view.images
                .iter()
                .map(|image| image.reference.as_str())
                .collect::<Vec<_>>(),
            ["front.jpg", "back.jpg"]
        );
    }
}
