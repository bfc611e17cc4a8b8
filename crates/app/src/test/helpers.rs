//! Test Helpers

use mandi::listings::{ListingImageUuid, ListingUuid, PriceType, QuantityUnit, Visibility};
use rust_decimal::Decimal;
use serde_json::Map;

use crate::domain::listings::data::{NewListing, NewListingImage};

/// A published, fixed price listing visible to every buyer category.
pub(crate) fn new_listing(title: &str, price: i64) -> NewListing {
    NewListing {
        uuid: ListingUuid::new(),
        title: title.to_string(),
        description: format!("{title} from Nashik"),
        category: "vegetables".to_string(),
        crop: "onion".to_string(),
        variety: None,
        grade: None,
        available_quantity: Decimal::new(40, 0),
        quantity_unit: QuantityUnit::Quintal,
        price_per_unit: Decimal::new(price, 0),
        currency: None,
        price_type: PriceType::Fixed,
        market_price_source: None,
        location: None,
        address: None,
        pincode: None,
        visibility: Visibility::new(),
        published: true,
        metadata: Map::new(),
        images: Vec::new(),
    }
}

pub(crate) fn new_image(reference: &str) -> NewListingImage {
    NewListingImage {
        uuid: ListingImageUuid::new(),
        reference: reference.to_string(),
        caption: None,
    }
}
