//! Listings Data

use jiff::Timestamp;
use mandi::{
    errors::ValidationError,
    geo::Coordinates,
    listings::{
        DEFAULT_CURRENCY, Listing, ListingImage, ListingImageUuid, ListingStatus, ListingUuid,
        PriceType, QuantityUnit, UserUuid, Visibility,
    },
};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// New Listing Image Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListingImage {
    pub uuid: ListingImageUuid,
    pub reference: String,
    pub caption: Option<String>,
}

impl From<NewListingImage> for ListingImage {
    fn from(image: NewListingImage) -> Self {
        Self {
            uuid: image.uuid,
            reference: image.reference,
            caption: image.caption,
        }
    }
}

/// New Listing Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub uuid: ListingUuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub crop: String,
    pub variety: Option<String>,
    pub grade: Option<String>,
    pub available_quantity: Decimal,
    pub quantity_unit: QuantityUnit,
    pub price_per_unit: Decimal,
    pub currency: Option<String>,
    pub price_type: PriceType,
    pub market_price_source: Option<String>,
    pub location: Option<Coordinates>,
    pub address: Option<String>,
    pub pincode: Option<String>,
    pub visibility: Visibility,
    pub published: bool,
    pub metadata: Map<String, Value>,
    pub images: Vec<NewListingImage>,
}

impl NewListing {
    /// Build the listing owned by `seller`, created at `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the listing breaks an invariant.
    pub fn into_listing(self, seller: UserUuid, now: Timestamp) -> Result<Listing, ValidationError> {
        let listing = Listing {
            uuid: self.uuid,
            seller,
            title: self.title,
            description: self.description,
            category: self.category,
            crop: self.crop,
            variety: self.variety,
            grade: self.grade,
            available_quantity: self.available_quantity,
            quantity_unit: self.quantity_unit,
            price_per_unit: self.price_per_unit,
            currency: self
                .currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            price_type: self.price_type,
            market_price_source: self.market_price_source,
            market_price: None,
            location: self.location,
            address: self.address,
            pincode: self.pincode,
            visibility: self.visibility,
            published: self.published,
            status: ListingStatus::Active,
            metadata: self.metadata,
            images: self.images.into_iter().map(ListingImage::from).collect(),
            created_at: now,
            updated_at: now,
        };

        listing.validate()?;

        Ok(listing)
    }
}

/// Listing Update Data
///
/// `None` leaves a field unchanged. Nullable fields use a nested `Option` so a full update
/// can clear them. `images`, when present, replaces every image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub crop: Option<String>,
    pub variety: Option<Option<String>>,
    pub grade: Option<Option<String>>,
    pub available_quantity: Option<Decimal>,
    pub quantity_unit: Option<QuantityUnit>,
    pub price_per_unit: Option<Decimal>,
    pub currency: Option<String>,
    pub price_type: Option<PriceType>,
    pub market_price_source: Option<Option<String>>,
    pub location: Option<Option<Coordinates>>,
    pub address: Option<Option<String>>,
    pub pincode: Option<Option<String>>,
    pub visibility: Option<Visibility>,
    pub published: Option<bool>,
    pub status: Option<ListingStatus>,
    pub metadata: Option<Map<String, Value>>,
    pub images: Option<Vec<NewListingImage>>,
}

impl ListingUpdate {
    /// Apply the update to `listing` at `now`, returning the updated listing and the
    /// replacement images, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the result breaks an invariant or the status is
    /// not one a seller may set.
    pub fn apply_to(
        self,
        mut listing: Listing,
        now: Timestamp,
    ) -> Result<(Listing, Option<Vec<NewListingImage>>), ValidationError> {
        if let Some(status) = self.status {
            if !matches!(status, ListingStatus::Active | ListingStatus::Inactive) {
                return Err(ValidationError::StatusNotSettable(status));
            }

            listing.status = status;
        }

        if let Some(market_price_source) = self.market_price_source {
            if market_price_source != listing.market_price_source {
                listing.market_price = None;
            }

            listing.market_price_source = market_price_source;
        }

        replace(&mut listing.title, self.title);
        replace(&mut listing.description, self.description);
        replace(&mut listing.category, self.category);
        replace(&mut listing.crop, self.crop);
        replace(&mut listing.variety, self.variety);
        replace(&mut listing.grade, self.grade);
        replace(&mut listing.available_quantity, self.available_quantity);
        replace(&mut listing.quantity_unit, self.quantity_unit);
        replace(&mut listing.price_per_unit, self.price_per_unit);
        replace(&mut listing.currency, self.currency);
        replace(&mut listing.price_type, self.price_type);
        replace(&mut listing.location, self.location);
        replace(&mut listing.address, self.address);
        replace(&mut listing.pincode, self.pincode);
        replace(&mut listing.visibility, self.visibility);
        replace(&mut listing.published, self.published);
        replace(&mut listing.metadata, self.metadata);

        if let Some(images) = &self.images {
            listing.images = images.iter().cloned().map(ListingImage::from).collect();
        }

        listing.touch(now);
        listing.validate()?;

        Ok((listing, self.images))
    }
}

fn replace<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}
