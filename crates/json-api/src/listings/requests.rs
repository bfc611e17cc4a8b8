//! Listing Requests

use mandi::{
    errors::ValidationError,
    geo::Coordinates,
    listings::{
        ListingImageUuid, ListingStatus, ListingUuid, PriceType, QuantityUnit,
        coordinates_from_parts, parse_visibility,
    },
};
use mandi_app::domain::listings::data::{ListingUpdate, NewListing, NewListingImage};
use rust_decimal::Decimal;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use uuid::Uuid;

fn published_by_default() -> bool {
    true
}

fn default_unit() -> String {
    QuantityUnit::Kg.as_str().to_string()
}

fn default_price_type() -> String {
    PriceType::Fixed.as_str().to_string()
}

/// Present-but-null becomes `Some(None)`, absent stays `None`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Image reference attached to a listing.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub(crate) struct ImageRequest {
    /// Client-chosen id; generated when omitted
    pub uuid: Option<Uuid>,

    /// URL or storage key
    pub reference: String,

    pub caption: Option<String>,
}

impl TryFrom<ImageRequest> for NewListingImage {
    type Error = ValidationError;

    fn try_from(request: ImageRequest) -> Result<Self, Self::Error> {
        if request.reference.trim().is_empty() {
            return Err(ValidationError::Blank("reference"));
        }

        Ok(NewListingImage {
            uuid: request
                .uuid
                .map_or_else(ListingImageUuid::new, ListingImageUuid::from_uuid),
            reference: request.reference,
            caption: request.caption,
        })
    }
}

pub(crate) fn into_images(
    images: impl IntoIterator<Item = ImageRequest>,
) -> Result<Vec<NewListingImage>, ValidationError> {
    images.into_iter().map(NewListingImage::try_from).collect()
}

/// Add Images Request
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct AddImagesRequest {
    /// At least one image
    pub images: Vec<ImageRequest>,
}

impl AddImagesRequest {
    pub(crate) fn into_new_images(self) -> Result<Vec<NewListingImage>, ValidationError> {
        if self.images.is_empty() {
            return Err(ValidationError::Blank("images"));
        }

        into_images(self.images)
    }
}

/// Create Listing Request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateListingRequest {
    /// Client-chosen id; generated when omitted
    pub uuid: Option<Uuid>,

    pub title: String,

    #[serde(default)]
    pub description: String,

    pub category: String,

    pub crop: String,

    pub variety: Option<String>,

    pub grade: Option<String>,

    #[salvo(schema(value_type = String))]
    pub available_quantity: Decimal,

    /// kg, quintal, tonne, piece or box
    #[serde(default = "default_unit")]
    pub quantity_unit: String,

    #[salvo(schema(value_type = String))]
    pub price_per_unit: Decimal,

    /// ISO 4217 code, INR when omitted
    pub currency: Option<String>,

    /// fixed, negotiable or market_linked
    #[serde(default = "default_price_type")]
    pub price_type: String,

    /// Market whose mandi price a market linked listing follows
    pub market_price_source: Option<String>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    pub address: Option<String>,

    pub pincode: Option<String>,

    /// Buyer categories allowed to see the listing; empty means everyone
    #[serde(default)]
    pub buyer_category_visibility: SmallVec<[String; 3]>,

    #[serde(default = "published_by_default")]
    pub is_published: bool,

    #[serde(default)]
    #[salvo(schema(value_type = Object))]
    pub metadata: Map<String, Value>,

    #[serde(default)]
    pub images: Vec<ImageRequest>,
}

impl TryFrom<CreateListingRequest> for NewListing {
    type Error = ValidationError;

    fn try_from(request: CreateListingRequest) -> Result<Self, Self::Error> {
        Ok(NewListing {
            uuid: request
                .uuid
                .map_or_else(ListingUuid::new, ListingUuid::from_uuid),
            title: request.title,
            description: request.description,
            category: request.category,
            crop: request.crop,
            variety: request.variety,
            grade: request.grade,
            available_quantity: request.available_quantity,
            quantity_unit: request.quantity_unit.parse()?,
            price_per_unit: request.price_per_unit,
            currency: request.currency,
            price_type: request.price_type.parse()?,
            market_price_source: request.market_price_source,
            location: coordinates_from_parts(request.latitude, request.longitude)?,
            address: request.address,
            pincode: request.pincode,
            visibility: parse_visibility(&request.buyer_category_visibility)?,
            published: request.is_published,
            metadata: request.metadata,
            images: into_images(request.images)?,
        })
    }
}

/// Full Listing Update Request
///
/// Every field is replaced; omitted nullable fields are cleared.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReplaceListingRequest {
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub category: String,

    pub crop: String,

    pub variety: Option<String>,

    pub grade: Option<String>,

    #[salvo(schema(value_type = String))]
    pub available_quantity: Decimal,

    #[serde(default = "default_unit")]
    pub quantity_unit: String,

    #[salvo(schema(value_type = String))]
    pub price_per_unit: Decimal,

    pub currency: Option<String>,

    #[serde(default = "default_price_type")]
    pub price_type: String,

    pub market_price_source: Option<String>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    pub address: Option<String>,

    pub pincode: Option<String>,

    #[serde(default)]
    pub buyer_category_visibility: SmallVec<[String; 3]>,

    #[serde(default = "published_by_default")]
    pub is_published: bool,

    /// active or inactive
    pub status: Option<String>,

    #[serde(default)]
    #[salvo(schema(value_type = Object))]
    pub metadata: Map<String, Value>,

    /// Replaces every image when present
    pub images: Option<Vec<ImageRequest>>,
}

impl TryFrom<ReplaceListingRequest> for ListingUpdate {
    type Error = ValidationError;

    fn try_from(request: ReplaceListingRequest) -> Result<Self, Self::Error> {
        Ok(ListingUpdate {
            title: Some(request.title),
            description: Some(request.description),
            category: Some(request.category),
            crop: Some(request.crop),
            variety: Some(request.variety),
            grade: Some(request.grade),
            available_quantity: Some(request.available_quantity),
            quantity_unit: Some(request.quantity_unit.parse()?),
            price_per_unit: Some(request.price_per_unit),
            currency: request.currency,
            price_type: Some(request.price_type.parse()?),
            market_price_source: Some(request.market_price_source),
            location: Some(coordinates_from_parts(request.latitude, request.longitude)?),
            address: Some(request.address),
            pincode: Some(request.pincode),
            visibility: Some(parse_visibility(&request.buyer_category_visibility)?),
            published: Some(request.is_published),
            status: request
                .status
                .as_deref()
                .map(str::parse::<ListingStatus>)
                .transpose()?,
            metadata: Some(request.metadata),
            images: request.images.map(into_images).transpose()?,
        })
    }
}

/// Partial Listing Update Request
///
/// Omitted fields are left unchanged; `null` clears a nullable field.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PatchListingRequest {
    pub title: Option<String>,

    pub description: Option<String>,

    pub category: Option<String>,

    pub crop: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    #[salvo(schema(value_type = Option<String>))]
    pub variety: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[salvo(schema(value_type = Option<String>))]
    pub grade: Option<Option<String>>,

    #[salvo(schema(value_type = Option<String>))]
    pub available_quantity: Option<Decimal>,

    pub quantity_unit: Option<String>,

    #[salvo(schema(value_type = Option<String>))]
    pub price_per_unit: Option<Decimal>,

    pub currency: Option<String>,

    pub price_type: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    #[salvo(schema(value_type = Option<String>))]
    pub market_price_source: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[salvo(schema(value_type = Option<f64>))]
    pub latitude: Option<Option<f64>>,

    #[serde(default, deserialize_with = "nullable")]
    #[salvo(schema(value_type = Option<f64>))]
    pub longitude: Option<Option<f64>>,

    #[serde(default, deserialize_with = "nullable")]
    #[salvo(schema(value_type = Option<String>))]
    pub address: Option<Option<String>>,

    #[serde(default, deserialize_with = "nullable")]
    #[salvo(schema(value_type = Option<String>))]
    pub pincode: Option<Option<String>>,

    pub buyer_category_visibility: Option<SmallVec<[String; 3]>>,

    pub is_published: Option<bool>,

    pub status: Option<String>,

    #[salvo(schema(value_type = Option<Object>))]
    pub metadata: Option<Map<String, Value>>,

    pub images: Option<Vec<ImageRequest>>,
}

fn patch_location(
    latitude: Option<Option<f64>>,
    longitude: Option<Option<f64>>,
) -> Result<Option<Option<Coordinates>>, ValidationError> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(latitude), Some(longitude)) => coordinates_from_parts(latitude, longitude).map(Some),
        _ => Err(ValidationError::IncompleteCoordinates),
    }
}

impl TryFrom<PatchListingRequest> for ListingUpdate {
    type Error = ValidationError;

    fn try_from(request: PatchListingRequest) -> Result<Self, Self::Error> {
        Ok(ListingUpdate {
            title: request.title,
            description: request.description,
            category: request.category,
            crop: request.crop,
            variety: request.variety,
            grade: request.grade,
            available_quantity: request.available_quantity,
            quantity_unit: request
                .quantity_unit
                .as_deref()
                .map(str::parse::<QuantityUnit>)
                .transpose()?,
            price_per_unit: request.price_per_unit,
            currency: request.currency,
            price_type: request
                .price_type
                .as_deref()
                .map(str::parse::<PriceType>)
                .transpose()?,
            market_price_source: request.market_price_source,
            location: patch_location(request.latitude, request.longitude)?,
            address: request.address,
            pincode: request.pincode,
            visibility: request
                .buyer_category_visibility
                .map(|tags| parse_visibility(&tags))
                .transpose()?,
            published: request.is_published,
            status: request
                .status
                .as_deref()
                .map(str::parse::<ListingStatus>)
                .transpose()?,
            metadata: request.metadata,
            images: request.images.map(into_images).transpose()?,
        })
    }
}
