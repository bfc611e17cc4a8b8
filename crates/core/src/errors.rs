//! Validation Errors

use thiserror::Error;

use crate::{geo::CoordinatesError, listings::ListingStatus};

/// Field-level validation failures raised by the listing core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Buyer category tag outside the closed set.
    #[error("unknown buyer category `{0}`")]
    UnknownBuyerCategory(String),

    /// Price type outside `fixed | negotiable | market_linked`.
    #[error("unknown price type `{0}`")]
    UnknownPriceType(String),

    /// Quantity unit outside `kg | quintal | tonne | piece | box`.
    #[error("unknown quantity unit `{0}`")]
    UnknownQuantityUnit(String),

    /// Listing status outside the known lifecycle states.
    #[error("unknown listing status `{0}`")]
    UnknownStatus(String),

    /// Status a seller cannot move a listing to directly.
    #[error("status cannot be set to `{0}`")]
    StatusNotSettable(ListingStatus),

    /// Sort key outside `distance | price | created_at`.
    #[error("unknown sort key `{0}`")]
    UnknownSortKey(String),

    /// Distance sorting needs an origin coordinate.
    #[error("sorting by distance requires an origin")]
    DistanceSortWithoutOrigin,

    /// A distance cap needs an origin coordinate.
    #[error("max_distance requires an origin")]
    MaxDistanceWithoutOrigin,

    /// Latitude given without longitude, or the reverse.
    #[error("latitude and longitude must be given together")]
    IncompleteCoordinates,

    /// Coordinates out of range.
    #[error(transparent)]
    Coordinates(#[from] CoordinatesError),

    /// Price per unit below zero.
    #[error("price per unit must not be negative")]
    NegativePrice,

    /// Available quantity below zero.
    #[error("available quantity must not be negative")]
    NegativeQuantity,

    /// `market_linked` pricing without a market price source.
    #[error("market linked pricing requires a market price source")]
    MissingMarketPriceSource,

    /// Currency code not in ISO 4217.
    #[error("unknown currency code `{0}`")]
    UnknownCurrency(String),

    /// Required text left blank.
    #[error("must not be blank")]
    Blank(&'static str),

    /// Page number below one.
    #[error("page must be at least 1")]
    InvalidPage,

    /// Page size outside `1..=max`.
    #[error("size must be between 1 and {max}")]
    InvalidPageSize {
        /// Largest accepted page size.
        max: u32,
    },
}

impl ValidationError {
    /// The request field the failure is attributed to.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::UnknownBuyerCategory(_) => "buyer_category",
            Self::UnknownPriceType(_) => "price_type",
            Self::UnknownQuantityUnit(_) => "unit",
            Self::UnknownStatus(_) | Self::StatusNotSettable(_) => "status",
            Self::UnknownSortKey(_) | Self::DistanceSortWithoutOrigin => "sort",
            Self::MaxDistanceWithoutOrigin => "max_distance",
            Self::IncompleteCoordinates | Self::Coordinates(_) => "location",
            Self::NegativePrice => "price_per_unit",
            Self::NegativeQuantity => "available_quantity",
            Self::MissingMarketPriceSource => "market_price_source",
            Self::UnknownCurrency(_) => "price_currency",
            Self::Blank(field) => *field,
            Self::InvalidPage => "page",
            Self::InvalidPageSize { .. } => "size",
        }
    }
}
