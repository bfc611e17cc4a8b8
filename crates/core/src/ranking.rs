//! Ranking & Pagination

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, geo::Coordinates, listings::Listing};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size a caller may ask for.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Nearest first. Needs an origin.
    Distance,

    /// Cheapest first.
    Price,

    /// Newest first.
    CreatedAt,
}

impl SortKey {
    /// Wire tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Distance => "distance",
            Self::Price => "price",
            Self::CreatedAt => "created_at",
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "distance" => Ok(Self::Distance),
            "price" => Ok(Self::Price),
            "created_at" => Ok(Self::CreatedAt),
            other => Err(ValidationError::UnknownSortKey(other.to_string())),
        }
    }
}

/// How to rank a filtered result set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RankOptions {
    /// Ordering; `None` keeps input order.
    pub sort: Option<SortKey>,

    /// Where distances are measured from.
    pub origin: Option<Coordinates>,

    /// Drop listings farther than this many meters from the origin.
    pub max_distance: Option<u64>,
}

impl RankOptions {
    /// Check the distance options have an origin to measure from.
    ///
    /// # Errors
    ///
    /// Returns an error when distance sorting or a distance cap is requested without an
    /// origin.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.origin.is_some() {
            return Ok(());
        }

        if self.sort == Some(SortKey::Distance) {
            return Err(ValidationError::DistanceSortWithoutOrigin);
        }

        if self.max_distance.is_some() {
            return Err(ValidationError::MaxDistanceWithoutOrigin);
        }

        Ok(())
    }
}

/// A listing paired with its distance from the search origin, when one was given.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    /// The listing.
    pub listing: Listing,

    /// Meters from the origin.
    pub distance_meters: Option<u64>,
}

/// Attach distances, apply the distance cap and order the listings.
///
/// With an origin, listings without coordinates are dropped. Sorting is stable so ties keep
/// their input order.
///
/// # Errors
///
/// Returns an error when distance sorting or a distance cap is requested without an origin.
pub fn rank(listings: Vec<Listing>, options: &RankOptions) -> Result<Vec<Ranked>, ValidationError> {
    options.validate()?;

    let mut ranked: Vec<Ranked> = match options.origin {
        Some(origin) => listings
            .into_iter()
            .filter_map(|listing| {
                let distance = origin.distance_to(listing.location.as_ref()?);

                options
                    .max_distance
                    .is_none_or(|max| distance <= max)
                    .then_some(Ranked {
                        listing,
                        distance_meters: Some(distance),
                    })
            })
            .collect(),
        None => listings
            .into_iter()
            .map(|listing| Ranked {
                listing,
                distance_meters: None,
            })
            .collect(),
    };

    match options.sort {
        Some(SortKey::Distance) => ranked.sort_by_key(|ranked| ranked.distance_meters),
        Some(SortKey::Price) => ranked.sort_by_key(|ranked| ranked.listing.price_per_unit),
        Some(SortKey::CreatedAt) => {
            ranked.sort_by(|a, b| b.listing.created_at.cmp(&a.listing.created_at));
        }
        None => {}
    }

    Ok(ranked)
}

/// A 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number, from 1.
    pub page: u32,

    /// Items per page.
    pub size: u32,
}

impl PageRequest {
    /// Build a page request, defaulting to the first page of [`DEFAULT_PAGE_SIZE`] items.
    ///
    /// # Errors
    ///
    /// Returns an error when `page` is zero or `size` is outside `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<u32>, size: Option<u32>) -> Result<Self, ValidationError> {
        let page = page.unwrap_or(1);
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err(ValidationError::InvalidPage);
        }

        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(ValidationError::InvalidPageSize { max: MAX_PAGE_SIZE });
        }

        Ok(Self { page, size })
    }

    fn offset(self) -> usize {
        usize::try_from(self.page.saturating_sub(1))
            .unwrap_or(usize::MAX)
            .saturating_mul(self.limit())
    }

    fn limit(self) -> usize {
        usize::try_from(self.size).unwrap_or(usize::MAX)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the size of the whole result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,

    /// Page number, from 1.
    pub page: u32,

    /// Requested page size.
    pub size: u32,

    /// Items across all pages.
    pub total: usize,
}

impl<T> Page<T> {
    /// Transform every item, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total: self.total,
        }
    }
}

/// Cut one page out of `items`. A page past the end is empty.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len();

    Page {
        items: items
            .into_iter()
            .skip(request.offset())
            .take(request.limit())
            .collect(),
        page: request.page,
        size: request.size,
        total,
    }
}
