//! Marketplace Search
//!
//! Filter, rank and paginate listings for one viewer, and group a seller's listings by the
//! buyer categories they reach.

use serde::Serialize;
use smallvec::SmallVec;

use crate::{
    buyers::{BuyerCategory, Viewer},
    errors::ValidationError,
    filter::{FilterParams, ListingFilter, filter_listings},
    listings::{Listing, ListingStatus, QuantityUnit, coordinates_from_parts},
    projection::ListingView,
    ranking::{Page, PageRequest, RankOptions, paginate, rank},
    visibility::is_visible_to_category,
};

/// Raw search input as received from a query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    /// Filter criteria.
    pub filter: FilterParams,

    /// Sort key tag.
    pub sort: Option<String>,

    /// Origin latitude.
    pub latitude: Option<f64>,

    /// Origin longitude.
    pub longitude: Option<f64>,

    /// Distance cap in meters.
    pub max_distance: Option<u64>,

    /// Page number.
    pub page: Option<u32>,

    /// Page size.
    pub size: Option<u32>,
}

/// Parsed search input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    /// Filter criteria.
    pub filter: ListingFilter,

    /// Ranking options.
    pub rank: RankOptions,

    /// Requested page.
    pub page: PageRequest,
}

impl SearchQuery {
    /// Parse raw search parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for unknown enumerated values, incomplete or out of
    /// range coordinates, distance options without an origin, or an invalid page.
    pub fn parse(params: &SearchParams) -> Result<Self, ValidationError> {
        let sort = params
            .sort
            .as_deref()
            .map(str::trim)
            .filter(|sort| !sort.is_empty())
            .map(str::parse)
            .transpose()?;

        let rank = RankOptions {
            sort,
            origin: coordinates_from_parts(params.latitude, params.longitude)?,
            max_distance: params.max_distance,
        };

        rank.validate()?;

        Ok(Self {
            filter: ListingFilter::parse(&params.filter)?,
            rank,
            page: PageRequest::new(params.page, params.size)?,
        })
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Projected listings on this page.
    pub page: Page<ListingView>,

    /// Distinct units across the whole filtered result set, sorted.
    pub available_units: Vec<QuantityUnit>,

    /// Criteria that were applied.
    pub filters_applied: ListingFilter,
}

/// Filter, rank and paginate `listings` for `viewer`.
///
/// # Errors
///
/// Returns a [`ValidationError`] when the ranking options are inconsistent.
pub fn search<I>(
    listings: I,
    query: &SearchQuery,
    viewer: Viewer,
) -> Result<SearchResults, ValidationError>
where
    I: IntoIterator<Item = Listing>,
{
    let filtered = filter_listings(listings, &query.filter, viewer);
    let ranked = rank(filtered, &query.rank)?;

    let mut available_units: SmallVec<[QuantityUnit; 5]> = SmallVec::new();

    for ranked in &ranked {
        if !available_units.contains(&ranked.listing.quantity_unit) {
            available_units.push(ranked.listing.quantity_unit);
        }
    }

    available_units.sort_unstable();

    Ok(SearchResults {
        page: paginate(ranked, query.page).map(ListingView::from),
        available_units: available_units.into_vec(),
        filters_applied: query.filter.clone(),
    })
}

/// Listings of one buyer group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuyerGroup {
    /// Number of listings.
    pub count: usize,

    /// The listings.
    pub listings: Vec<ListingView>,
}

impl BuyerGroup {
    fn from_listings<'a>(listings: impl IntoIterator<Item = &'a Listing>) -> Self {
        let listings: Vec<ListingView> = listings
            .into_iter()
            .cloned()
            .map(ListingView::from)
            .collect();

        Self {
            count: listings.len(),
            listings,
        }
    }
}

/// A seller's published listings grouped by the buyer categories that can see them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuyerBreakdown {
    /// Visible to every category.
    pub all_buyers: BuyerGroup,

    /// Visible to mandi owners.
    pub mandi_owners: BuyerGroup,

    /// Visible to shopkeepers.
    pub shopkeepers: BuyerGroup,

    /// Visible to communities.
    pub communities: BuyerGroup,
}

/// Group published, non-deleted `listings` by buyer category. A listing appears in every
/// group whose category can see it.
pub fn breakdown(listings: &[Listing]) -> BuyerBreakdown {
    let published: Vec<&Listing> = listings
        .iter()
        .filter(|listing| listing.published && listing.status != ListingStatus::Deleted)
        .collect();

    let group = |category: BuyerCategory| {
        BuyerGroup::from_listings(
            published
                .iter()
                .copied()
                .filter(|listing| is_visible_to_category(listing, category)),
        )
    };

    BuyerBreakdown {
        all_buyers: BuyerGroup::from_listings(
            published
                .iter()
                .copied()
                .filter(|listing| listing.is_visible_to_all()),
        ),
        mandi_owners: group(BuyerCategory::MandiOwner),
        shopkeepers: group(BuyerCategory::Shopkeeper),
        communities: group(BuyerCategory::Community),
    }
}
