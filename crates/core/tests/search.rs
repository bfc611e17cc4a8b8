//! Marketplace search pipeline tests

use jiff::{Timestamp, ToSpan};
use mandi::{
    buyers::{BuyerCategory, Viewer},
    errors::ValidationError,
    filter::FilterParams,
    geo::Coordinates,
    listings::{
        DEFAULT_CURRENCY, Listing, ListingStatus, ListingUuid, PriceType, QuantityUnit, UserUuid,
        Visibility, parse_visibility,
    },
    search::{SearchParams, SearchQuery, search},
};
use rust_decimal::Decimal;
use serde_json::{Map, json};
use testresult::TestResult;

struct Mandi {
    seller: UserUuid,
    clock: Timestamp,
}

impl Mandi {
    fn new() -> Self {
        Self {
            seller: UserUuid::new(),
            clock: Timestamp::UNIX_EPOCH,
        }
    }

    fn listing(
        &mut self,
        title: &str,
        price: i64,
        location: Option<(f64, f64)>,
        visibility: &[&str],
    ) -> TestResult<Listing> {
        self.clock = self.clock.checked_add(1.minute())?;

        Ok(Listing {
            uuid: ListingUuid::new(),
            seller: self.seller,
            title: title.to_string(),
            description: String::new(),
            category: "vegetables".to_string(),
            crop: "onion".to_string(),
            variety: None,
            grade: None,
            available_quantity: Decimal::new(10, 0),
            quantity_unit: QuantityUnit::Quintal,
            price_per_unit: Decimal::new(price, 0),
            currency: DEFAULT_CURRENCY.to_string(),
            price_type: PriceType::Fixed,
            market_price_source: None,
            market_price: None,
            location: location
                .map(|(latitude, longitude)| Coordinates::new(latitude, longitude))
                .transpose()?,
            address: None,
            pincode: None,
            visibility: if visibility.is_empty() {
                Visibility::new()
            } else {
                parse_visibility(visibility)?
            },
            published: true,
            status: ListingStatus::Active,
            metadata: Map::new(),
            images: Vec::new(),
            created_at: self.clock,
            updated_at: self.clock,
        })
    }
}

fn market() -> TestResult<Vec<Listing>> {
    let mut mandi = Mandi::new();

    Ok(vec![
        mandi.listing("far", 1_500, Some((0.0045, 0.0)), &[])?,
        mandi.listing("near", 1_800, Some((0.0009, 0.0)), &[])?,
        mandi.listing("shopkeepers only", 1_200, Some((0.0018, 0.0)), &["shopkeeper"])?,
        mandi.listing("unlocated", 1_000, None, &[])?,
        mandi.listing("middle", 2_500, Some((0.0027, 0.0)), &[])?,
    ])
}

fn titles(results: &mandi::search::SearchResults) -> Vec<&str> {
    results
        .page
        .items
        .iter()
        .map(|listing| listing.title.as_str())
        .collect()
}

#[test]
fn nearest_listings_for_a_mandi_owner() -> TestResult {
    let query = SearchQuery::parse(&SearchParams {
        sort: Some("distance".to_string()),
        latitude: Some(0.0),
        longitude: Some(0.0),
        ..SearchParams::default()
    })?;

    let results = search(market()?, &query, Viewer::Buyer(BuyerCategory::MandiOwner))?;

    assert_eq!(titles(&results), ["near", "middle", "far"]);
    assert_eq!(results.page.total, 3);

    Ok(())
}

#[test]
fn shopkeepers_see_their_restricted_listings() -> TestResult {
    let query = SearchQuery::parse(&SearchParams {
        sort: Some("distance".to_string()),
        latitude: Some(0.0),
        longitude: Some(0.0),
        max_distance: Some(250),
        ..SearchParams::default()
    })?;

    let results = search(market()?, &query, Viewer::Buyer(BuyerCategory::Shopkeeper))?;

    assert_eq!(titles(&results), ["near", "shopkeepers only"]);

    Ok(())
}

#[test]
fn anonymous_callers_browse_as_the_requested_category() -> TestResult {
    let query_for = |category: Option<&str>| {
        SearchQuery::parse(&SearchParams {
            filter: FilterParams {
                buyer_category: category.map(str::to_string),
                ..FilterParams::default()
            },
            ..SearchParams::default()
        })
    };

    let as_shopkeeper = search(market()?, &query_for(Some("shopkeeper"))?, Viewer::Anonymous)?;
    let as_mandi_owner = search(market()?, &query_for(Some("mandi_owner"))?, Viewer::Anonymous)?;
    let uncategorised = search(market()?, &query_for(None)?, Viewer::Anonymous)?;

    assert_eq!(as_shopkeeper.page.total, 5);
    assert!(
        titles(&as_shopkeeper).contains(&"shopkeepers only"),
        "restricted listing is visible to its category"
    );
    assert_eq!(as_mandi_owner.page.total, 4);
    assert_eq!(uncategorised.page.total, 4);
    assert!(
        !titles(&uncategorised).contains(&"shopkeepers only"),
        "restricted listing is hidden without a category"
    );

    Ok(())
}

#[test]
fn price_window_newest_first_paginated() -> TestResult {
    let query = SearchQuery::parse(&SearchParams {
        filter: FilterParams {
            min_price: Some("1000".to_string()),
            max_price: Some("2000".to_string()),
            ..FilterParams::default()
        },
        sort: Some("created_at".to_string()),
        page: Some(2),
        size: Some(2),
        ..SearchParams::default()
    })?;

    let results = search(market()?, &query, Viewer::Staff)?;

    // Newest first: unlocated, shopkeepers only, near, far.
    assert_eq!(titles(&results), ["near", "far"]);
    assert_eq!(results.page.total, 4);

    Ok(())
}

#[test]
fn anonymous_search_serializes_the_public_shape() -> TestResult {
    let query = SearchQuery::parse(&SearchParams {
        filter: FilterParams {
            search: Some("UNLOC".to_string()),
            ..FilterParams::default()
        },
        ..SearchParams::default()
    })?;

    let results = search(market()?, &query, Viewer::Anonymous)?;
    let json = serde_json::to_value(&results)?;

    assert_eq!(json.pointer("/page/total"), Some(&json!(1)));
    assert_eq!(json.pointer("/page/items/0/location"), Some(&json!(null)));
    assert_eq!(json.pointer("/availableUnits"), Some(&json!(["quintal"])));
    assert_eq!(
        json.pointer("/filtersApplied"),
        Some(&json!({ "search": "unloc" }))
    );

    Ok(())
}

#[test]
fn distance_sort_needs_an_origin() {
    let result = SearchQuery::parse(&SearchParams {
        sort: Some("distance".to_string()),
        ..SearchParams::default()
    })
    .and_then(|query| search(Vec::new(), &query, Viewer::Anonymous));

    assert_eq!(
        result.map(|results| results.page.total),
        Err(ValidationError::DistanceSortWithoutOrigin)
    );
}

#[test]
fn unknown_buyer_category_is_rejected() {
    let result = SearchQuery::parse(&SearchParams {
        filter: FilterParams {
            buyer_category: Some("retailer".to_string()),
            ..FilterParams::default()
        },
        ..SearchParams::default()
    });

    assert_eq!(
        result.map(|query| query.page.page),
        Err(ValidationError::UnknownBuyerCategory("retailer".to_string()))
    );
}
