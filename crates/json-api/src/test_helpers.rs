//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use mandi::{
    buyers::BuyerCategory,
    listings::{Listing, ListingStatus, ListingUuid, PriceType, QuantityUnit, UserUuid},
};
use mandi_app::{
    auth::{Actor, MockAuthService},
    context::AppContext,
    domain::{listings::MockListingsService, market_prices::MockMarketPricesService},
};
use rust_decimal::Decimal;
use salvo::{affix_state::inject, prelude::*};
use serde_json::Map;
use smallvec::SmallVec;
use uuid::Uuid;

use crate::{extensions::*, state::State};

pub(crate) const TEST_SELLER: Actor = Actor::seller(UserUuid::from_uuid(Uuid::nil()));

#[salvo::handler]
pub(crate) async fn inject_seller(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_actor(TEST_SELLER);
    ctrl.call_next(req, depot, res).await;
}

#[salvo::handler]
pub(crate) async fn inject_shopkeeper(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_actor(Actor::buyer(UserUuid::new(), BuyerCategory::Shopkeeper));
    ctrl.call_next(req, depot, res).await;
}

fn strict_auth_mock() -> MockAuthService {
    let mut auth = MockAuthService::new();

    auth.expect_authenticate_bearer().never();

    auth
}

fn strict_listings_mock() -> MockListingsService {
    let mut listings = MockListingsService::new();

    listings.expect_list_seller_listings().never();
    listings.expect_get_seller_listing().never();
    listings.expect_create_listing().never();
    listings.expect_update_listing().never();
    listings.expect_delete_listing().never();
    listings.expect_add_images().never();
    listings.expect_delete_image().never();
    listings.expect_listings_by_buyer_category().never();
    listings.expect_search_listings().never();
    listings.expect_get_available_listing().never();
    listings.expect_record_market_price().never();

    listings
}

fn strict_market_prices_mock() -> MockMarketPricesService {
    let mut market_prices = MockMarketPricesService::new();

    market_prices.expect_latest_prices().never();
    market_prices.expect_listing_market_price().never();

    market_prices
}

fn state(
    listings: MockListingsService,
    market_prices: MockMarketPricesService,
    auth: MockAuthService,
) -> Arc<State> {
    State::from_app_context(AppContext {
        listings: Arc::new(listings),
        market_prices: Arc::new(market_prices),
        auth: Arc::new(auth),
    })
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    state(strict_listings_mock(), strict_market_prices_mock(), auth)
}

pub(crate) fn state_with_listings(listings: MockListingsService) -> Arc<State> {
    state(listings, strict_market_prices_mock(), strict_auth_mock())
}

pub(crate) fn state_with_market_prices(market_prices: MockMarketPricesService) -> Arc<State> {
    state(strict_listings_mock(), market_prices, strict_auth_mock())
}

/// Seller routes, called as [`TEST_SELLER`].
pub(crate) fn listings_service(listings: MockListingsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_listings(listings)))
            .hoop(inject_seller)
            .push(route),
    )
}

/// Marketplace routes, called anonymously.
pub(crate) fn marketplace_service(listings: MockListingsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_listings(listings)))
            .push(route),
    )
}

/// A published onion listing owned by [`TEST_SELLER`].
pub(crate) fn make_listing(uuid: ListingUuid) -> Listing {
    Listing {
        uuid,
        seller: TEST_SELLER.user,
        title: "Red onions".to_string(),
        description: "Nashik red onions".to_string(),
        category: "vegetables".to_string(),
        crop: "onion".to_string(),
        variety: None,
        grade: None,
        available_quantity: Decimal::new(40, 0),
        quantity_unit: QuantityUnit::Quintal,
        price_per_unit: Decimal::new(1_850, 0),
        currency: "INR".to_string(),
        price_type: PriceType::Fixed,
        market_price_source: None,
        market_price: None,
        location: None,
        address: None,
        pincode: None,
        visibility: SmallVec::new(),
        published: true,
        status: ListingStatus::Active,
        metadata: Map::new(),
        images: Vec::new(),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
