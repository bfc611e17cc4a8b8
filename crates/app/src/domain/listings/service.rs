//! Listings service.

use async_trait::async_trait;
use jiff::Timestamp;
use mandi::{
    buyers::Viewer,
    filter::is_browsable,
    geo::Coordinates,
    listings::{Listing, ListingImage, ListingImageUuid, ListingStatus, ListingUuid, MarketPriceSnapshot},
    ranking::Ranked,
    search::{BuyerBreakdown, SearchQuery, SearchResults, breakdown, search},
    visibility::is_visible,
};
use mockall::automock;
use sqlx::{Postgres, Transaction};

use crate::{
    auth::Actor,
    database::Db,
    domain::listings::{
        data::{ListingUpdate, NewListing, NewListingImage},
        errors::ListingsServiceError,
        repository::PgListingsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgListingsService {
    db: Db,
    repository: PgListingsRepository,
}

impl PgListingsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgListingsRepository::new(),
        }
    }

    /// Lock a listing the actor may manage.
    async fn lock_managed_listing(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        actor: Actor,
        listing: ListingUuid,
    ) -> Result<Listing, ListingsServiceError> {
        let listing = self
            .repository
            .get_listing_for_update(tx, listing)
            .await?;

        if listing.status == ListingStatus::Deleted {
            return Err(ListingsServiceError::NotFound);
        }

        if !actor.can_manage(listing.seller) {
            return Err(ListingsServiceError::Forbidden);
        }

        Ok(listing)
    }
}

fn ensure_seller(actor: Actor) -> Result<(), ListingsServiceError> {
    if actor.can_sell() {
        Ok(())
    } else {
        Err(ListingsServiceError::Forbidden)
    }
}

#[async_trait]
impl ListingsService for PgListingsService {
    async fn list_seller_listings(&self, actor: Actor) -> Result<Vec<Listing>, ListingsServiceError> {
        ensure_seller(actor)?;

        let mut tx = self.db.begin().await?;

        let listings = self
            .repository
            .list_seller_listings(&mut tx, actor.user)
            .await?;

        tx.commit().await?;

        Ok(listings)
    }

    async fn get_seller_listing(
        &self,
        actor: Actor,
        listing: ListingUuid,
    ) -> Result<Listing, ListingsServiceError> {
        ensure_seller(actor)?;

        let mut tx = self.db.begin().await?;

        let listing = self.repository.get_listing(&mut tx, listing).await?;

        tx.commit().await?;

        if listing.status == ListingStatus::Deleted || !actor.can_manage(listing.seller) {
            return Err(ListingsServiceError::NotFound);
        }

        Ok(listing)
    }

    async fn create_listing(
        &self,
        actor: Actor,
        listing: NewListing,
    ) -> Result<Listing, ListingsServiceError> {
        ensure_seller(actor)?;

        let listing = listing.into_listing(actor.user, Timestamp::now())?;

        let mut tx = self.db.begin().await?;

        self.repository.create_listing(&mut tx, &listing).await?;

        let created = self.repository.get_listing(&mut tx, listing.uuid).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_listing(
        &self,
        actor: Actor,
        listing: ListingUuid,
        update: ListingUpdate,
    ) -> Result<Listing, ListingsServiceError> {
        ensure_seller(actor)?;

        let mut tx = self.db.begin().await?;

        let current = self.lock_managed_listing(&mut tx, actor, listing).await?;
        let (updated, images) = update.apply_to(current, Timestamp::now())?;

        self.repository.update_listing(&mut tx, &updated).await?;

        if images.is_some() {
            self.repository
                .replace_images(&mut tx, updated.uuid, &updated.images)
                .await?;
        }

        let updated = self.repository.get_listing(&mut tx, listing).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_listing(
        &self,
        actor: Actor,
        listing: ListingUuid,
    ) -> Result<(), ListingsServiceError> {
        ensure_seller(actor)?;

        let mut tx = self.db.begin().await?;

        let current = self.lock_managed_listing(&mut tx, actor, listing).await?;

        self.repository
            .update_listing(&mut tx, &current.soft_delete(Timestamp::now()))
            .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn add_images(
        &self,
        actor: Actor,
        listing: ListingUuid,
        images: Vec<NewListingImage>,
    ) -> Result<Listing, ListingsServiceError> {
        ensure_seller(actor)?;

        let mut tx = self.db.begin().await?;

        self.lock_managed_listing(&mut tx, actor, listing).await?;

        for image in images {
            self.repository
                .create_image(&mut tx, listing, &ListingImage::from(image))
                .await?;
        }

        let updated = self.repository.get_listing(&mut tx, listing).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_image(
        &self,
        actor: Actor,
        listing: ListingUuid,
        image: ListingImageUuid,
    ) -> Result<(), ListingsServiceError> {
        ensure_seller(actor)?;

        let mut tx = self.db.begin().await?;

        self.lock_managed_listing(&mut tx, actor, listing).await?;

        let rows_affected = self.repository.delete_image(&mut tx, listing, image).await?;

        if rows_affected == 0 {
            return Err(ListingsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn listings_by_buyer_category(
        &self,
        actor: Actor,
    ) -> Result<BuyerBreakdown, ListingsServiceError> {
        let listings = self.list_seller_listings(actor).await?;

        Ok(breakdown(&listings))
    }

    async fn search_listings(
        &self,
        viewer: Viewer,
        query: SearchQuery,
    ) -> Result<SearchResults, ListingsServiceError> {
        let mut tx = self.db.begin().await?;

        let listings = self.repository.list_available_listings(&mut tx).await?;

        tx.commit().await?;

        Ok(search(listings, &query, viewer)?)
    }

    async fn get_available_listing(
        &self,
        viewer: Viewer,
        listing: ListingUuid,
        origin: Option<Coordinates>,
    ) -> Result<Ranked, ListingsServiceError> {
        let mut tx = self.db.begin().await?;

        let listing = self.repository.get_listing(&mut tx, listing).await?;

        tx.commit().await?;

        if !is_browsable(&listing) || !is_visible(&listing, viewer) {
            return Err(ListingsServiceError::NotFound);
        }

        let distance_meters = origin
            .zip(listing.location)
            .map(|(origin, location)| origin.distance_to(&location));

        Ok(Ranked {
            listing,
            distance_meters,
        })
    }

    async fn record_market_price(
        &self,
        listing: ListingUuid,
        snapshot: MarketPriceSnapshot,
    ) -> Result<(), ListingsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self
            .repository
            .update_market_price(&mut tx, listing, &snapshot)
            .await?;

        if rows_affected == 0 {
            return Err(ListingsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait ListingsService: Send + Sync {
    /// The actor's own listings, newest first, excluding deleted ones.
    async fn list_seller_listings(&self, actor: Actor) -> Result<Vec<Listing>, ListingsServiceError>;

    /// One of the actor's own listings.
    async fn get_seller_listing(
        &self,
        actor: Actor,
        listing: ListingUuid,
    ) -> Result<Listing, ListingsServiceError>;

    /// Creates a listing owned by the actor.
    async fn create_listing(
        &self,
        actor: Actor,
        listing: NewListing,
    ) -> Result<Listing, ListingsServiceError>;

    /// Applies a full or partial update to a listing the actor manages.
    async fn update_listing(
        &self,
        actor: Actor,
        listing: ListingUuid,
        update: ListingUpdate,
    ) -> Result<Listing, ListingsServiceError>;

    /// Soft deletes a listing the actor manages.
    async fn delete_listing(
        &self,
        actor: Actor,
        listing: ListingUuid,
    ) -> Result<(), ListingsServiceError>;

    /// Appends images to a listing the actor manages.
    async fn add_images(
        &self,
        actor: Actor,
        listing: ListingUuid,
        images: Vec<NewListingImage>,
    ) -> Result<Listing, ListingsServiceError>;

    /// Removes one image from a listing the actor manages.
    async fn delete_image(
        &self,
        actor: Actor,
        listing: ListingUuid,
        image: ListingImageUuid,
    ) -> Result<(), ListingsServiceError>;

    /// The actor's published listings grouped by buyer category.
    async fn listings_by_buyer_category(
        &self,
        actor: Actor,
    ) -> Result<BuyerBreakdown, ListingsServiceError>;

    /// Searches the listings on offer as `viewer`.
    async fn search_listings(
        &self,
        viewer: Viewer,
        query: SearchQuery,
    ) -> Result<SearchResults, ListingsServiceError>;

    /// One listing on offer to `viewer`, with its distance from `origin` when given.
    async fn get_available_listing(
        &self,
        viewer: Viewer,
        listing: ListingUuid,
        origin: Option<Coordinates>,
    ) -> Result<Ranked, ListingsServiceError>;

    /// Stores the latest mandi price observed for a listing.
    async fn record_market_price(
        &self,
        listing: ListingUuid,
        snapshot: MarketPriceSnapshot,
    ) -> Result<(), ListingsServiceError>;
}
