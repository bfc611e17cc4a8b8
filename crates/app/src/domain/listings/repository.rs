//! Listings Repository

use std::str::FromStr;

use jiff_sqlx::Timestamp as SqlxTimestamp;
use mandi::{
    errors::ValidationError,
    listings::{
        Listing, ListingImage, ListingImageUuid, ListingUuid, MarketPriceSnapshot, UserUuid,
        coordinates_from_parts, parse_visibility,
    },
};
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use sqlx::{
    FromRow, Postgres, Row, Transaction,
    postgres::{PgArguments, PgRow},
    query, query_as,
    query::Query,
    types::Json,
};
use uuid::Uuid;

const LIST_SELLER_LISTINGS_SQL: &str = include_str!("sql/list_seller_listings.sql");
const LIST_AVAILABLE_LISTINGS_SQL: &str = include_str!("sql/list_available_listings.sql");
const GET_LISTING_SQL: &str = include_str!("sql/get_listing.sql");
const GET_LISTING_FOR_UPDATE_SQL: &str = include_str!("sql/get_listing_for_update.sql");
const CREATE_LISTING_SQL: &str = include_str!("sql/create_listing.sql");
const UPDATE_LISTING_SQL: &str = include_str!("sql/update_listing.sql");
const UPDATE_MARKET_PRICE_SQL: &str = include_str!("sql/update_market_price.sql");
const LIST_LISTING_IMAGES_SQL: &str = include_str!("sql/list_listing_images.sql");
const CREATE_LISTING_IMAGE_SQL: &str = include_str!("sql/create_listing_image.sql");
const DELETE_LISTING_IMAGES_SQL: &str = include_str!("sql/delete_listing_images.sql");
const DELETE_LISTING_IMAGE_SQL: &str = include_str!("sql/delete_listing_image.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgListingsRepository;

impl PgListingsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_seller_listings(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        seller: UserUuid,
    ) -> Result<Vec<Listing>, sqlx::Error> {
        let records = query_as::<Postgres, ListingRecord>(LIST_SELLER_LISTINGS_SQL)
            .bind(seller.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        self.attach_images(tx, records).await
    }

    pub(crate) async fn list_available_listings(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<Listing>, sqlx::Error> {
        let records = query_as::<Postgres, ListingRecord>(LIST_AVAILABLE_LISTINGS_SQL)
            .fetch_all(&mut **tx)
            .await?;

        self.attach_images(tx, records).await
    }

    pub(crate) async fn get_listing(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        listing: ListingUuid,
    ) -> Result<Listing, sqlx::Error> {
        let record = query_as::<Postgres, ListingRecord>(GET_LISTING_SQL)
            .bind(listing.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        self.attach_images(tx, vec![record])
            .await?
            .pop()
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Fetch a listing and lock its row until the transaction ends.
    pub(crate) async fn get_listing_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        listing: ListingUuid,
    ) -> Result<Listing, sqlx::Error> {
        let record = query_as::<Postgres, ListingRecord>(GET_LISTING_FOR_UPDATE_SQL)
            .bind(listing.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        self.attach_images(tx, vec![record])
            .await?
            .pop()
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Insert a listing and its images.
    pub(crate) async fn create_listing(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        listing: &Listing,
    ) -> Result<(), sqlx::Error> {
        let insert = query(CREATE_LISTING_SQL)
            .bind(listing.uuid.into_uuid())
            .bind(listing.seller.into_uuid());

        bind_listing_fields(insert, listing)
            .bind(SqlxTimestamp::from(listing.created_at))
            .bind(SqlxTimestamp::from(listing.updated_at))
            .execute(&mut **tx)
            .await?;

        for image in &listing.images {
            self.create_image(tx, listing.uuid, image).await?;
        }

        Ok(())
    }

    /// Write every mutable column of `listing`. Images are left alone.
    pub(crate) async fn update_listing(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        listing: &Listing,
    ) -> Result<u64, sqlx::Error> {
        let update = query(UPDATE_LISTING_SQL)
            .bind(listing.uuid.into_uuid())
            .bind(listing.seller.into_uuid());

        let rows_affected = bind_listing_fields(update, listing)
            .bind(SqlxTimestamp::from(listing.updated_at))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn update_market_price(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        listing: ListingUuid,
        snapshot: &MarketPriceSnapshot,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_MARKET_PRICE_SQL)
            .bind(listing.into_uuid())
            .bind(Json(snapshot))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Append an image after the listing's existing images.
    pub(crate) async fn create_image(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        listing: ListingUuid,
        image: &ListingImage,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_LISTING_IMAGE_SQL)
            .bind(image.uuid.into_uuid())
            .bind(listing.into_uuid())
            .bind(image.reference.as_str())
            .bind(image.caption.as_deref())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Replace every image of a listing, keeping the given order.
    pub(crate) async fn replace_images(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        listing: ListingUuid,
        images: &[ListingImage],
    ) -> Result<(), sqlx::Error> {
        query(DELETE_LISTING_IMAGES_SQL)
            .bind(listing.into_uuid())
            .execute(&mut **tx)
            .await?;

        for image in images {
            self.create_image(tx, listing, image).await?;
        }

        Ok(())
    }

    pub(crate) async fn delete_image(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        listing: ListingUuid,
        image: ListingImageUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_LISTING_IMAGE_SQL)
            .bind(image.into_uuid())
            .bind(listing.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn attach_images(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        records: Vec<ListingRecord>,
    ) -> Result<Vec<Listing>, sqlx::Error> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let uuids: Vec<Uuid> = records
            .iter()
            .map(|record| record.0.uuid.into_uuid())
            .collect();

        let images = query_as::<Postgres, ImageRecord>(LIST_LISTING_IMAGES_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut by_listing: FxHashMap<ListingUuid, Vec<ListingImage>> = FxHashMap::default();

        for ImageRecord { listing, image } in images {
            by_listing.entry(listing).or_default().push(image);
        }

        Ok(records
            .into_iter()
            .map(|ListingRecord(mut listing)| {
                listing.images = by_listing.remove(&listing.uuid).unwrap_or_default();
                listing
            })
            .collect())
    }
}

/// Bind the mutable listing columns, `$3` through `$23`.
fn bind_listing_fields<'q>(
    query: Query<'q, Postgres, PgArguments>,
    listing: &'q Listing,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(listing.title.as_str())
        .bind(listing.description.as_str())
        .bind(listing.category.as_str())
        .bind(listing.crop.as_str())
        .bind(listing.variety.as_deref())
        .bind(listing.grade.as_deref())
        .bind(listing.available_quantity)
        .bind(listing.quantity_unit.as_str())
        .bind(listing.price_per_unit)
        .bind(listing.currency.as_str())
        .bind(listing.price_type.as_str())
        .bind(listing.market_price_source.as_deref())
        .bind(listing.market_price.as_ref().map(Json))
        .bind(listing.location.map(|location| location.latitude()))
        .bind(listing.location.map(|location| location.longitude()))
        .bind(listing.address.as_deref())
        .bind(listing.pincode.as_deref())
        .bind(
            listing
                .visibility
                .iter()
                .map(|category| category.as_str())
                .collect::<Vec<_>>(),
        )
        .bind(listing.published)
        .bind(listing.status.as_str())
        .bind(Json(&listing.metadata))
}

struct ListingRecord(Listing);

impl<'r> FromRow<'r, PgRow> for ListingRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let location = coordinates_from_parts(row.try_get("latitude")?, row.try_get("longitude")?)
            .map_err(|error| decode_error("latitude", error))?;

        let visibility: Vec<String> = row.try_get("buyer_category_visibility")?;
        let visibility = parse_visibility(&visibility)
            .map_err(|error| decode_error("buyer_category_visibility", error))?;

        Ok(Self(Listing {
            uuid: ListingUuid::from_uuid(row.try_get("uuid")?),
            seller: UserUuid::from_uuid(row.try_get("seller_uuid")?),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            crop: row.try_get("crop")?,
            variety: row.try_get("variety")?,
            grade: row.try_get("grade")?,
            available_quantity: row.try_get("available_quantity")?,
            quantity_unit: parse_column(row, "quantity_unit")?,
            price_per_unit: row.try_get("price_per_unit")?,
            currency: row.try_get("currency")?,
            price_type: parse_column(row, "price_type")?,
            market_price_source: row.try_get("market_price_source")?,
            market_price: row
                .try_get::<Option<Json<MarketPriceSnapshot>>, _>("market_price")?
                .map(|snapshot| snapshot.0),
            location,
            address: row.try_get("address")?,
            pincode: row.try_get("pincode")?,
            visibility,
            published: row.try_get("is_published")?,
            status: parse_column(row, "status")?,
            metadata: row
                .try_get::<Json<Map<String, Value>>, _>("metadata")?
                .0,
            images: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        }))
    }
}

struct ImageRecord {
    listing: ListingUuid,
    image: ListingImage,
}

impl<'r> FromRow<'r, PgRow> for ImageRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            listing: ListingUuid::from_uuid(row.try_get("listing_uuid")?),
            image: ListingImage {
                uuid: ListingImageUuid::from_uuid(row.try_get("uuid")?),
                reference: row.try_get("reference")?,
                caption: row.try_get("caption")?,
            },
        })
    }
}

fn parse_column<T>(row: &PgRow, column: &str) -> sqlx::Result<T>
where
    T: FromStr<Err = ValidationError>,
{
    row.try_get::<&str, _>(column)?
        .parse()
        .map_err(|error| decode_error(column, error))
}

fn decode_error(column: &str, error: ValidationError) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(error),
    }
}
