//! Mandi
//!
//! Listing core of the produce marketplace: the listing model, geodistance, buyer-category
//! visibility, the filter pipeline, ranking and pagination, and the public listing
//! projection. Everything here is pure and synchronous; persistence and transport live in
//! the application crates.

pub mod buyers;
pub mod errors;
pub mod filter;
pub mod geo;
pub mod listings;
pub mod projection;
pub mod ranking;
pub mod search;
pub mod uuids;
pub mod visibility;
