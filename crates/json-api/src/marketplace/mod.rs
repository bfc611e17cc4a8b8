//! Marketplace
//!
//! Buyer-facing reads. A bearer token is optional; without one the caller browses
//! anonymously and only sees listings open to every buyer category.

pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod market_price;
