//! Listings

pub mod data;
pub mod errors;
mod repository;
pub mod service;

pub use errors::ListingsServiceError;
pub use service::*;
