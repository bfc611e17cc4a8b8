//! Market prices

pub mod client;
pub mod errors;
pub mod models;
pub mod service;

pub use errors::*;
pub use service::*;
