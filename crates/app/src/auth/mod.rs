//! Authentication

mod errors;
mod jwt;
mod models;
mod service;

pub use errors::*;
pub use jwt::*;
pub use models::*;
pub use service::*;
