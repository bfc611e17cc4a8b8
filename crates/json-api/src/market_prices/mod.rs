//! Market Prices

pub(crate) mod errors;
pub(crate) mod index;
