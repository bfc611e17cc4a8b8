//! Application services for the mandi marketplace: persistence, authentication and the
//! mandi price proxy.

pub mod auth;
pub mod context;
pub mod database;
pub mod domain;

#[cfg(test)]
mod test;
