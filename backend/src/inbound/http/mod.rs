//! HTTP inbound adapter exposing the REST endpoints.

pub mod businesses;
pub mod error;
pub mod health;
pub mod posts;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
