//! REST API client module for the campus backend.
//!
//! `AuthenticatedClient` attaches the stored bearer token to each request
//! and recovers once from an expired access token via `/auth/refresh`.
//! `ApiClient` layers typed JSON operations for each campus area on top.

pub mod authenticated;
pub mod client;
pub mod error;
mod payload;

pub use authenticated::{ApiRequest, AuthenticatedClient, REFRESH_PATH};
pub use client::ApiClient;
pub use error::ApiError;
