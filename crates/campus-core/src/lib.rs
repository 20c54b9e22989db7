//! Core library for the campus management client.
//!
//! Provides the authenticated API client with silent token refresh,
//! pluggable token storage, typed models and configuration.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod navigation;
pub mod utils;

pub use api::{ApiClient, ApiError, ApiRequest, AuthenticatedClient};
pub use auth::{MemoryTokenStore, TokenKind, TokenStore};
pub use config::{Config, Language, TokenStorage};
pub use navigation::{LoggingNavigator, Navigator, RecordingNavigator, LOGIN_PATH};
