//! Authentication module for managing the persisted credential pair.
//!
//! This module provides:
//! - `TokenStore`: get/set/clear access to the access and refresh tokens
//! - `MemoryTokenStore`: in-process storage
//! - `FileTokenStore`: JSON file in the cache directory
//! - `KeyringTokenStore`: OS-level credential storage via keyring

pub mod credentials;
pub mod file;
pub mod store;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::TokenStorage;

pub use credentials::KeyringTokenStore;
pub use file::FileTokenStore;
pub use store::{is_usable_token, MemoryTokenStore, TokenKind, TokenStore};

/// Build the token store selected in the configuration.
pub fn open_token_store(storage: TokenStorage, cache_dir: PathBuf) -> Arc<dyn TokenStore> {
    match storage {
        TokenStorage::File => Arc::new(FileTokenStore::new(cache_dir)),
        TokenStorage::Keyring => Arc::new(KeyringTokenStore::new()),
        TokenStorage::Memory => Arc::new(MemoryTokenStore::new()),
    }
}
