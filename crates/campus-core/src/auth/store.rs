use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use anyhow::{anyhow, Result};

/// Strings that end up in storage when an unset value is stringified.
/// They are never sent as credentials.
const SENTINEL_TOKENS: [&str; 2] = ["undefined", "null"];

/// The two persisted credential values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub const ALL: [TokenKind; 2] = [TokenKind::Access, TokenKind::Refresh];

    /// Storage key for this token
    pub fn key(&self) -> &'static str {
        match self {
            TokenKind::Access => "accessToken",
            TokenKind::Refresh => "refreshToken",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Returns true if a stored token may be sent as a credential.
pub fn is_usable_token(token: &str) -> bool {
    !token.is_empty() && !SENTINEL_TOKENS.contains(&token)
}

/// Persistent key/value storage for the access and refresh tokens.
///
/// Implementations use interior locking; a store is shared between
/// clones of the API client as `Arc<dyn TokenStore>`.
pub trait TokenStore: Send + Sync {
    fn get(&self, kind: TokenKind) -> Result<Option<String>>;

    fn set(&self, kind: TokenKind, value: &str) -> Result<()>;

    fn clear(&self, kind: TokenKind) -> Result<()>;

    /// Get a token only if it is usable as a credential.
    fn usable(&self, kind: TokenKind) -> Result<Option<String>> {
        Ok(self.get(kind)?.filter(|t| is_usable_token(t)))
    }

    /// Store a fresh access token and, when the server rotated it, the refresh token.
    fn store_pair(&self, access: &str, refresh: Option<&str>) -> Result<()> {
        self.set(TokenKind::Access, access)?;
        if let Some(refresh) = refresh {
            self.set(TokenKind::Refresh, refresh)?;
        }
        Ok(())
    }

    fn clear_all(&self) -> Result<()> {
        for kind in TokenKind::ALL {
            self.clear(kind)?;
        }
        Ok(())
    }
}

/// Token store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<HashMap<TokenKind, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given tokens
    pub fn with_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
        let mut tokens = HashMap::new();
        if let Some(access) = access {
            tokens.insert(TokenKind::Access, access.to_string());
        }
        if let Some(refresh) = refresh {
            tokens.insert(TokenKind::Refresh, refresh.to_string());
        }
        Self {
            tokens: RwLock::new(tokens),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, kind: TokenKind) -> Result<Option<String>> {
        let tokens = self.tokens.read().map_err(|_| anyhow!("Token store lock poisoned"))?;
        Ok(tokens.get(&kind).cloned())
    }

    fn set(&self, kind: TokenKind, value: &str) -> Result<()> {
        let mut tokens = self.tokens.write().map_err(|_| anyhow!("Token store lock poisoned"))?;
        tokens.insert(kind, value.to_string());
        Ok(())
    }

    fn clear(&self, kind: TokenKind) -> Result<()> {
        let mut tokens = self.tokens.write().map_err(|_| anyhow!("Token store lock poisoned"))?;
        tokens.remove(&kind);
        Ok(())
    }
}
