use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::store::{TokenKind, TokenStore};

/// Token file name in cache directory
const TOKEN_FILE: &str = "tokens.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TokenFile {
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(rename = "refreshToken", skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    saved_at: Option<DateTime<Utc>>,
}

impl TokenFile {
    fn slot(&mut self, kind: TokenKind) -> &mut Option<String> {
        match kind {
            TokenKind::Access => &mut self.access_token,
            TokenKind::Refresh => &mut self.refresh_token,
        }
    }

    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Token store persisted as JSON in the cache directory.
pub struct FileTokenStore {
    cache_dir: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            lock: Mutex::new(()),
        }
    }

    fn token_path(&self) -> PathBuf {
        self.cache_dir.join(TOKEN_FILE)
    }

    /// When the tokens were last written, if a token file exists
    pub fn saved_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.read()?.saved_at)
    }

    fn read(&self) -> Result<TokenFile> {
        let path = self.token_path();
        if !path.exists() {
            return Ok(TokenFile::default());
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read token file")?;
        serde_json::from_str(&contents).context("Failed to parse token file")
    }

    fn write(&self, file: &TokenFile) -> Result<()> {
        let path = self.token_path();
        if file.is_empty() {
            if path.exists() {
                std::fs::remove_file(&path).context("Failed to remove token file")?;
                debug!(path = %path.display(), "Removed token file");
            }
            return Ok(());
        }

        std::fs::create_dir_all(&self.cache_dir)?;
        let contents = serde_json::to_string_pretty(file)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        // Owner-only from the moment the file exists
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut handle = options.open(&path).context("Failed to open token file")?;

        // mode() only applies on creation; tighten files left by older writes
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            handle.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        handle
            .write_all(contents.as_bytes())
            .context("Failed to write token file")?;
        Ok(())
    }

    fn update(&self, kind: TokenKind, value: Option<&str>) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("Token file lock poisoned"))?;
        let mut file = self.read()?;
        *file.slot(kind) = value.map(str::to_string);
        file.saved_at = Some(Utc::now());
        self.write(&file)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, kind: TokenKind) -> Result<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| anyhow!("Token file lock poisoned"))?;
        let mut file = self.read()?;
        Ok(file.slot(kind).take())
    }

    fn set(&self, kind: TokenKind, value: &str) -> Result<()> {
        self.update(kind, Some(value))
    }

    fn clear(&self, kind: TokenKind) -> Result<()> {
        self.update(kind, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().expect("tempdir");

        let store = FileTokenStore::new(dir.path().to_path_buf());
        store.set(TokenKind::Access, "abc").unwrap();
        store.set(TokenKind::Refresh, "r1").unwrap();
        assert!(store.saved_at().unwrap().is_some());

        let reopened = FileTokenStore::new(dir.path().to_path_buf());
        assert_eq!(reopened.get(TokenKind::Access).unwrap().as_deref(), Some("abc"));
        assert_eq!(reopened.get(TokenKind::Refresh).unwrap().as_deref(), Some("r1"));
    }

    #[test]
    fn test_file_uses_storage_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileTokenStore::new(dir.path().to_path_buf());
        store.set(TokenKind::Access, "abc").unwrap();

        let raw = std::fs::read_to_string(dir.path().join(TOKEN_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["accessToken"], "abc");
        assert!(json.get("refreshToken").is_none());
    }

    #[test]
    fn test_clearing_both_removes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileTokenStore::new(dir.path().to_path_buf());
        store.set(TokenKind::Access, "abc").unwrap();
        store.set(TokenKind::Refresh, "r1").unwrap();

        store.clear(TokenKind::Access).unwrap();
        assert!(dir.path().join(TOKEN_FILE).exists());
        assert_eq!(store.get(TokenKind::Access).unwrap(), None);

        store.clear_all().unwrap();
        assert!(!dir.path().join(TOKEN_FILE).exists());
        assert_eq!(store.get(TokenKind::Refresh).unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(TOKEN_FILE);
        let store = FileTokenStore::new(dir.path().to_path_buf());
        store.set(TokenKind::Access, "abc").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        // A pre-existing world-readable file is tightened on the next write
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        store.set(TokenKind::Refresh, "r1").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.get(TokenKind::Access).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_missing_directory_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileTokenStore::new(dir.path().join("not-created-yet"));
        assert_eq!(store.get(TokenKind::Access).unwrap(), None);
        store.clear_all().unwrap();
    }
}
