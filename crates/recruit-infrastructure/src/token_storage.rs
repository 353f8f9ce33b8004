//! File-backed bearer token storage.
//!
//! Persists the credential as a small JSON object keyed by [`TOKEN_KEY`]
//! (`{"authToken": "..."}`) in ~/.config/recruit/credentials.json.

use crate::paths::RecruitPaths;
use recruit_core::auth::{AuthToken, TokenStore, TOKEN_KEY};
use recruit_core::error::{ClientError, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

type CredentialMap = BTreeMap<String, String>;

/// Token store backed by a JSON file.
///
/// Responsibilities:
/// - Load the token once and cache it in memory
/// - Write updates atomically (tmp file + fsync + rename)
/// - Remove the file entirely when the token is cleared
///
/// # Security Note
///
/// The token is stored in plaintext. On Unix the file is created with 600
/// permissions.
#[derive(Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    /// `None` until the file has been read once.
    cached: Arc<RwLock<Option<Option<AuthToken>>>>,
}

impl FileTokenStore {
    /// Creates a store at the default location (~/.config/recruit/credentials.json).
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(RecruitPaths::credentials_file()?))
    }

    /// Creates a store at a custom path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the path to the credential file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<Option<AuthToken>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let credentials: CredentialMap = serde_json::from_str(&content)?;
        Ok(credentials
            .get(TOKEN_KEY)
            .filter(|value| !value.is_empty())
            .map(AuthToken::new))
    }

    fn write_file(&self, token: &AuthToken) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| ClientError::storage("Credential path has no parent directory"))?;
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| ClientError::storage("Credential path has no file name"))?;
        let tmp_path = parent.join(format!(".{}.tmp", file_name.to_string_lossy()));

        let credentials = CredentialMap::from([(TOKEN_KEY.to_string(), token.as_str().to_string())]);
        let json = serde_json::to_string_pretty(&credentials)?;

        let mut tmp_file = create_private_file(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn set_cached(&self, token: Option<AuthToken>) {
        let mut guard = self.cached.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(token);
    }
}

#[cfg(unix)]
fn create_private_file(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private_file(path: &Path) -> std::io::Result<File> {
    File::create(path)
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<AuthToken>> {
        {
            let guard = self.cached.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *guard {
                return Ok(cached.clone());
            }
        }

        let token = self.read_file()?;
        self.set_cached(token.clone());
        Ok(token)
    }

    fn save(&self, token: &AuthToken) -> Result<()> {
        self.write_file(token)?;
        self.set_cached(Some(token.clone()));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        // Forget the in-memory copy first so a failed unlink still logs the user out.
        self.set_cached(None);
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
