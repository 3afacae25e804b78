//! Credential store: the single owner of the persisted token pair.
//!
//! Every accessor is synchronous. The file-backed store keeps a
//! write-through cache so the per-request token read never touches the disk
//! or the key-derivation function after the first load.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::config::config_root_dir;

use super::crypto::{decrypt_credentials, encrypt_credentials, looks_encrypted};
use super::error::AuthError;
use super::types::{CredentialHealth, CredentialPair};

/// Durable key-value holder for the current credential pair.
pub trait CredentialStore: Send + Sync {
    /// Current pair, or `None` when logged out.
    fn get(&self) -> Result<Option<CredentialPair>, AuthError>;
    /// Persist a new pair, replacing any previous one.
    fn set(&self, pair: CredentialPair) -> Result<(), AuthError>;
    /// Remove stored credentials.
    fn clear(&self) -> Result<(), AuthError>;

    fn access_token(&self) -> Result<Option<String>, AuthError> {
        Ok(self
            .get()?
            .and_then(|pair| pair.access().map(str::to_string)))
    }

    fn refresh_token(&self) -> Result<Option<String>, AuthError> {
        Ok(self
            .get()?
            .and_then(|pair| pair.refresh().map(str::to_string)))
    }

    fn health(&self) -> Result<CredentialHealth, AuthError> {
        Ok(CredentialHealth::of(self.get()?.as_ref()))
    }
}

/// Returns the default credential file path (`~/.config/ridepool/credentials.json`).
pub fn default_credentials_path() -> Option<PathBuf> {
    config_root_dir().map(|dir| dir.join("ridepool").join("credentials.json"))
}

/// Process-local store used for `--ephemeral` runs and tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    pair: Mutex<Option<CredentialPair>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(pair: CredentialPair) -> Self {
        Self {
            pair: Mutex::new(Some(pair)),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<CredentialPair>> {
        self.pair.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<CredentialPair>, AuthError> {
        Ok(self.slot().clone())
    }

    fn set(&self, pair: CredentialPair) -> Result<(), AuthError> {
        *self.slot() = Some(pair);
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.slot() = None;
        Ok(())
    }
}

/// Encrypted on-disk credential store.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    // `None` until the file has been read once.
    cache: Mutex<Option<Option<CredentialPair>>>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    /// Store at the default per-user location.
    pub fn at_default_path() -> Result<Self, AuthError> {
        default_credentials_path().map(Self::new).ok_or_else(|| {
            AuthError::Invalid(
                "unable to resolve config root for credential storage".to_string(),
            )
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn cache(&self) -> MutexGuard<'_, Option<Option<CredentialPair>>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Result<Option<CredentialPair>, AuthError> {
        let mut cache = self.cache();
        if let Some(cached) = cache.as_ref() {
            return Ok(cached.clone());
        }
        let loaded = load_credentials(&self.path)?;
        *cache = Some(loaded.clone());
        Ok(loaded)
    }

    /// Replace the pair. The cache always takes the new pair, so a failed
    /// write still leaves this process on the newest server-issued tokens.
    fn set(&self, pair: CredentialPair) -> Result<(), AuthError> {
        let mut cache = self.cache();
        let written = write_credentials(&self.path, &pair);
        *cache = Some(Some(pair));
        written
    }

    fn clear(&self) -> Result<(), AuthError> {
        let mut cache = self.cache();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(AuthError::Io(err)),
        }
        *cache = Some(None);
        Ok(())
    }
}

/// Load and decode the credential file, migrating plaintext exports.
pub(crate) fn load_credentials(path: &Path) -> Result<Option<CredentialPair>, AuthError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(AuthError::Io(err)),
    };
    if text.trim().is_empty() {
        return Ok(None);
    }
    let value: serde_json::Value = serde_json::from_str(&text).map_err(|err| {
        AuthError::Invalid(format!(
            "failed to parse credential file `{}`: {err}",
            path.display()
        ))
    })?;

    if looks_encrypted(&value) {
        let encrypted: super::crypto::EncryptedCredentialFile = serde_json::from_value(value)
            .map_err(|err| {
                AuthError::Invalid(format!(
                    "failed to parse encrypted credential file `{}`: {err}",
                    path.display()
                ))
            })?;
        return decrypt_credentials(&encrypted).map(Some);
    }

    // Plaintext `{"accessToken": ..., "refreshToken": ...}` export.
    let parsed: CredentialPair = serde_json::from_value(value).map_err(|err| {
        AuthError::Invalid(format!(
            "failed to parse credential file `{}`: {err}",
            path.display()
        ))
    })?;
    if parsed.access().is_none() && parsed.refresh().is_none() {
        return Ok(None);
    }
    // Best-effort migration. If re-write fails, keep using the plaintext values.
    if let Err(err) = write_credentials(path, &parsed) {
        tracing::warn!(path = %path.display(), error = %err, "could not encrypt plaintext credential file");
    }
    Ok(Some(parsed))
}

/// Encrypt and persist credentials with owner-only permissions.
pub(crate) fn write_credentials(path: &Path, pair: &CredentialPair) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700));
        }
    }

    let encrypted = encrypt_credentials(pair)?;
    let text = serde_json::to_string_pretty(&encrypted).map_err(|err| {
        AuthError::Invalid(format!("failed to serialize encrypted credentials: {err}"))
    })?;
    let mut options = std::fs::OpenOptions::new();
    options.create(true).truncate(true).write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    #[cfg(unix)]
    {
        // Pre-existing files keep their old mode through `open`.
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
    }
    Ok(())
}
