//! Local persistence of the token record between runs.
//!
//! The credential file holds a long-lived refresh token, so it is always written
//! with owner-only permissions (0600 on unix). Writes go to a temporary sibling
//! which is renamed over the target, so a reader never sees a half-written file.
//! Concurrent writers are not coordinated: the last rename wins.
use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, error};

use crate::{error::Error, token::TokenRecord};

/// File-backed cache of a single `TokenRecord`.
#[derive(Debug, Clone)]
pub struct CredentialCache {
    path: PathBuf,
}

impl CredentialCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cached record. A missing file is `Ok(None)`, not an error.
    pub fn load(&self) -> Result<Option<TokenRecord>, Error> {
        let raw = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no credential file");
                return Ok(None);
            }
            Err(e) => {
                error!("Failed to read credential file {}: {}", self.path.display(), e);
                return Err(Error::Persistence(format!("{}: {}", self.path.display(), e)));
            }
        };

        let record = serde_json::from_slice::<TokenRecord>(&raw).map_err(|e| {
            error!("Failed to parse credential file {}: {}", self.path.display(), e);
            Error::Decode(format!("credential file {}: {}", self.path.display(), e))
        })?;
        if record.refresh_token().is_empty() {
            return Err(Error::Decode(format!(
                "credential file {}: refresh_token is empty",
                self.path.display()
            )));
        }
        Ok(Some(record))
    }

    /// Replaces the credential file with `record`, leaving it owner read/write only.
    pub fn save(&self, record: &TokenRecord) -> Result<(), Error> {
        let serialized = serde_json::to_vec_pretty(record).map_err(|e| {
            error!("Failed to serialize token record: {}", e);
            Error::Persistence(e.to_string())
        })?;
        atomic_write(&self.path, &serialized).map_err(|e| {
            error!("Failed to write credential file {}: {}", self.path.display(), e);
            Error::Persistence(format!("{}: {}", self.path.display(), e))
        })?;
        debug!(path = %self.path.display(), "saved credential file");
        Ok(())
    }
}

fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(ErrorKind::InvalidInput, "credential path has no file name")
    })?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_name = format!(
        ".{}.tmp-{}",
        file_name.to_string_lossy(),
        uuid::Uuid::new_v4().simple()
    );
    let temp_path = path.with_file_name(temp_name);

    let result = write_private(&temp_path, data).and_then(|()| fs::rename(&temp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        // mode() is filtered through the umask
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(data)?;
    file.sync_all()
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{DateTime, Utc};
    use tempfile::TempDir;

    use crate::{
        error::Error,
        id_token::IDTokenRow,
        refresh_token::RefreshToken,
        token::{AccessToken, TokenRecord},
    };

    use super::CredentialCache;

    fn record() -> TokenRecord {
        TokenRecord {
            access_token: Some(AccessToken("my_access_token".to_string())),
            token_type: "Bearer".to_string(),
            id_token: Some(IDTokenRow::new("header.payload.signature")),
            expires_in: 3599,
            refresh_token: RefreshToken::new("my_refresh_token"),
            expiry: DateTime::<Utc>::from_timestamp(1742193216, 123_000_000),
        }
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let cache = CredentialCache::new(dir.path().join("creds.json"));

        cache.save(&record()).unwrap();
        let loaded = cache.load().unwrap().unwrap();
        assert_eq!(loaded, record());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let cache = CredentialCache::new(dir.path().join("creds.json"));
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(&path, "{not-json").unwrap();

        let loaded = CredentialCache::new(&path).load();
        assert!(matches!(loaded, Err(Error::Decode(_))));
    }

    #[test]
    fn test_load_empty_refresh_token() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(&path, r#"{"token_type":"Bearer","refresh_token":""}"#).unwrap();

        let loaded = CredentialCache::new(&path).load();
        assert!(matches!(loaded, Err(Error::Decode(msg)) if msg.contains("refresh_token")));
    }

    #[test]
    fn test_load_original_session_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(
            &path,
            r#"{"access_token":"a","token_type":"Bearer","id_token":"h.p.s","expires_in":3599,"refresh_token":"r"}"#,
        )
        .unwrap();

        let loaded = CredentialCache::new(&path).load().unwrap().unwrap();
        assert_eq!(loaded.refresh_token(), &RefreshToken::new("r"));
        assert!(loaded.expiry().is_none());
    }

    #[test]
    fn test_save_truncates_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(&path, "x".repeat(10_000)).unwrap();

        let cache = CredentialCache::new(&path);
        cache.save(&TokenRecord::from_refresh_token(RefreshToken::new("rt"))).unwrap();
        let loaded = cache.load().unwrap().unwrap();
        assert_eq!(loaded.refresh_token(), &RefreshToken::new("rt"));
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let cache = CredentialCache::new(dir.path().join("creds.json"));
        cache.save(&record()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["creds.json".to_string()]);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let cache = CredentialCache::new(dir.path().join("nested/dir/creds.json"));
        cache.save(&record()).unwrap();
        assert!(cache.path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_restores_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        CredentialCache::new(&path).save(&record()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
