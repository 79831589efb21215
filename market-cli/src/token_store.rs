use anyhow::{Context, Result};
use market_core::models::AuthTokens;
use market_core::session::{TokenStore, TokenStoreError};
use std::fs;
use std::path::{Path, PathBuf};

/// Tokens kept in a file in the user's home directory, readable only by them.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    token_path: PathBuf,
}

impl FileTokenStore {
    pub fn new(custom_path: Option<PathBuf>) -> Result<Self> {
        let token_path = match custom_path {
            Some(path) => path,
            None => {
                let home = dirs::home_dir().context("Failed to get home directory")?;
                home.join(".market_token")
            }
        };

        Ok(Self { token_path })
    }

    pub fn path(&self) -> &Path {
        &self.token_path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<AuthTokens>, TokenStoreError> {
        let contents = match fs::read_to_string(&self.token_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(TokenStoreError::Read(e.to_string())),
        };

        let contents = contents.trim();
        if contents.is_empty() {
            return Ok(None);
        }

        // A bare access token is accepted as well as the JSON pair.
        match serde_json::from_str::<AuthTokens>(contents) {
            Ok(tokens) => Ok(Some(tokens)),
            Err(_) if !contents.starts_with('{') => Ok(Some(AuthTokens {
                access: contents.to_string(),
                refresh: None,
            })),
            Err(e) => Err(TokenStoreError::Read(e.to_string())),
        }
    }

    fn save(&self, tokens: &AuthTokens) -> Result<(), TokenStoreError> {
        let json =
            serde_json::to_string(tokens).map_err(|e| TokenStoreError::Write(e.to_string()))?;
        fs::write(&self.token_path, json).map_err(|e| TokenStoreError::Write(e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.token_path, perms)
                .map_err(|e| TokenStoreError::Write(e.to_string()))?;
        }

        tracing::debug!(path = ?self.token_path, "Token saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match fs::remove_file(&self.token_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TokenStoreError::Write(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileTokenStore {
        FileTokenStore::new(Some(dir.path().join("token"))).unwrap()
    }

    #[test]
    fn save_load_clear() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.load().unwrap(), None);

        let tokens = AuthTokens {
            access: "acc".into(),
            refresh: Some("ref".into()),
        };
        store.save(&tokens).unwrap();
        assert_eq!(store.load().unwrap(), Some(tokens));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn plain_token_file_is_read() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "abc123\n").unwrap();
        assert_eq!(store.load().unwrap().unwrap().access, "abc123");
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .save(&AuthTokens {
                access: "acc".into(),
                refresh: None,
            })
            .unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
