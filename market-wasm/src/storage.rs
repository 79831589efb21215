use gloo_storage::{LocalStorage, Storage};
use market_core::models::AuthTokens;
use market_core::session::{TokenStore, TokenStoreError, REFRESH_TOKEN_KEY, TOKEN_KEY};

/// Tokens kept in `localStorage` under `token` / `refresh_token`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTokenStore;

impl TokenStore for LocalTokenStore {
    fn load(&self) -> Result<Option<AuthTokens>, TokenStoreError> {
        let access: Option<String> = LocalStorage::get(TOKEN_KEY).ok();
        Ok(access.filter(|a| !a.is_empty()).map(|access| AuthTokens {
            access,
            refresh: LocalStorage::get(REFRESH_TOKEN_KEY).ok(),
        }))
    }

    fn save(&self, tokens: &AuthTokens) -> Result<(), TokenStoreError> {
        LocalStorage::set(TOKEN_KEY, &tokens.access)
            .map_err(|e| TokenStoreError::Write(e.to_string()))?;
        match &tokens.refresh {
            Some(refresh) => LocalStorage::set(REFRESH_TOKEN_KEY, refresh)
                .map_err(|e| TokenStoreError::Write(e.to_string()))?,
            None => LocalStorage::delete(REFRESH_TOKEN_KEY),
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        LocalStorage::delete(TOKEN_KEY);
        LocalStorage::delete(REFRESH_TOKEN_KEY);
        Ok(())
    }
}
