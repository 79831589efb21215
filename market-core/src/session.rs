//! Signed-in identity and its persisted token.
//!
//! The session is an explicit value owned by the front-end root: it is
//! hydrated once at start-up, mutated on sign-in, sign-up, sign-out and
//! profile edits, and read everywhere else.

use crate::error::ApiError;
use crate::models::{AuthResponse, AuthTokens, User};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// Storage key of the access token.
pub const TOKEN_KEY: &str = "token";
/// Storage key of the refresh token, when the backend issues one.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenStoreError {
    #[error("Failed to read token: {0}")]
    Read(String),

    #[error("Failed to save token: {0}")]
    Write(String),
}

/// Persistent home of the auth tokens (a file, `localStorage`, memory).
pub trait TokenStore {
    fn load(&self) -> Result<Option<AuthTokens>, TokenStoreError>;
    fn save(&self, tokens: &AuthTokens) -> Result<(), TokenStoreError>;
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// In-memory store; clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    slot: Rc<RefCell<Option<AuthTokens>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: AuthTokens) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(tokens))),
        }
    }

    pub fn tokens(&self) -> Option<AuthTokens> {
        self.slot.borrow().clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<AuthTokens>, TokenStoreError> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, tokens: &AuthTokens) -> Result<(), TokenStoreError> {
        *self.slot.borrow_mut() = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.slot.borrow_mut() = None;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Stored token not yet verified; navigation decisions wait.
    #[default]
    Loading,
    Anonymous,
    SignedIn(User),
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::SignedIn(user) if user.is_staff)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::SignedIn(user) => Some(user),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Session<S> {
    store: S,
    state: SessionState,
    tokens: Option<AuthTokens>,
}

impl<S: TokenStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: SessionState::Loading,
            tokens: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.state.is_admin()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|t| t.access.as_str())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the stored token. Returns it when it still needs verifying,
    /// otherwise the session settles as anonymous.
    pub fn begin_hydrate(&mut self) -> Option<String> {
        match self.store.load() {
            Ok(Some(tokens)) => {
                let access = tokens.access.clone();
                self.tokens = Some(tokens);
                self.state = SessionState::Loading;
                Some(access)
            }
            Ok(None) => {
                self.tokens = None;
                self.state = SessionState::Anonymous;
                None
            }
            Err(e) => {
                tracing::warn!("Failed to read stored token: {}", e);
                self.tokens = None;
                self.state = SessionState::Anonymous;
                None
            }
        }
    }

    /// Settles hydration with the profile fetched for the stored token.
    ///
    /// A rejected token is removed from storage. Other failures keep it so
    /// the next start-up can try again.
    pub fn finish_hydrate(&mut self, result: Result<User, ApiError>) -> Option<&User> {
        match result {
            Ok(user) => {
                tracing::debug!("Session restored for {}", user.username);
                self.state = SessionState::SignedIn(user);
            }
            Err(e) => {
                tracing::warn!("Stored token could not be verified: {}", e);
                if e.is_unauthorized() || e.is_forbidden() {
                    if let Err(e) = self.store.clear() {
                        tracing::warn!("Failed to clear token: {}", e);
                    }
                }
                self.tokens = None;
                self.state = SessionState::Anonymous;
            }
        }
        self.state.user()
    }

    /// Persists the tokens from a sign-in or sign-up answer and signs in.
    pub fn establish(&mut self, auth: AuthResponse) -> Result<User, TokenStoreError> {
        self.store.save(&auth.tokens)?;
        self.tokens = Some(auth.tokens);
        self.state = SessionState::SignedIn(auth.user.clone());
        Ok(auth.user)
    }

    pub fn sign_out(&mut self) -> Result<(), TokenStoreError> {
        self.tokens = None;
        self.state = SessionState::Anonymous;
        self.store.clear()
    }

    /// Replaces the signed-in user after a profile edit. No-op when anonymous.
    pub fn update_user(&mut self, user: User) {
        if let SessionState::SignedIn(current) = &mut self.state {
            *current = user;
        }
    }
}
