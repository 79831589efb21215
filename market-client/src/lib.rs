pub mod error;
pub mod http_client;

pub use error::ClientError;
pub use http_client::HttpClient;

use market_core::models::{LoginRequest, ProfileUpdate, RegisterRequest, User};
use market_core::session::{Session, SessionState, TokenStore};

/// HTTP client plus the auth session it keeps in sync.
///
/// Every call that changes who is signed in goes through here so the bearer
/// token, the persisted tokens and the session state never drift apart.
#[derive(Debug)]
pub struct MarketClient<S> {
    http: HttpClient,
    session: Session<S>,
}

impl<S: TokenStore> MarketClient<S> {
    pub fn new(base_url: impl Into<String>, store: S) -> Self {
        Self {
            http: HttpClient::new(base_url),
            session: Session::new(store),
        }
    }

    /// Resource endpoints, authorized as the current user.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.user()
    }

    /// Restores the session from the persisted token.
    ///
    /// `Ok(None)` when nothing was stored. A stored token the server rejects
    /// is cleared and its error returned.
    pub async fn refresh_from_stored_token(&mut self) -> Result<Option<User>, ClientError> {
        let Some(token) = self.session.begin_hydrate() else {
            tracing::debug!("No stored token");
            self.http.set_token(None);
            return Ok(None);
        };

        self.http.set_token(Some(token));
        match self.http.profile().await {
            Ok(user) => Ok(self.session.finish_hydrate(Ok(user)).cloned()),
            Err(e) => {
                let api_error = e.into_api_error();
                self.session.finish_hydrate(Err(api_error.clone()));
                self.http.set_token(None);
                Err(api_error.into())
            }
        }
    }

    pub async fn sign_in(&mut self, credentials: &LoginRequest) -> Result<User, ClientError> {
        let auth = self.http.login(credentials).await?;
        let access = auth.tokens.access.clone();
        let user = self.session.establish(auth)?;
        self.http.set_token(Some(access));
        tracing::info!("Signed in as {}", user.username);
        Ok(user)
    }

    pub async fn sign_up(&mut self, fields: &RegisterRequest) -> Result<User, ClientError> {
        let auth = self.http.register(fields).await?;
        let access = auth.tokens.access.clone();
        let user = self.session.establish(auth)?;
        self.http.set_token(Some(access));
        tracing::info!("Registered as {}", user.username);
        Ok(user)
    }

    pub fn sign_out(&mut self) -> Result<(), ClientError> {
        self.http.set_token(None);
        self.session.sign_out()?;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Saves the profile and refreshes the signed-in user from the server.
    pub async fn update_profile(&mut self, update: &ProfileUpdate) -> Result<User, ClientError> {
        self.http.update_profile(update).await?;
        let user = self.http.profile().await?;
        self.session.update_user(user.clone());
        Ok(user)
    }
}
