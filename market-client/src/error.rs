use market_core::error::ApiError;
use market_core::session::TokenStoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    // HTTP ошибки
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // Ответ сервера
    #[error(transparent)]
    Api(#[from] ApiError),

    // Хранилище токенов
    #[error("Token storage error: {0}")]
    Storage(#[from] TokenStoreError),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api(e) if e.is_not_found())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api(e) if e.is_unauthorized())
    }

    /// Collapses into the view-level taxonomy. Transport and storage
    /// failures surface as network errors.
    pub fn into_api_error(self) -> ApiError {
        match self {
            ClientError::Api(e) => e,
            ClientError::Http(e) if e.is_decode() => ApiError::Decode(e.to_string()),
            ClientError::Http(e) => ApiError::Network(e.to_string()),
            ClientError::Storage(e) => ApiError::Network(e.to_string()),
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        err.into_api_error()
    }
}
