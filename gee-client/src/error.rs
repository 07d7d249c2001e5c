use thiserror::Error;

#[derive(Error, Debug)]
pub enum EeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Not authenticated, call an authentication method first")]
    NotAuthenticated,

    #[error("Invalid service account private key: {0}")]
    InvalidPrivateKey(#[from] jsonwebtoken::errors::Error),

    #[error("Failed to send request: {0}")]
    RequestFailed(String),

    #[error("Response error (status {0}): {1}")]
    ResponseError(u16, String),

    #[error("Failed to deserialize response: {0}")]
    DeserializationError(String),

    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}
