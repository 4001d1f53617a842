use sentinela_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request was rejected locally and never sent.
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error("{backend} is unreachable: {source}")]
    Transport {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{backend} returned HTTP {status}: {body}")]
    Http {
        backend: &'static str,
        status: u16,
        body: String,
    },

    #[error("{backend} sent an unexpected response: {message}")]
    Decode {
        backend: &'static str,
        message: String,
    },

    #[error("HTTP client error: {0}")]
    Build(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
