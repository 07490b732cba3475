use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PlisioApiError {
    #[error("Could not initialize the Plisio API client. {0}")]
    Initialization(String),
    #[error("Error sending request to Plisio: {0}")]
    RequestError(String),
    #[error("Plisio did not respond within the configured timeout")]
    Timeout,
    #[error("Plisio returned an error response ({status}): {message}")]
    QueryError { status: u16, message: String },
    #[error("Plisio rejected the request: {0}")]
    ApiError(String),
    #[error("Error decoding Plisio response: {0}")]
    JsonError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("The payload carries no verify_hash field")]
    MissingSignature,
    #[error("The verify_hash field is not a valid hex-encoded signature")]
    MalformedSignature,
    #[error("The verify_hash signature does not match the payload")]
    InvalidSignature,
}
