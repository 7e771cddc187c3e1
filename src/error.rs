use thiserror::Error;

/// Errors from the document store backing the catalog.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The given id is not a valid record id
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// A unique field already holds this value
    #[error("Duplicate value for {field}")]
    Duplicate { field: &'static str },

    /// No record with the given id
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Error from the database driver or server
    #[error("Database error: {0}")]
    Backend(String),
}

/// Errors from the hosted image service.
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    /// Upload request failed or was rejected
    #[error("Image upload failed: {0}")]
    Upload(String),

    /// Delete request failed or was rejected
    #[error("Image delete failed: {0}")]
    Delete(String),

    /// Network or connection error reaching the service
    #[error("Image service unreachable: {0}")]
    Connection(String),
}

/// Request-boundary errors surfaced by the API handlers.
///
/// The wire contract is coarser than this taxonomy: every kind maps to
/// HTTP 400 with a `{message}` body (missing/invalid session tokens are
/// handled separately by the auth middleware and map to 401). The
/// `IntoResponse` impl lives in `server::handlers`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required request field is missing or empty
    #[error("{0}")]
    Validation(String),

    /// A unique field (email, username) is already taken
    #[error("{0}")]
    Conflict(String),

    /// Unknown email or wrong password. The message is identical for
    /// both cases to avoid account enumeration.
    #[error("Invalid Credentials")]
    InvalidCredentials,

    /// The requested record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Document store failure
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Image service failure
    #[error("{0}")]
    Image(#[from] ImageError),

    /// Anything else (hashing, token encoding, ...)
    #[error("Internal error: {0}")]
    Internal(String),
}
