//! Client-side state stores for the catalog API.
//!
//! Two independent state containers mediate between a UI and the HTTP
//! API: [`AuthStore`] for the auth flow and [`BookStore`] for the book
//! flow. Both are pure request/response relays: each action performs
//! one HTTP call, maps success to a state update, and maps failure to
//! an error field plus an error return. No caching, no retries, no
//! optimistic updates.
//!
//! The underlying HTTP client keeps a cookie jar, so the session cookie
//! set by signup/log-in flows back on subsequent requests.

mod auth_store;
mod book_store;

pub use auth_store::{AuthState, AuthStore};
pub use book_store::{BookState, BookStore};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::server::ErrorResponse;

/// Errors surfaced by store actions.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the request; carries its `{message}` body
    #[error("{message}")]
    Api { message: String },

    /// The request never produced a server response
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// The message an action records in its store's error field.
fn error_message(err: &ClientError, fallback: &str) -> String {
    match err {
        ClientError::Api { message } => message.clone(),
        ClientError::Http(_) => fallback.to_string(),
    }
}

/// Parse a response body, turning non-success statuses into
/// [`ClientError::Api`] with the server's message (or `fallback` when
/// the body is not the expected error shape).
async fn parse_json<T: DeserializeOwned>(
    response: reqwest::Response,
    fallback: &str,
) -> Result<T, ClientError> {
    if response.status().is_success() {
        return Ok(response.json::<T>().await?);
    }
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.message,
        Err(_) => fallback.to_string(),
    };
    Err(ClientError::Api { message })
}
