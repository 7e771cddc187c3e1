//! Cookie-based session authentication.
//!
//! # Session scheme
//!
//! A session credential is a JWT signed with the server secret
//! (HS256), carrying the user id and an expiry 7 days out:
//!
//! ```text
//! claims = { sub: <user id>, exp: <issued-at + 7 days> }
//! ```
//!
//! The token travels in a browser-managed `token` cookie that is
//! HttpOnly and SameSite=Strict (plus Secure when the server is
//! configured for production). There is no server-side session table:
//! validity is signature verification plus non-expiry.
//!
//! # Status codes
//!
//! A missing, invalid, or expired token is always a 401 with a
//! `{message}` body. Everything past the middleware deals with an
//! authenticated user id.
//!
//! # Example
//!
//! ```rust
//! use bookshelf::server::auth::SessionAuth;
//!
//! let auth = SessionAuth::new("my-secret-key");
//! let token = auth.issue("64b0c0ffee0000000000a11c").unwrap();
//! assert_eq!(auth.verify(&token).unwrap(), "64b0c0ffee0000000000a11c");
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::handlers::ErrorResponse;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

/// Session lifetime: 7 days, in seconds.
pub const SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

// =============================================================================
// Types
// =============================================================================

/// JWT claims carried by a session credential.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id the session belongs to
    pub sub: String,

    /// Expiry as Unix epoch seconds
    pub exp: u64,
}

/// Authentication error types.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// No session cookie on the request
    #[error("No token provided.")]
    MissingToken,

    /// Token failed signature verification or has expired
    #[error("Invalid token")]
    InvalidToken,

    /// Token could not be created (key or serialization problem)
    #[error("Could not create session token: {0}")]
    TokenCreation(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Invalid and missing tokens are routine; log at debug only.
        debug!(status = 401, "Authentication failed: {}", self);
        let body = ErrorResponse::new(self.to_string());
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

// =============================================================================
// Session Authentication
// =============================================================================

/// Issues and verifies session credentials.
///
/// Cheap to clone; holds only the secret bytes.
#[derive(Clone)]
pub struct SessionAuth {
    /// Secret key for JWT signing
    secret: Vec<u8>,
}

impl SessionAuth {
    /// Create an authenticator with the given secret key.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Issue a session token for a user, valid for
    /// [`SESSION_TTL_SECS`] from now.
    pub fn issue(&self, user_id: &str) -> Result<String, AuthError> {
        let expiry = unix_now() + SESSION_TTL_SECS;
        self.issue_with_expiry(user_id, expiry)
    }

    /// Issue a session token with a specific expiry timestamp.
    ///
    /// Useful for tests that need tokens at particular points of their
    /// lifetime.
    pub fn issue_with_expiry(&self, user_id: &str, expiry: u64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiry,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Verify a token and return the user id it was issued for.
    ///
    /// Fails with [`AuthError::InvalidToken`] on a bad signature or an
    /// expired credential.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &Validation::default(),
        )
        .map_err(|_| AuthError::InvalidToken)?;

        Ok(data.claims.sub)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before Unix epoch")
        .as_secs()
}

// =============================================================================
// Cookie handling
// =============================================================================

/// Build the `Set-Cookie` value carrying a session token.
///
/// HttpOnly and SameSite=Strict always; Secure only when `secure` is
/// set (production).
pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Strict",
        SESSION_COOKIE, token, SESSION_TTL_SECS
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the `Set-Cookie` value that clears the session cookie.
pub fn clear_session_cookie() -> String {
    format!(
        "{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Strict",
        SESSION_COOKIE
    )
}

/// Extract the session token from the request's `Cookie` headers.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(value) = value.to_str() else { continue };
        for pair in value.split(';') {
            let Some(rest) = pair.trim().strip_prefix(SESSION_COOKIE) else {
                continue;
            };
            if let Some(token) = rest.strip_prefix('=') {
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }
    None
}

// =============================================================================
// Axum Middleware
// =============================================================================

/// The authenticated user id, inserted into request extensions by
/// [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthedUser(pub String);

/// Axum middleware verifying the session cookie.
///
/// Rejects requests without a valid session with a 401; on success the
/// user id is available to handlers as `Extension<AuthedUser>`.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, middleware};
/// use bookshelf::server::auth::{SessionAuth, auth_middleware};
///
/// let auth = SessionAuth::new("secret-key");
/// let app = Router::new()
///     .route("/api/fetch-user", get(fetch_user))
///     .layer(middleware::from_fn_with_state(auth, auth_middleware));
/// ```
pub async fn auth_middleware(
    State(auth): State<SessionAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = token_from_headers(request.headers()).ok_or(AuthError::MissingToken)?;
    let user_id = auth.verify(&token)?;

    request.extensions_mut().insert(AuthedUser(user_id));
    Ok(next.run(request).await)
}

// =============================================================================
// Tests
// =============================================================================
