//! HTTP request handlers for the library catalog API.
//!
//! # Endpoints
//!
//! Auth flow:
//!
//! - `POST /api/signup` - Register and start a session
//! - `POST /api/log-in` - Authenticate and start a session
//! - `GET /api/fetch-user` - Current user for the session cookie
//! - `POST /api/logout` - Clear the session cookie
//!
//! Book flow:
//!
//! - `POST /api/add-book` - Create a book (uploads the cover first)
//! - `GET /api/fetch-books` - All books, newest first
//! - `GET /api/search?searchTerm=` - Title substring search
//! - `GET /api/fetch-book/{id}` - One book with its owner's username
//! - `DELETE /api/delete-book/{id}` - Delete a book and its cover
//! - `POST /api/update-book/{id}` - Replace fields, optionally the cover
//!
//! Every failure maps to HTTP 400 with a `{message}` body; the auth
//! middleware maps missing/invalid session tokens to 401.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::catalog::{
    Book, BookDetails, BookOwner, BookPatch, CatalogStore, NewBook, NewUser, UserProfile,
};
use crate::error::{ApiError, StoreError};
use crate::image::{cover_file_name, file_id_from_url, ImageStore};

use super::auth::{clear_session_cookie, session_cookie, AuthedUser, SessionAuth};

/// Default bcrypt cost factor (10 rounds).
pub const DEFAULT_HASH_COST: u32 = 10;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state handed to every handler.
///
/// Holds the injected document-store and image-store clients (long-lived,
/// constructed once at startup) plus the session authenticator. Handlers
/// receive references through Axum's State extractor; there is no global
/// mutable state.
pub struct AppState<S: CatalogStore, I: ImageStore> {
    /// Document store holding users and books
    pub store: Arc<S>,

    /// Hosted image service client
    pub images: Arc<I>,

    /// Session credential issuer/verifier
    pub sessions: SessionAuth,

    /// Whether session cookies carry the Secure flag (production)
    pub secure_cookies: bool,

    /// bcrypt cost factor for password hashing
    pub hash_cost: u32,
}

impl<S: CatalogStore, I: ImageStore> AppState<S, I> {
    /// Create application state with default cookie and hashing settings.
    pub fn new(store: S, images: I, sessions: SessionAuth) -> Self {
        Self {
            store: Arc::new(store),
            images: Arc::new(images),
            sessions,
            secure_cookies: false,
            hash_cost: DEFAULT_HASH_COST,
        }
    }

    /// Set whether session cookies carry the Secure flag.
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Set the bcrypt cost factor. Tests use a low cost to stay fast.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }
}

impl<S: CatalogStore, I: ImageStore> Clone for AppState<S, I> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            images: Arc::clone(&self.images),
            sessions: self.sessions.clone(),
            secure_cookies: self.secure_cookies,
            hash_cost: self.hash_cost,
        }
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// Body of `POST /api/signup`.
///
/// Fields default to empty so a missing field surfaces as a validation
/// error rather than a deserialization rejection.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /api/log-in`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /api/add-book`. `image` is the cover payload (base64
/// or URL), passed through to the image service untouched.
#[derive(Debug, Serialize, Deserialize)]
pub struct AddBookRequest {
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub review: String,
}

/// Body of `POST /api/update-book/{id}`. A present `image` replaces the
/// cover; an absent one leaves the stored URL unchanged.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateBookRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub review: String,
}

/// Query parameters of `GET /api/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Title search term; empty matches everything
    #[serde(default, rename = "searchTerm")]
    pub search_term: String,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error body returned for all failure conditions.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message; not guaranteed stable
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response of signup and log-in.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub message: String,
}

/// Response of fetch-user.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: UserProfile,
}

/// Response of logout and delete-book.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response of add-book and update-book.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub book: Book,
    pub message: String,
}

/// Response of fetch-books and search.
#[derive(Debug, Serialize, Deserialize)]
pub struct BooksResponse {
    pub books: Vec<Book>,
}

/// Response of fetch-book.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookDetailsResponse {
    pub book: BookDetails,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert ApiError to an HTTP response.
///
/// The wire contract is deliberately coarse: every kind is a 400 with a
/// `{message}` body. Backend failures are logged at ERROR, expected
/// client errors at DEBUG.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Store(e) => {
                error!(status = 400, "Store error: {}", e);
            }
            ApiError::Image(e) => {
                error!(status = 400, "Image service error: {}", e);
            }
            ApiError::Internal(msg) => {
                error!(status = 400, "Internal error: {}", msg);
            }
            _ => {
                debug!(status = 400, "Request failed: {}", self);
            }
        }

        let body = ErrorResponse::new(self.to_string());
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

// =============================================================================
// Auth Handlers
// =============================================================================

/// Handle signup requests.
///
/// # Endpoint
///
/// `POST /api/signup`
///
/// Validates that all fields are present, rejects duplicate emails and
/// usernames (email checked first), hashes the password, persists the
/// user, and starts a session. The response carries the safe profile
/// only; the credential hash never leaves the server.
pub async fn signup<S: CatalogStore, I: ImageStore>(
    State(state): State<AppState<S, I>>,
    Json(req): Json<SignupRequest>,
) -> Result<Response, ApiError> {
    if req.username.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation("All fields are required.".to_string()));
    }

    if state.store.user_by_email(&req.email).await?.is_some() {
        return Err(ApiError::Conflict("User already exists.".to_string()));
    }
    if state.store.user_by_username(&req.username).await?.is_some() {
        return Err(ApiError::Conflict(
            "Username is taken. Try another name.".to_string(),
        ));
    }

    let password_hash =
        bcrypt::hash(&req.password, state.hash_cost).map_err(|e| ApiError::Internal(e.to_string()))?;

    let user = state
        .store
        .create_user(NewUser {
            username: req.username,
            email: req.email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            // Lost a race against a concurrent signup
            StoreError::Duplicate { .. } => ApiError::Conflict("User already exists.".to_string()),
            other => other.into(),
        })?;

    let token = state
        .sessions
        .issue(&user.id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let cookie = session_cookie(&token, state.secure_cookies);

    let body = AuthResponse {
        user: user.profile(),
        message: "User created successfully.".to_string(),
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// Handle log-in requests.
///
/// # Endpoint
///
/// `POST /api/log-in`
///
/// An unknown email and a wrong password produce the identical
/// "Invalid Credentials" message so accounts cannot be enumerated.
pub async fn login<S: CatalogStore, I: ImageStore>(
    State(state): State<AppState<S, I>>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let user = state
        .store
        .user_by_email(&req.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let valid = bcrypt::verify(&req.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state
        .sessions
        .issue(&user.id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let cookie = session_cookie(&token, state.secure_cookies);

    let body = AuthResponse {
        user: user.profile(),
        message: "Logged in successfully.".to_string(),
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// Handle fetch-user requests.
///
/// # Endpoint
///
/// `GET /api/fetch-user` (session required)
///
/// Returns the full safe profile for the session's user. A valid token
/// whose user no longer exists is a 400.
pub async fn fetch_user<S: CatalogStore, I: ImageStore>(
    State(state): State<AppState<S, I>>,
    Extension(AuthedUser(user_id)): Extension<AuthedUser>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .store
        .user_by_id(&user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse {
        user: user.profile(),
    }))
}

/// Handle logout requests.
///
/// # Endpoint
///
/// `POST /api/logout`
///
/// Clears the session cookie unconditionally; always succeeds, session
/// or not.
pub async fn logout() -> Response {
    let body = MessageResponse {
        message: "Logged out successfully".to_string(),
    };
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(body),
    )
        .into_response()
}

// =============================================================================
// Book Handlers
// =============================================================================

/// Handle add-book requests.
///
/// # Endpoint
///
/// `POST /api/add-book` (session required)
///
/// Uploads the cover as `{title}-cover.jpg` under the library folder,
/// then inserts the record referencing the returned URL and the
/// session's user id. The upload happens before the insert: a failed
/// insert after a successful upload orphans the asset (accepted gap,
/// no compensating delete).
pub async fn add_book<S: CatalogStore, I: ImageStore>(
    State(state): State<AppState<S, I>>,
    Extension(AuthedUser(user_id)): Extension<AuthedUser>,
    Json(req): Json<AddBookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let uploaded = state
        .images
        .upload(&cover_file_name(&req.title), &req.image)
        .await?;

    let book = state
        .store
        .insert_book(NewBook {
            image: uploaded.url,
            title: req.title,
            subtitle: req.subtitle,
            author: req.author,
            link: req.link,
            review: req.review,
            user: user_id,
        })
        .await?;

    Ok(Json(BookResponse {
        book,
        message: "Book added successfully".to_string(),
    }))
}

/// Handle fetch-books requests.
///
/// # Endpoint
///
/// `GET /api/fetch-books`
///
/// All books, newest first. No pagination.
pub async fn fetch_books<S: CatalogStore, I: ImageStore>(
    State(state): State<AppState<S, I>>,
) -> Result<Json<BooksResponse>, ApiError> {
    let books = state.store.list_books().await?;
    Ok(Json(BooksResponse { books }))
}

/// Handle search requests.
///
/// # Endpoint
///
/// `GET /api/search?searchTerm=`
///
/// Case-insensitive substring match on titles; an empty term returns
/// the same set as fetch-books, in the same order.
pub async fn search_books<S: CatalogStore, I: ImageStore>(
    State(state): State<AppState<S, I>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<BooksResponse>, ApiError> {
    let books = state.store.search_books(&params.search_term).await?;
    Ok(Json(BooksResponse { books }))
}

/// Handle fetch-book requests.
///
/// # Endpoint
///
/// `GET /api/fetch-book/{id}`
///
/// One book with the owner's username resolved.
pub async fn fetch_book<S: CatalogStore, I: ImageStore>(
    State(state): State<AppState<S, I>>,
    Path(id): Path<String>,
) -> Result<Json<BookDetailsResponse>, ApiError> {
    let book = state
        .store
        .book_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))?;

    let owner = state
        .store
        .user_by_id(&book.user)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book owner not found".to_string()))?;

    let details = BookDetails::new(
        book,
        BookOwner {
            id: owner.id,
            username: owner.username,
        },
    );
    Ok(Json(BookDetailsResponse { book: details }))
}

/// Handle delete-book requests.
///
/// # Endpoint
///
/// `DELETE /api/delete-book/{id}` (session required)
///
/// Derives the asset id from the stored cover URL and requests its
/// deletion before removing the record. The image delete is awaited but
/// non-fatal: a failure is logged and never blocks the record delete or
/// reaches the client. Any valid session may delete any book; ownership
/// is not enforced.
pub async fn delete_book<S: CatalogStore, I: ImageStore>(
    State(state): State<AppState<S, I>>,
    Extension(AuthedUser(_user_id)): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let book = state
        .store
        .book_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))?;

    delete_cover(state.images.as_ref(), &book.image).await;

    state.store.delete_book(&id).await.map_err(|e| match e {
        StoreError::NotFound(_) => ApiError::NotFound("Book not found".to_string()),
        other => other.into(),
    })?;

    Ok(Json(MessageResponse {
        message: "Book deleted successfully.".to_string(),
    }))
}

/// Handle update-book requests.
///
/// # Endpoint
///
/// `POST /api/update-book/{id}` (session required)
///
/// With an `image` payload: the old cover is deleted (non-fatal, as in
/// delete-book), the new one uploaded, and all fields replaced
/// including the URL. Without one, only the textual fields change.
/// Returns the post-update record. Ownership is not enforced.
pub async fn update_book<S: CatalogStore, I: ImageStore>(
    State(state): State<AppState<S, I>>,
    Extension(AuthedUser(_user_id)): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateBookRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let image = match req.image {
        Some(payload) => {
            let book = state
                .store
                .book_by_id(&id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))?;

            delete_cover(state.images.as_ref(), &book.image).await;

            let uploaded = state
                .images
                .upload(&cover_file_name(&req.title), &payload)
                .await?;
            Some(uploaded.url)
        }
        None => None,
    };

    let book = state
        .store
        .update_book(
            &id,
            BookPatch {
                image,
                title: req.title,
                subtitle: req.subtitle,
                author: req.author,
                link: req.link,
                review: req.review,
            },
        )
        .await
        .map_err(|e| match e {
            StoreError::NotFound(_) => ApiError::NotFound("Book not found".to_string()),
            other => other.into(),
        })?;

    Ok(Json(BookResponse {
        book,
        message: "Book updated successfully".to_string(),
    }))
}

/// Request deletion of a stored cover asset, swallowing failures.
///
/// Delete failures are logged at WARN and never surfaced: the catalog
/// record mutation proceeds regardless.
async fn delete_cover<I: ImageStore>(images: &I, image_url: &str) {
    let Some(file_id) = file_id_from_url(image_url) else {
        warn!(url = image_url, "Could not derive asset id from cover URL");
        return;
    };
    if let Err(e) = images.delete(&file_id).await {
        warn!(file_id = %file_id, "Cover delete failed (ignored): {}", e);
    }
}
