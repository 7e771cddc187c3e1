//! Router assembly for the library catalog API.
//!
//! # Route Structure
//!
//! ```text
//! POST   /api/signup             - Register (public)
//! POST   /api/log-in             - Authenticate (public)
//! GET    /api/fetch-user         - Current user (session)
//! POST   /api/logout             - Clear session (public)
//! POST   /api/add-book           - Create book (session)
//! GET    /api/fetch-books        - List books (public)
//! GET    /api/search             - Search titles (public)
//! GET    /api/fetch-book/{id}    - Book details (public)
//! DELETE /api/delete-book/{id}   - Delete book (session)
//! POST   /api/update-book/{id}   - Update book (session)
//! ```
//!
//! In production builds the router additionally serves the prebuilt
//! frontend from a static directory, with a catch-all fallback to its
//! `index.html`.

use std::path::PathBuf;

use axum::extract::DefaultBodyLimit;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::catalog::CatalogStore;
use crate::image::ImageStore;

use super::auth::auth_middleware;
use super::handlers::{
    add_book, delete_book, fetch_book, fetch_books, fetch_user, login, logout, search_books,
    signup, update_book, AppState,
};

/// Default JSON body limit: covers arrive base64-encoded in the add-book
/// body, so the limit is well above axum's 2MB default.
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin, without
    /// credentials)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,

    /// Directory of the prebuilt frontend to serve (production only)
    pub static_dir: Option<PathBuf>,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl RouterConfig {
    /// Create a router configuration with defaults: any origin, tracing
    /// on, no static frontend, 20MB bodies.
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
            static_dir: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Pin the allowed CORS origins. Pinned origins are also granted
    /// credentials so the session cookie flows cross-origin.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    /// Serve the prebuilt frontend from this directory, falling back to
    /// its `index.html` for unknown paths.
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Set the maximum accepted request body size.
    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router.
///
/// Session-protected routes go through the auth middleware; everything
/// else is public. CORS and the body limit apply to all routes.
pub fn create_router<S, I>(state: AppState<S, I>, config: RouterConfig) -> Router
where
    S: CatalogStore,
    I: ImageStore,
{
    let sessions = state.sessions.clone();

    // Session-protected routes. The middleware is applied after the
    // routes so rejections happen before any handler runs.
    let protected = Router::new()
        .route("/api/fetch-user", get(fetch_user::<S, I>))
        .route("/api/add-book", post(add_book::<S, I>))
        .route("/api/delete-book/{id}", delete(delete_book::<S, I>))
        .route("/api/update-book/{id}", post(update_book::<S, I>))
        .layer(middleware::from_fn_with_state(sessions, auth_middleware))
        .with_state(state.clone());

    let public = Router::new()
        .route("/api/signup", post(signup::<S, I>))
        .route("/api/log-in", post(login::<S, I>))
        .route("/api/logout", post(logout))
        .route("/api/fetch-books", get(fetch_books::<S, I>))
        .route("/api/search", get(search_books::<S, I>))
        .route("/api/fetch-book/{id}", get(fetch_book::<S, I>))
        .with_state(state);

    let mut router = Router::new()
        .merge(protected)
        .merge(public)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(build_cors_layer(&config));

    if let Some(ref dir) = config.static_dir {
        let index = dir.join("index.html");
        router = router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
///
/// Credentials (cookies) are only allowed together with pinned origins;
/// the wildcard origin cannot carry credentials.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed).allow_credentials(true)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
