//! # Bookshelf
//!
//! A personal library catalog: session-based auth plus book CRUD, backed
//! by MongoDB, with cover images stored on an external image host.
//!
//! This library provides the full server and a small client layer. The
//! server exposes a JSON API under `/api/*`; sessions are JWTs carried
//! in an HttpOnly cookie. The client layer offers state-container
//! wrappers around the API for embedding in a UI.
//!
//! ## Features
//!
//! - **Cookie sessions**: HS256 JWTs in an HttpOnly, SameSite=Strict cookie
//! - **Book CRUD**: add, list, search, fetch, update, delete
//! - **External cover storage**: uploads and deletes go to an image host
//! - **Pluggable persistence**: the catalog sits behind a storage trait,
//!   so tests run against an in-memory store
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`catalog`] - Data model and the [`CatalogStore`](catalog::CatalogStore) trait with its MongoDB implementation
//! - [`image`] - Cover image storage behind the [`ImageStore`](image::ImageStore) trait
//! - [`server`] - Axum-based HTTP server: auth, handlers, routes
//! - [`client`] - Client-side state stores over the HTTP API
//! - [`config`] - CLI and configuration types
//! - [`error`] - Error types shared across layers
//!
//! ## Example
//!
//! ```rust,no_run
//! use bookshelf::catalog::MongoCatalog;
//! use bookshelf::image::HostedImageStore;
//! use bookshelf::server::{create_router, AppState, RouterConfig, SessionAuth};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = mongodb::Client::with_uri_str("mongodb://localhost:27017")
//!         .await
//!         .unwrap();
//!     let store = MongoCatalog::new(&client.database("bookshelf"));
//!     let images = HostedImageStore::new(
//!         "https://upload.images.test/v1/files/upload",
//!         "https://api.images.test/v1",
//!         "private_key",
//!     );
//!     let sessions = SessionAuth::new("secret");
//!
//!     let state = AppState::new(store, images, sessions);
//!     let router = create_router(state, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod image;
pub mod server;

// Re-export commonly used types
pub use catalog::{
    Book, BookDetails, BookOwner, BookPatch, CatalogStore, MongoCatalog, NewBook, NewUser, User,
    UserProfile,
};
pub use client::{AuthState, AuthStore, BookState, BookStore, ClientError};
pub use config::Config;
pub use error::{ApiError, ImageError, StoreError};
pub use image::{
    cover_file_name, file_id_from_url, HostedImageStore, ImageStore, UploadedImage, IMAGE_FOLDER,
};
pub use server::{
    auth_middleware, clear_session_cookie, create_router, session_cookie, token_from_headers,
    AppState, AuthError, AuthResponse, AuthedUser, BookDetailsResponse, BookResponse,
    BooksResponse, Claims, ErrorResponse, MessageResponse, RouterConfig, SessionAuth,
    UserResponse, DEFAULT_HASH_COST, DEFAULT_MAX_BODY_BYTES, SESSION_COOKIE, SESSION_TTL_SECS,
};
