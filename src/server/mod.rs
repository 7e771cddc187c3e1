//! HTTP server layer for the library catalog.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │                    /api/* (JSON, cookies)                       │
//! │                                                                 │
//! │  ┌─────────────┐  ┌──────────────┐  ┌────────────────────────┐  │
//! │  │  handlers   │  │     auth     │  │        routes          │  │
//! │  │ (requests)  │  │ (JWT cookie) │  │   (router config)      │  │
//! │  └─────────────┘  └──────────────┘  └────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod routes;

pub use auth::{
    auth_middleware, clear_session_cookie, session_cookie, token_from_headers, AuthError,
    AuthedUser, Claims, SessionAuth, SESSION_COOKIE, SESSION_TTL_SECS,
};
pub use handlers::{
    add_book, delete_book, fetch_book, fetch_books, fetch_user, login, logout, search_books,
    signup, update_book, AddBookRequest, AppState, AuthResponse, BookDetailsResponse,
    BookResponse, BooksResponse, ErrorResponse, LoginRequest, MessageResponse, SearchParams,
    SignupRequest, UpdateBookRequest, UserResponse, DEFAULT_HASH_COST,
};
pub use routes::{create_router, RouterConfig, DEFAULT_MAX_BODY_BYTES};
