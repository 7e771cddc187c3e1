//! Catalog persistence layer.
//!
//! The catalog holds two collections, users and books, behind the
//! [`CatalogStore`] trait. Handlers only ever see the trait; the MongoDB
//! implementation is constructed once at startup and injected through
//! the app state.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP handlers              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │          CatalogStore trait             │
//! │   (users + books, id = hex string)      │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             MongoCatalog                │
//! │   ("users"/"books" collections)         │
//! └─────────────────────────────────────────┘
//! ```

mod models;
mod mongo;
mod store;

pub use models::{Book, BookDetails, BookOwner, BookPatch, NewBook, NewUser, User, UserProfile};
pub use mongo::MongoCatalog;
pub use store::CatalogStore;
