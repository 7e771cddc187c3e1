//! The `CatalogStore` trait: the seam between HTTP handlers and the
//! document store.
//!
//! Handlers are generic over this trait so the production MongoDB
//! implementation ([`MongoCatalog`](super::MongoCatalog)) can be swapped
//! for an in-memory store in tests.

use async_trait::async_trait;

use crate::catalog::models::{Book, BookPatch, NewBook, NewUser, User};
use crate::error::StoreError;

/// Persistence operations needed by the auth and book flows.
///
/// Ids are opaque strings (hex ObjectIds in the Mongo implementation).
/// Listing and searching return books newest-first by creation time.
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    /// Persist a new user and return the stored record.
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;

    /// Look up a user by exact email.
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Look up a user by exact username.
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Look up a user by id. A malformed id reads as "no such user".
    async fn user_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Persist a new book and return the stored record.
    async fn insert_book(&self, new: NewBook) -> Result<Book, StoreError>;

    /// All books, newest first. No pagination.
    async fn list_books(&self) -> Result<Vec<Book>, StoreError>;

    /// Books whose title contains `term` case-insensitively, newest
    /// first. An empty term matches everything.
    async fn search_books(&self, term: &str) -> Result<Vec<Book>, StoreError>;

    /// Look up a book by id. A malformed id reads as "no such book".
    async fn book_by_id(&self, id: &str) -> Result<Option<Book>, StoreError>;

    /// Replace a book's fields and return the post-update record.
    ///
    /// Fails with [`StoreError::NotFound`] if the id does not exist.
    /// Last-write-wins under concurrent updates; there is no versioning.
    async fn update_book(&self, id: &str, patch: BookPatch) -> Result<Book, StoreError>;

    /// Remove a book record. Fails with [`StoreError::NotFound`] if the
    /// id does not exist.
    async fn delete_book(&self, id: &str) -> Result<(), StoreError>;
}
