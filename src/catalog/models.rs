//! Catalog record types.
//!
//! `User` is the internal representation and deliberately does not
//! implement `Serialize`: the password hash must never reach a client.
//! Every serialized user is a [`UserProfile`] projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user as stored in the catalog.
///
/// Internal type. Responses use [`UserProfile`] instead, so the hash is
/// excluded by construction rather than by per-call-site field omission.
#[derive(Debug, Clone)]
pub struct User {
    /// Record id (hex-encoded ObjectId)
    pub id: String,
    pub username: String,
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The safe projection served to clients.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public projection of a user: everything except the credential hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Fields required to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// A book entry in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Record id (hex-encoded ObjectId)
    pub id: String,
    /// URL of the cover image on the hosted image service
    pub image: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub link: String,
    pub review: String,
    /// Owner's user id. Weak association only: ownership is not
    /// enforced on update/delete.
    pub user: String,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a book.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub image: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub link: String,
    pub review: String,
    pub user: String,
}

/// Replacement fields for a book update.
///
/// Textual fields are always replaced; the image URL only when present
/// (a missing `image` leaves the stored URL untouched).
#[derive(Debug, Clone)]
pub struct BookPatch {
    pub image: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub link: String,
    pub review: String,
}

/// Owner reference embedded in a book detail response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookOwner {
    pub id: String,
    pub username: String,
}

/// A book with its owner's username resolved, for the detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    pub id: String,
    pub image: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub link: String,
    pub review: String,
    pub user: BookOwner,
    pub created_at: DateTime<Utc>,
}

impl BookDetails {
    /// Join a book with its resolved owner.
    pub fn new(book: Book, owner: BookOwner) -> Self {
        Self {
            id: book.id,
            image: book.image,
            title: book.title,
            subtitle: book.subtitle,
            author: book.author,
            link: book.link,
            review: book.review,
            user: owner,
            created_at: book.created_at,
        }
    }
}
