//! MongoDB-backed catalog store.
//!
//! Users live in the `users` collection, books in `books`. Field names
//! follow the deployed schema (`password`, `createdAt`), ids are
//! ObjectIds surfaced to the rest of the crate as hex strings.

use async_trait::async_trait;
use futures_util::stream::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};

use crate::catalog::models::{Book, BookPatch, NewBook, NewUser, User};
use crate::catalog::store::CatalogStore;
use crate::error::StoreError;

/// Name of the users collection.
const USERS_COLLECTION: &str = "users";

/// Name of the books collection.
const BOOKS_COLLECTION: &str = "books";

// =============================================================================
// Stored document shapes
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct UserDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    username: String,
    email: String,
    password: String,
    #[serde(rename = "createdAt")]
    created_at: bson::DateTime,
}

#[derive(Debug, Serialize, Deserialize)]
struct BookDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    image: String,
    title: String,
    subtitle: String,
    author: String,
    link: String,
    review: String,
    user: ObjectId,
    #[serde(rename = "createdAt")]
    created_at: bson::DateTime,
}

impl UserDoc {
    fn into_user(self) -> Result<User, StoreError> {
        let id = self
            .id
            .ok_or_else(|| StoreError::Backend("user document missing _id".to_string()))?;
        Ok(User {
            id: id.to_hex(),
            username: self.username,
            email: self.email,
            password_hash: self.password,
            created_at: self.created_at.to_chrono(),
        })
    }
}

impl BookDoc {
    fn into_book(self) -> Result<Book, StoreError> {
        let id = self
            .id
            .ok_or_else(|| StoreError::Backend("book document missing _id".to_string()))?;
        Ok(Book {
            id: id.to_hex(),
            image: self.image,
            title: self.title,
            subtitle: self.subtitle,
            author: self.author,
            link: self.link,
            review: self.review,
            user: self.user.to_hex(),
            created_at: self.created_at.to_chrono(),
        })
    }
}

// =============================================================================
// MongoCatalog
// =============================================================================

/// MongoDB implementation of [`CatalogStore`].
///
/// Holds typed collection handles over a shared, externally pooled
/// connection. Constructed once at startup and injected into the app
/// state; never a global.
#[derive(Clone)]
pub struct MongoCatalog {
    users: Collection<UserDoc>,
    books: Collection<BookDoc>,
}

impl MongoCatalog {
    /// Create a catalog over the given database.
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection(USERS_COLLECTION),
            books: db.collection(BOOKS_COLLECTION),
        }
    }
}

/// Map a driver error to a store error, turning duplicate-key write
/// failures into [`StoreError::Duplicate`].
fn map_write_error(err: mongodb::error::Error, field: &'static str) -> StoreError {
    use mongodb::error::{ErrorKind, WriteFailure};

    if let ErrorKind::Write(WriteFailure::WriteError(ref write_err)) = *err.kind {
        // 11000 is the server's duplicate-key code
        if write_err.code == 11000 {
            return StoreError::Duplicate { field };
        }
    }
    StoreError::Backend(err.to_string())
}

fn backend(err: mongodb::error::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// Newest-first sort on creation time.
fn newest_first() -> FindOptions {
    FindOptions::builder().sort(doc! { "createdAt": -1 }).build()
}

#[async_trait]
impl CatalogStore for MongoCatalog {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let doc = UserDoc {
            id: None,
            username: new.username,
            email: new.email,
            password: new.password_hash,
            created_at: bson::DateTime::now(),
        };

        let result = self
            .users
            .insert_one(&doc, None)
            .await
            .map_err(|e| map_write_error(e, "email"))?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::Backend("insert returned no ObjectId".to_string()))?;

        Ok(User {
            id: id.to_hex(),
            username: doc.username,
            email: doc.email,
            password_hash: doc.password,
            created_at: doc.created_at.to_chrono(),
        })
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.users
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(backend)?
            .map(UserDoc::into_user)
            .transpose()
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.users
            .find_one(doc! { "username": username }, None)
            .await
            .map_err(backend)?
            .map(UserDoc::into_user)
            .transpose()
    }

    async fn user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };
        self.users
            .find_one(doc! { "_id": oid }, None)
            .await
            .map_err(backend)?
            .map(UserDoc::into_user)
            .transpose()
    }

    async fn insert_book(&self, new: NewBook) -> Result<Book, StoreError> {
        let owner =
            ObjectId::parse_str(&new.user).map_err(|_| StoreError::InvalidId(new.user.clone()))?;

        let doc = BookDoc {
            id: None,
            image: new.image,
            title: new.title,
            subtitle: new.subtitle,
            author: new.author,
            link: new.link,
            review: new.review,
            user: owner,
            created_at: bson::DateTime::now(),
        };

        let result = self.books.insert_one(&doc, None).await.map_err(backend)?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::Backend("insert returned no ObjectId".to_string()))?;

        Ok(Book {
            id: id.to_hex(),
            image: doc.image,
            title: doc.title,
            subtitle: doc.subtitle,
            author: doc.author,
            link: doc.link,
            review: doc.review,
            user: doc.user.to_hex(),
            created_at: doc.created_at.to_chrono(),
        })
    }

    async fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        let docs: Vec<BookDoc> = self
            .books
            .find(doc! {}, newest_first())
            .await
            .map_err(backend)?
            .try_collect()
            .await
            .map_err(backend)?;

        docs.into_iter().map(BookDoc::into_book).collect()
    }

    async fn search_books(&self, term: &str) -> Result<Vec<Book>, StoreError> {
        // The term is used as a raw regex pattern; an empty pattern
        // matches every title.
        let filter = doc! { "title": { "$regex": term, "$options": "i" } };

        let docs: Vec<BookDoc> = self
            .books
            .find(filter, newest_first())
            .await
            .map_err(backend)?
            .try_collect()
            .await
            .map_err(backend)?;

        docs.into_iter().map(BookDoc::into_book).collect()
    }

    async fn book_by_id(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };
        self.books
            .find_one(doc! { "_id": oid }, None)
            .await
            .map_err(backend)?
            .map(BookDoc::into_book)
            .transpose()
    }

    async fn update_book(&self, id: &str, patch: BookPatch) -> Result<Book, StoreError> {
        let oid = ObjectId::parse_str(id).map_err(|_| StoreError::NotFound("Book"))?;

        let mut set: Document = doc! {
            "title": &patch.title,
            "subtitle": &patch.subtitle,
            "author": &patch.author,
            "link": &patch.link,
            "review": &patch.review,
        };
        if let Some(ref image) = patch.image {
            set.insert("image", image);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .books
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set }, options)
            .await
            .map_err(backend)?
            .ok_or(StoreError::NotFound("Book"))?;

        updated.into_book()
    }

    async fn delete_book(&self, id: &str) -> Result<(), StoreError> {
        let oid = ObjectId::parse_str(id).map_err(|_| StoreError::NotFound("Book"))?;

        let result = self
            .books
            .delete_one(doc! { "_id": oid }, None)
            .await
            .map_err(backend)?;

        if result.deleted_count == 0 {
            return Err(StoreError::NotFound("Book"));
        }
        Ok(())
    }
}
