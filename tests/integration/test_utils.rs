//! Test utilities for integration tests.
//!
//! This module provides an in-memory catalog store, a recording mock
//! image store, and helpers for driving the router with tower's
//! `oneshot`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceExt;

use bookshelf::catalog::{Book, BookPatch, CatalogStore, NewBook, NewUser, User};
use bookshelf::error::{ImageError, StoreError};
use bookshelf::image::{ImageStore, UploadedImage};
use bookshelf::server::{create_router, AppState, RouterConfig, SessionAuth};

pub const TEST_SECRET: &str = "test-session-secret";

/// Low bcrypt cost to keep the suite fast.
pub const TEST_HASH_COST: u32 = 4;

// =============================================================================
// In-Memory Catalog Store
// =============================================================================

struct MemoryInner {
    users: Vec<User>,
    books: Vec<Book>,
    seq: usize,
}

/// An in-memory [`CatalogStore`] with the same observable semantics as
/// the MongoDB implementation: opaque hex ids, newest-first listing,
/// case-insensitive substring search.
#[derive(Clone)]
pub struct MemoryCatalog {
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryInner {
                users: Vec::new(),
                books: Vec::new(),
                seq: 0,
            })),
        }
    }

    pub async fn user_count(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn book_count(&self) -> usize {
        self.inner.read().await.books.len()
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn next_id(seq: &mut usize) -> String {
    *seq += 1;
    // Hex ids shaped like ObjectIds
    format!("{:024x}", *seq)
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::Duplicate { field: "email" });
        }
        if inner.users.iter().any(|u| u.username == new.username) {
            return Err(StoreError::Duplicate { field: "username" });
        }
        let user = User {
            id: next_id(&mut inner.seq),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_book(&self, new: NewBook) -> Result<Book, StoreError> {
        let mut inner = self.inner.write().await;
        let book = Book {
            id: next_id(&mut inner.seq),
            image: new.image,
            title: new.title,
            subtitle: new.subtitle,
            author: new.author,
            link: new.link,
            review: new.review,
            user: new.user,
            created_at: Utc::now(),
        };
        inner.books.push(book.clone());
        Ok(book)
    }

    async fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        let inner = self.inner.read().await;
        // Insertion order is creation order; newest first is the reverse
        Ok(inner.books.iter().rev().cloned().collect())
    }

    async fn search_books(&self, term: &str) -> Result<Vec<Book>, StoreError> {
        let needle = term.to_lowercase();
        let inner = self.inner.read().await;
        Ok(inner
            .books
            .iter()
            .rev()
            .filter(|b| b.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn book_by_id(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.books.iter().find(|b| b.id == id).cloned())
    }

    async fn update_book(&self, id: &str, patch: BookPatch) -> Result<Book, StoreError> {
        let mut inner = self.inner.write().await;
        let book = inner
            .books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(StoreError::NotFound("book"))?;
        if let Some(image) = patch.image {
            book.image = image;
        }
        book.title = patch.title;
        book.subtitle = patch.subtitle;
        book.author = patch.author;
        book.link = patch.link;
        book.review = patch.review;
        Ok(book.clone())
    }

    async fn delete_book(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.books.len();
        inner.books.retain(|b| b.id != id);
        if inner.books.len() == before {
            return Err(StoreError::NotFound("book"));
        }
        Ok(())
    }
}

// =============================================================================
// Mock Image Store with Request Tracking
// =============================================================================

/// A mock image store that records uploads and deletes.
///
/// Each upload gets a unique URL so cover replacement is observable.
pub struct MockImageStore {
    uploads: Arc<RwLock<Vec<(String, String)>>>,
    deletes: Arc<RwLock<Vec<String>>>,
    upload_seq: Arc<AtomicUsize>,
    fail_deletes: Arc<AtomicBool>,
}

impl MockImageStore {
    pub fn new() -> Self {
        Self {
            uploads: Arc::new(RwLock::new(Vec::new())),
            deletes: Arc::new(RwLock::new(Vec::new())),
            upload_seq: Arc::new(AtomicUsize::new(0)),
            fail_deletes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every subsequent delete fail, to verify deletes are
    /// non-fatal.
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    /// Recorded uploads as `(file_name, data)` pairs.
    pub async fn uploads(&self) -> Vec<(String, String)> {
        self.uploads.read().await.clone()
    }

    /// Recorded delete file ids (including failed attempts).
    pub async fn deletes(&self) -> Vec<String> {
        self.deletes.read().await.clone()
    }
}

impl Default for MockImageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockImageStore {
    fn clone(&self) -> Self {
        Self {
            uploads: Arc::clone(&self.uploads),
            deletes: Arc::clone(&self.deletes),
            upload_seq: Arc::clone(&self.upload_seq),
            fail_deletes: Arc::clone(&self.fail_deletes),
        }
    }
}

#[async_trait]
impl ImageStore for MockImageStore {
    async fn upload(&self, file_name: &str, data: &str) -> Result<UploadedImage, ImageError> {
        self.uploads
            .write()
            .await
            .push((file_name.to_string(), data.to_string()));
        let n = self.upload_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let stem = file_name.split('.').next().unwrap_or(file_name);
        Ok(UploadedImage {
            url: format!("https://images.test/library/{}_{}.jpg", stem, n),
        })
    }

    async fn delete(&self, file_id: &str) -> Result<(), ImageError> {
        self.deletes.write().await.push(file_id.to_string());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ImageError::Delete("simulated failure".to_string()));
        }
        Ok(())
    }
}

// =============================================================================
// Router and Request Helpers
// =============================================================================

/// Build a router over fresh in-memory stores.
pub fn test_router() -> (Router, MemoryCatalog, MockImageStore) {
    let store = MemoryCatalog::new();
    let images = MockImageStore::new();
    let router = router_over(store.clone(), images.clone());
    (router, store, images)
}

/// Build a router over the given stores.
pub fn router_over(store: MemoryCatalog, images: MockImageStore) -> Router {
    let state = AppState::new(store, images, SessionAuth::new(TEST_SECRET))
        .with_hash_cost(TEST_HASH_COST);
    create_router(state, RouterConfig::new().with_tracing(false))
}

/// Build a JSON POST request, optionally with a session cookie.
pub fn post_json(uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Build a GET request, optionally with a session cookie.
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Build a DELETE request, optionally with a session cookie.
pub fn delete(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Extract the `token=...` cookie pair from a Set-Cookie header.
pub fn session_cookie_pair(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response carries no Set-Cookie header")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("token="));
    set_cookie
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

/// Sign up a user through the API and return `(cookie, user_id)`.
pub async fn signup_user(router: &Router, username: &str, email: &str) -> (String, String) {
    let request = post_json(
        "/api/signup",
        json!({ "username": username, "email": email, "password": "hunter22" }),
        None,
    );
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie_pair(&response);
    let body = body_json(response).await;
    let user_id = body["user"]["id"].as_str().unwrap().to_string();
    (cookie, user_id)
}

/// Add a book through the API and return its JSON record.
pub async fn add_book(router: &Router, cookie: &str, title: &str) -> Value {
    let request = post_json(
        "/api/add-book",
        json!({
            "image": format!("data:image/jpeg;base64,{}", title),
            "title": title,
            "subtitle": "",
            "author": "Test Author",
            "link": "",
            "review": "",
        }),
        Some(cookie),
    );
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["book"].clone()
}
