//! Book-flow state container.

use std::sync::RwLock;

use crate::catalog::{Book, BookDetails};
use crate::server::{
    AddBookRequest, BookDetailsResponse, BookResponse, BooksResponse, MessageResponse,
    UpdateBookRequest,
};

use super::{error_message, parse_json, ClientError};

/// Observable book-flow state.
#[derive(Debug, Clone, Default)]
pub struct BookState {
    /// The last created/updated book
    pub book: Option<Book>,

    /// The last fetched book with its owner resolved
    pub book_details: Option<BookDetails>,

    /// The current list (fetch-books or search results)
    pub books: Vec<Book>,

    /// An action is in flight
    pub loading: bool,

    /// Message of the last failed action
    pub error: Option<String>,

    /// Message of the last successful mutation
    pub message: Option<String>,
}

/// State container for the book flow.
///
/// Mutating actions rely on the session cookie in the shared jar; run
/// them on a store whose client has signed in via [`AuthStore`] or
/// reuse one `reqwest::Client` for both stores.
pub struct BookStore {
    http: reqwest::Client,
    base_url: String,
    state: RwLock<BookState>,
}

impl BookStore {
    /// Create a store talking to the API at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a store over an existing client (to share a cookie jar
    /// with an [`AuthStore`](super::AuthStore)).
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            state: RwLock::new(BookState::default()),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> BookState {
        self.state.read().expect("book state poisoned").clone()
    }

    fn set(&self, apply: impl FnOnce(&mut BookState)) {
        let mut state = self.state.write().expect("book state poisoned");
        apply(&mut state);
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn begin(&self, clear_message: bool) {
        self.set(|s| {
            s.loading = true;
            s.error = None;
            if clear_message {
                s.message = None;
            }
        });
    }

    fn fail(&self, err: &ClientError, fallback: &str) {
        let message = error_message(err, fallback);
        self.set(|s| {
            s.loading = false;
            s.error = Some(message);
        });
    }

    /// `POST /api/add-book` (session required).
    pub async fn add_book(&self, request: &AddBookRequest) -> Result<BookResponse, ClientError> {
        self.begin(true);

        let result: Result<BookResponse, ClientError> = async {
            let response = self
                .http
                .post(self.url("/api/add-book"))
                .json(request)
                .send()
                .await?;
            parse_json(response, "Error adding book").await
        }
        .await;

        match result {
            Ok(body) => {
                self.set(|s| {
                    s.book = Some(body.book.clone());
                    s.message = Some(body.message.clone());
                    s.loading = false;
                });
                Ok(body)
            }
            Err(e) => {
                self.fail(&e, "Error adding book");
                Err(e)
            }
        }
    }

    /// `GET /api/fetch-books`.
    pub async fn fetch_books(&self) -> Result<Vec<Book>, ClientError> {
        self.begin(false);

        let result: Result<BooksResponse, ClientError> = async {
            let response = self.http.get(self.url("/api/fetch-books")).send().await?;
            parse_json(response, "Error fetching books").await
        }
        .await;

        match result {
            Ok(body) => {
                self.set(|s| {
                    s.books = body.books.clone();
                    s.loading = false;
                });
                Ok(body.books)
            }
            Err(e) => {
                self.fail(&e, "Error fetching books");
                Err(e)
            }
        }
    }

    /// `GET /api/search?searchTerm=`.
    pub async fn search_books(&self, term: &str) -> Result<Vec<Book>, ClientError> {
        self.begin(false);

        let result: Result<BooksResponse, ClientError> = async {
            let response = self
                .http
                .get(self.url("/api/search"))
                .query(&[("searchTerm", term)])
                .send()
                .await?;
            parse_json(response, "Error fetching books").await
        }
        .await;

        match result {
            Ok(body) => {
                self.set(|s| {
                    s.books = body.books.clone();
                    s.loading = false;
                });
                Ok(body.books)
            }
            Err(e) => {
                self.fail(&e, "Error fetching books");
                Err(e)
            }
        }
    }

    /// `GET /api/fetch-book/{id}`.
    pub async fn fetch_book(&self, id: &str) -> Result<BookDetails, ClientError> {
        self.begin(false);

        let result: Result<BookDetailsResponse, ClientError> = async {
            let response = self
                .http
                .get(self.url(&format!("/api/fetch-book/{}", id)))
                .send()
                .await?;
            parse_json(response, "Error fetching book").await
        }
        .await;

        match result {
            Ok(body) => {
                self.set(|s| {
                    s.book_details = Some(body.book.clone());
                    s.loading = false;
                });
                Ok(body.book)
            }
            Err(e) => {
                self.fail(&e, "Error fetching book");
                Err(e)
            }
        }
    }

    /// `DELETE /api/delete-book/{id}` (session required).
    pub async fn delete_book(&self, id: &str) -> Result<String, ClientError> {
        self.begin(true);

        let result: Result<MessageResponse, ClientError> = async {
            let response = self
                .http
                .delete(self.url(&format!("/api/delete-book/{}", id)))
                .send()
                .await?;
            parse_json(response, "Error deleting book").await
        }
        .await;

        match result {
            Ok(body) => {
                self.set(|s| {
                    s.message = Some(body.message.clone());
                    s.loading = false;
                });
                Ok(body.message)
            }
            Err(e) => {
                self.fail(&e, "Error deleting book");
                Err(e)
            }
        }
    }

    /// `POST /api/update-book/{id}` (session required).
    pub async fn update_book(
        &self,
        id: &str,
        request: &UpdateBookRequest,
    ) -> Result<BookResponse, ClientError> {
        self.begin(true);

        let result: Result<BookResponse, ClientError> = async {
            let response = self
                .http
                .post(self.url(&format!("/api/update-book/{}", id)))
                .json(request)
                .send()
                .await?;
            parse_json(response, "Error updating book").await
        }
        .await;

        match result {
            Ok(body) => {
                self.set(|s| {
                    s.book = Some(body.book.clone());
                    s.message = Some(body.message.clone());
                    s.loading = false;
                });
                Ok(body)
            }
            Err(e) => {
                self.fail(&e, "Error updating book");
                Err(e)
            }
        }
    }
}
