//! Client state store tests against a live server.
//!
//! Spawns the router on an ephemeral port and drives it through the
//! `AuthStore`/`BookStore` state containers, verifying state
//! transitions and that the session cookie persists across calls.

use bookshelf::client::{AuthStore, BookStore};
use bookshelf::server::{AddBookRequest, UpdateBookRequest};

use super::test_utils::{router_over, MemoryCatalog, MockImageStore};

/// Start the server on an ephemeral port and return its base URL.
async fn spawn_server(store: MemoryCatalog, images: MockImageStore) -> String {
    let router = router_over(store, images);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Stores sharing one cookie jar, as a UI would.
fn stores(base_url: &str) -> (AuthStore, BookStore) {
    let http = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap();
    (
        AuthStore::with_client(http.clone(), base_url),
        BookStore::with_client(http, base_url),
    )
}

fn book_request(title: &str) -> AddBookRequest {
    AddBookRequest {
        image: "data:image/jpeg;base64,xxxx".to_string(),
        title: title.to_string(),
        subtitle: String::new(),
        author: "Test Author".to_string(),
        link: String::new(),
        review: String::new(),
    }
}

// =============================================================================
// Auth Store
// =============================================================================

#[tokio::test]
async fn test_auth_store_signup_updates_state() {
    let base_url = spawn_server(MemoryCatalog::new(), MockImageStore::new()).await;
    let (auth, _) = stores(&base_url);

    assert!(auth.state().user.is_none());

    let profile = auth
        .signup("alice", "alice@example.com", "hunter22")
        .await
        .unwrap();
    assert_eq!(profile.username, "alice");

    let state = auth.state();
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(state.user.unwrap().email, "alice@example.com");
}

#[tokio::test]
async fn test_auth_store_signup_failure_records_server_message() {
    let base_url = spawn_server(MemoryCatalog::new(), MockImageStore::new()).await;
    let (auth, _) = stores(&base_url);

    auth.signup("alice", "alice@example.com", "hunter22")
        .await
        .unwrap();

    let (other_auth, _) = stores(&base_url);
    let err = other_auth
        .signup("bob", "alice@example.com", "hunter22")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "User already exists.");

    let state = other_auth.state();
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("User already exists."));
    assert!(state.user.is_none());
}

#[tokio::test]
async fn test_auth_store_session_cookie_persists() {
    let base_url = spawn_server(MemoryCatalog::new(), MockImageStore::new()).await;
    let (auth, _) = stores(&base_url);

    auth.signup("alice", "alice@example.com", "hunter22")
        .await
        .unwrap();

    // The probe reuses the cookie set at signup
    let profile = auth.fetch_user().await.unwrap();
    assert_eq!(profile.username, "alice");

    let state = auth.state();
    assert!(!state.fetching_user);
    assert!(state.user.is_some());
}

#[tokio::test]
async fn test_auth_store_probe_without_session_clears_user_silently() {
    let base_url = spawn_server(MemoryCatalog::new(), MockImageStore::new()).await;
    let (auth, _) = stores(&base_url);

    assert!(auth.fetch_user().await.is_err());

    // Failed probe: no user, but also no recorded error
    let state = auth.state();
    assert!(!state.fetching_user);
    assert!(state.user.is_none());
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_auth_store_login_and_logout_cycle() {
    let base_url = spawn_server(MemoryCatalog::new(), MockImageStore::new()).await;
    let (auth, _) = stores(&base_url);
    auth.signup("alice", "alice@example.com", "hunter22")
        .await
        .unwrap();

    // Fresh jar: log in, then out
    let (auth, _) = stores(&base_url);
    let response = auth.login("alice@example.com", "hunter22").await.unwrap();
    assert_eq!(response.message, "Logged in successfully.");
    assert!(auth.state().user.is_some());

    let message = auth.logout().await.unwrap();
    assert_eq!(message, "Logged out successfully");
    let state = auth.state();
    assert!(state.user.is_none());

    // The cleared cookie no longer authenticates
    assert!(auth.fetch_user().await.is_err());
}

#[tokio::test]
async fn test_auth_store_login_failure() {
    let base_url = spawn_server(MemoryCatalog::new(), MockImageStore::new()).await;
    let (auth, _) = stores(&base_url);

    let err = auth.login("nobody@example.com", "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid Credentials");
    assert_eq!(auth.state().error.as_deref(), Some("Invalid Credentials"));
}

// =============================================================================
// Book Store
// =============================================================================

#[tokio::test]
async fn test_book_store_crud_cycle() {
    let store = MemoryCatalog::new();
    let images = MockImageStore::new();
    let base_url = spawn_server(store.clone(), images.clone()).await;
    let (auth, books) = stores(&base_url);

    auth.signup("alice", "alice@example.com", "hunter22")
        .await
        .unwrap();

    // Add
    let added = books.add_book(&book_request("Dune")).await.unwrap();
    assert_eq!(added.message, "Book added successfully");
    assert_eq!(added.book.title, "Dune");
    let book_id = added.book.id.clone();

    let state = books.state();
    assert!(!state.loading);
    assert_eq!(state.message.as_deref(), Some("Book added successfully"));
    assert_eq!(state.book.as_ref().unwrap().id, book_id);

    // List
    books.add_book(&book_request("Hyperion")).await.unwrap();
    let listed = books.fetch_books().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].title, "Hyperion");
    assert_eq!(books.state().books.len(), 2);

    // Search
    let found = books.search_books("dun").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Dune");

    // Fetch one, with owner resolved
    let details = books.fetch_book(&book_id).await.unwrap();
    assert_eq!(details.user.username, "alice");
    assert_eq!(books.state().book_details.unwrap().id, book_id);

    // Update
    let updated = books
        .update_book(
            &book_id,
            &UpdateBookRequest {
                image: None,
                title: "Dune".to_string(),
                subtitle: String::new(),
                author: "Frank Herbert".to_string(),
                link: String::new(),
                review: "Epic.".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.message, "Book updated successfully");
    assert_eq!(updated.book.review, "Epic.");

    // Delete
    let message = books.delete_book(&book_id).await.unwrap();
    assert_eq!(message, "Book deleted successfully.");
    assert_eq!(store.book_count().await, 1);
}

#[tokio::test]
async fn test_book_store_mutation_without_session_fails() {
    let base_url = spawn_server(MemoryCatalog::new(), MockImageStore::new()).await;
    let (_, books) = stores(&base_url);

    let err = books.add_book(&book_request("Dune")).await.unwrap_err();
    assert_eq!(err.to_string(), "No token provided.");

    let state = books.state();
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some("No token provided."));
    assert!(state.book.is_none());
}

#[tokio::test]
async fn test_book_store_reads_need_no_session() {
    let store = MemoryCatalog::new();
    let images = MockImageStore::new();
    let base_url = spawn_server(store.clone(), images.clone()).await;

    // Seed through an authenticated pair of stores
    let (auth, books) = stores(&base_url);
    auth.signup("alice", "alice@example.com", "hunter22")
        .await
        .unwrap();
    books.add_book(&book_request("Dune")).await.unwrap();

    // A fresh anonymous store can browse
    let (_, anonymous) = stores(&base_url);
    let listed = anonymous.fetch_books().await.unwrap();
    assert_eq!(listed.len(), 1);
    let found = anonymous.search_books("Dune").await.unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn test_book_store_fetch_unknown_book_records_error() {
    let base_url = spawn_server(MemoryCatalog::new(), MockImageStore::new()).await;
    let (_, books) = stores(&base_url);

    let err = books
        .fetch_book("00000000000000000000beef")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Book not found");
    assert_eq!(books.state().error.as_deref(), Some("Book not found"));
}
