//! Author listing, pagination and access checks

use axum::http::{Method, StatusCode};
use serde_json::json;

use catalog_server::models::user::Permission;

use crate::common::TestApp;

async fn thirteen_authors(app: &TestApp) {
    for id in 0..13 {
        app.author(&format!("Christian {}", id), &format!("Surname {}", id))
            .await;
    }
}

#[tokio::test]
async fn list_requires_login() {
    let app = TestApp::new();
    let response = app.get("/api/v1/authors", None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.body["login_url"],
        "/api/v1/auth/login?next=%2Fapi%2Fv1%2Fauthors"
    );
}

#[tokio::test]
async fn login_url_keeps_the_whole_query() {
    let app = TestApp::new();
    let denied = app.get("/api/v1/authors?page=2&x=1", None).await;
    assert_eq!(denied.status, StatusCode::UNAUTHORIZED);

    let login_url = denied.body["login_url"].as_str().unwrap().to_string();
    let prompt = app.get(&login_url, None).await;
    assert_eq!(prompt.status, StatusCode::OK);
    assert_eq!(prompt.body["method"], "POST");
    assert_eq!(prompt.body["next"], "/api/v1/authors?page=2&x=1");
}

#[tokio::test]
async fn pagination_is_two_per_page() {
    let app = TestApp::new();
    thirteen_authors(&app).await;
    let (_, token) = app.user("testuser1", &[]).await;

    let first = app.get("/api/v1/authors", Some(&token)).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["items"].as_array().unwrap().len(), 2);
    assert_eq!(first.body["num_pages"], 7);
    assert_eq!(first.body["total"], 13);
    assert_eq!(first.body["has_next"], true);
    // ordered by last name
    assert_eq!(first.body["items"][0]["name"], "Surname 0, Christian 0");

    let last = app.get("/api/v1/authors?page=7", Some(&token)).await;
    assert_eq!(last.status, StatusCode::OK);
    assert_eq!(last.body["items"].as_array().unwrap().len(), 1);
    assert_eq!(last.body["has_next"], false);
}

#[tokio::test]
async fn bad_page_numbers() {
    let app = TestApp::new();
    thirteen_authors(&app).await;
    let (_, token) = app.user("testuser1", &[]).await;

    let beyond = app.get("/api/v1/authors?page=8", Some(&token)).await;
    assert_eq!(beyond.status, StatusCode::NOT_FOUND);

    let zero = app.get("/api/v1/authors?page=0", Some(&token)).await;
    assert_eq!(zero.status, StatusCode::BAD_REQUEST);
    assert_eq!(zero.body["field"], "page");

    let junk = app.get("/api/v1/authors?page=two", Some(&token)).await;
    assert_eq!(junk.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_listing_is_a_single_page() {
    let app = TestApp::new();
    let (_, token) = app.user("testuser1", &[]).await;

    let response = app.get("/api/v1/authors", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["items"], json!([]));
    assert_eq!(response.body["num_pages"], 1);
}

#[tokio::test]
async fn detail_is_public_and_lists_books() {
    let app = TestApp::new();
    let author = app.author("Big", "Bob").await;
    app.book("Book Title", author.id).await;

    let response = app.get(&format!("/api/v1/authors/{}", author.id), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "Bob, Big");
    assert_eq!(response.body["books"][0]["title"], "Book Title");

    let missing = app.get("/api/v1/authors/999", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creating_needs_manage_authors() {
    let app = TestApp::new();
    let (_, reader) = app.user("testuser1", &[]).await;
    let (_, editor) = app.user("testuser2", &[Permission::ManageAuthors]).await;
    let body = json!({ "first_name": "Ursula", "last_name": "Le Guin", "date_of_birth": "1929-10-21" });

    let anonymous = app.post("/api/v1/authors", None, body.clone()).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let forbidden = app.post("/api/v1/authors", Some(&reader), body.clone()).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let created = app.post("/api/v1/authors", Some(&editor), body).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["last_name"], "Le Guin");
    assert_eq!(created.body["date_of_birth"], "1929-10-21");
}

#[tokio::test]
async fn field_limits_are_enforced() {
    let app = TestApp::new();
    let (_, editor) = app.user("testuser2", &[Permission::ManageAuthors]).await;

    let response = app
        .post(
            "/api/v1/authors",
            Some(&editor),
            json!({ "first_name": "x".repeat(101), "last_name": "Bob" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["field"], "first_name");
}

#[tokio::test]
async fn author_with_books_cannot_be_deleted() {
    let app = TestApp::new();
    let (_, editor) = app.user("testuser2", &[Permission::ManageAuthors]).await;
    let author = app.author("Big", "Bob").await;
    let lonely = app.author("Small", "Sue").await;
    app.book("Book Title", author.id).await;

    let refused = app
        .request(Method::DELETE, &format!("/api/v1/authors/{}", author.id), Some(&editor), None)
        .await;
    assert_eq!(refused.status, StatusCode::CONFLICT);

    let deleted = app
        .request(Method::DELETE, &format!("/api/v1/authors/{}", lonely.id), Some(&editor), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
}
