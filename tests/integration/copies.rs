//! Books, copies, checkout and return

use axum::http::{Method, StatusCode};
use chrono::Duration;
use serde_json::json;

use catalog_server::models::{book_instance::LoanStatus, user::Permission};

use crate::common::{today, TestApp};

#[tokio::test]
async fn book_detail_lists_copies_and_genres() {
    let app = TestApp::new();
    let (_, editor) = app.user("editor", &[Permission::ManageBooks]).await;
    let author = app.author("John", "Smith").await;

    let mut genre_ids = Vec::new();
    for name in ["Fantasy", "Science Fiction", "Poetry", "Horror"] {
        let genre = app
            .post("/api/v1/genres", Some(&editor), json!({ "name": name }))
            .await;
        assert_eq!(genre.status, StatusCode::CREATED);
        genre_ids.push(genre.body["id"].clone());
    }

    let book = app
        .post(
            "/api/v1/books",
            Some(&editor),
            json!({
                "title": "Book Title",
                "summary": "My book summary",
                "isbn": "ABCDEFGHIJKLM",
                "author_id": author.id,
                "genre_ids": genre_ids,
            }),
        )
        .await;
    assert_eq!(book.status, StatusCode::CREATED);
    let book_id = book.body["id"].as_i64().unwrap();

    let copy = app
        .post(
            &format!("/api/v1/books/{}/copies", book_id),
            Some(&editor),
            json!({ "imprint": "Unlikely Imprint, 2016", "status": "available" }),
        )
        .await;
    assert_eq!(copy.status, StatusCode::CREATED);

    let detail = app.get(&format!("/api/v1/books/{}", book_id), None).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["display_genre"], "Fantasy, Science Fiction, Poetry");
    assert_eq!(detail.body["author"]["name"], "Smith, John");
    assert_eq!(detail.body["copies"].as_array().unwrap().len(), 1);
    assert_eq!(detail.body["copies"][0]["status"], "available");
}

#[tokio::test]
async fn isbn_must_have_thirteen_characters() {
    let app = TestApp::new();
    let (_, editor) = app.user("editor", &[Permission::ManageBooks]).await;
    let author = app.author("John", "Smith").await;

    let response = app
        .post(
            "/api/v1/books",
            Some(&editor),
            json!({ "title": "Short", "isbn": "123", "author_id": author.id }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["field"], "isbn");
}

#[tokio::test]
async fn books_are_listed_four_per_page() {
    let app = TestApp::new();
    let (_, token) = app.user("testuser1", &[]).await;
    let author = app.author("John", "Smith").await;
    for i in 0..5 {
        app.book(&format!("Book {}", i), author.id).await;
    }

    let first = app.get("/api/v1/books", Some(&token)).await;
    assert_eq!(first.body["items"].as_array().unwrap().len(), 4);
    assert_eq!(first.body["num_pages"], 2);
    assert_eq!(first.body["items"][0]["author"], "Smith, John");
}

#[tokio::test]
async fn borrower_requires_on_loan_status() {
    let app = TestApp::new();
    let (reader, _) = app.user("testuser1", &[]).await;
    let (_, editor) = app.user("editor", &[Permission::ManageBooks]).await;
    let author = app.author("John", "Smith").await;
    let book = app.book("Book Title", author.id).await;
    let uri = format!("/api/v1/books/{}/copies", book.id);

    let refused = app
        .post(
            &uri,
            Some(&editor),
            json!({ "status": "maintenance", "borrower_id": reader.id }),
        )
        .await;
    assert_eq!(refused.status, StatusCode::BAD_REQUEST);
    assert_eq!(refused.body["field"], "borrower_id");

    let accepted = app
        .post(
            &uri,
            Some(&editor),
            json!({
                "status": "on_loan",
                "borrower_id": reader.id,
                "due_back": today().to_string(),
            }),
        )
        .await;
    assert_eq!(accepted.status, StatusCode::CREATED);

    // returning it to maintenance while keeping the borrower is refused
    let id = accepted.body["id"].as_str().unwrap().to_string();
    let update = app
        .request(
            Method::PUT,
            &format!("/api/v1/copies/{}", id),
            Some(&editor),
            Some(json!({ "status": "maintenance" })),
        )
        .await;
    assert_eq!(update.status, StatusCode::BAD_REQUEST);

    let cleared = app
        .request(
            Method::PUT,
            &format!("/api/v1/copies/{}", id),
            Some(&editor),
            Some(json!({ "status": "maintenance", "borrower_id": null, "due_back": null })),
        )
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(cleared.body["borrower_id"], json!(null));
}

#[tokio::test]
async fn checkout_and_return() {
    let app = TestApp::new();
    let (reader, _) = app.user("testuser1", &[]).await;
    let (_, librarian) = app.user("librarian", &[Permission::MarkReturned]).await;
    let author = app.author("John", "Smith").await;
    let book = app.book("Book Title", author.id).await;
    let copy = app.copy(book.id, LoanStatus::Available, None, None).await;
    let checkout = format!("/api/v1/copies/{}/checkout", copy.id);
    let give_back = format!("/api/v1/copies/{}/return", copy.id);

    let lent = app
        .post(&checkout, Some(&librarian), json!({ "borrower_id": reader.id }))
        .await;
    assert_eq!(lent.status, StatusCode::OK);
    assert_eq!(lent.body["status"], "on_loan");
    assert_eq!(lent.body["borrower_id"], reader.id);
    assert_eq!(lent.body["due_back"], (today() + Duration::weeks(3)).to_string());

    let again = app
        .post(&checkout, Some(&librarian), json!({ "borrower_id": reader.id }))
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let returned = app.post(&give_back, Some(&librarian), json!({})).await;
    assert_eq!(returned.status, StatusCode::OK);
    assert_eq!(returned.body["status"], "available");
    assert_eq!(returned.body["borrower_id"], json!(null));
    assert_eq!(returned.body["due_back"], json!(null));

    let twice = app.post(&give_back, Some(&librarian), json!({})).await;
    assert_eq!(twice.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn deleting_a_book_removes_its_copies() {
    let app = TestApp::new();
    let (_, editor) = app.user("editor", &[Permission::ManageBooks]).await;
    let author = app.author("John", "Smith").await;
    let book = app.book("Book Title", author.id).await;
    let copy = app.copy(book.id, LoanStatus::Available, None, None).await;

    let deleted = app
        .request(Method::DELETE, &format!("/api/v1/books/{}", book.id), Some(&editor), None)
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app.get(&format!("/api/v1/copies/{}", copy.id), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn books_can_be_listed_by_author() {
    let app = TestApp::new();
    let (_, token) = app.user("testuser1", &[]).await;
    let smith = app.author("John", "Smith").await;
    let doe = app.author("Jane", "Doe").await;
    app.book("First", smith.id).await;
    app.book("Second", doe.id).await;
    app.book("Third", smith.id).await;

    let response = app
        .get(&format!("/api/v1/books?author_id={}", smith.id), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 2);
    let titles: Vec<&str> = response.body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["First", "Third"]);

    let everything = app.get("/api/v1/books", Some(&token)).await;
    assert_eq!(everything.body["total"], 3);
}

#[tokio::test]
async fn copies_can_be_filtered_by_status_and_due_date() {
    let app = TestApp::new();
    let (reader, reader_token) = app.user("testuser1", &[]).await;
    let (_, editor) = app.user("editor", &[Permission::ManageBooks]).await;
    let author = app.author("John", "Smith").await;
    let book = app.book("Book Title", author.id).await;

    let soon = today() + Duration::days(2);
    let later = today() + Duration::days(20);
    app.copy(book.id, LoanStatus::Available, None, None).await;
    app.copy(book.id, LoanStatus::OnLoan, Some(reader.id), Some(soon)).await;
    app.copy(book.id, LoanStatus::OnLoan, Some(reader.id), Some(later)).await;
    app.copy(book.id, LoanStatus::Maintenance, None, None).await;

    let forbidden = app.get("/api/v1/copies", Some(&reader_token)).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let all = app.get("/api/v1/copies", Some(&editor)).await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.body["total"], 4);

    let on_loan = app.get("/api/v1/copies?status=on_loan", Some(&editor)).await;
    assert_eq!(on_loan.body["total"], 2);

    let due_soon = app
        .get(&format!("/api/v1/copies?status=on_loan&due_by={}", soon), Some(&editor))
        .await;
    assert_eq!(due_soon.body["total"], 1);
    assert_eq!(due_soon.body["items"][0]["due_back"], soon.to_string());
}
