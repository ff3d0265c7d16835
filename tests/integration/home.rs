//! Home summary and visit counter

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};

use catalog_server::models::book_instance::LoanStatus;

use crate::common::TestApp;

fn session_cookie(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn summary_counts_the_catalog() {
    let app = TestApp::new();
    let author = app.author("Joanne", "Rowling").await;
    let book = app.book("Harry Potter and the Philosopher's Stone", author.id).await;
    app.book("Unrelated", author.id).await;
    app.copy(book.id, LoanStatus::Available, None, None).await;
    app.copy(book.id, LoanStatus::Maintenance, None, None).await;

    let response = app.get("/api/v1", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["num_books"], 2);
    assert_eq!(response.body["num_instances"], 2);
    assert_eq!(response.body["num_instances_available"], 1);
    assert_eq!(response.body["num_authors"], 1);
    assert_eq!(response.body["title_term"], "harry");
    assert_eq!(response.body["num_books_matching"], 1);
    assert_eq!(response.body["num_visits"], 1);

    let other_term = app.get("/api/v1?title=UNRELATED", None).await;
    assert_eq!(other_term.body["num_books_matching"], 1);
    assert_eq!(other_term.body["title_term"], "UNRELATED");
}

#[tokio::test]
async fn visits_are_counted_per_session() {
    let app = TestApp::new();

    let first = app.get("/api/v1", None).await;
    assert_eq!(first.body["num_visits"], 1);
    let cookie = session_cookie(first.headers[header::SET_COOKIE].to_str().unwrap());
    assert!(cookie.starts_with("catalog_session="));

    for expected in 2..=4 {
        let request = Request::builder()
            .uri("/api/v1")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap();
        let response = app.send(request).await;
        assert_eq!(response.body["num_visits"], expected);
    }

    // no cookie, new session
    let fresh = app.get("/api/v1", None).await;
    assert_eq!(fresh.body["num_visits"], 1);
}
