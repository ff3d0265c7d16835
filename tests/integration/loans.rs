//! Loan listings and renewal

use axum::http::{header, StatusCode};
use chrono::Duration;
use serde_json::json;
use uuid::Uuid;

use catalog_server::{
    models::{book_instance::LoanStatus, user::Permission},
    repository::CopyStore,
};

use crate::common::{today, TestApp};

/// Two borrowers, 30 copies handed out alternately, every other one on loan.
/// Copies in maintenance carry no borrower.
async fn thirty_copies(app: &TestApp) -> (String, String, i32, i32) {
    let (first, first_token) = app.user("testuser1", &[]).await;
    let (second, second_token) = app.user("testuser2", &[]).await;
    let author = app.author("John", "Smith").await;
    let book = app.book("Book Title", author.id).await;

    for i in 0..30i64 {
        let due_back = Some(today() + Duration::days(i % 5));
        let borrower = if i % 2 == 0 { first.id } else { second.id };
        if i % 4 < 2 {
            app.copy(book.id, LoanStatus::OnLoan, Some(borrower), due_back).await;
        } else {
            app.copy(book.id, LoanStatus::Maintenance, None, due_back).await;
        }
    }

    (first_token, second_token, first.id, second.id)
}

#[tokio::test]
async fn my_loans_only_lists_my_copies_on_loan() {
    let app = TestApp::new();
    let (token, _, me, _) = thirty_copies(&app).await;

    let response = app.get("/api/v1/loans/mine", Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let items = response.body["items"].as_array().unwrap();
    assert!(items.len() <= 10);
    assert!(!items.is_empty());
    assert_eq!(response.body["total"], 8);

    let mut previous = None;
    for item in items {
        assert_eq!(item["borrower_id"], me);
        assert_eq!(item["status"], "on_loan");
        let due = item["due_back"].as_str().unwrap().to_string();
        if let Some(previous) = previous {
            assert!(previous <= due);
        }
        previous = Some(due);
    }
}

#[tokio::test]
async fn huge_page_numbers_are_not_found() {
    let app = TestApp::new();
    let (token, _, _, _) = thirty_copies(&app).await;
    let (_, librarian) = app.user("librarian", &[Permission::ViewAllLoans]).await;
    let last = i64::MAX;

    let mine = app.get(&format!("/api/v1/loans/mine?page={}", last), Some(&token)).await;
    assert_eq!(mine.status, StatusCode::NOT_FOUND);

    let all = app.get(&format!("/api/v1/loans?page={}", last), Some(&librarian)).await;
    assert_eq!(all.status, StatusCode::NOT_FOUND);

    let authors = app.get(&format!("/api/v1/authors?page={}", last), Some(&token)).await;
    assert_eq!(authors.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn my_loans_requires_login() {
    let app = TestApp::new();
    let response = app.get("/api/v1/loans/mine", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.body["login_url"],
        "/api/v1/auth/login?next=%2Fapi%2Fv1%2Floans%2Fmine"
    );
}

#[tokio::test]
async fn all_loans_needs_view_all_loans() {
    let app = TestApp::new();
    let (token, _, _, _) = thirty_copies(&app).await;
    let (_, librarian) = app.user("librarian", &[Permission::ViewAllLoans]).await;

    let forbidden = app.get("/api/v1/loans", Some(&token)).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let first = app.get("/api/v1/loans", Some(&librarian)).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["total"], 16);
    assert_eq!(first.body["items"].as_array().unwrap().len(), 10);
    assert_eq!(first.body["num_pages"], 2);

    let second = app.get("/api/v1/loans?page=2", Some(&librarian)).await;
    assert_eq!(second.body["items"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn renewal_access_is_checked_before_existence() {
    let app = TestApp::new();
    let (_, reader) = app.user("testuser1", &[]).await;
    let (_, librarian) = app.user("testuser2", &[Permission::MarkReturned]).await;
    let unknown = format!("/api/v1/copies/{}/renew", Uuid::new_v4());

    let anonymous = app.get(&unknown, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        anonymous.body["login_url"],
        format!("/api/v1/auth/login?next={}", unknown.replace('/', "%2F"))
    );

    let forbidden = app.get(&unknown, Some(&reader)).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let missing = app.get(&unknown, Some(&librarian)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn renewal_form_proposes_three_weeks() {
    let app = TestApp::new();
    let (_, librarian) = app.user("testuser2", &[Permission::MarkReturned]).await;
    let author = app.author("John", "Smith").await;
    let book = app.book("Book Title", author.id).await;
    let copy = app.copy(book.id, LoanStatus::OnLoan, None, None).await;

    let form = app
        .get(&format!("/api/v1/copies/{}/renew", copy.id), Some(&librarian))
        .await;
    assert_eq!(form.status, StatusCode::OK);
    assert_eq!(
        form.body["renewal_date"],
        (today() + Duration::weeks(3)).to_string()
    );
    assert_eq!(form.body["label"], "New date");
    assert_eq!(
        form.body["help_text"],
        "Enter a date between now and 4 weeks (default 3)."
    );
}

#[tokio::test]
async fn renewal_redirects_and_persists() {
    let app = TestApp::new();
    let (_, librarian) = app.user("testuser2", &[Permission::MarkReturned]).await;
    let author = app.author("John", "Smith").await;
    let book = app.book("Book Title", author.id).await;
    let copy = app.copy(book.id, LoanStatus::OnLoan, None, Some(today())).await;
    let new_date = today() + Duration::weeks(2);

    let response = app
        .post(
            &format!("/api/v1/copies/{}/renew", copy.id),
            Some(&librarian),
            json!({ "renewal_date": new_date.to_string() }),
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.headers[header::LOCATION], "/api/v1/loans");

    let stored = app.store.get_copy(copy.id).await.unwrap();
    assert_eq!(stored.due_back, Some(new_date));
}

#[tokio::test]
async fn renewal_dates_outside_the_window_are_rejected() {
    let app = TestApp::new();
    let (_, librarian) = app.user("testuser2", &[Permission::MarkReturned]).await;
    let author = app.author("John", "Smith").await;
    let book = app.book("Book Title", author.id).await;
    let copy = app.copy(book.id, LoanStatus::OnLoan, None, Some(today())).await;
    let uri = format!("/api/v1/copies/{}/renew", copy.id);

    let past = app
        .post(
            &uri,
            Some(&librarian),
            json!({ "renewal_date": (today() - Duration::days(1)).to_string() }),
        )
        .await;
    assert_eq!(past.status, StatusCode::BAD_REQUEST);
    assert_eq!(past.body["field"], "renewal_date");
    assert_eq!(past.body["message"], "Invalid date - renewal in past");

    let far = app
        .post(
            &uri,
            Some(&librarian),
            json!({ "renewal_date": (today() + Duration::weeks(4) + Duration::days(1)).to_string() }),
        )
        .await;
    assert_eq!(far.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        far.body["message"],
        "Invalid date - renewal more than 4 weeks ahead"
    );

    let garbage = app
        .post(&uri, Some(&librarian), json!({ "renewal_date": "soon" }))
        .await;
    assert_eq!(garbage.status, StatusCode::BAD_REQUEST);
    assert_eq!(garbage.body["field"], "renewal_date");

    let stored = app.store.get_copy(copy.id).await.unwrap();
    assert_eq!(stored.due_back, Some(today()));
}
