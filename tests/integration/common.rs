//! Shared test harness: an in-process app over the memory store
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use catalog_server::{
    api,
    config::AppConfig,
    models::{
        author::{Author, CreateAuthor},
        book::{Book, CreateBook},
        book_instance::{BookInstance, LoanStatus},
        user::{CreateUser, Permission, User},
    },
    repository::{CopyStore, MemoryStore},
    services::{Services, SystemClock},
    AppState,
};

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub services: Arc<Services>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-secret".to_string();

        let store = Arc::new(MemoryStore::new());
        let services = Arc::new(Services::new(store.clone(), &config, Arc::new(SystemClock)));
        let router = api::create_router(AppState {
            config: Arc::new(config),
            services: services.clone(),
        });

        Self {
            router,
            store,
            services,
        }
    }

    /// Create a user and return it with a bearer token
    pub async fn user(&self, username: &str, permissions: &[Permission]) -> (User, String) {
        let user = self
            .services
            .users
            .create_user(CreateUser {
                username: username.to_string(),
                password: "1X<ISRUkw+tuK".to_string(),
                first_name: None,
                last_name: None,
                email: None,
                permissions: permissions.to_vec(),
            })
            .await
            .unwrap();
        let token = self.services.users.create_token_for_user(&user).unwrap();
        (user, token)
    }

    pub async fn author(&self, first_name: &str, last_name: &str) -> Author {
        self.services
            .catalog
            .create_author(CreateAuthor {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                date_of_birth: None,
                date_of_death: None,
            })
            .await
            .unwrap()
    }

    pub async fn book(&self, title: &str, author_id: i32) -> Book {
        self.services
            .catalog
            .create_book(CreateBook {
                title: title.to_string(),
                summary: "My book summary".to_string(),
                isbn: "ABCDEFGHIJKLM".to_string(),
                author_id,
                genre_ids: vec![],
            })
            .await
            .unwrap()
    }

    /// Store a copy directly, bypassing request validation
    pub async fn copy(
        &self,
        book_id: i32,
        status: LoanStatus,
        borrower_id: Option<i32>,
        due_back: Option<NaiveDate>,
    ) -> BookInstance {
        self.store
            .create_copy(&BookInstance {
                id: Uuid::new_v4(),
                book_id,
                imprint: "Unlikely Imprint, 2016".to_string(),
                due_back,
                status,
                borrower_id,
            })
            .await
            .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }
}
