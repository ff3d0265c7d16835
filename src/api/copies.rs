//! Copy (book instance) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    access::{Caller, Operation},
    error::AppResult,
    models::{
        book_instance::{BookInstance, CopyListQuery, CreateBookInstance, UpdateBookInstance},
        page::CopyPage,
    },
    AppState,
};

/// Copies by status or due date, oldest first
#[utoipa::path(
    get,
    path = "/copies",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(CopyListQuery),
    responses(
        (status = 200, description = "Page of copies", body = CopyPage),
        (status = 400, description = "Malformed page number", body = crate::error::ErrorResponse),
        (status = 403, description = "Permission manage-books required", body = crate::error::ErrorResponse),
        (status = 404, description = "Page out of range", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_copies(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<CopyListQuery>,
) -> AppResult<Json<CopyPage>> {
    caller.authorize(Operation::ListCopies)?;
    let page = state
        .services
        .catalog
        .list_copies(query.filter(), query.page.as_deref())
        .await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/copies/{id}",
    tag = "copies",
    params(("id" = Uuid, Path, description = "Copy ID")),
    responses(
        (status = 200, description = "Copy", body = BookInstance),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_copy(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstance>> {
    caller.authorize(Operation::ViewCopy)?;
    Ok(Json(state.services.catalog.get_copy(id).await?))
}

/// Add a copy of a book
#[utoipa::path(
    post,
    path = "/books/{id}/copies",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = CreateBookInstance,
    responses(
        (status = 201, description = "Copy created", body = BookInstance),
        (status = 400, description = "Borrower set on a copy not on loan", body = crate::error::ErrorResponse),
        (status = 403, description = "Permission manage-books required", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_copy(
    State(state): State<AppState>,
    caller: Caller,
    Path(book_id): Path<i32>,
    Json(copy): Json<CreateBookInstance>,
) -> AppResult<(StatusCode, Json<BookInstance>)> {
    caller.authorize(Operation::CreateCopy)?;
    let created = state.services.catalog.create_copy(book_id, copy).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a copy. `null` clears due_back or borrower_id.
#[utoipa::path(
    put,
    path = "/copies/{id}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Copy ID")),
    request_body = UpdateBookInstance,
    responses(
        (status = 200, description = "Copy updated", body = BookInstance),
        (status = 400, description = "Borrower set on a copy not on loan", body = crate::error::ErrorResponse),
        (status = 403, description = "Permission manage-books required", body = crate::error::ErrorResponse),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_copy(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateBookInstance>,
) -> AppResult<Json<BookInstance>> {
    caller.authorize(Operation::UpdateCopy)?;
    Ok(Json(state.services.catalog.update_copy(id, update).await?))
}

#[utoipa::path(
    delete,
    path = "/copies/{id}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Copy ID")),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 403, description = "Permission manage-books required", body = crate::error::ErrorResponse),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_copy(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    caller.authorize(Operation::DeleteCopy)?;
    state.services.catalog.delete_copy(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
