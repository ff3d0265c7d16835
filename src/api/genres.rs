//! Genre endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    access::{Caller, Operation},
    error::AppResult,
    models::genre::{CreateGenre, Genre},
    AppState,
};

/// All genres by name
#[utoipa::path(
    get,
    path = "/genres",
    tag = "genres",
    responses((status = 200, description = "Genres", body = Vec<Genre>))
)]
pub async fn list_genres(State(state): State<AppState>, caller: Caller) -> AppResult<Json<Vec<Genre>>> {
    caller.authorize(Operation::ListGenres)?;
    Ok(Json(state.services.catalog.list_genres().await?))
}

#[utoipa::path(
    post,
    path = "/genres",
    tag = "genres",
    security(("bearer_auth" = [])),
    request_body = CreateGenre,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 403, description = "Permission manage-books required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    caller: Caller,
    Json(genre): Json<CreateGenre>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    caller.authorize(Operation::CreateGenre)?;
    let created = state.services.catalog.create_genre(genre).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
