//! Home page summary

use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use uuid::Uuid;

use crate::{
    access::{Caller, Operation},
    error::AppResult,
    models::home::{HomeQuery, HomeSummary},
    AppState,
};

/// Cookie carrying the visit counter's session id
pub const SESSION_COOKIE: &str = "catalog_session";

/// Catalog counts and the caller's visit count
#[utoipa::path(
    get,
    path = "/",
    tag = "home",
    params(HomeQuery),
    responses(
        (status = 200, description = "Home summary; sets the session cookie", body = HomeSummary)
    )
)]
pub async fn home(
    State(state): State<AppState>,
    caller: Caller,
    jar: CookieJar,
    Query(query): Query<HomeQuery>,
) -> AppResult<(CookieJar, Json<HomeSummary>)> {
    caller.authorize(Operation::Home)?;

    // Unknown or unreadable ids start a new session
    let session_id = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
        .unwrap_or_else(Uuid::new_v4);

    let summary = state
        .services
        .catalog
        .home(session_id, query.genre.as_deref(), query.title.as_deref())
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true);

    Ok((jar.add(cookie), Json(summary)))
}
