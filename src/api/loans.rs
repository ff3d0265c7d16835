//! Loan endpoints: listings, renewal, checkout and return

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Json,
};
use uuid::Uuid;

use crate::{
    access::{Caller, Operation},
    error::AppResult,
    models::{
        book_instance::{BookInstance, CheckoutRequest, RenewRequest, RenewalForm},
        page::{LoanPage, PageQuery},
    },
    AppState,
};

/// Where a successful renewal sends the librarian
pub const ALL_LOANS_PATH: &str = "/api/v1/loans";

/// Copies on loan to the caller
#[utoipa::path(
    get,
    path = "/loans/mine",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Caller's loans, soonest due first", body = LoanPage),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn my_loans(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<LoanPage>> {
    caller.authorize(Operation::MyLoans)?;
    let borrower_id = caller.claims()?.user_id;
    let page = state
        .services
        .loans
        .loans_for(borrower_id, query.page.as_deref())
        .await?;
    Ok(Json(page))
}

/// Every copy on loan
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "All loans, soonest due first", body = LoanPage),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "Permission view-all-loans required", body = crate::error::ErrorResponse)
    )
)]
pub async fn all_loans(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<LoanPage>> {
    caller.authorize(Operation::AllLoans)?;
    let page = state.services.loans.all_on_loan(query.page.as_deref()).await?;
    Ok(Json(page))
}

/// Renewal form, proposing a date three weeks ahead
#[utoipa::path(
    get,
    path = "/copies/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Copy ID")),
    responses(
        (status = 200, description = "Renewal form", body = RenewalForm),
        (status = 403, description = "Permission mark-returned required", body = crate::error::ErrorResponse),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn renewal_form(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalForm>> {
    caller.authorize(Operation::RenewLoan)?;
    Ok(Json(state.services.loans.renewal_form(id).await?))
}

/// Set a new due date, then redirect to all loans
#[utoipa::path(
    post,
    path = "/copies/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Copy ID")),
    request_body = RenewRequest,
    responses(
        (status = 303, description = "Renewed, redirect to all loans"),
        (status = 400, description = "Date malformed, in the past or more than 4 weeks ahead", body = crate::error::ErrorResponse),
        (status = 403, description = "Permission mark-returned required", body = crate::error::ErrorResponse),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn renew(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<RenewRequest>,
) -> AppResult<Redirect> {
    caller.authorize(Operation::RenewLoan)?;
    state.services.loans.renew(id, &request.renewal_date).await?;
    Ok(Redirect::to(ALL_LOANS_PATH))
}

/// Lend an available copy
#[utoipa::path(
    post,
    path = "/copies/{id}/checkout",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Copy ID")),
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Copy lent", body = BookInstance),
        (status = 400, description = "Unknown borrower or due date out of range", body = crate::error::ErrorResponse),
        (status = 403, description = "Permission mark-returned required", body = crate::error::ErrorResponse),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Copy not available", body = crate::error::ErrorResponse)
    )
)]
pub async fn checkout(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(request): Json<CheckoutRequest>,
) -> AppResult<Json<BookInstance>> {
    caller.authorize(Operation::Checkout)?;
    Ok(Json(state.services.loans.checkout(id, request).await?))
}

/// Take a copy back
#[utoipa::path(
    post,
    path = "/copies/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Copy ID")),
    responses(
        (status = 200, description = "Copy returned", body = BookInstance),
        (status = 403, description = "Permission mark-returned required", body = crate::error::ErrorResponse),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Copy not on loan", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_copy(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstance>> {
    caller.authorize(Operation::Return)?;
    Ok(Json(state.services.loans.return_copy(id).await?))
}
