//! Book instance (loanable copy) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Availability of a copy. Stored as a one letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    pub fn as_code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            _ => Err(format!("Invalid loan status code: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_code(), buf)
    }
}

/// A physical, loanable copy of a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: i32,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}

impl BookInstance {
    /// A borrower may only be set while the copy is on loan
    pub fn check_borrower(&self) -> AppResult<()> {
        if self.borrower_id.is_some() && self.status != LoanStatus::OnLoan {
            return Err(AppError::field(
                "borrower_id",
                format!("A copy with status '{}' cannot have a borrower", self.status),
            ));
        }
        Ok(())
    }
}

/// Copy on loan, joined with its book title and borrower
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanEntry {
    pub id: Uuid,
    pub book_id: i32,
    pub title: String,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
    pub borrower_username: Option<String>,
    #[sqlx(default)]
    #[serde(default)]
    pub is_overdue: bool,
}

impl LoanEntry {
    /// Set `is_overdue` from the due date: late only once the due day has passed
    pub fn flag_overdue(&mut self, today: NaiveDate) {
        self.is_overdue = self.due_back.is_some_and(|due| today > due);
    }
}

/// Create copy request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CreateBookInstance {
    #[validate(length(max = 200, message = "Imprint must be at most 200 characters"))]
    #[serde(default)]
    pub imprint: String,
    #[serde(default)]
    pub status: LoanStatus,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
}

impl CreateBookInstance {
    pub fn into_instance(self, book_id: i32) -> BookInstance {
        BookInstance {
            id: Uuid::new_v4(),
            book_id,
            imprint: self.imprint,
            due_back: self.due_back,
            status: self.status,
            borrower_id: self.borrower_id,
        }
    }
}

/// Update copy request. `null` clears `due_back` / `borrower_id`, absence keeps them.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBookInstance {
    #[validate(length(max = 200, message = "Imprint must be at most 200 characters"))]
    pub imprint: Option<String>,
    pub status: Option<LoanStatus>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub due_back: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub borrower_id: Option<Option<i32>>,
}

impl UpdateBookInstance {
    pub fn apply(self, mut instance: BookInstance) -> BookInstance {
        if let Some(imprint) = self.imprint {
            instance.imprint = imprint;
        }
        if let Some(status) = self.status {
            instance.status = status;
        }
        if let Some(due_back) = self.due_back {
            instance.due_back = due_back;
        }
        if let Some(borrower_id) = self.borrower_id {
            instance.borrower_id = borrower_id;
        }
        instance
    }
}

/// Checkout request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub borrower_id: i32,
    /// Defaults to three weeks from today
    pub due_back: Option<NaiveDate>,
}

/// Renewal submission. The date stays raw text so a malformed value
/// surfaces as a field error rather than a body rejection.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RenewRequest {
    /// "YYYY-MM-DD"
    #[serde(default)]
    pub renewal_date: String,
}

/// Renewal form prefilled for a copy
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalForm {
    pub copy: BookInstance,
    pub renewal_date: NaiveDate,
    pub label: String,
    pub help_text: String,
}

/// Narrows the copy listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyFilter {
    pub status: Option<LoanStatus>,
    /// Due on or before this date
    pub due_by: Option<NaiveDate>,
}

impl CopyFilter {
    pub fn matches(&self, copy: &BookInstance) -> bool {
        self.status.map_or(true, |status| copy.status == status)
            && self
                .due_by
                .map_or(true, |day| copy.due_back.is_some_and(|due| due <= day))
    }
}

/// `GET /copies` query string
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CopyListQuery {
    /// Page number, starting at 1 (default: 1)
    pub page: Option<String>,
    pub status: Option<LoanStatus>,
    /// Only copies due on or before this day
    pub due_by: Option<NaiveDate>,
}

impl CopyListQuery {
    pub fn filter(&self) -> CopyFilter {
        CopyFilter {
            status: self.status,
            due_by: self.due_by,
        }
    }
}
