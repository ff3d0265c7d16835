//! Renewal date rules

use chrono::{Duration, NaiveDate};
use thiserror::Error;

/// Furthest a due date may be pushed, in days from today
pub const MAX_RENEWAL_DAYS: i64 = 28;

/// Due date proposed by the renewal form, in days from today
pub const DEFAULT_RENEWAL_DAYS: i64 = 21;

pub const RENEWAL_LABEL: &str = "New date";
pub const RENEWAL_HELP_TEXT: &str = "Enter a date between now and 4 weeks (default 3).";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenewalError {
    #[error("Invalid date - renewal in past")]
    PastDate,
    #[error("Invalid date - renewal more than 4 weeks ahead")]
    TooFarAhead,
}

/// Accept `candidate` when `today <= candidate <= today + 4 weeks`
pub fn validate_renewal(candidate: NaiveDate, today: NaiveDate) -> Result<NaiveDate, RenewalError> {
    if candidate < today {
        return Err(RenewalError::PastDate);
    }
    if candidate > today + Duration::days(MAX_RENEWAL_DAYS) {
        return Err(RenewalError::TooFarAhead);
    }
    Ok(candidate)
}

/// Initial value of the renewal form
pub fn proposed_renewal_date(today: NaiveDate) -> NaiveDate {
    today + Duration::days(DEFAULT_RENEWAL_DAYS)
}

/// Parse a `YYYY-MM-DD` form value
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
