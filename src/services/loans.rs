//! Loan management service

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::{BookInstance, CheckoutRequest, LoanEntry, RenewalForm},
        page::{Page, PageRequest},
    },
    repository::CatalogStore,
};

use super::{
    clock::Clock,
    renewal::{self, parse_date, proposed_renewal_date, validate_renewal},
};

#[derive(Clone)]
pub struct LoansService {
    store: Arc<dyn CatalogStore>,
    clock: Arc<dyn Clock>,
    per_page: i64,
}

impl LoansService {
    pub fn new(store: Arc<dyn CatalogStore>, clock: Arc<dyn Clock>, per_page: i64) -> Self {
        Self {
            store,
            clock,
            per_page,
        }
    }

    fn flag_overdue(&self, mut page: Page<LoanEntry>) -> Page<LoanEntry> {
        let today = self.clock.today();
        for entry in page.items.iter_mut() {
            entry.flag_overdue(today);
        }
        page
    }

    /// Copies on loan to `borrower_id`, soonest due first
    pub async fn loans_for(&self, borrower_id: i32, page: Option<&str>) -> AppResult<Page<LoanEntry>> {
        let request = PageRequest::parse(page, self.per_page)?;
        let (loans, total) = self.store.loans_for(borrower_id, request).await?;
        Ok(self.flag_overdue(Page::new(loans, total, request)?))
    }

    /// Every copy on loan, soonest due first
    pub async fn all_on_loan(&self, page: Option<&str>) -> AppResult<Page<LoanEntry>> {
        let request = PageRequest::parse(page, self.per_page)?;
        let (loans, total) = self.store.all_on_loan(request).await?;
        Ok(self.flag_overdue(Page::new(loans, total, request)?))
    }

    /// Renewal form for a copy, proposing three weeks from today
    pub async fn renewal_form(&self, id: Uuid) -> AppResult<RenewalForm> {
        let copy = self.store.get_copy(id).await?;
        Ok(RenewalForm {
            copy,
            renewal_date: proposed_renewal_date(self.clock.today()),
            label: renewal::RENEWAL_LABEL.to_string(),
            help_text: renewal::RENEWAL_HELP_TEXT.to_string(),
        })
    }

    /// Set a new due date on a copy. The copy status is left alone.
    pub async fn renew(&self, id: Uuid, renewal_date: &str) -> AppResult<BookInstance> {
        let copy = self.store.get_copy(id).await?;

        let candidate = parse_date(renewal_date)
            .ok_or_else(|| AppError::field("renewal_date", "Enter a valid date."))?;
        let due_back = validate_renewal(candidate, self.clock.today())?;

        let renewed = self.store.set_due_back(copy.id, due_back).await?;
        tracing::info!("Copy {} renewed until {}", id, due_back);
        Ok(renewed)
    }

    /// Lend an available copy to an existing user
    pub async fn checkout(&self, id: Uuid, request: CheckoutRequest) -> AppResult<BookInstance> {
        match self.store.get_user(request.borrower_id).await {
            Ok(_) => {}
            Err(AppError::NotFound(_)) => {
                return Err(AppError::field(
                    "borrower_id",
                    format!("User {} does not exist", request.borrower_id),
                ))
            }
            Err(e) => return Err(e),
        }

        let today = self.clock.today();
        let due_back = match request.due_back {
            Some(date) => validate_renewal(date, today)?,
            None => proposed_renewal_date(today),
        };

        let copy = self
            .store
            .checkout(id, request.borrower_id, due_back)
            .await?;
        tracing::info!(
            "Copy {} lent to user {} until {}",
            id,
            request.borrower_id,
            due_back
        );
        Ok(copy)
    }

    /// Take a copy back: available again, no borrower, no due date
    pub async fn return_copy(&self, id: Uuid) -> AppResult<BookInstance> {
        let copy = self.store.return_copy(id).await?;
        tracing::info!("Copy {} returned", id);
        Ok(copy)
    }
}
