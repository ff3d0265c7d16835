//! Business logic services

pub mod catalog;
pub mod clock;
pub mod loans;
pub mod renewal;
pub mod users;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::CatalogStore};

pub use clock::{Clock, SystemClock};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub users: users::UsersService,
    store: Arc<dyn CatalogStore>,
}

impl Services {
    /// Create all services over the given store
    pub fn new(store: Arc<dyn CatalogStore>, config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog: catalog::CatalogService::new(store.clone(), config.catalog.clone()),
            loans: loans::LoansService::new(store.clone(), clock, config.catalog.loans_per_page),
            users: users::UsersService::new(store.clone(), config.auth.clone()),
            store,
        }
    }

    /// Check the backing store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
