//! Business logic services

pub mod analytics;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod loans;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub analytics: analytics::AnalyticsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), config.workflow.clone()),
            analytics: analytics::AnalyticsService::new(repository, &config.cache),
        }
    }
}
