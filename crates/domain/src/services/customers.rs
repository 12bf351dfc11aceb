//! Customer profile workflows.

use std::sync::Arc;

use tracing::{info, instrument};

use folio_core::Sub;

use crate::db::repositories::CustomerRepository;
use crate::error::DomainError;
use crate::models::{Customer, CustomerProfile};

/// Customer service.
pub struct CustomerService {
    customers: Arc<dyn CustomerRepository>,
}

impl CustomerService {
    /// Create a new customer service.
    #[must_use]
    pub fn new(customers: Arc<dyn CustomerRepository>) -> Self {
        Self { customers }
    }

    /// Fetch the customer behind an identity subject.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` when `sub` has no customer record.
    pub async fn get_customer(&self, sub: &Sub) -> Result<Customer, DomainError> {
        self.customers
            .get_by_sub(sub)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("no customer for subject {sub}")))
    }

    /// Sync the profile the identity provider sent at sign-in: the first
    /// sign-in creates the customer, later ones refresh the profile
    /// fields. The sub never changes.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from the store.
    #[instrument(skip(self, profile), fields(username = %profile.username))]
    pub async fn upsert_customer(
        &self,
        sub: &Sub,
        profile: CustomerProfile,
    ) -> Result<Customer, DomainError> {
        let customer = self.customers.upsert(sub, profile).await?;

        info!(customer_id = %customer.id, "Synced customer profile");
        Ok(customer)
    }
}
