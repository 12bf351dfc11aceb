//! Address book workflows.

use std::sync::Arc;

use tracing::{info, instrument};

use folio_core::{AddressId, Sub};

use crate::db::RepositoryError;
use crate::db::repositories::{AddressRepository, CustomerRepository};
use crate::error::DomainError;
use crate::models::{Address, Customer, NewAddress};

/// Address book service.
pub struct AddressService {
    addresses: Arc<dyn AddressRepository>,
    customers: Arc<dyn CustomerRepository>,
}

impl AddressService {
    /// Create a new address service.
    #[must_use]
    pub fn new(
        addresses: Arc<dyn AddressRepository>,
        customers: Arc<dyn CustomerRepository>,
    ) -> Self {
        Self {
            addresses,
            customers,
        }
    }

    async fn require_customer(&self, sub: &Sub) -> Result<Customer, DomainError> {
        self.customers
            .get_by_sub(sub)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("no customer for subject {sub}")))
    }

    /// The customer's active addresses, oldest first. A subject with no
    /// customer record has no addresses.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from the store.
    pub async fn list_addresses(&self, sub: &Sub) -> Result<Vec<Address>, DomainError> {
        let Some(customer) = self.customers.get_by_sub(sub).await? else {
            return Ok(Vec::new());
        };
        Ok(self.addresses.list_active_for_customer(customer.id).await?)
    }

    /// Fetch one of the customer's active addresses.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` when the address does not exist,
    /// was removed, or belongs to someone else.
    pub async fn get_address(&self, sub: &Sub, id: AddressId) -> Result<Address, DomainError> {
        let customer = self.require_customer(sub).await?;
        self.addresses
            .get_active(customer.id, id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("address {id} not found")))
    }

    /// Add an address to the customer's address book.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` when `sub` has no customer record.
    #[instrument(skip(self, address))]
    pub async fn create_address(
        &self,
        sub: &Sub,
        address: NewAddress,
    ) -> Result<Address, DomainError> {
        let customer = self.require_customer(sub).await?;
        let address = self.addresses.add(customer.id, address).await?;

        info!(address_id = %address.id, customer_id = %customer.id, "Added address");
        Ok(address)
    }

    /// Remove an address from the customer's address book. Past orders
    /// keep referencing it; the address only stops being offered.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` when the customer has no active
    /// address with this ID.
    #[instrument(skip(self))]
    pub async fn delete_address(&self, sub: &Sub, id: AddressId) -> Result<(), DomainError> {
        let customer = self.require_customer(sub).await?;

        match self.addresses.deactivate(customer.id, id).await {
            Ok(()) => {
                info!(address_id = %id, "Removed address");
                Ok(())
            }
            Err(RepositoryError::NotFound) => {
                Err(DomainError::NotFound(format!("address {id} not found")))
            }
            Err(e) => Err(e.into()),
        }
    }
}
