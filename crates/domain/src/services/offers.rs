//! Offer workflows: submission by customers, moderation by admins.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use folio_core::calendar::start_of_month;
use folio_core::{OfferId, OfferStatus, PaginatedResult, Sub};

use super::page_request;
use crate::db::repositories::{CustomerRepository, OfferRepository};
use crate::error::DomainError;
use crate::models::{Customer, NewOffer, Offer, OfferFilters, OfferStatistics};

/// Resale offer service.
pub struct OfferService {
    offers: Arc<dyn OfferRepository>,
    customers: Arc<dyn CustomerRepository>,
}

impl OfferService {
    /// Create a new offer service.
    #[must_use]
    pub fn new(offers: Arc<dyn OfferRepository>, customers: Arc<dyn CustomerRepository>) -> Self {
        Self { offers, customers }
    }

    async fn require_customer(&self, sub: &Sub) -> Result<Customer, DomainError> {
        self.customers
            .get_by_sub(sub)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("no customer for subject {sub}")))
    }

    /// Admin view: offers matching `filters`, paginated.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` for a zero page index or
    /// size, or a persistence error from the store.
    #[instrument(skip(self, filters))]
    pub async fn list_offers(
        &self,
        filters: &OfferFilters,
        page_index: u32,
        page_size: u32,
    ) -> Result<PaginatedResult<Offer>, DomainError> {
        let page = page_request(page_index, page_size)?;
        Ok(self.offers.list(filters, page).await?)
    }

    /// Every offer the customer behind `sub` has submitted, newest first.
    /// A subject with no customer record has no offers.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from the store.
    pub async fn list_offers_for_customer(&self, sub: &Sub) -> Result<Vec<Offer>, DomainError> {
        let Some(customer) = self.customers.get_by_sub(sub).await? else {
            return Ok(Vec::new());
        };
        Ok(self.offers.list_for_customer(customer.id).await?)
    }

    /// Fetch one offer.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no offer has this ID.
    pub async fn get_offer(&self, id: OfferId) -> Result<Offer, DomainError> {
        self.offers
            .get(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("offer {id} not found")))
    }

    /// Submit a resale offer; it starts in `PendingApproval`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` for a negative price and
    /// `DomainError::NotFound` when `sub` has no customer record.
    #[instrument(skip(self, offer), fields(book = %offer.book_name))]
    pub async fn create_offer(&self, sub: &Sub, offer: NewOffer) -> Result<Offer, DomainError> {
        if offer.price < Decimal::ZERO {
            return Err(DomainError::InvalidArgument(
                "offer price cannot be negative".to_string(),
            ));
        }

        let customer = self.require_customer(sub).await?;
        let offer = self.offers.add(customer.id, offer).await?;

        info!(offer_id = %offer.id, customer_id = %customer.id, "Submitted offer");
        Ok(offer)
    }

    /// Moderate an offer. Setting the status it already has is a no-op;
    /// anything the status machine forbids is rejected.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the offer does not exist,
    /// `DomainError::InvalidOperation` for an illegal transition, and
    /// `DomainError::Conflict` when a concurrent moderator won the write.
    #[instrument(skip(self))]
    pub async fn update_offer_status(
        &self,
        id: OfferId,
        new_status: OfferStatus,
    ) -> Result<Offer, DomainError> {
        let offer = self.get_offer(id).await?;

        if offer.status == new_status {
            return Ok(offer);
        }

        if !offer.status.can_transition_to(new_status) {
            return Err(DomainError::InvalidOperation(format!(
                "offer cannot move from {} to {}",
                offer.status, new_status
            )));
        }

        let updated = self
            .offers
            .update_status(id, new_status, offer.row_version)
            .await?;

        info!(offer_id = %id, status = %new_status, "Moderated offer");
        Ok(updated)
    }

    /// Dashboard counts over all offers.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from the store.
    pub async fn statistics(&self) -> Result<OfferStatistics, DomainError> {
        let month_start = start_of_month(Utc::now());
        Ok(self.offers.statistics(month_start).await?)
    }
}
