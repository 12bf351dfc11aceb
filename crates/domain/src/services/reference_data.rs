//! Reference data workflows for the lookup table behind storefront and
//! admin forms.

use std::sync::Arc;

use tracing::{info, instrument};

use folio_core::{PaginatedResult, ReferenceDataId, ReferenceDataType};

use super::page_request;
use crate::db::repositories::ReferenceDataRepository;
use crate::error::DomainError;
use crate::models::{ReferenceDataFilters, ReferenceDataItem};

/// Reference data service.
pub struct ReferenceDataService {
    reference_data: Arc<dyn ReferenceDataRepository>,
}

impl ReferenceDataService {
    /// Create a new reference data service.
    #[must_use]
    pub fn new(reference_data: Arc<dyn ReferenceDataRepository>) -> Self {
        Self { reference_data }
    }

    /// Every entry, for storefront dropdowns that show all categories at
    /// once.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from the store.
    pub async fn list_all(&self) -> Result<Vec<ReferenceDataItem>, DomainError> {
        Ok(self.reference_data.list_all().await?)
    }

    /// Admin view: entries matching `filters`, paginated.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` for a zero page index or
    /// size, or a persistence error from the store.
    #[instrument(skip(self, filters))]
    pub async fn list(
        &self,
        filters: &ReferenceDataFilters,
        page_index: u32,
        page_size: u32,
    ) -> Result<PaginatedResult<ReferenceDataItem>, DomainError> {
        let page = page_request(page_index, page_size)?;
        Ok(self.reference_data.list(filters, page).await?)
    }

    /// Fetch one entry.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no entry has this ID.
    pub async fn get(&self, id: ReferenceDataId) -> Result<ReferenceDataItem, DomainError> {
        self.reference_data
            .get(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("reference data {id} not found")))
    }

    /// Add a lookup entry.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` for a blank value.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        data_type: ReferenceDataType,
        value: String,
    ) -> Result<ReferenceDataItem, DomainError> {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(DomainError::InvalidArgument(
                "reference data value cannot be blank".to_string(),
            ));
        }

        let item = self.reference_data.add(data_type, value).await?;

        info!(id = %item.id, data_type = %item.data_type, "Added reference data");
        Ok(item)
    }
}
