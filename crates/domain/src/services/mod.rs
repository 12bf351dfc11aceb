//! Domain services: validation and orchestration in front of the
//! repositories.
//!
//! Each service is constructed with the repository handles it needs as
//! `Arc<dyn Trait>`, so callers choose the backend. Services translate
//! repository errors into [`DomainError`] with enough context for a
//! controller to render, and never retry on conflict; that choice stays
//! with the caller.

pub mod addresses;
pub mod books;
pub mod carts;
pub mod customers;
pub mod offers;
pub mod orders;
pub mod reference_data;

pub use addresses::AddressService;
pub use books::BookService;
pub use carts::ShoppingCartService;
pub use customers::CustomerService;
pub use offers::OfferService;
pub use orders::OrderService;
pub use reference_data::ReferenceDataService;

use folio_core::PageRequest;

use crate::DomainError;

/// Validate raw pagination inputs at the service boundary.
pub(crate) fn page_request(page_index: u32, page_size: u32) -> Result<PageRequest, DomainError> {
    PageRequest::new(page_index, page_size).map_err(|e| DomainError::InvalidArgument(e.to_string()))
}
