//! Test support for Folio integration tests.
//!
//! # Running Tests
//!
//! ```bash
//! # Workflow tests against the in-memory backend
//! cargo test -p folio-integration-tests
//!
//! # Postgres round-trip tests (need DATABASE_URL)
//! cargo test -p folio-integration-tests -- --ignored
//! ```
//!
//! [`TestBackend`] wires every domain service to one shared
//! [`MemoryStore`], so workflows cross service boundaries the same way
//! they do in production, minus the database.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use folio_core::{Email, ReferenceDataId, ReferenceDataType, Sub};
use folio_domain::db::{BookRepository, CustomerRepository, MemoryStore, ReferenceDataRepository};
use folio_domain::models::{Book, Customer, CustomerProfile, NewBook};
use folio_domain::services::{
    AddressService, BookService, CustomerService, OfferService, OrderService,
    ReferenceDataService, ShoppingCartService,
};

/// One value per reference category, enough to describe a book or offer.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceIds {
    /// A book type entry.
    pub book_type: ReferenceDataId,
    /// A condition entry.
    pub condition: ReferenceDataId,
    /// A genre entry.
    pub genre: ReferenceDataId,
    /// A publisher entry.
    pub publisher: ReferenceDataId,
}

/// Every domain service wired to one shared in-memory store.
pub struct TestBackend {
    store: Arc<MemoryStore>,
}

impl TestBackend {
    /// A backend over an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// Handle on the shared store, for direct repository calls.
    #[must_use]
    pub fn store(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.store)
    }

    /// Book service over the shared store.
    #[must_use]
    pub fn book_service(&self) -> BookService {
        BookService::new(self.store())
    }

    /// Customer service over the shared store.
    #[must_use]
    pub fn customer_service(&self) -> CustomerService {
        CustomerService::new(self.store())
    }

    /// Address book service over the shared store.
    #[must_use]
    pub fn address_service(&self) -> AddressService {
        AddressService::new(self.store(), self.store())
    }

    /// Offer service over the shared store.
    #[must_use]
    pub fn offer_service(&self) -> OfferService {
        OfferService::new(self.store(), self.store())
    }

    /// Order service over the shared store.
    #[must_use]
    pub fn order_service(&self) -> OrderService {
        OrderService::new(self.store(), self.store(), self.store(), self.store())
    }

    /// Shopping cart service over the shared store.
    #[must_use]
    pub fn cart_service(&self) -> ShoppingCartService {
        ShoppingCartService::new(self.store(), self.store())
    }

    /// Reference data service over the shared store.
    #[must_use]
    pub fn reference_data_service(&self) -> ReferenceDataService {
        ReferenceDataService::new(self.store())
    }

    /// Insert a customer for `sub` and return the stored record.
    ///
    /// # Panics
    ///
    /// Panics when the store rejects the write.
    pub async fn seed_customer(&self, sub: &Sub, username: &str) -> Customer {
        let profile = CustomerProfile {
            username: username.to_owned(),
            first_name: "Test".to_owned(),
            last_name: "Customer".to_owned(),
            email: Email::parse(&format!("{username}@example.com"))
                .expect("seed email should parse"),
            phone: None,
        };
        self.store
            .upsert(sub, profile)
            .await
            .expect("Failed to seed customer")
    }

    /// Insert one reference value per category and return the IDs.
    ///
    /// # Panics
    ///
    /// Panics when the store rejects a write.
    pub async fn seed_reference_data(&self) -> ReferenceIds {
        ReferenceIds {
            book_type: self
                .add_reference(ReferenceDataType::BookType, "Hardcover")
                .await,
            condition: self.add_reference(ReferenceDataType::Condition, "New").await,
            genre: self.add_reference(ReferenceDataType::Genre, "Fantasy").await,
            publisher: self
                .add_reference(ReferenceDataType::Publisher, "Test House")
                .await,
        }
    }

    /// Insert a single reference value and return its ID.
    ///
    /// # Panics
    ///
    /// Panics when the store rejects the write.
    pub async fn add_reference(
        &self,
        data_type: ReferenceDataType,
        value: &str,
    ) -> ReferenceDataId {
        ReferenceDataRepository::add(self.store.as_ref(), data_type, value.to_owned())
            .await
            .expect("Failed to seed reference data")
            .id
    }

    /// Insert a book priced at `price` and return the stored record.
    /// ISBNs are generated, so every seeded book is distinct.
    ///
    /// # Panics
    ///
    /// Panics when the store rejects the write.
    pub async fn seed_book(
        &self,
        name: &str,
        author: &str,
        price: Decimal,
        refs: ReferenceIds,
    ) -> Book {
        let book = NewBook {
            name: name.to_owned(),
            author: author.to_owned(),
            isbn: format!("isbn-{}", Uuid::new_v4()),
            book_type_id: refs.book_type,
            condition_id: refs.condition,
            genre_id: refs.genre,
            publisher_id: refs.publisher,
            price,
            quantity: 10,
        };
        BookRepository::add(self.store.as_ref(), book)
            .await
            .expect("Failed to seed book")
    }
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}
