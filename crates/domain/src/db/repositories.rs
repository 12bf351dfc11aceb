//! Repository traits implemented by both storage backends.
//!
//! Services hold these as `Arc<dyn Trait>` so the Postgres and in-memory
//! backends are interchangeable. Every method returns
//! [`RepositoryError`]; mapping to user-facing errors happens in the
//! service layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use folio_core::{
    AddressId, BookId, CorrelationId, CustomerId, OfferId, OfferStatus, OrderId, OrderStatus,
    PageRequest, PaginatedResult, ReferenceDataId, ReferenceDataType, ShoppingCartItemId, Sub,
};

use crate::db::RepositoryError;
use crate::models::{
    Address, BestSellingBook, Book, BookFilters, Customer, CustomerProfile, NewAddress, NewBook,
    NewOffer, Offer, OfferFilters, OfferStatistics, Order, OrderFilters, OrderPlacement,
    OrderStatistics, ReferenceDataFilters, ReferenceDataItem, ShoppingCart, ShoppingCartItem,
    ShoppingCartView,
};

/// Customer profile storage keyed by the identity provider's subject claim.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Fetch a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the lookup fails.
    async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;

    /// Fetch a customer by subject claim.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the lookup fails.
    async fn get_by_sub(&self, sub: &Sub) -> Result<Option<Customer>, RepositoryError>;

    /// Insert the profile on first sign-in, update it on every later one.
    /// The sub keys the row and is never rewritten.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    async fn upsert(
        &self,
        sub: &Sub,
        profile: CustomerProfile,
    ) -> Result<Customer, RepositoryError>;
}

/// Resale offer storage with moderation support.
#[async_trait]
pub trait OfferRepository: Send + Sync {
    /// Store a new offer in `PendingApproval` state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    async fn add(
        &self,
        customer_id: CustomerId,
        offer: NewOffer,
    ) -> Result<Offer, RepositoryError>;

    /// Fetch an offer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the lookup fails.
    async fn get(&self, id: OfferId) -> Result<Option<Offer>, RepositoryError>;

    /// List offers matching `filters`, newest first, one page at a time.
    ///
    /// The result's `total_count` counts the filtered set, not the table.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    async fn list(
        &self,
        filters: &OfferFilters,
        page: PageRequest,
    ) -> Result<PaginatedResult<Offer>, RepositoryError>;

    /// List every offer a customer has submitted, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Offer>, RepositoryError>;

    /// Set an offer's status, guarded by its row version.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the offer does not exist
    /// and [`RepositoryError::Conflict`] if the stored version no longer
    /// matches `expected_version`.
    async fn update_status(
        &self,
        id: OfferId,
        status: OfferStatus,
        expected_version: i64,
    ) -> Result<Offer, RepositoryError>;

    /// Offer counts for the dashboard; `month_start` bounds the
    /// this-month figure.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    async fn statistics(
        &self,
        month_start: DateTime<Utc>,
    ) -> Result<OfferStatistics, RepositoryError>;
}

/// Order storage, including placement from a shopping cart.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Atomically create an order from the cart's lines (snapshotting
    /// current book prices) and clear the cart.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] if the cart was emptied by a
    /// concurrent writer, otherwise `RepositoryError` for failed writes.
    async fn place(&self, placement: OrderPlacement) -> Result<Order, RepositoryError>;

    /// Fetch an order with its items by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the lookup fails.
    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// List orders matching `filters`, newest first, one page at a time.
    ///
    /// The result's `total_count` counts the filtered set, not the table.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    async fn list(
        &self,
        filters: &OrderFilters,
        page: PageRequest,
    ) -> Result<PaginatedResult<Order>, RepositoryError>;

    /// List every order a customer has placed, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    async fn list_for_customer(&self, customer_id: CustomerId)
    -> Result<Vec<Order>, RepositoryError>;

    /// Move an order from `from` to `to`, optionally recording a delivery
    /// date, as one compare-and-set.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the order does not exist
    /// and [`RepositoryError::Conflict`] if its status is no longer `from`.
    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
        delivery_date: Option<DateTime<Utc>>,
    ) -> Result<Order, RepositoryError>;

    /// The `limit` books with the highest total quantity ordered, ties
    /// broken by lower book ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    async fn best_selling(&self, limit: usize) -> Result<Vec<BestSellingBook>, RepositoryError>;

    /// Order counts for the dashboard; `now` decides which deliveries are
    /// past due and `month_start` bounds the this-month figure.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    async fn statistics(
        &self,
        now: DateTime<Utc>,
        month_start: DateTime<Utc>,
    ) -> Result<OrderStatistics, RepositoryError>;
}

/// Address book storage with soft deletion.
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Add an address to a customer's address book.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    async fn add(
        &self,
        customer_id: CustomerId,
        address: NewAddress,
    ) -> Result<Address, RepositoryError>;

    /// List a customer's active addresses, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    async fn list_active_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Address>, RepositoryError>;

    /// Fetch one of the customer's addresses, active only.
    ///
    /// Deactivated addresses and addresses owned by other customers both
    /// come back as `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the lookup fails.
    async fn get_active(
        &self,
        customer_id: CustomerId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError>;

    /// Soft-delete one of the customer's addresses.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the customer has no
    /// active address with this ID.
    async fn deactivate(
        &self,
        customer_id: CustomerId,
        id: AddressId,
    ) -> Result<(), RepositoryError>;
}

/// Catalog storage.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Add a book to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    async fn add(&self, book: NewBook) -> Result<Book, RepositoryError>;

    /// Fetch a book by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the lookup fails.
    async fn get(&self, id: BookId) -> Result<Option<Book>, RepositoryError>;

    /// Fetch several books at once; missing IDs are silently absent from
    /// the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    async fn get_many(&self, ids: &[BookId]) -> Result<Vec<Book>, RepositoryError>;

    /// List books matching `filters`, newest first, one page at a time.
    ///
    /// The result's `total_count` counts the filtered set, not the table.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    async fn list(
        &self,
        filters: &BookFilters,
        page: PageRequest,
    ) -> Result<PaginatedResult<Book>, RepositoryError>;

    /// Change a book's list price. Placed orders keep their snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the book does not exist.
    async fn update_price(&self, id: BookId, price: Decimal) -> Result<Book, RepositoryError>;
}

/// Lookup table storage.
#[async_trait]
pub trait ReferenceDataRepository: Send + Sync {
    /// Add a lookup entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    async fn add(
        &self,
        data_type: ReferenceDataType,
        value: String,
    ) -> Result<ReferenceDataItem, RepositoryError>;

    /// Fetch an entry by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the lookup fails.
    async fn get(&self, id: ReferenceDataId) -> Result<Option<ReferenceDataItem>, RepositoryError>;

    /// List every entry across all categories, grouped by category and
    /// sorted by value within it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    async fn list_all(&self) -> Result<Vec<ReferenceDataItem>, RepositoryError>;

    /// List entries matching `filters`, sorted by value, one page at a
    /// time.
    ///
    /// The result's `total_count` counts the filtered set, not the table.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    async fn list(
        &self,
        filters: &ReferenceDataFilters,
        page: PageRequest,
    ) -> Result<PaginatedResult<ReferenceDataItem>, RepositoryError>;
}

/// Shopping cart storage keyed by browser correlation ID.
#[async_trait]
pub trait ShoppingCartRepository: Send + Sync {
    /// Fetch the cart behind a correlation ID, if one was ever created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the lookup fails.
    async fn find_cart(
        &self,
        correlation_id: CorrelationId,
    ) -> Result<Option<ShoppingCart>, RepositoryError>;

    /// The cart's lines joined with their books at current prices.
    ///
    /// Correlation IDs with no cart get an empty view.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    async fn get_view(
        &self,
        correlation_id: CorrelationId,
    ) -> Result<ShoppingCartView, RepositoryError>;

    /// Add copies of a book to the cart, creating the cart on first use
    /// and merging quantities when the book is already in it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    async fn add_item(
        &self,
        correlation_id: CorrelationId,
        book_id: BookId,
        quantity: i32,
    ) -> Result<ShoppingCartItem, RepositoryError>;

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the correlation ID's cart
    /// has no such line.
    async fn remove_item(
        &self,
        correlation_id: CorrelationId,
        item_id: ShoppingCartItemId,
    ) -> Result<(), RepositoryError>;
}
