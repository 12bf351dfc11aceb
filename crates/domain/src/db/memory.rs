//! In-memory store implementing every repository trait.
//!
//! One `MemoryStore` is the whole database: plain `Vec`s behind a single
//! mutex, with monotonic i32 counters standing in for `SERIAL` columns.
//! Filters reuse the models' `matches` predicates and orderings mirror
//! the Postgres queries, so swapping backends never changes results.
//!
//! The lock is never held across an await point.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use folio_core::{
    AddressId, BookId, CorrelationId, CustomerId, OfferId, OfferStatus, OrderId, OrderItemId,
    OrderStatus, PageRequest, PaginatedResult, ReferenceDataId, ReferenceDataType, ShoppingCartId,
    ShoppingCartItemId, Sub,
};

use super::RepositoryError;
use super::repositories::{
    AddressRepository, BookRepository, CustomerRepository, OfferRepository, OrderRepository,
    ReferenceDataRepository, ShoppingCartRepository,
};
use crate::models::{
    Address, BestSellingBook, Book, BookFilters, Customer, CustomerProfile, NewAddress, NewBook,
    NewOffer, Offer, OfferFilters, OfferStatistics, Order, OrderFilters, OrderItem,
    OrderPlacement, OrderStatistics, ReferenceDataFilters, ReferenceDataItem, ShoppingCart,
    ShoppingCartItem, ShoppingCartView,
};

/// Everything the store holds, guarded by one mutex.
#[derive(Debug, Default)]
struct MemoryState {
    customers: Vec<Customer>,
    addresses: Vec<Address>,
    books: Vec<Book>,
    reference_data: Vec<ReferenceDataItem>,
    offers: Vec<Offer>,
    orders: Vec<Order>,
    carts: Vec<ShoppingCart>,
    cart_items: Vec<ShoppingCartItem>,
    next_customer_id: i32,
    next_address_id: i32,
    next_book_id: i32,
    next_reference_id: i32,
    next_offer_id: i32,
    next_order_id: i32,
    next_order_item_id: i32,
    next_cart_id: i32,
    next_cart_item_id: i32,
}

/// Pre-increment so the first ID handed out is 1, like `SERIAL`.
fn next(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

/// In-memory store for tests, demos, and local runs without Postgres.
///
/// Cloning the `Arc` it usually lives in shares the store; the store
/// itself is cheap to create empty.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A poisoned lock only means a test thread panicked mid-write; the
    /// data is still the best answer available.
    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// Customers
// =============================================================================

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let state = self.state();
        Ok(state.customers.iter().find(|c| c.id == id).cloned())
    }

    async fn get_by_sub(&self, sub: &Sub) -> Result<Option<Customer>, RepositoryError> {
        let state = self.state();
        Ok(state.customers.iter().find(|c| c.sub == *sub).cloned())
    }

    async fn upsert(
        &self,
        sub: &Sub,
        profile: CustomerProfile,
    ) -> Result<Customer, RepositoryError> {
        let now = Utc::now();
        let mut state = self.state();

        if let Some(customer) = state.customers.iter_mut().find(|c| c.sub == *sub) {
            customer.username = profile.username;
            customer.first_name = profile.first_name;
            customer.last_name = profile.last_name;
            customer.email = profile.email;
            customer.phone = profile.phone;
            customer.updated_on = now;
            return Ok(customer.clone());
        }

        let customer = Customer {
            id: CustomerId::new(next(&mut state.next_customer_id)),
            sub: sub.clone(),
            username: profile.username,
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email,
            phone: profile.phone,
            created_on: now,
            updated_on: now,
        };
        state.customers.push(customer.clone());
        Ok(customer)
    }
}

// =============================================================================
// Addresses
// =============================================================================

#[async_trait]
impl AddressRepository for MemoryStore {
    async fn add(
        &self,
        customer_id: CustomerId,
        address: NewAddress,
    ) -> Result<Address, RepositoryError> {
        let now = Utc::now();
        let mut state = self.state();

        let address = Address {
            id: AddressId::new(next(&mut state.next_address_id)),
            customer_id,
            address_line1: address.address_line1,
            address_line2: address.address_line2,
            city: address.city,
            state: address.state,
            country: address.country,
            zip_code: address.zip_code,
            is_active: true,
            created_on: now,
            updated_on: now,
        };
        state.addresses.push(address.clone());
        Ok(address)
    }

    async fn list_active_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Address>, RepositoryError> {
        let state = self.state();
        Ok(state
            .addresses
            .iter()
            .filter(|a| a.customer_id == customer_id && a.is_active)
            .cloned()
            .collect())
    }

    async fn get_active(
        &self,
        customer_id: CustomerId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let state = self.state();
        Ok(state
            .addresses
            .iter()
            .find(|a| a.customer_id == customer_id && a.id == id && a.is_active)
            .cloned())
    }

    async fn deactivate(
        &self,
        customer_id: CustomerId,
        id: AddressId,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state();

        let Some(address) = state
            .addresses
            .iter_mut()
            .find(|a| a.customer_id == customer_id && a.id == id && a.is_active)
        else {
            return Err(RepositoryError::NotFound);
        };

        address.is_active = false;
        address.updated_on = Utc::now();
        Ok(())
    }
}

// =============================================================================
// Books
// =============================================================================

#[async_trait]
impl BookRepository for MemoryStore {
    async fn add(&self, book: NewBook) -> Result<Book, RepositoryError> {
        let now = Utc::now();
        let mut state = self.state();

        let book = Book {
            id: BookId::new(next(&mut state.next_book_id)),
            name: book.name,
            author: book.author,
            isbn: book.isbn,
            book_type_id: book.book_type_id,
            condition_id: book.condition_id,
            genre_id: book.genre_id,
            publisher_id: book.publisher_id,
            price: book.price,
            quantity: book.quantity,
            created_on: now,
            updated_on: now,
        };
        state.books.push(book.clone());
        Ok(book)
    }

    async fn get(&self, id: BookId) -> Result<Option<Book>, RepositoryError> {
        let state = self.state();
        Ok(state.books.iter().find(|b| b.id == id).cloned())
    }

    async fn get_many(&self, ids: &[BookId]) -> Result<Vec<Book>, RepositoryError> {
        let state = self.state();
        let mut books: Vec<Book> = state
            .books
            .iter()
            .filter(|b| ids.contains(&b.id))
            .cloned()
            .collect();
        books.sort_by_key(|b| b.id);
        Ok(books)
    }

    async fn list(
        &self,
        filters: &BookFilters,
        page: PageRequest,
    ) -> Result<PaginatedResult<Book>, RepositoryError> {
        let state = self.state();
        let mut filtered: Vec<Book> = state
            .books
            .iter()
            .filter(|b| filters.matches(b))
            .cloned()
            .collect();
        filtered.sort_by(|a, b| b.created_on.cmp(&a.created_on).then(b.id.cmp(&a.id)));
        Ok(PaginatedResult::paginate(filtered, page))
    }

    async fn update_price(&self, id: BookId, price: Decimal) -> Result<Book, RepositoryError> {
        let mut state = self.state();

        let Some(book) = state.books.iter_mut().find(|b| b.id == id) else {
            return Err(RepositoryError::NotFound);
        };

        book.price = price;
        book.updated_on = Utc::now();
        Ok(book.clone())
    }
}

// =============================================================================
// Reference data
// =============================================================================

#[async_trait]
impl ReferenceDataRepository for MemoryStore {
    async fn add(
        &self,
        data_type: ReferenceDataType,
        value: String,
    ) -> Result<ReferenceDataItem, RepositoryError> {
        let mut state = self.state();

        let item = ReferenceDataItem {
            id: ReferenceDataId::new(next(&mut state.next_reference_id)),
            data_type,
            value,
        };
        state.reference_data.push(item.clone());
        Ok(item)
    }

    async fn get(&self, id: ReferenceDataId) -> Result<Option<ReferenceDataItem>, RepositoryError> {
        let state = self.state();
        Ok(state.reference_data.iter().find(|r| r.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<ReferenceDataItem>, RepositoryError> {
        let state = self.state();
        let mut items = state.reference_data.clone();
        items.sort_by(|a, b| {
            a.data_type
                .to_string()
                .cmp(&b.data_type.to_string())
                .then_with(|| a.value.cmp(&b.value))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(items)
    }

    async fn list(
        &self,
        filters: &ReferenceDataFilters,
        page: PageRequest,
    ) -> Result<PaginatedResult<ReferenceDataItem>, RepositoryError> {
        let state = self.state();
        let mut filtered: Vec<ReferenceDataItem> = state
            .reference_data
            .iter()
            .filter(|r| filters.matches(r))
            .cloned()
            .collect();
        filtered.sort_by(|a, b| a.value.cmp(&b.value).then_with(|| a.id.cmp(&b.id)));
        Ok(PaginatedResult::paginate(filtered, page))
    }
}

// =============================================================================
// Offers
// =============================================================================

#[async_trait]
impl OfferRepository for MemoryStore {
    async fn add(
        &self,
        customer_id: CustomerId,
        offer: NewOffer,
    ) -> Result<Offer, RepositoryError> {
        let now = Utc::now();
        let mut state = self.state();

        let offer = Offer {
            id: OfferId::new(next(&mut state.next_offer_id)),
            customer_id,
            book_name: offer.book_name,
            author: offer.author,
            isbn: offer.isbn,
            book_type_id: offer.book_type_id,
            condition_id: offer.condition_id,
            genre_id: offer.genre_id,
            publisher_id: offer.publisher_id,
            price: offer.price,
            status: OfferStatus::PendingApproval,
            created_on: now,
            updated_on: now,
            row_version: 1,
        };
        state.offers.push(offer.clone());
        Ok(offer)
    }

    async fn get(&self, id: OfferId) -> Result<Option<Offer>, RepositoryError> {
        let state = self.state();
        Ok(state.offers.iter().find(|o| o.id == id).cloned())
    }

    async fn list(
        &self,
        filters: &OfferFilters,
        page: PageRequest,
    ) -> Result<PaginatedResult<Offer>, RepositoryError> {
        let state = self.state();
        let mut filtered: Vec<Offer> = state
            .offers
            .iter()
            .filter(|o| filters.matches(o))
            .cloned()
            .collect();
        filtered.sort_by(|a, b| b.created_on.cmp(&a.created_on).then(b.id.cmp(&a.id)));
        Ok(PaginatedResult::paginate(filtered, page))
    }

    async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Offer>, RepositoryError> {
        let state = self.state();
        let mut offers: Vec<Offer> = state
            .offers
            .iter()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect();
        offers.sort_by(|a, b| b.created_on.cmp(&a.created_on).then(b.id.cmp(&a.id)));
        Ok(offers)
    }

    async fn update_status(
        &self,
        id: OfferId,
        status: OfferStatus,
        expected_version: i64,
    ) -> Result<Offer, RepositoryError> {
        let mut state = self.state();

        let Some(offer) = state.offers.iter_mut().find(|o| o.id == id) else {
            return Err(RepositoryError::NotFound);
        };

        if offer.row_version != expected_version {
            return Err(RepositoryError::Conflict(
                "offer was changed by another writer".to_string(),
            ));
        }

        offer.status = status;
        offer.updated_on = Utc::now();
        offer.row_version += 1;
        Ok(offer.clone())
    }

    async fn statistics(
        &self,
        month_start: DateTime<Utc>,
    ) -> Result<OfferStatistics, RepositoryError> {
        let state = self.state();
        let mut stats = OfferStatistics::default();

        for offer in &state.offers {
            stats.offers_total += 1;
            if offer.status == OfferStatus::PendingApproval {
                stats.pending_offers += 1;
            }
            if offer.created_on >= month_start {
                stats.offers_this_month += 1;
            }
        }

        Ok(stats)
    }
}

// =============================================================================
// Orders
// =============================================================================

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn place(&self, placement: OrderPlacement) -> Result<Order, RepositoryError> {
        let now = Utc::now();
        let mut state = self.state();

        let lines: Vec<(BookId, i32)> = state
            .cart_items
            .iter()
            .filter(|item| item.cart_id == placement.cart_id)
            .map(|item| (item.book_id, item.quantity))
            .collect();

        if lines.is_empty() {
            return Err(RepositoryError::Conflict(
                "shopping cart emptied during checkout".to_string(),
            ));
        }

        let order_id = OrderId::new(next(&mut state.next_order_id));
        let mut items = Vec::with_capacity(lines.len());
        for (book_id, quantity) in lines {
            let Some(unit_price) = state.books.iter().find(|b| b.id == book_id).map(|b| b.price)
            else {
                return Err(RepositoryError::DataCorruption(format!(
                    "cart references missing book {book_id}"
                )));
            };

            items.push(OrderItem {
                id: OrderItemId::new(next(&mut state.next_order_item_id)),
                order_id,
                book_id,
                quantity,
                unit_price,
            });
        }

        state.cart_items.retain(|item| item.cart_id != placement.cart_id);

        let order = Order {
            id: order_id,
            customer_id: placement.customer_id,
            address_id: placement.address_id,
            status: OrderStatus::Pending,
            ordered_on: now,
            delivery_date: None,
            updated_on: now,
            items,
        };
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let state = self.state();
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list(
        &self,
        filters: &OrderFilters,
        page: PageRequest,
    ) -> Result<PaginatedResult<Order>, RepositoryError> {
        let state = self.state();
        let mut filtered: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| filters.matches(o))
            .cloned()
            .collect();
        filtered.sort_by(|a, b| b.ordered_on.cmp(&a.ordered_on).then(b.id.cmp(&a.id)));
        Ok(PaginatedResult::paginate(filtered, page))
    }

    async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let state = self.state();
        let mut orders: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.ordered_on.cmp(&a.ordered_on).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
        delivery_date: Option<DateTime<Utc>>,
    ) -> Result<Order, RepositoryError> {
        let mut state = self.state();

        let Some(order) = state.orders.iter_mut().find(|o| o.id == id) else {
            return Err(RepositoryError::NotFound);
        };

        if order.status != from {
            return Err(RepositoryError::Conflict(
                "order status changed by another writer".to_string(),
            ));
        }

        order.status = to;
        if let Some(date) = delivery_date {
            order.delivery_date = Some(date);
        }
        order.updated_on = Utc::now();
        Ok(order.clone())
    }

    async fn best_selling(&self, limit: usize) -> Result<Vec<BestSellingBook>, RepositoryError> {
        let state = self.state();

        let mut totals: HashMap<BookId, i64> = HashMap::new();
        for order in &state.orders {
            for item in &order.items {
                *totals.entry(item.book_id).or_insert(0) += i64::from(item.quantity);
            }
        }

        let mut ranked: Vec<(BookId, i64)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(limit);

        let mut best = Vec::with_capacity(ranked.len());
        for (book_id, total_ordered) in ranked {
            if let Some(book) = state.books.iter().find(|b| b.id == book_id) {
                best.push(BestSellingBook {
                    book: book.clone(),
                    total_ordered,
                });
            }
        }
        Ok(best)
    }

    async fn statistics(
        &self,
        now: DateTime<Utc>,
        month_start: DateTime<Utc>,
    ) -> Result<OrderStatistics, RepositoryError> {
        let state = self.state();
        let mut stats = OrderStatistics::default();

        for order in &state.orders {
            stats.orders_total += 1;
            match order.status {
                OrderStatus::Pending => stats.pending_orders += 1,
                OrderStatus::Ordered
                    if order.delivery_date.is_some_and(|date| date < now) =>
                {
                    stats.past_due_orders += 1;
                }
                _ => {}
            }
            if order.ordered_on >= month_start {
                stats.orders_this_month += 1;
            }
        }

        Ok(stats)
    }
}

// =============================================================================
// Shopping carts
// =============================================================================

#[async_trait]
impl ShoppingCartRepository for MemoryStore {
    async fn find_cart(
        &self,
        correlation_id: CorrelationId,
    ) -> Result<Option<ShoppingCart>, RepositoryError> {
        let state = self.state();
        Ok(state
            .carts
            .iter()
            .find(|c| c.correlation_id == correlation_id)
            .cloned())
    }

    async fn get_view(
        &self,
        correlation_id: CorrelationId,
    ) -> Result<ShoppingCartView, RepositoryError> {
        let state = self.state();

        let Some(cart_id) = state
            .carts
            .iter()
            .find(|c| c.correlation_id == correlation_id)
            .map(|c| c.id)
        else {
            return Ok(ShoppingCartView::empty());
        };

        let mut lines = Vec::new();
        for item in state.cart_items.iter().filter(|i| i.cart_id == cart_id) {
            let Some(book) = state.books.iter().find(|b| b.id == item.book_id) else {
                continue;
            };
            lines.push(crate::models::CartLine {
                item_id: item.id,
                book_id: item.book_id,
                book_name: book.name.clone(),
                author: book.author.clone(),
                unit_price: book.price,
                quantity: item.quantity,
            });
        }

        Ok(ShoppingCartView { items: lines })
    }

    async fn add_item(
        &self,
        correlation_id: CorrelationId,
        book_id: BookId,
        quantity: i32,
    ) -> Result<ShoppingCartItem, RepositoryError> {
        let now = Utc::now();
        let mut state = self.state();

        let cart_id = match state
            .carts
            .iter()
            .find(|c| c.correlation_id == correlation_id)
            .map(|c| c.id)
        {
            Some(id) => id,
            None => {
                let id = ShoppingCartId::new(next(&mut state.next_cart_id));
                state.carts.push(ShoppingCart {
                    id,
                    correlation_id,
                    created_on: now,
                    updated_on: now,
                });
                id
            }
        };

        // Same book twice merges into one line.
        if let Some(line) = state
            .cart_items
            .iter_mut()
            .find(|i| i.cart_id == cart_id && i.book_id == book_id)
        {
            line.quantity += quantity;
            let merged = line.clone();
            touch_cart(&mut state, cart_id, now);
            return Ok(merged);
        }

        let item = ShoppingCartItem {
            id: ShoppingCartItemId::new(next(&mut state.next_cart_item_id)),
            cart_id,
            book_id,
            quantity,
        };
        state.cart_items.push(item.clone());
        touch_cart(&mut state, cart_id, now);
        Ok(item)
    }

    async fn remove_item(
        &self,
        correlation_id: CorrelationId,
        item_id: ShoppingCartItemId,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state();

        let Some(cart_id) = state
            .carts
            .iter()
            .find(|c| c.correlation_id == correlation_id)
            .map(|c| c.id)
        else {
            return Err(RepositoryError::NotFound);
        };

        let before = state.cart_items.len();
        state
            .cart_items
            .retain(|i| !(i.cart_id == cart_id && i.id == item_id));
        if state.cart_items.len() == before {
            return Err(RepositoryError::NotFound);
        }

        touch_cart(&mut state, cart_id, Utc::now());
        Ok(())
    }
}

fn touch_cart(state: &mut MemoryState, cart_id: ShoppingCartId, at: DateTime<Utc>) {
    if let Some(cart) = state.carts.iter_mut().find(|c| c.id == cart_id) {
        cart.updated_on = at;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use folio_core::Email;

    use super::*;

    fn profile(username: &str) -> CustomerProfile {
        CustomerProfile {
            username: username.to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: Email::parse("jane@example.com").unwrap(),
            phone: None,
        }
    }

    fn new_book(name: &str, price: Decimal) -> NewBook {
        NewBook {
            name: name.to_string(),
            author: "J.R.R. Tolkien".to_string(),
            isbn: "978-0345339683".to_string(),
            book_type_id: ReferenceDataId::new(1),
            condition_id: ReferenceDataId::new(2),
            genre_id: ReferenceDataId::new(3),
            publisher_id: ReferenceDataId::new(4),
            price,
            quantity: 5,
        }
    }

    #[tokio::test]
    async fn test_upsert_keeps_id_and_sub_across_sign_ins() {
        let store = MemoryStore::new();
        let sub = Sub::from("sub-1");

        let first = store.upsert(&sub, profile("jdoe")).await.unwrap();
        let second = store.upsert(&sub, profile("jane.doe")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.sub, sub);
        assert_eq!(second.username, "jane.doe");
        assert_eq!(
            store.get_by_sub(&sub).await.unwrap().unwrap().username,
            "jane.doe"
        );
    }

    #[tokio::test]
    async fn test_add_item_merges_same_book() {
        let store = MemoryStore::new();
        let correlation_id = CorrelationId::generate();
        let book = BookRepository::add(&store, new_book("The Hobbit", Decimal::new(1499, 2)))
            .await
            .unwrap();

        let first = store.add_item(correlation_id, book.id, 1).await.unwrap();
        let merged = store.add_item(correlation_id, book.id, 2).await.unwrap();

        assert_eq!(first.id, merged.id);
        assert_eq!(merged.quantity, 3);

        let view = store.get_view(correlation_id).await.unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.subtotal(), Decimal::new(4497, 2));
    }

    #[tokio::test]
    async fn test_place_snapshots_prices_and_clears_cart() {
        let store = MemoryStore::new();
        let correlation_id = CorrelationId::generate();
        let book = BookRepository::add(&store, new_book("The Hobbit", Decimal::new(1000, 2)))
            .await
            .unwrap();
        store.add_item(correlation_id, book.id, 2).await.unwrap();

        let cart = store.find_cart(correlation_id).await.unwrap().unwrap();
        let order = store
            .place(OrderPlacement {
                customer_id: CustomerId::new(1),
                address_id: AddressId::new(1),
                cart_id: cart.id,
            })
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total(), Decimal::new(2000, 2));
        assert!(store.get_view(correlation_id).await.unwrap().is_empty());

        // A later price change never touches the snapshot
        store
            .update_price(book.id, Decimal::new(9999, 2))
            .await
            .unwrap();
        let stored = OrderRepository::get(&store, order.id).await.unwrap().unwrap();
        assert_eq!(stored.items[0].unit_price, Decimal::new(1000, 2));
    }

    #[tokio::test]
    async fn test_offer_version_check_rejects_stale_writes() {
        let store = MemoryStore::new();
        let offer = OfferRepository::add(
            &store,
            CustomerId::new(1),
            NewOffer {
                book_name: "The Hobbit".to_string(),
                author: "J.R.R. Tolkien".to_string(),
                isbn: "978-0345339683".to_string(),
                book_type_id: ReferenceDataId::new(1),
                condition_id: ReferenceDataId::new(2),
                genre_id: ReferenceDataId::new(3),
                publisher_id: ReferenceDataId::new(4),
                price: Decimal::new(500, 2),
            },
        )
        .await
        .unwrap();

        let approved = OfferRepository::update_status(
            &store,
            offer.id,
            OfferStatus::Approved,
            offer.row_version,
        )
        .await
        .unwrap();
        assert_eq!(approved.row_version, offer.row_version + 1);

        // Writing with the old version again loses
        let stale = OfferRepository::update_status(
            &store,
            offer.id,
            OfferStatus::Rejected,
            offer.row_version,
        )
        .await;
        assert!(matches!(stale, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_order_cas_rejects_unexpected_status() {
        let store = MemoryStore::new();
        let correlation_id = CorrelationId::generate();
        let book = BookRepository::add(&store, new_book("Dune", Decimal::new(999, 2)))
            .await
            .unwrap();
        store.add_item(correlation_id, book.id, 1).await.unwrap();
        let cart = store.find_cart(correlation_id).await.unwrap().unwrap();
        let order = store
            .place(OrderPlacement {
                customer_id: CustomerId::new(1),
                address_id: AddressId::new(1),
                cart_id: cart.id,
            })
            .await
            .unwrap();

        let result = OrderRepository::update_status(
            &store,
            order.id,
            OrderStatus::Ordered,
            OrderStatus::Delivered,
            None,
        )
        .await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));

        let moved = OrderRepository::update_status(
            &store,
            order.id,
            OrderStatus::Pending,
            OrderStatus::Ordered,
            None,
        )
        .await
        .unwrap();
        assert_eq!(moved.status, OrderStatus::Ordered);
    }
}
