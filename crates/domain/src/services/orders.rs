//! Order workflows: checkout, cancellation, and admin fulfillment.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use folio_core::calendar::start_of_month;
use folio_core::{AddressId, CorrelationId, OrderId, OrderStatus, PaginatedResult, Sub};

use super::page_request;
use crate::db::repositories::{
    AddressRepository, CustomerRepository, OrderRepository, ShoppingCartRepository,
};
use crate::error::DomainError;
use crate::models::{
    BestSellingBook, Customer, Order, OrderFilters, OrderPlacement, OrderStatistics,
};

/// Order service.
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    customers: Arc<dyn CustomerRepository>,
    addresses: Arc<dyn AddressRepository>,
    carts: Arc<dyn ShoppingCartRepository>,
}

impl OrderService {
    /// Create a new order service.
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        customers: Arc<dyn CustomerRepository>,
        addresses: Arc<dyn AddressRepository>,
        carts: Arc<dyn ShoppingCartRepository>,
    ) -> Self {
        Self {
            orders,
            customers,
            addresses,
            carts,
        }
    }

    async fn require_customer(&self, sub: &Sub) -> Result<Customer, DomainError> {
        self.customers
            .get_by_sub(sub)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("no customer for subject {sub}")))
    }

    /// Turn the cart behind `correlation_id` into an order delivered to
    /// `address_id`, snapshotting current book prices.
    ///
    /// Nothing is written until every check passes; the store then
    /// creates the order and clears the cart in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyCart` when the cart is missing or has
    /// no lines, `DomainError::NotFound` when `sub` has no customer
    /// record or the address is not one of the customer's active
    /// addresses, and `DomainError::Conflict` when a concurrent checkout
    /// emptied the cart first.
    #[instrument(skip(self))]
    pub async fn place_order(
        &self,
        sub: &Sub,
        correlation_id: CorrelationId,
        address_id: AddressId,
    ) -> Result<Order, DomainError> {
        let customer = self.require_customer(sub).await?;

        let Some(cart) = self.carts.find_cart(correlation_id).await? else {
            return Err(DomainError::EmptyCart);
        };
        if self.carts.get_view(correlation_id).await?.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        let address = self
            .addresses
            .get_active(customer.id, address_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("address {address_id} not found")))?;

        let order = self
            .orders
            .place(OrderPlacement {
                customer_id: customer.id,
                address_id: address.id,
                cart_id: cart.id,
            })
            .await?;

        info!(order_id = %order.id, total = %order.total(), "Placed order");
        Ok(order)
    }

    /// Cancel one of the customer's own orders. Allowed while the order
    /// is Pending or Ordered and its delivery date, if scheduled, is
    /// still in the future.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` when the order does not exist or
    /// belongs to someone else, and `DomainError::InvalidOperation` when
    /// the order can no longer be cancelled.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, sub: &Sub, order_id: OrderId) -> Result<Order, DomainError> {
        let customer = self.require_customer(sub).await?;

        let order = self
            .orders
            .get(order_id)
            .await?
            .filter(|order| order.customer_id == customer.id)
            .ok_or_else(|| DomainError::NotFound(format!("order {order_id} not found")))?;

        if !order.status.is_cancellable() {
            return Err(DomainError::InvalidOperation(format!(
                "order in status {} cannot be cancelled",
                order.status
            )));
        }
        if let Some(delivery) = order.delivery_date
            && delivery <= Utc::now()
        {
            return Err(DomainError::InvalidOperation(
                "delivery date has passed".to_string(),
            ));
        }

        let cancelled = self
            .orders
            .update_status(order_id, order.status, OrderStatus::Cancelled, None)
            .await?;

        info!(order_id = %order_id, "Cancelled order");
        Ok(cancelled)
    }

    /// Admin fulfillment: move an order along its lifecycle, optionally
    /// recording the scheduled delivery when confirming it. Setting the
    /// status it already has is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the order does not exist,
    /// `DomainError::InvalidOperation` for an illegal transition, and
    /// `DomainError::Conflict` when a concurrent writer moved the order
    /// first.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
        delivery_date: Option<DateTime<Utc>>,
    ) -> Result<Order, DomainError> {
        let order = self.get_order(order_id).await?;

        if order.status == new_status {
            return Ok(order);
        }

        if !order.status.can_transition_to(new_status) {
            return Err(DomainError::InvalidOperation(format!(
                "order cannot move from {} to {}",
                order.status, new_status
            )));
        }

        let updated = self
            .orders
            .update_status(order_id, order.status, new_status, delivery_date)
            .await?;

        info!(order_id = %order_id, status = %new_status, "Updated order status");
        Ok(updated)
    }

    /// Fetch one order, any customer's. Admin use.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no order has this ID.
    pub async fn get_order(&self, id: OrderId) -> Result<Order, DomainError> {
        self.orders
            .get(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("order {id} not found")))
    }

    /// Fetch one of the customer's own orders; someone else's order is
    /// indistinguishable from a missing one.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` when the order does not exist,
    /// belongs to another customer, or `sub` has no customer record.
    pub async fn get_order_for_customer(
        &self,
        sub: &Sub,
        id: OrderId,
    ) -> Result<Order, DomainError> {
        let customer = self.require_customer(sub).await?;
        self.orders
            .get(id)
            .await?
            .filter(|order| order.customer_id == customer.id)
            .ok_or_else(|| DomainError::NotFound(format!("order {id} not found")))
    }

    /// Admin view: orders matching `filters`, paginated.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` for a zero page index or
    /// size, or a persistence error from the store.
    #[instrument(skip(self, filters))]
    pub async fn list_orders(
        &self,
        filters: &OrderFilters,
        page_index: u32,
        page_size: u32,
    ) -> Result<PaginatedResult<Order>, DomainError> {
        let page = page_request(page_index, page_size)?;
        Ok(self.orders.list(filters, page).await?)
    }

    /// Every order the customer behind `sub` has placed, newest first.
    /// A subject with no customer record has no orders.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from the store.
    pub async fn list_orders_for_customer(&self, sub: &Sub) -> Result<Vec<Order>, DomainError> {
        let Some(customer) = self.customers.get_by_sub(sub).await? else {
            return Ok(Vec::new());
        };
        Ok(self.orders.list_for_customer(customer.id).await?)
    }

    /// The `count` most-ordered books.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from the store.
    pub async fn best_selling_books(
        &self,
        count: usize,
    ) -> Result<Vec<BestSellingBook>, DomainError> {
        Ok(self.orders.best_selling(count).await?)
    }

    /// Dashboard counts over all orders.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from the store.
    pub async fn statistics(&self) -> Result<OrderStatistics, DomainError> {
        let now = Utc::now();
        Ok(self.orders.statistics(now, start_of_month(now)).await?)
    }
}
