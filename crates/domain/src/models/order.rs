//! Customer order models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use folio_core::calendar::{end_of_day, start_of_day};
use folio_core::{AddressId, BookId, CustomerId, OrderId, OrderItemId, OrderStatus, ShoppingCartId};

use super::book::Book;

/// A customer order with its line items.
///
/// Items are written once at placement and never mutated afterwards; the
/// unit prices are snapshots of the book prices at that moment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Customer who placed the order.
    pub customer_id: CustomerId,
    /// Delivery address chosen at checkout.
    pub address_id: AddressId,
    /// Fulfillment status.
    pub status: OrderStatus,
    /// When the order was placed.
    pub ordered_on: DateTime<Utc>,
    /// Scheduled delivery, set when the order is confirmed.
    pub delivery_date: Option<DateTime<Utc>>,
    /// When the order was last changed.
    pub updated_on: DateTime<Utc>,
    /// Line items.
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Sum of the line totals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

/// One line of an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    /// Unique line ID.
    pub id: OrderItemId,
    /// Order this line belongs to.
    pub order_id: OrderId,
    /// Ordered book.
    pub book_id: BookId,
    /// Number of copies.
    pub quantity: i32,
    /// Book price at placement time.
    pub unit_price: Decimal,
}

impl OrderItem {
    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Input for creating an order from a shopping cart.
///
/// The service resolves the customer, address, and cart before building
/// this; the repository turns it into the order plus cleared cart in one
/// atomic write.
#[derive(Debug, Clone, Copy)]
pub struct OrderPlacement {
    /// Customer placing the order.
    pub customer_id: CustomerId,
    /// Validated, active delivery address owned by the customer.
    pub address_id: AddressId,
    /// Cart whose lines become the order items.
    pub cart_id: ShoppingCartId,
}

/// Filter criteria for the admin order list.
///
/// Absent fields never constrain; present criteria AND-compose.
#[derive(Debug, Clone, Default)]
pub struct OrderFilters {
    /// Exact fulfillment status.
    pub status: Option<OrderStatus>,
    /// Orders placed on or after this day.
    pub ordered_from: Option<NaiveDate>,
    /// Orders placed through this day, inclusive of the whole day.
    pub ordered_through: Option<NaiveDate>,
}

impl OrderFilters {
    /// True when `order` satisfies every present criterion.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|status| order.status == status)
            && self
                .ordered_from
                .is_none_or(|from| order.ordered_on >= start_of_day(from))
            && self
                .ordered_through
                .is_none_or(|through| order.ordered_on <= end_of_day(through))
    }
}

/// Order counts for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderStatistics {
    /// Orders still awaiting confirmation.
    pub pending_orders: i64,
    /// Confirmed orders whose delivery date has passed.
    pub past_due_orders: i64,
    /// Orders placed since the start of the current month.
    pub orders_this_month: i64,
    /// All orders ever placed.
    pub orders_total: i64,
}

/// A book ranked by the total quantity ordered across all orders.
#[derive(Debug, Clone, Serialize)]
pub struct BestSellingBook {
    /// The ranked book.
    pub book: Book,
    /// Total copies ordered.
    pub total_ordered: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn order_placed_at(at: DateTime<Utc>, status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(1),
            customer_id: CustomerId::new(1),
            address_id: AddressId::new(1),
            status,
            ordered_on: at,
            delivery_date: None,
            updated_on: at,
            items: Vec::new(),
        }
    }

    #[test]
    fn test_empty_filters_match_everything() {
        let order = order_placed_at(Utc::now(), OrderStatus::Pending);
        assert!(OrderFilters::default().matches(&order));
    }

    #[test]
    fn test_status_filter() {
        let order = order_placed_at(Utc::now(), OrderStatus::Ordered);
        let filters = OrderFilters {
            status: Some(OrderStatus::Ordered),
            ..OrderFilters::default()
        };
        assert!(filters.matches(&order));

        let filters = OrderFilters {
            status: Some(OrderStatus::Pending),
            ..OrderFilters::default()
        };
        assert!(!filters.matches(&order));
    }

    #[test]
    fn test_date_upper_bound_covers_the_whole_day() {
        let late_in_day = Utc.with_ymd_and_hms(2026, 5, 20, 23, 59, 59).unwrap();
        let order = order_placed_at(late_in_day, OrderStatus::Pending);

        let filters = OrderFilters {
            ordered_through: Some(NaiveDate::from_ymd_opt(2026, 5, 20).unwrap()),
            ..OrderFilters::default()
        };
        assert!(filters.matches(&order));

        // The first instant of the next day falls outside the bound
        let next_day = Utc.with_ymd_and_hms(2026, 5, 21, 0, 0, 0).unwrap();
        let order = order_placed_at(next_day, OrderStatus::Pending);
        assert!(!filters.matches(&order));
    }

    #[test]
    fn test_date_lower_bound_starts_at_midnight() {
        let midnight = Utc.with_ymd_and_hms(2026, 5, 20, 0, 0, 0).unwrap();
        let order = order_placed_at(midnight, OrderStatus::Pending);

        let filters = OrderFilters {
            ordered_from: Some(NaiveDate::from_ymd_opt(2026, 5, 20).unwrap()),
            ..OrderFilters::default()
        };
        assert!(filters.matches(&order));

        let filters = OrderFilters {
            ordered_from: Some(NaiveDate::from_ymd_opt(2026, 5, 21).unwrap()),
            ..OrderFilters::default()
        };
        assert!(!filters.matches(&order));
    }

    #[test]
    fn test_date_range_and_status_compose() {
        let placed = Utc.with_ymd_and_hms(2026, 5, 20, 12, 0, 0).unwrap();
        let order = order_placed_at(placed, OrderStatus::Ordered);

        let filters = OrderFilters {
            status: Some(OrderStatus::Ordered),
            ordered_from: Some(NaiveDate::from_ymd_opt(2026, 5, 19).unwrap()),
            ordered_through: Some(NaiveDate::from_ymd_opt(2026, 5, 21).unwrap()),
        };
        assert!(filters.matches(&order));

        let filters = OrderFilters {
            status: Some(OrderStatus::Cancelled),
            ..filters
        };
        assert!(!filters.matches(&order));
    }

    #[test]
    fn test_order_total_sums_line_totals() {
        let mut order = order_placed_at(Utc::now(), OrderStatus::Pending);
        order.items = vec![
            OrderItem {
                id: OrderItemId::new(1),
                order_id: order.id,
                book_id: BookId::new(1),
                quantity: 2,
                unit_price: Decimal::new(1050, 2),
            },
            OrderItem {
                id: OrderItemId::new(2),
                order_id: order.id,
                book_id: BookId::new(2),
                quantity: 1,
                unit_price: Decimal::new(499, 2),
            },
        ];

        assert_eq!(order.total(), Decimal::new(2599, 2));
    }
}
